//! Time alignment of the price and auxiliary series.
//!
//! Produces the observation stream consumed by the simulator:
//! - Backward as-of join (each price tick takes the most recent auxiliary
//!   reading at or before its timestamp)
//! - Calendar-month exclusion

use tracing::debug;

use super::types::{AuxReading, Observation, PriceTick};

/// Join auxiliary readings onto price ticks with a backward as-of join.
///
/// Both inputs are stable-sorted by timestamp first. A tick with no reading
/// at or before its timestamp gets `aux_reading: None`. NaN readings are
/// treated as absent.
pub fn merge_asof_backward(prices: &[PriceTick], aux: &[AuxReading]) -> Vec<Observation> {
    let mut prices = prices.to_vec();
    prices.sort_by_key(|p| p.timestamp);

    let mut aux = aux.to_vec();
    aux.sort_by_key(|a| a.timestamp);

    let mut observations = Vec::with_capacity(prices.len());
    let mut cursor = 0;
    let mut current: Option<f64> = None;

    for tick in &prices {
        while cursor < aux.len() && aux[cursor].timestamp <= tick.timestamp {
            current = Some(aux[cursor].value);
            cursor += 1;
        }

        let obs = Observation::from(*tick);
        observations.push(match current {
            Some(value) => obs.with_aux(value),
            None => obs,
        });
    }

    debug!(
        "Merged {} price ticks with {} aux readings ({} matched)",
        prices.len(),
        aux.len(),
        observations.iter().filter(|o| o.aux_reading.is_some()).count()
    );

    observations
}

/// Drop observations falling in any of the given calendar months (1-12).
pub fn exclude_months(observations: Vec<Observation>, months: &[u32]) -> Vec<Observation> {
    if months.is_empty() {
        return observations;
    }

    let before = observations.len();
    let kept: Vec<_> = observations
        .into_iter()
        .filter(|o| !months.contains(&o.month()))
        .collect();

    debug!(
        "Excluded {} observations in months {:?}",
        before - kept.len(),
        months
    );

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(month: u32, day: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, month, day)
            .unwrap()
            .and_hms_opt(10, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_asof_takes_latest_reading_at_or_before() {
        let prices = vec![
            PriceTick::new(ts(1, 2, 0), 100.0),
            PriceTick::new(ts(1, 2, 1), 101.0),
            PriceTick::new(ts(1, 2, 3), 102.0),
        ];
        let aux = vec![
            AuxReading::new(ts(1, 2, 1), 15.0),
            AuxReading::new(ts(1, 2, 2), 16.0),
        ];

        let merged = merge_asof_backward(&prices, &aux);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].aux_reading, None);
        // Exact timestamp match counts as "at or before"
        assert_eq!(merged[1].aux_reading, Some(15.0));
        assert_eq!(merged[2].aux_reading, Some(16.0));
    }

    #[test]
    fn test_asof_sorts_unordered_inputs() {
        let prices = vec![
            PriceTick::new(ts(1, 2, 5), 105.0),
            PriceTick::new(ts(1, 2, 0), 100.0),
        ];
        let aux = vec![
            AuxReading::new(ts(1, 2, 4), 20.0),
            AuxReading::new(ts(1, 2, 0), 10.0),
        ];

        let merged = merge_asof_backward(&prices, &aux);

        assert_eq!(merged[0].mid_price, 100.0);
        assert_eq!(merged[0].aux_reading, Some(10.0));
        assert_eq!(merged[1].mid_price, 105.0);
        assert_eq!(merged[1].aux_reading, Some(20.0));
    }

    #[test]
    fn test_asof_nan_reading_is_absent() {
        let prices = vec![PriceTick::new(ts(1, 2, 1), 100.0)];
        let aux = vec![AuxReading::new(ts(1, 2, 0), f64::NAN)];

        let merged = merge_asof_backward(&prices, &aux);
        assert_eq!(merged[0].aux_reading, None);
    }

    #[test]
    fn test_asof_without_aux() {
        let prices = vec![PriceTick::new(ts(1, 2, 1), 100.0)];
        let merged = merge_asof_backward(&prices, &[]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].aux_reading, None);
    }

    #[test]
    fn test_exclude_months() {
        let observations = vec![
            Observation::new(ts(8, 29, 0), 1.0),
            Observation::new(ts(9, 1, 0), 2.0),
            Observation::new(ts(9, 30, 0), 3.0),
            Observation::new(ts(10, 1, 0), 4.0),
        ];

        let kept = exclude_months(observations.clone(), &[9]);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|o| o.month() != 9));

        let untouched = exclude_months(observations, &[]);
        assert_eq!(untouched.len(), 4);
    }
}
