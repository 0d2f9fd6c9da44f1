//! Pure billing arithmetic, kept free of data access so it can be tested
//! without a database.

use metering_client::domain::{HourlySettlementRow, Tariff};

/// Pointwise components derived from the period totals and tariff rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyComponents {
    /// Active energy charge: consumption at the consumption unit rate.
    pub ea: f64,
    /// Commercialization credit: injection at the commercialization rate.
    pub ec: f64,
    /// Injected energy directly offsetting consumption.
    pub quantity_ee1: f64,
    /// Tier-1 excess, charged negative at the consumption unit rate.
    pub ee1: f64,
    /// Tier-2 excess quantity; non-positive when injection exceeds
    /// consumption, and that sign is part of the settlement contract — the
    /// hourly walk multiplies by it as-is.
    pub quantity_ee2: f64,
}

pub fn energy_components(
    total_consumption: f64,
    total_injection: f64,
    tariff: &Tariff,
) -> EnergyComponents {
    let ea = total_consumption * tariff.cu;
    let ec = total_injection * tariff.c;

    let quantity_ee1 = total_injection.min(total_consumption);
    let ee1 = -1.0 * quantity_ee1 * tariff.cu;

    let quantity_ee2 = if total_injection > total_consumption {
        total_consumption - total_injection
    } else {
        0.0
    };

    EnergyComponents {
        ea,
        ec,
        quantity_ee1,
        ee1,
        quantity_ee2,
    }
}

/// Tier-2 excess settlement: a single forward pass over the hourly rows
/// accumulating injection. Hours while the running sum stays within
/// `threshold` (the service's total consumption) settle at the negative
/// consumption unit rate; hours after the crossing settle at that hour's
/// published reference rate.
///
/// Rows must already be in non-decreasing timestamp order; equal timestamps
/// keep their input order. An empty sequence settles to 0. The loop does not
/// short-circuit on `quantity_ee2 == 0` — every hour contributes 0 and the
/// result is still 0.
pub fn tier2_settlement(
    rows: &[HourlySettlementRow],
    threshold: f64,
    quantity_ee2: f64,
    cu_rate: f64,
) -> f64 {
    let mut running_sum = 0.0;
    let mut ee2 = 0.0;

    for row in rows {
        running_sum += row.injection_kwh;
        if running_sum > threshold {
            ee2 += quantity_ee2 * row.reference_rate;
        } else {
            ee2 += quantity_ee2 * cu_rate * -1.0;
        }
    }

    ee2
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn tariff(cu: f64, c: f64) -> Tariff {
        Tariff {
            id_market: 1,
            voltage_level: 1,
            cdi: 1,
            g: 0.0,
            t: 0.0,
            d: 0.0,
            r: 0.0,
            c,
            p: 0.0,
            cu,
        }
    }

    fn row(hour: i64, injection_kwh: f64, reference_rate: f64) -> HourlySettlementRow {
        HourlySettlementRow {
            ts: datetime!(2023-09-01 00:00:00 UTC) + time::Duration::hours(hour),
            consumption_kwh: 0.0,
            injection_kwh,
            reference_rate,
        }
    }

    #[test]
    fn consumption_dominated_components() {
        // totals 100/60 at CU=50, C=10
        let c = energy_components(100.0, 60.0, &tariff(50.0, 10.0));

        assert_eq!(c.ea, 5000.0);
        assert_eq!(c.ec, 600.0);
        assert_eq!(c.quantity_ee1, 60.0);
        assert_eq!(c.ee1, -3000.0);
        assert_eq!(c.quantity_ee2, 0.0);
    }

    #[test]
    fn injection_dominated_components_keep_negative_tier2_quantity() {
        let c = energy_components(60.0, 100.0, &tariff(50.0, 10.0));

        assert_eq!(c.ea, 3000.0);
        assert_eq!(c.ec, 1000.0);
        assert_eq!(c.quantity_ee1, 60.0);
        assert_eq!(c.ee1, -3000.0);
        assert_eq!(c.quantity_ee2, -40.0);
    }

    #[test]
    fn walk_blends_internal_and_reference_rates_across_the_crossing() {
        // Running sums [40, 80, 100] against threshold 60: the first hour is
        // within the threshold, the last two are past it.
        let rows = vec![row(0, 40.0, 5.0), row(1, 40.0, 5.0), row(2, 20.0, 5.0)];

        let ee2 = tier2_settlement(&rows, 60.0, -40.0, 50.0);

        // -40*50*-1 + -40*5 + -40*5
        assert_eq!(ee2, 1600.0);
    }

    #[test]
    fn walk_over_empty_sequence_settles_to_zero() {
        assert_eq!(tier2_settlement(&[], 60.0, -40.0, 50.0), 0.0);
    }

    #[test]
    fn walk_with_zero_quantity_settles_to_zero_on_both_branches() {
        let rows = vec![row(0, 40.0, 5.0), row(1, 40.0, 5.0)];
        assert_eq!(tier2_settlement(&rows, 60.0, 0.0, 50.0), 0.0);
    }

    #[test]
    fn walk_is_idempotent() {
        let rows = vec![row(0, 40.0, 5.0), row(1, 40.0, 7.0), row(2, 20.0, 9.0)];

        let first = tier2_settlement(&rows, 60.0, -40.0, 50.0);
        let second = tier2_settlement(&rows, 60.0, -40.0, 50.0);

        assert_eq!(first, second);
    }

    #[test]
    fn walk_depends_only_on_timestamp_order() {
        let sorted = vec![row(0, 40.0, 5.0), row(1, 40.0, 7.0), row(2, 20.0, 9.0)];
        let mut shuffled = vec![row(2, 20.0, 9.0), row(0, 40.0, 5.0), row(1, 40.0, 7.0)];
        shuffled.sort_by(|a, b| a.ts.cmp(&b.ts));

        assert_eq!(
            tier2_settlement(&sorted, 60.0, -40.0, 50.0),
            tier2_settlement(&shuffled, 60.0, -40.0, 50.0)
        );
    }
}
