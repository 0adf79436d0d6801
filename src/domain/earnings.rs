//! Quarterly earnings records and derived growth figures.

use chrono::NaiveDate;

/// Quarters between a report and its year-ago counterpart.
pub const YOY_PERIODS: usize = 4;

/// One reported quarter. Figures missing from the source are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct EarningsRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub quarter: String,
    pub revenue: f64,
    pub net_income: f64,
    pub revenue_growth: f64,
    pub margin: f64,
}

/// An earnings record with year-over-year growth attached.
///
/// Growth is `None` until four prior quarters exist. When the year-ago value
/// is zero or missing, the previous quarter's growth carries forward.
#[derive(Debug, Clone, PartialEq)]
pub struct EarningsSnapshot {
    pub date: NaiveDate,
    pub revenue: f64,
    pub net_income: f64,
    pub margin: f64,
    pub revenue_growth_yoy: Option<f64>,
    pub income_growth_yoy: Option<f64>,
}

fn pct_change(current: f64, base: f64) -> Option<f64> {
    if base == 0.0 || !base.is_finite() || !current.is_finite() {
        None
    } else {
        Some(current / base - 1.0)
    }
}

/// Sort one ticker's records by date and compute YoY growth on the
/// quarterly series, before any daily forward-fill.
pub fn build_snapshots(records: &[EarningsRecord], ticker: &str) -> Vec<EarningsSnapshot> {
    let mut own: Vec<&EarningsRecord> = records.iter().filter(|r| r.ticker == ticker).collect();
    own.sort_by_key(|r| r.date);

    let mut snapshots: Vec<EarningsSnapshot> = Vec::with_capacity(own.len());
    for (i, r) in own.iter().enumerate() {
        let base = i.checked_sub(YOY_PERIODS).map(|j| own[j]);
        let carried = base.and(snapshots.last());
        let revenue_growth_yoy = base
            .and_then(|b| pct_change(r.revenue, b.revenue))
            .or_else(|| carried.and_then(|p| p.revenue_growth_yoy));
        let income_growth_yoy = base
            .and_then(|b| pct_change(r.net_income, b.net_income))
            .or_else(|| carried.and_then(|p| p.income_growth_yoy));
        snapshots.push(EarningsSnapshot {
            date: r.date,
            revenue: r.revenue,
            net_income: r.net_income,
            margin: r.margin,
            revenue_growth_yoy,
            income_growth_yoy,
        });
    }
    snapshots
}

/// Latest snapshot dated on or before `date`. Snapshots must be sorted.
pub fn as_of(snapshots: &[EarningsSnapshot], date: NaiveDate) -> Option<&EarningsSnapshot> {
    let idx = snapshots.partition_point(|s| s.date <= date);
    idx.checked_sub(1).map(|i| &snapshots[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, ticker: &str, revenue: f64, net_income: f64) -> EarningsRecord {
        EarningsRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            ticker: ticker.into(),
            quarter: String::new(),
            revenue,
            net_income,
            revenue_growth: 0.0,
            margin: net_income / revenue,
        }
    }

    fn quarters() -> Vec<EarningsRecord> {
        vec![
            record("2021-03-31", "AAPL", 100.0, 10.0),
            record("2020-12-31", "AAPL", 90.0, 9.0),
            record("2020-06-30", "AAPL", 80.0, 8.0),
            record("2020-09-30", "AAPL", 85.0, 8.5),
            record("2020-03-31", "AAPL", 75.0, 7.5),
            record("2020-03-31", "MSFT", 1.0, 1.0),
        ]
    }

    #[test]
    fn snapshots_sorted_and_filtered() {
        let snaps = build_snapshots(&quarters(), "AAPL");
        assert_eq!(snaps.len(), 5);
        assert!(snaps.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn yoy_growth_needs_four_prior_quarters() {
        let snaps = build_snapshots(&quarters(), "AAPL");
        for s in &snaps[..4] {
            assert!(s.revenue_growth_yoy.is_none());
            assert!(s.income_growth_yoy.is_none());
        }
        let last = &snaps[4];
        assert!((last.revenue_growth_yoy.unwrap() - (100.0 / 75.0 - 1.0)).abs() < 1e-12);
        assert!((last.income_growth_yoy.unwrap() - (10.0 / 7.5 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn zero_base_yields_no_growth() {
        let mut recs = quarters();
        recs[4].revenue = 0.0;
        let snaps = build_snapshots(&recs, "AAPL");
        assert!(snaps[4].revenue_growth_yoy.is_none());
    }

    #[test]
    fn undefined_growth_after_history_reuses_prior_quarter() {
        let recs: Vec<EarningsRecord> = [
            ("2020-03-31", 50.0),
            ("2020-06-30", 0.0),
            ("2020-09-30", 60.0),
            ("2020-12-31", 65.0),
            ("2021-03-31", 55.0),
            ("2021-06-30", 70.0),
            ("2021-09-30", 66.0),
        ]
        .iter()
        .map(|&(d, rev)| record(d, "AAPL", rev, 1.0))
        .collect();
        let snaps = build_snapshots(&recs, "AAPL");

        let first = snaps[4].revenue_growth_yoy.unwrap();
        assert!((first - 0.1).abs() < 1e-12);
        // year-ago revenue is zero
        assert_eq!(snaps[5].revenue_growth_yoy, Some(first));
        assert!((snaps[6].revenue_growth_yoy.unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(snaps[5].income_growth_yoy, Some(0.0));
    }

    #[test]
    fn as_of_holds_value_until_superseded() {
        let snaps = build_snapshots(&quarters(), "AAPL");
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();

        assert!(as_of(&snaps, d("2020-03-30")).is_none());
        assert_eq!(as_of(&snaps, d("2020-03-31")).unwrap().revenue, 75.0);
        assert_eq!(as_of(&snaps, d("2020-05-15")).unwrap().revenue, 75.0);
        assert_eq!(as_of(&snaps, d("2022-01-01")).unwrap().revenue, 100.0);
    }
}
