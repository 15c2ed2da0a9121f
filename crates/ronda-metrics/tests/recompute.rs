//! End-to-end recompute against both store backends.

use approx::assert_relative_eq;
use ronda_metrics::RecomputeEngine;
use ronda_store::{MemoryStore, SqliteStore};
use ronda_traits::{
    Company, Date, FieldMap, MetricPeriod, PeriodType, PriceBar, StatementObservation,
    StatementType, Store, Ticker, fields,
};

fn backends() -> Vec<(&'static str, Box<dyn Store>)> {
    vec![
        ("memory", Box::new(MemoryStore::new())),
        ("sqlite", Box::new(SqliteStore::new_in_memory().unwrap())),
    ]
}

fn quarter_ends() -> Vec<Date> {
    [
        (2022, 3, 31),
        (2022, 6, 30),
        (2022, 9, 30),
        (2022, 12, 31),
        (2023, 3, 31),
        (2023, 6, 30),
        (2023, 9, 30),
        (2023, 12, 31),
    ]
    .into_iter()
    .map(|(y, m, d)| Date::from_ymd_opt(y, m, d).unwrap())
    .collect()
}

/// Two years of quarters with revenue under the vendor alias "Revenues",
/// plus daily closes from April 2023 into January 2024.
fn seed(store: &dyn Store, ticker: &str, revenue: [f64; 8], net_income: f64) {
    store
        .upsert_company(&Company::new(ticker, ticker).with_sector("Technology"))
        .unwrap();
    for (i, end) in quarter_ends().into_iter().enumerate() {
        let income = FieldMap::new()
            .with(fields::REVENUES, revenue[i])
            .unwrap()
            .with(fields::NET_INCOME, net_income)
            .unwrap()
            .with(fields::WEIGHTED_AVERAGE_SHS_OUT_DIL, 100.0)
            .unwrap();
        let balance = FieldMap::new()
            .with(fields::CASH_AND_EQUIVALENTS, 50.0)
            .unwrap()
            .with(fields::LONG_TERM_DEBT, 150.0)
            .unwrap();
        for (st, f) in [
            (StatementType::Income, income),
            (StatementType::Balance, balance),
        ] {
            store
                .record_statement(&StatementObservation::new(
                    ticker,
                    st,
                    PeriodType::Quarter,
                    end,
                    f,
                ))
                .unwrap();
        }
    }
    let t = Ticker::new(ticker);
    let bars: Vec<PriceBar> = (0..300)
        .map(|i| {
            let date = Date::from_ymd_opt(2023, 4, 1).unwrap() + chrono::Days::new(i);
            PriceBar::from_close(date, 10.0 + (i % 5) as f64)
        })
        .collect();
    store.record_price_bars(&t, &bars).unwrap();
}

#[test]
fn recompute_writes_ttm_growth_and_valuation() {
    for (name, store) in backends() {
        let revenue = [100.0, 100.0, 100.0, 100.0, 125.0, 125.0, 125.0, 125.0];
        seed(store.as_ref(), "AAA", revenue, 20.0);
        let t = Ticker::new("AAA");
        let ends = quarter_ends();

        let report = RecomputeEngine::default()
            .recompute_all(store.as_ref(), &[])
            .unwrap();
        assert_eq!(report.companies, 1, "{name}");
        assert!(report.failures.is_empty(), "{name}");

        let ttm = store.metric_series(&t, "Revenue_TTM", Some(MetricPeriod::Ttm)).unwrap();
        let dates: Vec<Date> = ttm.iter().map(|(d, _, _)| *d).collect();
        assert_eq!(dates, ends[3..].to_vec(), "{name}");
        assert_eq!(ttm[0].2, 400.0, "{name}");
        assert_eq!(ttm[4].2, 500.0, "{name}");

        let yoy = store.metric_series(&t, "Revenue_YoY", None).unwrap();
        assert_eq!(yoy.len(), 1, "{name}");
        assert_eq!(yoy[0].0, ends[7], "{name}");
        assert_relative_eq!(yoy[0].2, 0.25);

        let latest = store.latest_metrics(&t).unwrap();
        assert_relative_eq!(latest["EPS_TTM"].value, 0.8);
        assert_eq!(latest["EPS_TTM"].period_end, ends[7], "{name}");
        assert!(latest.contains_key("PE_TTM"), "{name}");
        assert_eq!(latest["MarketCap"].period_type, MetricPeriod::Daily, "{name}");
    }
}

#[test]
fn recompute_twice_does_not_duplicate() {
    for (name, store) in backends() {
        seed(store.as_ref(), "AAA", [100.0; 8], 10.0);
        let engine = RecomputeEngine::default();
        let first = engine.recompute_all(store.as_ref(), &[]).unwrap();
        let second = engine.recompute_all(store.as_ref(), &[]).unwrap();
        assert_eq!(first.written, second.written, "{name}");

        let t = Ticker::new("AAA");
        let series = store.metric_series(&t, "Revenue_TTM", None).unwrap();
        assert_eq!(series.len(), 5, "{name}");
    }
}

#[test]
fn losses_never_produce_pe() {
    for (name, store) in backends() {
        seed(store.as_ref(), "LOSS", [100.0; 8], -5.0);
        RecomputeEngine::default()
            .recompute_all(store.as_ref(), &[])
            .unwrap();
        let t = Ticker::new("LOSS");
        assert!(store.metric_series(&t, "PE_TTM", None).unwrap().is_empty(), "{name}");
        assert!(!store.metric_series(&t, "EPS_TTM", None).unwrap().is_empty(), "{name}");
    }
}

#[test]
fn technicals_write_latest_bar_only() {
    for (name, store) in backends() {
        seed(store.as_ref(), "AAA", [100.0; 8], 10.0);
        let t = Ticker::new("AAA");
        RecomputeEngine::default()
            .technicals_all(store.as_ref(), &[t.clone()])
            .unwrap();

        let latest = store.latest_metrics(&t).unwrap();
        let last = store.price_bars(&t).unwrap().last().unwrap().date;
        for key in ["SMA_50", "SMA_200", "RSI_14", "DistTo52wHigh", "DistTo52wLow", "Vol_30d", "Price"] {
            assert_eq!(latest[key].period_end, last, "{name} {key}");
            assert_eq!(latest[key].period_type, MetricPeriod::Daily, "{name} {key}");
        }
        let sma = store.metric_series(&t, "SMA_50", None).unwrap();
        assert_eq!(sma.len(), 1, "{name}");
    }
}
