//! Ranking runs persisted through both store backends.

use approx::assert_relative_eq;
use chrono::{Datelike, TimeZone, Utc};
use ronda_rank::{ComposerConfig, Leaderboard, RankingComposer, quality_value};
use ronda_store::{MemoryStore, SqliteStore};
use ronda_traits::{Company, Date, DerivedMetricPoint, MetricPeriod, Store, Ticker};

fn backends() -> Vec<(&'static str, Box<dyn Store>)> {
    vec![
        ("memory", Box::new(MemoryStore::new())),
        ("sqlite", Box::new(SqliteStore::new_in_memory().unwrap())),
    ]
}

fn put(store: &dyn Store, ticker: &str, key: &str, period: MetricPeriod, y: i32, value: f64) {
    store
        .upsert_metric(&DerivedMetricPoint {
            ticker: Ticker::new(ticker),
            key: key.to_string(),
            period_end: Date::from_ymd_opt(y, 12, 31).unwrap(),
            period_type: period,
            value,
        })
        .unwrap();
}

/// Three ranked companies plus one without NetIncome_TTM.
fn seed(store: &dyn Store) {
    for t in ["AAA", "BBB", "CCC", "DDD"] {
        store.upsert_company(&Company::new(t, t)).unwrap();
    }
    for (t, yoy, ni) in [("AAA", 0.10, 50.0), ("BBB", 0.30, 10.0), ("CCC", 0.20, 30.0)] {
        // An older point must not be picked up.
        put(store, t, "Revenue_YoY", MetricPeriod::Ttm, 2022, 9.0);
        put(store, t, "Revenue_YoY", MetricPeriod::Ttm, 2023, yoy);
        put(store, t, "NetIncome_TTM", MetricPeriod::Ttm, 2023, ni);
    }
    put(store, "DDD", "Revenue_YoY", MetricPeriod::Ttm, 2023, 0.5);
}

#[test]
fn rerun_replaces_results() {
    for (name, store) in backends() {
        seed(store.as_ref());
        let composer = RankingComposer::default();
        let def = quality_value();

        for day in [1, 2] {
            let at = Utc.with_ymd_and_hms(2024, 7, day, 0, 0, 0).unwrap();
            let run = composer.run(store.as_ref(), &def, &[], at).unwrap().unwrap();
            assert_eq!(run.results.len(), 3, "{name}");
            assert_eq!(run.excluded, vec![Ticker::new("DDD")], "{name}");
        }

        let board = Leaderboard::load(store.as_ref(), "quality_value").unwrap();
        assert_eq!(board.results.len(), 3, "{name}");
        assert_eq!(board.ranking.run_at.day(), 2, "{name}");
        let ranks: Vec<u32> = board.results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3], "{name}");

        let total: f64 = board.results.iter().map(|r| r.score).sum();
        assert_relative_eq!(total, 0.0, epsilon = 1e-12);
        for r in &board.results {
            let sum: f64 = r.snapshot.values().map(|c| c.contribution).sum();
            assert_relative_eq!(sum, r.score, epsilon = 1e-12);
        }
    }
}

#[test]
fn too_few_companies_keeps_previous_run() {
    for (name, store) in backends() {
        seed(store.as_ref());
        let def = quality_value();
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        RankingComposer::default()
            .run(store.as_ref(), &def, &[], at)
            .unwrap()
            .unwrap();

        let strict = RankingComposer::new(ComposerConfig { min_companies: 10 });
        let skipped = strict.run(store.as_ref(), &def, &[], at).unwrap();
        assert!(skipped.is_none(), "{name}");
        assert_eq!(store.leaderboard("quality_value").unwrap().len(), 3, "{name}");
    }
}

#[test]
fn selected_tickers_only() {
    for (name, store) in backends() {
        seed(store.as_ref());
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let run = RankingComposer::default()
            .run(
                store.as_ref(),
                &quality_value(),
                &[Ticker::new("AAA"), Ticker::new("BBB")],
                at,
            )
            .unwrap()
            .unwrap();
        assert_eq!(run.results.len(), 2, "{name}");
        // Two companies: each factor z-score is +/-1.
        for r in &run.results {
            assert_relative_eq!(r.snapshot["Revenue_YoY"].zscore.abs(), 1.0);
        }
    }
}

#[test]
fn unknown_leaderboard() {
    for (name, store) in backends() {
        assert!(Leaderboard::load(store.as_ref(), "nope").is_err(), "{name}");
    }
}
