//! Behaviour shared by every store backend.

use chrono::{TimeZone, Utc};
use ronda_store::{MemoryStore, SqliteStore};
use ronda_traits::{
    Company, Date, DerivedMetricPoint, FactorContribution, FieldMap, MetricPeriod, PeriodType,
    PriceBar, Ranking, RankingDefinition, RankingResult, RondaError, StatementObservation,
    StatementType, Store, Ticker,
    fields::{NET_INCOME, REVENUE},
};
use std::collections::BTreeMap;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd_opt(y, m, day).unwrap()
}

fn backends() -> Vec<(&'static str, Box<dyn Store>)> {
    vec![
        ("memory", Box::new(MemoryStore::new())),
        ("sqlite", Box::new(SqliteStore::new_in_memory().unwrap())),
    ]
}

fn point(t: &Ticker, key: &str, end: Date, period: MetricPeriod, value: f64) -> DerivedMetricPoint {
    DerivedMetricPoint {
        ticker: t.clone(),
        key: key.to_string(),
        period_end: end,
        period_type: period,
        value,
    }
}

fn result(t: &str, score: f64, rank: u32) -> RankingResult {
    let mut snapshot = BTreeMap::new();
    snapshot.insert(
        "A".to_string(),
        FactorContribution {
            value: 1.0,
            zscore: score,
            weight: 1.0,
            contribution: score,
        },
    );
    RankingResult {
        ticker: Ticker::new(t),
        score,
        rank,
        snapshot,
    }
}

fn ranking(slug: &str) -> Ranking {
    Ranking::from_definition(
        RankingDefinition::new(slug, "Test").with_weight("A", 1.0),
        Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
    )
}

#[test]
fn companies_sorted_and_upserted() {
    for (name, store) in backends() {
        store.upsert_company(&Company::new("msft", "Microsoft")).unwrap();
        store.upsert_company(&Company::new("aapl", "Apple")).unwrap();
        store
            .upsert_company(&Company::new("AAPL", "Apple Inc.").with_sector("Technology"))
            .unwrap();

        let all = store.companies().unwrap();
        assert_eq!(all.len(), 2, "{name}");
        assert_eq!(all[0].ticker.as_str(), "AAPL", "{name}");
        assert_eq!(all[0].name, "Apple Inc.", "{name}");
        assert_eq!(all[0].sector.as_deref(), Some("Technology"), "{name}");
    }
}

#[test]
fn statement_merge_preserves_fields() {
    for (name, store) in backends() {
        let t = Ticker::new("AAA");
        store.upsert_company(&Company::new("AAA", "A")).unwrap();

        let first = FieldMap::new()
            .with(REVENUE, 100.0)
            .unwrap()
            .with(NET_INCOME, 10.0)
            .unwrap();
        let mut second = FieldMap::new().with(REVENUE, 150.0).unwrap();
        second.set_null(NET_INCOME).unwrap();

        for fields in [first, second] {
            store
                .record_statement(&StatementObservation::new(
                    t.clone(),
                    StatementType::Income,
                    PeriodType::Quarter,
                    d(2024, 3, 31),
                    fields,
                ))
                .unwrap();
        }

        let rows = store
            .statements(&t, StatementType::Income, PeriodType::Quarter)
            .unwrap();
        assert_eq!(rows.len(), 1, "{name}");
        let revenue = rows[0].fields.get(REVENUE).and_then(|v| v.to_finite());
        let income = rows[0].fields.get(NET_INCOME).and_then(|v| v.to_finite());
        assert_eq!(revenue, Some(150.0), "{name}");
        assert_eq!(income, Some(10.0), "{name}");
    }
}

#[test]
fn statements_ascending_and_filtered_by_kind() {
    for (name, store) in backends() {
        let t = Ticker::new("AAA");
        store.upsert_company(&Company::new("AAA", "A")).unwrap();
        for (end, st, pt) in [
            (d(2024, 6, 30), StatementType::Income, PeriodType::Quarter),
            (d(2023, 12, 31), StatementType::Income, PeriodType::Quarter),
            (d(2023, 12, 31), StatementType::Income, PeriodType::Year),
            (d(2024, 3, 31), StatementType::Balance, PeriodType::Quarter),
        ] {
            store
                .record_statement(&StatementObservation::new(
                    t.clone(),
                    st,
                    pt,
                    end,
                    FieldMap::new().with(REVENUE, 1.0).unwrap(),
                ))
                .unwrap();
        }
        let rows = store
            .statements(&t, StatementType::Income, PeriodType::Quarter)
            .unwrap();
        let ends: Vec<Date> = rows.iter().map(|r| r.period_end).collect();
        assert_eq!(ends, vec![d(2023, 12, 31), d(2024, 6, 30)], "{name}");
    }
}

#[test]
fn price_bar_replaces_whole_row() {
    for (name, store) in backends() {
        let t = Ticker::new("AAA");
        store.upsert_company(&Company::new("AAA", "A")).unwrap();
        let full = PriceBar {
            date: d(2024, 1, 2),
            open: Some(1.0),
            high: Some(2.0),
            low: Some(0.5),
            close: Some(1.5),
            volume: Some(100),
        };
        store.record_price_bar(&t, &full).unwrap();
        store
            .record_price_bar(&t, &PriceBar::from_close(d(2024, 1, 2), 1.7))
            .unwrap();
        store
            .record_price_bars(&t, &[PriceBar::from_close(d(2024, 1, 1), 1.2)])
            .unwrap();

        let bars = store.price_bars(&t).unwrap();
        assert_eq!(bars.len(), 2, "{name}");
        assert_eq!(bars[0].date, d(2024, 1, 1), "{name}");
        assert_eq!(bars[1].close, Some(1.7), "{name}");
        assert_eq!(bars[1].open, None, "{name}");
        assert_eq!(bars[1].volume, None, "{name}");
    }
}

#[test]
fn metric_upsert_is_idempotent_overwrite() {
    for (name, store) in backends() {
        let t = Ticker::new("AAA");
        store.upsert_company(&Company::new("AAA", "A")).unwrap();
        let end = d(2024, 3, 31);
        store
            .upsert_metric(&point(&t, "Revenue_TTM", end, MetricPeriod::Ttm, 1.0))
            .unwrap();
        store
            .upsert_metric(&point(&t, "Revenue_TTM", end, MetricPeriod::Ttm, 2.0))
            .unwrap();

        let series = store.metric_series(&t, "Revenue_TTM", None).unwrap();
        assert_eq!(series, vec![(end, MetricPeriod::Ttm, 2.0)], "{name}");
    }
}

#[test]
fn latest_metrics_prefers_newest_then_daily() {
    for (name, store) in backends() {
        let t = Ticker::new("AAA");
        store.upsert_company(&Company::new("AAA", "A")).unwrap();
        store
            .upsert_metrics(&[
                point(&t, "MarketCap", d(2024, 3, 31), MetricPeriod::Quarter, 1.0),
                point(&t, "MarketCap", d(2024, 5, 1), MetricPeriod::Daily, 3.0),
                point(&t, "MarketCap", d(2024, 5, 1), MetricPeriod::Quarter, 2.0),
                point(&t, "Revenue_TTM", d(2024, 3, 31), MetricPeriod::Ttm, 9.0),
            ])
            .unwrap();

        let latest = store.latest_metrics(&t).unwrap();
        assert_eq!(latest.len(), 2, "{name}");
        assert_eq!(latest["MarketCap"].value, 3.0, "{name}");
        assert_eq!(latest["MarketCap"].period_type, MetricPeriod::Daily, "{name}");
        assert_eq!(latest["Revenue_TTM"].period_end, d(2024, 3, 31), "{name}");
    }
}

#[test]
fn ranking_replace_never_accumulates() {
    for (name, store) in backends() {
        for t in ["AAA", "BBB"] {
            store.upsert_company(&Company::new(t, t)).unwrap();
        }
        let r = ranking("qv");
        let results = vec![result("AAA", 1.0, 1), result("BBB", -1.0, 2)];
        store.replace_ranking(&r, &results).unwrap();
        store.replace_ranking(&r, &results).unwrap();

        let board = store.leaderboard("qv").unwrap();
        assert_eq!(board.len(), 2, "{name}");
        assert_eq!(board[0].ticker.as_str(), "AAA", "{name}");
        assert_eq!(board[0].snapshot["A"].contribution, 1.0, "{name}");
        assert_eq!(store.ranking("qv").unwrap().unwrap().definition, r.definition, "{name}");
    }
}

#[test]
fn failed_ranking_replace_keeps_previous_run() {
    for (name, store) in backends() {
        store.upsert_company(&Company::new("AAA", "A")).unwrap();
        let r = ranking("qv");
        store.replace_ranking(&r, &[result("AAA", 0.0, 1)]).unwrap();

        // Second run references an unknown company and must fail as a whole.
        let bad = vec![result("AAA", 5.0, 1), result("NOPE", 1.0, 2)];
        assert!(store.replace_ranking(&r, &bad).is_err(), "{name}");

        let board = store.leaderboard("qv").unwrap();
        assert_eq!(board.len(), 1, "{name}");
        assert_eq!(board[0].score, 0.0, "{name}");
    }
}

#[test]
fn unknown_ranking_is_an_error() {
    for (name, store) in backends() {
        let err = store.leaderboard("missing").unwrap_err();
        assert!(matches!(err, RondaError::RankingNotFound(_)), "{name}");
        assert!(store.ranking("missing").unwrap().is_none(), "{name}");
    }
}

#[test]
fn delete_company_cascades() {
    for (name, store) in backends() {
        let t = Ticker::new("AAA");
        store.upsert_company(&Company::new("AAA", "A")).unwrap();
        store.upsert_company(&Company::new("BBB", "B")).unwrap();
        store
            .record_statement(&StatementObservation::new(
                t.clone(),
                StatementType::Income,
                PeriodType::Quarter,
                d(2024, 3, 31),
                FieldMap::new().with(REVENUE, 1.0).unwrap(),
            ))
            .unwrap();
        store
            .record_price_bar(&t, &PriceBar::from_close(d(2024, 1, 2), 1.0))
            .unwrap();
        store
            .upsert_metric(&point(&t, "Price", d(2024, 1, 2), MetricPeriod::Daily, 1.0))
            .unwrap();
        store
            .replace_ranking(
                &ranking("qv"),
                &[result("AAA", 1.0, 1), result("BBB", -1.0, 2)],
            )
            .unwrap();

        assert!(store.delete_company(&t).unwrap(), "{name}");
        assert!(!store.delete_company(&t).unwrap(), "{name}");
        assert!(store.company(&t).unwrap().is_none(), "{name}");
        assert!(
            store
                .statements(&t, StatementType::Income, PeriodType::Quarter)
                .unwrap()
                .is_empty(),
            "{name}"
        );
        assert!(store.price_bars(&t).unwrap().is_empty(), "{name}");
        assert!(store.latest_metrics(&t).unwrap().is_empty(), "{name}");
        let board = store.leaderboard("qv").unwrap();
        assert_eq!(board.len(), 1, "{name}");
        assert_eq!(board[0].ticker.as_str(), "BBB", "{name}");
    }
}

#[test]
fn writes_for_unknown_company_fail() {
    for (name, store) in backends() {
        let err = store
            .record_statement(&StatementObservation::new(
                "GHOST",
                StatementType::Income,
                PeriodType::Quarter,
                d(2024, 3, 31),
                FieldMap::new(),
            ))
            .unwrap_err();
        assert!(matches!(err, RondaError::CompanyNotFound(_)), "{name}");
    }
}
