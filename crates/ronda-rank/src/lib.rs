#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Ranking composition for ronda.
//!
//! A ranking definition weights metric keys. The composer standardizes each
//! weighted metric across companies, sums the weighted z-scores and stores
//! the ordered results, replacing the previous run for the same slug.
//!
//! # Examples
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use ronda_rank::{RankingComposer, quality_value};
//! use ronda_store::SqliteStore;
//!
//! let store = SqliteStore::new("ronda.db").unwrap();
//! let run = RankingComposer::default()
//!     .run(&store, &quality_value(), &[], Utc::now())
//!     .unwrap();
//! ```

mod composer;
mod definition;
mod leaderboard;

// Re-export main types
pub use composer::{
    CompanySnapshot, ComposerConfig, Composition, FactorColumn, RankingComposer, RankingRun,
};
pub use definition::{
    QUALITY_VALUE, builtin, builtin_definitions, load_definition, parse_definition, quality_value,
};
pub use leaderboard::{Leaderboard, leaderboard_frame};
