#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Store implementations for ronda.
//!
//! - [`MemoryStore`]: ordered maps behind a `RwLock`, for tests and one-shot runs.
//! - [`SqliteStore`]: durable storage via rusqlite with cascading deletes and
//!   transactional ranking replacement.
//!
//! Both implement every trait in [`ronda_traits::store`].

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
