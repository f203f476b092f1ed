//! Fact collection and change detection for entitlement-sync
//!
//! This crate assembles the system's fact set and decides whether it
//! drifted from the last value pushed to the entitlement service:
//!
//! - [`FactStore`]: merges probe facts, the preferred certificate version,
//!   custom fact files, and plugin hooks, with in-memory memoization
//! - [`diff_facts`]: the change-detection algorithm, graylist included
//! - [`CacheFile`]: read-only view of the last pushed fact set
//! - [`FactsStage`]: pipeline adapter pushing facts when they changed
//!
//! Hardware probing and the actual upload are external collaborators
//! behind the [`HardwareProbe`] and [`FactsUploader`] traits.

pub mod cache;
pub mod diff;
pub mod error;
pub mod stage;
pub mod store;

pub use cache::CacheFile;
pub use diff::diff_facts;
pub use error::{Error, Result};
pub use stage::{FactsStage, FactsUploader};
pub use store::{
    CERT_VERSION, CERT_VERSION_FACT, CUSTOM_FACTS_EXT, FactSet, FactStore, FactsPlugin,
    HardwareProbe,
};
