//! Update pipeline orchestration for entitlement-sync
//!
//! This crate provides the control logic that keeps the machine's local
//! entitlement state in step with the remote service:
//!
//! - **ActionLock**: counting, file-backed exclusive lock for the pipeline
//! - **SyncStage**: the uniform update contract every local cache implements
//! - **SyncEngine**: ordered, fail-fast execution of the stage list
//! - **Settings**: TOML-backed daemon configuration with full defaults
//!
//! # Architecture
//!
//! `entsync-core` sits between the excluded remote collaborators and the
//! host daemon:
//!
//! ```text
//!          daemon / scheduler
//!                  |
//!             entsync-core
//!                  |
//!     +------------+------------+
//!     |            |            |
//! entsync-facts  entsync-identity  entsync-watch
//! ```
//!
//! Stage implementations (repository config, software profile, installed
//! products, healing, certificate fetch) are external collaborators that
//! plug in through [`SyncStage`].

pub mod engine;
pub mod error;
pub mod lock;
pub mod logging;
pub mod mode;
pub mod settings;
pub mod stage;

pub use engine::{SyncEngine, SyncReport, Stages, clean_stage_error};
pub use error::{Error, Result};
pub use lock::{ActionLock, LockGuard};
pub use mode::Mode;
pub use settings::Settings;
pub use stage::{StageOutcome, SyncStage};
