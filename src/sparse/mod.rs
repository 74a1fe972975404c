//! The sparse-item refresh engine.
//!
//! - [`predicates`]: single completeness checks
//! - [`policy`]: thresholds and toggles for one run
//! - [`classifier`]: per-kind combination of predicates into reasons
//! - [`selector`]: catalog query plus cooldown, window and blocklist filters
//! - [`orchestrator`]: the refresh loop with progress and cancellation
//! - [`tasks`]: the episode, season and series task descriptors

pub mod classifier;
pub mod orchestrator;
pub mod policy;
pub mod predicates;
pub mod progress;
pub mod selector;
pub mod tasks;

pub use classifier::{classify, Classification, Reason};
pub use orchestrator::{run, RunSummary};
pub use policy::Policy;
pub use progress::ProgressSender;
pub use selector::{select_candidates, Candidate};
pub use tasks::RefreshTask;
