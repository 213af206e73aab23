//! Goal planning engine.
//!
//! Goals are split into weekly tasks that unlock in dependency order. The
//! core (`store`, `dependencies`, `ordering`, `analytics`) is pure; every
//! mutation leaves it as a [`sync::MutationIntent`] and comes back from a
//! [`sync::SyncAdapter`] as a confirmed [`snapshot::Snapshot`].

pub mod analytics;
pub mod cli;
pub mod cli_handlers;
pub mod db;
pub mod dependencies;
pub mod error;
pub mod generate;
pub mod logging;
pub mod models;
pub mod ordering;
pub mod planner;
pub mod project;
pub mod snapshot;
pub mod store;
pub mod sync;
pub mod templates;
pub mod time_utils;
pub mod validation;

pub use error::{PlannerError, Result};
pub use planner::{MutationOutcome, NewTask, Planner};
