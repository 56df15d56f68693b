//! `movement-recon`: daily stock movement reconciliation.
//!
//! Pure engine crate: receives rows exported from the movement view, returns
//! reconciled records with a MATCH/MISMATCH status under an explicit policy.
//! No database or UI dependencies.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod export;
pub mod filter;
pub mod model;
pub mod quantity;

pub use config::{MatchPolicy, ReconConfig};
pub use engine::{reconcile, reconcile_batch, run};
pub use error::ReconError;
pub use evidence::aggregate_mismatch_count;
pub use filter::MovementFilter;
pub use model::{MovementRecord, MovementResult, RawMovement, StockStatus};
