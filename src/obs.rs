//! Optional observability helpers for switchboard operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `consent_switch.op` with the `op` (engine
//!   operation) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `consent_switch_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Engine operations observed by the switchboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineOp {
	/// Transport decision + hand-off construction.
	Dispatch,
	/// Raw-return reconciliation.
	Reconcile,
}
impl EngineOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EngineOp::Dispatch => "dispatch",
			EngineOp::Reconcile => "reconcile",
		}
	}
}
impl Display for EngineOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a switchboard operation.
	Attempt,
	/// Completion with a usable value (including business-level cancellations).
	Success,
	/// Completion with a failure value.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
