// self
use crate::obs::{EngineOp, OpOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(op: EngineOp, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"consent_switch_op_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}
