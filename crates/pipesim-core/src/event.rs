use crate::fault::PipelineFault;
use crate::instruction::Instruction;
use crate::stats::PipelineStage;

/// One unit of pipeline work deferred to the next clock tick.
///
/// The dispatcher charges exactly one cycle per consumed event, so the chain
/// of events an instruction produces is its latency beyond the decode cycle.
/// Binary computation always completes inside the second-operand-fetch
/// handler; there is no separate execute event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ExecutionEvent {
    /// First operand lives in memory and must be fetched next cycle.
    Op1Fetch {
        /// Instruction being driven through the pipeline.
        instr: Instruction,
    },
    /// Second operand lives in memory; the first is already resolved.
    Op2Fetch {
        /// Instruction being driven through the pipeline.
        instr: Instruction,
        /// Resolved first-operand value.
        op1: i32,
    },
    /// Result is computed but the destination is memory; storing takes its
    /// own cycle.
    Writeback {
        /// Instruction being driven through the pipeline.
        instr: Instruction,
        /// Computed full-width result; truncated to the cell width on store.
        result: i32,
    },
    /// The instruction is malformed; the exception sink retires it.
    Exception {
        /// Diagnosed cause of the fault.
        fault: PipelineFault,
    },
}

impl ExecutionEvent {
    /// Returns the accounting stage charged when this event is consumed.
    #[must_use]
    pub const fn stage(&self) -> PipelineStage {
        match self {
            Self::Op1Fetch { .. } => PipelineStage::OperandOneFetch,
            Self::Op2Fetch { .. } => PipelineStage::OperandTwoFetch,
            Self::Writeback { .. } => PipelineStage::Writeback,
            Self::Exception { .. } => PipelineStage::Exception,
        }
    }
}
