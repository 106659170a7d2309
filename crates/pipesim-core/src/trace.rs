use crate::fault::PipelineFault;
use crate::instruction::InstructionKind;
use crate::stats::PipelineStage;

/// Deterministic events emitted while an instruction walks the pipeline.
///
/// Tracing is purely observational and fires in simulated-clock order; the
/// `cycle` field is the global counter value at the moment the event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// The decode cycle of a new instruction was charged.
    InstructionIssued {
        /// Clock value after the decode cycle.
        cycle: u64,
        /// Kind of the issued instruction.
        kind: InstructionKind,
    },
    /// A deferred event was consumed and its stage handler entered.
    StageEntered {
        /// Clock value for the stage's cycle.
        cycle: u64,
        /// Stage being charged.
        stage: PipelineStage,
    },
    /// The exception sink diagnosed a malformed instruction.
    FaultRaised {
        /// Clock value when the fault was observed.
        cycle: u64,
        /// Diagnosed fault.
        fault: PipelineFault,
    },
    /// The instruction reached quiescence.
    InstructionRetired {
        /// Clock value at retirement.
        cycle: u64,
        /// Total cycles this instruction consumed, decode included.
        cycles_taken: u64,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that discards every event; used by the untraced execute path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}
