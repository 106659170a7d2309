//! Cycle-accurate pipeline model for the pipesim toy machine.
//!
//! An instruction stream executes against a tiny register/memory machine;
//! per-instruction latency depends on where each operand and result lives.
//! Register and immediate operands resolve combinationally, memory operands
//! defer one clock tick each, and the event machine in [`Machine::execute`]
//! charges exactly one cycle per pipeline stage an instruction visits.

/// Operand/destination descriptors and storage geometry.
pub mod source;
pub use source::{CellAddress, Register, Source, MEMORY_CELLS, REGISTER_COUNT};

/// Instruction grammar and pure value semantics.
pub mod instruction;
pub use instruction::{BinaryOp, Instruction, InstructionKind};

/// Recoverable fault taxonomy for malformed instructions.
pub mod fault;
pub use fault::PipelineFault;

/// Pipeline-stage tokens deferred between clock ticks.
pub mod event;
pub use event::ExecutionEvent;

/// Stage-visit accounting.
pub mod stats;
pub use stats::{PipelineStage, StageCounters};

/// Deterministic trace hooks for pipeline observation.
pub mod trace;
pub use trace::{NullTrace, TraceEvent, TraceSink};

/// Machine state: registers, memory, clock, and counters.
pub mod machine;
pub use machine::Machine;

/// The pipeline event state machine driving instructions to retirement.
pub mod pipeline;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
