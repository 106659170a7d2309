use thiserror::Error;

use crate::instruction::InstructionKind;

/// Recoverable malformed-instruction faults raised by the pipeline.
///
/// A fault retires the offending instruction through the exception stage: it
/// is counted, latched, and the run continues with the next instruction. The
/// faulted instruction performs no writeback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PipelineFault {
    /// A single-operand instruction reached the second-operand fetch stage.
    #[error("{0} instruction reached the second-operand fetch stage")]
    UnexpectedOperandFetch(InstructionKind),
    /// The writeback destination is an embedded literal.
    #[error("{0} instruction targets an immediate value for writeback")]
    ImmediateDestination(InstructionKind),
}

#[cfg(test)]
mod tests {
    use super::PipelineFault;
    use crate::instruction::InstructionKind;

    #[test]
    fn fault_messages_name_the_offending_kind() {
        assert_eq!(
            PipelineFault::UnexpectedOperandFetch(InstructionKind::Unary).to_string(),
            "unary instruction reached the second-operand fetch stage"
        );
        assert_eq!(
            PipelineFault::ImmediateDestination(InstructionKind::Jump).to_string(),
            "jump instruction targets an immediate value for writeback"
        );
    }
}
