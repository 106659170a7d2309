/// Pipeline stage charged when a deferred event is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PipelineStage {
    /// Deferred first-operand memory fetch.
    OperandOneFetch,
    /// Deferred second-operand memory fetch.
    OperandTwoFetch,
    /// Deferred store of a result into memory.
    Writeback,
    /// Exception sink for malformed instructions.
    Exception,
}

/// Per-stage visit counters, purely observational.
///
/// Each counter increments exactly once per corresponding handler invocation
/// and never influences control flow or results. Hosts read them between
/// `execute` calls for utilization reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StageCounters {
    /// First-operand fetch handler invocations.
    pub fetch1: u64,
    /// Second-operand fetch handler invocations.
    pub fetch2: u64,
    /// Deferred writeback handler invocations.
    pub writeback: u64,
    /// Exception handler invocations.
    pub exceptions: u64,
}

impl StageCounters {
    /// Creates a zeroed counter block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Charges one visit to the given stage, saturating at the counter width.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record(&mut self, stage: PipelineStage) {
        let slot = match stage {
            PipelineStage::OperandOneFetch => &mut self.fetch1,
            PipelineStage::OperandTwoFetch => &mut self.fetch2,
            PipelineStage::Writeback => &mut self.writeback,
            PipelineStage::Exception => &mut self.exceptions,
        };
        *slot = slot.saturating_add(1);
    }

    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
