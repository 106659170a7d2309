use crate::fault::PipelineFault;
use crate::source::{CellAddress, Register, Source, MEMORY_CELLS, REGISTER_COUNT};
use crate::stats::StageCounters;

/// The complete simulated machine: storage, clock, and stage accounting.
///
/// One instance is created for a run and mutated in place across the entire
/// instruction stream. Everything except [`Machine::execute`] and the storage
/// setters is read-only from the host's perspective between instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Machine {
    pub(crate) regs: [u8; REGISTER_COUNT],
    pub(crate) memory: Box<[u8]>,
    pub(crate) clock: u64,
    pub(crate) retired: u64,
    pub(crate) counters: StageCounters,
    pub(crate) last_fault: Option<PipelineFault>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Creates a machine in its power-on state: all storage zeroed, clock and
    /// counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: [0; REGISTER_COUNT],
            memory: vec![0; MEMORY_CELLS].into_boxed_slice(),
            clock: 0,
            retired: 0,
            counters: StageCounters::new(),
            last_fault: None,
        }
    }

    /// Restores the power-on state, clearing storage, clock, counters, and
    /// any latched fault.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Reads one register.
    #[must_use]
    pub const fn register(&self, reg: Register) -> u8 {
        self.regs[reg.index()]
    }

    /// Writes one register.
    pub const fn set_register(&mut self, reg: Register, value: u8) {
        self.regs[reg.index()] = value;
    }

    /// Reads one memory cell.
    #[must_use]
    pub fn cell(&self, addr: CellAddress) -> u8 {
        self.memory[addr.index()]
    }

    /// Writes one memory cell.
    pub fn set_cell(&mut self, addr: CellAddress, value: u8) {
        self.memory[addr.index()] = value;
    }

    /// Full register-file view.
    #[must_use]
    pub const fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.regs
    }

    /// Full memory view.
    #[must_use]
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Monotonic cycle counter.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.clock
    }

    /// Number of instructions driven to retirement, faulted ones included.
    #[must_use]
    pub const fn instructions_retired(&self) -> u64 {
        self.retired
    }

    /// Per-stage visit counters.
    #[must_use]
    pub const fn stage_counters(&self) -> StageCounters {
        self.counters
    }

    /// Most recently diagnosed malformed-instruction fault, if any.
    #[must_use]
    pub const fn last_fault(&self) -> Option<PipelineFault> {
        self.last_fault
    }

    /// Resolves a source to its raw value, zero-extended to full width.
    ///
    /// Pure storage access: no side effects and no cycle charge. The pipeline
    /// charges cycles when it decides a value needed a deferred fetch.
    #[must_use]
    pub fn read_source(&self, source: Source) -> i32 {
        match source {
            Source::Direct(reg) => i32::from(self.register(reg)),
            Source::Indirect(addr) => i32::from(self.cell(addr)),
            Source::Immediate(value) => value,
        }
    }

    /// Stores the low 8 bits of `value` into the location a source names.
    ///
    /// # Panics
    ///
    /// Panics when `source` is an [`Source::Immediate`]: a literal is not a
    /// location, so reaching this path is a logic fault in the caller. The
    /// pipeline never triggers it — immediate destinations are intercepted at
    /// the writeback decision and downgraded to a recoverable exception.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn write_source(&mut self, source: Source, value: i32) {
        // Stores wrap to the 8-bit cell width.
        let byte = value as u8;
        match source {
            Source::Direct(reg) => self.set_register(reg, byte),
            Source::Indirect(addr) => self.set_cell(addr, byte),
            Source::Immediate(_) => {
                panic!("writing to an immediate source is prohibited by logic")
            }
        }
    }
}
