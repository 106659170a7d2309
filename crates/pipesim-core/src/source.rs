/// Number of architecturally visible one-byte registers.
pub const REGISTER_COUNT: usize = 16;
/// Number of addressable one-byte memory cells.
pub const MEMORY_CELLS: usize = 1024;

/// Validated register index (`0..16`).
///
/// Register values are held inside the CPU and are available combinationally;
/// reading or writing one never costs an extra cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Register(u8);

impl Register {
    /// Register 0, the fixed target of every jump. It stands in for a
    /// program counter.
    pub const R0: Self = Self(0);

    /// Wraps a raw register index, rejecting out-of-range values.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < REGISTER_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Returns the register-file index (`0..16`).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Validated memory-cell address (`0..1024`).
///
/// Memory sits behind the register file; an access always takes one extra
/// cycle relative to a register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CellAddress(u16);

impl CellAddress {
    /// Wraps a raw cell address, rejecting out-of-range values.
    #[must_use]
    pub const fn new(addr: u16) -> Option<Self> {
        if (addr as usize) < MEMORY_CELLS {
            Some(Self(addr))
        } else {
            None
        }
    }

    /// Returns the memory-array index (`0..1024`).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Describes where an operand or result value physically lives.
///
/// The variant decides both how a value is resolved and what it costs:
/// `Direct` and `Immediate` resolve combinationally in the current cycle,
/// while `Indirect` defers the access to the next clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Source {
    /// A register operand, read or written without latency.
    Direct(Register),
    /// A memory-cell operand; each access charges one extra cycle.
    Indirect(CellAddress),
    /// A literal embedded in the instruction. Valid only as a read source;
    /// the pipeline converts an immediate destination into an exception.
    Immediate(i32),
}

impl Source {
    /// Builds a register source from a raw index.
    #[must_use]
    pub const fn direct(reg: u8) -> Option<Self> {
        match Register::new(reg) {
            Some(reg) => Some(Self::Direct(reg)),
            None => None,
        }
    }

    /// Builds a memory source from a raw cell address.
    #[must_use]
    pub const fn indirect(addr: u16) -> Option<Self> {
        match CellAddress::new(addr) {
            Some(addr) => Some(Self::Indirect(addr)),
            None => None,
        }
    }

    /// Builds an embedded-literal source.
    #[must_use]
    pub const fn immediate(value: i32) -> Self {
        Self::Immediate(value)
    }
}
