use core::fmt;

use crate::source::{Register, Source};

/// Arithmetic operation selector for binary instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BinaryOp {
    /// `result = op1 + op2`.
    Add,
    /// `result = op1 - op2`.
    Sub,
}

impl BinaryOp {
    /// Applies the operation to two resolved operand values.
    ///
    /// The intermediate is full-width; truncation to the 8-bit cell happens
    /// only at writeback, so overflow never traps.
    #[must_use]
    pub const fn apply(self, op1: i32, op2: i32) -> i32 {
        match self {
            Self::Add => op1.wrapping_add(op2),
            Self::Sub => op1.wrapping_sub(op2),
        }
    }
}

/// One instruction of the toy machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Instruction {
    /// Identity move: `res = op1`.
    Unary {
        /// Operand to move.
        op1: Source,
        /// Destination of the result.
        res: Source,
    },
    /// Arithmetic: `res = op1 <op> op2`.
    Binary {
        /// First operand.
        op1: Source,
        /// Second operand.
        op2: Source,
        /// Destination of the result.
        res: Source,
        /// Operation applied to the two operands.
        op: BinaryOp,
    },
    /// Jump-target passthrough: the resolved offset is written into
    /// register 0, irrespective of any destination field.
    Jump {
        /// Jump offset operand.
        offset: Source,
    },
}

impl Instruction {
    /// Returns the kind tag used for dispatch and fault diagnostics.
    #[must_use]
    pub const fn kind(&self) -> InstructionKind {
        match self {
            Self::Unary { .. } => InstructionKind::Unary,
            Self::Binary { .. } => InstructionKind::Binary,
            Self::Jump { .. } => InstructionKind::Jump,
        }
    }

    /// Returns the source resolved first by the pipeline: `op1` for unary and
    /// binary instructions, the offset for jumps.
    #[must_use]
    pub const fn first_operand(&self) -> Source {
        match self {
            Self::Unary { op1, .. } | Self::Binary { op1, .. } => *op1,
            Self::Jump { offset } => *offset,
        }
    }

    /// Returns the effective result destination.
    ///
    /// Jumps always target register 0; their own fields carry no destination.
    #[must_use]
    pub const fn destination(&self) -> Source {
        match self {
            Self::Unary { res, .. } | Self::Binary { res, .. } => *res,
            Self::Jump { .. } => Source::Direct(Register::R0),
        }
    }
}

/// Discriminant-only view of an instruction, carried in fault diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InstructionKind {
    /// Identity move.
    Unary,
    /// Add/sub arithmetic.
    Binary,
    /// Jump-target passthrough.
    Jump,
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unary => "unary",
            Self::Binary => "binary",
            Self::Jump => "jump",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{BinaryOp, Instruction, InstructionKind};
    use crate::source::{Register, Source};

    #[test]
    fn binary_op_applies_add_and_sub() {
        assert_eq!(BinaryOp::Add.apply(200, 100), 300);
        assert_eq!(BinaryOp::Sub.apply(3, 5), -2);
    }

    #[test]
    fn binary_op_intermediate_wraps_at_full_width() {
        assert_eq!(BinaryOp::Add.apply(i32::MAX, 1), i32::MIN);
        assert_eq!(BinaryOp::Sub.apply(i32::MIN, 1), i32::MAX);
    }

    #[test]
    fn first_operand_tracks_instruction_shape() {
        let op1 = Source::immediate(3);
        let other = Source::immediate(9);

        let unary = Instruction::Unary { op1, res: other };
        let binary = Instruction::Binary {
            op1,
            op2: other,
            res: other,
            op: BinaryOp::Add,
        };
        let jump = Instruction::Jump { offset: op1 };

        assert_eq!(unary.first_operand(), op1);
        assert_eq!(binary.first_operand(), op1);
        assert_eq!(jump.first_operand(), op1);
    }

    #[test]
    fn jump_destination_is_register_zero() {
        let jump = Instruction::Jump {
            offset: Source::immediate(42),
        };
        assert_eq!(jump.destination(), Source::Direct(Register::R0));
    }

    #[test]
    fn declared_destinations_pass_through_for_unary_and_binary() {
        let res = Source::indirect(7).expect("in-range cell");
        let unary = Instruction::Unary {
            op1: Source::immediate(0),
            res,
        };
        assert_eq!(unary.destination(), res);
    }

    #[test]
    fn kind_tags_and_names_match_variants() {
        let jump = Instruction::Jump {
            offset: Source::immediate(0),
        };
        assert_eq!(jump.kind(), InstructionKind::Jump);
        assert_eq!(InstructionKind::Unary.to_string(), "unary");
        assert_eq!(InstructionKind::Binary.to_string(), "binary");
        assert_eq!(InstructionKind::Jump.to_string(), "jump");
    }
}
