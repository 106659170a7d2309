//! The pipeline event state machine.
//!
//! `execute` charges one decode cycle, resolves the first operand, and then
//! chases deferred events to quiescence: every consumed event costs exactly
//! one cycle, and its handler either retires the instruction or yields the
//! follow-up event. The chase is a plain loop; an instruction spans at most
//! four stages, so no recursion or task machinery is involved.

use crate::event::ExecutionEvent;
use crate::fault::PipelineFault;
use crate::instruction::{Instruction, InstructionKind};
use crate::machine::Machine;
use crate::source::Source;
use crate::trace::{NullTrace, TraceEvent, TraceSink};

impl Machine {
    /// Drives one instruction to retirement.
    ///
    /// Returns only once the pipeline is quiescent, so the host observes a
    /// fully retired instruction between calls. Malformed instructions retire
    /// through the exception sink; the run continues unaffected.
    pub fn execute(&mut self, instr: Instruction) {
        self.execute_traced(instr, &mut NullTrace);
    }

    /// Drives one instruction to retirement, reporting each pipeline step to
    /// the given trace sink in simulated-clock order.
    pub fn execute_traced(&mut self, instr: Instruction, trace: &mut dyn TraceSink) {
        let issued_at = self.clock;

        // Instruction fetch + decode cycle.
        self.clock = self.clock.saturating_add(1);
        trace.on_event(TraceEvent::InstructionIssued {
            cycle: self.clock,
            kind: instr.kind(),
        });

        let mut pending = self.issue(instr);
        while let Some(event) = pending {
            self.clock = self.clock.saturating_add(1);
            pending = self.advance(event, trace);
        }

        self.retired = self.retired.saturating_add(1);
        trace.on_event(TraceEvent::InstructionRetired {
            cycle: self.clock,
            cycles_taken: self.clock - issued_at,
        });
    }

    /// First-operand resolution on the decode cycle.
    ///
    /// Register and immediate operands are available combinationally, so the
    /// walk continues inside the same cycle. A memory operand needs a cycle
    /// of its own and defers to `Op1Fetch`.
    fn issue(&mut self, instr: Instruction) -> Option<ExecutionEvent> {
        match instr.first_operand() {
            Source::Indirect(_) => Some(ExecutionEvent::Op1Fetch { instr }),
            src @ (Source::Direct(_) | Source::Immediate(_)) => {
                let op1 = self.read_source(src);
                match instr.kind() {
                    InstructionKind::Binary => self.resolve_second_operand(instr, op1),
                    InstructionKind::Unary | InstructionKind::Jump => {
                        self.writeback_decision(instr, op1)
                    }
                }
            }
        }
    }

    /// Consumes one deferred event, charging its stage, and returns the
    /// follow-up event if the instruction has further work.
    fn advance(
        &mut self,
        event: ExecutionEvent,
        trace: &mut dyn TraceSink,
    ) -> Option<ExecutionEvent> {
        let stage = event.stage();
        self.counters.record(stage);
        trace.on_event(TraceEvent::StageEntered {
            cycle: self.clock,
            stage,
        });

        match event {
            ExecutionEvent::Op1Fetch { instr } => {
                let op1 = self.read_source(instr.first_operand());
                match instr.kind() {
                    InstructionKind::Binary => self.resolve_second_operand(instr, op1),
                    InstructionKind::Unary => self.writeback_decision(instr, op1),
                    // Caution: this bypasses the writeback-deferral check the
                    // other kinds go through. Harmless while jumps can only
                    // target register 0, but it must be reconciled with
                    // `writeback_decision` before jumps may target memory.
                    InstructionKind::Jump => {
                        Some(ExecutionEvent::Writeback { instr, result: op1 })
                    }
                }
            }
            ExecutionEvent::Op2Fetch { instr, op1 } => match instr {
                Instruction::Binary { op2, op, .. } => {
                    let op2 = self.read_source(op2);
                    self.writeback_decision(instr, op.apply(op1, op2))
                }
                Instruction::Unary { .. } | Instruction::Jump { .. } => {
                    Some(ExecutionEvent::Exception {
                        fault: PipelineFault::UnexpectedOperandFetch(instr.kind()),
                    })
                }
            },
            ExecutionEvent::Writeback { instr, result } => {
                // Destinations reaching this handler are memory cells, or
                // register 0 for jumps; never an immediate.
                self.write_source(instr.destination(), result);
                None
            }
            ExecutionEvent::Exception { fault } => {
                self.last_fault = Some(fault);
                trace.on_event(TraceEvent::FaultRaised {
                    cycle: self.clock,
                    fault,
                });
                None
            }
        }
    }

    /// Second-operand resolution for binary instructions.
    ///
    /// A combinational operand lets the result be computed in the current
    /// cycle; a memory operand defers to `Op2Fetch`. Single-operand kinds
    /// have no business here and fall through to the exception sink.
    fn resolve_second_operand(&mut self, instr: Instruction, op1: i32) -> Option<ExecutionEvent> {
        let Instruction::Binary { op2, op, .. } = instr else {
            return Some(ExecutionEvent::Exception {
                fault: PipelineFault::UnexpectedOperandFetch(instr.kind()),
            });
        };

        match op2 {
            Source::Indirect(_) => Some(ExecutionEvent::Op2Fetch { instr, op1 }),
            src @ (Source::Direct(_) | Source::Immediate(_)) => {
                let op2 = self.read_source(src);
                self.writeback_decision(instr, op.apply(op1, op2))
            }
        }
    }

    /// Decides whether a computed result can be stored this cycle.
    ///
    /// Register destinations store immediately and retire; memory
    /// destinations defer to a `Writeback` event; an immediate destination is
    /// malformed and converts to an exception instead of a store.
    fn writeback_decision(&mut self, instr: Instruction, result: i32) -> Option<ExecutionEvent> {
        match instr.destination() {
            dest @ Source::Direct(_) => {
                self.write_source(dest, result);
                None
            }
            Source::Indirect(_) => Some(ExecutionEvent::Writeback { instr, result }),
            Source::Immediate(_) => Some(ExecutionEvent::Exception {
                fault: PipelineFault::ImmediateDestination(instr.kind()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::BinaryOp;
    use crate::source::{CellAddress, Register};
    use crate::stats::PipelineStage;

    fn direct(index: u8) -> Source {
        Source::direct(index).expect("in-range register")
    }

    fn indirect(addr: u16) -> Source {
        Source::indirect(addr).expect("in-range cell")
    }

    fn reg(index: u8) -> Register {
        Register::new(index).expect("in-range register")
    }

    fn cell(addr: u16) -> CellAddress {
        CellAddress::new(addr).expect("in-range cell")
    }

    /// Sink that records every event for ordering assertions.
    #[derive(Default)]
    struct Recorder {
        events: Vec<TraceEvent>,
    }

    impl TraceSink for Recorder {
        fn on_event(&mut self, event: TraceEvent) {
            self.events.push(event);
        }
    }

    #[test]
    fn immediate_move_to_register_takes_one_cycle() {
        let mut machine = Machine::new();
        machine.execute(Instruction::Unary {
            op1: Source::Immediate(5),
            res: direct(3),
        });

        assert_eq!(machine.register(reg(3)), 5);
        assert_eq!(machine.cycles(), 1);
        assert_eq!(machine.stage_counters(), crate::StageCounters::default());
    }

    #[test]
    fn indirect_second_operand_adds_one_fetch_cycle() {
        let mut machine = Machine::new();
        machine.set_register(reg(1), 10);
        machine.set_cell(cell(4), 20);

        machine.execute(Instruction::Binary {
            op1: direct(1),
            op2: indirect(4),
            res: direct(2),
            op: BinaryOp::Add,
        });

        assert_eq!(machine.register(reg(2)), 30);
        assert_eq!(machine.cycles(), 2);
        assert_eq!(machine.stage_counters().fetch2, 1);
        assert_eq!(machine.stage_counters().fetch1, 0);
        assert_eq!(machine.stage_counters().writeback, 0);
    }

    #[test]
    fn memory_to_memory_move_takes_three_cycles() {
        let mut machine = Machine::new();
        machine.set_cell(cell(0), 7);

        machine.execute(Instruction::Unary {
            op1: indirect(0),
            res: indirect(1),
        });

        assert_eq!(machine.cell(cell(1)), 7);
        assert_eq!(machine.cycles(), 3);
        assert_eq!(machine.stage_counters().fetch1, 1);
        assert_eq!(machine.stage_counters().writeback, 1);
    }

    #[test]
    fn fully_indirect_binary_shape_takes_four_cycles() {
        let mut machine = Machine::new();
        machine.set_cell(cell(1), 200);
        machine.set_cell(cell(2), 100);

        machine.execute(Instruction::Binary {
            op1: indirect(1),
            op2: indirect(2),
            res: indirect(3),
            op: BinaryOp::Add,
        });

        // 300 truncates to the 8-bit cell width at writeback.
        assert_eq!(machine.cell(cell(3)), 44);
        assert_eq!(machine.cycles(), 4);

        let counters = machine.stage_counters();
        assert_eq!(counters.fetch1, 1);
        assert_eq!(counters.fetch2, 1);
        assert_eq!(counters.writeback, 1);
        assert_eq!(counters.exceptions, 0);
    }

    #[test]
    fn subtraction_wraps_below_zero() {
        let mut machine = Machine::new();
        machine.set_register(reg(1), 3);
        machine.set_register(reg(2), 5);

        machine.execute(Instruction::Binary {
            op1: direct(1),
            op2: direct(2),
            res: direct(3),
            op: BinaryOp::Sub,
        });

        assert_eq!(machine.register(reg(3)), 254);
        assert_eq!(machine.cycles(), 1);
    }

    #[test]
    fn jump_with_register_offset_retires_in_one_cycle() {
        let mut machine = Machine::new();
        machine.set_register(reg(5), 0x42);

        machine.execute(Instruction::Jump { offset: direct(5) });

        assert_eq!(machine.register(Register::R0), 0x42);
        assert_eq!(machine.cycles(), 1);
        assert_eq!(machine.stage_counters().writeback, 0);
    }

    #[test]
    fn jump_with_memory_offset_spends_a_full_writeback_cycle() {
        let mut machine = Machine::new();
        machine.set_cell(cell(9), 0x17);

        machine.execute(Instruction::Jump { offset: indirect(9) });

        // The deferred jump path always resumes into a writeback cycle, even
        // though register 0 itself would store combinationally.
        assert_eq!(machine.register(Register::R0), 0x17);
        assert_eq!(machine.cycles(), 3);
        assert_eq!(machine.stage_counters().fetch1, 1);
        assert_eq!(machine.stage_counters().writeback, 1);
    }

    #[test]
    fn immediate_destination_faults_without_side_effects() {
        let mut machine = Machine::new();

        machine.execute(Instruction::Unary {
            op1: direct(0),
            res: Source::Immediate(1),
        });

        assert_eq!(machine.stage_counters().exceptions, 1);
        assert!(machine.registers().iter().all(|&byte| byte == 0));
        assert!(machine.memory().iter().all(|&byte| byte == 0));
        assert_eq!(
            machine.last_fault(),
            Some(PipelineFault::ImmediateDestination(InstructionKind::Unary))
        );

        // The run continues normally with the next instruction.
        machine.execute(Instruction::Unary {
            op1: Source::Immediate(5),
            res: direct(3),
        });
        assert_eq!(machine.register(reg(3)), 5);
    }

    #[test]
    fn binary_with_immediate_destination_faults_after_operand_fetches() {
        let mut machine = Machine::new();
        machine.set_cell(cell(2), 1);

        machine.execute(Instruction::Binary {
            op1: Source::Immediate(1),
            op2: indirect(2),
            res: Source::Immediate(0),
            op: BinaryOp::Add,
        });

        let counters = machine.stage_counters();
        assert_eq!(counters.fetch2, 1);
        assert_eq!(counters.exceptions, 1);
        assert_eq!(counters.writeback, 0);
        assert_eq!(
            machine.last_fault(),
            Some(PipelineFault::ImmediateDestination(InstructionKind::Binary))
        );
    }

    #[test]
    fn traced_walk_reports_stages_in_clock_order() {
        let mut machine = Machine::new();
        machine.set_cell(cell(0), 7);
        let mut recorder = Recorder::default();

        machine.execute_traced(
            Instruction::Unary {
                op1: indirect(0),
                res: indirect(1),
            },
            &mut recorder,
        );

        assert_eq!(
            recorder.events,
            vec![
                TraceEvent::InstructionIssued {
                    cycle: 1,
                    kind: InstructionKind::Unary,
                },
                TraceEvent::StageEntered {
                    cycle: 2,
                    stage: PipelineStage::OperandOneFetch,
                },
                TraceEvent::StageEntered {
                    cycle: 3,
                    stage: PipelineStage::Writeback,
                },
                TraceEvent::InstructionRetired {
                    cycle: 3,
                    cycles_taken: 3,
                },
            ]
        );
    }

    #[test]
    fn faulting_walk_emits_a_fault_event() {
        let mut machine = Machine::new();
        let mut recorder = Recorder::default();

        machine.execute_traced(
            Instruction::Unary {
                op1: direct(0),
                res: Source::Immediate(1),
            },
            &mut recorder,
        );

        let fault = PipelineFault::ImmediateDestination(InstructionKind::Unary);
        assert!(recorder.events.contains(&TraceEvent::FaultRaised {
            cycle: 2,
            fault
        }));
    }

    #[test]
    fn retired_count_includes_faulted_instructions() {
        let mut machine = Machine::new();
        machine.execute(Instruction::Unary {
            op1: direct(0),
            res: Source::Immediate(1),
        });
        machine.execute(Instruction::Jump {
            offset: Source::Immediate(0),
        });

        assert_eq!(machine.instructions_retired(), 2);
    }
}
