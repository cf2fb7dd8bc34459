//! Cycle budgets, suspend/resume equivalence, single-step mode, and
//! terminal-state stickiness.

use vex64_core::{Emulator, ExecMode, ExecutionState, StopReason};

use crate::common::{TestMachine, GENEROUS_BUDGET};

const LOOP_PROGRAM: &str = "global main\nsegment text\nmain:\n  xor eax, eax\n  mov ecx, 1\n\
    again:\n  add eax, ecx\n  inc ecx\n  cmp ecx, 100\n  jle again\n  ret\n";

#[test]
fn uninitialized_emulator_reports_not_running() {
    let mut emu = Emulator::new();
    assert_eq!(emu.get_state(), &ExecutionState::Uninitialized);
    assert_eq!(emu.execute_cycles(100), (0, StopReason::NotRunning));
}

#[test]
fn budget_exhaustion_suspends_within_bound() {
    let mut m = TestMachine::boot(LOOP_PROGRAM);
    let (executed, reason) = m.emu.execute_cycles(10);
    assert_eq!(reason, StopReason::BudgetExhausted);
    assert!(executed <= 10);
    assert_eq!(m.emu.get_state(), &ExecutionState::Suspended);
}

#[test]
fn resumed_run_matches_one_unbounded_run() {
    let mut chunked = TestMachine::boot(LOOP_PROGRAM);
    let mut total = 0u64;
    let code = loop {
        let (executed, reason) = chunked.emu.execute_cycles(7);
        total += executed;
        match reason {
            StopReason::BudgetExhausted => {}
            StopReason::Terminated(code) => break code,
            other => panic!("unexpected stop: {other:?}"),
        }
    };

    let mut straight = TestMachine::boot(LOOP_PROGRAM);
    let (executed, reason) = straight.emu.execute_cycles(GENEROUS_BUDGET);
    assert_eq!(reason, StopReason::Terminated(code));
    assert_eq!(executed, total);
    assert_eq!(straight.emu.cycles(), chunked.emu.cycles());
    assert_eq!(code, 5050);
}

#[test]
fn terminal_state_is_sticky() {
    let mut m = TestMachine::boot("global main\nsegment text\nmain:\n  mov eax, 4\n  ret\n");
    assert_eq!(m.run_to_exit(), 4);
    let cycles = m.emu.cycles();

    // Repeated calls are defined no-ops reporting the same outcome.
    assert_eq!(m.emu.execute_cycles(100), (0, StopReason::Terminated(4)));
    assert_eq!(m.emu.execute_cycles(100), (0, StopReason::Terminated(4)));
    assert_eq!(m.emu.get_return_value(), Some(4));
    assert_eq!(m.emu.cycles(), cycles);
}

#[test]
fn error_state_is_sticky_too() {
    let mut m = TestMachine::boot("global main\nsegment text\nmain:\n  mov rax, [0]\n");
    let (_, first) = m.emu.execute_cycles(GENEROUS_BUDGET);
    let StopReason::Fault(fault) = first else {
        panic!("expected a fault, got {first:?}");
    };
    assert_eq!(m.emu.execute_cycles(100), (0, StopReason::Fault(fault.clone())));
    assert_eq!(m.emu.get_error(), Some(&fault));
}

#[test]
fn single_step_retires_exactly_one_instruction() {
    let mut m = TestMachine::boot(LOOP_PROGRAM);
    m.emu.set_exec_mode(ExecMode::SingleStep);
    assert_eq!(m.emu.exec_mode(), ExecMode::SingleStep);

    let ip_before = m.emu.instruction_pointer();
    let (executed, reason) = m.emu.execute_cycles(GENEROUS_BUDGET);
    assert_eq!((executed, reason), (1, StopReason::SingleStep));
    assert_eq!(m.emu.get_state(), &ExecutionState::Suspended);
    assert_ne!(m.emu.instruction_pointer(), ip_before);
    assert_eq!(m.emu.cycles(), 1);
}

#[test]
fn single_step_still_reports_termination() {
    let mut m = TestMachine::boot("global main\nsegment text\nmain:\n  mov eax, 2\n  ret\n");
    m.emu.set_exec_mode(ExecMode::SingleStep);
    assert_eq!(m.emu.execute_cycles(10), (1, StopReason::SingleStep)); // mov
    assert_eq!(m.emu.execute_cycles(10), (1, StopReason::SingleStep)); // ret
    // The next call lands on the exit vector.
    assert_eq!(m.emu.execute_cycles(10), (0, StopReason::Terminated(2)));
}

#[test]
fn stepping_then_free_running_finishes_the_program() {
    let mut m = TestMachine::boot(LOOP_PROGRAM);
    m.emu.set_exec_mode(ExecMode::SingleStep);
    for _ in 0..5 {
        let (_, reason) = m.emu.execute_cycles(1);
        assert_eq!(reason, StopReason::SingleStep);
    }
    m.emu.set_exec_mode(ExecMode::FreeRun);
    assert_eq!(m.run_to_exit(), 5050);
}

#[test]
fn zero_budget_suspends_without_progress() {
    let mut m = TestMachine::boot(LOOP_PROGRAM);
    let ip = m.emu.instruction_pointer();
    assert_eq!(m.emu.execute_cycles(0), (0, StopReason::BudgetExhausted));
    assert_eq!(m.emu.instruction_pointer(), ip);
}

#[test]
fn init_resets_a_finished_machine() {
    let exe = crate::common::build(&[(
        "again.asm",
        "global main\nsegment text\nmain:\n  mov eax, 1\n  ret\n",
    )]);
    let mut emu = Emulator::new();
    let config = vex64_core::MachineConfig::default();
    emu.init(&exe, &config).unwrap();
    let (_, reason) = emu.execute_cycles(GENEROUS_BUDGET);
    assert_eq!(reason, StopReason::Terminated(1));

    emu.init(&exe, &config).unwrap();
    assert_eq!(emu.cycles(), 0);
    let (_, reason) = emu.execute_cycles(GENEROUS_BUDGET);
    assert_eq!(reason, StopReason::Terminated(1));
}
