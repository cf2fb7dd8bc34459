//! Whole-program runs through the assemble-link-execute pipeline.

use vex64_core::common::Fault;
use vex64_core::{ExecutionState, StopReason};

use crate::common::{build, TestMachine, GENEROUS_BUDGET};

#[test]
fn demo_program_returns_nine() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov edi, 5\n  mov esi, 4\n  add edi, esi\n  mov eax, edi\n  ret\n",
    );
    assert_eq!(m.run_to_exit(), 9);
    assert_eq!(m.emu.get_state(), &ExecutionState::Terminated(9));
    assert_eq!(m.emu.get_return_value(), Some(9));
}

#[test]
fn multi_module_call_through_extern() {
    let exe = build(&[
        (
            "app.asm",
            "global main\nextern double\nsegment text\nmain:\n  mov edi, 21\n  call double\n  mov eax, edi\n  ret\n",
        ),
        ("lib.asm", "global double\nsegment text\ndouble:\n  add edi, edi\n  ret\n"),
    ]);
    let mut emu = vex64_core::Emulator::new();
    emu.init(&exe, &vex64_core::MachineConfig::default()).unwrap();
    let (_, reason) = emu.execute_cycles(GENEROUS_BUDGET);
    assert_eq!(reason, StopReason::Terminated(42));
}

#[test]
fn conditional_loop_sums_one_to_ten() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  xor eax, eax\n  mov ecx, 1\n\
         again:\n  add eax, ecx\n  inc ecx\n  cmp ecx, 10\n  jle again\n  ret\n",
    );
    assert_eq!(m.run_to_exit(), 55);
}

#[test]
fn data_segment_reads_and_writes() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov rax, [value]\n  add rax, 1\n  mov [value], rax\n  mov rbx, [value]\n  mov eax, ebx\n  ret\nsegment data\nvalue: dq 41\n",
    );
    assert_eq!(m.run_to_exit(), 42);
}

#[test]
fn bss_starts_zeroed() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov eax, [counter]\n  ret\nsegment bss\ncounter: resd 1\n",
    );
    assert_eq!(m.run_to_exit(), 0);
}

#[test]
fn lea_computes_without_touching_memory() {
    // lea of an address below the null guard must not fault.
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov rbx, 7\n  lea rax, [rbx + 35]\n  ret\n",
    );
    assert_eq!(m.run_to_exit(), 42);
}

#[test]
fn stdlib_exit_terminates_with_status() {
    let mut m = TestMachine::boot(
        "global main\nextern exit\nsegment text\nmain:\n  mov edi, 3\n  jmp exit\n",
    );
    assert_eq!(m.run_to_exit(), 3);
}

#[test]
fn stdlib_abort_terminates_with_101() {
    let mut m =
        TestMachine::boot("global main\nextern abort\nsegment text\nmain:\n  jmp abort\n");
    assert_eq!(m.run_to_exit(), 101);
}

#[test]
fn high_byte_registers_address_bits_15_to_8() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov rax, 0\n  mov ah, 2\n  mov al, 3\n  ret\n",
    );
    // eax = 0x0203 = 515
    assert_eq!(m.run_to_exit(), 0x0203);
}

#[test]
fn division_by_zero_faults() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov eax, 10\n  mov ebx, 0\n  div eax, ebx\n  ret\n",
    );
    let (_, reason) = m.emu.execute_cycles(GENEROUS_BUDGET);
    assert!(
        matches!(reason, StopReason::Fault(Fault::ArithmeticFault { .. })),
        "{reason:?}"
    );
    assert!(matches!(m.emu.get_error(), Some(Fault::ArithmeticFault { .. })));
}

#[test]
fn null_dereference_faults() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov rax, [0]\n  ret\n",
    );
    let (_, reason) = m.emu.execute_cycles(GENEROUS_BUDGET);
    assert!(
        matches!(reason, StopReason::Fault(Fault::MemoryViolation { addr: 0, .. })),
        "{reason:?}"
    );
}

#[test]
fn store_to_text_faults() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov qword [main], 0\n  ret\n",
    );
    let (_, reason) = m.emu.execute_cycles(GENEROUS_BUDGET);
    assert!(
        matches!(reason, StopReason::Fault(Fault::ReadOnlyViolation { .. })),
        "{reason:?}"
    );
}

#[test]
fn runaway_recursion_overflows_the_stack() {
    let mut m = TestMachine::boot("global main\nsegment text\nmain:\n  call main\n");
    let (_, reason) = m.emu.execute_cycles(GENEROUS_BUDGET);
    assert!(matches!(reason, StopReason::Fault(Fault::StackOverflow { .. })), "{reason:?}");
}

#[test]
fn unknown_syscall_number_faults() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov rax, 99\n  syscall\n  ret\n",
    );
    let (_, reason) = m.emu.execute_cycles(GENEROUS_BUDGET);
    assert_eq!(reason, StopReason::Fault(Fault::UnknownSyscall { number: 99 }));
}

#[test]
fn hlt_is_privileged() {
    let mut m = TestMachine::boot("global main\nsegment text\nmain:\n  hlt\n");
    let (_, reason) = m.emu.execute_cycles(GENEROUS_BUDGET);
    assert!(
        matches!(reason, StopReason::Fault(Fault::PrivilegeViolation { iopl: 0, .. })),
        "{reason:?}"
    );
}

#[test]
fn hlt_terminates_at_full_privilege() {
    let mut m =
        TestMachine::boot("global main\nsegment text\nmain:\n  mov eax, 7\n  hlt\n");
    m.emu.flags.assign_iopl(3).unwrap();
    let (_, reason) = m.emu.execute_cycles(GENEROUS_BUDGET);
    assert_eq!(reason, StopReason::Terminated(7));
}

#[test]
fn sti_requires_privilege_but_clc_does_not() {
    let mut m = TestMachine::boot("global main\nsegment text\nmain:\n  clc\n  sti\n");
    let (_, reason) = m.emu.execute_cycles(GENEROUS_BUDGET);
    assert!(
        matches!(reason, StopReason::Fault(Fault::PrivilegeViolation { .. })),
        "{reason:?}"
    );
}

#[test]
fn shifts_through_cl_and_immediates() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov eax, 1\n  mov cl, 4\n  shl eax, cl\n  shr eax, 1\n  ret\n",
    );
    assert_eq!(m.run_to_exit(), 8);
}

#[test]
fn signed_division_rounds_toward_zero() {
    let mut m = TestMachine::boot(
        "global main\nsegment text\nmain:\n  mov eax, 7\n  neg eax\n  mov ebx, 2\n  idiv eax, ebx\n  neg eax\n  ret\n",
    );
    // -7 / 2 == -3
    assert_eq!(m.run_to_exit(), 3);
}
