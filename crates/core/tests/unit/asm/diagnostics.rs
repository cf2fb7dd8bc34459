//! Assembler error reporting.
//!
//! Every rejection carries the module name, a 1-based line, a column,
//! and a message naming the offending construct.

use vex64_core::assemble;

fn err(source: &str) -> vex64_core::AssemblyError {
    assemble("diag.asm", source).expect_err("assembly should fail")
}

#[test]
fn unknown_mnemonic_names_the_word() {
    let e = err("segment text\nfrobnicate rax, 1\n");
    assert_eq!(e.module, "diag.asm");
    assert_eq!(e.line, 2);
    assert!(e.message.contains("unknown mnemonic `frobnicate`"), "{}", e.message);
}

#[test]
fn duplicate_label_rejected() {
    let e = err("segment text\nspot:\n  nop\nspot:\n  nop\n");
    assert_eq!(e.line, 4);
    assert!(e.message.contains("duplicate label `spot`"), "{}", e.message);
}

#[test]
fn code_before_any_segment_directive() {
    let e = err("nop\n");
    assert_eq!(e.line, 1);
    assert!(e.message.contains("no segment selected"), "{}", e.message);
}

#[test]
fn undefined_symbol_suggests_extern() {
    let e = err("segment text\nmain:\n  jmp nowhere\n");
    assert_eq!(e.line, 3);
    assert!(
        e.message.contains("undefined symbol `nowhere`") && e.message.contains("extern"),
        "{}",
        e.message
    );
}

#[test]
fn global_without_definition() {
    let e = err("global ghost\nsegment text\nmain:\n  ret\n");
    assert_eq!(e.line, 1);
    assert!(e.message.contains("`ghost` is never defined"), "{}", e.message);
}

#[test]
fn extern_defined_locally_is_contradictory() {
    let e = err("extern here\nsegment text\nhere:\n  ret\n");
    assert!(e.message.contains("`here` is defined in this module"), "{}", e.message);
}

#[test]
fn reserve_count_overflowing_bss_rejected() {
    let e = err("segment bss\nbuf: resq 0x2000000000000000\n");
    assert_eq!(e.line, 2);
    assert!(e.message.contains("overflows the bss segment"), "{}", e.message);
}

#[test]
fn alignment_above_the_cap_rejected() {
    let e = err("segment text\n  align 0x4000000000000000\n");
    assert_eq!(e.line, 2);
    assert!(e.message.contains("power of two between 1 and 4096"), "{}", e.message);
}

#[test]
fn data_directives_rejected_in_text() {
    let e = err("segment text\ndb 1, 2, 3\n");
    assert_eq!(e.line, 2);
}

#[test]
fn memory_to_memory_is_not_encodable() {
    let e = err("segment text\nmov qword [rax], [rbx]\n");
    assert!(e.message.contains("memory-to-memory"), "{}", e.message);
}

#[test]
fn immediate_destination_rejected() {
    let e = err("segment text\nadd 5, rax\n");
    assert!(e.message.contains("destination cannot be an immediate"), "{}", e.message);
}

#[test]
fn ambiguous_memory_size_needs_keyword() {
    let e = err("segment text\ninc [rax]\n");
    assert!(e.message.contains("operand size is ambiguous"), "{}", e.message);
}

#[test]
fn mismatched_register_sizes_disagree() {
    let e = err("segment text\nadd rax, ebx\n");
    assert!(e.message.contains("operand sizes disagree"), "{}", e.message);
}

#[test]
fn oversized_literal_rejected() {
    let e = err("segment text\nmov al, 300\n");
    assert!(e.message.contains("does not fit in 1 bytes"), "{}", e.message);
}

#[test]
fn shift_count_range_checked() {
    let e = err("segment text\nshl rax, 64\n");
    assert!(e.message.contains("shift count must be 0-63"), "{}", e.message);
}

#[test]
fn wrong_arity_reports_expected_count() {
    let e = err("segment text\nadd rax\n");
    assert!(e.message.contains("takes 2 operand(s), got 1"), "{}", e.message);
}

#[test]
fn column_points_into_the_line() {
    let e = err("segment text\n  jmp nowhere\n");
    assert!(e.col >= 3, "column was {}", e.col);
}
