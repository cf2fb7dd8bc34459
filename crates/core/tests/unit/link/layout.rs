//! Image layout: fixed segment bases, per-module placement, and
//! relocation patching.

use pretty_assertions::assert_eq;
use vex64_core::common::constants::{SEGMENT_ALIGN, TEXT_BASE};
use vex64_core::{assemble, link, SegmentKind};

fn modules(sources: &[(&str, &str)]) -> Vec<vex64_core::ObjectModule> {
    sources.iter().map(|(name, src)| assemble(name, src).unwrap()).collect()
}

#[test]
fn text_sits_above_the_null_guard() {
    let mods = modules(&[("a.asm", "global main\nsegment text\nmain:\n  ret\n")]);
    let exe = link(&mods, (SegmentKind::Text, "main")).unwrap();
    assert_eq!(exe.text_base, TEXT_BASE);
    assert_eq!(exe.entry, TEXT_BASE);
}

#[test]
fn data_and_bss_bases_are_aligned_past_text() {
    let mods = modules(&[(
        "a.asm",
        "global main\nsegment text\nmain:\n  ret\nsegment data\nval: db 1, 2, 3\nsegment bss\nbuf: resb 10\n",
    )]);
    let exe = link(&mods, (SegmentKind::Text, "main")).unwrap();
    assert_eq!(exe.data_base % SEGMENT_ALIGN, 0);
    assert_eq!(exe.bss_base % SEGMENT_ALIGN, 0);
    assert!(exe.data_base >= exe.text_base + exe.text.len() as u64);
    assert!(exe.bss_base >= exe.data_base + exe.data.len() as u64);
    assert_eq!(exe.bss_len, 10);
}

#[test]
fn second_module_is_placed_after_the_first() {
    let mods = modules(&[
        ("a.asm", "global main\nextern second\nsegment text\nmain:\n  call second\n  ret\n"),
        ("b.asm", "global second\nsegment text\nsecond:\n  ret\n"),
    ]);
    let exe = link(&mods, (SegmentKind::Text, "main")).unwrap();
    let first_len = 5 + 1; // call (opcode + rel32) then ret
    let symbols = exe.debug_symbols.as_ref().unwrap();
    assert_eq!(symbols["second"], TEXT_BASE + first_len);
}

#[test]
fn relative_relocation_lands_on_the_target() {
    // call second: patch site at text offset 1, width 4, measured from
    // the end of the field (offset 5).
    let mods = modules(&[
        ("a.asm", "global main\nextern second\nsegment text\nmain:\n  call second\n  ret\n"),
        ("b.asm", "global second\nsegment text\nsecond:\n  ret\n"),
    ]);
    let exe = link(&mods, (SegmentKind::Text, "main")).unwrap();
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&exe.text[1..5]);
    let rel = i64::from(i32::from_le_bytes(raw));
    let field_end = TEXT_BASE + 5;
    let symbols = exe.debug_symbols.as_ref().unwrap();
    assert_eq!(field_end.wrapping_add(rel as u64), symbols["second"]);
}

#[test]
fn absolute_relocation_patches_the_final_address() {
    let mods = modules(&[(
        "a.asm",
        "global main\nsegment text\nmain:\n  mov rax, [value + 8]\n  ret\nsegment data\nvalue: dq 1\n  dq 2\n",
    )]);
    let exe = link(&mods, (SegmentKind::Text, "main")).unwrap();
    // mov reg, [mem]: opcode, mode, dst, base, then the 8-byte
    // displacement at text offset 4.
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&exe.text[4..12]);
    assert_eq!(u64::from_le_bytes(raw), exe.data_base + 8);
}

#[test]
fn entry_can_live_in_any_module() {
    let mods = modules(&[
        ("lib.asm", "global helper\nsegment text\nhelper:\n  ret\n"),
        ("app.asm", "global main\nsegment text\nmain:\n  ret\n"),
    ]);
    let exe = link(&mods, (SegmentKind::Text, "main")).unwrap();
    assert_eq!(exe.entry, TEXT_BASE + 1);
}

#[test]
fn repeated_links_are_independent() {
    let mods = modules(&[("a.asm", "global main\nsegment text\nmain:\n  ret\n")]);
    let first = link(&mods, (SegmentKind::Text, "main")).unwrap();
    let second = link(&mods, (SegmentKind::Text, "main")).unwrap();
    assert_eq!(first, second);
}
