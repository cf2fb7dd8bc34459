//! Structure of assembled object modules: segment bytes, symbol
//! tables, and relocation records.

use pretty_assertions::assert_eq;
use vex64_core::common::{RelocKind, Visibility};
use vex64_core::{assemble, SegmentKind};

#[test]
fn labels_record_segment_and_offset() {
    let module = assemble(
        "labels.asm",
        "segment text\n\
         start:\n  nop\n  nop\n\
         after:\n  ret\n\
         segment data\n\
         greeting: db \"hi\"\n\
         segment bss\n\
         buffer: resq 4\n",
    )
    .unwrap();

    let start = &module.symbols["start"];
    assert_eq!((start.segment, start.offset), (SegmentKind::Text, 0));
    let after = &module.symbols["after"];
    assert_eq!((after.segment, after.offset), (SegmentKind::Text, 2));
    let greeting = &module.symbols["greeting"];
    assert_eq!((greeting.segment, greeting.offset), (SegmentKind::Data, 0));
    let buffer = &module.symbols["buffer"];
    assert_eq!((buffer.segment, buffer.offset), (SegmentKind::Bss, 0));
    assert_eq!(module.bss_len, 32);
}

#[test]
fn global_and_extern_visibility_is_recorded() {
    let module = assemble(
        "vis.asm",
        "global main\nextern helper\nsegment text\nmain:\n  call helper\n  ret\n",
    )
    .unwrap();
    assert_eq!(module.symbols["main"].visibility, Visibility::Global);
    assert_eq!(module.symbols["helper"].visibility, Visibility::Extern);
}

#[test]
fn symbol_references_emit_relocations() {
    let module = assemble(
        "relocs.asm",
        "extern target\nsegment text\nmain:\n  jmp target\n  mov rax, [value]\nsegment data\nvalue: dq 7\n",
    )
    .unwrap();

    // jmp: [opcode][rel32] -> relative width 4 at text offset 1.
    let jump = &module.relocations[0];
    assert_eq!(jump.segment, SegmentKind::Text);
    assert_eq!(jump.offset, 1);
    assert_eq!(jump.symbol, "target");
    assert_eq!(jump.width, 4);
    assert_eq!(jump.kind, RelocKind::Relative);

    // mov rax, [value]: absolute width 8 in the displacement field.
    let load = &module.relocations[1];
    assert_eq!(load.symbol, "value");
    assert_eq!(load.width, 8);
    assert_eq!(load.kind, RelocKind::Absolute);
}

#[test]
fn data_literals_encode_directly() {
    let module = assemble(
        "data.asm",
        "segment data\nbytes: db \"AB\", 0\nwords: dw 0x1234\nquads: dq 1\n",
    )
    .unwrap();
    assert_eq!(&module.data[..3], b"AB\0");
    assert_eq!(&module.data[3..5], &0x1234u16.to_le_bytes());
    assert_eq!(&module.data[5..13], &1u64.to_le_bytes());
    assert!(module.relocations.is_empty());
}

#[test]
fn align_pads_each_segment_kind() {
    let module = assemble(
        "align.asm",
        "segment text\n  nop\n  align 4\nhere:\n  ret\n\
         segment data\n  db 1\n  align 8\nval: dq 2\n\
         segment bss\n  resb 3\n  align 16\nbuf: resb 1\n",
    )
    .unwrap();
    assert_eq!(module.symbols["here"].offset, 4);
    assert_eq!(module.symbols["val"].offset, 8);
    assert_eq!(module.symbols["buf"].offset, 16);
    assert_eq!(module.bss_len, 17);
}

#[test]
fn both_passes_agree_on_sizes() {
    // A module whose label offsets depend on the encoded size of
    // earlier symbol-referencing instructions.
    let module = assemble(
        "sizes.asm",
        "segment text\nmain:\n  mov rax, [later]\n  ret\nlater_code:\n  nop\nsegment data\nlater: dq 0\n",
    )
    .unwrap();
    // mov reg, [mem]: opcode + mode + reg + base + disp8 = 12 bytes,
    // then ret at 12.
    assert_eq!(module.symbols["later_code"].offset, 13);
}

#[test]
fn addend_is_written_in_place() {
    let module = assemble(
        "addend.asm",
        "extern table\nsegment text\nmain:\n  mov rax, [table + 24]\n  ret\n",
    )
    .unwrap();
    let reloc = &module.relocations[0];
    let site = reloc.offset as usize;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&module.text[site..site + 8]);
    assert_eq!(i64::from_le_bytes(raw), 24);
}
