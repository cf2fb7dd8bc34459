//! Two-pass assembler.
//!
//! Pass 1 parses every line, tracks the active segment, and assigns each
//! label its segment-relative offset by encoding statements into scratch
//! buffers (sizes never depend on symbol values, so both passes run the
//! same encoder). Pass 2 re-encodes into the real segment buffers,
//! validating every symbol reference and emitting a relocation for each
//! one; final addresses are unknown until link time, so even local
//! references relocate.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::common::constants::align_up;
use crate::common::object::{RelocKind, Relocation, Symbol, Visibility};
use crate::common::{AssemblyError, ObjectModule, SegmentKind};
use crate::isa::{self, opcodes as op, Size};

use super::lexer;
use super::parser::{self, DataItem, Expr, Operand, Statement};

/// Assembles one source module into a relocatable [`ObjectModule`].
///
/// # Arguments
///
/// * `name` - Module name, recorded in the object and in diagnostics.
/// * `source` - Assembly source text.
///
/// # Errors
///
/// Returns an [`AssemblyError`] with line/column for unknown mnemonics,
/// malformed operands, duplicate labels, and segment-directive misuse.
pub fn assemble(name: &str, source: &str) -> Result<ObjectModule, AssemblyError> {
    assemble_inner(name, source).map_err(|mut err| {
        err.module = name.to_string();
        err
    })
}

fn assemble_inner(name: &str, source: &str) -> Result<ObjectModule, AssemblyError> {
    let mut lines = Vec::new();
    for (i, text) in source.lines().enumerate() {
        let number = (i + 1) as u32;
        let tokens = lexer::tokenize_line(number, text)?;
        lines.push(parser::parse_line(number, &tokens)?);
    }

    // Pass 1: label offsets and visibility declarations.
    let mut symbols: BTreeMap<String, Symbol> = BTreeMap::new();
    let mut globals: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    let mut externs: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    {
        let mut enc = Encoder::new(None);
        for line in &lines {
            if let Some((label, col)) = &line.label {
                let segment = enc.current_segment(line.number, *col)?;
                let offset = enc.offset_in(segment);
                if symbols
                    .insert(
                        label.clone(),
                        Symbol { segment, offset, visibility: Visibility::Local },
                    )
                    .is_some()
                {
                    return Err(AssemblyError::new(
                        line.number,
                        *col,
                        format!("duplicate label `{label}`"),
                    ));
                }
            }
            if let Some((stmt, col)) = &line.stmt {
                match stmt {
                    Statement::Global(names) => {
                        for n in names {
                            let _ = globals.entry(n.clone()).or_insert((line.number, *col));
                        }
                    }
                    Statement::Extern(names) => {
                        for n in names {
                            let _ = externs.entry(n.clone()).or_insert((line.number, *col));
                        }
                    }
                    _ => enc.encode(line.number, *col, stmt)?,
                }
            }
        }
    }

    // Apply visibility. Globals must be defined here; externs must not.
    for (n, &(line, col)) in &globals {
        match symbols.get_mut(n) {
            Some(sym) => sym.visibility = Visibility::Global,
            None => {
                return Err(AssemblyError::new(
                    line,
                    col,
                    format!("global symbol `{n}` is never defined"),
                ));
            }
        }
    }
    for (n, &(line, col)) in &externs {
        if symbols.contains_key(n) {
            return Err(AssemblyError::new(
                line,
                col,
                format!("extern symbol `{n}` is defined in this module"),
            ));
        }
        let _ = symbols.insert(
            n.clone(),
            Symbol { segment: SegmentKind::Text, offset: 0, visibility: Visibility::Extern },
        );
    }

    // Pass 2: encode for real, validating every symbol reference.
    let known: BTreeSet<String> = symbols.keys().cloned().collect();
    let mut enc = Encoder::new(Some(known));
    for line in &lines {
        if let Some((stmt, col)) = &line.stmt {
            match stmt {
                Statement::Global(_) | Statement::Extern(_) => {}
                _ => enc.encode(line.number, *col, stmt)?,
            }
        }
    }

    debug!(
        module = name,
        text = enc.text.len(),
        data = enc.data.len(),
        bss = enc.bss_len,
        symbols = symbols.len(),
        relocations = enc.relocations.len(),
        "assembled module"
    );

    Ok(ObjectModule {
        name: name.to_string(),
        text: enc.text,
        data: enc.data,
        bss_len: enc.bss_len,
        symbols,
        relocations: enc.relocations,
    })
}

/// Instruction shape, looked up from the mnemonic.
enum InsnClass {
    /// Single opcode byte, no operands.
    Nullary(u8),
    /// Two-operand data instruction.
    Binary(u8),
    /// One-operand read-modify-write instruction.
    Unary(u8),
    /// Shift: destination plus an immediate count or `cl`.
    Shift(u8),
    /// `jmp`/`call` with a rel32 target.
    Jump(u8),
    /// Conditional jump with its condition nibble.
    Jcc(u8),
    /// `push`, `pop`, `lea`.
    Push,
    /// `pop`
    Pop,
    /// `lea`
    Lea,
}

fn classify(mnemonic: &str) -> Option<InsnClass> {
    use InsnClass::{Binary, Jcc, Jump, Lea, Nullary, Pop, Push, Shift, Unary};
    Some(match mnemonic {
        "nop" => Nullary(op::NOP),
        "hlt" => Nullary(op::HLT),
        "syscall" => Nullary(op::SYSCALL),
        "ret" => Nullary(op::RET),
        "stc" => Nullary(op::STC),
        "clc" => Nullary(op::CLC),
        "cmc" => Nullary(op::CMC),
        "std" => Nullary(op::STD),
        "cld" => Nullary(op::CLD),
        "sti" => Nullary(op::STI),
        "cli" => Nullary(op::CLI),
        "pushf" => Nullary(op::PUSHF),
        "popf" => Nullary(op::POPF),
        "mov" => Binary(op::MOV),
        "add" => Binary(op::ADD),
        "sub" => Binary(op::SUB),
        "cmp" => Binary(op::CMP),
        "and" => Binary(op::AND),
        "or" => Binary(op::OR),
        "xor" => Binary(op::XOR),
        "test" => Binary(op::TEST),
        "mul" => Binary(op::MUL),
        "imul" => Binary(op::IMUL),
        "div" => Binary(op::DIV),
        "idiv" => Binary(op::IDIV),
        "inc" => Unary(op::INC),
        "dec" => Unary(op::DEC),
        "neg" => Unary(op::NEG),
        "not" => Unary(op::NOT),
        "shl" | "sal" => Shift(op::SHL),
        "shr" => Shift(op::SHR),
        "sar" => Shift(op::SAR),
        "jmp" => Jump(op::JMP),
        "call" => Jump(op::CALL),
        "jo" => Jcc(op::cond::O),
        "jno" => Jcc(op::cond::NO),
        "jb" | "jnae" | "jc" => Jcc(op::cond::B),
        "jae" | "jnb" | "jnc" => Jcc(op::cond::AE),
        "je" | "jz" => Jcc(op::cond::E),
        "jne" | "jnz" => Jcc(op::cond::NE),
        "jbe" | "jna" => Jcc(op::cond::BE),
        "ja" | "jnbe" => Jcc(op::cond::A),
        "js" => Jcc(op::cond::S),
        "jns" => Jcc(op::cond::NS),
        "jp" | "jpe" => Jcc(op::cond::P),
        "jnp" | "jpo" => Jcc(op::cond::NP),
        "jl" | "jnge" => Jcc(op::cond::L),
        "jge" | "jnl" => Jcc(op::cond::GE),
        "jle" | "jng" => Jcc(op::cond::LE),
        "jg" | "jnle" => Jcc(op::cond::G),
        "push" => Push,
        "pop" => Pop,
        "lea" => Lea,
        _ => return None,
    })
}

/// Segment-aware statement encoder, shared by both passes.
///
/// When `known_symbols` is `None` (pass 1), symbol references are not
/// validated and relocations are discarded with the buffers.
struct Encoder {
    segment: Option<SegmentKind>,
    text: Vec<u8>,
    data: Vec<u8>,
    bss_len: u64,
    relocations: Vec<Relocation>,
    known_symbols: Option<BTreeSet<String>>,
}

impl Encoder {
    fn new(known_symbols: Option<BTreeSet<String>>) -> Self {
        Self {
            segment: None,
            text: Vec::new(),
            data: Vec::new(),
            bss_len: 0,
            relocations: Vec::new(),
            known_symbols,
        }
    }

    fn current_segment(&self, line: u32, col: u32) -> Result<SegmentKind, AssemblyError> {
        self.segment.ok_or_else(|| {
            AssemblyError::new(line, col, "no segment selected (use `segment text|data|bss`)")
        })
    }

    fn offset_in(&self, segment: SegmentKind) -> u64 {
        match segment {
            SegmentKind::Text => self.text.len() as u64,
            SegmentKind::Data => self.data.len() as u64,
            SegmentKind::Bss => self.bss_len,
        }
    }

    fn encode(&mut self, line: u32, col: u32, stmt: &Statement) -> Result<(), AssemblyError> {
        match stmt {
            Statement::Segment(kind) => {
                self.segment = Some(*kind);
                Ok(())
            }
            Statement::Data { unit, items } => self.encode_data(line, col, *unit, items),
            Statement::Reserve { unit, count } => self.encode_reserve(line, col, *unit, *count),
            Statement::Align(n) => self.encode_align(line, col, *n),
            Statement::Insn { mnemonic, operands } => {
                self.encode_insn(line, col, mnemonic, operands)
            }
            Statement::Global(_) | Statement::Extern(_) => Ok(()),
        }
    }

    fn encode_data(
        &mut self,
        line: u32,
        col: u32,
        unit: Size,
        items: &[DataItem],
    ) -> Result<(), AssemblyError> {
        if self.current_segment(line, col)? != SegmentKind::Data {
            return Err(AssemblyError::new(
                line,
                col,
                "initialized data is only valid in the data segment",
            ));
        }
        for item in items {
            match item {
                DataItem::Str(bytes) => self.data.extend_from_slice(bytes),
                DataItem::Expr(expr) => {
                    self.emit_expr(line, col, SegmentKind::Data, expr, unit, RelocKind::Absolute)?;
                }
            }
        }
        Ok(())
    }

    fn encode_reserve(
        &mut self,
        line: u32,
        col: u32,
        unit: Size,
        count: u64,
    ) -> Result<(), AssemblyError> {
        if self.current_segment(line, col)? != SegmentKind::Bss {
            return Err(AssemblyError::new(
                line,
                col,
                "reserve directives are only valid in the bss segment",
            ));
        }
        self.bss_len = unit
            .bytes()
            .checked_mul(count)
            .and_then(|bytes| self.bss_len.checked_add(bytes))
            .ok_or_else(|| {
                AssemblyError::new(line, col, "reserved size overflows the bss segment")
            })?;
        Ok(())
    }

    // Alignment is parser-capped at 4096, so the padding here is bounded.
    fn encode_align(&mut self, line: u32, col: u32, n: u64) -> Result<(), AssemblyError> {
        match self.current_segment(line, col)? {
            SegmentKind::Text => {
                let padded = align_up(self.text.len() as u64, n) as usize;
                self.text.resize(padded, op::NOP);
            }
            SegmentKind::Data => {
                let padded = align_up(self.data.len() as u64, n) as usize;
                self.data.resize(padded, 0);
            }
            SegmentKind::Bss => {
                self.bss_len = self.bss_len.checked_add(n - 1).map(|v| v & !(n - 1)).ok_or_else(
                    || AssemblyError::new(line, col, "alignment overflows the bss segment"),
                )?;
            }
        }
        Ok(())
    }

    fn encode_insn(
        &mut self,
        line: u32,
        col: u32,
        mnemonic: &str,
        operands: &[(Operand, u32)],
    ) -> Result<(), AssemblyError> {
        if self.current_segment(line, col)? != SegmentKind::Text {
            return Err(AssemblyError::new(
                line,
                col,
                "instructions are only valid in the text segment",
            ));
        }
        let Some(class) = classify(mnemonic) else {
            return Err(AssemblyError::new(line, col, format!("unknown mnemonic `{mnemonic}`")));
        };
        match class {
            InsnClass::Nullary(opcode) => {
                expect_arity(line, col, mnemonic, operands, 0)?;
                self.text.push(opcode);
                Ok(())
            }
            InsnClass::Binary(opcode) => {
                expect_arity(line, col, mnemonic, operands, 2)?;
                self.encode_binary(line, opcode, &operands[0], &operands[1])
            }
            InsnClass::Unary(opcode) => {
                expect_arity(line, col, mnemonic, operands, 1)?;
                self.encode_unary(line, opcode, &operands[0])
            }
            InsnClass::Shift(opcode) => {
                expect_arity(line, col, mnemonic, operands, 2)?;
                self.encode_shift(line, opcode, &operands[0], &operands[1])
            }
            InsnClass::Jump(opcode) => {
                expect_arity(line, col, mnemonic, operands, 1)?;
                self.text.push(opcode);
                self.encode_jump_target(line, &operands[0])
            }
            InsnClass::Jcc(cc) => {
                expect_arity(line, col, mnemonic, operands, 1)?;
                self.text.push(op::JCC);
                self.text.push(cc);
                self.encode_jump_target(line, &operands[0])
            }
            InsnClass::Push => {
                expect_arity(line, col, mnemonic, operands, 1)?;
                self.encode_push(line, &operands[0])
            }
            InsnClass::Pop => {
                expect_arity(line, col, mnemonic, operands, 1)?;
                match &operands[0] {
                    (Operand::Reg(reg), ocol) => {
                        if reg.size != Size::Qword {
                            return Err(AssemblyError::new(line, *ocol, "pop requires a 64-bit register"));
                        }
                        self.text.push(op::POP);
                        self.text.push(reg.index);
                        Ok(())
                    }
                    (_, ocol) => Err(AssemblyError::new(line, *ocol, "pop requires a register operand")),
                }
            }
            InsnClass::Lea => {
                expect_arity(line, col, mnemonic, operands, 2)?;
                self.encode_lea(line, &operands[0], &operands[1])
            }
        }
    }

    fn encode_binary(
        &mut self,
        line: u32,
        opcode: u8,
        dst: &(Operand, u32),
        src: &(Operand, u32),
    ) -> Result<(), AssemblyError> {
        let size = binary_size(line, dst, src)?;
        self.text.push(opcode);
        match (&dst.0, &src.0) {
            (Operand::Reg(d), Operand::Reg(s)) => {
                self.text.push(isa::pack_mode(isa::FORM_RR, size, d.high, s.high));
                self.text.push(d.index << 4 | s.index);
            }
            (Operand::Reg(d), Operand::Imm { expr, .. }) => {
                self.text.push(isa::pack_mode(isa::FORM_RI, size, d.high, false));
                self.text.push(d.index);
                self.emit_expr(line, src.1, SegmentKind::Text, expr, size, RelocKind::Absolute)?;
            }
            (Operand::Reg(d), Operand::Mem { base, disp, .. }) => {
                self.text.push(isa::pack_mode(isa::FORM_RM, size, d.high, false));
                self.text.push(d.index);
                self.emit_mem(line, src.1, *base, disp)?;
            }
            (Operand::Mem { base, disp, .. }, Operand::Reg(s)) => {
                self.text.push(isa::pack_mode(isa::FORM_MR, size, false, s.high));
                self.emit_mem(line, dst.1, *base, disp)?;
                self.text.push(s.index);
            }
            (Operand::Mem { base, disp, .. }, Operand::Imm { expr, .. }) => {
                self.text.push(isa::pack_mode(isa::FORM_MI, size, false, false));
                self.emit_mem(line, dst.1, *base, disp)?;
                self.emit_expr(line, src.1, SegmentKind::Text, expr, size, RelocKind::Absolute)?;
            }
            (Operand::Mem { .. }, Operand::Mem { .. }) => {
                return Err(AssemblyError::new(line, src.1, "memory-to-memory forms do not exist"));
            }
            (Operand::Imm { .. }, _) => {
                return Err(AssemblyError::new(line, dst.1, "destination cannot be an immediate"));
            }
        }
        Ok(())
    }

    fn encode_unary(
        &mut self,
        line: u32,
        opcode: u8,
        operand: &(Operand, u32),
    ) -> Result<(), AssemblyError> {
        self.text.push(opcode);
        match &operand.0 {
            Operand::Reg(reg) => {
                self.text.push(isa::pack_mode(isa::FORM_RR, reg.size, reg.high, false));
                self.text.push(reg.index << 4);
                Ok(())
            }
            Operand::Mem { base, disp, size_hint } => {
                let size = size_hint.ok_or_else(|| {
                    AssemblyError::new(line, operand.1, "operand size is ambiguous (add a size keyword)")
                })?;
                self.text.push(isa::pack_mode(isa::FORM_MR, size, false, false));
                self.emit_mem(line, operand.1, *base, disp)
            }
            Operand::Imm { .. } => {
                Err(AssemblyError::new(line, operand.1, "operand must be a register or memory"))
            }
        }
    }

    fn encode_shift(
        &mut self,
        line: u32,
        opcode: u8,
        dst: &(Operand, u32),
        count: &(Operand, u32),
    ) -> Result<(), AssemblyError> {
        self.text.push(opcode);
        let (dst_size, dst_high) = match &dst.0 {
            Operand::Reg(reg) => (reg.size, reg.high),
            Operand::Mem { size_hint: Some(size), .. } => (*size, false),
            Operand::Mem { size_hint: None, .. } => {
                return Err(AssemblyError::new(line, dst.1, "operand size is ambiguous (add a size keyword)"));
            }
            Operand::Imm { .. } => {
                return Err(AssemblyError::new(line, dst.1, "destination cannot be an immediate"));
            }
        };
        match &count.0 {
            // count in cl
            Operand::Reg(reg) if reg.index == isa::registers::RCX && reg.size == Size::Byte && !reg.high => {
                match &dst.0 {
                    Operand::Reg(d) => {
                        self.text.push(isa::pack_mode(isa::FORM_RR, dst_size, dst_high, false));
                        self.text.push(d.index << 4 | reg.index);
                    }
                    Operand::Mem { base, disp, .. } => {
                        self.text.push(isa::pack_mode(isa::FORM_MR, dst_size, false, false));
                        self.emit_mem(line, dst.1, *base, disp)?;
                        self.text.push(reg.index);
                    }
                    Operand::Imm { .. } => unreachable!("checked above"),
                }
                Ok(())
            }
            Operand::Imm { expr: Expr { symbol: None, addend }, .. } => {
                if !(0..64).contains(addend) {
                    return Err(AssemblyError::new(line, count.1, "shift count must be 0-63"));
                }
                match &dst.0 {
                    Operand::Reg(d) => {
                        self.text.push(isa::pack_mode(isa::FORM_RI, dst_size, dst_high, false));
                        self.text.push(d.index);
                    }
                    Operand::Mem { base, disp, .. } => {
                        self.text.push(isa::pack_mode(isa::FORM_MI, dst_size, false, false));
                        self.emit_mem(line, dst.1, *base, disp)?;
                    }
                    Operand::Imm { .. } => unreachable!("checked above"),
                }
                self.text.push(*addend as u8);
                Ok(())
            }
            _ => Err(AssemblyError::new(line, count.1, "shift count must be an immediate or `cl`")),
        }
    }

    fn encode_push(&mut self, line: u32, operand: &(Operand, u32)) -> Result<(), AssemblyError> {
        self.text.push(op::PUSH);
        match &operand.0 {
            Operand::Reg(reg) => {
                if reg.size != Size::Qword {
                    return Err(AssemblyError::new(line, operand.1, "push requires a 64-bit register"));
                }
                self.text.push(isa::pack_mode(isa::FORM_RR, Size::Qword, false, false));
                self.text.push(reg.index << 4);
                Ok(())
            }
            Operand::Imm { expr, .. } => {
                self.text.push(isa::pack_mode(isa::FORM_RI, Size::Qword, false, false));
                self.emit_expr(line, operand.1, SegmentKind::Text, expr, Size::Qword, RelocKind::Absolute)
            }
            Operand::Mem { .. } => {
                Err(AssemblyError::new(line, operand.1, "push takes a register or immediate"))
            }
        }
    }

    fn encode_lea(
        &mut self,
        line: u32,
        dst: &(Operand, u32),
        src: &(Operand, u32),
    ) -> Result<(), AssemblyError> {
        let Operand::Reg(d) = &dst.0 else {
            return Err(AssemblyError::new(line, dst.1, "lea destination must be a register"));
        };
        if d.size != Size::Qword {
            return Err(AssemblyError::new(line, dst.1, "lea destination must be 64-bit"));
        }
        let Operand::Mem { base, disp, .. } = &src.0 else {
            return Err(AssemblyError::new(line, src.1, "lea source must be a memory operand"));
        };
        self.text.push(op::LEA);
        self.text.push(isa::pack_mode(isa::FORM_RM, Size::Qword, false, false));
        self.text.push(d.index);
        self.emit_mem(line, src.1, *base, disp)
    }

    fn encode_jump_target(&mut self, line: u32, target: &(Operand, u32)) -> Result<(), AssemblyError> {
        match &target.0 {
            Operand::Imm { expr: expr @ Expr { symbol: Some(_), .. }, .. } => {
                self.emit_expr(line, target.1, SegmentKind::Text, expr, Size::Dword, RelocKind::Relative)
            }
            _ => Err(AssemblyError::new(line, target.1, "jump target must be a symbol")),
        }
    }

    /// Encodes a `[base][disp]` memory operand into the text segment.
    fn emit_mem(
        &mut self,
        line: u32,
        col: u32,
        base: Option<u8>,
        disp: &Expr,
    ) -> Result<(), AssemblyError> {
        self.text.push(base.unwrap_or(isa::NO_BASE));
        self.emit_expr(line, col, SegmentKind::Text, disp, Size::Qword, RelocKind::Absolute)
    }

    /// Encodes an expression at `width`, emitting a relocation when it
    /// references a symbol. The constant addend is written to the patch
    /// site either way (addend-in-place).
    fn emit_expr(
        &mut self,
        line: u32,
        col: u32,
        segment: SegmentKind,
        expr: &Expr,
        width: Size,
        kind: RelocKind,
    ) -> Result<(), AssemblyError> {
        if let Some(symbol) = &expr.symbol {
            if let Some(known) = &self.known_symbols {
                if !known.contains(symbol) {
                    return Err(AssemblyError::new(
                        line,
                        col,
                        format!("reference to undefined symbol `{symbol}` (missing `extern`?)"),
                    ));
                }
            }
            let offset = self.offset_in(segment);
            self.relocations.push(Relocation {
                segment,
                offset,
                symbol: symbol.clone(),
                width: width.bytes() as u8,
                kind,
            });
        } else if !fits_width(expr.addend, width) {
            return Err(AssemblyError::new(
                line,
                col,
                format!("value {} does not fit in {} bytes", expr.addend, width.bytes()),
            ));
        }
        let bytes = expr.addend.to_le_bytes();
        let buf = match segment {
            SegmentKind::Text => &mut self.text,
            SegmentKind::Data => &mut self.data,
            SegmentKind::Bss => unreachable!("bss holds no encoded bytes"),
        };
        buf.extend_from_slice(&bytes[..width.bytes() as usize]);
        Ok(())
    }
}

/// Determines the operation size of a two-operand instruction from its
/// register operands and size keywords, which must agree.
fn binary_size(
    line: u32,
    dst: &(Operand, u32),
    src: &(Operand, u32),
) -> Result<Size, AssemblyError> {
    let mut size: Option<Size> = None;
    let mut merge = |candidate: Option<Size>, col: u32| -> Result<(), AssemblyError> {
        if let Some(c) = candidate {
            match size {
                None => size = Some(c),
                Some(existing) if existing == c => {}
                Some(_) => {
                    return Err(AssemblyError::new(line, col, "operand sizes disagree"));
                }
            }
        }
        Ok(())
    };
    for (operand, col) in [dst, src] {
        match operand {
            Operand::Reg(reg) => merge(Some(reg.size), *col)?,
            Operand::Imm { size_hint, .. } | Operand::Mem { size_hint, .. } => {
                merge(*size_hint, *col)?;
            }
        }
    }
    size.ok_or_else(|| {
        AssemblyError::new(line, dst.1, "operand size is ambiguous (add a size keyword)")
    })
}

/// Whether `value` is representable in `width` bytes as either a signed
/// or an unsigned quantity.
fn fits_width(value: i64, width: Size) -> bool {
    match width {
        Size::Qword => true,
        _ => {
            let bits = width.bits();
            let min = -(1i64 << (bits - 1));
            let max = (1i64 << bits) - 1;
            (min..=max).contains(&value)
        }
    }
}

fn expect_arity(
    line: u32,
    col: u32,
    mnemonic: &str,
    operands: &[(Operand, u32)],
    want: usize,
) -> Result<(), AssemblyError> {
    if operands.len() == want {
        Ok(())
    } else {
        Err(AssemblyError::new(
            line,
            col,
            format!("`{mnemonic}` takes {want} operand(s), got {}", operands.len()),
        ))
    }
}
