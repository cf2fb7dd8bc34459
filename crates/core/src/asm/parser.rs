//! Statement parser for vex64 assembly.
//!
//! Turns a line's token stream into one [`Line`]: an optional label plus
//! an optional statement (directive or instruction). The parser knows
//! nothing about encoding or symbol resolution; it only builds the
//! operand shapes the encoder consumes.

use crate::common::{AssemblyError, SegmentKind};
use crate::isa::registers::{self, RegOperand};
use crate::isa::Size;

use super::lexer::{Spanned, Tok};

/// A displacement or immediate expression: at most one symbol plus a
/// constant addend, e.g. `buf + 8`, `-14`, `msg`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expr {
    /// Referenced symbol, if any.
    pub symbol: Option<String>,
    /// Constant part (two's-complement, wrapping).
    pub addend: i64,
}

/// A parsed instruction operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A register, at the size its name implies.
    Reg(RegOperand),
    /// An immediate expression, with an optional size keyword.
    Imm {
        /// The immediate value or symbolic address.
        expr: Expr,
        /// Size from a `byte`/`word`/`dword`/`qword` keyword, if present.
        size_hint: Option<Size>,
    },
    /// A memory reference `[base + disp]`.
    Mem {
        /// Base register slot, if present (must be 64-bit).
        base: Option<u8>,
        /// Constant/symbolic displacement.
        disp: Expr,
        /// Size from a size keyword, if present.
        size_hint: Option<Size>,
    },
}

/// One data item of a `db`/`dw`/`dd`/`dq` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataItem {
    /// A byte string (only valid with `db`).
    Str(Vec<u8>),
    /// An expression encoded at the directive's unit width.
    Expr(Expr),
}

/// A parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `segment text|data|bss`
    Segment(SegmentKind),
    /// `global name[, name..]`
    Global(Vec<String>),
    /// `extern name[, name..]`
    Extern(Vec<String>),
    /// `db`/`dw`/`dd`/`dq` with its unit width.
    Data {
        /// Item width.
        unit: Size,
        /// Items in source order.
        items: Vec<DataItem>,
    },
    /// `resb`/`resw`/`resd`/`resq` with its unit width.
    Reserve {
        /// Unit width.
        unit: Size,
        /// Number of units to reserve.
        count: u64,
    },
    /// `align n` (n a power of two).
    Align(u64),
    /// An instruction with its operands (each tagged with its column).
    Insn {
        /// Lower-cased mnemonic.
        mnemonic: String,
        /// Operands in source order.
        operands: Vec<(Operand, u32)>,
    },
}

/// A fully parsed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number.
    pub number: u32,
    /// Label defined on this line, with its column.
    pub label: Option<(String, u32)>,
    /// Statement on this line, with the column of its first token.
    pub stmt: Option<(Statement, u32)>,
}

/// Parses one tokenized line.
pub fn parse_line(number: u32, tokens: &[Spanned]) -> Result<Line, AssemblyError> {
    let mut rest = tokens;
    let mut label = None;

    if let [Spanned { tok: Tok::Ident(name), col, .. }, Spanned { tok: Tok::Colon, .. }, tail @ ..] =
        rest
    {
        label = Some((name.clone(), *col));
        rest = tail;
    }

    let stmt = match rest {
        [] => None,
        [first, ..] => Some((parse_statement(number, rest)?, first.col)),
    };

    Ok(Line { number, label, stmt })
}

fn parse_statement(line: u32, tokens: &[Spanned]) -> Result<Statement, AssemblyError> {
    let (head, rest) = match tokens {
        [Spanned { tok: Tok::Ident(name), .. }, rest @ ..] => (name.to_ascii_lowercase(), rest),
        [first, ..] => {
            return Err(AssemblyError::new(line, first.col, "expected mnemonic or directive"));
        }
        [] => unreachable!("parse_statement called on an empty line"),
    };

    match head.as_str() {
        "segment" | "section" => parse_segment(line, tokens[0].col, rest),
        "global" => Ok(Statement::Global(parse_name_list(line, rest)?)),
        "extern" => Ok(Statement::Extern(parse_name_list(line, rest)?)),
        "db" => parse_data(line, Size::Byte, rest),
        "dw" => parse_data(line, Size::Word, rest),
        "dd" => parse_data(line, Size::Dword, rest),
        "dq" => parse_data(line, Size::Qword, rest),
        "resb" => parse_reserve(line, Size::Byte, rest),
        "resw" => parse_reserve(line, Size::Word, rest),
        "resd" => parse_reserve(line, Size::Dword, rest),
        "resq" => parse_reserve(line, Size::Qword, rest),
        "align" => parse_align(line, tokens[0].col, rest),
        _ => parse_insn(line, head, rest),
    }
}

fn parse_segment(line: u32, col: u32, rest: &[Spanned]) -> Result<Statement, AssemblyError> {
    match rest {
        [Spanned { tok: Tok::Ident(name), col, .. }] => {
            match name.to_ascii_lowercase().as_str() {
                "text" => Ok(Statement::Segment(SegmentKind::Text)),
                "data" => Ok(Statement::Segment(SegmentKind::Data)),
                "bss" => Ok(Statement::Segment(SegmentKind::Bss)),
                other => Err(AssemblyError::new(
                    line,
                    *col,
                    format!("unknown segment `{other}` (expected text, data, or bss)"),
                )),
            }
        }
        _ => Err(AssemblyError::new(line, col, "segment directive takes one segment name")),
    }
}

fn parse_name_list(line: u32, rest: &[Spanned]) -> Result<Vec<String>, AssemblyError> {
    let mut names = Vec::new();
    let mut expect_name = true;
    for sp in rest {
        match (&sp.tok, expect_name) {
            (Tok::Ident(name), true) => {
                names.push(name.clone());
                expect_name = false;
            }
            (Tok::Comma, false) => expect_name = true,
            _ => return Err(AssemblyError::new(line, sp.col, "expected symbol name")),
        }
    }
    if names.is_empty() || expect_name {
        let col = rest.last().map_or(1, |sp| sp.col);
        return Err(AssemblyError::new(line, col, "expected symbol name"));
    }
    Ok(names)
}

fn parse_data(line: u32, unit: Size, rest: &[Spanned]) -> Result<Statement, AssemblyError> {
    if rest.is_empty() {
        return Err(AssemblyError::new(line, 1, "data directive needs at least one item"));
    }
    let mut items = Vec::new();
    for group in split_commas(rest) {
        match group {
            [Spanned { tok: Tok::Str(bytes), col, .. }] => {
                if unit != Size::Byte {
                    return Err(AssemblyError::new(
                        line,
                        *col,
                        "string literals are only valid with `db`",
                    ));
                }
                items.push(DataItem::Str(bytes.clone()));
            }
            group => {
                let (expr, _) = parse_expr(line, group)?;
                items.push(DataItem::Expr(expr));
            }
        }
    }
    Ok(Statement::Data { unit, items })
}

fn parse_reserve(line: u32, unit: Size, rest: &[Spanned]) -> Result<Statement, AssemblyError> {
    let (expr, col) = parse_expr(line, rest)?;
    if expr.symbol.is_some() || expr.addend < 0 {
        return Err(AssemblyError::new(line, col, "reserve count must be a non-negative constant"));
    }
    Ok(Statement::Reserve { unit, count: expr.addend as u64 })
}

fn parse_align(line: u32, col: u32, rest: &[Spanned]) -> Result<Statement, AssemblyError> {
    let (expr, ecol) = parse_expr(line, rest)?;
    let n = expr.addend;
    if expr.symbol.is_some() || n <= 0 || (n & (n - 1)) != 0 || n > 4096 {
        return Err(AssemblyError::new(
            line,
            ecol.max(col),
            "alignment must be a power of two between 1 and 4096",
        ));
    }
    Ok(Statement::Align(n as u64))
}

fn parse_insn(line: u32, mnemonic: String, rest: &[Spanned]) -> Result<Statement, AssemblyError> {
    let mut operands = Vec::new();
    if !rest.is_empty() {
        for group in split_commas(rest) {
            if group.is_empty() {
                let col = rest.first().map_or(1, |sp| sp.col);
                return Err(AssemblyError::new(line, col, "empty operand"));
            }
            let col = group[0].col;
            operands.push((parse_operand(line, group)?, col));
        }
    }
    Ok(Statement::Insn { mnemonic, operands })
}

/// Splits a token slice on top-level commas (commas inside brackets do
/// not occur in this grammar, so the split is flat).
fn split_commas(tokens: &[Spanned]) -> Vec<&[Spanned]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for (i, sp) in tokens.iter().enumerate() {
        if sp.tok == Tok::Comma {
            groups.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    groups.push(&tokens[start..]);
    groups
}

fn parse_operand(line: u32, tokens: &[Spanned]) -> Result<Operand, AssemblyError> {
    let (size_hint, rest) = match tokens {
        [Spanned { tok: Tok::Ident(kw), .. }, rest @ ..] if size_keyword(kw).is_some() => {
            (size_keyword(kw), rest)
        }
        _ => (None, tokens),
    };

    match rest {
        [Spanned { tok: Tok::LBracket, .. }, inner @ .., Spanned { tok: Tok::RBracket, .. }] => {
            parse_mem(line, inner, size_hint)
        }
        [Spanned { tok: Tok::Ident(name), col, .. }] if registers::lookup(name).is_some() => {
            if size_hint.is_some() {
                return Err(AssemblyError::new(
                    line,
                    *col,
                    "size keyword is not allowed before a register",
                ));
            }
            Ok(Operand::Reg(registers::lookup(name).unwrap_or_else(|| unreachable!())))
        }
        _ => {
            let (expr, _) = parse_expr(line, rest)?;
            Ok(Operand::Imm { expr, size_hint })
        }
    }
}

fn size_keyword(word: &str) -> Option<Size> {
    match word.to_ascii_lowercase().as_str() {
        "byte" => Some(Size::Byte),
        "word" => Some(Size::Word),
        "dword" => Some(Size::Dword),
        "qword" => Some(Size::Qword),
        _ => None,
    }
}

/// Parses the inside of a `[...]` memory operand: an optional 64-bit
/// base register plus displacement terms.
fn parse_mem(
    line: u32,
    inner: &[Spanned],
    size_hint: Option<Size>,
) -> Result<Operand, AssemblyError> {
    if inner.is_empty() {
        return Err(AssemblyError::new(line, 1, "empty memory operand"));
    }
    let mut base: Option<u8> = None;
    let mut expr_toks: Vec<Spanned> = Vec::new();

    // The base register may only appear as the first, positively-signed
    // term; everything else is folded into the displacement expression.
    let mut i = 0;
    while i < inner.len() {
        let sp = &inner[i];
        if let Tok::Ident(name) = &sp.tok {
            if let Some(reg) = registers::lookup(name) {
                if base.is_some() {
                    return Err(AssemblyError::new(line, sp.col, "only one base register is allowed"));
                }
                if reg.size != Size::Qword {
                    return Err(AssemblyError::new(line, sp.col, "base register must be 64-bit"));
                }
                if i != 0 {
                    // a register term after +/- signs
                    return Err(AssemblyError::new(
                        line,
                        sp.col,
                        "base register must be the first term",
                    ));
                }
                base = Some(reg.index);
                i += 1;
                // consume a following '+' joining the displacement
                if let Some(Spanned { tok: Tok::Plus, .. }) = inner.get(i) {
                    i += 1;
                } else if i < inner.len() && inner[i].tok != Tok::Minus {
                    return Err(AssemblyError::new(
                        line,
                        inner[i].col,
                        "expected `+` or `-` after base register",
                    ));
                }
                continue;
            }
        }
        expr_toks.push(sp.clone());
        i += 1;
    }

    let disp = if expr_toks.is_empty() {
        Expr::default()
    } else {
        parse_expr(line, &expr_toks)?.0
    };
    Ok(Operand::Mem { base, disp, size_hint })
}

/// Parses a `[-]term (+|- term)*` expression with at most one symbol.
/// Returns the expression and the column of its first token.
fn parse_expr(line: u32, tokens: &[Spanned]) -> Result<(Expr, u32), AssemblyError> {
    let first_col = tokens.first().map_or(1, |sp| sp.col);
    let mut expr = Expr::default();
    let mut sign: i64 = 1;
    let mut expect_term = true;

    for sp in tokens {
        match (&sp.tok, expect_term) {
            (Tok::Minus, true) => sign = -sign,
            (Tok::Plus, true) => {}
            (Tok::Int(v), true) => {
                expr.addend = expr.addend.wrapping_add((*v as i64).wrapping_mul(sign));
                sign = 1;
                expect_term = false;
            }
            (Tok::Ident(name), true) => {
                if sign < 0 {
                    return Err(AssemblyError::new(line, sp.col, "cannot negate a symbol"));
                }
                if expr.symbol.is_some() {
                    return Err(AssemblyError::new(
                        line,
                        sp.col,
                        "at most one symbol per expression",
                    ));
                }
                expr.symbol = Some(name.clone());
                sign = 1;
                expect_term = false;
            }
            (Tok::Plus, false) => {
                sign = 1;
                expect_term = true;
            }
            (Tok::Minus, false) => {
                sign = -1;
                expect_term = true;
            }
            _ => return Err(AssemblyError::new(line, sp.col, "malformed expression")),
        }
    }
    if expect_term {
        return Err(AssemblyError::new(line, first_col, "malformed expression"));
    }
    Ok((expr, first_col))
}
