//! Line tokenizer for vex64 assembly.
//!
//! Assembly is line-oriented, so the lexer works one line at a time and
//! produces position-tagged tokens. It handles:
//! 1. **Identifiers:** Labels, mnemonics, directives, register names.
//! 2. **Integers:** Decimal, `0x`/`0o`/`0b` prefixes, character literals.
//! 3. **Strings:** Double-quoted byte strings with escapes (`db` only).
//! 4. **Punctuation:** `, : [ ] + -` and `;` comments.

use crate::common::AssemblyError;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
    /// Identifier: label, mnemonic, directive, or register name.
    Ident(String),
    /// Integer literal (magnitude; sign is a separate `Minus` token).
    Int(u64),
    /// Double-quoted byte string with escapes applied.
    Str(Vec<u8>),
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `+`
    Plus,
    /// `-`
    Minus,
}

/// A token together with its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    /// The token.
    pub tok: Tok,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column of the token's first character.
    pub col: u32,
}

/// Tokenizes one source line. Comments are stripped; an empty vector
/// means the line holds nothing but whitespace or a comment.
pub fn tokenize_line(line_no: u32, text: &str) -> Result<Vec<Spanned>, AssemblyError> {
    let mut out = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        let col = (i + 1) as u32;
        match c {
            ';' => break,
            c if c.is_whitespace() => i += 1,
            ',' => {
                out.push(spanned(Tok::Comma, line_no, col));
                i += 1;
            }
            ':' => {
                out.push(spanned(Tok::Colon, line_no, col));
                i += 1;
            }
            '[' => {
                out.push(spanned(Tok::LBracket, line_no, col));
                i += 1;
            }
            ']' => {
                out.push(spanned(Tok::RBracket, line_no, col));
                i += 1;
            }
            '+' => {
                out.push(spanned(Tok::Plus, line_no, col));
                i += 1;
            }
            '-' => {
                out.push(spanned(Tok::Minus, line_no, col));
                i += 1;
            }
            '"' => {
                let (bytes, next) = scan_string(&chars, i, line_no)?;
                out.push(spanned(Tok::Str(bytes), line_no, col));
                i = next;
            }
            '\'' => {
                let (value, next) = scan_char(&chars, i, line_no)?;
                out.push(spanned(Tok::Int(value), line_no, col));
                i = next;
            }
            c if c.is_ascii_digit() => {
                let (value, next) = scan_number(&chars, i, line_no)?;
                out.push(spanned(Tok::Int(value), line_no, col));
                i = next;
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_continue(chars[i]) {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                out.push(spanned(Tok::Ident(ident), line_no, col));
            }
            other => {
                return Err(AssemblyError::new(
                    line_no,
                    col,
                    format!("unexpected character `{other}`"),
                ));
            }
        }
    }
    Ok(out)
}

fn spanned(tok: Tok, line: u32, col: u32) -> Spanned {
    Spanned { tok, line, col }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '.'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Scans an integer literal starting at `start`. Supports `0x`, `0o`,
/// and `0b` prefixes; plain leading-zero decimals are accepted as-is.
fn scan_number(chars: &[char], start: usize, line: u32) -> Result<(u64, usize), AssemblyError> {
    let col = (start + 1) as u32;
    let mut i = start;
    let (radix, digits_start) = if chars[i] == '0' && i + 1 < chars.len() {
        match chars[i + 1] {
            'x' | 'X' => (16, i + 2),
            'o' | 'O' => (8, i + 2),
            'b' | 'B' => (2, i + 2),
            _ => (10, i),
        }
    } else {
        (10, i)
    };
    i = digits_start;
    let mut text = String::new();
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
        if chars[i] != '_' {
            text.push(chars[i]);
        }
        i += 1;
    }
    if text.is_empty() {
        return Err(AssemblyError::new(line, col, "malformed integer literal"));
    }
    match u64::from_str_radix(&text, radix) {
        Ok(value) => Ok((value, i)),
        Err(_) => Err(AssemblyError::new(
            line,
            col,
            format!("malformed integer literal `{text}`"),
        )),
    }
}

/// Scans a single-quoted character literal.
fn scan_char(chars: &[char], start: usize, line: u32) -> Result<(u64, usize), AssemblyError> {
    let col = (start + 1) as u32;
    let mut i = start + 1;
    let value = match chars.get(i) {
        Some('\\') => {
            i += 1;
            let (b, next) = unescape(chars, i, line)?;
            i = next;
            u64::from(b)
        }
        Some(&c) if c != '\'' => {
            i += 1;
            c as u64
        }
        _ => return Err(AssemblyError::new(line, col, "empty character literal")),
    };
    match chars.get(i) {
        Some('\'') => Ok((value, i + 1)),
        _ => Err(AssemblyError::new(line, col, "unterminated character literal")),
    }
}

/// Scans a double-quoted string literal, applying escapes.
fn scan_string(chars: &[char], start: usize, line: u32) -> Result<(Vec<u8>, usize), AssemblyError> {
    let col = (start + 1) as u32;
    let mut bytes = Vec::new();
    let mut i = start + 1;
    loop {
        match chars.get(i) {
            None => return Err(AssemblyError::new(line, col, "unterminated string literal")),
            Some('"') => return Ok((bytes, i + 1)),
            Some('\\') => {
                let (b, next) = unescape(chars, i + 1, line)?;
                bytes.push(b);
                i = next;
            }
            Some(&c) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                i += 1;
            }
        }
    }
}

/// Decodes one escape sequence whose introducing backslash has already
/// been consumed. Returns the byte value and the index past the escape.
fn unescape(chars: &[char], i: usize, line: u32) -> Result<(u8, usize), AssemblyError> {
    let col = i as u32; // column of the backslash
    match chars.get(i) {
        Some('n') => Ok((b'\n', i + 1)),
        Some('t') => Ok((b'\t', i + 1)),
        Some('r') => Ok((b'\r', i + 1)),
        Some('0') => Ok((0, i + 1)),
        Some('\\') => Ok((b'\\', i + 1)),
        Some('\'') => Ok((b'\'', i + 1)),
        Some('"') => Ok((b'"', i + 1)),
        Some('x') => {
            let hi = chars.get(i + 1).and_then(|c| c.to_digit(16));
            let lo = chars.get(i + 2).and_then(|c| c.to_digit(16));
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok(((hi * 16 + lo) as u8, i + 3)),
                _ => Err(AssemblyError::new(line, col, "malformed \\x escape")),
            }
        }
        _ => Err(AssemblyError::new(line, col, "unknown escape sequence")),
    }
}
