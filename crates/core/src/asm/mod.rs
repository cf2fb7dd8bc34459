//! The vex64 assembler.
//!
//! Translates assembly source text into relocatable object modules:
//! 1. **Lexer:** Line-oriented tokenization with positions (`lexer`).
//! 2. **Parser:** Statements and operand shapes (`parser`).
//! 3. **Assembler:** Two-pass sizing and encoding (`assembler`).
//! 4. **Stdlib:** The embedded standard-library object set (`stdlib`).

/// Statement encoder and two-pass driver.
mod assembler;
/// Line tokenizer.
mod lexer;
/// Statement and operand parser.
mod parser;
/// Embedded standard-library modules.
mod stdlib;

pub use assembler::assemble;
pub use stdlib::stdlib;
