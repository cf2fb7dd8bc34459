/// Error reporting with line and column positions.
pub mod diagnostics;

/// Symbol tables, relocations, and segment bytes of assembled modules.
pub mod objects;
