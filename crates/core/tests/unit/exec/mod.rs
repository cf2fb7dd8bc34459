/// Aliased register views over shared bits.
pub mod register_views;

/// Condition-code truth tables over the flags word.
pub mod condition_codes;

/// Whole-program runs: arithmetic, control flow, memory, faults.
pub mod programs;


/// Cycle budgets, suspend/resume, single-step, terminal stickiness.
pub mod scheduling;
