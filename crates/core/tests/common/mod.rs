//! Shared test infrastructure.
//!
//! Every test program goes through the real pipeline: assemble each
//! module, append the standard library, link at `(text, main)`, and
//! boot an emulator with the default machine configuration.

use vex64_core::exec::VirtStream;
use vex64_core::{assemble, link, stdlib, Emulator, Executable, MachineConfig, SegmentKind};

/// A large budget that any terminating test program exhausts long
/// before the loop does.
pub const GENEROUS_BUDGET: u64 = 1_000_000;

/// Assembles `modules`, appends the standard library, and links at
/// `(text, main)`.
pub fn build(modules: &[(&str, &str)]) -> Executable {
    let mut objects: Vec<_> = modules
        .iter()
        .map(|(name, source)| {
            assemble(name, source).unwrap_or_else(|err| panic!("assembly of {name} failed: {err}"))
        })
        .collect();
    objects.extend(stdlib());
    link(&objects, (SegmentKind::Text, "main")).expect("link failed")
}

/// A booted emulator plus the host ends of its stdio streams.
#[derive(Debug)]
pub struct TestMachine {
    /// The emulator under test, initialized and ready to run.
    pub emu: Emulator,
    /// Host end of the guest's standard input.
    pub stdin: VirtStream,
    /// Host end of the guest's standard output.
    pub stdout: VirtStream,
    /// Host end of the guest's standard error.
    pub stderr: VirtStream,
}

impl TestMachine {
    /// Builds `source` as a single module and boots it with the
    /// default machine configuration.
    pub fn boot(source: &str) -> Self {
        Self::boot_with(source, &MachineConfig::default())
    }

    /// Like [`TestMachine::boot`] with an explicit machine configuration.
    pub fn boot_with(source: &str, config: &MachineConfig) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        let exe = build(&[("test.asm", source)]);
        let mut emu = Emulator::new();
        emu.init(&exe, config).expect("init failed");
        let (stdin, stdout, stderr) = emu.setup_stdio();
        Self { emu, stdin, stdout, stderr }
    }

    /// Runs with a generous budget and returns the exit status,
    /// panicking on any other stop reason.
    pub fn run_to_exit(&mut self) -> i32 {
        let (_, reason) = self.emu.execute_cycles(GENEROUS_BUDGET);
        match reason {
            vex64_core::StopReason::Terminated(code) => code,
            other => panic!("program did not terminate: {other:?}"),
        }
    }
}
