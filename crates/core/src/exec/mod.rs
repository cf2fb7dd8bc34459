//! Sandboxed machine emulator.
//!
//! An [`Emulator`] interprets a linked [`Executable`] in a private
//! address space with virtualized stdio. A run proceeds as:
//!
//! 1. [`Emulator::init`] lays out memory, zeroes machine state, and
//!    plants the exit vector on the fresh stack.
//! 2. [`Emulator::execute_cycles`] interprets instructions until the
//!    guest terminates, a fault occurs, input would block, or the
//!    cycle budget runs out.
//! 3. Accessors report the outcome; a suspended machine resumes
//!    bit-exactly from where it stopped.
//!
//! Each instance exclusively owns its state, so independent emulators
//! may run on separate threads without coordination. Terminal states
//! are sticky: once `Terminated` or `Error`, further execution calls
//! are no-ops that report the same outcome.

mod alu;
mod flags;
mod memory;
mod registers;
mod stdio;

pub use flags::Flags;
pub use memory::Memory;
pub use registers::RegisterFile;
pub use stdio::VirtStream;

use tracing::debug;

use crate::common::constants::{EXIT_VECTOR, FD_STDERR, FD_STDIN, FD_STDOUT};
use crate::common::{Executable, Fault, LoadError};
use crate::config::MachineConfig;
use crate::isa::{self, opcodes as op, Size};

/// Lifecycle of one emulator instance.
///
/// `Running` exists only inside `execute_cycles`; between calls the
/// observable states are `Uninitialized`, `Suspended`, `Terminated`,
/// and `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionState {
    /// No executable loaded yet.
    Uninitialized,
    /// Mid-execution; never observed between calls.
    Running,
    /// Stopped on budget, single-step, or would-block; resumable.
    Suspended,
    /// Guest requested exit with the recorded status.
    Terminated(i32),
    /// Unrecoverable fault; the machine state is frozen for inspection.
    Error(Fault),
}

/// Why the most recent `execute_cycles` call returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `init` has not been called.
    NotRunning,
    /// The cycle budget ran out before a terminal condition.
    BudgetExhausted,
    /// One instruction retired in single-step mode.
    SingleStep,
    /// A read against empty, still-open stdin; resumable once the host
    /// supplies input or closes the stream.
    WouldBlock,
    /// Guest exit with the given status.
    Terminated(i32),
    /// Execution faulted.
    Fault(Fault),
}

/// Whether `execute_cycles` free-runs or retires one instruction per
/// call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Run until the budget, a fault, or termination.
    #[default]
    FreeRun,
    /// Retire exactly one instruction per call.
    SingleStep,
}

enum StepOutcome {
    Continue,
    Terminated(i32),
    WouldBlock,
}

#[derive(Clone, Copy)]
enum Place {
    Reg { index: u8, high: bool },
    Mem(u64),
}

/// A sandboxed interpreter for one linked executable.
#[derive(Debug)]
pub struct Emulator {
    /// General-purpose registers, exposed for host inspection and
    /// test setup. Aliased views live on [`RegisterFile`].
    pub regs: RegisterFile,
    /// Packed flags word with per-flag and condition-code accessors.
    pub flags: Flags,
    mem: Option<Memory>,
    ip: u64,
    state: ExecutionState,
    mode: ExecMode,
    cycles: u64,
    stdin: VirtStream,
    stdout: VirtStream,
    stderr: VirtStream,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    /// Creates an uninitialized emulator.
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            flags: Flags::default(),
            mem: None,
            ip: 0,
            state: ExecutionState::Uninitialized,
            mode: ExecMode::default(),
            cycles: 0,
            stdin: VirtStream::new(),
            stdout: VirtStream::new(),
            stderr: VirtStream::new(),
        }
    }

    /// Loads `exe` into a fresh private memory image and resets all
    /// machine state.
    ///
    /// The stack pointer starts at the top of the stack with the exit
    /// vector pushed, so a `ret` from the entry function terminates
    /// with `eax` as the exit status.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when the image layout is inconsistent,
    /// does not fit the configured address space, or names an entry
    /// address outside its text segment.
    pub fn init(&mut self, exe: &Executable, config: &MachineConfig) -> Result<(), LoadError> {
        let mut mem = Memory::load(exe, config)?;
        self.regs.reset();
        self.flags = Flags::default();
        self.cycles = 0;
        self.ip = exe.entry;

        let sp = mem.limit() - 8;
        mem.poke_uint(sp, 8, EXIT_VECTOR);
        self.regs.set_rsp(sp);

        debug!(
            entry = format_args!("{:#x}", exe.entry),
            limit = format_args!("{:#x}", mem.limit()),
            "emulator initialized"
        );
        self.mem = Some(mem);
        self.state = ExecutionState::Running;
        Ok(())
    }

    /// Returns host handles to the guest's stdin, stdout, and stderr.
    ///
    /// Idempotent: every call returns handles to the same three
    /// streams. The host writes (and closes) stdin and drains the
    /// other two.
    pub fn setup_stdio(&self) -> (VirtStream, VirtStream, VirtStream) {
        (self.stdin.clone(), self.stdout.clone(), self.stderr.clone())
    }

    /// Runs the fetch-decode-execute loop for at most `budget`
    /// instructions, returning how many retired and why the loop
    /// stopped.
    ///
    /// After a terminal state this is a no-op reporting `(0, reason)`
    /// with the same terminal reason; before `init` it reports
    /// `(0, NotRunning)`.
    pub fn execute_cycles(&mut self, budget: u64) -> (u64, StopReason) {
        match &self.state {
            ExecutionState::Uninitialized => return (0, StopReason::NotRunning),
            ExecutionState::Terminated(code) => return (0, StopReason::Terminated(*code)),
            ExecutionState::Error(fault) => return (0, StopReason::Fault(fault.clone())),
            ExecutionState::Running | ExecutionState::Suspended => {}
        }
        let Some(mut mem) = self.mem.take() else {
            return (0, StopReason::NotRunning);
        };
        self.state = ExecutionState::Running;
        let result = self.run(&mut mem, budget);
        self.mem = Some(mem);
        result
    }

    /// Observable state as of the most recent call.
    pub fn get_state(&self) -> &ExecutionState {
        &self.state
    }

    /// Guest exit status, once terminated.
    pub fn get_return_value(&self) -> Option<i32> {
        match self.state {
            ExecutionState::Terminated(code) => Some(code),
            _ => None,
        }
    }

    /// Recorded fault, once errored.
    pub fn get_error(&self) -> Option<&Fault> {
        match &self.state {
            ExecutionState::Error(fault) => Some(fault),
            _ => None,
        }
    }

    /// Instructions retired since `init`.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Current instruction pointer.
    pub fn instruction_pointer(&self) -> u64 {
        self.ip
    }

    /// Selects free-run or single-step execution.
    pub fn set_exec_mode(&mut self, mode: ExecMode) {
        self.mode = mode;
    }

    /// Current execution mode.
    pub fn exec_mode(&self) -> ExecMode {
        self.mode
    }

    fn run(&mut self, mem: &mut Memory, budget: u64) -> (u64, StopReason) {
        let mut executed = 0u64;
        while executed < budget {
            if self.ip == EXIT_VECTOR {
                let code = self.regs.get_eax() as i32;
                self.state = ExecutionState::Terminated(code);
                debug!(code, cycles = self.cycles, "guest returned through exit vector");
                return (executed, StopReason::Terminated(code));
            }
            let insn_addr = self.ip;
            match self.step(mem, insn_addr) {
                Ok(StepOutcome::Continue) => {
                    executed += 1;
                    self.cycles += 1;
                }
                Ok(StepOutcome::Terminated(code)) => {
                    executed += 1;
                    self.cycles += 1;
                    self.state = ExecutionState::Terminated(code);
                    debug!(code, cycles = self.cycles, "guest terminated");
                    return (executed, StopReason::Terminated(code));
                }
                Ok(StepOutcome::WouldBlock) => {
                    self.ip = insn_addr;
                    self.state = ExecutionState::Suspended;
                    return (executed, StopReason::WouldBlock);
                }
                Err(fault) => {
                    self.state = ExecutionState::Error(fault.clone());
                    debug!(%fault, ip = format_args!("{insn_addr:#x}"), "guest faulted");
                    return (executed, StopReason::Fault(fault));
                }
            }
            if self.mode == ExecMode::SingleStep {
                self.state = ExecutionState::Suspended;
                return (executed, StopReason::SingleStep);
            }
        }
        self.state = ExecutionState::Suspended;
        (executed, StopReason::BudgetExhausted)
    }

    fn step(&mut self, mem: &mut Memory, insn_addr: u64) -> Result<StepOutcome, Fault> {
        let opcode = self.fetch_u8(mem)?;
        match opcode {
            op::NOP => {}
            op::HLT => {
                self.require_privilege(insn_addr)?;
                return Ok(StepOutcome::Terminated(self.regs.get_eax() as i32));
            }
            op::SYSCALL => return self.syscall(mem),
            op::RET => self.ip = self.pop64(mem)?,
            op::PUSH => self.exec_push(mem, insn_addr)?,
            op::POP => {
                let reg = self.fetch_u8(mem)?;
                let value = self.pop64(mem)?;
                self.regs.write(reg & 0xF, Size::Qword, false, value);
            }
            op::LEA => {
                let mode = self.fetch_u8(mem)?;
                let (form, _, _, _) = isa::unpack_mode(mode);
                if form != isa::FORM_RM {
                    return Err(Fault::IllegalInstruction { addr: insn_addr, opcode });
                }
                let dst = self.fetch_u8(mem)?;
                let addr = self.decode_mem(mem)?;
                self.regs.write(dst & 0xF, Size::Qword, false, addr);
            }
            op::MOV
            | op::ADD
            | op::SUB
            | op::CMP
            | op::AND
            | op::OR
            | op::XOR
            | op::TEST
            | op::MUL
            | op::IMUL
            | op::DIV
            | op::IDIV => self.exec_binary(mem, opcode, insn_addr)?,
            op::INC | op::DEC | op::NEG | op::NOT => self.exec_unary(mem, opcode, insn_addr)?,
            op::SHL | op::SHR | op::SAR => self.exec_shift(mem, opcode, insn_addr)?,
            op::JMP => {
                let rel = self.fetch_rel32(mem)?;
                self.ip = self.ip.wrapping_add(rel as u64);
            }
            op::CALL => {
                let rel = self.fetch_rel32(mem)?;
                self.push64(mem, self.ip)?;
                self.ip = self.ip.wrapping_add(rel as u64);
            }
            op::JCC => {
                let cc = self.fetch_u8(mem)?;
                if cc > 0xF {
                    return Err(Fault::IllegalInstruction { addr: insn_addr, opcode });
                }
                let rel = self.fetch_rel32(mem)?;
                if self.flags.condition(cc) {
                    self.ip = self.ip.wrapping_add(rel as u64);
                }
            }
            op::STC => self.flags.assign_cf(true),
            op::CLC => self.flags.assign_cf(false),
            op::CMC => self.flags.assign_cf(!self.flags.get_cf()),
            op::STD => self.flags.assign_df(true),
            op::CLD => self.flags.assign_df(false),
            op::STI => {
                self.require_privilege(insn_addr)?;
                self.flags.assign_if(true);
            }
            op::CLI => {
                self.require_privilege(insn_addr)?;
                self.flags.assign_if(false);
            }
            op::PUSHF => self.push64(mem, self.flags.0)?,
            op::POPF => {
                let value = self.pop64(mem)? & flags::DEFINED_MASK;
                if (value ^ self.flags.0) & flags::PRIVILEGED_MASK != 0 {
                    self.require_privilege(insn_addr)?;
                }
                self.flags.0 = value;
            }
            _ => return Err(Fault::IllegalInstruction { addr: insn_addr, opcode }),
        }
        Ok(StepOutcome::Continue)
    }

    fn fetch_u8(&mut self, mem: &Memory) -> Result<u8, Fault> {
        let byte = mem.fetch_u8(self.ip)?;
        self.ip += 1;
        Ok(byte)
    }

    fn fetch_uint(&mut self, mem: &Memory, len: u64) -> Result<u64, Fault> {
        let value = mem.fetch_uint(self.ip, len)?;
        self.ip += len;
        Ok(value)
    }

    /// Fetches a rel32 displacement, sign-extended. Displacements are
    /// measured from the end of the field, which is exactly where the
    /// instruction pointer rests after the fetch.
    fn fetch_rel32(&mut self, mem: &Memory) -> Result<i64, Fault> {
        Ok(i64::from(self.fetch_uint(mem, 4)? as u32 as i32))
    }

    /// Decodes a `[base][disp64]` memory operand to an absolute
    /// address.
    fn decode_mem(&mut self, mem: &Memory) -> Result<u64, Fault> {
        let base = self.fetch_u8(mem)?;
        let disp = self.fetch_uint(mem, 8)?;
        if base == isa::NO_BASE {
            Ok(disp)
        } else {
            Ok(disp.wrapping_add(self.regs.read(base & 0xF, Size::Qword, false)))
        }
    }

    fn read_place(&self, mem: &Memory, place: Place, size: Size) -> Result<u64, Fault> {
        match place {
            Place::Reg { index, high } => Ok(self.regs.read(index, size, high)),
            Place::Mem(addr) => mem.read_uint(addr, size.bytes()),
        }
    }

    fn write_place(
        &mut self,
        mem: &mut Memory,
        place: Place,
        size: Size,
        value: u64,
    ) -> Result<(), Fault> {
        match place {
            Place::Reg { index, high } => {
                self.regs.write(index, size, high, value);
                Ok(())
            }
            Place::Mem(addr) => mem.write_uint(addr, size.bytes(), value),
        }
    }

    fn exec_binary(&mut self, mem: &mut Memory, opcode: u8, insn_addr: u64) -> Result<(), Fault> {
        let mode = self.fetch_u8(mem)?;
        let (form, size, dst_high, src_high) = isa::unpack_mode(mode);
        let (place, src) = match form {
            isa::FORM_RR => {
                let pair = self.fetch_u8(mem)?;
                let src = self.regs.read(pair & 0xF, size, src_high);
                (Place::Reg { index: pair >> 4, high: dst_high }, src)
            }
            isa::FORM_RI => {
                let dst = self.fetch_u8(mem)?;
                let imm = self.fetch_uint(mem, size.bytes())?;
                (Place::Reg { index: dst & 0xF, high: dst_high }, imm)
            }
            isa::FORM_RM => {
                let dst = self.fetch_u8(mem)?;
                let addr = self.decode_mem(mem)?;
                let src = mem.read_uint(addr, size.bytes())?;
                (Place::Reg { index: dst & 0xF, high: dst_high }, src)
            }
            isa::FORM_MR => {
                let addr = self.decode_mem(mem)?;
                let src_reg = self.fetch_u8(mem)?;
                (Place::Mem(addr), self.regs.read(src_reg & 0xF, size, src_high))
            }
            isa::FORM_MI => {
                let addr = self.decode_mem(mem)?;
                let imm = self.fetch_uint(mem, size.bytes())?;
                (Place::Mem(addr), imm)
            }
            _ => return Err(Fault::IllegalInstruction { addr: insn_addr, opcode }),
        };

        if opcode == op::MOV {
            return self.write_place(mem, place, size, src);
        }
        let dst = self.read_place(mem, place, size)?;
        let flags = &mut self.flags;
        let result = match opcode {
            op::ADD => alu::add(flags, size, dst, src),
            op::SUB => alu::sub(flags, size, dst, src),
            op::CMP => {
                alu::sub(flags, size, dst, src);
                return Ok(());
            }
            op::AND => alu::and(flags, size, dst, src),
            op::OR => alu::or(flags, size, dst, src),
            op::XOR => alu::xor(flags, size, dst, src),
            op::TEST => {
                alu::and(flags, size, dst, src);
                return Ok(());
            }
            op::MUL => alu::mul(flags, size, dst, src),
            op::IMUL => alu::imul(flags, size, dst, src),
            op::DIV => alu::div(flags, size, dst, src)
                .map_err(|reason| Fault::ArithmeticFault { addr: insn_addr, reason })?,
            op::IDIV => alu::idiv(flags, size, dst, src)
                .map_err(|reason| Fault::ArithmeticFault { addr: insn_addr, reason })?,
            _ => return Err(Fault::IllegalInstruction { addr: insn_addr, opcode }),
        };
        self.write_place(mem, place, size, result)
    }

    fn exec_unary(&mut self, mem: &mut Memory, opcode: u8, insn_addr: u64) -> Result<(), Fault> {
        let mode = self.fetch_u8(mem)?;
        let (form, size, dst_high, _) = isa::unpack_mode(mode);
        let place = match form {
            isa::FORM_RR => {
                let pair = self.fetch_u8(mem)?;
                Place::Reg { index: pair >> 4, high: dst_high }
            }
            isa::FORM_MR => Place::Mem(self.decode_mem(mem)?),
            _ => return Err(Fault::IllegalInstruction { addr: insn_addr, opcode }),
        };
        let value = self.read_place(mem, place, size)?;
        let result = match opcode {
            op::INC => alu::inc(&mut self.flags, size, value),
            op::DEC => alu::dec(&mut self.flags, size, value),
            op::NEG => alu::neg(&mut self.flags, size, value),
            op::NOT => !value & size.mask(),
            _ => return Err(Fault::IllegalInstruction { addr: insn_addr, opcode }),
        };
        self.write_place(mem, place, size, result)
    }

    fn exec_shift(&mut self, mem: &mut Memory, opcode: u8, insn_addr: u64) -> Result<(), Fault> {
        let mode = self.fetch_u8(mem)?;
        let (form, size, dst_high, _) = isa::unpack_mode(mode);
        let (place, count) = match form {
            isa::FORM_RR => {
                let pair = self.fetch_u8(mem)?;
                let count = self.regs.read(pair & 0xF, Size::Byte, false);
                (Place::Reg { index: pair >> 4, high: dst_high }, count)
            }
            isa::FORM_RI => {
                let dst = self.fetch_u8(mem)?;
                let count = u64::from(self.fetch_u8(mem)?);
                (Place::Reg { index: dst & 0xF, high: dst_high }, count)
            }
            isa::FORM_MR => {
                let addr = self.decode_mem(mem)?;
                let count_reg = self.fetch_u8(mem)?;
                (Place::Mem(addr), self.regs.read(count_reg & 0xF, Size::Byte, false))
            }
            isa::FORM_MI => {
                let addr = self.decode_mem(mem)?;
                let count = u64::from(self.fetch_u8(mem)?);
                (Place::Mem(addr), count)
            }
            _ => return Err(Fault::IllegalInstruction { addr: insn_addr, opcode }),
        };
        let value = self.read_place(mem, place, size)?;
        let count = count as u32;
        let result = match opcode {
            op::SHL => alu::shl(&mut self.flags, size, value, count),
            op::SHR => alu::shr(&mut self.flags, size, value, count),
            op::SAR => alu::sar(&mut self.flags, size, value, count),
            _ => return Err(Fault::IllegalInstruction { addr: insn_addr, opcode }),
        };
        self.write_place(mem, place, size, result)
    }

    fn exec_push(&mut self, mem: &mut Memory, insn_addr: u64) -> Result<(), Fault> {
        let mode = self.fetch_u8(mem)?;
        let (form, _, _, _) = isa::unpack_mode(mode);
        let value = match form {
            isa::FORM_RR => {
                let pair = self.fetch_u8(mem)?;
                self.regs.read(pair >> 4, Size::Qword, false)
            }
            isa::FORM_RI => self.fetch_uint(mem, 8)?,
            _ => return Err(Fault::IllegalInstruction { addr: insn_addr, opcode: op::PUSH }),
        };
        self.push64(mem, value)
    }

    fn push64(&mut self, mem: &mut Memory, value: u64) -> Result<(), Fault> {
        let sp = self.regs.get_rsp().wrapping_sub(8);
        if sp < mem.stack_base() || sp >= mem.limit() {
            return Err(Fault::StackOverflow { sp });
        }
        mem.write_uint(sp, 8, value)?;
        self.regs.set_rsp(sp);
        Ok(())
    }

    fn pop64(&mut self, mem: &Memory) -> Result<u64, Fault> {
        let sp = self.regs.get_rsp();
        let value = mem.read_uint(sp, 8)?;
        self.regs.set_rsp(sp.wrapping_add(8));
        Ok(value)
    }

    fn require_privilege(&self, addr: u64) -> Result<(), Fault> {
        let iopl = self.flags.get_iopl();
        if iopl == 3 {
            Ok(())
        } else {
            Err(Fault::PrivilegeViolation { addr, iopl })
        }
    }

    fn syscall(&mut self, mem: &mut Memory) -> Result<StepOutcome, Fault> {
        let number = self.regs.get_rax();
        match number {
            0 => Ok(StepOutcome::Terminated(self.regs.get_edi() as i32)),
            1 => {
                let fd = self.regs.get_rdi();
                let buf = self.regs.get_rsi();
                let len = self.regs.get_rdx();
                if fd != FD_STDIN {
                    self.regs.set_rax(u64::MAX);
                    return Ok(StepOutcome::Continue);
                }
                if len == 0 {
                    self.regs.set_rax(0);
                    return Ok(StepOutcome::Continue);
                }
                let data = self.stdin.read(len as usize);
                if data.is_empty() {
                    if self.stdin.is_closed() {
                        self.regs.set_rax(0);
                        return Ok(StepOutcome::Continue);
                    }
                    return Ok(StepOutcome::WouldBlock);
                }
                mem.write_bytes(buf, &data)?;
                self.regs.set_rax(data.len() as u64);
                Ok(StepOutcome::Continue)
            }
            2 => {
                let fd = self.regs.get_rdi();
                let buf = self.regs.get_rsi();
                let len = self.regs.get_rdx();
                let stream = match fd {
                    FD_STDOUT => &self.stdout,
                    FD_STDERR => &self.stderr,
                    _ => {
                        self.regs.set_rax(u64::MAX);
                        return Ok(StepOutcome::Continue);
                    }
                };
                stream.write(mem.read_slice(buf, len)?);
                self.regs.set_rax(len);
                Ok(StepOutcome::Continue)
            }
            _ => Err(Fault::UnknownSyscall { number }),
        }
    }
}
