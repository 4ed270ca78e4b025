//! Operator-console interface to the machine.
//!
//! [`Machine`] is the only surface a console needs: reset, step, run, memory
//! deposit and inspection, cache view, keyboard/printer/file-reader access,
//! IPL and a register snapshot. The core holds no UI state.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{event, Level};

use crate::cache::{Cache, CacheLineView, CACHE_LINES};
use crate::decoder::Decoder;
use crate::execute::{execute_instruction, ExecuteOutcome};
use crate::loader::{parse_load_file, LoadError};
use crate::peripherals::{parse_keyboard_input, DeviceBus, InputError};
use crate::state::{
    GeneralRegister, IndexRegister, RegisterFile, RunState, GENERAL_REGISTER_COUNT,
    INDEX_REGISTER_COUNT,
};
use crate::{MachineFault, Memory, FAULT_VECTOR_ADDR, SAVED_PC_ADDR};

/// Operator deposit or inspection outside memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Address is not in `0..2048`.
    #[error("address {0:o} is outside memory")]
    OutOfRange(u16),
}

/// Run-loop configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Maximum steps per [`Machine::run`] call; `None` runs unbounded.
    pub step_limit: Option<u64>,
    /// Yield the thread between steps so an observer can read state.
    pub yield_between_steps: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            step_limit: None,
            yield_between_steps: true,
        }
    }
}

/// Status from one step attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction executed; the machine can continue.
    Retired,
    /// `HLT` executed.
    Halted,
    /// `IN` found no keyboard input; `PC` points back at the `IN`.
    WaitingForInput,
    /// A fault was raised and latched.
    Fault(MachineFault),
    /// Nothing executed because the machine is halted or fault-latched.
    Refused,
}

/// Why [`Machine::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StopReason {
    /// `HLT` executed, or the machine was already halted.
    Halted,
    /// A fault was raised, or one was already latched.
    Fault(MachineFault),
    /// Suspended on keyboard input.
    WaitingForInput,
    /// The operator's halt flag was observed.
    OperatorHalt,
    /// [`MachineConfig::step_limit`] reached.
    StepLimit,
}

/// Aggregated outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Step attempts made during this run.
    pub steps: u64,
    /// Why the run stopped.
    pub stop: StopReason,
}

/// Register and status observation for operator displays.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineSnapshot {
    /// Program counter.
    pub pc: u16,
    /// Instruction register.
    pub ir: u16,
    /// Memory address register.
    pub mar: u16,
    /// Memory buffer register.
    pub mbr: u16,
    /// Machine fault register.
    pub mfr: u8,
    /// Condition code.
    pub cc: u8,
    /// `R0..R3`.
    pub gpr: [u16; GENERAL_REGISTER_COUNT],
    /// `X1..X3`.
    pub ixr: [u16; INDEX_REGISTER_COUNT],
    /// Suspended on keyboard input.
    pub waiting_for_input: bool,
    /// Inside a run loop.
    pub running: bool,
    /// Full execution state.
    pub run_state: RunState,
}

/// The simulated computer: registers, memory, cache and devices.
#[derive(Debug, Clone, Default)]
pub struct Machine {
    pub(crate) registers: RegisterFile,
    pub(crate) memory: Memory,
    pub(crate) cache: Cache,
    pub(crate) devices: DeviceBus,
    pub(crate) run_state: RunState,
    config: MachineConfig,
}

impl Machine {
    /// Creates a powered-on machine with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a powered-on machine with `config`.
    #[must_use]
    pub fn with_config(config: MachineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Power-on reset: zeroes registers and memory, invalidates the cache,
    /// clears device buffers and releases any halt or fault latch.
    pub fn reset(&mut self) {
        self.registers = RegisterFile::default();
        self.memory.clear();
        self.cache.reset();
        self.devices.reset();
        self.run_state = RunState::Idle;
    }

    /// Executes one instruction. Returns `false` when `HLT` executed, a
    /// fault was raised, or the machine refused to run because it is halted
    /// or fault-latched.
    pub fn step(&mut self) -> bool {
        matches!(
            self.step_one(),
            StepOutcome::Retired | StepOutcome::WaitingForInput
        )
    }

    /// Executes one instruction and reports exactly what happened.
    pub fn step_one(&mut self) -> StepOutcome {
        if self.run_state.is_stopped() {
            return StepOutcome::Refused;
        }

        match self.fetch_and_execute() {
            Ok(ExecuteOutcome::Continue) => {
                if self.run_state == RunState::WaitingForInput {
                    self.run_state = RunState::Idle;
                }
                StepOutcome::Retired
            }
            Ok(ExecuteOutcome::Halt) => {
                self.run_state = RunState::Halted;
                StepOutcome::Halted
            }
            Ok(ExecuteOutcome::WaitForInput) => {
                self.run_state = RunState::WaitingForInput;
                StepOutcome::WaitingForInput
            }
            Err(fault) => {
                self.latch_fault(fault);
                StepOutcome::Fault(fault)
            }
        }
    }

    fn fetch_and_execute(&mut self) -> Result<ExecuteOutcome, MachineFault> {
        let pc = self.registers.pc();
        let word = self.read_word(pc)?;
        self.registers.set_ir(word);
        self.registers.set_pc(pc.wrapping_add(1));

        let instruction = Decoder::decode(word)?;
        event!(
            Level::TRACE,
            pc = pc,
            word = word,
            instruction = %instruction,
            "execute"
        );
        execute_instruction(self, instruction)
    }

    fn latch_fault(&mut self, fault: MachineFault) {
        let pc = self.registers.pc();
        event!(
            Level::WARN,
            code = fault.as_u8(),
            pc = pc,
            "machine fault: {fault}"
        );
        self.registers.set_mfr(fault.as_u8());
        // Address 2 is always in range, so the save cannot fault again.
        if let Err(nested) = self.write_word(SAVED_PC_ADDR, pc) {
            event!(Level::ERROR, error = ?nested, "could not save faulting PC");
        }
        self.registers.set_pc(FAULT_VECTOR_ADDR);
        self.run_state = RunState::FaultLatched(fault);
    }

    /// Runs until `HLT`, a fault, keyboard suspension, the step limit, or
    /// `halt` becoming `true`. `halt` is polled between instructions.
    pub fn run(&mut self, halt: &AtomicBool) -> RunOutcome {
        let mut steps = 0u64;
        let stop = loop {
            match self.run_state {
                RunState::Halted => break StopReason::Halted,
                RunState::FaultLatched(fault) => break StopReason::Fault(fault),
                RunState::Idle | RunState::Running | RunState::WaitingForInput => {}
            }
            if halt.load(Ordering::Relaxed) {
                break StopReason::OperatorHalt;
            }
            if self.config.step_limit.is_some_and(|limit| steps >= limit) {
                break StopReason::StepLimit;
            }

            self.run_state = RunState::Running;
            steps += 1;
            match self.step_one() {
                StepOutcome::Retired => {}
                StepOutcome::Halted | StepOutcome::Refused => break StopReason::Halted,
                StepOutcome::WaitingForInput => break StopReason::WaitingForInput,
                StepOutcome::Fault(fault) => break StopReason::Fault(fault),
            }
            debug_assert!(self.cache.check_invariants(&self.memory).is_ok());

            if self.config.yield_between_steps {
                std::thread::yield_now();
            }
        };

        if self.run_state == RunState::Running {
            self.run_state = RunState::Idle;
        }
        event!(Level::INFO, steps = steps, stop = ?stop, "run stopped");
        RunOutcome { steps, stop }
    }

    /// Reads a word on the CPU path: through the cache, updating `MAR`/`MBR`.
    pub(crate) fn read_word(&mut self, addr: u16) -> Result<u16, MachineFault> {
        self.registers.set_mar(addr);
        let value = self.cache.read(&self.memory, addr)?;
        self.registers.set_mbr(value);
        Ok(value)
    }

    /// Writes a word on the CPU path: write-through, write-allocate.
    pub(crate) fn write_word(&mut self, addr: u16, value: u16) -> Result<(), MachineFault> {
        self.registers.set_mar(addr);
        self.registers.set_mbr(value);
        self.cache.write(&mut self.memory, addr, value)
    }

    /// Operator deposit. Writes memory directly and refreshes any cached copy
    /// in place without allocating a line.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::OutOfRange`] when `addr` is outside memory.
    pub fn load(&mut self, addr: u16, word: u16) -> Result<(), AddressError> {
        self.memory
            .write(addr, word)
            .map_err(|_| AddressError::OutOfRange(addr))?;
        self.cache.refresh(addr, word);
        Ok(())
    }

    /// Operator inspection. Reads memory without touching the cache or
    /// `MAR`/`MBR`.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::OutOfRange`] when `addr` is outside memory.
    pub fn inspect(&self, addr: u16) -> Result<u16, AddressError> {
        self.memory
            .read(addr)
            .map_err(|_| AddressError::OutOfRange(addr))
    }

    /// Initial program load from load-file text: reset, deposit every
    /// record and point `PC` at the first record. Returns the start address.
    ///
    /// # Errors
    ///
    /// Returns the [`LoadError`] naming the first bad line. The machine is
    /// not modified in that case.
    pub fn ipl(&mut self, text: &str) -> Result<u16, LoadError> {
        let records = parse_load_file(text)?;
        self.reset();
        let deposited = self.memory.deposit(&records);
        let start = records.first().map_or(0, |record| record.address);
        self.registers.set_pc(start);
        event!(
            Level::DEBUG,
            records = records.len(),
            deposited = deposited,
            start = start,
            "initial program load"
        );
        Ok(start)
    }

    /// Cache lines for display.
    #[must_use]
    pub fn cache_view(&self) -> [CacheLineView; CACHE_LINES] {
        self.cache.view()
    }

    /// Cache pane text, one `L<i>: ...` row per line.
    #[must_use]
    pub fn render_cache(&self) -> String {
        self.cache.render()
    }

    /// Delivers a keyboard word and clears the waiting-for-input state.
    pub fn submit_keyboard(&mut self, value: u16) {
        self.devices.keyboard_mut().submit(value);
        if self.run_state == RunState::WaitingForInput {
            self.run_state = RunState::Idle;
        }
    }

    /// Parses operator text and delivers it as a keyboard word.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Empty`] for blank text.
    pub fn submit_keyboard_text(&mut self, text: &str) -> Result<u16, InputError> {
        let value = parse_keyboard_input(text)?;
        self.submit_keyboard(value);
        Ok(value)
    }

    /// Drains printer output.
    pub fn take_printer(&mut self) -> String {
        self.devices.printer_mut().take()
    }

    /// Queues words on the file reader.
    pub fn preload_file(&mut self, words: &[u16]) {
        self.devices.file_reader_mut().preload(words);
    }

    /// Current execution state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// `true` while suspended on keyboard input.
    #[must_use]
    pub fn is_waiting_for_input(&self) -> bool {
        self.run_state == RunState::WaitingForInput
    }

    /// Register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Mutable register file for operator deposits.
    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    /// Backing memory.
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Cache state.
    #[must_use]
    pub const fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Register and status observation.
    #[must_use]
    pub fn snapshot(&self) -> MachineSnapshot {
        let regs = &self.registers;
        MachineSnapshot {
            pc: regs.pc(),
            ir: regs.ir(),
            mar: regs.mar(),
            mbr: regs.mbr(),
            mfr: regs.mfr(),
            cc: regs.cc(),
            gpr: GeneralRegister::ALL.map(|reg| regs.gpr(reg)),
            ixr: IndexRegister::ALL.map(|reg| regs.ixr(reg)),
            waiting_for_input: self.is_waiting_for_input(),
            running: self.run_state == RunState::Running,
            run_state: self.run_state,
        }
    }
}
