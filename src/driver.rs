//! # Accelerator Driver
//!
//! Runs one request/response cycle against the accelerator, modeled as an explicit state
//! machine:
//!
//! ```text
//! Idle -> Configured -> Triggered -> Running -> Done
//!                           |
//!                           +-----> FailedTimeout
//! ```
//!
//! Each call to [AcceleratorDriver::step] performs exactly one transition, and at most one status
//! read. The two hardware protocol variants (with or without a busy bit, with or without a poll
//! ceiling) are configurations of this single driver, see [DriverConfig].

use core::mem;

use tpu_core::regs::{ctrl, status};
use tpu_core::N;

use crate::golden::{Matrix, ResultGrid};
use crate::registers::AcceleratorRegisters;

/// Poll ceiling of the bounded protocol variant.
pub const BOUNDED_POLL_LIMIT: u32 = 2048;

// ————————————————————————————— Configuration —————————————————————————————— //

/// Protocol options of the accelerator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// The status register exposes a busy bit, which must drop before done is checked.
    pub has_busy_bit: bool,
    /// Write the clear-done command before the start command.
    pub clear_done_before_start: bool,
    /// Maximum number of status reads before giving up, wait forever if None.
    pub poll_limit: Option<u32>,
}

impl DriverConfig {
    /// Busy and done bits, no poll ceiling.
    pub const MINIMAL: DriverConfig = DriverConfig {
        has_busy_bit: true,
        clear_done_before_start: true,
        poll_limit: None,
    };

    /// Done bit only, bounded wait.
    pub const BOUNDED: DriverConfig = DriverConfig {
        has_busy_bit: false,
        clear_done_before_start: true,
        poll_limit: Some(BOUNDED_POLL_LIMIT),
    };
}

// ————————————————————————————— State Machine —————————————————————————————— //

/// The status condition the driver is currently waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollPhase {
    /// Waiting for the busy bit to drop.
    Busy,
    /// Waiting for the done bit to rise.
    Done,
}

/// Where the driver stands in the request/response cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Nothing written to the device yet.
    Idle,
    /// Both input buffers are loaded.
    Configured,
    /// The start command was issued, the driver polls the status register.
    Triggered { phase: PollPhase, polls: u32 },
    /// The accelerator reported completion, the output buffer is valid.
    Running,
    /// The accelerator did not complete within the poll ceiling.
    FailedTimeout { polls: u32 },
    /// The output buffer has been read.
    Done(ResultGrid),
}

impl DriverState {
    /// Whether the driver is finished, further steps leave the state unchanged.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DriverState::FailedTimeout { .. } | DriverState::Done(_))
    }
}

/// Terminal result of a driver run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The accelerator completed, with the result read from the output buffer.
    Completed(ResultGrid),
    /// The accelerator never completed, the output buffer was not read.
    TimedOut { polls: u32 },
}

// ————————————————————————————————— Driver ————————————————————————————————— //

/// Drives one multiplication on the accelerator behind `R`.
pub struct AcceleratorDriver<R> {
    registers: R,
    config: DriverConfig,
    a: Matrix,
    b: Matrix,
    state: DriverState,
}

impl<R: AcceleratorRegisters> AcceleratorDriver<R> {
    /// Prepares a request computing `a * b` on the accelerator behind `registers`.
    pub fn new(registers: R, config: DriverConfig, a: Matrix, b: Matrix) -> Self {
        AcceleratorDriver {
            registers,
            config,
            a,
            b,
            state: DriverState::Idle,
        }
    }

    /// The current state.
    pub fn state(&self) -> &DriverState {
        &self.state
    }

    /// Returns the outcome, once a terminal state has been reached.
    pub fn outcome(&self) -> Option<Outcome> {
        match &self.state {
            DriverState::Done(grid) => Some(Outcome::Completed(*grid)),
            DriverState::FailedTimeout { polls } => Some(Outcome::TimedOut { polls: *polls }),
            _ => None,
        }
    }

    /// Releases the register block.
    pub fn into_registers(self) -> R {
        self.registers
    }

    /// Runs the state machine to a terminal state.
    pub fn run(&mut self) -> Outcome {
        self.run_with(|_| {})
    }

    /// Runs the state machine to a terminal state, calling `on_transition` each time the driver
    /// enters a new state.
    ///
    /// Repeated polls in the same phase are not reported.
    pub fn run_with(&mut self, mut on_transition: impl FnMut(&DriverState)) -> Outcome {
        loop {
            if let Some(outcome) = self.outcome() {
                return outcome;
            }

            let previous = self.state.clone();
            let next = self.step();
            if !same_state(&previous, next) {
                on_transition(next);
            }
        }
    }

    /// Performs a single transition, terminal states are left unchanged.
    pub fn step(&mut self) -> &DriverState {
        self.state = match self.state {
            DriverState::Idle => {
                self.load_inputs();
                DriverState::Configured
            }
            DriverState::Configured => {
                self.trigger();
                let phase = if self.config.has_busy_bit {
                    PollPhase::Busy
                } else {
                    PollPhase::Done
                };
                DriverState::Triggered { phase, polls: 0 }
            }
            DriverState::Triggered { phase, polls } => self.poll(phase, polls),
            DriverState::Running => DriverState::Done(self.read_outputs()),
            DriverState::FailedTimeout { .. } | DriverState::Done(_) => return &self.state,
        };

        &self.state
    }

    fn load_inputs(&mut self) {
        for r in 0..N {
            for c in 0..N {
                let index = r * N + c;
                self.registers.write_input_a(index, self.a[r][c]);
                self.registers.write_input_b(index, self.b[r][c]);
            }
        }
        log::debug!("Loaded input matrices");
    }

    fn trigger(&mut self) {
        // A done flag left by a previous run must not be mistaken for the completion of this one.
        if self.config.clear_done_before_start {
            self.registers.write_control(ctrl::CLEAR_DONE);
        }
        self.registers.write_control(ctrl::START);
        log::debug!("Accelerator started");
    }

    fn poll(&mut self, phase: PollPhase, polls: u32) -> DriverState {
        let value = self.registers.read_status();
        let polls = polls.saturating_add(1);
        log::trace!("Status: 0x{:x} ({:?} phase, poll {})", value, phase, polls);

        // Busy and done do not flip atomically: once busy drops, done is checked on a fresh read.
        let next = match phase {
            PollPhase::Busy if value & status::BUSY == 0 => {
                log::debug!("Accelerator no longer busy after {} polls", polls);
                DriverState::Triggered {
                    phase: PollPhase::Done,
                    polls,
                }
            }
            PollPhase::Done if value & status::DONE != 0 => {
                log::debug!("Accelerator done after {} polls", polls);
                return DriverState::Running;
            }
            _ => DriverState::Triggered { phase, polls },
        };

        match self.config.poll_limit {
            Some(limit) if polls >= limit => {
                log::error!("Accelerator did not complete within {} polls", limit);
                DriverState::FailedTimeout { polls }
            }
            _ => next,
        }
    }

    fn read_outputs(&mut self) -> ResultGrid {
        let mut grid = [[0u32; N]; N];
        for (index, cell) in grid.iter_mut().flatten().enumerate() {
            *cell = self.registers.read_output(index);
        }
        log::debug!("Read output matrix");
        grid
    }
}

/// Two states are the same if they only differ by their poll count.
fn same_state(a: &DriverState, b: &DriverState) -> bool {
    match (a, b) {
        (
            DriverState::Triggered { phase: pa, .. },
            DriverState::Triggered { phase: pb, .. },
        ) => pa == pb,
        _ => mem::discriminant(a) == mem::discriminant(b),
    }
}
