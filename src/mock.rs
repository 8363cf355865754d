//! Test doubles for the accelerator and the signature location
//!
//! The fake accelerator records every register operation, so that tests can check the exact
//! order of accesses, and scripts the values returned by the status register.

use std::collections::VecDeque;

use tpu_core::regs::ctrl;
use tpu_core::signature::RECORD_WORDS;
use tpu_core::{MAT_ELEMS, N};

use crate::golden::{self, Matrix};
use crate::registers::AcceleratorRegisters;
use crate::signature::SignatureSink;

/// A register operation performed on the fake accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReadId,
    ReadVersion,
    WriteControl(u32),
    /// A status read, with the value that was returned.
    ReadStatus(u32),
    WriteA { index: usize, value: u8 },
    WriteB { index: usize, value: u8 },
    /// An output read, with the value that was returned.
    ReadOutput { index: usize, value: u32 },
}

// ———————————————————————————— Fake Accelerator ———————————————————————————— //

/// A software model of the accelerator.
///
/// When started, it multiplies whatever was loaded into its input buffers, then applies the
/// injected corruptions to the output buffer. Status reads pop values from a script, and return
/// `settled_status` once the script is exhausted.
#[derive(Debug)]
pub struct FakeAccelerator {
    pub operations: Vec<Operation>,
    pub id: u32,
    pub version: u32,
    a: [u8; MAT_ELEMS],
    b: [u8; MAT_ELEMS],
    c: [u32; MAT_ELEMS],
    status_script: VecDeque<u32>,
    settled_status: u32,
    corruptions: Vec<(usize, u32)>,
}

impl FakeAccelerator {
    /// An accelerator whose status register returns each value of `script` once, then
    /// `settled_status` forever.
    pub fn with_status(script: &[u32], settled_status: u32) -> Self {
        FakeAccelerator {
            operations: Vec::new(),
            id: 0x5450_5531,
            version: 0x0001_0000,
            a: [0; MAT_ELEMS],
            b: [0; MAT_ELEMS],
            c: [0xDEAD_BEEF; MAT_ELEMS],
            status_script: script.iter().copied().collect(),
            settled_status,
            corruptions: Vec::new(),
        }
    }

    /// An accelerator that never reports completion.
    pub fn never_done(status: u32) -> Self {
        Self::with_status(&[], status)
    }

    /// Overwrite one output cell with `value` whenever a multiplication completes.
    pub fn corrupt(mut self, index: usize, value: u32) -> Self {
        self.corruptions.push((index, value));
        self
    }

    pub fn status_reads(&self) -> usize {
        self.count(|op| matches!(op, Operation::ReadStatus(_)))
    }

    pub fn output_reads(&self) -> usize {
        self.count(|op| matches!(op, Operation::ReadOutput { .. }))
    }

    pub fn control_writes(&self) -> Vec<u32> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                Operation::WriteControl(value) => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Position of the first operation matching `pred`.
    pub fn position(&self, pred: impl Fn(&Operation) -> bool) -> Option<usize> {
        self.operations.iter().position(pred)
    }

    fn count(&self, pred: impl Fn(&Operation) -> bool) -> usize {
        self.operations.iter().filter(|op| pred(op)).count()
    }

    fn compute(&mut self) {
        let mut a: Matrix = [[0; N]; N];
        let mut b: Matrix = [[0; N]; N];
        for i in 0..MAT_ELEMS {
            a[i / N][i % N] = self.a[i];
            b[i / N][i % N] = self.b[i];
        }
        let result = golden::multiply(&a, &b);
        for (cell, value) in self.c.iter_mut().zip(result.iter().flatten()) {
            *cell = *value;
        }
        for &(index, value) in &self.corruptions {
            self.c[index] = value;
        }
    }
}

impl AcceleratorRegisters for FakeAccelerator {
    fn read_id(&mut self) -> u32 {
        self.operations.push(Operation::ReadId);
        self.id
    }

    fn read_version(&mut self) -> u32 {
        self.operations.push(Operation::ReadVersion);
        self.version
    }

    fn write_control(&mut self, value: u32) {
        self.operations.push(Operation::WriteControl(value));
        if value & ctrl::START != 0 {
            self.compute();
        }
    }

    fn read_status(&mut self) -> u32 {
        let status = self
            .status_script
            .pop_front()
            .unwrap_or(self.settled_status);
        self.operations.push(Operation::ReadStatus(status));
        status
    }

    fn write_input_a(&mut self, index: usize, value: u8) {
        self.operations.push(Operation::WriteA { index, value });
        self.a[index] = value;
    }

    fn write_input_b(&mut self, index: usize, value: u8) {
        self.operations.push(Operation::WriteB { index, value });
        self.b[index] = value;
    }

    fn read_output(&mut self, index: usize) -> u32 {
        let value = self.c[index];
        self.operations.push(Operation::ReadOutput { index, value });
        value
    }
}

// ————————————————————————————— Memory Signature ——————————————————————————— //

/// A signature location backed by host memory, keeping a log of all writes.
#[derive(Debug)]
pub struct MemorySink {
    /// Starts as a non-zero pattern, to check that the harness resets it.
    pub words: [u32; RECORD_WORDS],
    pub writes: Vec<(usize, u32)>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink {
            words: [0xA5A5_A5A5; RECORD_WORDS],
            writes: Vec::new(),
        }
    }
}

impl SignatureSink for MemorySink {
    fn write_word(&mut self, index: usize, value: u32) {
        self.words[index] = value;
        self.writes.push((index, value));
    }
}
