//! # Accelerator Register Interface
//!
//! Typed accessors over the accelerator register block. The [AcceleratorRegisters] trait is the
//! only way the rest of the harness touches the device, which lets the driver run against a fake
//! register block in tests.
//!
//! Every access of [MmioAccelerator] is a single volatile load or store of the declared width at
//! the declared address: the device state changes behind our back, so accesses must never be
//! elided, merged or reordered.

use core::ptr;

use tpu_core::{regs, MAT_ELEMS};

/// Register-level view of the accelerator.
///
/// Reads take `&mut self`: observing the device is not side-effect free from the driver's point
/// of view, each read samples a new value.
pub trait AcceleratorRegisters {
    /// Read the identification register.
    fn read_id(&mut self) -> u32;

    /// Read the version register.
    fn read_version(&mut self) -> u32;

    /// Write a command to the control register.
    fn write_control(&mut self, value: u32);

    /// Sample the status register.
    fn read_status(&mut self) -> u32;

    /// Write one cell of input buffer A, `index` is the row-major cell index.
    fn write_input_a(&mut self, index: usize, value: u8);

    /// Write one cell of input buffer B, `index` is the row-major cell index.
    fn write_input_b(&mut self, index: usize, value: u8);

    /// Read one cell of output buffer C, `index` is the row-major cell index.
    fn read_output(&mut self, index: usize) -> u32;
}

impl<T: AcceleratorRegisters + ?Sized> AcceleratorRegisters for &mut T {
    fn read_id(&mut self) -> u32 {
        (**self).read_id()
    }

    fn read_version(&mut self) -> u32 {
        (**self).read_version()
    }

    fn write_control(&mut self, value: u32) {
        (**self).write_control(value)
    }

    fn read_status(&mut self) -> u32 {
        (**self).read_status()
    }

    fn write_input_a(&mut self, index: usize, value: u8) {
        (**self).write_input_a(index, value)
    }

    fn write_input_b(&mut self, index: usize, value: u8) {
        (**self).write_input_b(index, value)
    }

    fn read_output(&mut self, index: usize) -> u32 {
        (**self).read_output(index)
    }
}

// ——————————————————————————— Memory-Mapped Device —————————————————————————— //

/// The physical accelerator, accessed through volatile memory operations.
#[derive(Debug)]
pub struct MmioAccelerator {
    base: usize,
}

impl MmioAccelerator {
    /// Creates a handle to the accelerator register block at `base`.
    ///
    /// SAFETY: `base` must be the address of an accelerator register block, mapped as uncached
    /// device memory, and this must be the only handle to it.
    pub const unsafe fn new(base: usize) -> Self {
        MmioAccelerator { base }
    }

    fn word(&self, offset: usize) -> *mut u32 {
        (self.base + offset) as *mut u32
    }

    fn byte(&self, offset: usize) -> *mut u8 {
        (self.base + offset) as *mut u8
    }
}

impl AcceleratorRegisters for MmioAccelerator {
    fn read_id(&mut self) -> u32 {
        // SAFETY: the base points to a valid accelerator, as required by the constructor.
        unsafe { ptr::read_volatile(self.word(regs::ID_OFFSET)) }
    }

    fn read_version(&mut self) -> u32 {
        // SAFETY: the base points to a valid accelerator, as required by the constructor.
        unsafe { ptr::read_volatile(self.word(regs::VERSION_OFFSET)) }
    }

    fn write_control(&mut self, value: u32) {
        // SAFETY: the base points to a valid accelerator, and we hold the only handle.
        unsafe { ptr::write_volatile(self.word(regs::CTRL_OFFSET), value) }
    }

    fn read_status(&mut self) -> u32 {
        // SAFETY: the base points to a valid accelerator, as required by the constructor.
        unsafe { ptr::read_volatile(self.word(regs::STATUS_OFFSET)) }
    }

    fn write_input_a(&mut self, index: usize, value: u8) {
        debug_assert!(index < MAT_ELEMS, "Input A index out of bounds");
        // SAFETY: the index is within the A buffer, which belongs to the accelerator block.
        unsafe { ptr::write_volatile(self.byte(regs::A_OFFSET + index), value) }
    }

    fn write_input_b(&mut self, index: usize, value: u8) {
        debug_assert!(index < MAT_ELEMS, "Input B index out of bounds");
        // SAFETY: the index is within the B buffer, which belongs to the accelerator block.
        unsafe { ptr::write_volatile(self.byte(regs::B_OFFSET + index), value) }
    }

    fn read_output(&mut self, index: usize) -> u32 {
        debug_assert!(index < MAT_ELEMS, "Output index out of bounds");
        // SAFETY: the index is within the C buffer, which belongs to the accelerator block.
        unsafe { ptr::read_volatile(self.word(regs::C_OFFSET + 4 * index)) }
    }
}
