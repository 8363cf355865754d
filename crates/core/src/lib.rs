//! TPU harness core definitions
//!
//! This crate holds the constants shared between the harness firmware and the host tooling that
//! inspects its output. It does not hold any code: the register map and the signature encoding
//! are a contract with the hardware and with the external test rig, and must be usable from both
//! bare-metal and host contexts.

#![no_std]

// ———————————————————————————— Matrix Geometry ————————————————————————————— //

/// Dimension of the square matrices processed by the accelerator.
pub const N: usize = 4;

/// Number of cells in a matrix.
pub const MAT_ELEMS: usize = N * N;

// ——————————————————————————————— Register Map ————————————————————————————— //

/// Accelerator register map.
///
/// All offsets are in bytes from the base of the accelerator register block.
pub mod regs {
    /// Default base address of the accelerator register block.
    pub const DEFAULT_BASE: usize = 0x4000_0000;

    /// Identification register (read-only, richer variant only).
    pub const ID_OFFSET: usize = 0x00;
    /// Version register (read-only, richer variant only).
    pub const VERSION_OFFSET: usize = 0x04;
    /// Control register, 32 bits.
    pub const CTRL_OFFSET: usize = 0x08;
    /// Status register, 32 bits.
    pub const STATUS_OFFSET: usize = 0x0C;
    /// Input buffer A, one byte per cell in row-major order.
    pub const A_OFFSET: usize = 0x100;
    /// Input buffer B, one byte per cell in row-major order.
    pub const B_OFFSET: usize = 0x200;
    /// Output buffer C, one 32 bits word per cell in row-major order.
    pub const C_OFFSET: usize = 0x300;

    /// Control register commands.
    pub mod ctrl {
        /// Start a multiplication.
        pub const START: u32 = 0x1;
        /// Clear the done flag left by a previous run.
        pub const CLEAR_DONE: u32 = 0x2;
    }

    /// Status register bits.
    pub mod status {
        /// The accelerator is processing a request.
        pub const BUSY: u32 = 1 << 0;
        /// The output buffer holds a valid result.
        pub const DONE: u32 = 1 << 1;
    }
}

// ———————————————————————————— Signature Codes ————————————————————————————— //

/// Signature status codes.
///
/// These values are matched bit-for-bit by the external verifier.
pub mod signature {
    /// Value of every signature word before the harness writes anything.
    pub const RESET: u32 = 0;

    /// Success, three words record layout.
    pub const PASS_RECORD: u32 = 0xBEEF_0000;
    /// Success, single status word layout.
    pub const PASS_WORD: u32 = 0xCAFE_0000;

    /// High half of a failure code, the low half holds the mismatch count.
    pub const FAILURE: u32 = 0xBAD0_0000;
    /// The accelerator never completed, no output was read.
    pub const TIMEOUT: u32 = 0xBAD0_FFFF;

    /// Selects the sentinel half of a status code.
    pub const SENTINEL_MASK: u32 = 0xFFFF_0000;
    /// Selects the mismatch count half of a status code.
    pub const COUNT_MASK: u32 = 0x0000_FFFF;

    /// Breadcrumb written at entry (single word layout).
    pub const ENTRY_MARKER: u32 = 0x1111_1111;
    /// Breadcrumb written when done is first observed (single word layout).
    pub const DONE_MARKER: u32 = 0x4444_4444;

    /// Number of 32 bits words in the record layout: code, observed and golden checksums.
    pub const RECORD_WORDS: usize = 3;
    /// Word index of the status code.
    pub const CODE_WORD: usize = 0;
    /// Word index of the observed checksum.
    pub const OBSERVED_WORD: usize = 1;
    /// Word index of the golden checksum.
    pub const GOLDEN_WORD: usize = 2;

    // A mismatch count can never alias the timeout code.
    const _: () = assert!(super::MAT_ELEMS < COUNT_MASK as usize);
}
