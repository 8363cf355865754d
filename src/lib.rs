//! TPU harness
//!
//! A self-checking firmware harness for a memory mapped 4x4 matrix multiply accelerator. The
//! harness loads two known operands, runs the accelerator once, checks its output against a
//! software model and publishes the verdict as a signature in memory.
//!
//! This library exposes [init] and [run_on_hardware], and is embedded into the firmware
//! executable. All the logic is hardware independent and can be tested on the host.

// Mark the crate as no_std, but only when not running tests.
// We need std to be able to run tests in user-space on the host architecture.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod driver;
pub mod golden;
pub mod harness;
pub mod logger;
pub mod platform;
pub mod registers;
pub mod signature;
pub mod verifier;

#[cfg(test)]
mod mock;

use harness::HarnessConfig;
pub use platform::init;
use platform::{Plat, Platform};
use registers::MmioAccelerator;
use signature::MmioSignature;
use verifier::Verdict;

/// Runs the harness against the accelerator and signature configured at build time.
///
/// # Safety
///
/// The configured accelerator base must point to the accelerator register block, and the
/// signature location must be reserved to the harness. Must be called at most once.
pub unsafe fn run_on_hardware() -> Verdict {
    log::info!("TPU harness on {}", Plat::name());
    log::info!("Accelerator at 0x{:x}", config::ACCEL_BASE);
    log::debug!("Signature at {:?}", config::SIGNATURE_LOCATION);

    let registers = MmioAccelerator::new(config::ACCEL_BASE);
    let signature = MmioSignature::at(config::SIGNATURE_LOCATION);
    harness::run(registers, signature, &HarnessConfig::BUILD)
}
