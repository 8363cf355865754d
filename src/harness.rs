//! # Harness
//!
//! A full self-check run: compute the golden result, drive the accelerator through one request,
//! compare and publish the verdict.

use crate::config;
use crate::driver::{AcceleratorDriver, DriverConfig, DriverState};
use crate::golden::{self, Matrix};
use crate::registers::AcceleratorRegisters;
use crate::signature::{Reporter, SignatureLayout, SignatureSink};
use crate::verifier::Verdict;

/// Left operand, small values so that no accumulator can overflow.
pub const MATRIX_A: Matrix = [
    [1, 2, 3, 4],
    [5, 6, 7, 8],
    [9, 10, 11, 12],
    [13, 14, 15, 16],
];

/// Right operand.
pub const MATRIX_B: Matrix = [
    [2, 1, 0, 3],
    [1, 0, 2, 1],
    [3, 1, 1, 0],
    [0, 2, 1, 1],
];

/// Protocol and reporting options of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    pub driver: DriverConfig,
    pub layout: SignatureLayout,
    /// Read and log the identification registers before the run.
    pub read_id_registers: bool,
}

impl HarnessConfig {
    /// Busy and done bits, unbounded wait, three words signature.
    pub const MINIMAL: HarnessConfig = HarnessConfig {
        driver: DriverConfig::MINIMAL,
        layout: SignatureLayout::Record,
        read_id_registers: false,
    };

    /// Done bit only, bounded wait, single word signature with breadcrumbs.
    pub const BOUNDED: HarnessConfig = HarnessConfig {
        driver: DriverConfig::BOUNDED,
        layout: SignatureLayout::Word,
        read_id_registers: false,
    };

    /// The configuration chosen at build time.
    pub const BUILD: HarnessConfig = HarnessConfig {
        driver: config::DRIVER,
        layout: config::SIGNATURE_LAYOUT,
        read_id_registers: config::ACCEL_ID_REGISTERS,
    };
}

/// Runs the self-check against `registers`, publishing the verdict to `sink`.
pub fn run<R, S>(mut registers: R, sink: S, config: &HarnessConfig) -> Verdict
where
    R: AcceleratorRegisters,
    S: SignatureSink,
{
    let mut reporter = Reporter::new(sink, config.layout);
    log::debug!("Harness configuration: {:?}", config);

    if config.read_id_registers {
        let id = registers.read_id();
        let version = registers.read_version();
        log::info!("Accelerator ID: 0x{:08x}, version: 0x{:08x}", id, version);
    }

    // The oracle does not depend on the device, compute it before touching it.
    let golden = golden::multiply(&MATRIX_A, &MATRIX_B);

    let mut driver = AcceleratorDriver::new(registers, config.driver, MATRIX_A, MATRIX_B);
    let outcome = driver.run_with(|state| {
        if *state == DriverState::Running {
            reporter.mark_done_observed();
        }
    });

    let verdict = Verdict::evaluate(&golden, &outcome);
    reporter.publish(&verdict);
    verdict
}
