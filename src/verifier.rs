//! # Verifier
//!
//! Compares the output of the accelerator against the golden model and turns the result into a
//! verdict, encoded as signature status codes.

use tpu_core::signature::{COUNT_MASK, FAILURE, TIMEOUT};
use tpu_core::N;

use crate::driver::Outcome;
use crate::golden::ResultGrid;
use crate::signature::{SignatureLayout, SignatureRecord};

/// First cell where the accelerator disagreed with the golden model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mismatch {
    /// Row-major cell index.
    pub index: usize,
    pub observed: u32,
    pub golden: u32,
}

/// Aggregated comparison of an observed grid against the golden one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Comparison {
    pub mismatches: u32,
    pub first_mismatch: Option<Mismatch>,
    /// Sum of the observed cells, modulo 2^32.
    pub checksum_observed: u32,
    /// Sum of the golden cells, modulo 2^32.
    pub checksum_golden: u32,
}

/// Compares both grids cell by cell, in row-major order.
pub fn compare(golden: &ResultGrid, observed: &ResultGrid) -> Comparison {
    let mut cmp = Comparison {
        mismatches: 0,
        first_mismatch: None,
        checksum_observed: 0,
        checksum_golden: 0,
    };

    let cells = golden.iter().flatten().zip(observed.iter().flatten());
    for (index, (&golden, &observed)) in cells.enumerate() {
        cmp.checksum_observed = cmp.checksum_observed.wrapping_add(observed);
        cmp.checksum_golden = cmp.checksum_golden.wrapping_add(golden);
        if observed != golden {
            if cmp.first_mismatch.is_none() {
                cmp.first_mismatch = Some(Mismatch {
                    index,
                    observed,
                    golden,
                });
            }
            cmp.mismatches += 1;
        }
    }

    cmp
}

// ———————————————————————————————— Verdict ————————————————————————————————— //

/// The conclusion of a harness run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every cell matched.
    Pass(Comparison),
    /// At least one cell differed.
    Mismatch(Comparison),
    /// The accelerator never completed, there is no observed data.
    Timeout { polls: u32 },
}

impl Verdict {
    /// Judges the outcome of the driver against the golden result.
    pub fn evaluate(golden: &ResultGrid, outcome: &Outcome) -> Verdict {
        match outcome {
            Outcome::Completed(observed) => {
                let cmp = compare(golden, observed);
                match cmp.first_mismatch {
                    None => {
                        log::info!("All {} cells match", N * N);
                        Verdict::Pass(cmp)
                    }
                    Some(first) => {
                        log::warn!(
                            "{} mismatching cells, first at ({}, {}): observed {}, expected {}",
                            cmp.mismatches,
                            first.index / N,
                            first.index % N,
                            first.observed,
                            first.golden
                        );
                        Verdict::Mismatch(cmp)
                    }
                }
            }
            Outcome::TimedOut { polls } => {
                log::error!("Accelerator timed out after {} polls", polls);
                Verdict::Timeout { polls: *polls }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Pass(_))
    }

    /// Whether the verdict carries checksums, only a timeout doesn't.
    pub fn has_checksums(&self) -> bool {
        !matches!(self, Verdict::Timeout { .. })
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        match self {
            Verdict::Pass(cmp) | Verdict::Mismatch(cmp) => Some(cmp),
            Verdict::Timeout { .. } => None,
        }
    }

    /// The status code for the given signature layout.
    pub fn status_code(&self, layout: SignatureLayout) -> u32 {
        match self {
            Verdict::Pass(_) => layout.pass_code(),
            Verdict::Mismatch(cmp) => FAILURE | (cmp.mismatches & COUNT_MASK),
            Verdict::Timeout { .. } => TIMEOUT,
        }
    }

    /// The full signature record, checksums are zero on timeout.
    pub fn record(&self, layout: SignatureLayout) -> SignatureRecord {
        let (observed, golden) = match self.comparison() {
            Some(cmp) => (cmp.checksum_observed, cmp.checksum_golden),
            None => (0, 0),
        };
        SignatureRecord {
            code: self.status_code(layout),
            observed,
            golden,
        }
    }
}

#[cfg(test)]
mod tests {
    use tpu_core::signature::{PASS_RECORD, PASS_WORD, SENTINEL_MASK};

    use super::*;
    use crate::golden::multiply;
    use crate::harness::{MATRIX_A, MATRIX_B};

    fn golden() -> ResultGrid {
        multiply(&MATRIX_A, &MATRIX_B)
    }

    #[test]
    fn identical_grids_pass() {
        let golden = golden();
        let verdict = Verdict::evaluate(&golden, &Outcome::Completed(golden));

        let sum: u32 = golden.iter().flatten().sum();
        assert_eq!(sum, 636);
        assert!(verdict.is_success());
        assert_eq!(
            verdict.record(SignatureLayout::Record),
            SignatureRecord {
                code: PASS_RECORD,
                observed: sum,
                golden: sum,
            }
        );
        assert_eq!(verdict.status_code(SignatureLayout::Word), PASS_WORD);
    }

    #[test]
    fn single_mismatch() {
        let golden = golden();
        let mut observed = golden;
        observed[2][1] += 5;

        let verdict = Verdict::evaluate(&golden, &Outcome::Completed(observed));
        let code = verdict.status_code(SignatureLayout::Record);
        assert!(!verdict.is_success());
        assert_eq!(code & COUNT_MASK, 1);
        assert_eq!(code & SENTINEL_MASK, FAILURE);

        let cmp = verdict.comparison().unwrap();
        assert_eq!(cmp.checksum_observed, cmp.checksum_golden + 5);
        assert_eq!(
            cmp.first_mismatch,
            Some(Mismatch {
                index: 2 * N + 1,
                observed: golden[2][1] + 5,
                golden: golden[2][1],
            })
        );
    }

    #[test]
    fn first_mismatch_is_retained() {
        let golden = golden();
        let mut observed = [[0; N]; N];
        observed[0][0] = golden[0][0];

        let cmp = compare(&golden, &observed);
        assert_eq!(cmp.mismatches, 15);
        assert_eq!(cmp.first_mismatch.map(|m| m.index), Some(1));
        assert_eq!(cmp.checksum_observed, golden[0][0]);
        assert_eq!(
            Verdict::Mismatch(cmp).status_code(SignatureLayout::Word),
            0xBAD0_000F
        );
    }

    #[test]
    fn checksums_wrap() {
        let golden = [[u32::MAX; N]; N];
        let mut observed = golden;
        observed[3][3] = 1;

        let cmp = compare(&golden, &observed);
        // 16 * (2^32 - 1) mod 2^32 = -16
        assert_eq!(cmp.checksum_golden, 0u32.wrapping_sub(16));
        assert_eq!(cmp.checksum_observed, 0u32.wrapping_sub(16).wrapping_add(2));

        // Reproducible
        assert_eq!(compare(&golden, &observed), cmp);
    }

    #[test]
    fn timeout() {
        let verdict = Verdict::evaluate(&golden(), &Outcome::TimedOut { polls: 2048 });
        assert!(!verdict.is_success());
        assert!(!verdict.has_checksums());
        assert_eq!(verdict.status_code(SignatureLayout::Word), TIMEOUT);
        assert_eq!(
            verdict.record(SignatureLayout::Record),
            SignatureRecord {
                code: TIMEOUT,
                observed: 0,
                golden: 0,
            }
        );
    }

    #[test]
    fn timeout_differs_from_every_mismatch_count() {
        for mismatches in 1..=(N * N) as u32 {
            let cmp = Comparison {
                mismatches,
                first_mismatch: None,
                checksum_observed: 0,
                checksum_golden: 0,
            };
            assert_ne!(
                Verdict::Mismatch(cmp).status_code(SignatureLayout::Record),
                TIMEOUT
            );
        }
    }
}
