//! Golden model
//!
//! Reference implementation of the accelerator's operation, used as the oracle. It only relies
//! on shifts and additions, so that a faulty or missing hardware multiplier can not make the
//! oracle agree with a faulty accelerator.

use tpu_core::N;

/// An input matrix, one byte per cell.
pub type Matrix = [[u8; N]; N];

/// An output matrix, one 32 bits accumulator per cell.
///
/// With byte inputs a cell is bounded by `N * 255 * 255`, which fits easily.
pub type ResultGrid = [[u32; N]; N];

/// Multiply two unsigned integers using shift-and-add.
///
/// Wraps on overflow, as a hardware multiplier truncated to 32 bits would.
pub const fn soft_mul(mut a: u32, mut b: u32) -> u32 {
    let mut res: u32 = 0;
    while b != 0 {
        if b & 1 != 0 {
            res = res.wrapping_add(a);
        }
        a <<= 1;
        b >>= 1;
    }
    res
}

/// Computes `a * b`.
///
/// Each cell `(r, c)` of the result is the dot product of row `r` of `a` and column `c` of `b`.
pub const fn multiply(a: &Matrix, b: &Matrix) -> ResultGrid {
    let mut out = [[0u32; N]; N];
    let mut r = 0;
    while r < N {
        let mut c = 0;
        while c < N {
            let mut acc: u32 = 0;
            let mut k = 0;
            while k < N {
                acc = acc.wrapping_add(soft_mul(a[r][k] as u32, b[k][c] as u32));
                k += 1;
            }
            out[r][c] = acc;
            c += 1;
        }
        r += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{MATRIX_A, MATRIX_B};

    /// Straightforward multiply with the native operator, on wide integers.
    fn wide_multiply(a: &Matrix, b: &Matrix) -> [[u64; N]; N] {
        let mut out = [[0u64; N]; N];
        for r in 0..N {
            for c in 0..N {
                out[r][c] = (0..N).map(|k| a[r][k] as u64 * b[k][c] as u64).sum();
            }
        }
        out
    }

    #[test]
    fn soft_mul_matches_native() {
        let samples = [0u32, 1, 2, 3, 7, 13, 255, 256, 0xFFFF, 0x1234_5678, u32::MAX];
        for a in samples {
            for b in samples {
                assert_eq!(soft_mul(a, b), a.wrapping_mul(b), "{} * {}", a, b);
            }
        }
    }

    #[test]
    fn harness_matrices() {
        let golden = multiply(&MATRIX_A, &MATRIX_B);
        // 1*2 + 2*1 + 3*3 + 4*0
        assert_eq!(golden[0][0], 13);
        assert_eq!(
            golden,
            [
                [13, 12, 11, 9],
                [37, 28, 27, 29],
                [61, 44, 43, 49],
                [85, 60, 59, 69],
            ]
        );
    }

    #[test]
    fn matches_wide_reference() {
        // A handful of deterministic patterns, including the largest byte values.
        let mut seed: u32 = 0x2545_F491;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed as u8
        };

        let mut cases = vec![([[255u8; N]; N], [[255u8; N]; N]), ([[0; N]; N], MATRIX_B)];
        for _ in 0..32 {
            let mut a = [[0u8; N]; N];
            let mut b = [[0u8; N]; N];
            for r in 0..N {
                for c in 0..N {
                    a[r][c] = next();
                    b[r][c] = next();
                }
            }
            cases.push((a, b));
        }

        for (a, b) in cases {
            let golden = multiply(&a, &b);
            let reference = wide_multiply(&a, &b);
            for r in 0..N {
                for c in 0..N {
                    assert_eq!(golden[r][c] as u64, reference[r][c]);
                }
            }
        }
    }

    #[test]
    fn identity_is_neutral() {
        let mut identity = [[0u8; N]; N];
        for (i, row) in identity.iter_mut().enumerate() {
            row[i] = 1;
        }
        let golden = multiply(&MATRIX_A, &identity);
        for r in 0..N {
            for c in 0..N {
                assert_eq!(golden[r][c], MATRIX_A[r][c] as u32);
            }
        }
    }
}
