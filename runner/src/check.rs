//! Signature checking
//!
//! Decodes a signature dump taken by the test rig once the harness parked, and turns it back into
//! a verdict.

use std::fmt;
use std::fs;
use std::process::ExitCode;

use tpu_core::signature::{
    CODE_WORD, COUNT_MASK, DONE_MARKER, ENTRY_MARKER, FAILURE, GOLDEN_WORD, OBSERVED_WORD,
    PASS_RECORD, PASS_WORD, RECORD_WORDS, RESET, SENTINEL_MASK, TIMEOUT,
};

use crate::config::{read_config, SignatureLayout};
use crate::{CheckArgs, DumpFormat};

// ———————————————————————————————— Decoding ———————————————————————————————— //

/// The state of the harness, as told by its status word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Pass,
    Mismatch { count: u32 },
    Timeout,
    /// The harness never wrote its signature.
    NotStarted,
    /// The harness started but done was never observed.
    Started,
    /// Done was observed but no verdict was written.
    DoneObserved,
    Unknown(u32),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => write!(f, "pass"),
            Status::Mismatch { count } => write!(f, "{} mismatching cells", count),
            Status::Timeout => write!(f, "accelerator timed out"),
            Status::NotStarted => write!(f, "harness did not run"),
            Status::Started => write!(f, "harness hung before the accelerator completed"),
            Status::DoneObserved => write!(f, "harness hung after the accelerator completed"),
            Status::Unknown(code) => write!(f, "unknown status code 0x{:08x}", code),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    pub code: u32,
    pub status: Status,
    /// Checksums, record layout only.
    pub observed: Option<u32>,
    pub golden: Option<u32>,
}

/// Parses a dump into signature words.
pub fn parse_dump(dump: &[u8], format: DumpFormat) -> Result<Vec<u32>, String> {
    match format {
        DumpFormat::Bin => {
            if dump.len() % 4 != 0 {
                return Err(format!(
                    "Binary dump is {} bytes long, not a whole number of words",
                    dump.len()
                ));
            }
            Ok(dump
                .chunks_exact(4)
                .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
                .collect())
        }
        DumpFormat::Hex => {
            let text = std::str::from_utf8(dump).map_err(|_| "Hex dump is not valid UTF-8")?;
            text.split_whitespace()
                .map(|word| {
                    let digits = word
                        .strip_prefix("0x")
                        .or_else(|| word.strip_prefix("0X"))
                        .unwrap_or(word);
                    u32::from_str_radix(digits, 16)
                        .map_err(|err| format!("Invalid word '{}': {}", word, err))
                })
                .collect()
        }
    }
}

/// Decodes the signature words according to `layout`.
pub fn decode(words: &[u32], layout: SignatureLayout) -> Result<Report, String> {
    let expected_words = match layout {
        SignatureLayout::Record => RECORD_WORDS,
        SignatureLayout::Word => 1,
    };
    if words.len() < expected_words {
        return Err(format!(
            "Expected {} signature words, found {}",
            expected_words,
            words.len()
        ));
    }

    let code = words[CODE_WORD];
    let status = match (layout, code) {
        (SignatureLayout::Record, PASS_RECORD) | (SignatureLayout::Word, PASS_WORD) => Status::Pass,
        (_, TIMEOUT) => Status::Timeout,
        (_, code) if code & SENTINEL_MASK == FAILURE && code & COUNT_MASK != 0 => {
            Status::Mismatch {
                count: code & COUNT_MASK,
            }
        }
        (SignatureLayout::Record, RESET) => Status::NotStarted,
        (SignatureLayout::Word, ENTRY_MARKER) => Status::Started,
        (SignatureLayout::Word, DONE_MARKER) => Status::DoneObserved,
        (_, code) => Status::Unknown(code),
    };

    let (observed, golden) = match layout {
        SignatureLayout::Record => (Some(words[OBSERVED_WORD]), Some(words[GOLDEN_WORD])),
        SignatureLayout::Word => (None, None),
    };

    Ok(Report {
        code,
        status,
        observed,
        golden,
    })
}

/// Checks the report for consistency, and against the expected golden checksum if any.
pub fn validate(report: &Report, expected_checksum: Option<u32>) -> Result<(), String> {
    if report.status != Status::Pass {
        return Err(format!("Harness failed: {}", report.status));
    }

    if let (Some(observed), Some(golden)) = (report.observed, report.golden) {
        if observed != golden {
            return Err(format!(
                "Inconsistent record: pass with checksums 0x{:08x} and 0x{:08x}",
                observed, golden
            ));
        }
    }

    match (expected_checksum, report.golden) {
        (Some(expected), Some(golden)) if expected != golden => Err(format!(
            "Golden checksum 0x{:08x} differs from the expected 0x{:08x}",
            golden, expected
        )),
        (Some(_), None) => {
            log::warn!("The single word layout carries no checksum, skipping checksum check");
            Ok(())
        }
        _ => Ok(()),
    }
}

// ———————————————————————————————— Command ————————————————————————————————— //

pub fn check(args: &CheckArgs) -> ExitCode {
    match run_check(args) {
        Ok(()) => {
            log::info!("Signature check passed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_check(args: &CheckArgs) -> Result<(), String> {
    let layout = match args.layout {
        Some(layout) => layout,
        None => read_config(&args.config)?
            .signature
            .layout
            .unwrap_or_default(),
    };

    let dump = fs::read(&args.dump)
        .map_err(|err| format!("Could not read dump '{}': {}", args.dump.display(), err))?;
    let words = parse_dump(&dump, args.format)?;
    log::debug!("Signature words: {:x?}", words);

    let report = decode(&words, layout)?;
    log::info!("Status:   0x{:08x} ({})", report.code, report.status);
    if let (Some(observed), Some(golden)) = (report.observed, report.golden) {
        log::info!("Observed: 0x{:08x}", observed);
        log::info!("Golden:   0x{:08x}", golden);
    }

    validate(&report, args.expected_checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_dump() {
        let words = parse_dump(b"beef0000 0x0000027C\n0x27c\n", DumpFormat::Hex).unwrap();
        assert_eq!(words, [PASS_RECORD, 636, 636]);
        assert!(parse_dump(b"beef0000 zz", DumpFormat::Hex).is_err());
        assert!(parse_dump(b"", DumpFormat::Hex).unwrap().is_empty());
    }

    #[test]
    fn binary_dump() {
        let dump = [0x00, 0x00, 0xFE, 0xCA, 0x01, 0x00, 0x00, 0x00];
        assert_eq!(parse_dump(&dump, DumpFormat::Bin).unwrap(), [PASS_WORD, 1]);
        assert!(parse_dump(&dump[..7], DumpFormat::Bin).is_err());
    }

    #[test]
    fn record_pass() {
        let report = decode(&[PASS_RECORD, 636, 636], SignatureLayout::Record).unwrap();
        assert_eq!(report.status, Status::Pass);
        assert_eq!(report.golden, Some(636));
        assert!(validate(&report, None).is_ok());
        assert!(validate(&report, Some(636)).is_ok());
        assert!(validate(&report, Some(548)).is_err());
    }

    #[test]
    fn record_mismatch() {
        let report = decode(&[0xBAD0_0003, 700, 636], SignatureLayout::Record).unwrap();
        assert_eq!(report.status, Status::Mismatch { count: 3 });
        assert!(validate(&report, None).is_err());
    }

    #[test]
    fn record_inconsistent_pass() {
        let report = decode(&[PASS_RECORD, 1, 636], SignatureLayout::Record).unwrap();
        assert!(validate(&report, None).is_err());
    }

    #[test]
    fn record_not_started() {
        let report = decode(&[0, 0, 0], SignatureLayout::Record).unwrap();
        assert_eq!(report.status, Status::NotStarted);
        assert!(decode(&[PASS_RECORD], SignatureLayout::Record).is_err());
    }

    #[test]
    fn word_layout() {
        let decode_word = |word| decode(&[word], SignatureLayout::Word).unwrap().status;
        assert_eq!(decode_word(PASS_WORD), Status::Pass);
        assert_eq!(decode_word(TIMEOUT), Status::Timeout);
        assert_eq!(decode_word(0xBAD0_0010), Status::Mismatch { count: 16 });
        assert_eq!(decode_word(ENTRY_MARKER), Status::Started);
        assert_eq!(decode_word(DONE_MARKER), Status::DoneObserved);
        // Pass codes are specific to each layout.
        assert_eq!(decode_word(PASS_RECORD), Status::Unknown(PASS_RECORD));

        let report = decode(&[PASS_WORD], SignatureLayout::Word).unwrap();
        assert_eq!(report.observed, None);
        assert!(validate(&report, Some(636)).is_ok());
    }
}
