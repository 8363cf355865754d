//! # Signature Reporting
//!
//! The signature is the harness's only output channel: a few 32 bits words at a fixed address,
//! inspected by an external rig (simulator, JTAG probe) once the firmware halted. The firmware
//! never reads it back.
//!
//! Two layouts exist:
//!  - `Record`: three words (status code, observed checksum, golden checksum), reset to zero at
//!    entry and written once at the end.
//!  - `Word`: a single status word, holding an entry marker, then a liveness marker once the
//!    accelerator reported completion, then the final verdict.

use core::ptr;

use tpu_core::signature::{
    self as codes, CODE_WORD, GOLDEN_WORD, OBSERVED_WORD, RECORD_WORDS,
};

use crate::verifier::Verdict;

// ———————————————————————————————— Layout —————————————————————————————————— //

/// The signature record, as laid out in memory.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SignatureRecord {
    pub code: u32,
    pub observed: u32,
    pub golden: u32,
}

impl SignatureRecord {
    pub const RESET: SignatureRecord = SignatureRecord {
        code: codes::RESET,
        observed: codes::RESET,
        golden: codes::RESET,
    };

    /// The record words, in memory order.
    pub fn words(&self) -> [u32; RECORD_WORDS] {
        let mut words = [0; RECORD_WORDS];
        words[CODE_WORD] = self.code;
        words[OBSERVED_WORD] = self.observed;
        words[GOLDEN_WORD] = self.golden;
        words
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureLayout {
    /// Status code and both checksums.
    Record,
    /// A single status word, with progress breadcrumbs.
    Word,
}

impl SignatureLayout {
    /// The success sentinel of this layout.
    pub const fn pass_code(self) -> u32 {
        match self {
            SignatureLayout::Record => codes::PASS_RECORD,
            SignatureLayout::Word => codes::PASS_WORD,
        }
    }
}

/// Where the signature lives in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureLocation {
    /// The `.sig` linker section.
    Section,
    /// A fixed address, usually in internal memory.
    Fixed(usize),
}

// ————————————————————————————————— Sinks —————————————————————————————————— //

/// A write-only signature location.
pub trait SignatureSink {
    /// Store `value` in the signature word at `index`.
    fn write_word(&mut self, index: usize, value: u32);
}

impl<T: SignatureSink + ?Sized> SignatureSink for &mut T {
    fn write_word(&mut self, index: usize, value: u32) {
        (**self).write_word(index, value)
    }
}

/// The signature record placed by the linker.
#[cfg_attr(target_os = "none", link_section = ".sig")]
#[used]
#[no_mangle]
static mut SIGNATURE: SignatureRecord = SignatureRecord::RESET;

/// Signature stored in memory, written with volatile stores.
#[derive(Debug)]
pub struct MmioSignature {
    base: *mut u32,
}

impl MmioSignature {
    /// Returns a handle to the signature at `location`.
    ///
    /// SAFETY: for `Fixed` locations, the address must be valid for writing a whole signature
    /// record, and be reserved to the signature. At most one handle may exist at a time.
    pub unsafe fn at(location: SignatureLocation) -> Self {
        let base = match location {
            SignatureLocation::Section => ptr::addr_of_mut!(SIGNATURE) as *mut u32,
            SignatureLocation::Fixed(address) => address as *mut u32,
        };
        MmioSignature { base }
    }
}

impl SignatureSink for MmioSignature {
    fn write_word(&mut self, index: usize, value: u32) {
        debug_assert!(index < RECORD_WORDS, "Invalid signature word");
        // SAFETY: the base is valid for a whole record, as required by the constructor.
        unsafe { ptr::write_volatile(self.base.add(index), value) }
    }
}

// ———————————————————————————————— Reporter ———————————————————————————————— //

/// Owns the signature location for the duration of a run.
///
/// The verdict can be published only once, as [Reporter::publish] consumes the reporter.
pub struct Reporter<S> {
    sink: S,
    layout: SignatureLayout,
}

impl<S: SignatureSink> Reporter<S> {
    /// Takes ownership of the signature and resets it.
    pub fn new(mut sink: S, layout: SignatureLayout) -> Self {
        match layout {
            SignatureLayout::Record => {
                for index in 0..RECORD_WORDS {
                    sink.write_word(index, codes::RESET);
                }
            }
            SignatureLayout::Word => sink.write_word(CODE_WORD, codes::ENTRY_MARKER),
        }
        Reporter { sink, layout }
    }

    pub fn layout(&self) -> SignatureLayout {
        self.layout
    }

    /// Leaves a breadcrumb when the accelerator first reports completion.
    ///
    /// Only the single word layout carries breadcrumbs.
    pub fn mark_done_observed(&mut self) {
        if self.layout == SignatureLayout::Word {
            self.sink.write_word(CODE_WORD, codes::DONE_MARKER);
        }
    }

    /// Writes the final verdict and releases the signature.
    ///
    /// The status code is written last, so that a record is complete once its code is final.
    pub fn publish(mut self, verdict: &Verdict) -> S {
        let record = verdict.record(self.layout);
        if self.layout == SignatureLayout::Record && verdict.has_checksums() {
            self.sink.write_word(OBSERVED_WORD, record.observed);
            self.sink.write_word(GOLDEN_WORD, record.golden);
        }
        self.sink.write_word(CODE_WORD, record.code);
        log::info!("Signature: 0x{:08x}", record.code);
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemorySink;
    use crate::verifier::Comparison;

    fn pass() -> Verdict {
        Verdict::Pass(Comparison {
            mismatches: 0,
            first_mismatch: None,
            checksum_observed: 636,
            checksum_golden: 636,
        })
    }

    #[test]
    fn record_layout() {
        let mut sink = MemorySink::new();
        let mut reporter = Reporter::new(&mut sink, SignatureLayout::Record);
        reporter.mark_done_observed();
        reporter.publish(&pass());

        assert_eq!(sink.words, [codes::PASS_RECORD, 636, 636]);
        assert_eq!(
            sink.writes,
            [
                (CODE_WORD, 0),
                (OBSERVED_WORD, 0),
                (GOLDEN_WORD, 0),
                (OBSERVED_WORD, 636),
                (GOLDEN_WORD, 636),
                (CODE_WORD, codes::PASS_RECORD),
            ]
        );
    }

    #[test]
    fn record_timeout_has_no_checksums() {
        let mut sink = MemorySink::new();
        Reporter::new(&mut sink, SignatureLayout::Record).publish(&Verdict::Timeout { polls: 9 });

        assert_eq!(sink.words, [codes::TIMEOUT, 0, 0]);
        assert_eq!(sink.writes.last(), Some(&(CODE_WORD, codes::TIMEOUT)));
        assert_eq!(sink.writes.len(), RECORD_WORDS + 1);
    }

    #[test]
    fn word_layout_breadcrumbs() {
        let mut sink = MemorySink::new();
        let mut reporter = Reporter::new(&mut sink, SignatureLayout::Word);
        reporter.mark_done_observed();
        reporter.publish(&pass());

        assert_eq!(
            sink.writes,
            [
                (CODE_WORD, codes::ENTRY_MARKER),
                (CODE_WORD, codes::DONE_MARKER),
                (CODE_WORD, codes::PASS_WORD),
            ]
        );
        // The other words are not part of this layout.
        assert_eq!(sink.words[OBSERVED_WORD], 0xA5A5_A5A5);
    }

    #[test]
    fn record_memory_layout() {
        assert_eq!(core::mem::size_of::<SignatureRecord>(), 4 * RECORD_WORDS);
        let record = SignatureRecord {
            code: 1,
            observed: 2,
            golden: 3,
        };
        assert_eq!(record.words(), [1, 2, 3]);
        assert_eq!(SignatureRecord::RESET.words(), [0; RECORD_WORDS]);
    }

    #[test]
    fn mmio_fixed_location() {
        let mut memory = [0xFFFF_FFFFu32; RECORD_WORDS];
        let location = SignatureLocation::Fixed(memory.as_mut_ptr() as usize);
        let sink = unsafe { MmioSignature::at(location) };
        Reporter::new(sink, SignatureLayout::Record).publish(&pass());

        assert_eq!(memory, [codes::PASS_RECORD, 636, 636]);
    }
}
