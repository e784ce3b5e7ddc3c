use derive_getters::{Dissolve, Getters};
use eyre::{ensure, Result};

use wavebit_core_rs::alignment::pairwise::{Op, Step};
use wavebit_core_rs::num::PrimUInt;

/// Gap-affine penalties. Matches are free, everything else is a positive cost:
/// a mismatch costs `mismatch`, a gap of length `n` costs `gap_open + n * gap_extend`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Getters, Dissolve)]
pub struct Affine {
    mismatch: u32,
    gap_open: u32,
    gap_extend: u32,
}

impl Affine {
    pub fn new(mismatch: u32, gap_open: u32, gap_extend: u32) -> Result<Self> {
        // Zero-cost mismatches or extensions would make a wavefront depend on itself
        ensure!(mismatch > 0, "Mismatch penalty must be positive");
        ensure!(gap_extend > 0, "Gap extension penalty must be positive");
        Ok(Self {
            mismatch,
            gap_open,
            gap_extend,
        })
    }

    /// Cost of opening a gap, including its first extension.
    #[inline(always)]
    pub fn gap_opening(&self) -> u32 {
        self.gap_open + self.gap_extend
    }

    /// The furthest score difference between a wavefront and any of its sources.
    pub fn max_lookback(&self) -> u32 {
        self.mismatch.max(self.gap_opening())
    }

    /// Total penalty of an alignment path. Adjacent gap steps of the same kind form a single gap.
    pub fn evaluate<Len: PrimUInt>(&self, steps: &[Step<Len>]) -> u64 {
        let mut total = 0u64;
        let mut previous = None;
        for step in steps {
            let len = step.len().to_u64().unwrap_or(0);
            total += match step.op() {
                op if op.is_gap() => {
                    let open = if previous == Some(*op) { 0 } else { self.gap_open as u64 };
                    open + len * self.gap_extend as u64
                }
                Op::Mismatch => len * self.mismatch as u64,
                _ => 0,
            };
            previous = Some(*step.op());
        }
        total
    }
}

impl Default for Affine {
    fn default() -> Self {
        Affine {
            mismatch: 4,
            gap_open: 6,
            gap_extend: 2,
        }
    }
}
