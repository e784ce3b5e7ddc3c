use std::iter::repeat_n;

use eyre::{ensure, Result};

use super::extend::Sequences;
use super::pcigar::PCigar;
use super::pool::{BlockIdx, BLOCK_IDX_NULL};

/// Furthest text coordinate reached on a diagonal. The pattern coordinate is `offset - k`.
pub type Offset = i32;

/// Marks an unreachable diagonal. Any negative offset is unreachable: `NULL + 1` stays negative.
pub const OFFSET_NULL: Offset = i32::MIN / 2;

#[inline(always)]
pub fn is_null(offset: Offset) -> bool {
    offset < 0
}

/// Offsets of a single score component (M, I1 or D1) at a single score.
///
/// Storage covers the diagonals `[base, base + offsets.len())`; everything outside `[lo, hi]` is kept null.
/// Backtrace arrays are parallel to the offsets in piggyback mode and empty otherwise.
#[derive(Clone, Debug, Default)]
pub struct Wavefront {
    lo: i32,
    hi: i32,
    base: i32,
    null: bool,
    piggyback: bool,
    offsets: Vec<Offset>,
    bt_pcigar: Vec<PCigar>,
    bt_prev: Vec<BlockIdx>,
    bt_occupancy_max: u32,
}

impl Wavefront {
    /// A wavefront covering `[lo, hi]` with every diagonal unreachable.
    pub fn allocate(lo: i32, hi: i32, piggyback: bool) -> Self {
        let mut wf = Self::default();
        wf.reallocate(lo, hi, piggyback);
        wf
    }

    /// Same as `allocate`, but reuses the storage of `self`.
    pub fn reallocate(&mut self, lo: i32, hi: i32, piggyback: bool) {
        let len = (hi - lo + 1).max(0) as usize;

        self.lo = lo;
        self.hi = hi;
        self.base = lo;
        self.null = false;
        self.piggyback = piggyback;
        self.bt_occupancy_max = 0;

        self.offsets.clear();
        self.offsets.resize(len, OFFSET_NULL);
        self.bt_pcigar.clear();
        self.bt_prev.clear();
        if piggyback {
            self.bt_pcigar.resize(len, PCigar::EMPTY);
            self.bt_prev.resize(len, BLOCK_IDX_NULL);
        }
    }

    /// An all-null wavefront spanning `[lo, hi]`, used in place of missing inputs.
    pub fn null(lo: i32, hi: i32, piggyback: bool) -> Self {
        let mut wf = Self::allocate(lo, hi, piggyback);
        wf.null = true;
        wf
    }

    /// The M wavefront at score zero: a single diagonal at the origin.
    pub fn initial(piggyback: bool) -> Self {
        let mut wf = Self::allocate(0, 0, piggyback);
        wf.offsets[0] = 0;
        wf
    }

    #[inline(always)]
    pub fn lo(&self) -> i32 {
        self.lo
    }

    #[inline(always)]
    pub fn hi(&self) -> i32 {
        self.hi
    }

    #[inline(always)]
    pub fn is_null(&self) -> bool {
        self.null
    }

    pub fn is_piggyback(&self) -> bool {
        self.piggyback
    }

    pub fn occupancy(&self) -> u32 {
        self.bt_occupancy_max
    }

    #[inline(always)]
    fn index(&self, k: i32) -> Option<usize> {
        let idx = k.checked_sub(self.base)?;
        (idx >= 0 && (idx as usize) < self.offsets.len()).then_some(idx as usize)
    }

    /// Offset on the diagonal `k`, null if `k` is outside the wavefront.
    pub fn offset(&self, k: i32) -> Offset {
        if self.null || k < self.lo || k > self.hi {
            return OFFSET_NULL;
        }
        self.index(k).map_or(OFFSET_NULL, |i| self.offsets[i])
    }

    pub fn set_offset(&mut self, k: i32, offset: Offset) -> Result<()> {
        let idx = self.index(k);
        ensure!(
            idx.is_some() && k >= self.lo && k <= self.hi,
            "Diagonal {k} is outside the wavefront [{}, {}]",
            self.lo,
            self.hi
        );
        if let Some(i) = idx {
            self.offsets[i] = offset;
        }
        Ok(())
    }

    /// Piggyback register and back-pointer of the diagonal `k`.
    pub fn backtrace(&self, k: i32) -> Option<(PCigar, BlockIdx)> {
        if !self.piggyback || k < self.lo || k > self.hi {
            return None;
        }
        self.index(k).map(|i| (self.bt_pcigar[i], self.bt_prev[i]))
    }

    /// Iterates over `(k, offset)` for every diagonal in `[lo, hi]`.
    pub fn diagonals(&self) -> impl Iterator<Item = (i32, Offset)> + '_ {
        (self.lo..=self.hi).map(|k| (k, self.offset(k)))
    }

    /// Mutable offsets over `[lo, hi]` together with the diagonal of the first element.
    pub fn offsets_mut(&mut self) -> (i32, &mut [Offset]) {
        if self.null || self.lo > self.hi {
            return (self.lo, &mut []);
        }
        let start = (self.lo - self.base) as usize;
        let end = (self.hi - self.base) as usize + 1;
        (self.lo, &mut self.offsets[start..end])
    }

    /// Read-only view over `[lo, hi]`. Fails if the storage doesn't cover the range.
    pub fn view(&self, lo: i32, hi: i32) -> Result<WavefrontView<'_>> {
        let (start, end) = self.span(lo, hi)?;
        let (pcigar, prev): (&[PCigar], &[BlockIdx]) = if self.piggyback {
            (&self.bt_pcigar[start..end], &self.bt_prev[start..end])
        } else {
            (&[], &[])
        };
        Ok(WavefrontView {
            offsets: &self.offsets[start..end],
            pcigar,
            prev,
            occupancy: self.bt_occupancy_max,
        })
    }

    /// Mutable view over `[lo, hi]`. Fails if the storage doesn't cover the range.
    pub fn view_mut(&mut self, lo: i32, hi: i32) -> Result<WavefrontViewMut<'_>> {
        let (start, end) = self.span(lo, hi)?;
        let (pcigar, prev): (&mut [PCigar], &mut [BlockIdx]) = if self.piggyback {
            (&mut self.bt_pcigar[start..end], &mut self.bt_prev[start..end])
        } else {
            (&mut [], &mut [])
        };
        Ok(WavefrontViewMut {
            offsets: &mut self.offsets[start..end],
            pcigar,
            prev,
            occupancy: &mut self.bt_occupancy_max,
        })
    }

    fn span(&self, lo: i32, hi: i32) -> Result<(usize, usize)> {
        let end = self.base as i64 + self.offsets.len() as i64;
        ensure!(
            lo <= hi + 1 && lo >= self.base && (hi as i64) < end,
            "Wavefront storage [{}, {}) doesn't cover the diagonals [{lo}, {hi}]",
            self.base,
            end
        );
        let start = (lo - self.base) as usize;
        Ok((start, start + (hi - lo + 1) as usize))
    }

    /// Grows the storage with unreachable diagonals until it covers `[lo, hi]`.
    /// The effective range `[lo, hi]` of the wavefront is not changed.
    pub fn init_ends(&mut self, lo: i32, hi: i32) {
        if lo < self.base {
            let extra = (self.base - lo) as usize;
            self.offsets.splice(0..0, repeat_n(OFFSET_NULL, extra));
            if self.piggyback {
                self.bt_pcigar.splice(0..0, repeat_n(PCigar::EMPTY, extra));
                self.bt_prev.splice(0..0, repeat_n(BLOCK_IDX_NULL, extra));
            }
            self.base = lo;
        }

        let end = self.base + self.offsets.len() as i32;
        if hi >= end {
            let len = (hi - self.base + 1) as usize;
            self.offsets.resize(len, OFFSET_NULL);
            if self.piggyback {
                self.bt_pcigar.resize(len, PCigar::EMPTY);
                self.bt_prev.resize(len, BLOCK_IDX_NULL);
            }
        }
    }

    /// Shrinks `[lo, hi]` from both ends while the boundary diagonals are unreachable or lie
    /// outside of the sequences. The wavefront becomes null once nothing is left.
    pub fn trim_ends(&mut self, seqs: &Sequences) {
        let outside = |k: i32, offset: Offset| -> bool {
            is_null(offset) || !seqs.contains(offset - k, offset)
        };

        while self.lo <= self.hi && outside(self.hi, self.offset(self.hi)) {
            self.clear(self.hi);
            self.hi -= 1;
        }
        while self.lo <= self.hi && outside(self.lo, self.offset(self.lo)) {
            self.clear(self.lo);
            self.lo += 1;
        }
        if self.lo > self.hi {
            self.null = true;
        }
    }

    fn clear(&mut self, k: i32) {
        if let Some(i) = self.index(k) {
            self.offsets[i] = OFFSET_NULL;
            if self.piggyback {
                self.bt_pcigar[i] = PCigar::EMPTY;
                self.bt_prev[i] = BLOCK_IDX_NULL;
            }
        }
    }
}

/// Validated read-only slices of a wavefront over a fixed diagonal range.
#[derive(Copy, Clone, Debug)]
pub struct WavefrontView<'a> {
    pub offsets: &'a [Offset],
    pub pcigar: &'a [PCigar],
    pub prev: &'a [BlockIdx],
    pub occupancy: u32,
}

/// Validated mutable slices of a wavefront over a fixed diagonal range.
#[derive(Debug)]
pub struct WavefrontViewMut<'a> {
    pub offsets: &'a mut [Offset],
    pub pcigar: &'a mut [PCigar],
    pub prev: &'a mut [BlockIdx],
    pub occupancy: &'a mut u32,
}
