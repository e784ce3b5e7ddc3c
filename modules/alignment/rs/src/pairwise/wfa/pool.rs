use derive_getters::Getters;
use eyre::{ensure, eyre, Result};

use super::pcigar::PCigar;

/// Global index of a block in the pool.
pub type BlockIdx = u32;

/// Terminates a back-pointer chain: the alignment started here.
pub const BLOCK_IDX_NULL: BlockIdx = BlockIdx::MAX;

/// An offloaded piggyback register together with the back-pointer it had at the time.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Getters)]
pub struct Block {
    pcigar: PCigar,
    prev: BlockIdx,
}

impl Block {
    pub fn new(pcigar: PCigar, prev: BlockIdx) -> Self {
        Self { pcigar, prev }
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new(PCigar::EMPTY, BLOCK_IDX_NULL)
    }
}

/// Append-only arena of backtrace blocks.
///
/// Blocks live in fixed-size segments that are allocated lazily and kept across `reset` calls.
/// Indices are global and grow monotonically during an alignment.
#[derive(Clone, Debug)]
pub struct BacktracePool {
    segments: Vec<Vec<Block>>,
    segment_len: usize,
    used: usize,
}

impl BacktracePool {
    pub fn new(segment_len: usize) -> Result<Self> {
        ensure!(segment_len > 0, "Backtrace pool segment length must be positive");
        Ok(Self {
            segments: Vec::new(),
            segment_len,
            used: 0,
        })
    }

    /// Total number of committed blocks.
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn segment_len(&self) -> usize {
        self.segment_len
    }

    /// Number of allocated segments, including the ones retained after `reset`.
    pub fn segments(&self) -> usize {
        self.segments.len()
    }

    /// Returns the index of the next free block and the writable remainder of the current segment.
    /// The slice is never empty: a new segment is allocated when the current one is exhausted.
    pub fn reserve(&mut self) -> Result<(BlockIdx, &mut [Block])> {
        // The last index is reserved for the chain terminator
        ensure!(
            self.used < BLOCK_IDX_NULL as usize,
            "Backtrace pool exhausted the block index space ({} blocks)",
            self.used
        );

        let segment = self.used / self.segment_len;
        let start = self.used % self.segment_len;
        if segment == self.segments.len() {
            let mut blocks = Vec::new();
            blocks
                .try_reserve_exact(self.segment_len)
                .map_err(|e| eyre!("Failed to allocate a backtrace pool segment: {e}"))?;
            blocks.resize(self.segment_len, Block::default());
            self.segments.push(blocks);
            log::debug!(
                "Backtrace pool grew to {} segments of {} blocks",
                self.segments.len(),
                self.segment_len
            );
        }

        // Trim the slice so that every index in it stays below the terminator
        let available = (self.segment_len - start).min(BLOCK_IDX_NULL as usize - self.used);
        let blocks = &mut self.segments[segment][start..start + available];
        Ok((self.used as BlockIdx, blocks))
    }

    /// Marks the first `n` blocks of the last reserved region as written.
    pub fn commit(&mut self, n: usize) {
        debug_assert!(self.used % self.segment_len + n <= self.segment_len);
        self.used += n;
    }

    pub fn get(&self, idx: BlockIdx) -> Option<&Block> {
        let idx = idx as usize;
        if idx >= self.used {
            return None;
        }
        self.segments
            .get(idx / self.segment_len)
            .and_then(|x| x.get(idx % self.segment_len))
    }

    /// Follows the back-pointers starting at `idx`, newest block first.
    /// Every link must point strictly backwards, anything else is reported as a corrupted chain.
    pub fn chain(&self, idx: BlockIdx) -> Chain<'_> {
        Chain {
            pool: self,
            next: idx,
            failed: false,
        }
    }

    /// Forgets all blocks but keeps the allocated segments for the next alignment.
    pub fn reset(&mut self) {
        self.used = 0;
    }
}

pub struct Chain<'a> {
    pool: &'a BacktracePool,
    next: BlockIdx,
    failed: bool,
}

impl<'a> Iterator for Chain<'a> {
    type Item = Result<&'a Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next == BLOCK_IDX_NULL {
            return None;
        }
        let idx = self.next;
        let block = match self.pool.get(idx) {
            Some(block) => block,
            None => {
                self.failed = true;
                return Some(Err(eyre!("Backtrace block {idx} is not in the pool")));
            }
        };
        if block.prev != BLOCK_IDX_NULL && block.prev >= idx {
            self.failed = true;
            return Some(Err(eyre!(
                "Backtrace block {idx} points forward to {}",
                block.prev
            )));
        }
        self.next = block.prev;
        Some(Ok(block))
    }
}

#[cfg(test)]
mod tests {
    use super::super::pcigar::PackedOp;
    use super::*;

    fn register(ops: &[PackedOp]) -> PCigar {
        let mut pcigar = PCigar::EMPTY;
        for op in ops {
            pcigar.push(*op);
        }
        pcigar
    }

    #[test]
    fn test_zero_segment_len() {
        assert!(BacktracePool::new(0).is_err());
    }

    #[test]
    fn test_reserve_commit_across_segments() -> Result<()> {
        let mut pool = BacktracePool::new(3)?;
        assert!(pool.is_empty());

        let mut prev = BLOCK_IDX_NULL;
        let mut written = 0;
        while written < 7 {
            let (first, slots) = pool.reserve()?;
            assert_eq!(first as usize, written);
            let n = slots.len().min(2);
            for (i, slot) in slots.iter_mut().take(n).enumerate() {
                *slot = Block::new(register(&[PackedOp::Mismatch]), prev);
                prev = first + i as BlockIdx;
            }
            pool.commit(n);
            written += n;
        }

        assert_eq!(pool.len(), 8);
        assert_eq!(pool.segments(), 3);
        assert_eq!(pool.get(7).map(|x| *x.prev()), Some(6));
        assert!(pool.get(8).is_none());

        let chain = pool.chain(prev).collect::<Result<Vec<_>>>()?;
        assert_eq!(chain.len(), 8);
        assert_eq!(*chain.last().unwrap().prev(), BLOCK_IDX_NULL);
        Ok(())
    }

    #[test]
    fn test_reserve_returns_segment_tail() -> Result<()> {
        let mut pool = BacktracePool::new(4)?;
        let (idx, slots) = pool.reserve()?;
        assert_eq!((idx, slots.len()), (0, 4));
        pool.commit(3);

        let (idx, slots) = pool.reserve()?;
        assert_eq!((idx, slots.len()), (3, 1));
        pool.commit(1);

        let (idx, slots) = pool.reserve()?;
        assert_eq!((idx, slots.len()), (4, 4));
        Ok(())
    }

    #[test]
    fn test_corrupted_chain() -> Result<()> {
        let mut pool = BacktracePool::new(4)?;
        let (_, slots) = pool.reserve()?;
        slots[0] = Block::new(register(&[PackedOp::Deletion]), BLOCK_IDX_NULL);
        slots[1] = Block::new(register(&[PackedOp::Deletion]), 1);
        pool.commit(2);

        assert!(pool.chain(0).all(|x| x.is_ok()));
        assert!(pool.chain(1).any(|x| x.is_err()));
        assert!(pool.chain(5).next().unwrap().is_err());
        Ok(())
    }

    #[test]
    fn test_reset_keeps_segments() -> Result<()> {
        let mut pool = BacktracePool::new(2)?;
        for _ in 0..3 {
            let (_, slots) = pool.reserve()?;
            let n = slots.len();
            pool.commit(n);
        }
        assert_eq!(pool.segments(), 3);

        pool.reset();
        assert!(pool.is_empty());
        assert_eq!(pool.segments(), 3);
        assert_eq!(pool.reserve()?.0, 0);
        assert_eq!(pool.segments(), 3);
        Ok(())
    }
}
