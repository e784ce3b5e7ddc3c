use eyre::Result;

use super::super::pcigar::{PCigar, PackedOp};
use super::super::pool::{BacktracePool, Block, BLOCK_IDX_NULL};
use super::super::wavefront::{is_null, WavefrontViewMut};
use super::{OffloadStats, WavefrontSet};

/// Advances M, I1 and D1 by one score, carrying each diagonal's piggyback register along with the winning source.
///
/// On ties M prefers substitution over deletion, and deletion over insertion. Registers are offloaded
/// to the pool once an output could overflow on the next score.
pub fn compute(set: &mut WavefrontSet, pool: &mut BacktracePool) -> Result<OffloadStats> {
    let n = set.out_m.offsets.len();
    let (m_sub, m_gap1) = (&set.m_sub, &set.m_gap1);
    let (i1_ext, d1_ext) = (&set.i1_ext, &set.d1_ext);

    for i in 0..n {
        // I1 on diagonal `lo + i` comes from `lo + i - 1`, stored at input index `i`
        let (open, ext) = (m_gap1.offsets[i], i1_ext.offsets[i]);
        let (ins1, pcigar, prev) = if ext >= open {
            (ext + 1, i1_ext.pcigar[i], i1_ext.prev[i])
        } else {
            (open + 1, m_gap1.pcigar[i], m_gap1.prev[i])
        };
        set.out_i1.offsets[i] = ins1;
        set.out_i1.pcigar[i] = pcigar.pushed(PackedOp::Insertion);
        set.out_i1.prev[i] = prev;

        let (open, ext) = (m_gap1.offsets[i + 2], d1_ext.offsets[i + 2]);
        let (del1, pcigar, prev) = if ext >= open {
            (ext, d1_ext.pcigar[i + 2], d1_ext.prev[i + 2])
        } else {
            (open, m_gap1.pcigar[i + 2], m_gap1.prev[i + 2])
        };
        set.out_d1.offsets[i] = del1;
        set.out_d1.pcigar[i] = pcigar.pushed(PackedOp::Deletion);
        set.out_d1.prev[i] = prev;

        let sub = m_sub.offsets[i + 1] + 1;
        let max = del1.max(sub.max(ins1));
        let (mut pcigar, mut prev) = (PCigar::EMPTY, BLOCK_IDX_NULL);
        if max == ins1 {
            (pcigar, prev) = (set.out_i1.pcigar[i], set.out_i1.prev[i]);
        }
        if max == del1 {
            (pcigar, prev) = (set.out_d1.pcigar[i], set.out_d1.prev[i]);
        }
        if max == sub {
            (pcigar, prev) = (m_sub.pcigar[i + 1], m_sub.prev[i + 1]);
        }
        set.out_m.offsets[i] = max;
        set.out_m.pcigar[i] = pcigar.pushed(PackedOp::Mismatch);
        set.out_m.prev[i] = prev;
    }

    let occupancy_i1 = m_gap1.occupancy.max(i1_ext.occupancy) + 1;
    let occupancy_d1 = m_gap1.occupancy.max(d1_ext.occupancy) + 1;
    *set.out_i1.occupancy = occupancy_i1;
    *set.out_d1.occupancy = occupancy_d1;
    *set.out_m.occupancy = m_sub.occupancy.max(occupancy_i1.max(occupancy_d1)) + 1;

    let mut stats = OffloadStats::default();
    for wf in [&mut set.out_m, &mut set.out_i1, &mut set.out_d1] {
        if needs_offload(*wf.occupancy) {
            stats.sweeps += 1;
            stats.blocks += offload(wf, pool)?;
        }
    }
    Ok(stats)
}

/// A score pushes at most two operations onto a register inherited from the previous scores:
/// the gap operation and the M marker.
#[inline(always)]
pub fn needs_offload(occupancy: u32) -> bool {
    occupancy + 2 > PCigar::CAPACITY
}

/// Moves every register that is more than half full to the pool and points the diagonal to the new block.
/// Registers of unreachable diagonals are dropped instead. Returns the number of written blocks.
pub fn offload(wf: &mut WavefrontViewMut, pool: &mut BacktracePool) -> Result<u64> {
    let (mut first, mut slots) = pool.reserve()?;
    let mut used = 0;
    let mut total = 0;

    for i in 0..wf.offsets.len() {
        if !wf.pcigar[i].is_half_full() {
            continue;
        }
        if is_null(wf.offsets[i]) {
            wf.pcigar[i] = PCigar::EMPTY;
            wf.prev[i] = BLOCK_IDX_NULL;
            continue;
        }

        if used == slots.len() {
            pool.commit(used);
            total += used as u64;
            (first, slots) = pool.reserve()?;
            used = 0;
        }
        slots[used] = Block::new(wf.pcigar[i], wf.prev[i]);
        wf.pcigar[i] = PCigar::EMPTY;
        wf.prev[i] = first + used as u32;
        used += 1;
    }
    pool.commit(used);
    total += used as u64;

    log::trace!(
        "Offloaded {} piggyback registers over {} diagonals, pool size: {}",
        total,
        wf.offsets.len(),
        pool.len()
    );
    *wf.occupancy = PCigar::CAPACITY / 2;
    Ok(total)
}
