use eyre::{bail, ensure, Result};

use wavebit_core_rs::alignment::pairwise::{Op, Step};

use super::extend::Sequences;
use super::pcigar::{PCigar, PackedOp};
use super::pool::{BacktracePool, BlockIdx};

/// Full operation history of a diagonal, oldest first: the offloaded blocks followed by the live register.
pub fn collect_ops(pool: &BacktracePool, pcigar: PCigar, prev: BlockIdx) -> Result<Vec<PackedOp>> {
    let blocks = pool.chain(prev).collect::<Result<Vec<_>>>()?;

    let mut ops = Vec::with_capacity((blocks.len() + 1) * PCigar::CAPACITY as usize);
    for block in blocks.iter().rev() {
        ops.extend(block.pcigar().decode());
    }
    ops.extend(pcigar.decode());
    Ok(ops)
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum State {
    M,
    I,
    D,
}

/// Rebuilds the alignment path from the packed operations.
///
/// Matches are never recorded, they are recovered by extending along the diagonal every time the path
/// is in the M state. A `Mismatch` in a gap state closes the gap without consuming anything.
/// The path must finish exactly at `end = (pattern, text)`.
pub fn unpack(ops: &[PackedOp], seqs: &Sequences, end: (i32, i32)) -> Result<Vec<Step<u32>>> {
    let (plen, tlen) = (seqs.pattern_len(), seqs.text_len());
    let (mut v, mut h) = (0i32, 0i32);
    let mut state = State::M;
    let mut steps = Vec::new();

    for op in ops {
        match (state, op) {
            (State::M, op) => {
                let matches = seqs.matches_at(v, h);
                Step::append(&mut steps, Op::Match, matches)?;
                v += matches as i32;
                h += matches as i32;

                match op {
                    PackedOp::Mismatch => {
                        ensure!(v < plen && h < tlen, "Mismatch at ({v}, {h}) is outside the sequences");
                        Step::append(&mut steps, Op::Mismatch, 1)?;
                        v += 1;
                        h += 1;
                    }
                    PackedOp::Insertion => {
                        ensure!(h < tlen, "Insertion at ({v}, {h}) is past the end of the text");
                        Step::append(&mut steps, Op::Insertion, 1)?;
                        h += 1;
                        state = State::I;
                    }
                    PackedOp::Deletion => {
                        ensure!(v < plen, "Deletion at ({v}, {h}) is past the end of the pattern");
                        Step::append(&mut steps, Op::Deletion, 1)?;
                        v += 1;
                        state = State::D;
                    }
                }
            }
            (State::I, PackedOp::Insertion) => {
                ensure!(h < tlen, "Insertion at ({v}, {h}) is past the end of the text");
                Step::append(&mut steps, Op::Insertion, 1)?;
                h += 1;
            }
            (State::D, PackedOp::Deletion) => {
                ensure!(v < plen, "Deletion at ({v}, {h}) is past the end of the pattern");
                Step::append(&mut steps, Op::Deletion, 1)?;
                v += 1;
            }
            (State::I | State::D, PackedOp::Mismatch) => state = State::M,
            (state, op) => bail!("Unexpected {:?} while in the {:?} state at ({v}, {h})", op, state),
        }
    }

    if state == State::M {
        let matches = seqs.matches_at(v, h);
        Step::append(&mut steps, Op::Match, matches)?;
        v += matches as i32;
        h += matches as i32;
    }
    ensure!(
        (v, h) == end,
        "Backtrace finished at ({v}, {h}) instead of ({}, {})",
        end.0,
        end.1
    );
    Ok(steps)
}
