use std::borrow::Borrow;
use std::fmt::Display;

use derive_getters::{Dissolve, Getters};
use eyre::Result;

use crate::num::{checked_len, PrimUInt};

use super::op::Op;

/// An alignment step: a run of identical operations
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Getters, Dissolve)]
pub struct Step<Len: PrimUInt> {
    /// The length of the operation, e.g. the number of consequent matches or gaps.
    /// Guaranteed to be greater than zero.
    len: Len,
    /// The alignment operation
    op: Op,
}

impl<Len: PrimUInt> Step<Len> {
    pub fn new(op: Op, len: Len) -> Result<Self> {
        if len.is_zero() {
            return Err(eyre::eyre!("Step length must be greater than zero"));
        }
        Ok(Self { len, op })
    }

    /// Append `len` operations to the end of `steps`, merging them into the last step when possible.
    /// Runs longer than the maximum step length are split into several steps. Zero-length runs are ignored.
    pub fn append(steps: &mut Vec<Step<Len>>, op: Op, mut len: usize) -> Result<()> {
        let max = Len::max_value().to_usize().unwrap_or(usize::MAX);

        if let Some(last) = steps.last_mut() {
            if last.op == op && len > 0 {
                let room = max - last.len.to_usize().unwrap_or(max);
                let merged = room.min(len);
                last.len = last.len + checked_len::<Len>(merged)?;
                len -= merged;
            }
        }

        while len > 0 {
            let chunk = len.min(max);
            steps.push(Step {
                len: checked_len(chunk)?,
                op,
            });
            len -= chunk;
        }
        Ok(())
    }

    /// Extended CIGAR string, e.g. `3=1X2=1D`.
    pub fn rle_string(steps: impl Iterator<Item: Borrow<Step<Len>>>) -> String
    where
        Len: Display,
    {
        let mut result = String::with_capacity(steps.size_hint().0 * 3);
        for step in steps {
            let step = step.borrow();
            result.push_str(&step.len().to_string());
            result.push(step.op().symbol());
        }
        result
    }

    /// Classic CIGAR string, where adjacent matches and mismatches are merged into `M` runs.
    pub fn classic_string(steps: impl Iterator<Item: Borrow<Step<Len>>>) -> String {
        let mut result = String::new();
        let mut current: Option<(char, usize)> = None;
        for step in steps {
            let step = step.borrow();
            let symbol = step.op().classic_symbol();
            let len = step.len().to_usize().unwrap_or(0);
            current = match current {
                Some((s, n)) if s == symbol => Some((s, n + len)),
                Some((s, n)) => {
                    result.push_str(&n.to_string());
                    result.push(s);
                    Some((symbol, len))
                }
                None => Some((symbol, len)),
            };
        }
        if let Some((s, n)) = current {
            result.push_str(&n.to_string());
            result.push(s);
        }
        result
    }
}
