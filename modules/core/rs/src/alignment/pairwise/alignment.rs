use std::fmt::Display;
use std::ops::Range;

use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;

use crate::num::PrimUInt;

use super::step::Step;

/// A pairwise alignment of a pattern against a text.
///
/// Steps are optional: score-only aligners report the score and the aligned ranges without the path.
#[derive(Clone, Eq, PartialEq, Debug, Getters, Constructor, Dissolve)]
pub struct Alignment<Score, StepLen: PrimUInt> {
    score: Score,
    steps: Option<Vec<Step<StepLen>>>,
    pattern: Range<usize>,
    text: Range<usize>,
}

impl<Score, StepLen: PrimUInt> Alignment<Score, StepLen> {
    /// Returns `true` if the alignment path was recovered.
    pub fn has_steps(&self) -> bool {
        self.steps.is_some()
    }

    /// Returns the total length of the alignment path - the sum of all step lengths.
    pub fn len(&self) -> usize {
        self.steps
            .iter()
            .flatten()
            .map(|x| x.len().to_usize().unwrap_or(0))
            .sum()
    }

    /// Checks if the alignment path is empty (or absent).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the extended CIGAR (`=`/`X`/`I`/`D`) of the alignment, if the path is known.
    pub fn rle(&self) -> Option<String>
    where
        StepLen: Display,
    {
        self.steps.as_ref().map(|x| Step::rle_string(x.iter()))
    }

    /// Returns the classic CIGAR (`M`/`I`/`D`) of the alignment, if the path is known.
    pub fn cigar(&self) -> Option<String> {
        self.steps.as_ref().map(|x| Step::classic_string(x.iter()))
    }
}
