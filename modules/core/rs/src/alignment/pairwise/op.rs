use crate::num::PrimUInt;

/// `Op` represents a single operation in a pairwise alignment of a pattern against a text.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Op {
    /// Represents a match between the sequences (=)
    Match,
    /// Represents a mismatch between the sequences (X)
    Mismatch,
    /// Represents a text symbol missing from the pattern (I)
    Insertion,
    /// Represents a pattern symbol missing from the text (D)
    Deletion,
}

impl Op {
    /// Returns `true` if the operation is represented by a diagonal movement in the alignment matrix.
    pub fn is_diagonal(&self) -> bool {
        matches!(self, Op::Match | Op::Mismatch)
    }

    /// Returns `true` if the operation opens or extends a gap.
    pub fn is_gap(&self) -> bool {
        matches!(self, Op::Insertion | Op::Deletion)
    }

    /// Returns the extended CIGAR symbol of the operation.
    pub fn symbol(&self) -> char {
        match self {
            Op::Match => '=',
            Op::Mismatch => 'X',
            Op::Insertion => 'I',
            Op::Deletion => 'D',
        }
    }

    /// Returns the classic CIGAR symbol, where matches and mismatches collapse into `M`.
    pub fn classic_symbol(&self) -> char {
        match self {
            Op::Match | Op::Mismatch => 'M',
            Op::Insertion => 'I',
            Op::Deletion => 'D',
        }
    }

    /// Applies the operation to the given pattern and text positions.
    pub fn apply<Len, Idx>(&self, pattern: &mut Idx, text: &mut Idx, len: Len)
    where
        Len: PrimUInt + Into<Idx>,
        Idx: PrimUInt,
    {
        match self {
            Op::Deletion => *pattern = *pattern + len.into(),
            Op::Insertion => *text = *text + len.into(),
            Op::Match | Op::Mismatch => {
                *pattern = *pattern + len.into();
                *text = *text + len.into();
            }
        };
    }
}

impl TryFrom<char> for Op {
    type Error = ();

    /// Tries to convert an extended CIGAR character into an `Op`.
    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '=' => Ok(Op::Match),
            'X' => Ok(Op::Mismatch),
            'I' => Ok(Op::Insertion),
            'D' => Ok(Op::Deletion),
            _ => Err(()),
        }
    }
}
