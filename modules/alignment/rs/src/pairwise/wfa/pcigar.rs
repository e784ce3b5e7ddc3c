use std::fmt::{Debug, Formatter};

/// A single operation stored in a piggyback register.
///
/// `Mismatch` doubles as the gap-close marker: it is pushed onto every M register once per score step,
/// so a gap is closed by the marker that follows its last operation.
#[repr(u32)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum PackedOp {
    Deletion = 1,
    Insertion = 2,
    Mismatch = 3,
}

impl PackedOp {
    #[inline(always)]
    fn code(self) -> u32 {
        self as u32
    }

    #[inline(always)]
    fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(PackedOp::Deletion),
            2 => Some(PackedOp::Insertion),
            3 => Some(PackedOp::Mismatch),
            _ => None,
        }
    }
}

/// Piggyback register: a tiny queue of alignment operations packed into a machine word.
///
/// Operations are shifted in at the low end, 2 bits each, so the oldest one always occupies the
/// highest significant bits. Code `0` is never used for an operation and the occupancy is derived
/// from the number of leading zeros.
#[derive(Copy, Clone, Eq, PartialEq, Default, Hash)]
pub struct PCigar(u32);

impl PCigar {
    pub const BITS_PER_OP: u32 = 2;
    pub const CAPACITY: u32 = u32::BITS / Self::BITS_PER_OP;
    pub const EMPTY: PCigar = PCigar(0);

    #[inline(always)]
    pub fn capacity(&self) -> u32 {
        Self::CAPACITY
    }

    #[inline(always)]
    pub fn len(&self) -> u32 {
        (u32::BITS - self.0.leading_zeros()).div_ceil(Self::BITS_PER_OP)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// More than half of the capacity is occupied.
    #[inline(always)]
    pub fn is_half_full(&self) -> bool {
        self.len() > Self::CAPACITY / 2
    }

    #[inline(always)]
    pub fn push(&mut self, op: PackedOp) {
        assert!(
            self.len() < Self::CAPACITY,
            "Piggyback register overflow: {:?}",
            self
        );
        self.0 = (self.0 << Self::BITS_PER_OP) | op.code();
    }

    /// Returns a copy of the register with `op` pushed on top.
    #[inline(always)]
    pub fn pushed(mut self, op: PackedOp) -> Self {
        self.push(op);
        self
    }

    #[inline(always)]
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Stored operations, oldest first.
    pub fn decode(&self) -> impl Iterator<Item = PackedOp> + '_ {
        let len = self.len();
        (0..len).rev().filter_map(move |i| {
            PackedOp::from_code((self.0 >> (i * Self::BITS_PER_OP)) & 0b11)
        })
    }
}

impl Debug for PCigar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PCigar(")?;
        for op in self.decode() {
            let symbol = match op {
                PackedOp::Deletion => 'D',
                PackedOp::Insertion => 'I',
                PackedOp::Mismatch => 'X',
            };
            write!(f, "{}", symbol)?;
        }
        write!(f, ")")
    }
}
