use std::fmt::Debug;

use eyre::{eyre, Result};

/// T values are primitive integers
pub trait PrimInt: ::num::PrimInt + Debug + Default {}
impl<T: ::num::PrimInt + Debug + Default> PrimInt for T {}

/// T values are non-negative primitive integers, e.g. lengths of alignment steps
pub trait PrimUInt: PrimInt + ::num::Unsigned {}
impl<T: PrimInt + ::num::Unsigned> PrimUInt for T {}

/// Convert a run length into the target integer type, failing if it doesn't fit.
pub fn checked_len<T: PrimUInt>(len: usize) -> Result<T> {
    <T as ::num::NumCast>::from(len).ok_or_else(|| {
        eyre!(
            "Length {len} doesn't fit into the target integer type (max = {:?})",
            T::max_value()
        )
    })
}
