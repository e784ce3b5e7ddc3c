//! Gap-affine wavefront alignment (WFA) with piggyback backtrace.
//!
//! The aligner advances, score by score, the furthest reaching offsets of three components: M (match/mismatch),
//! I1 and D1 (gap opened or extended). Offsets are indexed by the diagonal `k = h - v`, where `h` is the
//! text coordinate and `v` the pattern coordinate. The alignment path is not stored in a traceback matrix,
//! instead every diagonal carries a short packed register of its last operations that is offloaded to
//! an append-only pool when it fills up.

pub use aligner::{Aligner, AlignmentStats};
pub use config::{BacktraceMode, Config, Span};
pub use extend::SymbolMatch;

pub mod aligner;
pub mod backtrace;
pub mod components;
pub mod compute;
pub mod config;
pub mod extend;
pub mod pcigar;
pub mod pool;
pub mod wavefront;
