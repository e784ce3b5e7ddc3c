use derive_getters::Dissolve;
use derive_more::Constructor;
use eyre::{ensure, Result};

use crate::pairwise::scoring::Affine;

use super::extend::SymbolMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BacktraceMode {
    /// Report the score and the aligned ranges only
    ScoreOnly,
    /// Carry piggyback registers along with the offsets and rebuild the path at the end
    #[default]
    Piggyback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Span {
    /// Both sequences are aligned in full
    #[default]
    EndToEnd,
    /// The alignment may stop before the end of either sequence, leaving up to the given number of symbols unaligned
    EndsFree {
        pattern_end_free: u32,
        text_end_free: u32,
    },
}

#[derive(Clone, Debug, Constructor, Dissolve)]
pub struct Config {
    pub penalties: Affine,
    pub backtrace: BacktraceMode,
    pub span: Span,
    // Give up once the score exceeds this value
    pub max_score: Option<u32>,
    // Number of blocks in a backtrace pool segment
    pub pool_segment_len: usize,
    // Symbol equality for the match extension, byte equality when missing
    pub symbol_match: Option<SymbolMatch>,
}

impl Config {
    pub const DEFAULT_POOL_SEGMENT_LEN: usize = 1 << 16;

    pub fn validate(&self) -> Result<()> {
        ensure!(self.pool_segment_len > 0, "Backtrace pool segment length must be positive");
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            penalties: Affine::default(),
            backtrace: BacktraceMode::default(),
            span: Span::default(),
            max_score: None,
            pool_segment_len: Self::DEFAULT_POOL_SEGMENT_LEN,
            symbol_match: None,
        }
    }
}
