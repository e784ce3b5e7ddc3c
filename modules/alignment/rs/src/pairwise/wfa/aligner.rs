use derive_getters::Getters;
use eyre::{bail, ensure, eyre, Result};

use wavebit_core_rs::alignment::pairwise::Alignment;

use super::backtrace::{collect_ops, unpack};
use super::components::WavefrontComponents;
use super::compute::compute_affine;
use super::config::{BacktraceMode, Config, Span};
use super::extend::{extend_custom, extend_end2end_max, extend_endsfree, Sequences};
use super::pool::BacktracePool;
use super::wavefront::{Offset, OFFSET_NULL};

/// Counters of the last alignment.
#[derive(Clone, Eq, PartialEq, Debug, Getters)]
pub struct AlignmentStats {
    /// Number of computed scores
    scores: u32,
    /// Offload sweeps over all wavefronts
    sweeps: u32,
    /// Blocks written to the backtrace pool
    blocks: u64,
    /// Furthest anti-diagonal reached by the end-to-end extension
    max_antidiagonal: Offset,
}

impl Default for AlignmentStats {
    fn default() -> Self {
        Self {
            scores: 0,
            sweeps: 0,
            blocks: 0,
            max_antidiagonal: OFFSET_NULL,
        }
    }
}

/// Gap-affine wavefront aligner.
///
/// Storage is kept between calls, aligning many pairs with the same aligner avoids most allocations.
pub struct Aligner {
    config: Config,
    components: WavefrontComponents,
    stats: AlignmentStats,
}

impl Aligner {
    /// Sequences longer than this can't be addressed by the wavefront offsets.
    pub const MAX_SEQUENCE_LEN: usize = (i32::MAX / 4) as usize;

    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let pool = match config.backtrace {
            BacktraceMode::Piggyback => Some(BacktracePool::new(config.pool_segment_len)?),
            BacktraceMode::ScoreOnly => None,
        };
        let components = WavefrontComponents::new(&config.penalties, pool);
        Ok(Self {
            config,
            components,
            stats: AlignmentStats::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &AlignmentStats {
        &self.stats
    }

    /// Aligns the `pattern` against the `text` with the minimum gap-affine penalty.
    pub fn align(&mut self, pattern: &[u8], text: &[u8]) -> Result<Alignment<u32, u32>> {
        ensure!(
            pattern.len() <= Self::MAX_SEQUENCE_LEN && text.len() <= Self::MAX_SEQUENCE_LEN,
            "Sequences longer than {} symbols are not supported",
            Self::MAX_SEQUENCE_LEN
        );
        let seqs = Sequences::new(pattern, text).with_symbol_match(self.config.symbol_match);
        self.components.reset(&seqs);
        self.stats = AlignmentStats::default();

        let mut score = 0;
        loop {
            if let Some(end) = self.extend(&seqs, score) {
                return self.finish(&seqs, score, end);
            }
            if let Some(max_score) = self.config.max_score {
                if score >= max_score {
                    log::warn!(
                        "Alignment of {} vs {} symbols exceeded the maximum score {}",
                        pattern.len(),
                        text.len(),
                        max_score
                    );
                    bail!("Alignment score exceeds the maximum of {max_score}");
                }
            }

            score += 1;
            let offload = compute_affine(&mut self.components, &self.config.penalties, &seqs, score)?;
            self.stats.scores += 1;
            self.stats.sweeps += offload.sweeps;
            self.stats.blocks += offload.blocks;
        }
    }

    /// Extends the M wavefront of `score` and returns the end `(k, offset)` if it was reached.
    fn extend(&mut self, seqs: &Sequences, score: u32) -> Option<(i32, Offset)> {
        let m = self.components.m_mut(score)?;
        if let Some(symbol_match) = seqs.symbol_match() {
            let (pattern, text) = (seqs.pattern(), seqs.text());
            return extend_custom(
                m,
                seqs,
                |v, h| symbol_match(pattern[v as usize], text[h as usize]),
                self.config.span,
                &mut self.stats.max_antidiagonal,
            );
        }
        match self.config.span {
            Span::EndToEnd => {
                let max = extend_end2end_max(m, seqs);
                self.stats.max_antidiagonal = self.stats.max_antidiagonal.max(max);

                let k = seqs.final_diagonal();
                (m.offset(k) >= seqs.text_len()).then_some((k, seqs.text_len()))
            }
            Span::EndsFree {
                pattern_end_free,
                text_end_free,
            } => extend_endsfree(m, seqs, pattern_end_free, text_end_free),
        }
    }

    fn finish(&self, seqs: &Sequences, score: u32, (k, offset): (i32, Offset)) -> Result<Alignment<u32, u32>> {
        let (v, h) = (offset - k, offset);
        log::trace!("Score {score}: reached ({v}, {h}) on the diagonal {k}");

        let steps = match self.components.pool() {
            Some(pool) => {
                let (pcigar, prev) = self
                    .components
                    .m(score)
                    .and_then(|m| m.backtrace(k))
                    .ok_or_else(|| eyre!("Missing backtrace for the diagonal {k} at score {score}"))?;
                let ops = collect_ops(pool, pcigar, prev)?;
                Some(unpack(&ops, seqs, (v, h))?)
            }
            None => None,
        };

        log::debug!(
            "Aligned {} vs {} symbols: score {}, {} scores computed, {} backtrace blocks",
            seqs.pattern_len(),
            seqs.text_len(),
            score,
            self.stats.scores,
            self.stats.blocks
        );
        Ok(Alignment::new(score, steps, 0..v as usize, 0..h as usize))
    }
}
