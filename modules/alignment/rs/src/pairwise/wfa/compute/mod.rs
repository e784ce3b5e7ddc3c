use eyre::Result;

use crate::pairwise::scoring::Affine;

use super::components::WavefrontComponents;
use super::extend::Sequences;
use super::wavefront::{Wavefront, WavefrontView, WavefrontViewMut};

pub mod piggyback;
pub mod plain;

/// Slices of the four inputs over `[lo - 1, hi + 1]` and of the three outputs over `[lo, hi]`.
///
/// Coverage is validated once here, the kernels index the slices directly.
#[derive(Debug)]
pub struct WavefrontSet<'a> {
    pub lo: i32,
    pub hi: i32,
    pub m_sub: WavefrontView<'a>,
    pub m_gap1: WavefrontView<'a>,
    pub i1_ext: WavefrontView<'a>,
    pub d1_ext: WavefrontView<'a>,
    pub out_m: WavefrontViewMut<'a>,
    pub out_i1: WavefrontViewMut<'a>,
    pub out_d1: WavefrontViewMut<'a>,
}

impl<'a> WavefrontSet<'a> {
    /// Inputs are `[m_sub, m_gap1, i1_ext, d1_ext]`, outputs are `[m, i1, d1]`.
    pub fn new(inputs: [&'a Wavefront; 4], outputs: [&'a mut Wavefront; 3], lo: i32, hi: i32) -> Result<Self> {
        let [m_sub, m_gap1, i1_ext, d1_ext] = inputs;
        let [out_m, out_i1, out_d1] = outputs;
        Ok(Self {
            lo,
            hi,
            m_sub: m_sub.view(lo - 1, hi + 1)?,
            m_gap1: m_gap1.view(lo - 1, hi + 1)?,
            i1_ext: i1_ext.view(lo - 1, hi + 1)?,
            d1_ext: d1_ext.view(lo - 1, hi + 1)?,
            out_m: out_m.view_mut(lo, hi)?,
            out_i1: out_i1.view_mut(lo, hi)?,
            out_d1: out_d1.view_mut(lo, hi)?,
        })
    }
}

/// Backtrace offloading performed while computing a score.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct OffloadStats {
    pub sweeps: u32,
    pub blocks: u64,
}

/// Computes the M, I1 and D1 wavefronts of `score` and stores them in `components`.
///
/// Scores whose inputs are all null are stored as null without allocating anything. The kernel is
/// picked by the store: piggyback when it owns a backtrace pool, plain otherwise.
pub fn compute_affine(
    components: &mut WavefrontComponents,
    penalties: &Affine,
    seqs: &Sequences,
    score: u32,
) -> Result<OffloadStats> {
    let Some((lo, hi)) = components.fetch_input(score, penalties).limits() else {
        log::trace!("Score {score}: all inputs are null");
        components.store_null(score);
        return Ok(OffloadStats::default());
    };

    components.init_ends(score, penalties, lo - 1, hi + 1);
    let mut m = components.allocate_output(lo, hi);
    let mut i1 = components.allocate_output(lo, hi);
    let mut d1 = components.allocate_output(lo, hi);

    let stats = {
        let (inputs, pool) = components.inputs_and_pool(score, penalties);
        let mut set = WavefrontSet::new(
            [inputs.m_sub, inputs.m_gap1, inputs.i1_ext, inputs.d1_ext],
            [&mut m, &mut i1, &mut d1],
            lo,
            hi,
        )?;
        match pool {
            Some(pool) => piggyback::compute(&mut set, pool)?,
            None => {
                plain::compute(&mut set);
                OffloadStats::default()
            }
        }
    };

    for wf in [&mut m, &mut i1, &mut d1] {
        wf.trim_ends(seqs);
    }
    log::trace!(
        "Score {score}: diagonals [{lo}, {hi}], M trimmed to [{}, {}]",
        m.lo(),
        m.hi()
    );
    components.store(score, m, i1, d1);
    Ok(stats)
}
