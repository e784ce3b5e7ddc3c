use crate::pairwise::scoring::Affine;

use super::extend::Sequences;
use super::pool::BacktracePool;
use super::wavefront::Wavefront;

/// Score components stored for a single score. `None` stands for a null wavefront.
#[derive(Clone, Debug)]
struct ScoreSlot {
    score: u32,
    m: Option<Wavefront>,
    i1: Option<Wavefront>,
    d1: Option<Wavefront>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Component {
    M,
    I1,
    D1,
}

/// The four wavefronts a score is computed from.
#[derive(Copy, Clone, Debug)]
pub struct WavefrontInputs<'a> {
    pub m_sub: &'a Wavefront,
    pub m_gap1: &'a Wavefront,
    pub i1_ext: &'a Wavefront,
    pub d1_ext: &'a Wavefront,
}

impl WavefrontInputs<'_> {
    pub fn all_null(&self) -> bool {
        self.m_sub.is_null() && self.m_gap1.is_null() && self.i1_ext.is_null() && self.d1_ext.is_null()
    }

    /// Diagonal range of the next score: the union of the input ranges widened by one on each side.
    /// `None` when every input is null.
    pub fn limits(&self) -> Option<(i32, i32)> {
        [self.m_sub, self.m_gap1, self.i1_ext, self.d1_ext]
            .into_iter()
            .filter(|x| !x.is_null())
            .map(|x| (x.lo(), x.hi()))
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
            .map(|(lo, hi)| (lo - 1, hi + 1))
    }
}

/// Score-indexed storage of the M, I1 and D1 wavefronts.
///
/// Only the last `max_lookback + 1` scores are kept, older ones are recycled. Missing or null
/// components resolve to a shared all-null wavefront that covers every diagonal a computation can ask for.
#[derive(Clone, Debug)]
pub struct WavefrontComponents {
    slots: Vec<Option<ScoreSlot>>,
    spare: Vec<Wavefront>,
    null: Wavefront,
    pool: Option<BacktracePool>,
}

impl WavefrontComponents {
    /// Creates an empty store. A backtrace pool enables the piggyback mode.
    pub fn new(penalties: &Affine, pool: Option<BacktracePool>) -> Self {
        let len = penalties.max_lookback() as usize + 1;
        let piggyback = pool.is_some();
        Self {
            slots: vec![None; len],
            spare: Vec::new(),
            null: Wavefront::null(0, -1, piggyback),
            pool,
        }
    }

    pub fn is_piggyback(&self) -> bool {
        self.pool.is_some()
    }

    pub fn pool(&self) -> Option<&BacktracePool> {
        self.pool.as_ref()
    }

    /// Prepares the store for a new alignment: drops all scores, clears the backtrace pool and
    /// places the initial M wavefront at score zero.
    pub fn reset(&mut self, seqs: &Sequences) {
        let piggyback = self.is_piggyback();
        for slot in 0..self.slots.len() {
            self.recycle(slot);
        }
        if let Some(pool) = self.pool.as_mut() {
            pool.reset();
        }

        self.null = Wavefront::null(
            -seqs.pattern_len() - 2,
            seqs.text_len() + 2,
            piggyback,
        );
        self.slots[0] = Some(ScoreSlot {
            score: 0,
            m: Some(Wavefront::initial(piggyback)),
            i1: None,
            d1: None,
        });
    }

    fn recycle(&mut self, slot: usize) {
        if let Some(old) = self.slots[slot].take() {
            self.spare.extend([old.m, old.i1, old.d1].into_iter().flatten());
        }
    }

    fn lookup<'a>(
        slots: &'a [Option<ScoreSlot>],
        null: &'a Wavefront,
        score: Option<u32>,
        component: Component,
    ) -> &'a Wavefront {
        let wf = score
            .and_then(|s| slots[s as usize % slots.len()].as_ref().filter(|x| x.score == s))
            .and_then(|slot| match component {
                Component::M => slot.m.as_ref(),
                Component::I1 => slot.i1.as_ref(),
                Component::D1 => slot.d1.as_ref(),
            });
        match wf {
            Some(wf) if !wf.is_null() => wf,
            _ => null,
        }
    }

    fn get_mut(&mut self, score: Option<u32>, component: Component) -> Option<&mut Wavefront> {
        let len = self.slots.len();
        let slot = self.slots[score? as usize % len]
            .as_mut()
            .filter(|x| Some(x.score) == score)?;
        match component {
            Component::M => slot.m.as_mut(),
            Component::I1 => slot.i1.as_mut(),
            Component::D1 => slot.d1.as_mut(),
        }
    }

    /// Scores and components of the four inputs of `score`.
    fn sources(score: u32, penalties: &Affine) -> [(Option<u32>, Component); 4] {
        [
            (score.checked_sub(*penalties.mismatch()), Component::M),
            (score.checked_sub(penalties.gap_opening()), Component::M),
            (score.checked_sub(*penalties.gap_extend()), Component::I1),
            (score.checked_sub(*penalties.gap_extend()), Component::D1),
        ]
    }

    fn inputs<'a>(
        slots: &'a [Option<ScoreSlot>],
        null: &'a Wavefront,
        score: u32,
        penalties: &Affine,
    ) -> WavefrontInputs<'a> {
        let [m_sub, m_gap1, i1_ext, d1_ext] = Self::sources(score, penalties)
            .map(|(score, component)| Self::lookup(slots, null, score, component));
        WavefrontInputs {
            m_sub,
            m_gap1,
            i1_ext,
            d1_ext,
        }
    }

    pub fn fetch_input(&self, score: u32, penalties: &Affine) -> WavefrontInputs<'_> {
        Self::inputs(&self.slots, &self.null, score, penalties)
    }

    /// Inputs of `score` together with the backtrace pool, borrowed at the same time.
    pub fn inputs_and_pool(
        &mut self,
        score: u32,
        penalties: &Affine,
    ) -> (WavefrontInputs<'_>, Option<&mut BacktracePool>) {
        let Self {
            slots, null, pool, ..
        } = self;
        (Self::inputs(slots, null, score, penalties), pool.as_mut())
    }

    /// Pads every stored input of `score` with unreachable diagonals so that it covers `[lo, hi]`.
    pub fn init_ends(&mut self, score: u32, penalties: &Affine, lo: i32, hi: i32) {
        for (score, component) in Self::sources(score, penalties) {
            if let Some(wf) = self.get_mut(score, component) {
                if !wf.is_null() {
                    wf.init_ends(lo, hi);
                }
            }
        }
    }

    /// Fresh output wavefront over `[lo, hi]`, reusing recycled storage when possible.
    pub fn allocate_output(&mut self, lo: i32, hi: i32) -> Wavefront {
        let piggyback = self.is_piggyback();
        match self.spare.pop() {
            Some(mut wf) => {
                wf.reallocate(lo, hi, piggyback);
                wf
            }
            None => Wavefront::allocate(lo, hi, piggyback),
        }
    }

    pub fn store(&mut self, score: u32, m: Wavefront, i1: Wavefront, d1: Wavefront) {
        let slot = score as usize % self.slots.len();
        self.recycle(slot);

        let mut keep = |wf: Wavefront| {
            if wf.is_null() {
                self.spare.push(wf);
                None
            } else {
                Some(wf)
            }
        };
        let (m, i1, d1) = (keep(m), keep(i1), keep(d1));
        self.slots[slot] = Some(ScoreSlot { score, m, i1, d1 });
    }

    pub fn store_null(&mut self, score: u32) {
        let slot = score as usize % self.slots.len();
        self.recycle(slot);
        self.slots[slot] = Some(ScoreSlot {
            score,
            m: None,
            i1: None,
            d1: None,
        });
    }

    /// The M wavefront of `score`, if it's stored and not null.
    pub fn m(&self, score: u32) -> Option<&Wavefront> {
        Some(Self::lookup(&self.slots, &self.null, Some(score), Component::M)).filter(|x| !x.is_null())
    }

    pub fn m_mut(&mut self, score: u32) -> Option<&mut Wavefront> {
        self.get_mut(Some(score), Component::M).filter(|x| !x.is_null())
    }
}
