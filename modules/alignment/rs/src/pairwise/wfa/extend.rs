use super::config::Span;
use super::wavefront::{is_null, Offset, Wavefront, OFFSET_NULL};

/// Symbol equality used in place of byte equality, e.g. case-insensitive or IUPAC-aware matching.
pub type SymbolMatch = fn(u8, u8) -> bool;

/// The pair of sequences being aligned. Diagonal `k` at offset `h` points to `pattern[h - k]` and `text[h]`.
#[derive(Copy, Clone, Debug)]
pub struct Sequences<'a> {
    pattern: &'a [u8],
    text: &'a [u8],
    symbol_match: Option<SymbolMatch>,
}

impl<'a> Sequences<'a> {
    pub fn new(pattern: &'a [u8], text: &'a [u8]) -> Self {
        Self {
            pattern,
            text,
            symbol_match: None,
        }
    }

    /// Compare symbols with `symbol_match` instead of byte equality.
    pub fn with_symbol_match(mut self, symbol_match: Option<SymbolMatch>) -> Self {
        self.symbol_match = symbol_match;
        self
    }

    pub fn symbol_match(&self) -> Option<SymbolMatch> {
        self.symbol_match
    }

    pub fn pattern(&self) -> &'a [u8] {
        self.pattern
    }

    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    #[inline(always)]
    pub fn pattern_len(&self) -> i32 {
        self.pattern.len() as i32
    }

    #[inline(always)]
    pub fn text_len(&self) -> i32 {
        self.text.len() as i32
    }

    /// Diagonal of the end-to-end alignment end.
    pub fn final_diagonal(&self) -> i32 {
        self.text_len() - self.pattern_len()
    }

    /// Whether the position `(v, h)` lies within the alignment matrix.
    #[inline(always)]
    pub fn contains(&self, v: i32, h: i32) -> bool {
        v >= 0 && h >= 0 && v <= self.pattern_len() && h <= self.text_len()
    }

    /// Number of matching symbols starting at `(v, h)`.
    #[inline(always)]
    pub fn matches_at(&self, v: i32, h: i32) -> usize {
        let (pattern, text) = (&self.pattern[v as usize..], &self.text[h as usize..]);
        match self.symbol_match {
            None => matching_prefix(pattern, text),
            Some(eq) => pattern.iter().zip(text).take_while(|(x, y)| eq(**x, **y)).count(),
        }
    }
}

const WORD: usize = size_of::<u64>();

/// Length of the common prefix of two byte slices.
///
/// Compares 8 bytes at a time; the first differing byte inside a word is located from the number of
/// trailing zero bits of the xor (little-endian words keep the first byte in the lowest bits).
pub fn matching_prefix(a: &[u8], b: &[u8]) -> usize {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    let mut matched = 0;
    for (wa, wb) in a.chunks_exact(WORD).zip(b.chunks_exact(WORD)) {
        let (Ok(wa), Ok(wb)) = (<[u8; WORD]>::try_from(wa), <[u8; WORD]>::try_from(wb)) else {
            break;
        };
        let diff = u64::from_le_bytes(wa) ^ u64::from_le_bytes(wb);
        if diff != 0 {
            return matched + (diff.trailing_zeros() / u8::BITS) as usize;
        }
        matched += WORD;
    }

    matched
        + a[matched..]
            .iter()
            .zip(&b[matched..])
            .take_while(|(x, y)| x == y)
            .count()
}

#[inline(always)]
fn extend_diagonal(seqs: &Sequences, k: i32, offset: &mut Offset) {
    if is_null(*offset) {
        return;
    }
    let (v, h) = (*offset - k, *offset);
    if !seqs.contains(v, h) {
        return;
    }
    *offset += seqs.matches_at(v, h) as Offset;
}

/// Advances every reachable diagonal of the M wavefront through its run of matches.
pub fn extend_end2end(wf: &mut Wavefront, seqs: &Sequences) {
    let (lo, offsets) = wf.offsets_mut();
    for (k, offset) in (lo..).zip(offsets.iter_mut()) {
        extend_diagonal(seqs, k, offset);
    }
}

/// Same as [`extend_end2end`], but also returns the furthest anti-diagonal (`2 * offset - k`) reached.
/// Returns `OFFSET_NULL` for a wavefront without reachable diagonals.
pub fn extend_end2end_max(wf: &mut Wavefront, seqs: &Sequences) -> Offset {
    let mut max = OFFSET_NULL;
    let (lo, offsets) = wf.offsets_mut();
    for (k, offset) in (lo..).zip(offsets.iter_mut()) {
        extend_diagonal(seqs, k, offset);
        if !is_null(*offset) {
            max = max.max(2 * *offset - k);
        }
    }
    max
}

/// Whether `(v, h)` ends an ends-free alignment: the whole text is consumed and at most
/// `pattern_end_free` pattern symbols are left, or the other way around.
fn is_free_end(seqs: &Sequences, pattern_end_free: u32, text_end_free: u32, v: i32, h: i32) -> bool {
    let (plen, tlen) = (seqs.pattern_len(), seqs.text_len());
    let text_done = h == tlen && (plen - v) as i64 <= pattern_end_free as i64;
    let pattern_done = v == plen && (tlen - h) as i64 <= text_end_free as i64;
    text_done || pattern_done
}

/// Extends the M wavefront and reports the lowest diagonal that reached a free end, if any.
pub fn extend_endsfree(
    wf: &mut Wavefront,
    seqs: &Sequences,
    pattern_end_free: u32,
    text_end_free: u32,
) -> Option<(i32, Offset)> {
    let mut end = None;

    let (lo, offsets) = wf.offsets_mut();
    for (k, offset) in (lo..).zip(offsets.iter_mut()) {
        extend_diagonal(seqs, k, offset);
        if end.is_some() || is_null(*offset) {
            continue;
        }

        let (v, h) = (*offset - k, *offset);
        if seqs.contains(v, h) && is_free_end(seqs, pattern_end_free, text_end_free, v, h) {
            end = Some((k, *offset));
        }
    }
    end
}

/// Extends the M wavefront with a caller-supplied match test on `(v, h)` positions.
///
/// Works for both spans and tracks the furthest anti-diagonal in `max_antidiagonal`.
/// Returns the end `(k, offset)` once it is reached, the lowest diagonal for ends-free spans.
pub fn extend_custom<F>(
    wf: &mut Wavefront,
    seqs: &Sequences,
    matches: F,
    span: Span,
    max_antidiagonal: &mut Offset,
) -> Option<(i32, Offset)>
where
    F: Fn(i32, i32) -> bool,
{
    let (plen, tlen) = (seqs.pattern_len(), seqs.text_len());
    let mut end = None;

    let (lo, offsets) = wf.offsets_mut();
    for (k, offset) in (lo..).zip(offsets.iter_mut()) {
        if is_null(*offset) {
            continue;
        }
        let (mut v, mut h) = (*offset - k, *offset);
        if !seqs.contains(v, h) {
            continue;
        }
        while v < plen && h < tlen && matches(v, h) {
            v += 1;
            h += 1;
        }
        *offset = h;
        *max_antidiagonal = (*max_antidiagonal).max(2 * h - k);

        if let Span::EndsFree {
            pattern_end_free,
            text_end_free,
        } = span
        {
            if end.is_none() && is_free_end(seqs, pattern_end_free, text_end_free, v, h) {
                end = Some((k, h));
            }
        }
    }

    match span {
        Span::EndToEnd => {
            let k = seqs.final_diagonal();
            (wf.offset(k) >= tlen).then_some((k, tlen))
        }
        Span::EndsFree { .. } => end,
    }
}
