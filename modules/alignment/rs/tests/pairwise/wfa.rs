use eyre::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use wavebit_alignment_rs::pairwise::alignment::utils::prettify;
use wavebit_alignment_rs::pairwise::alignment::{Op, Step};
use wavebit_alignment_rs::pairwise::scoring::Affine;
use wavebit_alignment_rs::pairwise::wfa::{Aligner, BacktraceMode, Config, Span, SymbolMatch};

pub fn invrle(rle: &str) -> String {
    rle.chars()
        .map(|x| match x {
            'I' => 'D',
            'D' => 'I',
            x => x,
        })
        .collect()
}

fn aligner(penalties: Affine, backtrace: BacktraceMode, span: Span) -> Result<Aligner> {
    Aligner::new(Config::new(penalties, backtrace, span, None, 1 << 10, None))
}

struct Workload<'a> {
    pattern: &'a [u8],
    text: &'a [u8],
    score: u32,
    rle: &'a str,
}

fn ensure(aligner: &mut Aligner, w: Workload<'_>) -> Result<()> {
    let invrle = invrle(w.rle);
    for (pattern, text, rle) in [(w.pattern, w.text, w.rle), (w.text, w.pattern, invrle.as_str())] {
        let result = aligner.align(pattern, text)?;
        assert_eq!(*result.score(), w.score);
        assert_eq!(result.pattern(), &(0..pattern.len()));
        assert_eq!(result.text(), &(0..text.len()));
        assert_eq!(result.rle().as_deref(), Some(rle));
    }
    Ok(())
}

#[test]
fn test_end_to_end() -> Result<()> {
    let mut aligner = aligner(Affine::default(), BacktraceMode::Piggyback, Span::EndToEnd)?;
    let workload = vec![
        Workload {
            pattern: b"ACGT",
            text: b"ACGT",
            score: 0,
            rle: "4=",
        },
        Workload {
            pattern: b"ACGT",
            text: b"AGGT",
            score: 4,
            rle: "1=1X2=",
        },
        Workload {
            pattern: b"ACGT",
            text: b"ACT",
            score: 8,
            rle: "2=1D1=",
        },
        Workload {
            pattern: b"ACGTTTTACG",
            text: b"ACGACG",
            score: 6 + 4 * 2,
            rle: "3=4D3=",
        },
        Workload {
            pattern: b"CGT",
            text: b"ACGT",
            score: 8,
            rle: "1I3=",
        },
    ];
    for w in workload {
        ensure(&mut aligner, w)?;
    }
    Ok(())
}

#[test]
fn test_deletion_cigar() -> Result<()> {
    let mut aligner = aligner(Affine::default(), BacktraceMode::Piggyback, Span::EndToEnd)?;
    let alignment = aligner.align(b"ACGT", b"ACT")?;
    assert_eq!(alignment.cigar().as_deref(), Some("2M1D1M"));

    let steps = alignment.steps().as_ref().map(|x| x.as_slice()).unwrap_or_default();
    let deletions: u32 = steps.iter().filter(|x| *x.op() == Op::Deletion).map(|x| *x.len()).sum();
    let matches: u32 = steps.iter().filter(|x| *x.op() == Op::Match).map(|x| *x.len()).sum();
    assert_eq!((deletions, matches), (1, 3));
    assert_eq!(prettify(b"ACGT", b"ACT", steps)?, "ACGT\n|| |\nAC-T");
    Ok(())
}

#[test]
fn test_score_only() -> Result<()> {
    let mut aligner = aligner(Affine::default(), BacktraceMode::ScoreOnly, Span::EndToEnd)?;
    let alignment = aligner.align(b"ACGTTTTACG", b"ACGACG")?;
    assert_eq!(*alignment.score(), 14);
    assert!(!alignment.has_steps());
    assert_eq!(alignment.rle(), None);
    Ok(())
}

#[test]
fn test_ends_free() -> Result<()> {
    let span = Span::EndsFree {
        pattern_end_free: 4,
        text_end_free: 0,
    };
    let mut aligner = aligner(Affine::default(), BacktraceMode::Piggyback, span)?;

    // Trailing pattern symbols are left unaligned for free
    let alignment = aligner.align(b"ACGTACGTTTTT", b"ACGTACGA")?;
    assert_eq!(*alignment.score(), 4);
    assert_eq!(alignment.pattern(), &(0..8));
    assert_eq!(alignment.text(), &(0..8));
    assert_eq!(alignment.rle().as_deref(), Some("7=1X"));

    // Only a part of the tail is free, the rest is aligned as a gap
    let alignment = aligner.align(b"ACGTAAAAAA", b"ACGT")?;
    assert_eq!(*alignment.score(), 6 + 2 * 2);
    assert_eq!(alignment.pattern(), &(0..6));
    assert_eq!(alignment.rle().as_deref(), Some("4=2D"));
    Ok(())
}

/// Minimum gap-affine penalty computed with the classic three-matrix dynamic programming.
fn gotoh(pattern: &[u8], text: &[u8], penalties: &Affine) -> u64 {
    const INF: u64 = u64::MAX / 4;
    let (x, o, e) = (
        *penalties.mismatch() as u64,
        *penalties.gap_open() as u64,
        *penalties.gap_extend() as u64,
    );
    let (n, m) = (pattern.len(), text.len());
    let mut h = vec![vec![INF; m + 1]; n + 1];
    let mut ins = vec![vec![INF; m + 1]; n + 1];
    let mut del = vec![vec![INF; m + 1]; n + 1];

    h[0][0] = 0;
    for i in 0..=n {
        for j in 0..=m {
            if j > 0 {
                ins[i][j] = (h[i][j - 1] + o + e).min(ins[i][j - 1] + e);
            }
            if i > 0 {
                del[i][j] = (h[i - 1][j] + o + e).min(del[i - 1][j] + e);
            }
            if i > 0 || j > 0 {
                let diagonal = if i > 0 && j > 0 {
                    h[i - 1][j - 1] + if pattern[i - 1] == text[j - 1] { 0 } else { x }
                } else {
                    INF
                };
                h[i][j] = diagonal.min(ins[i][j]).min(del[i][j]);
            }
        }
    }
    h[n][m]
}

fn random_sequence(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect()
}

/// Copies the sequence with random substitutions, insertions and deletions.
fn mutate(rng: &mut StdRng, seq: &[u8], substitution: f64, indel: f64) -> Vec<u8> {
    let mut result = Vec::with_capacity(seq.len() + seq.len() / 8);
    for &symbol in seq {
        if rng.gen_bool(indel) {
            if rng.gen_bool(0.5) {
                continue;
            }
            let len = rng.gen_range(1..4);
            result.extend(random_sequence(rng, len));
        }
        if rng.gen_bool(substitution) {
            result.push(b"ACGT"[(b"ACGT".iter().position(|x| *x == symbol).unwrap_or(0) + 1) % 4]);
        } else {
            result.push(symbol);
        }
    }
    result
}

/// The path must consume both sequences exactly, with matches and mismatches where they say they are.
fn validate(pattern: &[u8], text: &[u8], steps: &[Step<u32>]) {
    let (mut v, mut h) = (0usize, 0usize);
    for step in steps {
        for _ in 0..*step.len() {
            match step.op() {
                Op::Match => assert_eq!(pattern[v], text[h]),
                Op::Mismatch => assert_ne!(pattern[v], text[h]),
                Op::Insertion | Op::Deletion => {}
            }
            step.op().apply(&mut v, &mut h, 1usize);
        }
    }
    assert_eq!((v, h), (pattern.len(), text.len()));
}

#[test]
fn test_random_against_dynamic_programming() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0xAC67);
    for penalties in [Affine::default(), Affine::new(1, 0, 1)?, Affine::new(3, 5, 1)?, Affine::new(6, 8, 4)?] {
        let mut piggyback = aligner(penalties, BacktraceMode::Piggyback, Span::EndToEnd)?;
        let mut score_only = aligner(penalties, BacktraceMode::ScoreOnly, Span::EndToEnd)?;

        for _ in 0..100 {
            let len = rng.gen_range(0..80);
            let pattern = random_sequence(&mut rng, len);
            let text = if rng.gen_bool(0.1) {
                let len = rng.gen_range(0..40);
                random_sequence(&mut rng, len)
            } else {
                mutate(&mut rng, &pattern, 0.1, 0.05)
            };

            let expected = gotoh(&pattern, &text, &penalties);
            let alignment = piggyback.align(&pattern, &text)?;
            assert_eq!(*alignment.score() as u64, expected);

            let steps = alignment.steps().as_ref().map(|x| x.as_slice()).unwrap_or_default();
            validate(&pattern, &text, steps);
            assert_eq!(penalties.evaluate(steps), expected);

            assert_eq!(*score_only.align(&pattern, &text)?.score() as u64, expected);
        }
    }
    Ok(())
}

#[test]
fn test_long_alignment_offloads() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(20_000);
    let penalties = Affine::new(20, 30, 10)?;
    let pattern = random_sequence(&mut rng, 10_000);
    let text = mutate(&mut rng, &pattern, 0.08, 0.005);

    let mut aligner = aligner(penalties, BacktraceMode::Piggyback, Span::EndToEnd)?;
    let alignment = aligner.align(&pattern, &text)?;
    let score = *alignment.score();
    assert!(score >= 10_000, "score {} is too low", score);

    // Registers were offloaded many times over the whole path
    let stats = aligner.stats().clone();
    assert!(*stats.sweeps() >= 3);
    assert!(*stats.blocks() > 0);
    assert_eq!(*stats.scores(), score);

    let steps = alignment.steps().as_ref().map(|x| x.as_slice()).unwrap_or_default();
    validate(&pattern, &text, steps);
    assert_eq!(penalties.evaluate(steps), score as u64);

    let mut score_only = Aligner::new(Config::new(penalties, BacktraceMode::ScoreOnly, Span::EndToEnd, None, 1, None))?;
    assert_eq!(*score_only.align(&pattern, &text)?.score(), score);
    Ok(())
}

#[test]
fn test_aligner_reuse() -> Result<()> {
    let mut aligner = aligner(Affine::default(), BacktraceMode::Piggyback, Span::EndToEnd)?;
    let first = aligner.align(b"ACGTTTTACG", b"ACGACG")?;
    aligner.align(b"TTTTTTTTTTTT", b"AAAA")?;
    let second = aligner.align(b"ACGTTTTACG", b"ACGACG")?;
    assert_eq!(first, second);
    Ok(())
}

fn ignore_case(a: u8, b: u8) -> bool {
    a.eq_ignore_ascii_case(&b)
}

#[test]
fn test_case_insensitive_matching() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0xCA5E);
    let penalties = Affine::default();
    let config = |backtrace| Config {
        backtrace,
        symbol_match: Some(ignore_case as SymbolMatch),
        ..Config::default()
    };
    let mut piggyback = Aligner::new(config(BacktraceMode::Piggyback))?;
    let mut score_only = Aligner::new(config(BacktraceMode::ScoreOnly))?;

    for _ in 0..50 {
        let len = rng.gen_range(0..60);
        let pattern = random_sequence(&mut rng, len);
        let text = mutate(&mut rng, &pattern, 0.1, 0.05);
        let expected = gotoh(&pattern, &text, &penalties);

        // Soft-masked text: byte equality would see mismatches everywhere in lowercase runs
        let masked: Vec<u8> = text
            .iter()
            .map(|x| if rng.gen_bool(0.5) { x.to_ascii_lowercase() } else { *x })
            .collect();

        let alignment = piggyback.align(&pattern, &masked)?;
        assert_eq!(*alignment.score() as u64, expected);
        let steps = alignment.steps().as_ref().map(|x| x.as_slice()).unwrap_or_default();
        validate(&pattern, &text, steps);

        assert_eq!(*score_only.align(&pattern, &masked)?.score() as u64, expected);
    }
    Ok(())
}
