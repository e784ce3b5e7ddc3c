use eyre::{ensure, Result};
use itertools::Itertools;

use crate::num::PrimUInt;

use super::op::Op;
use super::step::Step;

/// Render an alignment path as three lines: pattern, match track, and text.
pub fn prettify<Len: PrimUInt>(pattern: &[u8], text: &[u8], steps: &[Step<Len>]) -> Result<String> {
    let total = steps
        .iter()
        .map(|x| x.len().to_usize().unwrap_or(0))
        .sum::<usize>();
    let mut lines: [String; 3] = std::array::from_fn(|_| String::with_capacity(total));

    let (mut p, mut t) = (0usize, 0usize);
    for step in steps {
        let len = step.len().to_usize().unwrap_or(0);
        let op = step.op();
        let consumes_pattern = op.is_diagonal() || *op == Op::Deletion;
        let consumes_text = op.is_diagonal() || *op == Op::Insertion;
        ensure!(
            !consumes_pattern || p + len <= pattern.len(),
            "Alignment path runs past the end of the pattern"
        );
        ensure!(
            !consumes_text || t + len <= text.len(),
            "Alignment path runs past the end of the text"
        );

        for i in 0..len {
            lines[0].push(if consumes_pattern { pattern[p + i] as char } else { '-' });
            lines[2].push(if consumes_text { text[t + i] as char } else { '-' });
            lines[1].push(match step.op() {
                Op::Match => '|',
                Op::Mismatch => '*',
                Op::Insertion | Op::Deletion => ' ',
            });
        }
        if consumes_pattern {
            p += len;
        }
        if consumes_text {
            t += len;
        }
    }

    Ok(lines.iter().join("\n"))
}
