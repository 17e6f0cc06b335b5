//! Structural line diff: generate, invert and apply hunk sequences.
//!
//! Hunks carry zero context lines. A hunk sequence from [`diff`] applied to
//! the old text with [`apply`] reproduces the new text byte for byte, and
//! [`invert`] turns it into the sequence that goes the other way.

use std::ops::Range;

use similar::{Algorithm, DiffTag, TextDiff};

use crate::error::PatchApplyError;
use crate::types::{Hunk, NO_NEWLINE_MARKER};

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line<'a> {
    text: &'a str,
    /// `false` only for a final line without a trailing `\n`.
    eol: bool,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    text.split_inclusive('\n')
        .map(|raw| match raw.strip_suffix('\n') {
            Some(text) => Line { text, eol: true },
            None => Line {
                text: raw,
                eol: false,
            },
        })
        .collect()
}

fn push_body_line(body: &mut Vec<String>, prefix: char, line: &str) {
    match line.strip_suffix('\n') {
        Some(text) => body.push(format!("{prefix}{text}")),
        None => {
            body.push(format!("{prefix}{line}"));
            body.push(NO_NEWLINE_MARKER.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

/// Hunks turning `old` into `new`, in ascending position order.
///
/// Identical inputs produce an empty sequence. The output is deterministic
/// for fixed inputs.
pub fn diff(old: &str, new: &str) -> Vec<Hunk> {
    if old == new {
        return Vec::new();
    }
    let old_tokens: Vec<&str> = old.split_inclusive('\n').collect();
    let new_tokens: Vec<&str> = new.split_inclusive('\n').collect();
    let text_diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_slices(&old_tokens, &new_tokens);

    // Both cursors advance by op lengths. An op's own index on its empty
    // side can lag or lead, so it is never read.
    let mut hunks = Vec::new();
    let mut old_pos = 0;
    let mut new_pos = 0;
    let mut pending: Option<(Range<usize>, Range<usize>)> = None;

    for op in text_diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let (old_len, new_len) = (old_range.len(), new_range.len());
        match tag {
            DiffTag::Equal => {
                if old_len > 0 {
                    if let Some((old_span, new_span)) = pending.take() {
                        hunks.push(build_hunk(&old_tokens, &new_tokens, old_span, new_span));
                    }
                }
            }
            DiffTag::Delete | DiffTag::Insert | DiffTag::Replace => {
                let (old_span, new_span) =
                    pending.get_or_insert((old_pos..old_pos, new_pos..new_pos));
                old_span.end += old_len;
                new_span.end += new_len;
            }
        }
        old_pos += old_len;
        new_pos += new_len;
    }
    if let Some((old_span, new_span)) = pending {
        hunks.push(build_hunk(&old_tokens, &new_tokens, old_span, new_span));
    }
    hunks
}

/// One zero-context hunk replacing `old_span` of the old text with
/// `new_span` of the new text.
fn build_hunk(
    old_tokens: &[&str],
    new_tokens: &[&str],
    old_span: Range<usize>,
    new_span: Range<usize>,
) -> Hunk {
    let mut lines = Vec::with_capacity(old_span.len() + new_span.len());
    for line in &old_tokens[old_span.clone()] {
        push_body_line(&mut lines, '-', line);
    }
    for line in &new_tokens[new_span.clone()] {
        push_body_line(&mut lines, '+', line);
    }
    Hunk {
        old_start: old_span.start + 1,
        old_lines: old_span.len(),
        new_start: new_span.start + 1,
        new_lines: new_span.len(),
        lines,
    }
}

// ---------------------------------------------------------------------------
// invert
// ---------------------------------------------------------------------------

/// Swap the old and new sides of every hunk.
///
/// `invert(&invert(h)) == h` for any sequence.
pub fn invert(hunks: &[Hunk]) -> Vec<Hunk> {
    hunks.iter().map(invert_hunk).collect()
}

fn invert_hunk(hunk: &Hunk) -> Hunk {
    let lines = hunk
        .lines
        .iter()
        .map(|line| {
            if let Some(rest) = line.strip_prefix('+') {
                format!("-{rest}")
            } else if let Some(rest) = line.strip_prefix('-') {
                format!("+{rest}")
            } else {
                line.clone()
            }
        })
        .collect();
    Hunk {
        old_start: hunk.new_start,
        old_lines: hunk.new_lines,
        new_start: hunk.old_start,
        new_lines: hunk.old_lines,
        lines,
    }
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Context,
    Remove,
    Add,
}

fn parse_body(index: usize, hunk: &Hunk) -> Result<Vec<(Op, Line<'_>)>, PatchApplyError> {
    let mut body: Vec<(Op, Line<'_>)> = Vec::with_capacity(hunk.lines.len());
    for raw in &hunk.lines {
        if raw == NO_NEWLINE_MARKER {
            match body.last_mut() {
                Some((_, line)) => line.eol = false,
                None => {
                    return Err(PatchApplyError::Malformed {
                        hunk: index,
                        reason: "newline marker without a preceding line".to_string(),
                    })
                }
            }
            continue;
        }
        let mut chars = raw.chars();
        let op = match chars.next() {
            Some(' ') => Op::Context,
            Some('-') => Op::Remove,
            Some('+') => Op::Add,
            _ => {
                return Err(PatchApplyError::Malformed {
                    hunk: index,
                    reason: format!("line without +/-/space prefix: {raw:?}"),
                })
            }
        };
        body.push((
            op,
            Line {
                text: chars.as_str(),
                eol: true,
            },
        ));
    }

    let old_count = body.iter().filter(|(op, _)| *op != Op::Add).count();
    let new_count = body.iter().filter(|(op, _)| *op != Op::Remove).count();
    if old_count != hunk.old_lines || new_count != hunk.new_lines {
        return Err(PatchApplyError::Malformed {
            hunk: index,
            reason: format!(
                "header {} does not match body ({old_count} old, {new_count} new lines)",
                hunk.header()
            ),
        });
    }
    Ok(body)
}

/// Apply `hunks` to `text` without fuzz.
///
/// Every context and removed line must match `text` exactly at the stated
/// position; otherwise [`PatchApplyError`] names the first offending hunk.
pub fn apply(text: &str, hunks: &[Hunk]) -> Result<String, PatchApplyError> {
    let source = split_lines(text);
    let mut out: Vec<Line<'_>> = Vec::with_capacity(source.len());
    let mut cursor = 0;

    for (index, hunk) in hunks.iter().enumerate() {
        let body = parse_body(index, hunk)?;
        let start = hunk.old_start.saturating_sub(1);
        if start < cursor || start > source.len() {
            return Err(PatchApplyError::OutOfRange {
                hunk: index,
                start: hunk.old_start,
                len: source.len(),
            });
        }
        out.extend_from_slice(&source[cursor..start]);
        cursor = start;

        for (op, line) in body {
            match op {
                Op::Add => out.push(line),
                Op::Context | Op::Remove => {
                    let found = source.get(cursor);
                    if found != Some(&line) {
                        return Err(PatchApplyError::Mismatch {
                            hunk: index,
                            line: cursor + 1,
                            expected: line.text.to_string(),
                            found: found.map(|l| l.text.to_string()),
                        });
                    }
                    if op == Op::Context {
                        out.push(line);
                    }
                    cursor += 1;
                }
            }
        }
    }
    out.extend_from_slice(&source[cursor..]);

    let mut result = String::with_capacity(text.len());
    for line in out {
        result.push_str(line.text);
        if line.eol {
            result.push('\n');
        }
    }
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
