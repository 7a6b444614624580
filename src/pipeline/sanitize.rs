//! Sanitising: deterministic cleanup of model output into delimited pairs.
//!
//! ## Why is sanitising necessary?
//!
//! The instruction prefix asks for one `question;answer` pair per line, no
//! numbering, no commentary — and models still occasionally disobey:
//!
//! - Wrapping the whole output in ` ``` ` fences
//! - Numbering pairs (`1.`, `2)`) or bulleting them (`-`, `*`)
//! - Splitting a long answer across several physical lines
//! - Using semicolons inside an answer, which would collide with the
//!   pair delimiter in line-oriented import tools downstream
//!
//! This module applies cheap, deterministic rules that fix those quirks
//! without touching content. Each rule is independently testable.
//!
//! ## Rule Order
//!
//! Rules must run in this order: fences and line endings first so the
//! line-level passes see clean lines; numbering stripped before pairs are
//! folded so a numbered continuation line does not masquerade as content;
//! delimiter normalisation last, per folded pair, so only the first
//! semicolon of a pair survives as the delimiter.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all sanitising rules to raw model output.
///
/// Returns `question;answer` lines joined with `\n`, without a trailing
/// newline. Returns an empty string when no pairs survive.
///
/// Rules (applied in order):
/// 1. Strip outer markdown fences
/// 2. Normalise line endings (CRLF/CR → LF)
/// 3. Strip leading list numbering and bullets per line
/// 4. Fold continuation lines (no `;`) into the previous pair with a
///    literal `\n` marker so embedded newlines survive line-oriented tools
/// 5. Per pair: keep the first `;` as the delimiter, demote any further
///    `;` in the answer text to `,`
pub fn clean_answer_set(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    let s = strip_numbering(&s);
    let pairs = fold_pairs(&s);
    pairs
        .iter()
        .map(|p| normalise_delimiters(p))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 1: Strip outer markdown fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\n(.*)\n```\s*$").unwrap());

fn strip_outer_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Strip leading numbering and bullets ──────────────────────────────

static RE_NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:\d+[.)]\s*|[-*•]\s+)").unwrap());

fn strip_numbering(input: &str) -> String {
    RE_NUMBERING.replace_all(input, "").to_string()
}

// ── Rule 4: Fold lines into pairs ────────────────────────────────────────────

/// Group physical lines into pairs.
///
/// A line containing a `;` starts a new pair. A line without one continues
/// the previous pair, joined with a literal `\n` marker (two characters).
/// Lines before the first pair — model preamble like "Here are your
/// questions:" — carry no pair content and are dropped.
fn fold_pairs(input: &str) -> Vec<String> {
    let mut pairs: Vec<String> = Vec::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains(';') {
            pairs.push(line.to_string());
        } else if let Some(last) = pairs.last_mut() {
            last.push_str("\\n");
            last.push_str(line);
        }
    }
    pairs
}

// ── Rule 5: Normalise delimiters within a pair ───────────────────────────────

/// The first `;` separates question from answer; any later `;` would
/// collide with the delimiter downstream, so it becomes a comma.
fn normalise_delimiters(pair: &str) -> String {
    match pair.split_once(';') {
        Some((question, answer)) => {
            format!("{};{}", question.trim(), answer.trim().replace(';', ","))
        }
        None => pair.trim().to_string(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
