//! Surgical span-level editing of mixed English/Sanskrit segments.
//!
//! Used when a full-segment prayer match fails but specific known
//! corruptions are present: a mis-transcribed scripture verse, a
//! mis-spelled title, a divine name. Edits are computed against one
//! immutable snapshot of the text and applied in reverse position order
//! (rightmost first) so earlier offsets stay valid after each splice;
//! applying overlapping edits in forward order would invalidate later
//! offsets and is forbidden.

mod patterns;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::constants::{
    AGGRESSIVE_EDIT_THRESHOLD, CONSERVATIVE_EDIT_THRESHOLD, LARGE_EDIT_PENALTY,
    LARGE_EDIT_SPAN_RATIO, MODERATE_EDIT_THRESHOLD, PROTECTED_REGION_WINDOW, SMALL_EDIT_BONUS,
    SMALL_EDIT_SPAN_RATIO,
};
use crate::context::has_sanskrit_script;
use crate::types::Confidence;

use self::patterns::{Replacer, COMPILED_RULES, EDIT_RULES, PROTECTED_PATTERNS};

/// Kind of bounded-region edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    /// Replace the span with a literal.
    Replace,
    /// Insert at the span start.
    Insert,
    /// Remove the span.
    Delete,
    /// Replace with a value computed from the match.
    Transform,
}

/// Caller-selected strictness for the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// Only near-certain edits (threshold 0.95).
    Conservative,
    /// The default (threshold 0.85).
    Moderate,
    /// Everything plausible (threshold 0.70).
    Aggressive,
}

impl EditMode {
    /// Minimum static rule confidence admitted by this mode.
    pub const fn threshold(self) -> Confidence {
        match self {
            EditMode::Conservative => CONSERVATIVE_EDIT_THRESHOLD,
            EditMode::Moderate => MODERATE_EDIT_THRESHOLD,
            EditMode::Aggressive => AGGRESSIVE_EDIT_THRESHOLD,
        }
    }
}

/// One bounded-region edit, with half-open byte offsets into the
/// original text snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct SurgicalEdit {
    /// Edit kind.
    pub kind: EditKind,
    /// Start offset in the original text.
    pub start: usize,
    /// End offset (exclusive) in the original text.
    pub end: usize,
    /// The text being replaced.
    pub original: String,
    /// The replacement text.
    pub replacement: String,
    /// Static confidence of the producing rule.
    pub confidence: Confidence,
    /// Rationale tag of the producing rule.
    pub reason: &'static str,
}

/// Result of one surgical editing attempt.
#[derive(Clone, Debug)]
pub struct SurgicalOutcome {
    /// Output text.
    pub text: String,
    /// Edits actually applied, in text order.
    pub edits: Vec<SurgicalEdit>,
    /// Mean applied confidence, adjusted for span size.
    pub confidence: Confidence,
    /// False only when the segment failed the dual gate and nothing was
    /// attempted; distinguishes "nothing to do" from an attempt that
    /// found no safe edits.
    pub success: bool,
}

static ENGLISH_STRUCTURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:the|is|are|was|were|and|of|to|in|that|this|it|for|with|as|a|an|at|on|from|about|says?)\b",
    )
    .unwrap()
});

static SANSKRIT_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:krishna|gita|geeta|dharma|karma|yoga|shloka|sloka|chakram?|evam|pravartitam|upanishads?|mantra|om|guru|atman|brahman|arjuna|vedas?|patanjali|shivaya|namah?a?|bhagavad)\b",
    )
    .unwrap()
});

/// Applies narrow pattern-triggered replacements, guarded against
/// protected regions. See the module docs for the ordering invariant.
#[derive(Clone, Copy, Debug)]
pub struct SurgicalEditor {
    mode: EditMode,
}

impl SurgicalEditor {
    /// Creates an editor for the given mode.
    pub fn new(mode: EditMode) -> SurgicalEditor {
        SurgicalEditor { mode }
    }

    /// The editor's mode.
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Attempts surgical edits on one segment.
    ///
    /// Segments lacking either an English-structure marker or a
    /// Sanskrit-content indicator are returned unchanged with
    /// `success: false`.
    pub fn edit(&self, text: &str) -> SurgicalOutcome {
        if !Self::gate(text) {
            return SurgicalOutcome {
                text: text.to_string(),
                edits: Vec::new(),
                confidence: 0.0,
                success: false,
            };
        }

        let protected = protected_spans(text);
        let threshold = self.mode.threshold();
        let mut candidates = Vec::new();

        for (rule, compiled) in EDIT_RULES.iter().zip(COMPILED_RULES.iter()) {
            if rule.confidence < threshold {
                continue;
            }
            let re = match compiled {
                Some(re) => re,
                None => continue,
            };
            for caps in re.captures_iter(text) {
                let m = match caps.get(0) {
                    Some(m) => m,
                    None => continue,
                };
                let start = if rule.preserve_prefix {
                    caps.get(1).map(|p| p.end()).unwrap_or_else(|| m.start())
                } else {
                    m.start()
                };
                let end = m.end();
                let original = &text[start..end];
                let replacement = match &rule.replacer {
                    Replacer::Literal(s) => (*s).to_string(),
                    Replacer::Transform(f) => f(&caps),
                };
                if replacement == original {
                    continue;
                }
                if overlaps_protected(start, end, &protected, text.len()) {
                    log::debug!(
                        "edit {:?} at {}..{} overlaps a protected region, skipped",
                        rule.reason,
                        start,
                        end
                    );
                    continue;
                }
                candidates.push(SurgicalEdit {
                    kind: rule.kind,
                    start,
                    end,
                    original: original.to_string(),
                    replacement,
                    confidence: rule.confidence,
                    reason: rule.reason,
                });
            }
        }

        let (out, applied) = apply_non_overlapping(text, candidates);
        let confidence = adjusted_confidence(&applied, text.len());
        SurgicalOutcome {
            text: out,
            edits: applied,
            confidence,
            success: true,
        }
    }

    fn gate(text: &str) -> bool {
        let english = ENGLISH_STRUCTURE.is_match(text);
        let sanskrit = SANSKRIT_CONTENT.is_match(text) || has_sanskrit_script(text);
        english && sanskrit
    }
}

fn protected_spans(text: &str) -> Vec<(usize, usize)> {
    PROTECTED_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| (m.start(), m.end())))
        .collect()
}

fn overlaps_protected(
    start: usize,
    end: usize,
    protected: &[(usize, usize)],
    len: usize,
) -> bool {
    let lo = start.saturating_sub(PROTECTED_REGION_WINDOW);
    let hi = (end + PROTECTED_REGION_WINDOW).min(len);
    protected.iter().any(|&(ps, pe)| lo < pe && ps < hi)
}

/// Applies edits rightmost-first, skipping any that overlap an already
/// accepted span. Returns the new text and the applied edits in text
/// order.
pub(crate) fn apply_non_overlapping(
    text: &str,
    mut edits: Vec<SurgicalEdit>,
) -> (String, Vec<SurgicalEdit>) {
    edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));
    let mut out = text.to_string();
    let mut applied: Vec<SurgicalEdit> = Vec::new();
    for edit in edits {
        if applied
            .iter()
            .any(|a| edit.start < a.end && a.start < edit.end)
        {
            log::debug!(
                "skipping edit {:?} at {}..{}: overlaps an accepted edit",
                edit.reason,
                edit.start,
                edit.end
            );
            continue;
        }
        out.replace_range(edit.start..edit.end, &edit.replacement);
        applied.push(edit);
    }
    applied.reverse();
    (out, applied)
}

fn adjusted_confidence(applied: &[SurgicalEdit], text_len: usize) -> Confidence {
    if applied.is_empty() {
        return 0.0;
    }
    let mean = applied.iter().map(|e| e.confidence).sum::<Confidence>() / applied.len() as f32;
    let changed: usize = applied.iter().map(|e| e.end - e.start).sum();
    let ratio = changed as f32 / text_len.max(1) as f32;
    let adjusted = if ratio > LARGE_EDIT_SPAN_RATIO {
        mean * LARGE_EDIT_PENALTY
    } else if ratio < SMALL_EDIT_SPAN_RATIO {
        (mean * SMALL_EDIT_BONUS).min(1.0)
    } else {
        mean
    };
    adjusted.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(start: usize, end: usize, replacement: &str) -> SurgicalEdit {
        SurgicalEdit {
            kind: EditKind::Replace,
            start,
            end,
            original: String::new(),
            replacement: replacement.to_string(),
            confidence: 0.9,
            reason: "test",
        }
    }

    #[test]
    fn pure_english_fails_the_gate() {
        let editor = SurgicalEditor::new(EditMode::Moderate);
        let outcome = editor.edit("the meeting is at nine in the morning");
        assert!(!outcome.success);
        assert!(outcome.edits.is_empty());
        assert_eq!(outcome.confidence, 0.0);
        assert_eq!(outcome.text, "the meeting is at nine in the morning");
    }

    #[test]
    fn conservative_mode_applies_verse_3_16() {
        let editor = SurgicalEditor::new(EditMode::Conservative);
        let outcome = editor.edit("The verse number is 16. evam pravartitam chakram ...");
        assert!(outcome.success);
        assert_eq!(outcome.edits.len(), 1);
        assert!(outcome
            .text
            .contains("evaṃ pravartitaṃ cakraṃ nānuvartayatīha yaḥ"));
    }

    #[test]
    fn conservative_mode_excludes_lower_confidence_rules() {
        let editor = SurgicalEditor::new(EditMode::Conservative);
        let outcome = editor.edit("the story of krishna is told here");
        assert!(outcome.success);
        assert!(outcome.edits.is_empty());
        assert_eq!(outcome.text, "the story of krishna is told here");
    }

    #[test]
    fn overlapping_candidates_apply_only_one() {
        let candidates = vec![edit(0, 5, "AAAAA"), edit(3, 8, "BBBBB")];
        let (out, applied) = apply_non_overlapping("0123456789", candidates);
        assert_eq!(applied.len(), 1);
        // The rightmost candidate is accepted; the overlapping one is
        // skipped rather than corrupting offsets.
        assert_eq!(out, "012BBBBB89");
    }

    #[test]
    fn adjacent_non_overlapping_edits_both_apply() {
        let candidates = vec![edit(0, 3, "xxx"), edit(3, 6, "yyy")];
        let (out, applied) = apply_non_overlapping("0123456789", candidates);
        assert_eq!(applied.len(), 2);
        assert_eq!(out, "xxxyyy6789");
        // Reported in text order despite reverse application.
        assert!(applied[0].start < applied[1].start);
    }

    #[test]
    fn urls_are_protected() {
        let editor = SurgicalEditor::new(EditMode::Moderate);
        let text = "the karma page is at https://example.com/krishna today";
        let outcome = editor.edit(text);
        assert!(outcome.success);
        assert!(outcome.edits.is_empty());
        assert_eq!(outcome.text, text);
    }

    #[test]
    fn timestamps_are_protected() {
        let editor = SurgicalEditor::new(EditMode::Moderate);
        let text = "at 00:01:23 the word krishna appears";
        let outcome = editor.edit(text);
        // "krishna" is clear of the timestamp window, so it is edited;
        // the timestamp itself is untouched.
        assert!(outcome.text.contains("00:01:23"));
        assert!(outcome.text.contains("Kṛṣṇa"));
    }

    #[test]
    fn divine_name_corrected_away_from_protected_regions() {
        let editor = SurgicalEditor::new(EditMode::Moderate);
        let outcome = editor.edit("the story of krishna is told, see verse 16 later");
        assert_eq!(outcome.edits.len(), 1);
        assert!(outcome.text.contains("Kṛṣṇa"));
        assert!(outcome.text.contains("verse 16"));
        assert!(outcome.confidence > 0.8);
    }

    #[test]
    fn prefix_is_preserved() {
        let editor = SurgicalEditor::new(EditMode::Moderate);
        let outcome = editor.edit("a passage from the shrimad bhagavad geeta itself");
        assert_eq!(outcome.edits.len(), 1);
        assert_eq!(outcome.text, "a passage from the shrimad Bhagavad Gītā itself");
    }

    #[test]
    fn transform_rules_preserve_captures() {
        let editor = SurgicalEditor::new(EditMode::Aggressive);
        let outcome = editor.edit("the shloka 12 of dharma talks about om");
        assert!(outcome.text.contains("śloka 12"));
    }

    #[test]
    fn noop_replacements_are_skipped() {
        let editor = SurgicalEditor::new(EditMode::Moderate);
        // Already canonical: the title rule would produce identical text.
        let outcome = editor.edit("the Bhagavad Gītā is read aloud with om chanting");
        assert!(outcome
            .edits
            .iter()
            .all(|e| e.original != e.replacement));
    }

    #[test]
    fn large_rewrites_are_penalized() {
        let edits = vec![SurgicalEdit {
            kind: EditKind::Replace,
            start: 0,
            end: 8,
            original: "x".repeat(8),
            replacement: "y".repeat(8),
            confidence: 1.0,
            reason: "test",
        }];
        // 8 of 10 bytes changed: above the large-span ratio.
        assert!((adjusted_confidence(&edits, 10) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn small_precise_edits_are_rewarded() {
        let edits = vec![SurgicalEdit {
            kind: EditKind::Replace,
            start: 0,
            end: 2,
            original: "xx".to_string(),
            replacement: "yy".to_string(),
            confidence: 0.8,
            reason: "test",
        }];
        // 2 of 100 bytes changed: below the small-span ratio.
        assert!((adjusted_confidence(&edits, 100) - 0.88).abs() < 1e-6);
    }
}
