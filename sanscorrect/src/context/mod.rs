//! Segment context classification.
//!
//! The pipeline only needs the contract in [`ContextDetector`]: a label
//! in {english, sanskrit, mixed} plus a confidence in `0..=1`. A
//! workable default heuristic is provided as [`HeuristicDetector`];
//! callers with a better classifier plug their own in.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{ENGLISH_CONFIDENCE_THRESHOLD, IAST_DIACRITICS};

/// Classification of a segment's dominant language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    /// English narrative with no Sanskrit evidence.
    English,
    /// Sanskrit content, transliterated or in Devanagari.
    Sanskrit,
    /// English structure around Sanskrit terms.
    Mixed,
}

/// Result of classifying one segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextResult {
    /// The detected label.
    pub context_type: ContextType,
    /// Confidence in the label, clamped to `0..=1`.
    pub confidence: f32,
}

impl ContextResult {
    /// Creates a result, clamping the confidence into range.
    pub fn new(context_type: ContextType, confidence: f32) -> ContextResult {
        ContextResult {
            context_type,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Contract consumed by the orchestrator.
pub trait ContextDetector: Send + Sync {
    /// Classifies raw segment text.
    fn detect(&self, text: &str) -> ContextResult;
}

static ENGLISH_FUNCTION_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:the|is|are|was|were|and|of|to|in|that|this|it|for|with|as|at|on|by|from|have|has|will|would|about)\b",
    )
    .unwrap()
});

static SANSKRIT_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:namaste|svaha|swaha|iti|atha|evam|tat|sat|aum)\b").unwrap()
});

/// Returns true when the text carries an IAST diacritic or Devanagari.
pub fn has_sanskrit_script(text: &str) -> bool {
    text.chars()
        .any(|c| IAST_DIACRITICS.contains(c) || ('\u{0900}'..='\u{097F}').contains(&c))
}

/// Default rule-based detector.
///
/// Counts English function words against Sanskrit evidence (marker words,
/// IAST diacritics, Devanagari codepoints) and labels by dominance. Text
/// with no evidence either way is weakly-confident English, which the
/// ASR policy will downgrade to mixed.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicDetector;

impl ContextDetector for HeuristicDetector {
    fn detect(&self, text: &str) -> ContextResult {
        let english = ENGLISH_FUNCTION_WORDS.find_iter(text).count();
        let sanskrit = SANSKRIT_MARKERS.find_iter(text).count()
            + text
                .chars()
                .filter(|c| {
                    IAST_DIACRITICS.contains(*c) || ('\u{0900}'..='\u{097F}').contains(c)
                })
                .count();

        match (english, sanskrit) {
            (0, 0) => ContextResult::new(ContextType::English, 0.5),
            (e, 0) => ContextResult::new(ContextType::English, 0.6 + 0.05 * e.min(7) as f32),
            (0, s) => ContextResult::new(ContextType::Sanskrit, 0.6 + 0.05 * s.min(7) as f32),
            (e, s) => {
                let dominant = e.max(s) as f32 / (e + s) as f32;
                ContextResult::new(ContextType::Mixed, dominant)
            }
        }
    }
}

/// Confidence-override policy for the aggressive/ASR pipeline variant.
///
/// Wraps any base detector result: a weakly-confident `english`
/// classification is demoted to `mixed` so that it cannot suppress
/// correction of genuinely Sanskrit-containing text.
#[derive(Clone, Copy, Debug)]
pub struct AsrPolicy {
    threshold: f32,
}

impl AsrPolicy {
    /// Creates a policy with the given demotion threshold.
    pub const fn new(threshold: f32) -> AsrPolicy {
        AsrPolicy { threshold }
    }

    /// Creates a policy with the default threshold of 0.8.
    pub const fn default() -> AsrPolicy {
        AsrPolicy::new(ENGLISH_CONFIDENCE_THRESHOLD)
    }

    /// Applies the demotion rule to a detector result.
    pub fn apply(&self, result: ContextResult) -> ContextResult {
        if result.context_type == ContextType::English && result.confidence < self.threshold {
            log::debug!(
                "demoting english context (confidence {:.2} < {:.2}) to mixed",
                result.confidence,
                self.threshold
            );
            ContextResult::new(ContextType::Mixed, result.confidence)
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_english_is_english() {
        let r = HeuristicDetector.detect("the quick brown fox jumps over the lazy dog");
        assert_eq!(r.context_type, ContextType::English);
        assert!(r.confidence >= 0.6);
    }

    #[test]
    fn diacritics_are_sanskrit_evidence() {
        let r = HeuristicDetector.detect("śāntiḥ śāntiḥ śāntiḥ");
        assert_eq!(r.context_type, ContextType::Sanskrit);
    }

    #[test]
    fn function_words_around_diacritics_are_mixed() {
        let r = HeuristicDetector.detect("the meaning of śānti is peace");
        assert_eq!(r.context_type, ContextType::Mixed);
    }

    #[test]
    fn empty_text_is_weak_english() {
        let r = HeuristicDetector.detect("");
        assert_eq!(r.context_type, ContextType::English);
        assert!(r.confidence < ENGLISH_CONFIDENCE_THRESHOLD);
    }

    #[test]
    fn confidence_is_clamped() {
        let r = ContextResult::new(ContextType::Mixed, 1.7);
        assert_eq!(r.confidence, 1.0);
        let r = ContextResult::new(ContextType::Mixed, -0.2);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn asr_policy_demotes_weak_english() {
        let policy = AsrPolicy::default();
        let weak = ContextResult::new(ContextType::English, 0.7);
        assert_eq!(policy.apply(weak).context_type, ContextType::Mixed);
        assert_eq!(policy.apply(weak).confidence, 0.7);
    }

    #[test]
    fn asr_policy_keeps_confident_english() {
        let policy = AsrPolicy::default();
        let strong = ContextResult::new(ContextType::English, 0.9);
        assert_eq!(policy.apply(strong).context_type, ContextType::English);
    }

    #[test]
    fn asr_policy_never_touches_sanskrit() {
        let policy = AsrPolicy::default();
        let r = ContextResult::new(ContextType::Sanskrit, 0.1);
        assert_eq!(policy.apply(r), r);
    }
}
