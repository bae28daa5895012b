//! Whole-segment prayer recognition and invocation name substitution.
//!
//! A segment that is, in its entirety, one of a fixed catalog of known
//! prayers gets wholly replaced by the canonical high-diacritic text.
//! Matching is deliberately first-acceptable-entry-wins over the catalog
//! in declaration order; the recognizer never searches for a globally
//! best score, because reference behavior depends on the priority order.
//!
//! Segments that carry an invocation without being a recognized complete
//! prayer go through a lighter sacred-name substitution pass instead.
//!
//! Both recognizers cache their outcomes keyed by a hash of the trimmed
//! input, since subtitle refrains repeat identical segments; the caches
//! are unbounded, live for the process, and expose `clear`.

pub mod catalog;

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;

use crate::context::has_sanskrit_script;
use crate::tokenizer::case_handling::{is_first_caps, lower_case, upper_first};
use crate::tokenizer::split_punctuation;
use crate::types::Confidence;

use self::catalog::{COMPILED_CATALOG, SACRED_NAMES};

/// Process-lifetime cache for recognition outcomes.
///
/// Unbounded by design (no TTL, no eviction); invalidated only by
/// process restart or an explicit [`clear`](RecognitionCache::clear).
/// Safe to share across worker threads.
#[derive(Debug, Default)]
pub struct RecognitionCache<T> {
    map: Mutex<HashMap<u64, T>>,
}

impl<T: Clone> RecognitionCache<T> {
    /// Creates an empty cache.
    pub fn new() -> RecognitionCache<T> {
        RecognitionCache {
            map: Mutex::new(HashMap::new()),
        }
    }

    /// Fetches a cached outcome.
    pub fn get(&self, key: u64) -> Option<T> {
        self.map.lock().get(&key).cloned()
    }

    /// Stores an outcome.
    pub fn insert(&self, key: u64, value: T) {
        self.map.lock().insert(key, value);
    }

    /// Drops every cached outcome.
    pub fn clear(&self) {
        self.map.lock().clear();
    }

    /// Number of cached outcomes.
    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    /// Returns true when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }
}

pub(crate) fn text_key(text: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Normalizes a segment for catalog matching: punctuation becomes single
/// spaces, whitespace collapses, everything lowercases. Diacritics are
/// kept as-is.
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    mapped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Outcome of prayer recognition for one segment.
#[derive(Clone, Debug, PartialEq)]
pub struct PrayerOutcome {
    /// Catalog entry name when a full prayer was recognized.
    pub prayer: Option<&'static str>,
    /// Output text: the canonical replacement on a match, the fallback
    /// normalization otherwise, or the input unchanged.
    pub text: String,
    /// Ratio of matched sub-patterns for the winning entry, or the best
    /// ratio seen when nothing won.
    pub confidence: Confidence,
    /// Human-readable "from → to" descriptions, in application order.
    pub corrections: Vec<String>,
    /// True when a catalog entry met its threshold.
    pub matched: bool,
}

impl PrayerOutcome {
    fn unchanged(text: &str, confidence: Confidence) -> PrayerOutcome {
        PrayerOutcome {
            prayer: None,
            text: text.to_string(),
            confidence,
            corrections: Vec::new(),
            matched: false,
        }
    }
}

static STRONG_INDICATORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:om|aum|oṃ|ohm)\b",
        r"(?i)[sś]h?[aā]nti",
        r"(?i)nama[hḥ]|namaha",
        r"(?i)sv[aā]h[aā]|swaha",
        r"(?i)\bmantra\b",
        r"(?i)hari[hḥ]? o[mṃ]",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static OM_VARIANTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:aum|ohm|om)\b").unwrap());

static TRIPLE_SHANTI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[sś]h?[aā]nti[hḥ]?(?:[ ,]+[sś]h?[aā]nti[hḥ]?){2}").unwrap()
});

static CLOSING_SHANTI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[sś]h?[aā]nti[hḥ]?[.!]?\s*$").unwrap());

fn looks_prayer_like(normalized: &str) -> bool {
    let hits = STRONG_INDICATORS
        .iter()
        .filter(|re| re.is_match(normalized))
        .count();
    (hits >= 1 && has_sanskrit_script(normalized)) || hits >= 2
}

/// Recognizes whole-segment prayers against the static catalog.
pub struct PrayerRecognizer {
    cache: Arc<RecognitionCache<PrayerOutcome>>,
    threshold_override: Option<Confidence>,
}

impl PrayerRecognizer {
    /// Creates a recognizer using each entry's own threshold.
    pub fn new() -> PrayerRecognizer {
        PrayerRecognizer::with_cache(Arc::new(RecognitionCache::new()))
    }

    /// Creates a recognizer with an injected cache.
    pub fn with_cache(cache: Arc<RecognitionCache<PrayerOutcome>>) -> PrayerRecognizer {
        PrayerRecognizer {
            cache,
            threshold_override: None,
        }
    }

    /// Lowers the acceptance threshold: an entry wins once its ratio
    /// reaches the minimum of its own threshold and this value. Used by
    /// the aggressive pipeline (0.6).
    pub fn with_threshold(mut self, threshold: Confidence) -> PrayerRecognizer {
        self.threshold_override = Some(threshold);
        self
    }

    /// The outcome cache, for inspection and reset in callers/tests.
    pub fn cache(&self) -> &Arc<RecognitionCache<PrayerOutcome>> {
        &self.cache
    }

    /// Recognizes a segment. See the module docs for the policy.
    pub fn recognize(&self, text: &str) -> PrayerOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return PrayerOutcome::unchanged(text, 0.0);
        }

        let key = text_key(trimmed);
        if let Some(cached) = self.cache.get(key) {
            log::trace!("prayer cache hit for segment of {} bytes", trimmed.len());
            return cached;
        }

        let normalized = normalize(trimmed);
        let mut best_ratio: Confidence = 0.0;
        let mut outcome = None;

        for compiled in COMPILED_CATALOG.iter() {
            let matched = compiled
                .regexes
                .iter()
                .filter(|re| re.is_match(&normalized))
                .count();
            if matched == 0 {
                continue;
            }
            let ratio = matched as Confidence / compiled.total as Confidence;
            best_ratio = best_ratio.max(ratio);

            let threshold = match self.threshold_override {
                Some(t) => t.min(compiled.entry.threshold),
                None => compiled.entry.threshold,
            };
            if ratio >= threshold {
                let canonical = compiled.entry.canonical;
                let corrections = if trimmed != canonical {
                    vec![format!("{} → {}", trimmed, canonical)]
                } else {
                    Vec::new()
                };
                log::debug!(
                    "recognized prayer {} at {:.2} (threshold {:.2})",
                    compiled.entry.name,
                    ratio,
                    threshold
                );
                outcome = Some(PrayerOutcome {
                    prayer: Some(compiled.entry.name),
                    text: canonical.to_string(),
                    confidence: ratio,
                    corrections,
                    matched: true,
                });
                // First acceptable entry wins; later entries are never
                // consulted even if they would score higher.
                break;
            }
        }

        let outcome = outcome.unwrap_or_else(|| {
            if looks_prayer_like(&normalized) {
                self.fallback_normalize(trimmed, best_ratio)
            } else {
                PrayerOutcome::unchanged(trimmed, best_ratio)
            }
        });

        self.cache.insert(key, outcome.clone());
        outcome
    }

    /// Best-effort spacing/punctuation normalization for prayer-like
    /// segments that matched no catalog entry. Never asserts a canonical
    /// full replacement.
    fn fallback_normalize(&self, text: &str, best_ratio: Confidence) -> PrayerOutcome {
        let mut corrections = Vec::new();
        let mut current = text.to_string();

        let standardized = OM_VARIANTS.replace_all(&current, "Om").into_owned();
        if standardized != current {
            corrections.push("om-variant → Om".to_string());
            current = standardized;
        }

        let shanti = TRIPLE_SHANTI
            .replace_all(&current, "śāntiḥ śāntiḥ śāntiḥ")
            .into_owned();
        if shanti != current {
            corrections.push("peace-mantra repetition → śāntiḥ śāntiḥ śāntiḥ".to_string());
            current = shanti;
        }

        if CLOSING_SHANTI.is_match(&current) && !current.contains('॥') {
            current = format!("{} ॥", current.trim_end());
            corrections.push("closing peace mantra → appended ॥".to_string());
        }

        PrayerOutcome {
            prayer: None,
            text: current,
            confidence: best_ratio,
            corrections,
            matched: false,
        }
    }
}

impl Default for PrayerRecognizer {
    fn default() -> Self {
        PrayerRecognizer::new()
    }
}

/// Outcome of the invocation name-substitution pass.
#[derive(Clone, Debug, PartialEq)]
pub struct InvocationOutcome {
    /// True when the segment was identified as an invocation.
    pub invocation: bool,
    /// Output text; the input unchanged for non-invocations.
    pub text: String,
    /// "from → to" descriptions for each substituted token.
    pub corrections: Vec<String>,
}

static OM_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:om|aum|ohm|oṃ)\b").unwrap());

static SACRED_NAME_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SACRED_NAMES.iter().copied().collect());

/// Substitutes sacred names in invocation segments.
///
/// Tokenizes on whitespace, strips surrounding punctuation per token,
/// case-folds, looks the core up in the sacred-name table and swaps in
/// the diacritic-correct form, preserving the token's punctuation and
/// leading capitalization. Standalone om-variants always become `Om`.
pub struct InvocationRecognizer {
    cache: Arc<RecognitionCache<InvocationOutcome>>,
}

impl InvocationRecognizer {
    /// Creates a recognizer with its own cache.
    pub fn new() -> InvocationRecognizer {
        InvocationRecognizer::with_cache(Arc::new(RecognitionCache::new()))
    }

    /// Creates a recognizer with an injected cache.
    pub fn with_cache(cache: Arc<RecognitionCache<InvocationOutcome>>) -> InvocationRecognizer {
        InvocationRecognizer { cache }
    }

    /// The outcome cache.
    pub fn cache(&self) -> &Arc<RecognitionCache<InvocationOutcome>> {
        &self.cache
    }

    /// Runs the pass over one segment.
    pub fn recognize(&self, text: &str) -> InvocationOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return InvocationOutcome {
                invocation: false,
                text: text.to_string(),
                corrections: Vec::new(),
            };
        }

        let key = text_key(trimmed);
        if let Some(cached) = self.cache.get(key) {
            return cached;
        }

        let om_present = OM_TOKEN.is_match(trimmed);
        let name_present = trimmed.split_whitespace().any(|token| {
            let (_, core, _) = split_punctuation(token);
            SACRED_NAME_MAP.contains_key(lower_case(core).as_str())
        });

        let outcome = if om_present && name_present {
            let mut corrections = Vec::new();
            let rebuilt = trimmed
                .split_whitespace()
                .map(|token| {
                    let (pre, core, post) = split_punctuation(token);
                    let folded = lower_case(core);
                    let replacement = if matches!(folded.as_str(), "om" | "aum" | "ohm" | "oṃ") {
                        // The om capitalization convention is absolute.
                        "Om".to_string()
                    } else if let Some(fixed) = SACRED_NAME_MAP.get(folded.as_str()) {
                        if is_first_caps(core) {
                            upper_first(fixed).to_string()
                        } else {
                            (*fixed).to_string()
                        }
                    } else {
                        core.to_string()
                    };
                    if replacement != core {
                        corrections.push(format!("{} → {}", core, replacement));
                    }
                    format!("{}{}{}", pre, replacement, post)
                })
                .collect::<Vec<_>>()
                .join(" ");
            InvocationOutcome {
                invocation: true,
                text: rebuilt,
                corrections,
            }
        } else {
            InvocationOutcome {
                invocation: false,
                text: trimmed.to_string(),
                corrections: Vec::new(),
            }
        };

        self.cache.insert(key, outcome.clone());
        outcome
    }
}

impl Default for InvocationRecognizer {
    fn default() -> Self {
        InvocationRecognizer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_sarve_bhavantu() {
        let recognizer = PrayerRecognizer::new();
        let outcome = recognizer.recognize("om sarve bhavantu sukhinaḥ sarve santu nirāmayāḥ");
        assert_eq!(outcome.prayer, Some("sarve_bhavantu"));
        assert!(outcome.matched);
        assert!(outcome.confidence >= 0.6);
        assert_eq!(
            outcome.text,
            "oṃ sarve bhavantu sukhinaḥ\nsarve santu nirāmayāḥ\nsarve bhadrāṇi paśyantu\nmā kaścid duḥkhabhāg bhavet\noṃ śāntiḥ śāntiḥ śāntiḥ"
        );
    }

    #[test]
    fn canonical_text_round_trips() {
        let recognizer = PrayerRecognizer::new();
        for compiled in COMPILED_CATALOG.iter() {
            let outcome = recognizer.recognize(compiled.entry.canonical);
            assert_eq!(
                outcome.prayer,
                Some(compiled.entry.name),
                "canonical text of {} no longer recognized as itself",
                compiled.entry.name
            );
            assert!(outcome.confidence >= compiled.entry.threshold);
        }
    }

    #[test]
    fn first_acceptable_entry_wins_over_better_scores() {
        // Two gayatri patterns (ratio 0.5, at threshold) plus two
        // sarve_bhavantu patterns (ratio 0.67, above threshold): the
        // earlier catalog entry must win.
        let recognizer = PrayerRecognizer::new();
        let outcome = recognizer.recognize(
            "tat savitur varenyam bhargo devasya dhimahi \
             sarve bhavantu sukhina sarve santu niramaya",
        );
        assert_eq!(outcome.prayer, Some("gayatri"));
    }

    #[test]
    fn threshold_override_lowers_acceptance() {
        let strict = PrayerRecognizer::new();
        // One of three sarve patterns: 0.33 misses the 0.6 threshold.
        let partial = "sarve bhavantu sukhina to all of you";
        assert!(!strict.recognize(partial).matched);

        let lenient = PrayerRecognizer::new().with_threshold(0.3);
        assert!(lenient.recognize(partial).matched);
    }

    #[test]
    fn fallback_normalizes_prayer_like_segments() {
        let recognizer = PrayerRecognizer::new();
        let outcome = recognizer.recognize("aum shanti shanti shanti");
        assert!(!outcome.matched);
        assert_eq!(outcome.prayer, None);
        assert!(outcome.text.starts_with("Om"));
        assert!(outcome.text.contains("śāntiḥ śāntiḥ śāntiḥ"));
        assert!(outcome.text.ends_with('॥'));
        assert!(outcome.corrections.len() >= 2);
    }

    #[test]
    fn plain_english_is_left_alone() {
        let recognizer = PrayerRecognizer::new();
        let outcome = recognizer.recognize("the meeting starts at nine");
        assert!(!outcome.matched);
        assert_eq!(outcome.text, "the meeting starts at nine");
        assert!(outcome.corrections.is_empty());
    }

    #[test]
    fn outcomes_are_cached_and_clearable() {
        let recognizer = PrayerRecognizer::new();
        recognizer.recognize("om sarve bhavantu sukhinaḥ sarve santu nirāmayāḥ");
        recognizer.recognize("om sarve bhavantu sukhinaḥ sarve santu nirāmayāḥ");
        assert_eq!(recognizer.cache().len(), 1);
        recognizer.cache().clear();
        assert!(recognizer.cache().is_empty());
    }

    #[test]
    fn guru_mantra_name_substitution() {
        let recognizer = InvocationRecognizer::new();
        let outcome = recognizer.recognize("Om Gurave Namaha");
        assert!(outcome.invocation);
        assert_eq!(outcome.text, "Om Gurave Namaḥ");
        assert_eq!(outcome.corrections, vec!["Namaha → Namaḥ".to_string()]);
    }

    #[test]
    fn invocation_preserves_punctuation() {
        let recognizer = InvocationRecognizer::new();
        let outcome = recognizer.recognize("om namah shivaya!");
        assert!(outcome.invocation);
        assert_eq!(outcome.text, "Om namaḥ śivāya!");
    }

    #[test]
    fn non_invocations_pass_through() {
        let recognizer = InvocationRecognizer::new();
        let outcome = recognizer.recognize("the gurave concept appears here");
        assert!(!outcome.invocation);
        assert_eq!(outcome.text, "the gurave concept appears here");
    }

    #[test]
    fn normalize_collapses_punctuation_and_case() {
        assert_eq!(
            normalize("  Oṃ -- Śāntiḥ!!  (Śāntiḥ)   "),
            "oṃ śāntiḥ śāntiḥ"
        );
    }
}
