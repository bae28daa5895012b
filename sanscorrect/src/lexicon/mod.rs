//! Lexicon store, whitelist matching and lexicon-driven substitution.
//!
//! The store maps ASR surface forms (and variant misspellings) to their
//! corrected IAST terms. Sources are JSON files shaped as
//! `{"entries": [{"original": ..., "corrected": ..., "proper_noun": ...}]}`
//! where `corrected` is either one string or a list of acceptable
//! variants. Loading is fail-open: a missing or corrupt source degrades
//! to a smaller lexicon with a logged warning, never an abort.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::tokenizer::case_handling::lower_case;

/// Corrected form of a lexicon entry.
///
/// A list holds acceptable variants; substitution always takes the first
/// one (first-variant-wins, deliberately not best-match).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Correction {
    /// A single corrected form.
    One(SmolStr),
    /// Acceptable variant corrected forms, in priority order.
    Variants(Vec<SmolStr>),
}

impl Correction {
    /// The form substituted into text: the single value, or the first
    /// variant for lists.
    pub fn primary(&self) -> Option<&str> {
        match self {
            Correction::One(s) => Some(s),
            Correction::Variants(vs) => vs.first().map(|s| s.as_str()),
        }
    }
}

/// One surface-form-to-correction mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// The surface form as produced by ASR.
    pub original: String,
    /// The corrected form(s).
    pub corrected: Correction,
    /// Marks proper nouns (deity names, titles).
    #[serde(default)]
    pub proper_noun: bool,
}

#[derive(Deserialize)]
struct LexiconFile {
    entries: Vec<LexiconEntry>,
}

/// Errors surfaced while loading lexicon sources.
///
/// These never abort initialization; callers log and continue.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// The source file could not be read.
    #[error("failed to read lexicon source {path}: {source}")]
    Io {
        /// Path of the failing source.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The source file was not valid lexicon JSON.
    #[error("failed to parse lexicon source {path}: {source}")]
    Parse {
        /// Path of the failing source.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// A key appeared twice within one source.
    #[error("duplicate lexicon key {key:?} (nearest existing key {nearest:?})")]
    Duplicate {
        /// The case-folded duplicate key.
        key: String,
        /// The most similar existing key, for diagnostics.
        nearest: Option<String>,
    },
}

/// Mapping from case-folded surface forms to corrections.
///
/// Iteration order is pinned to insertion order so that substitution
/// rules behave deterministically across reloads.
#[derive(Clone, Debug, Default)]
pub struct LexiconStore {
    entries: HashMap<SmolStr, LexiconEntry>,
    order: Vec<SmolStr>,
}

impl LexiconStore {
    /// Creates an empty store.
    pub fn new() -> LexiconStore {
        LexiconStore::default()
    }

    /// Loads zero or more JSON sources, skipping any that fail.
    pub fn from_sources<P: AsRef<Path>>(paths: &[P]) -> LexiconStore {
        let mut store = LexiconStore::new();
        for path in paths {
            match store.load_source(path.as_ref()) {
                Ok(n) => log::debug!("loaded {} lexicon entries from {:?}", n, path.as_ref()),
                Err(e) => log::warn!("skipping lexicon source: {}", e),
            }
        }
        store
    }

    /// Loads one JSON source, returning how many entries were added.
    ///
    /// Duplicate keys within the source are skipped with a warning;
    /// keys already present from earlier sources are overridden.
    pub fn load_source(&mut self, path: &Path) -> Result<usize, LexiconError> {
        let data = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: LexiconFile =
            serde_json::from_str(&data).map_err(|source| LexiconError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut seen: HashMap<SmolStr, ()> = HashMap::new();
        let mut added = 0;
        for entry in file.entries {
            let key = lower_case(&entry.original);
            if seen.contains_key(&key) {
                let err = LexiconError::Duplicate {
                    key: key.to_string(),
                    nearest: self.nearest_key(&key),
                };
                log::warn!("{} in {:?}, keeping first", err, path);
                continue;
            }
            seen.insert(key.clone(), ());
            self.insert(entry);
            added += 1;
        }
        Ok(added)
    }

    /// Inserts an entry, case-folding the key. Later inserts override.
    pub fn insert(&mut self, entry: LexiconEntry) {
        let key = lower_case(&entry.original);
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push(key);
        }
    }

    /// Case-insensitive lookup of a surface form.
    pub fn lookup(&self, term: &str) -> Option<&Correction> {
        self.entries.get(&lower_case(term)).map(|e| &e.corrected)
    }

    /// Case-sensitive lookup: the key must already be case-folded.
    pub fn lookup_exact(&self, term: &str) -> Option<&Correction> {
        self.entries
            .get(&SmolStr::new(term))
            .map(|e| &e.corrected)
    }

    /// Iterates entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &LexiconEntry> + '_ {
        self.order.iter().filter_map(move |k| self.entries.get(k))
    }

    /// Iterates case-folded keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(|k| k.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn nearest_key(&self, key: &str) -> Option<String> {
        self.order
            .iter()
            .filter(|k| k.as_str() != key)
            .max_by(|a, b| {
                strsim::jaro_winkler(a, key)
                    .partial_cmp(&strsim::jaro_winkler(b, key))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|k| k.to_string())
    }
}

/// Known ASR misrecognitions that always count as Sanskrit evidence,
/// even when absent from the loaded lexicon sources.
static SUPPLEMENTARY_ASR_TERMS: &[&str] = &[
    "krishna", "christna", "arjuna", "dharma", "karma", "gita", "geeta", "yoga", "mantra",
    "shloka", "sloka", "moksha", "atman", "brahman", "vedanta", "upanishad", "shanti",
    "chakram", "pranayama", "samadhi", "guru", "ashram", "bhakti", "jnana", "gyana",
];

static WORD_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w").unwrap());

/// Word-boundary whitelist matcher, compiled once at initialization.
///
/// A hit on any whitelisted Sanskrit surface form overrides an `english`
/// context classification: the segment is treated as Sanskrit and
/// corrected aggressively.
#[derive(Debug)]
pub struct WhitelistMatcher {
    set: RegexSet,
    terms: Vec<SmolStr>,
}

impl WhitelistMatcher {
    /// Builds the matcher from lexicon keys plus the supplementary
    /// misrecognition set. Terms present in both are deduplicated so a
    /// hit is reported once.
    pub fn new(store: &LexiconStore) -> WhitelistMatcher {
        let terms = store
            .keys()
            .chain(SUPPLEMENTARY_ASR_TERMS.iter().copied())
            .map(SmolStr::new)
            .unique()
            .collect::<Vec<_>>();
        WhitelistMatcher::from_terms(terms)
    }

    /// Builds the matcher from an explicit term list.
    pub fn from_terms(terms: Vec<SmolStr>) -> WhitelistMatcher {
        let terms: Vec<SmolStr> = terms
            .into_iter()
            .filter(|t| WORD_CHAR.is_match(t))
            .collect();
        let patterns: Vec<String> = terms
            .iter()
            .map(|t| format!(r"(?i)\b{}\b", regex::escape(t)))
            .collect();
        let set = match RegexSet::new(&patterns) {
            Ok(set) => set,
            Err(e) => {
                log::warn!("whitelist pattern set failed to compile: {}", e);
                RegexSet::new(Vec::<String>::new()).unwrap_or_else(|_| RegexSet::empty())
            }
        };
        WhitelistMatcher { set, terms }
    }

    /// Returns every whitelisted term present in the text.
    pub fn matches<'a>(&'a self, text: &str) -> Vec<&'a str> {
        self.set
            .matches(text)
            .iter()
            .map(|i| self.terms[i].as_str())
            .collect()
    }

    /// Returns true when any whitelisted term is present.
    pub fn has_match(&self, text: &str) -> bool {
        self.set.is_match(text)
    }
}

struct LexiconRule {
    original: SmolStr,
    pattern: Regex,
    replacement: SmolStr,
}

/// Lexicon substitution pass with precompiled word-boundary patterns.
///
/// Each applied rule counts as exactly one correction event regardless
/// of how many occurrences it replaced; metric parity with the counting
/// granularity of the rest of the pipeline depends on this.
pub struct LexiconCorrector {
    insensitive: Vec<LexiconRule>,
    sensitive: Vec<LexiconRule>,
}

impl LexiconCorrector {
    /// Compiles the substitution rules from a store, in entry order.
    pub fn new(store: &LexiconStore) -> LexiconCorrector {
        let mut insensitive = Vec::with_capacity(store.len());
        let mut sensitive = Vec::with_capacity(store.len());
        for entry in store.entries() {
            let replacement = match entry.corrected.primary() {
                Some(r) => SmolStr::new(r),
                None => continue,
            };
            if !WORD_CHAR.is_match(&entry.original) {
                continue;
            }
            let escaped = regex::escape(&entry.original);
            match Regex::new(&format!(r"(?i)\b{}\b", escaped)) {
                Ok(pattern) => insensitive.push(LexiconRule {
                    original: SmolStr::new(&entry.original),
                    pattern,
                    replacement: replacement.clone(),
                }),
                Err(e) => log::warn!("lexicon key {:?} did not compile: {}", entry.original, e),
            }
            match Regex::new(&format!(r"\b{}\b", escaped)) {
                Ok(pattern) => sensitive.push(LexiconRule {
                    original: SmolStr::new(&entry.original),
                    pattern,
                    replacement,
                }),
                Err(e) => log::debug!("lexicon key {:?} did not compile: {}", entry.original, e),
            }
        }
        LexiconCorrector {
            insensitive,
            sensitive,
        }
    }

    /// Case-insensitive pass. Returns the new text, the number of rules
    /// applied and the list of "from → to" descriptions.
    pub fn apply(&self, text: &str) -> (String, usize, Vec<String>) {
        Self::apply_rules(&self.insensitive, text)
    }

    /// Base pass over the exact case-folded keys.
    ///
    /// Deliberately case-sensitive: [`apply`](LexiconCorrector::apply)
    /// runs first and consumes every occurrence regardless of case, so
    /// this pass only catches keys introduced between the two passes
    /// (systematic/compound rewrites). Making it insensitive as well
    /// would double-count those rules without changing the output.
    pub fn apply_exact(&self, text: &str) -> (String, usize, Vec<String>) {
        Self::apply_rules(&self.sensitive, text)
    }

    fn apply_rules(rules: &[LexiconRule], text: &str) -> (String, usize, Vec<String>) {
        let mut current = text.to_string();
        let mut applied = 0;
        let mut descriptions = Vec::new();
        for rule in rules {
            if !rule.pattern.is_match(&current) {
                continue;
            }
            let replaced = rule
                .pattern
                .replace_all(&current, rule.replacement.as_str())
                .into_owned();
            if replaced == current {
                continue;
            }
            current = replaced;
            applied += 1;
            descriptions.push(format!("{} → {}", rule.original, rule.replacement));
        }
        (current, applied, descriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn entry(original: &str, corrected: Correction) -> LexiconEntry {
        LexiconEntry {
            original: original.to_string(),
            corrected,
            proper_noun: false,
        }
    }

    fn sample_store() -> LexiconStore {
        let mut store = LexiconStore::new();
        store.insert(entry("krishna", Correction::One("Kṛṣṇa".into())));
        store.insert(entry(
            "dharma",
            Correction::Variants(vec!["dharma".into(), "dharmaḥ".into()]),
        ));
        store.insert(entry("gita", Correction::One("Gītā".into())));
        store
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let store = sample_store();
        assert!(store.lookup("KRISHNA").is_some());
        assert!(store.lookup("Krishna").is_some());
        assert!(store.lookup("krsna").is_none());
    }

    #[test]
    fn missing_source_degrades_to_empty() {
        let store = LexiconStore::from_sources(&["/no/such/lexicon.json"]);
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_source_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let good = dir.path().join("good.json");
        let mut f = std::fs::File::create(&good).unwrap();
        write!(
            f,
            r#"{{"entries":[{{"original":"yoga","corrected":"yoga"}}]}}"#
        )
        .unwrap();

        let store = LexiconStore::from_sources(&[bad, good]);
        assert_eq!(store.len(), 1);
        assert!(store.lookup("yoga").is_some());
    }

    #[test]
    fn duplicate_within_source_keeps_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.json");
        std::fs::write(
            &path,
            r#"{"entries":[
                {"original":"gita","corrected":"Gītā"},
                {"original":"GITA","corrected":"WRONG"}
            ]}"#,
        )
        .unwrap();

        let mut store = LexiconStore::new();
        let added = store.load_source(&path).unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.lookup("gita"), Some(&Correction::One("Gītā".into())));
    }

    #[test]
    fn variant_list_parses_from_json() {
        let entry: LexiconEntry =
            serde_json::from_str(r#"{"original":"dharma","corrected":["dharma","dharmaḥ"]}"#)
                .unwrap();
        assert_eq!(entry.corrected.primary(), Some("dharma"));
    }

    #[test]
    fn one_correction_event_per_rule_not_per_occurrence() {
        let corrector = LexiconCorrector::new(&sample_store());
        let (text, applied, _) = corrector.apply("krishna spoke and krishna listened");
        assert_eq!(text, "Kṛṣṇa spoke and Kṛṣṇa listened");
        assert_eq!(applied, 1);
    }

    #[test]
    fn first_variant_wins() {
        let corrector = LexiconCorrector::new(&sample_store());
        let (text, applied, _) = corrector.apply("the Dharma talk");
        // "dharma" maps to itself as first variant; the case change still
        // counts as an application.
        assert_eq!(text, "the dharma talk");
        assert_eq!(applied, 1);
    }

    #[test]
    fn exact_pass_respects_case() {
        let corrector = LexiconCorrector::new(&sample_store());
        let (text, applied, _) = corrector.apply_exact("KRISHNA");
        assert_eq!(text, "KRISHNA");
        assert_eq!(applied, 0);
        let (text, applied, _) = corrector.apply_exact("krishna");
        assert_eq!(text, "Kṛṣṇa");
        assert_eq!(applied, 1);
    }

    #[test]
    fn whitelist_matches_on_word_boundaries() {
        let wl = WhitelistMatcher::new(&LexiconStore::new());
        assert!(wl.has_match("a talk about KARMA today"));
        assert!(!wl.has_match("karmann ghia"));
        assert!(wl.matches("dharma and karma").len() >= 2);
    }

    #[test]
    fn whitelist_includes_lexicon_keys() {
        let wl = WhitelistMatcher::new(&sample_store());
        assert!(wl.has_match("reading the GITA aloud"));
        // "krishna" is both a lexicon key and a supplementary term.
        assert_eq!(wl.matches("krishna").len(), 1);
    }
}
