//! Data-driven edit rules and protected-region patterns.
//!
//! Each rule is a literal pattern/replacement pair (or a transform over
//! the regex captures) with a static confidence; the table can grow
//! without touching editor control flow.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::surgical::EditKind;
use crate::types::Confidence;

pub(crate) enum Replacer {
    Literal(&'static str),
    Transform(fn(&Captures) -> String),
}

pub(crate) struct EditRule {
    pub pattern: &'static str,
    pub replacer: Replacer,
    pub kind: EditKind,
    pub confidence: Confidence,
    /// When set, capture group 1 is left untouched and the edit span
    /// starts after it.
    pub preserve_prefix: bool,
    pub reason: &'static str,
}

fn upanishad_plural(caps: &Captures) -> String {
    if caps[0].to_lowercase().ends_with('s') {
        "Upaniṣads".to_string()
    } else {
        "Upaniṣad".to_string()
    }
}

fn shloka_number(caps: &Captures) -> String {
    format!("śloka {}", &caps[1])
}

pub(crate) static EDIT_RULES: &[EditRule] = &[
    EditRule {
        pattern: r"(?i)evam pravartitam chakram(?: nanuvartayati\w*(?: ?iha)?(?: yah?)?)?",
        replacer: Replacer::Literal("evaṃ pravartitaṃ cakraṃ nānuvartayatīha yaḥ"),
        kind: EditKind::Replace,
        confidence: 0.95,
        preserve_prefix: false,
        reason: "gita-3.16-verse",
    },
    EditRule {
        pattern: r"(?i)\b(s[hr]?rimad[- ])?bhagavad[- ]?g[ei]+ta\b",
        replacer: Replacer::Literal("Bhagavad Gītā"),
        kind: EditKind::Replace,
        confidence: 0.9,
        preserve_prefix: true,
        reason: "scripture-title",
    },
    EditRule {
        pattern: r"(?i)\bupanishads?\b",
        replacer: Replacer::Transform(upanishad_plural),
        kind: EditKind::Transform,
        confidence: 0.9,
        preserve_prefix: false,
        reason: "scripture-title",
    },
    EditRule {
        pattern: r"(?i)\bdh?ritarashtra\b",
        replacer: Replacer::Literal("Dhṛtarāṣṭra"),
        kind: EditKind::Replace,
        confidence: 0.9,
        preserve_prefix: false,
        reason: "proper-name",
    },
    EditRule {
        pattern: r"(?i)\bpatanjali\b",
        replacer: Replacer::Literal("Patañjali"),
        kind: EditKind::Replace,
        confidence: 0.9,
        preserve_prefix: false,
        reason: "proper-name",
    },
    EditRule {
        pattern: r"(?i)\bom namah? shivaya\b",
        replacer: Replacer::Literal("Om Namaḥ Śivāya"),
        kind: EditKind::Replace,
        confidence: 0.9,
        preserve_prefix: false,
        reason: "mantra",
    },
    EditRule {
        pattern: r"(?i)\bkrishna\b",
        replacer: Replacer::Literal("Kṛṣṇa"),
        kind: EditKind::Replace,
        confidence: 0.85,
        preserve_prefix: false,
        reason: "divine-name",
    },
    EditRule {
        pattern: r"(?i)\b(?:gyana|jnana) yoga\b",
        replacer: Replacer::Literal("jñāna yoga"),
        kind: EditKind::Replace,
        confidence: 0.85,
        preserve_prefix: false,
        reason: "yoga-term",
    },
    EditRule {
        pattern: r"(?i)\bshloka (\d+)\b",
        replacer: Replacer::Transform(shloka_number),
        kind: EditKind::Transform,
        confidence: 0.8,
        preserve_prefix: false,
        reason: "verse-marker",
    },
];

pub(crate) static COMPILED_RULES: Lazy<Vec<Option<Regex>>> = Lazy::new(|| {
    EDIT_RULES
        .iter()
        .map(|rule| match Regex::new(rule.pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("edit rule {:?} skipped: {}", rule.reason, e);
                None
            }
        })
        .collect()
});

/// Regions that must never be touched by a surgical edit: URLs, emails,
/// timestamps, subtitle markers, list markers, chapter/verse references
/// and two-capitalized-word proper-name pairs.
pub(crate) static PROTECTED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"https?://\S+|www\.\S+",
        r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b",
        r"\b\d{1,2}:\d{2}:\d{2}(?:[,.]\d{1,3})?\b",
        r"-->",
        r"(?m)^\s*\d+[.)]\s",
        r"(?i)\bchapter\s+\d+\b",
        r"(?i)\bverse\s+\d+\b",
        r"\b\p{Lu}\p{Ll}+\s+\p{Lu}\p{Ll}+\b",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});
