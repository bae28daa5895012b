//! Static catalog of known prayers and mantras.
//!
//! Declaration order is priority order: the recognizer takes the first
//! entry whose confidence meets its threshold, not the best-scoring one.
//! Patterns are written against normalized text (lowercased, punctuation
//! collapsed to single spaces) and tolerate both plain-ASCII ASR output
//! and already-diacritized IAST.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Confidence;

/// One catalog entry: a named canonical sacred text with its accepted
/// corrected form and confidence threshold.
pub struct CatalogEntry {
    /// Stable identifier, e.g. `sarve_bhavantu`.
    pub name: &'static str,
    /// Ordered regex sub-patterns matched against normalized text.
    pub patterns: &'static [&'static str],
    /// Canonical high-diacritic replacement text.
    pub canonical: &'static str,
    /// Minimum ratio of matched sub-patterns for this entry to win.
    pub threshold: Confidence,
    /// Human-readable translation.
    pub translation: &'static str,
}

/// The prayer catalog, in priority order.
pub static PRAYER_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "gayatri",
        patterns: &[
            r"bh[uū]r bhuva[hḥ]? sva",
            r"tat savitur vare[nṇ]ya[mṃ]",
            r"bhargo devasya dh[iī]mahi",
            r"dhiyo yo na[hḥ]? pracoday[aā]t",
        ],
        canonical: "oṃ bhūr bhuvaḥ svaḥ\ntat savitur vareṇyaṃ\nbhargo devasya dhīmahi\ndhiyo yo naḥ pracodayāt",
        threshold: 0.5,
        translation: "We meditate on the radiance of the divine; may it inspire our minds.",
    },
    CatalogEntry {
        name: "mahamrityunjaya",
        patterns: &[
            r"tr[iy]?ambaka[mṃ] yaj[aā]mahe",
            r"sugandhi[mṃ] pu[sṣ][tṭ]i ?vardhana[mṃ]",
            r"urv[aā]ruka[mṃ] ?iva bandhan[aā]n",
            r"m[rṛ]tyor muk[sṣ][iī]ya m[aā] ?m[rṛ]t[aā]t",
        ],
        canonical: "oṃ tryambakaṃ yajāmahe sugandhiṃ puṣṭivardhanam\nurvārukam iva bandhanān mṛtyor mukṣīya māmṛtāt",
        threshold: 0.5,
        translation: "We worship the three-eyed one; may he free us from death, not from immortality.",
    },
    CatalogEntry {
        name: "sarve_bhavantu",
        patterns: &[
            r"sarve bhavantu sukhina",
            r"sarve santu nir[aā]may",
            r"sarve bhadr[aā][nṇ]i pa[sś]yantu",
        ],
        canonical: "oṃ sarve bhavantu sukhinaḥ\nsarve santu nirāmayāḥ\nsarve bhadrāṇi paśyantu\nmā kaścid duḥkhabhāg bhavet\noṃ śāntiḥ śāntiḥ śāntiḥ",
        threshold: 0.6,
        translation: "May all be happy, may all be free from illness, may all see what is auspicious.",
    },
    CatalogEntry {
        name: "asato_ma",
        patterns: &[
            r"asato m[aā] sad ?gamaya",
            r"tamaso m[aā] jyotir ?gamaya",
            r"m[rṛ]tyor m[aā] am[rṛ]ta[mṃ] ?gamaya",
        ],
        canonical: "oṃ asato mā sad gamaya\ntamaso mā jyotir gamaya\nmṛtyor mā amṛtaṃ gamaya\noṃ śāntiḥ śāntiḥ śāntiḥ",
        threshold: 0.5,
        translation: "Lead me from the unreal to the real, from darkness to light, from death to immortality.",
    },
    CatalogEntry {
        name: "purnamadah",
        patterns: &[
            r"p[uū]r[nṇ]amada[hḥ]? p[uū]r[nṇ]amida[mṃ]",
            r"p[uū]r[nṇ][aā]t p[uū]r[nṇ]am ?udacyate",
            r"p[uū]r[nṇ]asya p[uū]r[nṇ]am [aā]d[aā]ya",
        ],
        canonical: "oṃ pūrṇamadaḥ pūrṇamidaṃ pūrṇāt pūrṇam udacyate\npūrṇasya pūrṇam ādāya pūrṇam evāvaśiṣyate\noṃ śāntiḥ śāntiḥ śāntiḥ",
        threshold: 0.5,
        translation: "That is whole, this is whole; from the whole, the whole arises.",
    },
    CatalogEntry {
        name: "saha_navavatu",
        patterns: &[
            r"saha n[aā]v ?avatu",
            r"saha nau bhunaktu",
            r"saha v[iī]rya[mṃ] karav[aā]vahai",
            r"m[aā] vidvi[sṣ][aā]vahai",
        ],
        canonical: "oṃ saha nāv avatu\nsaha nau bhunaktu\nsaha vīryaṃ karavāvahai\ntejasvi nāv adhītam astu\nmā vidviṣāvahai\noṃ śāntiḥ śāntiḥ śāntiḥ",
        threshold: 0.5,
        translation: "May we be protected together, may we be nourished together, may our study be brilliant.",
    },
];

pub(crate) struct CompiledEntry {
    pub entry: &'static CatalogEntry,
    pub regexes: Vec<Regex>,
    /// Total declared pattern count; the confidence denominator even
    /// when some patterns failed to compile.
    pub total: usize,
}

pub(crate) static COMPILED_CATALOG: Lazy<Vec<CompiledEntry>> = Lazy::new(|| {
    PRAYER_CATALOG
        .iter()
        .map(|entry| {
            let regexes = entry
                .patterns
                .iter()
                .filter_map(|p| match Regex::new(&format!("(?i){}", p)) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        log::warn!("catalog pattern {:?} in {} skipped: {}", p, entry.name, e);
                        None
                    }
                })
                .collect();
            CompiledEntry {
                entry,
                regexes,
                total: entry.patterns.len(),
            }
        })
        .collect()
});

/// Fixed mapping of common deity/guru names and honorifics to their
/// diacritic-correct forms. Keys are case-folded; values are stored
/// lowercase and re-capitalized from the original token.
pub static SACRED_NAMES: &[(&str, &str)] = &[
    ("namaha", "namaḥ"),
    ("namah", "namaḥ"),
    ("krishna", "kṛṣṇa"),
    ("christna", "kṛṣṇa"),
    ("shiva", "śiva"),
    ("shivaya", "śivāya"),
    ("ganesha", "gaṇeśa"),
    ("ganesh", "gaṇeśa"),
    ("vishnu", "viṣṇu"),
    ("lakshmi", "lakṣmī"),
    ("laxmi", "lakṣmī"),
    ("saraswati", "sarasvatī"),
    ("hanuman", "hanumān"),
    ("rama", "rāma"),
    ("durga", "durgā"),
    ("shri", "śrī"),
    ("sri", "śrī"),
    ("shree", "śrī"),
    ("shanti", "śāntiḥ"),
    ("shankara", "śaṅkara"),
    ("parvati", "pārvatī"),
    ("brahma", "brahmā"),
    ("narayana", "nārāyaṇa"),
    ("narayanaya", "nārāyaṇāya"),
    ("maheshwara", "maheśvara"),
    ("swaha", "svāhā"),
    ("devi", "devī"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        for compiled in COMPILED_CATALOG.iter() {
            assert_eq!(
                compiled.regexes.len(),
                compiled.total,
                "catalog entry {} has non-compiling patterns",
                compiled.entry.name
            );
        }
    }

    #[test]
    fn thresholds_are_in_range() {
        for entry in PRAYER_CATALOG {
            assert!(entry.threshold > 0.0 && entry.threshold <= 1.0);
            assert!(!entry.patterns.is_empty());
            assert!(!entry.canonical.is_empty());
        }
    }

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<&str> = PRAYER_CATALOG.iter().map(|e| e.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PRAYER_CATALOG.len());
    }

    #[test]
    fn sacred_name_keys_are_folded() {
        for (key, _) in SACRED_NAMES {
            assert_eq!(*key, key.to_lowercase());
        }
    }
}
