/// Below this detector confidence an `english` classification is
/// downgraded to `mixed` by the ASR policy.
pub const ENGLISH_CONFIDENCE_THRESHOLD: f32 = 0.8;

/// Prayer acceptance threshold used by the aggressive pipeline in place
/// of each catalog entry's own threshold when the entry's is higher.
pub const AGGRESSIVE_PRAYER_THRESHOLD: f32 = 0.6;

pub const CONSERVATIVE_EDIT_THRESHOLD: f32 = 0.95;
pub const MODERATE_EDIT_THRESHOLD: f32 = 0.85;
pub const AGGRESSIVE_EDIT_THRESHOLD: f32 = 0.70;

/// Span-change ratios steering the surgical confidence adjustment.
pub const LARGE_EDIT_SPAN_RATIO: f32 = 0.30;
pub const SMALL_EDIT_SPAN_RATIO: f32 = 0.05;
pub const LARGE_EDIT_PENALTY: f32 = 0.8;
pub const SMALL_EDIT_BONUS: f32 = 1.1;

/// Bytes around a candidate edit inspected for protected regions.
pub const PROTECTED_REGION_WINDOW: usize = 5;

/// IAST combining-free diacritic letters; presence of any of these is
/// treated as hard evidence of Sanskrit content.
pub const IAST_DIACRITICS: &str = "āīūṛṝḷḹṅñṭḍṇśṣḥṃĀĪŪṚṜḶḸṄÑṬḌṆŚṢḤṂ";
