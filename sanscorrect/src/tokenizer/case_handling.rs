//! Case helpers used by the sacred-name substitution pass.

use smol_str::SmolStr;

/// Lowercases the whole string, expanding multi-char foldings.
#[inline(always)]
pub fn lower_case(s: &str) -> SmolStr {
    s.chars()
        .map(|c| c.to_lowercase().collect::<String>())
        .collect::<SmolStr>()
}

/// Uppercases the first character, leaving the rest untouched.
#[inline(always)]
pub fn upper_first(s: &str) -> SmolStr {
    let mut c = s.chars();
    match c.next() {
        None => SmolStr::new(""),
        Some(f) => SmolStr::from(f.to_uppercase().collect::<String>() + c.as_str()),
    }
}

/// Returns true when the first character is uppercase.
#[inline(always)]
pub fn is_first_caps(s: &str) -> bool {
    s.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_first_handles_diacritics() {
        assert_eq!(upper_first("śiva"), "Śiva");
        assert_eq!(upper_first("namaḥ"), "Namaḥ");
        assert_eq!(upper_first(""), "");
    }

    #[test]
    fn first_caps() {
        assert!(is_first_caps("Namaha"));
        assert!(!is_first_caps("namaha"));
        assert!(!is_first_caps(""));
    }

    #[test]
    fn lower_case_folds() {
        assert_eq!(lower_case("KṚṢṆA"), "kṛṣṇa");
    }
}
