//! Word iteration over segment text.

pub mod case_handling;

/// Extension methods for iterating the words of a segment.
pub trait Tokenize {
    /// Iterates word tokens, with surrounding punctuation stripped.
    fn words(&self) -> Words;
    /// Counts word tokens; the denominator of the correction rate.
    fn word_count(&self) -> usize;
}

impl Tokenize for str {
    fn words(&self) -> Words {
        Words {
            inner: self.split_whitespace(),
        }
    }

    fn word_count(&self) -> usize {
        self.words().count()
    }
}

/// Iterator over the words of a string slice.
pub struct Words<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        for token in self.inner.by_ref() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric());
            if token.chars().any(|c| c.is_alphanumeric()) {
                return Some(token);
            }
        }
        None
    }
}

/// Splits a whitespace token into leading punctuation, core and trailing
/// punctuation. The core may be empty for all-punctuation tokens.
pub fn split_punctuation(token: &str) -> (&str, &str, &str) {
    let start = token
        .char_indices()
        .find(|(_, c)| c.is_alphanumeric())
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    let end = token
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphanumeric())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(start);
    (&token[..start], &token[start..end], &token[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_strip_punctuation() {
        let words: Vec<&str> = "oṃ, śāntiḥ! (peace) -- end.".words().collect();
        assert_eq!(words, vec!["oṃ", "śāntiḥ", "peace", "end"]);
    }

    #[test]
    fn word_count_ignores_bare_punctuation() {
        assert_eq!("one two -- three".word_count(), 3);
        assert_eq!("".word_count(), 0);
        assert_eq!("...".word_count(), 0);
    }

    #[test]
    fn split_punctuation_parts() {
        assert_eq!(split_punctuation("(namaha),"), ("(", "namaha", "),"));
        assert_eq!(split_punctuation("om"), ("", "om", ""));
        assert_eq!(split_punctuation("!!"), ("!!", "", ""));
    }
}
