//! Text normalization for manufacturer names and part numbers.
//!
//! Both normalizers are total: any [`Value`] goes in (text, numbers, `Null`) and the worst
//! case is an empty result. Neither depends on locale or any state outside its argument.
//!
//! - [`normalize_to_words`] produces the token *set* used for manufacturer containment.
//! - [`normalize_to_token`] produces one contiguous token used for positional part-number
//!   comparison.

use std::collections::BTreeSet;

use crate::types::Value;

/// A mis-decoded "ö" seen in upstream exports. Replaced with a plain `o`.
pub const MISENCODED_O: &str = "รถ";

/// Placeholder prefix some systems put in front of undetermined part numbers.
pub const PLACEHOLDER_MNP_PREFIX: &str = "TBD-";

/// Normalize a manufacturer cell into a set of uppercase alphanumeric words.
///
/// ```rust
/// use mnp_reconcile::normalize::normalize_to_words;
/// use mnp_reconcile::types::Value;
///
/// let words = normalize_to_words(&Value::text("Acme-Co."));
/// assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["ACME", "CO"]);
/// ```
pub fn normalize_to_words(value: &Value) -> BTreeSet<String> {
    words_from_text(&value.coerce_text())
}

/// Normalize a part-number cell into a single uppercase alphanumeric token.
///
/// ```rust
/// use mnp_reconcile::normalize::normalize_to_token;
/// use mnp_reconcile::types::Value;
///
/// assert_eq!(normalize_to_token(&Value::text("TBD-ab 12/3")), "AB123");
/// assert_eq!(normalize_to_token(&Value::Int64(4711)), "4711");
/// ```
pub fn normalize_to_token(value: &Value) -> String {
    token_from_text(&value.coerce_text())
}

/// [`normalize_to_words`] on already-coerced text.
///
/// Steps, in order:
///
/// 1. `-` and `+` become spaces
/// 2. [`MISENCODED_O`] becomes `o`
/// 3. everything except ASCII letters, digits, `.` and whitespace is dropped
/// 4. a `.` between two alphanumerics becomes a space; any other `.` is dropped
/// 5. upper-case, split on whitespace (including `\x1c`..=`\x1f`), collapse duplicates
pub fn words_from_text(text: &str) -> BTreeSet<String> {
    let separated = text.replace(['-', '+'], " ").replace(MISENCODED_O, "o");

    let kept: Vec<char> = separated
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c == '.' || is_separator(c))
        .collect();

    let mut cleaned = String::with_capacity(kept.len());
    for (i, &c) in kept.iter().enumerate() {
        if c != '.' {
            cleaned.push(c.to_ascii_uppercase());
            continue;
        }
        let before = i.checked_sub(1).and_then(|j| kept.get(j));
        let after = kept.get(i + 1);
        if is_word_char(before) && is_word_char(after) {
            cleaned.push(' ');
        }
    }

    cleaned
        .split(is_separator)
        .filter(|w| !w.is_empty())
        .map(str::to_owned)
        .collect()
}

/// [`normalize_to_token`] on already-coerced text.
pub fn token_from_text(text: &str) -> String {
    text.replace(MISENCODED_O, "o")
        .replace(PLACEHOLDER_MNP_PREFIX, "")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Unicode whitespace plus the ASCII information separators (`\x1c`..=`\x1f`).
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

fn is_word_char(c: Option<&char>) -> bool {
    c.is_some_and(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        words_from_text(s).into_iter().collect()
    }

    #[test]
    fn hyphen_and_plus_split_words() {
        assert_eq!(words("Black+Decker"), vec!["BLACK", "DECKER"]);
        assert_eq!(words("Acme-Co."), vec!["ACME", "CO"]);
    }

    #[test]
    fn inner_dots_separate_and_trailing_dots_vanish() {
        assert_eq!(words("A.O. Smith"), vec!["A", "O", "SMITH"]);
        assert_eq!(words("3.M"), vec!["3", "M"]);
        assert_eq!(words("Inc. ."), vec!["INC"]);
        assert_eq!(words("..."), Vec::<String>::new());
    }

    #[test]
    fn dot_next_to_stripped_char_is_not_a_separator() {
        // '&' is gone before dots are examined, so the dot sits between 'B' and 'C'.
        assert_eq!(words("AB.&CD"), vec!["AB", "CD"]);
        // ',' is gone too, but the dot is followed by a space.
        assert_eq!(words("Co., Ltd"), vec!["CO", "LTD"]);
    }

    #[test]
    fn misencoded_o_is_repaired() {
        assert_eq!(words("Kรถhler AG"), vec!["AG", "KOHLER"]);
        assert_eq!(token_from_text("Kรถ-12"), "KO12");
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        assert_eq!(words("Müller"), vec!["MLLER"]);
        assert_eq!(token_from_text("Ø-55"), "55");
    }

    #[test]
    fn information_separators_split_words() {
        assert_eq!(words("ACME\x1cCO"), vec!["ACME", "CO"]);
        assert_eq!(words("a\x1db\x1ec\x1fd"), vec!["A", "B", "C", "D"]);
        assert_eq!(words("Inc.\x1f"), vec!["INC"]);
        assert_eq!(token_from_text("AB\x1c12"), "AB12");
    }

    #[test]
    fn duplicate_words_collapse() {
        assert_eq!(words("acme ACME Acme"), vec!["ACME"]);
    }

    #[test]
    fn token_strips_separators_and_placeholder_prefix() {
        assert_eq!(token_from_text("ab-123"), "AB123");
        assert_eq!(token_from_text("TBD-55 10/2"), "55102");
        // Lower-case prefix is not the placeholder marker.
        assert_eq!(token_from_text("tbd-55"), "TBD55");
        assert_eq!(token_from_text("  --  "), "");
    }

    #[test]
    fn non_text_values_are_coerced() {
        assert_eq!(normalize_to_token(&Value::Float64(123.0)), "123");
        assert_eq!(normalize_to_token(&Value::Null), "");
        assert!(normalize_to_words(&Value::Null).is_empty());
        assert_eq!(
            normalize_to_words(&Value::Int64(3)).into_iter().collect::<Vec<_>>(),
            vec!["3"]
        );
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        for raw in ["Acme-Co.", "A.O. Smith", "Kรถhler+Söhne", "  x  y "] {
            let once = words_from_text(raw);
            let joined = once.iter().cloned().collect::<Vec<_>>().join(" ");
            assert_eq!(words_from_text(&joined), once, "input {raw:?}");
        }
        for raw in ["TBD-ab-12", "x/y z", "77.5"] {
            let once = token_from_text(raw);
            assert_eq!(token_from_text(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn output_alphabet_is_upper_alnum() {
        let samples = ["a.b,c;d", "€uro-Parts Ltd.", "x\ty\nz", "+-+", "ö.ü.ß"];
        for raw in samples {
            for w in words_from_text(raw) {
                assert!(!w.is_empty());
                assert!(w.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()), "{w:?}");
            }
            let t = token_from_text(raw);
            assert!(t.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()), "{t:?}");
        }
    }
}
