//! Symbolic byte-length arithmetic.
//!
//! Encoded lengths are carried as C expression strings over the grammar
//! `term ('+' term)*` with `term := integer | integer '*' identifier |
//! identifier`. The strings are emitted verbatim into generated code, where
//! the C compiler evaluates them once enum and macro values are known. An
//! empty string stands for zero.
//!
//! The operations here are purely syntactic and never fail; the model
//! builder is responsible for feeding well-formed terms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The three length expressions tracked for every encodable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedLength {
    /// Guaranteed minimum number of encoded bytes. Excludes variable-length
    /// arrays, dependent fields, and trailing defaults, all of which may be
    /// absent from a legal packet.
    pub min_encoded_length: String,
    /// Maximum number of encoded bytes, with every array at capacity.
    pub max_encoded_length: String,
    /// Length of a packet in which the sender omitted nothing: defaults
    /// present, conditional fields included, arrays full. Differs from
    /// `min_encoded_length` exactly when the actual consumed length must be
    /// re-checked during decode.
    pub non_default_encoded_length: String,
}

impl EncodedLength {
    /// Reset all three expressions to zero.
    pub fn clear(&mut self) { *self = Self::default(); }

    /// True when nothing has been accumulated.
    pub fn is_empty(&self) -> bool { self.max_encoded_length.is_empty() }

    /// True when the minimum and maximum lengths are the same expression.
    pub fn min_equals_max(&self) -> bool { self.min_encoded_length == self.max_encoded_length }

    /// The minimum length, with zero spelled out for emission.
    pub fn min_or_zero(&self) -> &str {
        if self.min_encoded_length.is_empty() {
            "0"
        } else {
            &self.min_encoded_length
        }
    }

    /// Length contribution of a single field whose full encoded size is
    /// `bytes` (array repetition already folded in).
    pub fn for_field(bytes: &str, is_variable: bool, is_dependent: bool, is_default: bool) -> Self {
        let mut length = EncodedLength {
            max_encoded_length: bytes.to_string(),
            non_default_encoded_length: bytes.to_string(),
            ..Self::default()
        };

        // Variable arrays may carry zero elements, dependent fields may be
        // absent entirely, and defaults may be left off the end, so none of
        // them counts toward the shortest legal packet.
        if !is_variable && !is_dependent && !is_default {
            length.min_encoded_length = bytes.to_string();
        }

        length
    }

    /// Accumulate another encodable's lengths onto this one, term-wise.
    pub fn add_to_length(&mut self, other: &EncodedLength) {
        self.min_encoded_length =
            add_length_strings(&self.min_encoded_length, &other.min_encoded_length);
        self.max_encoded_length =
            add_length_strings(&self.max_encoded_length, &other.max_encoded_length);
        self.non_default_encoded_length = add_length_strings(
            &self.non_default_encoded_length,
            &other.non_default_encoded_length,
        );
    }

    /// Apply a structure's own array and conditional attributes to the
    /// summed child lengths.
    pub fn wrap_array(&mut self, array: Option<&str>, is_variable: bool, is_dependent: bool) {
        if let Some(count) = array {
            self.max_encoded_length = multiply_length_string(count, &self.max_encoded_length);
            self.min_encoded_length = multiply_length_string(count, &self.min_encoded_length);
            self.non_default_encoded_length =
                multiply_length_string(count, &self.non_default_encoded_length);
        }

        if is_variable || is_dependent {
            self.min_encoded_length.clear();
        }
    }
}

/// Split a length expression into trimmed terms.
fn split_terms(expr: &str) -> Vec<&str> {
    expr.split('+').map(str::trim).filter(|t| !t.is_empty()).collect()
}

/// Break a term into an integer coefficient and a symbolic remainder.
/// A pure integer yields an empty remainder.
fn parse_term(term: &str) -> (i64, String) {
    if let Ok(value) = term.parse::<i64>() {
        return (value, String::new());
    }

    if let Some((head, tail)) = term.split_once('*') {
        if let Ok(coefficient) = head.trim().parse::<i64>() {
            return (coefficient, tail.trim().to_string());
        }
    }

    (1, term.to_string())
}

/// Concatenate two length expressions. Term structure is preserved, so
/// `"1" + "16"` yields `"1 + 16"`; folding is left to
/// [`collapse_length_string`].
pub fn add_length_strings(a: &str, b: &str) -> String {
    if a.is_empty() {
        b.to_string()
    } else if b.is_empty() {
        a.to_string()
    } else {
        format!("{} + {}", a, b)
    }
}

/// Distribute an array count over every term of a length expression.
/// Integer counts fold into integer terms; symbolic counts become
/// multiplicative prefixes.
pub fn multiply_length_string(count: &str, expr: &str) -> String {
    let count = count.trim();
    if expr.is_empty() || count.is_empty() || count == "1" {
        return expr.to_string();
    }

    let numeric_count = count.parse::<i64>().ok();

    let terms: Vec<String> = split_terms(expr)
        .into_iter()
        .map(|term| {
            let (coefficient, symbol) = parse_term(term);
            match (numeric_count, symbol.is_empty()) {
                (Some(n), true) => format!("{}", n * coefficient),
                (Some(n), false) => format!("{}*{}", n * coefficient, symbol),
                (None, true) => {
                    if coefficient == 1 {
                        count.to_string()
                    } else {
                        format!("{}*{}", coefficient, count)
                    }
                }
                (None, false) => {
                    if coefficient == 1 {
                        format!("{}*{}", count, symbol)
                    } else {
                        format!("{}*{}*{}", coefficient, count, symbol)
                    }
                }
            }
        })
        .collect();

    terms.join(" + ")
}

/// Fold a length expression into canonical form: integer terms summed into a
/// single leading constant, identical symbolic terms merged under an integer
/// coefficient, `1*` prefixes dropped, terms ordered integer-first then
/// alphabetically.
pub fn collapse_length_string(expr: &str) -> String {
    let terms = split_terms(expr);
    if terms.is_empty() {
        return "0".to_string();
    }

    let mut constant: i64 = 0;
    let mut symbols: BTreeMap<String, i64> = BTreeMap::new();

    for term in terms {
        let (coefficient, symbol) = parse_term(term);
        if symbol.is_empty() {
            constant += coefficient;
        } else {
            *symbols.entry(symbol).or_insert(0) += coefficient;
        }
    }

    let mut parts: Vec<String> = Vec::new();
    if constant != 0 {
        parts.push(constant.to_string());
    }
    for (symbol, coefficient) in symbols {
        match coefficient {
            0 => {}
            1 => parts.push(symbol),
            _ => parts.push(format!("{}*{}", coefficient, symbol)),
        }
    }

    if parts.is_empty() {
        "0".to_string()
    } else {
        parts.join(" + ")
    }
}

/// Subtract one from a length expression. If the expression leads with an
/// integer literal of at least one the literal is decremented, otherwise a
/// `-1` term is prepended.
pub fn subtract_one_from_length_string(expr: &str) -> String {
    let terms = split_terms(expr);

    if let Some(first) = terms.first() {
        if let Ok(value) = first.parse::<i64>() {
            if value >= 1 {
                let rest = terms[1..].join(" + ");
                return if value == 1 {
                    if rest.is_empty() {
                        "0".to_string()
                    } else {
                        rest
                    }
                } else if rest.is_empty() {
                    format!("{}", value - 1)
                } else {
                    format!("{} + {}", value - 1, rest)
                };
            }
        }
    }

    if terms.is_empty() {
        "-1".to_string()
    } else {
        format!("-1 + {}", terms.join(" + "))
    }
}

/// Render a length expression for Markdown: collapsed, `1*` prefixes
/// stripped, and `*` rewritten as the HTML times entity so the text is not
/// mistaken for emphasis.
pub fn markdown_length_string(expr: &str) -> String {
    collapse_length_string(expr).replace("1*", "").replace('*', "&times;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_preserves_term_structure() {
        assert_eq!(add_length_strings("1", "16"), "1 + 16");
        assert_eq!(add_length_strings("", "4"), "4");
        assert_eq!(add_length_strings("4", ""), "4");
        assert_eq!(add_length_strings("", ""), "");
    }

    #[test]
    fn multiply_folds_integers() {
        assert_eq!(multiply_length_string("16", "1"), "16");
        assert_eq!(multiply_length_string("4", "2 + N"), "8 + 4*N");
        assert_eq!(multiply_length_string("N", "2"), "2*N");
        assert_eq!(multiply_length_string("N", "M"), "N*M");
        assert_eq!(multiply_length_string("1", "2 + N"), "2 + N");
        assert_eq!(multiply_length_string("3", "4*N"), "12*N");
    }

    #[test]
    fn collapse_merges_and_orders() {
        assert_eq!(collapse_length_string("1 + 16"), "17");
        assert_eq!(collapse_length_string("1*N"), "N");
        assert_eq!(collapse_length_string("N + 2 + N + 1"), "3 + 2*N");
        assert_eq!(collapse_length_string("Z + A"), "A + Z");
        assert_eq!(collapse_length_string("0 + N"), "N");
        assert_eq!(collapse_length_string(""), "0");
    }

    #[test]
    fn subtract_one_decrements_leading_integer() {
        assert_eq!(subtract_one_from_length_string("17"), "16");
        assert_eq!(subtract_one_from_length_string("1 + 4*N"), "4*N");
        assert_eq!(subtract_one_from_length_string("1"), "0");
        assert_eq!(subtract_one_from_length_string("N"), "-1 + N");
    }

    #[test]
    fn markdown_uses_times_entity() {
        assert_eq!(markdown_length_string("4*N"), "4&times;N");
        assert_eq!(markdown_length_string("1*N"), "N");
        assert_eq!(markdown_length_string("1 + 16"), "17");
    }

    #[test]
    fn field_length_flags() {
        let fixed = EncodedLength::for_field("4", false, false, false);
        assert_eq!(fixed.min_encoded_length, "4");
        assert_eq!(fixed.max_encoded_length, "4");
        assert_eq!(fixed.non_default_encoded_length, "4");

        let variable = EncodedLength::for_field("16", true, false, false);
        assert!(variable.min_encoded_length.is_empty());
        assert_eq!(variable.max_encoded_length, "16");
        assert_eq!(variable.non_default_encoded_length, "16");

        let defaulted = EncodedLength::for_field("4", false, false, true);
        assert!(defaulted.min_encoded_length.is_empty());
        assert_eq!(defaulted.non_default_encoded_length, "4");
    }

    #[test]
    fn structure_wrap_zeroes_conditional_minimums() {
        let mut length = EncodedLength::for_field("2", false, false, false);
        length.wrap_array(Some("8"), false, false);
        assert_eq!(length.max_encoded_length, "16");
        assert_eq!(length.min_encoded_length, "16");

        let mut conditional = EncodedLength::for_field("2", false, false, false);
        conditional.wrap_array(Some("8"), false, true);
        assert_eq!(conditional.max_encoded_length, "16");
        assert!(conditional.min_encoded_length.is_empty());
    }
}
