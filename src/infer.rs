use std::collections::HashSet;

use crate::{
    data::{is_boolean_literal, parse_date, parse_double, parse_integer},
    types::ScalarType,
};

pub const MATCH_THRESHOLD: f64 = 0.8;
pub const CATEGORICAL_UNIQUE_RATIO: f64 = 0.5;
pub const CATEGORICAL_UNIQUE_LIMIT: usize = 20;

#[derive(Debug, Clone, Default)]
struct TypeCandidate<'a> {
    non_empty: usize,
    integer_matches: usize,
    double_matches: usize,
    boolean_matches: usize,
    date_matches: usize,
    distinct: HashSet<&'a str>,
}

impl<'a> TypeCandidate<'a> {
    fn update(&mut self, value: &'a str) {
        if value.is_empty() {
            return;
        }
        self.non_empty += 1;
        if parse_integer(value).is_some() {
            self.integer_matches += 1;
        }
        if parse_double(value).is_some() {
            self.double_matches += 1;
        }
        if is_boolean_literal(value) {
            self.boolean_matches += 1;
        }
        if parse_date(value).is_some() {
            self.date_matches += 1;
        }
        self.distinct.insert(value);
    }

    fn ratio(&self, count: usize) -> f64 {
        count as f64 / self.non_empty as f64
    }

    fn decide(&self) -> ScalarType {
        if self.non_empty == 0 {
            return ScalarType::String;
        }
        if self.ratio(self.integer_matches) >= MATCH_THRESHOLD {
            ScalarType::Integer
        } else if self.ratio(self.double_matches + self.integer_matches) >= MATCH_THRESHOLD {
            ScalarType::Double
        } else if self.ratio(self.boolean_matches) >= MATCH_THRESHOLD {
            ScalarType::Boolean
        } else if self.ratio(self.date_matches) >= MATCH_THRESHOLD {
            ScalarType::Date
        } else if self.ratio(self.distinct.len()) < CATEGORICAL_UNIQUE_RATIO
            && self.distinct.len() < CATEGORICAL_UNIQUE_LIMIT
        {
            ScalarType::Categorical
        } else {
            ScalarType::String
        }
    }
}

/// Guesses the best type for a column's raw values. Never fails;
/// [`ScalarType::String`] is the fallback.
pub fn infer<S: AsRef<str>>(values: &[S]) -> ScalarType {
    let mut candidate = TypeCandidate::default();
    for value in values {
        candidate.update(value.as_ref());
    }
    candidate.decide()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_integers_infer_integer() {
        assert_eq!(infer(&["1", "2", "3", "4"]), ScalarType::Integer);
    }

    #[test]
    fn mixed_integers_and_fractions_infer_double() {
        assert_eq!(infer(&["1", "2.5", "3"]), ScalarType::Double);
    }

    #[test]
    fn integer_threshold_is_checked_before_double() {
        let mut values = vec!["1"; 9];
        values.push("1.5");
        // 9/10 integers clears the integer threshold first.
        assert_eq!(infer(&values), ScalarType::Integer);

        let values = ["1", "2", "3", "4", "5.5", "6.5"];
        assert_eq!(infer(&values), ScalarType::Double);
    }

    #[test]
    fn boolean_literals_infer_boolean() {
        assert_eq!(infer(&["true", "false", "TRUE"]), ScalarType::Boolean);
    }

    #[test]
    fn dates_infer_date() {
        assert_eq!(
            infer(&["2024-01-01", "2024-02-01T10:00:00Z", "2024-03-01"]),
            ScalarType::Date
        );
    }

    #[test]
    fn repeated_labels_infer_categorical() {
        let values = [
            "red", "blue", "red", "green", "blue", "red", "blue", "red", "green", "blue", "red",
        ];
        assert_eq!(infer(&values), ScalarType::Categorical);
    }

    #[test]
    fn many_distinct_labels_infer_string() {
        let values = [
            "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q",
            "r", "s", "t", "u",
        ];
        assert_eq!(infer(&values), ScalarType::String);
    }

    #[test]
    fn empty_values_are_ignored() {
        assert_eq!(infer::<&str>(&[]), ScalarType::String);
        assert_eq!(infer(&["", "", ""]), ScalarType::String);
        assert_eq!(infer(&["", "5", "", "6"]), ScalarType::Integer);
    }
}
