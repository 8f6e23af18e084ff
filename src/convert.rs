use crate::{
    data::{format_double, parse_double, parse_integer},
    types::ScalarType,
};

pub fn convert(value: &str, from: ScalarType, to: ScalarType) -> String {
    if value.is_empty() {
        return to.default_value();
    }
    if from == to {
        return value.to_string();
    }
    match (from, to) {
        (_, ScalarType::String) | (_, ScalarType::Categorical) => value.to_string(),
        (ScalarType::String, ScalarType::Integer) => parse_integer(value)
            .map(|parsed| parsed.to_string())
            .unwrap_or_else(|| "0".to_string()),
        (ScalarType::String, ScalarType::Double) | (ScalarType::Integer, ScalarType::Double) => {
            parse_double(value)
                .map(format_double)
                .unwrap_or_else(|| "0.0".to_string())
        }
        (ScalarType::String, ScalarType::Boolean) => {
            if value.eq_ignore_ascii_case("true") || value == "1" {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        (ScalarType::Double, ScalarType::Integer) => parse_double(value)
            .filter(|parsed| parsed.is_finite())
            .map(|parsed| (parsed.trunc() as i64).to_string())
            .unwrap_or_else(|| "0".to_string()),
        (ScalarType::Boolean, ScalarType::Integer) => {
            if value == "true" { "1" } else { "0" }.to_string()
        }
        (ScalarType::Boolean, ScalarType::Double) => {
            if value == "true" { "1.0" } else { "0.0" }.to_string()
        }
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ScalarType::*;

    #[test]
    fn empty_input_yields_target_default() {
        assert_eq!(convert("", String, Integer), "0");
        assert_eq!(convert("", Integer, Double), "0.0");
        assert_eq!(convert("", Double, Boolean), "false");
        assert_eq!(convert("", Integer, Categorical), "");
    }

    #[test]
    fn string_to_numbers_falls_back_to_zero() {
        assert_eq!(convert("42", String, Integer), "42");
        assert_eq!(convert("4.2", String, Integer), "0");
        assert_eq!(convert("abc", String, Double), "0.0");
        assert_eq!(convert("2.50", String, Double), "2.5");
    }

    #[test]
    fn string_to_boolean_accepts_true_and_one() {
        assert_eq!(convert("true", String, Boolean), "true");
        assert_eq!(convert("1", String, Boolean), "true");
        assert_eq!(convert("yes", String, Boolean), "false");
    }

    #[test]
    fn numeric_conversions() {
        assert_eq!(convert("7", Integer, Double), "7.0");
        assert_eq!(convert("7.9", Double, Integer), "7");
        assert_eq!(convert("-7.9", Double, Integer), "-7");
        assert_eq!(convert("NaN", Double, Integer), "0");
        assert_eq!(convert("true", Boolean, Integer), "1");
        assert_eq!(convert("false", Boolean, Double), "0.0");
    }

    #[test]
    fn passthrough_pairs() {
        assert_eq!(convert("12", Integer, String), "12");
        assert_eq!(convert("red", String, Categorical), "red");
        assert_eq!(convert("2024-01-01", Date, Integer), "2024-01-01");
        assert_eq!(convert("x", Categorical, Categorical), "x");
    }
}
