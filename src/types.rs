use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalarType {
    #[default]
    String,
    Integer,
    Double,
    Boolean,
    Date,
    Categorical,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Integer => "int",
            ScalarType::Double => "float",
            ScalarType::Boolean => "bool",
            ScalarType::Date => "date",
            ScalarType::Categorical => "category",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["string", "int", "float", "bool", "date", "category"]
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Integer | ScalarType::Double)
    }

    /// Canonical value written into cells that have to be synthesized.
    ///
    /// `Date` defaults to the current UTC time, so two calls can differ.
    pub fn default_value(&self) -> String {
        match self {
            ScalarType::String | ScalarType::Categorical => String::new(),
            ScalarType::Integer => "0".to_string(),
            ScalarType::Double => "0.0".to_string(),
            ScalarType::Boolean => "false".to_string(),
            ScalarType::Date => Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalarType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "string" | "text" => Ok(ScalarType::String),
            "int" | "integer" => Ok(ScalarType::Integer),
            "float" | "double" => Ok(ScalarType::Double),
            "bool" | "boolean" => Ok(ScalarType::Boolean),
            "date" => Ok(ScalarType::Date),
            "category" | "categorical" => Ok(ScalarType::Categorical),
            _ => Err(anyhow!(
                "Unknown column type '{value}'. Supported types: {}",
                ScalarType::variants().join(", ")
            )),
        }
    }
}

impl Serialize for ScalarType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ScalarType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        ScalarType::from_str(&token).map_err(|err| de::Error::custom(err.to_string()))
    }
}
