use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemperatureParseError {
    #[error("expected a temperature of the form D.D, got '{0}'")]
    Malformed(String),
    #[error("temperature {0} is not representable as D.D")]
    OutOfRange(f64),
}

/// Sampling temperature with one integer and one fractional digit (`0.7`).
///
/// Stored as a count of tenths so equality and hashing are exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Temperature {
    tenths: u8,
}

impl Temperature {
    pub const MAX_TENTHS: u8 = 99;

    pub fn from_tenths(tenths: u8) -> Result<Self, TemperatureParseError> {
        if tenths > Self::MAX_TENTHS {
            return Err(TemperatureParseError::OutOfRange(f64::from(tenths) / 10.0));
        }
        Ok(Self { tenths })
    }

    /// Builds a temperature from its integer and fractional digit characters.
    pub fn from_digits(units: char, tenths: char) -> Result<Self, TemperatureParseError> {
        match (units.to_digit(10), tenths.to_digit(10)) {
            (Some(u), Some(t)) => Ok(Self {
                tenths: (u * 10 + t) as u8,
            }),
            _ => Err(TemperatureParseError::Malformed(format!("{units}.{tenths}"))),
        }
    }

    pub fn tenths(self) -> u8 {
        self.tenths
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.tenths) / 10.0
    }

    fn from_f64(value: f64) -> Result<Self, TemperatureParseError> {
        let scaled = value * 10.0;
        let rounded = scaled.round();
        if !value.is_finite()
            || (scaled - rounded).abs() > 1e-9
            || rounded < 0.0
            || rounded > f64::from(Self::MAX_TENTHS)
        {
            return Err(TemperatureParseError::OutOfRange(value));
        }
        Ok(Self {
            tenths: rounded as u8,
        })
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tenths / 10, self.tenths % 10)
    }
}

impl FromStr for Temperature {
    type Err = TemperatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next(), chars.next()) {
            (Some(units), Some('.'), Some(tenths), None) => Self::from_digits(units, tenths),
            _ => Err(TemperatureParseError::Malformed(s.to_string())),
        }
    }
}

impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Temperature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TemperatureVisitor;

        impl Visitor<'_> for TemperatureVisitor {
            type Value = Temperature;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a temperature such as 0.7 or \"0.7\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Temperature, E> {
                Temperature::from_f64(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Temperature, E> {
                Temperature::from_f64(v as f64).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Temperature, E> {
                Temperature::from_f64(v as f64).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Temperature, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(TemperatureVisitor)
    }
}

/// Parameters of a single completion call. Used as a map key, so two
/// requests with identical fields are the same request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: Temperature,
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: Temperature, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_tokens,
            n: None,
            top_p: None,
            stop: None,
            stream: None,
        }
    }

    pub fn with_n(mut self, n: Option<u32>) -> Self {
        self.n = n;
        self
    }

    pub fn with_top_p(mut self, top_p: Option<u32>) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_stop(mut self, stop: Option<String>) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_stream(mut self, stream: Option<bool>) -> Self {
        self.stream = stream;
        self
    }
}
