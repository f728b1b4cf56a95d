//! Serde adapters for the engine's JSON conventions
//!
//! The engine encodes booleans and integers as JSON strings (`"true"`,
//! `"1073741824"`). These adapters write that form and read either the
//! string form or a native JSON value.
//!
//! Use them on `Option` fields together with `default` and
//! `skip_serializing_if = "Option::is_none"`.

use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Unsigned(u64),
    Float(f64),
    Str(String),
}

/// `Option<bool>` transmitted as `"true"` / `"false"`
pub mod opt_bool {
    use super::Scalar;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(true) => serializer.serialize_str("true"),
            Some(false) => serializer.serialize_str("false"),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Scalar::Bool(b)) => Ok(Some(b)),
            Some(Scalar::Str(s)) => match s.trim() {
                "" => Ok(None),
                "true" | "TRUE" | "True" => Ok(Some(true)),
                "false" | "FALSE" | "False" => Ok(Some(false)),
                other => Err(D::Error::custom(format!("invalid boolean string: {other:?}"))),
            },
            Some(Scalar::Int(i)) => Ok(Some(i != 0)),
            Some(Scalar::Unsigned(u)) => Ok(Some(u != 0)),
            Some(Scalar::Float(_)) => Err(D::Error::custom("expected a boolean, found a float")),
        }
    }
}

/// `Option<i64>` transmitted as a decimal string
pub mod opt_i64 {
    use super::Scalar;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Scalar::Int(i)) => Ok(Some(i)),
            Some(Scalar::Unsigned(u)) => i64::try_from(u).map(Some).map_err(D::Error::custom),
            Some(Scalar::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(Scalar::Str(s)) => s.trim().parse::<i64>().map(Some).map_err(D::Error::custom),
            Some(Scalar::Float(f)) if f.fract() == 0.0 => Ok(Some(f as i64)),
            Some(Scalar::Float(f)) => Err(D::Error::custom(format!("expected an integer, found {f}"))),
            Some(Scalar::Bool(_)) => Err(D::Error::custom("expected an integer, found a boolean")),
        }
    }
}

/// `Option<u64>` transmitted as a decimal string (sizes in bytes)
pub mod opt_u64 {
    use super::Scalar;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Scalar::Unsigned(u)) => Ok(Some(u)),
            Some(Scalar::Int(i)) => u64::try_from(i).map(Some).map_err(D::Error::custom),
            Some(Scalar::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(Scalar::Str(s)) => s.trim().parse::<u64>().map(Some).map_err(D::Error::custom),
            Some(Scalar::Float(f)) if f.fract() == 0.0 && f >= 0.0 => Ok(Some(f as u64)),
            Some(Scalar::Float(f)) => Err(D::Error::custom(format!("expected a size, found {f}"))),
            Some(Scalar::Bool(_)) => Err(D::Error::custom("expected a size, found a boolean")),
        }
    }
}

/// Enum with a catch-all variant for values this crate does not know
pub trait Choice {
    fn is_unknown(&self) -> bool;
}

/// `skip_serializing_if` for writable enum fields: skips absent values and
/// values decoded into the catch-all, which the engine would reject
pub fn skip_choice<T: Choice>(value: &Option<T>) -> bool {
    value.as_ref().is_none_or(Choice::is_unknown)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default, with = "super::opt_bool", skip_serializing_if = "Option::is_none")]
        enabled: Option<bool>,
        #[serde(default, with = "super::opt_i64", skip_serializing_if = "Option::is_none")]
        priority: Option<i64>,
        #[serde(default, with = "super::opt_u64", skip_serializing_if = "Option::is_none")]
        memory: Option<u64>,
    }

    #[test]
    fn test_decodes_string_encoded_scalars() {
        let sample: Sample =
            serde_json::from_str(r#"{"enabled":"true","priority":"-1","memory":"1073741824"}"#).unwrap();
        assert_eq!(sample.enabled, Some(true));
        assert_eq!(sample.priority, Some(-1));
        assert_eq!(sample.memory, Some(1_073_741_824));
    }

    #[test]
    fn test_decodes_native_scalars() {
        let sample: Sample = serde_json::from_str(r#"{"enabled":false,"priority":50,"memory":512}"#).unwrap();
        assert_eq!(sample.enabled, Some(false));
        assert_eq!(sample.priority, Some(50));
        assert_eq!(sample.memory, Some(512));
    }

    #[test]
    fn test_missing_and_null_fields_are_none() {
        let sample: Sample = serde_json::from_str(r#"{"enabled":null}"#).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_encodes_as_strings_and_skips_none() {
        let sample = Sample {
            enabled: Some(true),
            priority: None,
            memory: Some(2048),
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json, serde_json::json!({"enabled": "true", "memory": "2048"}));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Sample>(r#"{"enabled":"maybe"}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"memory":"-5"}"#).is_err());
    }
}
