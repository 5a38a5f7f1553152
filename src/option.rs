//! Mask Options - Immutable configuration for the client mask instance.
//!
//! Options are `{key, value, eval}` triples kept in an ordered sequence.
//! The order matters: the client merges them first-to-last, so a later
//! entry can override an earlier one with the same key. The primary `mask`
//! option is always inserted first by the controller.
//!
//! An `eval` option carries a code expression that the client evaluates
//! instead of a plain serializable value (e.g. an uppercase transform).
//!
//! # Example
//!
//! ```ignore
//! use input_mask::option::MaskOption;
//!
//! let opts = vec![
//!     MaskOption::lazy(false),
//!     MaskOption::overwrite(true),
//!     MaskOption::to_uppercase(),
//! ];
//! ```

use serde::ser::{Serialize, SerializeSeq, SerializeStruct, Serializer};
use serde_json::Value;

use crate::error::MaskError;

/// Key of the primary mask-pattern option.
pub(crate) const MASK_KEY: &str = "mask";

// =============================================================================
// Option Value
// =============================================================================

/// Value carried by a mask option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// A plain JSON-serializable value (or, for eval options, the code
    /// expression as a string).
    Json(Value),
    /// A nested ordered group of options (hierarchical options such as
    /// `blocks`). Groups serialize recursively as lists of triples.
    Group(Vec<MaskOption>),
}

// =============================================================================
// Mask Option
// =============================================================================

/// A single immutable `{key, value, eval}` configuration triple.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskOption {
    key: String,
    value: OptionValue,
    eval: bool,
}

impl MaskOption {
    fn new(key: &str, value: OptionValue, eval: bool) -> Result<Self, MaskError> {
        if key.is_empty() {
            return Err(MaskError::InvalidOption(
                "option key must not be empty".into(),
            ));
        }
        Ok(Self {
            key: key.to_string(),
            value,
            eval,
        })
    }

    /// Create an option with a plain serializable value.
    pub fn option(key: &str, value: impl Serialize) -> Result<Self, MaskError> {
        let value = serde_json::to_value(value)?;
        Self::new(key, OptionValue::Json(value), false)
    }

    /// Create an option whose value is a client-evaluated code expression.
    pub fn option_eval(key: &str, expr: &str) -> Result<Self, MaskError> {
        Self::new(key, OptionValue::Json(Value::String(expr.to_string())), true)
    }

    /// Create a hierarchical option grouping nested options under one key.
    pub fn group(key: &str, options: Vec<MaskOption>) -> Result<Self, MaskError> {
        Self::new(key, OptionValue::Group(options), false)
    }

    /// The `blocks` group option (named sub-masks).
    pub fn blocks(options: Vec<MaskOption>) -> Self {
        // Key is a non-empty literal, construction cannot fail.
        Self {
            key: "blocks".into(),
            value: OptionValue::Group(options),
            eval: false,
        }
    }

    /// Whether the mask is filled with placeholder characters eagerly.
    pub fn lazy(value: bool) -> Self {
        Self {
            key: "lazy".into(),
            value: OptionValue::Json(Value::Bool(value)),
            eval: false,
        }
    }

    /// Whether typed characters overwrite instead of insert.
    pub fn overwrite(value: bool) -> Self {
        Self {
            key: "overwrite".into(),
            value: OptionValue::Json(Value::Bool(value)),
            eval: false,
        }
    }

    /// Preset that converts input to uppercase on the client side.
    pub fn to_uppercase() -> Self {
        Self {
            key: "prepare".into(),
            value: OptionValue::Json(Value::String("str => str.toUpperCase()".into())),
            eval: true,
        }
    }

    /// Primary mask option; always inserted first by the controller.
    pub(crate) fn primary(pattern: &str, eval: bool) -> Result<Self, MaskError> {
        if pattern.is_empty() {
            return Err(MaskError::InvalidOption(
                "mask pattern must not be empty".into(),
            ));
        }
        Self::new(
            MASK_KEY,
            OptionValue::Json(Value::String(pattern.to_string())),
            eval,
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &OptionValue {
        &self.value
    }

    pub fn is_eval(&self) -> bool {
        self.eval
    }
}

impl Serialize for MaskOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("MaskOption", 3)?;
        s.serialize_field("key", &self.key)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("eval", &self.eval)?;
        s.end()
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Json(value) => value.serialize(serializer),
            OptionValue::Group(options) => {
                let mut seq = serializer.serialize_seq(Some(options.len()))?;
                for opt in options {
                    seq.serialize_element(opt)?;
                }
                seq.end()
            }
        }
    }
}

// =============================================================================
// Payload Serialization
// =============================================================================

/// Serialize an option sequence to the client initialization payload.
///
/// The payload is an ordered JSON list of `{key, value, eval}` triples,
/// sent to the client instance exactly once at bind time.
pub(crate) fn to_payload(options: &[MaskOption]) -> Result<String, serde_json::Error> {
    serde_json::to_string(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_preserves_order() {
        let options = vec![
            MaskOption::primary("(000) 000-0000", false).unwrap(),
            MaskOption::lazy(false),
            MaskOption::overwrite(true),
        ];

        let payload = to_payload(&options).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&payload).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["key"], "mask");
        assert_eq!(parsed[0]["value"], "(000) 000-0000");
        assert_eq!(parsed[0]["eval"], false);
        assert_eq!(parsed[1]["key"], "lazy");
        assert_eq!(parsed[2]["key"], "overwrite");
    }

    #[test]
    fn test_eval_option() {
        let opt = MaskOption::to_uppercase();
        assert_eq!(opt.key(), "prepare");
        assert!(opt.is_eval());

        let payload = to_payload(std::slice::from_ref(&opt)).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed[0]["value"], "str => str.toUpperCase()");
        assert_eq!(parsed[0]["eval"], true);
    }

    #[test]
    fn test_nested_group_serializes_recursively() {
        let block = MaskOption::group(
            "num",
            vec![
                MaskOption::option("mask", "Number").unwrap(),
                MaskOption::option("scale", 2).unwrap(),
            ],
        )
        .unwrap();
        let options = vec![MaskOption::blocks(vec![block])];

        let payload = to_payload(&options).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&payload).unwrap();

        assert_eq!(parsed[0]["key"], "blocks");
        let group = parsed[0]["value"].as_array().unwrap();
        assert_eq!(group[0]["key"], "num");
        let nested = group[0]["value"].as_array().unwrap();
        assert_eq!(nested[0]["key"], "mask");
        assert_eq!(nested[1]["key"], "scale");
        assert_eq!(nested[1]["value"], 2);
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(MaskOption::option("", true).is_err());
        assert!(MaskOption::option_eval("", "x => x").is_err());
    }

    #[test]
    fn test_non_serializable_value_is_configuration_error() {
        struct Opaque;
        impl Serialize for Opaque {
            fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                use serde::ser::Error;
                Err(S::Error::custom("opaque value cannot be serialized"))
            }
        }

        assert!(matches!(
            MaskOption::option("prepare", Opaque),
            Err(MaskError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(
            MaskOption::primary("", false),
            Err(MaskError::InvalidOption(_))
        ));
    }
}
