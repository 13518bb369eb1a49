// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Literal Type Conversion
//!
//! Converts the string value of a literal input into a typed scalar. The
//! conversion contract distinguishes "value does not parse" (an error)
//! from "type not supported" (`Ok(None)`), because the resolver reports
//! them as different failures.

use crate::domain::inputs::LiteralValue;
use base64::Engine;
use chrono::DateTime;
use thiserror::Error;
use url::Url;

/// Conversion failure: the value does not parse as the declared type
#[derive(Debug, Error)]
#[error("value '{value}' does not parse as {data_type}: {reason}")]
pub struct LiteralConversionError {
    pub data_type: String,
    pub value: String,
    pub reason: String,
}

/// Converts literal input strings to typed scalars
pub trait LiteralConverter: Send + Sync {
    /// Convert `value` according to `data_type`
    ///
    /// Returns `Ok(None)` when the data type itself is not supported.
    fn convert(
        &self,
        data_type: &str,
        value: &str,
    ) -> Result<Option<LiteralValue>, LiteralConversionError>;
}

/// Converter for the XML Schema base types literal inputs declare
///
/// Accepts prefixed names (`xs:double`), bare names (`double`) and full
/// schema references (`http://www.w3.org/TR/xmlschema-2#double`).
#[derive(Debug, Default)]
pub struct XmlSchemaConverter;

impl XmlSchemaConverter {
    pub fn new() -> Self {
        Self
    }

    /// Reduce a data type reference to its local schema type name
    fn local_type(data_type: &str) -> &str {
        let tail = data_type
            .rsplit_once('#')
            .map(|(_, t)| t)
            .unwrap_or(data_type);
        tail.rsplit_once(':').map(|(_, t)| t).unwrap_or(tail)
    }

    fn error(data_type: &str, value: &str, reason: impl ToString) -> LiteralConversionError {
        LiteralConversionError {
            data_type: data_type.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl LiteralConverter for XmlSchemaConverter {
    fn convert(
        &self,
        data_type: &str,
        value: &str,
    ) -> Result<Option<LiteralValue>, LiteralConversionError> {
        let converted = match Self::local_type(data_type) {
            "string" => LiteralValue::String(value.to_string()),
            "boolean" => match value {
                "true" | "1" => LiteralValue::Boolean(true),
                "false" | "0" => LiteralValue::Boolean(false),
                other => return Err(Self::error(data_type, other, "expected boolean literal")),
            },
            "byte" | "short" | "int" | "integer" | "long" => {
                let parsed: i64 = value
                    .trim()
                    .parse()
                    .map_err(|e| Self::error(data_type, value, e))?;
                LiteralValue::Integer(parsed)
            }
            "float" | "double" => {
                let parsed: f64 = value
                    .trim()
                    .parse()
                    .map_err(|e| Self::error(data_type, value, e))?;
                LiteralValue::Double(parsed)
            }
            "anyURI" => {
                let parsed = Url::parse(value).map_err(|e| Self::error(data_type, value, e))?;
                LiteralValue::Uri(parsed.to_string())
            }
            "dateTime" => {
                let parsed = DateTime::parse_from_rfc3339(value)
                    .map_err(|e| Self::error(data_type, value, e))?;
                LiteralValue::DateTime(parsed)
            }
            "base64Binary" => {
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(value.trim())
                    .map_err(|e| Self::error(data_type, value, e))?;
                LiteralValue::Binary(decoded)
            }
            _ => return Ok(None),
        };
        Ok(Some(converted))
    }
}
