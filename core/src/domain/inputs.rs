// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Execute-Request Input Model
//!
//! Typed representations of the input shapes an execute request may carry
//! (inline complex payload, literal typed value, remote reference) and of
//! the uniform value set handed to the execution engine.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One declared input of an execute request
///
/// `data: None` models a request input that populates none of the known
/// shapes; the resolver rejects it as a format violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteInput {
    /// Input identifier, unique per request (duplicates overwrite)
    pub identifier: String,

    /// The populated input shape, if any
    pub data: Option<InputData>,
}

/// The input shapes consumed by the resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InputData {
    /// Structured payload embedded in the request document
    Complex {
        format: Format,
        /// Raw embedded document text
        document: String,
    },

    /// Scalar value supplied as text, with an optional explicit type
    Literal {
        value: String,
        data_type: Option<String>,
    },

    /// Geographic bounding box (declared for dispatch, never resolved)
    BoundingBox {
        lower_corner: Vec<f64>,
        upper_corner: Vec<f64>,
    },

    /// Payload supplied as a URL to dereference
    Reference(InputReference),
}

/// A remote-reference input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputReference {
    /// URL the payload is fetched from
    pub href: String,

    /// Content negotiation hints supplied with the reference
    #[serde(default)]
    pub format: Format,

    /// Request body forwarded to the reference endpoint, if any
    ///
    /// Inline bodies and body references are mutually exclusive by
    /// construction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ReferenceBody>,
}

/// Body forwarded when dereferencing a reference input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReferenceBody {
    /// Document embedded in the request, POSTed verbatim
    Inline(String),

    /// URL of a second resource whose bytes become the POST body
    Reference(String),
}

/// Content negotiation tuple: schema, mime type, encoding
///
/// Each field is independently optional; [`Format::resolved_against`]
/// fills absent fields from an input declaration's default format before
/// parser selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl Format {
    /// Fill absent fields from a declared default format
    ///
    /// Explicit values always win; only `None` fields inherit.
    pub fn resolved_against(&self, default: Option<&Format>) -> Format {
        match default {
            Some(default) => Format {
                schema: self.schema.clone().or_else(|| default.schema.clone()),
                mime_type: self.mime_type.clone().or_else(|| default.mime_type.clone()),
                encoding: self.encoding.clone().or_else(|| default.encoding.clone()),
            },
            None => self.clone(),
        }
    }
}

/// A parsed complex value, tagged by the kind the parser produced
///
/// The tag spares downstream consumers any dynamic type checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComplexValue {
    /// Structured XML document
    Document(XmlDocument),

    /// Plain text payload
    Text(String),

    /// Opaque binary payload
    Bytes(Vec<u8>),
}

/// A parsed XML document as produced by the baseline parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlDocument {
    /// Local name of the document's root element
    pub root_element: String,

    /// Verbatim document text
    pub source: String,
}

/// A typed scalar produced from a literal input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Uri(String),
    DateTime(DateTime<FixedOffset>),
    Binary(Vec<u8>),
}

/// The uniform value set one resolution run produces
///
/// Owned by a single request; discarded after the algorithm consumes it.
#[derive(Debug, Clone, Default)]
pub struct ResolvedInputs {
    /// Parsed complex values keyed by input identifier
    pub complex: HashMap<String, ComplexValue>,

    /// Typed literal values keyed by input identifier
    pub literal: HashMap<String, LiteralValue>,
}

impl ResolvedInputs {
    pub fn is_empty(&self) -> bool {
        self.complex.is_empty() && self.literal.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_format() -> Format {
        Format {
            schema: Some("http://example/schema".to_string()),
            mime_type: Some("text/xml".to_string()),
            encoding: Some("UTF-8".to_string()),
        }
    }

    #[test]
    fn test_resolution_fills_only_absent_fields() {
        let supplied = Format {
            schema: None,
            mime_type: Some("application/json".to_string()),
            encoding: None,
        };
        let resolved = supplied.resolved_against(Some(&default_format()));

        assert_eq!(resolved.schema.as_deref(), Some("http://example/schema"));
        assert_eq!(resolved.mime_type.as_deref(), Some("application/json"));
        assert_eq!(resolved.encoding.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn test_resolution_without_default_is_identity() {
        let supplied = Format {
            schema: None,
            mime_type: Some("text/xml".to_string()),
            encoding: None,
        };
        assert_eq!(supplied.resolved_against(None), supplied);
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let supplied = default_format();
        let other = Format {
            schema: Some("http://other/schema".to_string()),
            mime_type: Some("application/gml".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(supplied.resolved_against(Some(&other)), supplied);
    }
}
