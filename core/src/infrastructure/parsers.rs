// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Parser Selection Contract
//!
//! Format parsers are plugins supplied by the embedding service; this
//! module carries only their selection contract. A [`ParserRegistry`]
//! binds parsers to content negotiation tuples, optionally scoped to one
//! algorithm; algorithm-specific bindings take precedence over generic
//! ones, and a baseline parser backstops every lookup.

use crate::domain::errors::ParseError;
use crate::domain::inputs::{ComplexValue, Format, XmlDocument};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::sync::Arc;

/// A parser for complex input payloads
pub trait ComplexParser: Send + Sync {
    /// Parser name used in diagnostics
    fn name(&self) -> &str;

    /// Parse a fetched byte payload
    fn parse_bytes(&self, data: &[u8], format: &Format) -> Result<ComplexValue, ParseError>;

    /// Document-parsing capability, if this parser has one
    ///
    /// Inline complex inputs arrive as embedded documents; a parser that
    /// cannot handle them is rejected with `UnsupportedParser`.
    fn as_document_parser(&self) -> Option<&dyn DocumentParser> {
        None
    }
}

/// A parser that can handle documents embedded in the request
pub trait DocumentParser: ComplexParser {
    fn parse_document(&self, document: &str) -> Result<ComplexValue, ParseError>;
}

/// One registry entry binding a parser to a negotiation tuple
///
/// `None` fields are wildcards; `Some` fields must equal the resolved
/// tuple's value exactly.
#[derive(Clone)]
pub struct ParserBinding {
    /// Algorithm this binding is scoped to, if any
    pub algorithm: Option<String>,
    pub schema: Option<String>,
    pub mime_type: Option<String>,
    pub encoding: Option<String>,
    pub parser: Arc<dyn ComplexParser>,
}

impl ParserBinding {
    fn matches(&self, format: &Format, algorithm: Option<&str>) -> bool {
        if let Some(bound) = &self.algorithm {
            if algorithm != Some(bound.as_str()) {
                return false;
            }
        }
        field_matches(&self.schema, &format.schema)
            && field_matches(&self.mime_type, &format.mime_type)
            && field_matches(&self.encoding, &format.encoding)
    }
}

fn field_matches(bound: &Option<String>, resolved: &Option<String>) -> bool {
    match bound {
        None => true,
        Some(value) => resolved.as_deref() == Some(value.as_str()),
    }
}

/// Registry of parser bindings with a baseline fallback
pub struct ParserRegistry {
    bindings: Vec<ParserBinding>,
    fallback: Arc<dyn ComplexParser>,
}

impl ParserRegistry {
    /// Registry with a custom baseline parser
    pub fn new(fallback: Arc<dyn ComplexParser>) -> Self {
        Self {
            bindings: Vec::new(),
            fallback,
        }
    }

    /// Registry backstopped by the generic XML baseline parser
    pub fn with_generic_fallback() -> Self {
        Self::new(Arc::new(GenericXmlParser::new()))
    }

    pub fn register(&mut self, binding: ParserBinding) {
        self.bindings.push(binding);
    }

    /// Select a parser for a resolved negotiation tuple
    ///
    /// Algorithm-specific bindings are consulted first, then generic
    /// bindings in registration order, then the baseline parser.
    pub fn select(&self, format: &Format, algorithm: Option<&str>) -> Arc<dyn ComplexParser> {
        if let Some(algorithm) = algorithm {
            if let Some(binding) = self
                .bindings
                .iter()
                .filter(|b| b.algorithm.is_some())
                .find(|b| b.matches(format, Some(algorithm)))
            {
                return Arc::clone(&binding.parser);
            }
        }
        if let Some(binding) = self
            .bindings
            .iter()
            .filter(|b| b.algorithm.is_none())
            .find(|b| b.matches(format, algorithm))
        {
            return Arc::clone(&binding.parser);
        }
        tracing::debug!(
            schema = format.schema.as_deref().unwrap_or("-"),
            mime_type = format.mime_type.as_deref().unwrap_or("-"),
            encoding = format.encoding.as_deref().unwrap_or("-"),
            "no parser binding matched, using baseline parser"
        );
        Arc::clone(&self.fallback)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_generic_fallback()
    }
}

/// Baseline parser: checks XML well-formedness and captures the root
#[derive(Debug, Default)]
pub struct GenericXmlParser;

impl GenericXmlParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_str(&self, document: &str) -> Result<ComplexValue, ParseError> {
        let mut reader = Reader::from_str(document);
        let mut root_element: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) if root_element.is_none() => {
                    let local = e.local_name();
                    root_element = Some(String::from_utf8_lossy(local.as_ref()).into_owned());
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(ParseError(format!("malformed XML: {e}"))),
            }
        }

        let root_element =
            root_element.ok_or_else(|| ParseError("document has no root element".to_string()))?;
        Ok(ComplexValue::Document(XmlDocument {
            root_element,
            source: document.to_string(),
        }))
    }
}

impl ComplexParser for GenericXmlParser {
    fn name(&self) -> &str {
        "generic-xml"
    }

    fn parse_bytes(&self, data: &[u8], _format: &Format) -> Result<ComplexValue, ParseError> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ParseError(format!("payload is not valid UTF-8: {e}")))?;
        self.parse_str(text)
    }

    fn as_document_parser(&self) -> Option<&dyn DocumentParser> {
        Some(self)
    }
}

impl DocumentParser for GenericXmlParser {
    fn parse_document(&self, document: &str) -> Result<ComplexValue, ParseError> {
        self.parse_str(document)
    }
}
