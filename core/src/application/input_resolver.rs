// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Input Resolver
//!
//! Classifies each execute-request input (inline complex payload, literal
//! typed value, remote reference) and produces the two mappings the
//! execution engine consumes: parsed complex values and typed literal
//! values, keyed by input identifier.
//!
//! Inputs are processed in declaration order so error reporting is
//! reproducible; the first failing input aborts the whole run, since a
//! request with an unresolved input cannot safely execute.

use crate::domain::description::AlgorithmDescription;
use crate::domain::errors::ResolveError;
use crate::domain::inputs::{
    ComplexValue, ExecuteInput, Format, InputData, InputReference, LiteralValue, ResolvedInputs,
};
use crate::infrastructure::literal_converter::LiteralConverter;
use crate::infrastructure::parsers::ParserRegistry;
use crate::infrastructure::reference_fetcher::ReferenceFetcher;
use std::sync::Arc;

pub struct InputResolver {
    parsers: Arc<ParserRegistry>,
    converter: Arc<dyn LiteralConverter>,
    fetcher: ReferenceFetcher,
}

impl InputResolver {
    pub fn new(
        parsers: Arc<ParserRegistry>,
        converter: Arc<dyn LiteralConverter>,
        fetcher: ReferenceFetcher,
    ) -> Self {
        Self {
            parsers,
            converter,
            fetcher,
        }
    }

    /// Resolve every input of one execute request
    ///
    /// Duplicate input identifiers overwrite the earlier value, last one
    /// wins; the overwrite is logged.
    pub async fn resolve(
        &self,
        inputs: &[ExecuteInput],
        description: &AlgorithmDescription,
    ) -> Result<ResolvedInputs, ResolveError> {
        let mut resolved = ResolvedInputs::default();

        for input in inputs {
            let identifier = input.identifier.as_str();
            match &input.data {
                Some(InputData::Complex { format, document }) => {
                    let value = self.resolve_complex(identifier, format, document, description)?;
                    if resolved.complex.insert(identifier.to_string(), value).is_some() {
                        tracing::warn!(input = %identifier, "duplicate input identifier, overwriting earlier value");
                    }
                }
                Some(InputData::Literal { value, data_type }) => {
                    let value =
                        self.resolve_literal(identifier, value, data_type.as_deref(), description)?;
                    if resolved.literal.insert(identifier.to_string(), value).is_some() {
                        tracing::warn!(input = %identifier, "duplicate input identifier, overwriting earlier value");
                    }
                }
                Some(InputData::BoundingBox { .. }) => {
                    return Err(ResolveError::OperationNotSupported {
                        identifier: identifier.to_string(),
                    });
                }
                Some(InputData::Reference(reference)) => {
                    let value = self
                        .resolve_reference(identifier, reference, description)
                        .await?;
                    if resolved.complex.insert(identifier.to_string(), value).is_some() {
                        tracing::warn!(input = %identifier, "duplicate input identifier, overwriting earlier value");
                    }
                }
                None => {
                    return Err(ResolveError::MalformedInput {
                        identifier: identifier.to_string(),
                    });
                }
            }
        }

        Ok(resolved)
    }

    /// Parse an inline complex payload
    fn resolve_complex(
        &self,
        identifier: &str,
        format: &Format,
        document: &str,
        description: &AlgorithmDescription,
    ) -> Result<ComplexValue, ResolveError> {
        let format = self.negotiate_format(identifier, format, description);
        let parser = self.parsers.select(&format, Some(&description.identifier));

        let document_parser =
            parser
                .as_document_parser()
                .ok_or_else(|| ResolveError::UnsupportedParser {
                    identifier: identifier.to_string(),
                    parser: parser.name().to_string(),
                })?;

        document_parser
            .parse_document(document)
            .map_err(|source| ResolveError::ParseFailure {
                identifier: identifier.to_string(),
                source,
            })
    }

    /// Convert a literal input to a typed scalar
    fn resolve_literal(
        &self,
        identifier: &str,
        value: &str,
        explicit_type: Option<&str>,
        description: &AlgorithmDescription,
    ) -> Result<LiteralValue, ResolveError> {
        let declared_type = explicit_type
            .map(str::to_string)
            .or_else(|| {
                description
                    .input(identifier)
                    .and_then(|decl| decl.literal_data_type.clone())
            })
            .ok_or_else(|| ResolveError::MissingTypeDeclaration {
                identifier: identifier.to_string(),
            })?;

        match self.converter.convert(&declared_type, value) {
            Ok(Some(converted)) => Ok(converted),
            Ok(None) => Err(ResolveError::UnsupportedLiteralType {
                identifier: identifier.to_string(),
                data_type: declared_type,
            }),
            Err(_) => Err(ResolveError::InvalidLiteralValue {
                identifier: identifier.to_string(),
                value: value.to_string(),
                data_type: declared_type,
            }),
        }
    }

    /// Dereference a remote input and parse the fetched bytes
    async fn resolve_reference(
        &self,
        identifier: &str,
        reference: &InputReference,
        description: &AlgorithmDescription,
    ) -> Result<ComplexValue, ResolveError> {
        let format = self.negotiate_format(identifier, &reference.format, description);
        let parser = self.parsers.select(&format, Some(&description.identifier));

        self.fetcher
            .fetch(identifier, reference, &format, parser.as_ref())
            .await
    }

    /// Fill absent negotiation fields from the input's declared default
    ///
    /// An input missing from the description is tolerated: the supplied
    /// fields are used as-is, and parsing may well fail downstream.
    fn negotiate_format(
        &self,
        identifier: &str,
        supplied: &Format,
        description: &AlgorithmDescription,
    ) -> Format {
        let declaration = description.input(identifier);
        if declaration.is_none() {
            tracing::debug!(
                input = %identifier,
                algorithm = %description.identifier,
                "input not found in process description, no defaults applied"
            );
        }
        supplied.resolved_against(declaration.and_then(|decl| decl.default_format.as_ref()))
    }
}
