// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Boundary-Layer Error Taxonomy
//!
//! Feed synchronization failures are logged and leave the previously
//! published catalog in place; input resolution failures always propagate
//! to the caller, carrying the offending input identifier. No retries
//! happen in this layer.

use thiserror::Error;

/// Feed synchronization errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed URL is malformed or the endpoint cannot be reached
    #[error("feed unreachable: {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// Transport error or archive corruption while replacing the mirror
    #[error("feed fetch failed: {url}: {reason}")]
    FetchFailed { url: String, reason: String },
}

/// Failure reported by a format parser
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Input resolution errors
///
/// One failing input aborts the whole resolution run; a request with an
/// unresolved input cannot safely execute.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The input populates none of complex data, literal data or reference
    #[error("input '{identifier}': no data or reference supplied")]
    MalformedInput { identifier: String },

    /// Literal input with no explicit type and no declared default type
    #[error("input '{identifier}': no literal data type declared and the process description provides no default")]
    MissingTypeDeclaration { identifier: String },

    /// Literal value does not parse as the declared type
    #[error("input '{identifier}': value '{value}' is not a valid {data_type}")]
    InvalidLiteralValue {
        identifier: String,
        value: String,
        data_type: String,
    },

    /// The declared literal type is not supported by the converter
    #[error("input '{identifier}': literal data type '{data_type}' is not supported")]
    UnsupportedLiteralType {
        identifier: String,
        data_type: String,
    },

    /// The selected parser cannot parse embedded documents
    #[error("input '{identifier}': parser '{parser}' does not support document parsing")]
    UnsupportedParser { identifier: String, parser: String },

    /// The parser rejected the payload
    #[error("input '{identifier}': parsing failed: {source}")]
    ParseFailure {
        identifier: String,
        #[source]
        source: ParseError,
    },

    /// Reference href is not a valid URL
    #[error("input '{identifier}': invalid reference URL '{url}'")]
    InvalidReferenceUrl { identifier: String, url: String },

    /// Transport failure while dereferencing a remote input
    #[error("input '{identifier}': reference '{url}' unreachable: {reason}")]
    ReferenceUnreachable {
        identifier: String,
        url: String,
        reason: String,
    },

    /// Bounding-box inputs are not supported by this service
    #[error("input '{identifier}': bounding-box inputs are not supported")]
    OperationNotSupported { identifier: String },
}

impl ResolveError {
    /// Identifier of the input that caused the failure
    pub fn identifier(&self) -> &str {
        match self {
            Self::MalformedInput { identifier }
            | Self::MissingTypeDeclaration { identifier }
            | Self::InvalidLiteralValue { identifier, .. }
            | Self::UnsupportedLiteralType { identifier, .. }
            | Self::UnsupportedParser { identifier, .. }
            | Self::ParseFailure { identifier, .. }
            | Self::InvalidReferenceUrl { identifier, .. }
            | Self::ReferenceUnreachable { identifier, .. }
            | Self::OperationNotSupported { identifier } => identifier,
        }
    }
}
