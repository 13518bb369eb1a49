// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain Layer
//!
//! Data model and business rules shared by the feed synchronizer and the
//! input resolver. No I/O lives here.

pub mod catalog;
pub mod config;
pub mod description;
pub mod errors;
pub mod inputs;
pub mod path_sanitizer;

pub use catalog::{AlgorithmDescriptor, CatalogSnapshot};
pub use config::{ConfigError, FeedConfig, HttpConfig};
pub use description::{AlgorithmDescription, InputDeclaration};
pub use errors::{FeedError, ParseError, ResolveError};
pub use path_sanitizer::{EntryPathError, EntryPathSanitizer};
pub use inputs::{
    ComplexValue, ExecuteInput, Format, InputData, InputReference, LiteralValue, ReferenceBody,
    ResolvedInputs, XmlDocument,
};
