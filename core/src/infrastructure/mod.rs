// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure Layer
//!
//! Network, filesystem and format-decoding adapters: feed mirroring,
//! reference dereferencing, parser selection and literal conversion.

pub mod descriptor_reader;
pub mod feed_sync;
pub mod literal_converter;
pub mod parsers;
pub mod reference_fetcher;

pub use feed_sync::FeedSynchronizer;
pub use literal_converter::{LiteralConversionError, LiteralConverter, XmlSchemaConverter};
pub use parsers::{ComplexParser, DocumentParser, GenericXmlParser, ParserBinding, ParserRegistry};
pub use reference_fetcher::ReferenceFetcher;

use crate::domain::config::HttpConfig;
use reqwest::Client;

/// Build the HTTP client shared by feed and reference retrieval
///
/// Explicit connect and request timeouts bound every outbound call; no
/// operation in this layer may block indefinitely on a peer.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
}
