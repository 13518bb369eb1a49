// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Reference Fetcher
//!
//! Dereferences a remote-reference input over HTTP. Requests advertise
//! gzip support and set the resolved mime type as the outgoing content
//! type; a body is forwarded when the reference carries one, either
//! inline or itself fetched from a second URL. Responses declaring
//! `Content-Encoding: gzip` are decompressed transparently before the
//! bytes reach the parser.

use crate::domain::errors::ResolveError;
use crate::domain::inputs::{ComplexValue, Format, InputReference, ReferenceBody};
use crate::infrastructure::parsers::ComplexParser;
use flate2::read::GzDecoder;
use reqwest::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use std::io::Read;

pub struct ReferenceFetcher {
    client: Client,
}

impl ReferenceFetcher {
    /// Create a fetcher over a pre-configured HTTP client
    ///
    /// The client carries the connect/request timeouts; see
    /// [`crate::infrastructure::build_http_client`].
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch a reference input and hand the bytes to `parser`
    ///
    /// Transport failures anywhere in the exchange surface as
    /// `ReferenceUnreachable` with the attempted URL; parser failures as
    /// `ParseFailure`.
    pub async fn fetch(
        &self,
        identifier: &str,
        reference: &InputReference,
        format: &Format,
        parser: &dyn ComplexParser,
    ) -> Result<ComplexValue, ResolveError> {
        let url = Url::parse(&reference.href).map_err(|_| ResolveError::InvalidReferenceUrl {
            identifier: identifier.to_string(),
            url: reference.href.clone(),
        })?;
        tracing::debug!(input = %identifier, url = %url, "dereferencing input");

        let mut request = match &reference.body {
            Some(ReferenceBody::Reference(body_href)) => {
                let body = self.fetch_body_reference(identifier, body_href).await?;
                self.client.post(url.clone()).body(body)
            }
            Some(ReferenceBody::Inline(document)) => {
                self.client.post(url.clone()).body(document.clone())
            }
            None => self.client.get(url.clone()),
        };
        request = request.header(ACCEPT_ENCODING, "gzip");
        if let Some(mime_type) = &format.mime_type {
            request = request.header(CONTENT_TYPE, mime_type.as_str());
        }

        let response = request
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| self.unreachable(identifier, &reference.href, e))?;

        let data = self
            .read_decoded(identifier, &reference.href, response)
            .await?;

        parser
            .parse_bytes(&data, format)
            .map_err(|source| ResolveError::ParseFailure {
                identifier: identifier.to_string(),
                source,
            })
    }

    /// Fetch the secondary resource whose bytes become the POST body
    async fn fetch_body_reference(
        &self,
        identifier: &str,
        body_href: &str,
    ) -> Result<Vec<u8>, ResolveError> {
        let url = Url::parse(body_href).map_err(|_| ResolveError::InvalidReferenceUrl {
            identifier: identifier.to_string(),
            url: body_href.to_string(),
        })?;
        tracing::debug!(input = %identifier, url = %url, "fetching body reference");

        let response = self
            .client
            .get(url)
            .header(ACCEPT_ENCODING, "gzip")
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| self.unreachable(identifier, body_href, e))?;

        self.read_decoded(identifier, body_href, response).await
    }

    /// Read a response body, gunzipping when the response declares it
    async fn read_decoded(
        &self,
        identifier: &str,
        url: &str,
        response: Response,
    ) -> Result<Vec<u8>, ResolveError> {
        let gzipped = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("gzip"))
            .unwrap_or(false);

        let body = response
            .bytes()
            .await
            .map_err(|e| self.unreachable(identifier, url, e))?;

        if gzipped {
            let mut decoded = Vec::new();
            GzDecoder::new(body.as_ref())
                .read_to_end(&mut decoded)
                .map_err(|e| ResolveError::ReferenceUnreachable {
                    identifier: identifier.to_string(),
                    url: url.to_string(),
                    reason: format!("gzip decoding failed: {e}"),
                })?;
            Ok(decoded)
        } else {
            Ok(body.to_vec())
        }
    }

    fn unreachable(&self, identifier: &str, url: &str, error: reqwest::Error) -> ResolveError {
        ResolveError::ReferenceUnreachable {
            identifier: identifier.to_string(),
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}
