// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for reference dereferencing
//!
//! Cover the HTTP contract of reference inputs: gzip negotiation and
//! transparent decompression, body forwarding (inline and via a second
//! body-reference URL) and the error taxonomy for broken references.

use flate2::write::GzEncoder;
use flate2::Compression;
use meridian_core::domain::config::HttpConfig;
use meridian_core::domain::errors::ResolveError;
use meridian_core::domain::inputs::{ComplexValue, Format, InputReference, ReferenceBody};
use meridian_core::infrastructure::{build_http_client, GenericXmlParser, ReferenceFetcher};
use std::io::Write;

const DOCUMENT: &str = "<gml:Point xmlns:gml=\"http://www.opengis.net/gml\">\
                        <gml:pos>7.1 51.5</gml:pos></gml:Point>";

fn fetcher() -> ReferenceFetcher {
    ReferenceFetcher::new(build_http_client(&HttpConfig::default()).unwrap())
}

fn xml_format() -> Format {
    Format {
        schema: None,
        mime_type: Some("text/xml".to_string()),
        encoding: None,
    }
}

fn reference(href: String) -> InputReference {
    InputReference {
        href,
        format: xml_format(),
        body: None,
    }
}

fn gzipped(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[tokio::test]
async fn test_plain_get_sends_negotiation_headers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/data")
        .match_header("accept-encoding", "gzip")
        .match_header("content-type", "text/xml")
        .with_body(DOCUMENT)
        .create_async()
        .await;

    let parser = GenericXmlParser::new();
    let value = fetcher()
        .fetch(
            "geometry",
            &reference(format!("{}/data", server.url())),
            &xml_format(),
            &parser,
        )
        .await
        .unwrap();

    mock.assert_async().await;
    match value {
        ComplexValue::Document(doc) => assert_eq!(doc.root_element, "Point"),
        other => panic!("expected document, got {other:?}"),
    }
}

#[tokio::test]
async fn test_gzip_response_is_decompressed_before_parsing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/gz")
        .with_header("content-encoding", "gzip")
        .with_body(gzipped(DOCUMENT.as_bytes()))
        .create_async()
        .await;
    server
        .mock("GET", "/plain")
        .with_body(DOCUMENT)
        .create_async()
        .await;

    let parser = GenericXmlParser::new();
    let from_gzip = fetcher()
        .fetch(
            "geometry",
            &reference(format!("{}/gz", server.url())),
            &xml_format(),
            &parser,
        )
        .await
        .unwrap();
    let from_plain = fetcher()
        .fetch(
            "geometry",
            &reference(format!("{}/plain", server.url())),
            &xml_format(),
            &parser,
        )
        .await
        .unwrap();

    // Identical content must parse to the same logical result.
    assert_eq!(from_gzip, from_plain);
}

#[tokio::test]
async fn test_inline_body_is_posted_verbatim() {
    let body = "<query><limit>10</limit></query>";
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/wfs")
        .match_header("accept-encoding", "gzip")
        .match_body(mockito::Matcher::Exact(body.to_string()))
        .with_body(DOCUMENT)
        .create_async()
        .await;

    let mut reference = reference(format!("{}/wfs", server.url()));
    reference.body = Some(ReferenceBody::Inline(body.to_string()));

    let parser = GenericXmlParser::new();
    fetcher()
        .fetch("geometry", &reference, &xml_format(), &parser)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_body_reference_round_trip() {
    let body = "<filter><bbox>0 0 1 1</bbox></filter>";
    let mut server = mockito::Server::new_async().await;

    // The body reference is itself gzip-compressed; the bytes POSTed to
    // the primary URL must equal the decompressed content.
    let body_mock = server
        .mock("GET", "/body")
        .match_header("accept-encoding", "gzip")
        .with_header("content-encoding", "gzip")
        .with_body(gzipped(body.as_bytes()))
        .create_async()
        .await;
    let primary = server
        .mock("POST", "/wfs")
        .match_body(mockito::Matcher::Exact(body.to_string()))
        .with_body(DOCUMENT)
        .create_async()
        .await;

    let mut reference = reference(format!("{}/wfs", server.url()));
    reference.body = Some(ReferenceBody::Reference(format!("{}/body", server.url())));

    let parser = GenericXmlParser::new();
    let value = fetcher()
        .fetch("geometry", &reference, &xml_format(), &parser)
        .await
        .unwrap();

    body_mock.assert_async().await;
    primary.assert_async().await;
    assert!(matches!(value, ComplexValue::Document(_)));
}

#[tokio::test]
async fn test_malformed_href_is_invalid_reference_url() {
    let parser = GenericXmlParser::new();
    let err = fetcher()
        .fetch(
            "geometry",
            &reference("::not a url::".to_string()),
            &xml_format(),
            &parser,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::InvalidReferenceUrl { .. }));
    assert_eq!(err.identifier(), "geometry");
}

#[tokio::test]
async fn test_http_error_is_reference_unreachable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let parser = GenericXmlParser::new();
    let err = fetcher()
        .fetch(
            "geometry",
            &reference(format!("{}/missing", server.url())),
            &xml_format(),
            &parser,
        )
        .await
        .unwrap_err();

    match err {
        ResolveError::ReferenceUnreachable { identifier, url, .. } => {
            assert_eq!(identifier, "geometry");
            assert!(url.contains("/missing"));
        }
        other => panic!("expected ReferenceUnreachable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_payload_is_parse_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/data")
        .with_body("<broken><xml>")
        .create_async()
        .await;

    let parser = GenericXmlParser::new();
    let err = fetcher()
        .fetch(
            "geometry",
            &reference(format!("{}/data", server.url())),
            &xml_format(),
            &parser,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::ParseFailure { .. }));
}

#[tokio::test]
async fn test_corrupt_gzip_is_reference_unreachable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/gz")
        .with_header("content-encoding", "gzip")
        .with_body(b"not gzip at all".to_vec())
        .create_async()
        .await;

    let parser = GenericXmlParser::new();
    let err = fetcher()
        .fetch(
            "geometry",
            &reference(format!("{}/gz", server.url())),
            &xml_format(),
            &parser,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::ReferenceUnreachable { .. }));
}
