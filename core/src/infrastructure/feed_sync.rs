// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Feed Synchronizer
//!
//! Owns one (remote feed URL, local mirror directory) pair. Staleness is
//! detected through the remote resource's `Last-Modified` timestamp; on
//! change the mirror is replaced wholesale — unpacked into a staging
//! directory, swapped into place, then stamped — and the in-memory
//! catalog is rebuilt from the descriptor files found in the mirror root.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Timestamp-based mirror cache + catalog snapshot publish
//!
//! Refreshes are serialized: concurrent `sync()` callers queue behind a
//! single in-flight refresh. The published snapshot is immutable and
//! swapped atomically, so catalog readers never observe a half-rebuilt
//! state. When a fetch fails the previously published snapshot is
//! retained rather than rebuilding from a possibly inconsistent mirror.

use crate::domain::catalog::{AlgorithmDescriptor, CatalogSnapshot};
use crate::domain::config::FeedConfig;
use crate::domain::errors::FeedError;
use crate::domain::path_sanitizer::EntryPathSanitizer;
use crate::infrastructure::descriptor_reader::read_descriptor;
use parking_lot::RwLock;
use reqwest::header::{CONTENT_TYPE, LAST_MODIFIED};
use reqwest::{Client, Response, Url};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use zip::ZipArchive;

/// Archive content type the feed endpoint is expected to declare
const ZIP_MIME_TYPE: &str = "application/zip";

/// Stamp file recording the mirrored feed's `Last-Modified`, in millis
///
/// Written only after a successful full replace; deleted together with
/// the mirror, so a torn replace can never present itself as fresh.
const STAMP_FILE: &str = ".feed-stamp";

/// What a feed probe learned about the remote resource
#[derive(Debug)]
struct FeedProbe {
    last_modified: Option<i64>,
}

pub struct FeedSynchronizer {
    config: FeedConfig,
    client: Client,

    /// Currently published catalog; swapped atomically on rebuild
    snapshot: RwLock<Arc<CatalogSnapshot>>,

    /// Serializes refreshes: one in-flight `sync()` at a time
    refresh: Mutex<()>,
}

impl FeedSynchronizer {
    /// Create a synchronizer over a pre-configured HTTP client
    ///
    /// The catalog starts empty; call [`sync`](Self::sync) to populate it.
    pub fn new(config: FeedConfig, client: Client) -> Self {
        Self {
            config,
            client,
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::default())),
            refresh: Mutex::new(()),
        }
    }

    /// The currently published catalog snapshot
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Pure capability filter over the current snapshot
    ///
    /// See [`CatalogSnapshot::find_matching`]; callable concurrently with
    /// itself and with `sync()`.
    pub fn find_matching(
        &self,
        supported_containers: &[&str],
        provided_components: &[&str],
    ) -> Vec<AlgorithmDescriptor> {
        self.snapshot()
            .find_matching(supported_containers, provided_components)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Synchronize the mirror and republish the catalog
    ///
    /// Idempotent: with an unchanged remote timestamp the fetch is skipped
    /// entirely and the catalog is rebuilt from the existing mirror. On
    /// fetch failure the previously published snapshot stays in place.
    pub async fn sync(&self) -> Result<(), FeedError> {
        let _refresh = self.refresh.lock().await;

        let probe = self.probe_feed().await?;
        let local_stamp = self.read_stamp();
        let mirror_exists = self.config.mirror_dir.is_dir();

        let fresh = mirror_exists
            && probe.last_modified.is_some()
            && local_stamp == probe.last_modified;

        if fresh {
            tracing::info!(
                mirror = %self.config.mirror_dir.display(),
                "feed unchanged, reusing mirror"
            );
        } else {
            if mirror_exists {
                tracing::info!(
                    local = local_stamp.unwrap_or_default(),
                    remote = probe.last_modified.unwrap_or_default(),
                    "feed timestamp changed, replacing mirror"
                );
            }
            if let Err(e) = self.replace_mirror(probe.last_modified).await {
                tracing::error!(feed = %self.config.feed_url, error = %e, "feed fetch failed, retaining previous catalog");
                return Err(e);
            }
        }

        self.rebuild_catalog();
        Ok(())
    }

    /// Probe the feed URL for content type and last-modified timestamp
    async fn probe_feed(&self) -> Result<FeedProbe, FeedError> {
        let url = Url::parse(&self.config.feed_url).map_err(|e| FeedError::Unreachable {
            url: self.config.feed_url.clone(),
            reason: format!("invalid feed URL: {e}"),
        })?;

        let response = self
            .client
            .head(url)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| FeedError::Unreachable {
                url: self.config.feed_url.clone(),
                reason: e.to_string(),
            })?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        if !content_type
            .map(|ct| ct.starts_with(ZIP_MIME_TYPE))
            .unwrap_or(false)
        {
            tracing::warn!(
                feed = %self.config.feed_url,
                content_type = content_type.unwrap_or("<none>"),
                "uncommon content type at feed URL, proceeding anyway"
            );
        }

        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|raw| match chrono::DateTime::parse_from_rfc2822(raw) {
                Ok(ts) => Some(ts.timestamp_millis()),
                Err(e) => {
                    tracing::warn!(raw = %raw, error = %e, "unparseable Last-Modified header");
                    None
                }
            });

        Ok(FeedProbe { last_modified })
    }

    /// Fetch the feed archive and replace the mirror wholesale
    ///
    /// The archive is unpacked into a staging directory first; the mirror
    /// is only touched once unpacking succeeded in full.
    async fn replace_mirror(&self, stamp: Option<i64>) -> Result<(), FeedError> {
        let response = self
            .client
            .get(&self.config.feed_url)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| self.fetch_failed(e))?;
        let archive: bytes::Bytes = response.bytes().await.map_err(|e| self.fetch_failed(e))?;

        let staging = self.staging_dir();
        if staging.exists() {
            // Leftover from an interrupted run
            fs::remove_dir_all(&staging).map_err(|e| self.fetch_failed(e))?;
        }

        if let Err(e) = self.unpack_archive(&archive, &staging) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        if self.config.mirror_dir.exists() {
            fs::remove_dir_all(&self.config.mirror_dir).map_err(|e| self.fetch_failed(e))?;
        }
        if let Some(parent) = self.config.mirror_dir.parent() {
            fs::create_dir_all(parent).map_err(|e| self.fetch_failed(e))?;
        }
        fs::rename(&staging, &self.config.mirror_dir).map_err(|e| self.fetch_failed(e))?;

        if let Some(stamp) = stamp {
            self.write_stamp(stamp)?;
        }
        tracing::info!(
            mirror = %self.config.mirror_dir.display(),
            stamp = stamp.unwrap_or_default(),
            "mirror replaced"
        );
        Ok(())
    }

    /// Unpack every non-directory archive entry under `staging`
    fn unpack_archive(&self, archive: &[u8], staging: &Path) -> Result<(), FeedError> {
        let mut archive =
            ZipArchive::new(Cursor::new(archive)).map_err(|e| self.fetch_failed(e))?;
        let sanitizer = EntryPathSanitizer::new();

        fs::create_dir_all(staging).map_err(|e| self.fetch_failed(e))?;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| self.fetch_failed(e))?;
            if entry.is_dir() {
                continue;
            }
            let relative = sanitizer
                .sanitize(entry.name())
                .map_err(|e| self.fetch_failed(e))?;
            let destination = staging.join(relative);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent).map_err(|e| self.fetch_failed(e))?;
            }
            let mut file = fs::File::create(&destination).map_err(|e| self.fetch_failed(e))?;
            std::io::copy(&mut entry, &mut file).map_err(|e| self.fetch_failed(e))?;
            tracing::debug!(path = %destination.display(), "unpacked feed entry");
        }
        Ok(())
    }

    /// Rebuild and publish the catalog from the mirror's descriptor files
    ///
    /// Descriptor files live directly in the mirror root and are matched
    /// by suffix, case-sensitively. The new snapshot replaces the prior
    /// one in full with a single pointer swap.
    fn rebuild_catalog(&self) {
        let mut descriptors: Vec<AlgorithmDescriptor> = Vec::new();

        match fs::read_dir(&self.config.mirror_dir) {
            Ok(entries) => {
                let mut paths: Vec<PathBuf> = entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.is_file() && self.is_descriptor(p))
                    .collect();
                paths.sort();

                for path in paths {
                    match read_descriptor(&path, &self.config.mirror_dir) {
                        Ok(descriptor) => descriptors.push(descriptor),
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable descriptor");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    mirror = %self.config.mirror_dir.display(),
                    error = %e,
                    "mirror not readable, publishing empty catalog"
                );
            }
        }

        tracing::info!(algorithms = descriptors.len(), "catalog rebuilt");
        *self.snapshot.write() = Arc::new(CatalogSnapshot::new(descriptors));
    }

    fn is_descriptor(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(&self.config.descriptor_suffix))
            .unwrap_or(false)
    }

    fn staging_dir(&self) -> PathBuf {
        let mut name = self
            .config
            .mirror_dir
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".staging");
        self.config.mirror_dir.with_file_name(name)
    }

    fn stamp_path(&self) -> PathBuf {
        self.config.mirror_dir.join(STAMP_FILE)
    }

    fn read_stamp(&self) -> Option<i64> {
        fs::read_to_string(self.stamp_path())
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    fn write_stamp(&self, stamp: i64) -> Result<(), FeedError> {
        fs::write(self.stamp_path(), stamp.to_string()).map_err(|e| self.fetch_failed(e))
    }

    fn fetch_failed(&self, reason: impl ToString) -> FeedError {
        FeedError::FetchFailed {
            url: self.config.feed_url.clone(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::build_http_client;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn synchronizer(mirror: &Path) -> FeedSynchronizer {
        let config = FeedConfig::new("http://feeds.example.org/algorithms.zip", mirror);
        let client = build_http_client(&config.http).unwrap();
        FeedSynchronizer::new(config, client)
    }

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_unpack_writes_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        let sync = synchronizer(&mirror);

        let archive = zip_with(&[
            ("buffer.xml", "<AlgorithmDescriptor/>"),
            ("scripts/buffer.py", "print('hi')"),
        ]);
        sync.unpack_archive(&archive, &mirror).unwrap();

        assert!(mirror.join("buffer.xml").is_file());
        assert_eq!(
            fs::read_to_string(mirror.join("scripts/buffer.py")).unwrap(),
            "print('hi')"
        );
    }

    #[test]
    fn test_unpack_rejects_traversal_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        let sync = synchronizer(&mirror);

        let archive = zip_with(&[("../outside.xml", "<x/>")]);
        let result = sync.unpack_archive(&archive, &mirror);
        assert!(matches!(result.unwrap_err(), FeedError::FetchFailed { .. }));
        assert!(!dir.path().join("outside.xml").exists());
    }

    #[test]
    fn test_unpack_rejects_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        let sync = synchronizer(&mirror);

        let result = sync.unpack_archive(b"this is not a zip", &mirror);
        assert!(matches!(result.unwrap_err(), FeedError::FetchFailed { .. }));
    }

    #[test]
    fn test_rebuild_scans_mirror_root_only() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        fs::create_dir_all(mirror.join("nested")).unwrap();
        fs::write(
            mirror.join("buffer.xml"),
            "<AlgorithmDescriptor><Identifier>buffer</Identifier></AlgorithmDescriptor>",
        )
        .unwrap();
        fs::write(mirror.join("notes.txt"), "not a descriptor").unwrap();
        fs::write(mirror.join("nested/hidden.xml"), "<AlgorithmDescriptor/>").unwrap();

        let sync = synchronizer(&mirror);
        sync.rebuild_catalog();

        let snapshot = sync.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.descriptors()[0].identifier, "buffer");
    }

    #[test]
    fn test_descriptor_suffix_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        fs::create_dir_all(&mirror).unwrap();
        fs::write(mirror.join("UPPER.XML"), "<AlgorithmDescriptor/>").unwrap();

        let sync = synchronizer(&mirror);
        sync.rebuild_catalog();
        assert!(sync.snapshot().is_empty());
    }

    #[test]
    fn test_stamp_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        fs::create_dir_all(&mirror).unwrap();

        let sync = synchronizer(&mirror);
        assert_eq!(sync.read_stamp(), None);
        sync.write_stamp(1445412480000).unwrap();
        assert_eq!(sync.read_stamp(), Some(1445412480000));
    }
}
