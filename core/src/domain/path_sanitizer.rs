// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Archive Entry Path Sanitizer
//!
//! Feed archives are untrusted network input: entry names decide where
//! mirror files are written, so traversal components must never escape
//! the mirror root. This is a domain service because the boundary rule
//! is part of the mirror's integrity contract, not a technical concern.

use std::path::{Component, PathBuf};
use thiserror::Error;

/// Entry path sanitization errors
#[derive(Debug, Error)]
pub enum EntryPathError {
    #[error("archive entry escapes the mirror root: {0}")]
    Traversal(String),

    #[error("invalid archive entry path: {0}")]
    Invalid(String),

    #[error("archive entry path too long: {0}")]
    TooLong(String),
}

/// Validates archive entry names before extraction
pub struct EntryPathSanitizer {
    /// Maximum allowed entry name length
    max_len: usize,
}

impl EntryPathSanitizer {
    pub fn new() -> Self {
        Self { max_len: 4096 }
    }

    pub fn with_max_length(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Reduce an archive entry name to a safe mirror-relative path
    ///
    /// Rejects absolute paths, `..` components and null bytes; strips
    /// redundant `.` components. The returned path is always relative and
    /// stays under whatever root it is joined onto.
    pub fn sanitize(&self, entry_name: &str) -> Result<PathBuf, EntryPathError> {
        if entry_name.len() > self.max_len {
            return Err(EntryPathError::TooLong(entry_name.to_string()));
        }
        if entry_name.is_empty() || entry_name.contains('\0') {
            return Err(EntryPathError::Invalid(entry_name.to_string()));
        }

        let mut relative = PathBuf::new();
        for component in PathBuf::from(entry_name).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    tracing::warn!(
                        entry = %entry_name,
                        "archive entry contains '..' component"
                    );
                    return Err(EntryPathError::Traversal(entry_name.to_string()));
                }
                Component::RootDir | Component::Prefix(_) => {
                    tracing::warn!(
                        entry = %entry_name,
                        "archive entry uses an absolute path"
                    );
                    return Err(EntryPathError::Traversal(entry_name.to_string()));
                }
            }
        }

        if relative.as_os_str().is_empty() {
            return Err(EntryPathError::Invalid(entry_name.to_string()));
        }
        Ok(relative)
    }
}

impl Default for EntryPathSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
