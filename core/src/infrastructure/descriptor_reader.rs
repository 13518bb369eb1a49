// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Descriptor File Reader
//!
//! Reads one algorithm descriptor document from the mirror. Descriptors
//! declare an identifier, the container the algorithm runs in and the
//! runtime components it requires:
//!
//! ```xml
//! <AlgorithmDescriptor>
//!   <Identifier>org.example.buffer</Identifier>
//!   <ContainerType>urn:meridian:container:python-3</ContainerType>
//!   <RequiredRuntimeComponent>urn:meridian:component:gdal</RequiredRuntimeComponent>
//! </AlgorithmDescriptor>
//! ```
//!
//! Reading is lenient: unknown elements are ignored and a missing
//! identifier falls back to the file stem, so a sparse descriptor still
//! enters the catalog.

use crate::domain::catalog::AlgorithmDescriptor;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use thiserror::Error;

/// Descriptor reading errors
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read descriptor {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed descriptor {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Read one descriptor file into an [`AlgorithmDescriptor`]
pub fn read_descriptor(
    path: &Path,
    mirror_root: &Path,
) -> Result<AlgorithmDescriptor, DescriptorError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut reader = Reader::from_str(&raw);

    let mut identifier: Option<String> = None;
    let mut container_type: Option<String> = None;
    let mut required_components: Vec<String> = Vec::new();
    // Element whose text content is being collected
    let mut current: Option<DescriptorField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = match e.local_name().as_ref() {
                    b"Identifier" => Some(DescriptorField::Identifier),
                    b"ContainerType" => Some(DescriptorField::ContainerType),
                    b"RequiredRuntimeComponent" => Some(DescriptorField::RequiredComponent),
                    _ => None,
                };
            }
            Ok(Event::Text(t)) => {
                if let Some(field) = current {
                    let text = t
                        .unescape()
                        .map_err(|e| DescriptorError::Malformed {
                            path: path.display().to_string(),
                            reason: e.to_string(),
                        })?
                        .trim()
                        .to_string();
                    if !text.is_empty() {
                        match field {
                            DescriptorField::Identifier => identifier = Some(text),
                            DescriptorField::ContainerType => container_type = Some(text),
                            DescriptorField::RequiredComponent => required_components.push(text),
                        }
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DescriptorError::Malformed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    let identifier = identifier.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    });

    Ok(AlgorithmDescriptor {
        identifier,
        container_type,
        required_components,
        source_path: path.to_path_buf(),
        mirror_root: mirror_root.to_path_buf(),
    })
}

#[derive(Debug, Clone, Copy)]
enum DescriptorField {
    Identifier,
    ContainerType,
    RequiredComponent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_descriptor(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_full_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(
            dir.path(),
            "buffer.xml",
            r#"<AlgorithmDescriptor>
  <Identifier>org.example.buffer</Identifier>
  <ContainerType>urn:meridian:container:python-3</ContainerType>
  <RequiredRuntimeComponent>urn:meridian:component:gdal</RequiredRuntimeComponent>
  <RequiredRuntimeComponent>urn:meridian:component:proj</RequiredRuntimeComponent>
</AlgorithmDescriptor>"#,
        );

        let descriptor = read_descriptor(&path, dir.path()).unwrap();
        assert_eq!(descriptor.identifier, "org.example.buffer");
        assert_eq!(
            descriptor.container_type.as_deref(),
            Some("urn:meridian:container:python-3")
        );
        assert_eq!(descriptor.required_components.len(), 2);
        assert_eq!(descriptor.mirror_root, dir.path());
    }

    #[test]
    fn test_missing_identifier_falls_back_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(
            dir.path(),
            "reproject.xml",
            "<AlgorithmDescriptor><ContainerType>urn:c</ContainerType></AlgorithmDescriptor>",
        );

        let descriptor = read_descriptor(&path, dir.path()).unwrap();
        assert_eq!(descriptor.identifier, "reproject");
        assert!(descriptor.required_components.is_empty());
    }

    #[test]
    fn test_malformed_descriptor_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(dir.path(), "broken.xml", "<AlgorithmDescriptor><Id></Alg>");

        assert!(matches!(
            read_descriptor(&path, dir.path()).unwrap_err(),
            DescriptorError::Malformed { .. }
        ));
    }
}
