// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Algorithm Catalog Model
//!
//! One [`AlgorithmDescriptor`] per descriptor file found in the feed
//! mirror; a [`CatalogSnapshot`] is the immutable, atomically published
//! collection the rest of the service queries. Snapshots are never
//! mutated after publish, so concurrent readers never race.

use std::path::{Path, PathBuf};

/// Descriptor of one algorithm published through the feed
///
/// Read-only after catalog load. Identity is the descriptor's source file
/// plus the mirror root; the root resolves resources the descriptor
/// references by relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmDescriptor {
    /// Algorithm identifier declared in the descriptor file
    pub identifier: String,

    /// URN of the container the algorithm runs in
    pub container_type: Option<String>,

    /// URNs of runtime components the algorithm requires
    pub required_components: Vec<String>,

    /// Path of the descriptor file inside the mirror
    pub source_path: PathBuf,

    /// Root of the mirror the descriptor was loaded from
    pub mirror_root: PathBuf,
}

impl AlgorithmDescriptor {
    /// Whether the declared container type is one the caller supports
    pub fn is_container(&self, supported_containers: &[&str]) -> bool {
        match &self.container_type {
            Some(container) => supported_containers.iter().any(|c| c == container),
            None => false,
        }
    }

    /// Whether every required runtime component is provided by the caller
    pub fn is_sufficient_runtime(&self, provided_components: &[&str]) -> bool {
        self.required_components
            .iter()
            .all(|required| provided_components.iter().any(|p| p == required))
    }

    /// Resolve a resource embedded in the descriptor by relative path
    pub fn resolve_resource(&self, relative: &str) -> PathBuf {
        self.mirror_root.join(relative)
    }

    /// Directory of the descriptor file itself
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_path.parent()
    }
}

/// Immutable, atomically published view of the feed's algorithms
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    descriptors: Vec<AlgorithmDescriptor>,
}

impl CatalogSnapshot {
    pub fn new(descriptors: Vec<AlgorithmDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn descriptors(&self) -> &[AlgorithmDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Pure capability filter over the snapshot
    ///
    /// Returns every descriptor whose container type is in
    /// `supported_containers` and whose required components are all present
    /// in `provided_components`. Never mutates the snapshot; callable
    /// concurrently.
    pub fn find_matching(
        &self,
        supported_containers: &[&str],
        provided_components: &[&str],
    ) -> Vec<&AlgorithmDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| {
                d.is_container(supported_containers) && d.is_sufficient_runtime(provided_components)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(
        identifier: &str,
        container: Option<&str>,
        required: &[&str],
    ) -> AlgorithmDescriptor {
        AlgorithmDescriptor {
            identifier: identifier.to_string(),
            container_type: container.map(str::to_string),
            required_components: required.iter().map(|s| s.to_string()).collect(),
            source_path: PathBuf::from(format!("/mirror/{identifier}.xml")),
            mirror_root: PathBuf::from("/mirror"),
        }
    }

    #[test]
    fn test_find_matching_filters_by_container_and_components() {
        let snapshot = CatalogSnapshot::new(vec![
            descriptor(
                "buffer",
                Some("urn:meridian:container:python-3"),
                &["urn:meridian:component:gdal"],
            ),
            descriptor(
                "reproject",
                Some("urn:meridian:container:java-17"),
                &["urn:meridian:component:geotools"],
            ),
            descriptor("orphan", None, &[]),
        ]);

        let matches = snapshot.find_matching(
            &["urn:meridian:container:python-3"],
            &["urn:meridian:component:gdal", "urn:meridian:component:proj"],
        );
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].identifier, "buffer");
    }

    #[test]
    fn test_missing_required_component_excludes_descriptor() {
        let snapshot = CatalogSnapshot::new(vec![descriptor(
            "buffer",
            Some("urn:meridian:container:python-3"),
            &["urn:meridian:component:gdal"],
        )]);

        let matches = snapshot.find_matching(&["urn:meridian:container:python-3"], &[]);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_resource_resolution_uses_mirror_root() {
        let d = descriptor("buffer", None, &[]);
        assert_eq!(
            d.resolve_resource("scripts/buffer.py"),
            PathBuf::from("/mirror/scripts/buffer.py")
        );
    }
}
