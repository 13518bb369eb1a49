// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Algorithm Description Contract
//!
//! The resolver consumes the target algorithm's description to fill
//! defaults during content negotiation and literal typing. Descriptions
//! are produced by an external collaborator (the process repository);
//! only the fields the resolver consults are modeled here.

use crate::domain::inputs::Format;
use serde::{Deserialize, Serialize};

/// Description of one algorithm's interface, as seen by the resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmDescription {
    /// Algorithm identifier, also used to select algorithm-specific parsers
    pub identifier: String,

    /// Declared inputs, in declaration order
    #[serde(default)]
    pub inputs: Vec<InputDeclaration>,
}

impl AlgorithmDescription {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            inputs: Vec::new(),
        }
    }

    /// Look up the declaration for an input identifier
    pub fn input(&self, identifier: &str) -> Option<&InputDeclaration> {
        self.inputs.iter().find(|decl| decl.identifier == identifier)
    }
}

/// Declared defaults for one input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDeclaration {
    pub identifier: String,

    /// Default content negotiation tuple for complex inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<Format>,

    /// Default data type reference for literal inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal_data_type: Option<String>,
}

impl InputDeclaration {
    /// Declaration for a complex input with a default format
    pub fn complex(identifier: impl Into<String>, default_format: Format) -> Self {
        Self {
            identifier: identifier.into(),
            default_format: Some(default_format),
            literal_data_type: None,
        }
    }

    /// Declaration for a literal input with a default data type
    pub fn literal(identifier: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            default_format: None,
            literal_data_type: Some(data_type.into()),
        }
    }

    /// Declaration carrying no defaults at all
    pub fn bare(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            default_format: None,
            literal_data_type: None,
        }
    }
}
