// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Meridian WPS Boundary Layer
//!
//! Keeps a local mirror of a remotely published algorithm catalog in sync
//! and resolves the heterogeneous inputs of an execute request into a
//! uniform in-memory value set for the execution engine.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Catalog feed synchronization + execute-input resolution

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
