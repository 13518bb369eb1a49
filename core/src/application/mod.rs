// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application Layer
//!
//! Per-request orchestration: turning an execute request's input list
//! into the value set the execution engine consumes.

pub mod input_resolver;

pub use input_resolver::InputResolver;
