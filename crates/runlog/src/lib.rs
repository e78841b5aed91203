// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! runlog library
//!
//! This module exports the command line configuration and the command
//! renderers of the runlog binary for use in integration tests.

pub mod config;
pub mod render;
