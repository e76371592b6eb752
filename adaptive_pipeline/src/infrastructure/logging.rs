// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Logging
//!
//! Structured logging setup built on `tracing`/`tracing-subscriber`: JSON
//! output in production, human-readable in development, both carrying
//! `pipeline_id`/`control_point_id`/`stage` as structured fields rather than
//! interpolated into the message text.

pub mod observability;
pub use observability::{init_tracing, ObservabilityService};
