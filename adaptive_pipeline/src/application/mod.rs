// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Layer
//!
//! The Conductor's front door: one use case per operation in the "service"
//! surface (create/start/decide/status/list/cancel), plus the
//! [`route_registry::RouteRegistry`] for non-sequential topologies. Each use
//! case holds the concrete [`crate::infrastructure::ControlPointManager`]
//! rather than a trait object — there is exactly one implementation of it
//! in this process, so the indirection would buy nothing.

pub mod route_registry;
pub mod use_cases;

pub use route_registry::RouteRegistry;
