// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Services
//!
//! Port traits the infrastructure layer implements
//! ([`MessageBrokerPort`], [`StagingPort`], [`ComponentRegistryPort`]), plus
//! [`datetime_serde`], a pure serialization helper with no port of its own.

pub mod component_registry_port;
pub mod datetime_serde;
pub mod message_broker_port;
pub mod staging_port;

pub use component_registry_port::ComponentRegistryPort;
pub use message_broker_port::{MessageBrokerPort, MessageCallback};
pub use staging_port::StagingPort;
