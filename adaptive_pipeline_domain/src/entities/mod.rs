// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Entities
//!
//! Objects with identity that change state over time: the pipeline's own
//! [`PipelineContext`], the [`ControlPoint`] gates strung along it, the
//! [`Message`]s and [`Subscription`]s the broker shuttles between
//! components, the [`StagingEntry`] artifacts stages hand off to each
//! other, [`Route`]s for non-sequential topologies, and the
//! [`ComponentInfo`] the registry keeps per participant.

pub mod component_info;
pub mod control_point;
pub mod message;
pub mod pipeline_context;
pub mod route;
pub mod staging_entry;
pub mod subscription;

pub use component_info::{ComponentInfo, ComponentStatus};
pub use control_point::{ControlPoint, ControlPointStatus, Decision, DecisionType};
pub use message::{Message, MessageType};
pub use pipeline_context::{PipelineContext, PipelineStatus};
pub use route::{Route, RouteType};
pub use staging_entry::{StagingEntry, StagingState};
pub use subscription::{Subscription, SubscriptionPattern};
