// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Route Registry
//!
//! Conductor-owned table of [`Route`]s for non-sequential topologies
//! (parallel fan-out, conditional routing), orthogonal to the
//! control-point manager's own per-pipeline stage state: the sequential
//! flow never consults this registry, it only matters once a source stage
//! has more than one [`Route`] registered against it.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

use pipeline_orchestrator_domain::entities::Route;
use pipeline_orchestrator_domain::value_objects::Stage;

#[derive(Default)]
pub struct RouteRegistry {
    routes: RwLock<HashMap<Stage, Vec<Route>>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, route: Route) {
        self.routes.write().entry(route.source).or_default().push(route);
    }

    /// Every route declared for `source`, in registration order.
    pub fn routes_for(&self, source: Stage) -> Vec<Route> {
        self.routes.read().get(&source).cloned().unwrap_or_default()
    }

    /// Target stages unlocked by `source` completing with `metadata`,
    /// deduplicated across every matching route. Empty when no route is
    /// registered for `source` — callers fall back to
    /// [`Stage::candidates`](pipeline_orchestrator_domain::value_objects::Stage::candidates)
    /// in that case.
    pub fn resolve(&self, source: Stage, metadata: &HashMap<String, String>) -> Vec<Stage> {
        let routes = self.routes.read();
        let Some(candidates) = routes.get(&source) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for route in candidates.iter().filter(|route| route.matches(metadata)) {
            for &target in &route.targets {
                if seen.insert(target) {
                    targets.push(target);
                }
            }
        }
        targets
    }
}
