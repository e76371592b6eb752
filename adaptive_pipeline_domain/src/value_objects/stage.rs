// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage, Department, and the Static Transition Table
//!
//! `Stage` is the closed set of processing stages a pipeline can occupy.
//! `Department` groups stages by the processor chain responsible for them.
//! The module also owns the two static maps the Control-Point Manager reads
//! on every transition: `transition_table()` (stage -> candidate next
//! stages) and `department_of()` (stage -> owning department).
//!
//! Topology is fixed in code, not user-defined — see the orchestrator's
//! non-goals. Back-edges from `UserReview` are how rework loops are
//! expressed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::OrchestratorError;

/// A named unit of processing within a pipeline.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Stage {
    Reception,
    Validation,
    QualityCheck,
    ContextAnalysis,
    Analytics,
    InsightGeneration,
    DecisionMaking,
    Recommendation,
    /// Ad-hoc or scheduled human-in-the-loop gate; always `requires_decision`.
    UserReview,
    ReportGeneration,
    /// Terminal stage. Never has outgoing transitions.
    Completion,
}

impl Stage {
    /// All stages, in declaration order. Used to validate a pipeline
    /// config's `stage_sequence` and to size the `retry_count` map.
    pub const ALL: [Stage; 11] = [
        Stage::Reception,
        Stage::Validation,
        Stage::QualityCheck,
        Stage::ContextAnalysis,
        Stage::Analytics,
        Stage::InsightGeneration,
        Stage::DecisionMaking,
        Stage::Recommendation,
        Stage::UserReview,
        Stage::ReportGeneration,
        Stage::Completion,
    ];

    /// Whether this stage has no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        self == Stage::Completion
    }

    /// The department responsible for dispatching work at this stage.
    pub fn department(self) -> Department {
        department_of(self)
    }

    /// Candidate next stages, in priority order (`approve` always selects
    /// `candidates[0]`).
    pub fn candidates(self) -> &'static [Stage] {
        transition_table(self)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Reception => "RECEPTION",
            Stage::Validation => "VALIDATION",
            Stage::QualityCheck => "QUALITY_CHECK",
            Stage::ContextAnalysis => "CONTEXT_ANALYSIS",
            Stage::Analytics => "ANALYTICS",
            Stage::InsightGeneration => "INSIGHT_GENERATION",
            Stage::DecisionMaking => "DECISION_MAKING",
            Stage::Recommendation => "RECOMMENDATION",
            Stage::UserReview => "USER_REVIEW",
            Stage::ReportGeneration => "REPORT_GENERATION",
            Stage::Completion => "COMPLETION",
        };
        write!(f, "{s}")
    }
}

/// The department (manager/handler/processor chain) that owns one or more
/// stages. `Review` stands in for the external human actor that resolves a
/// `UserReview` control point; the orchestrator still publishes
/// `CONTROL_POINT_REACHED` to it like any other department.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Department {
    Ingestion,
    Quality,
    Analytics,
    Insight,
    Decision,
    Recommendation,
    Review,
    Report,
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Department::Ingestion => "ingestion",
            Department::Quality => "quality",
            Department::Analytics => "analytics",
            Department::Insight => "insight",
            Department::Decision => "decision",
            Department::Recommendation => "recommendation",
            Department::Review => "review",
            Department::Report => "report",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Department {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ingestion" => Ok(Department::Ingestion),
            "quality" => Ok(Department::Quality),
            "analytics" => Ok(Department::Analytics),
            "insight" => Ok(Department::Insight),
            "decision" => Ok(Department::Decision),
            "recommendation" => Ok(Department::Recommendation),
            "review" => Ok(Department::Review),
            "report" => Ok(Department::Report),
            other => Err(OrchestratorError::validation_error(format!("unknown department: {other:?}"))),
        }
    }
}

/// The static stage -> candidate-next-stages map.
///
/// `approve` always takes `[0]`; `rework` jumps to an explicit earlier
/// stage (validated by the caller against [`predecessors`]); `reject`
/// never consults this table.
///
/// `QUALITY_CHECK` and `DECISION_MAKING` each carry a detour candidate
/// (`CONTEXT_ANALYSIS`/`ANALYTICS`, `RECOMMENDATION`) that is not first in
/// line — the default all-approve path goes straight to
/// `INSIGHT_GENERATION` and `REPORT_GENERATION` respectively. A processor
/// that wants the detour requests it explicitly; `approve` alone never
/// takes it.
pub fn transition_table(stage: Stage) -> &'static [Stage] {
    use Stage::*;
    match stage {
        Reception => &[Validation],
        Validation => &[QualityCheck],
        QualityCheck => &[InsightGeneration, UserReview, ContextAnalysis],
        ContextAnalysis => &[Analytics],
        Analytics => &[InsightGeneration],
        InsightGeneration => &[DecisionMaking, UserReview],
        DecisionMaking => &[ReportGeneration, Recommendation],
        Recommendation => &[ReportGeneration],
        UserReview => &[QualityCheck, InsightGeneration, ReportGeneration, Completion],
        ReportGeneration => &[Completion],
        Completion => &[],
    }
}

/// The static stage -> department map.
pub fn department_of(stage: Stage) -> Department {
    use Stage::*;
    match stage {
        Reception | Validation => Department::Ingestion,
        QualityCheck => Department::Quality,
        ContextAnalysis | Analytics => Department::Analytics,
        InsightGeneration => Department::Insight,
        DecisionMaking => Department::Decision,
        Recommendation => Department::Recommendation,
        UserReview => Department::Review,
        ReportGeneration | Completion => Department::Report,
    }
}

/// Every stage `S` whose candidate set contains `target` — used by
/// `create_pipeline` to derive `stage_dependencies`, and by `rework` to
/// validate that `rework_stage` is actually earlier in the flow.
pub fn predecessors(target: Stage) -> Vec<Stage> {
    Stage::ALL
        .iter()
        .copied()
        .filter(|s| transition_table(*s).contains(&target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_has_no_candidates() {
        assert!(transition_table(Stage::Completion).is_empty());
        assert!(Stage::Completion.is_terminal());
    }

    #[test]
    fn quality_check_approve_path_goes_to_insight_generation() {
        assert_eq!(transition_table(Stage::QualityCheck)[0], Stage::InsightGeneration);
    }

    #[test]
    fn quality_check_still_lists_context_analysis_as_a_detour() {
        assert!(transition_table(Stage::QualityCheck).contains(&Stage::ContextAnalysis));
    }

    #[test]
    fn user_review_supports_back_edges() {
        let candidates = transition_table(Stage::UserReview);
        assert!(candidates.contains(&Stage::QualityCheck));
        assert!(candidates.contains(&Stage::InsightGeneration));
    }

    #[test]
    fn predecessors_of_quality_check_include_validation_and_user_review() {
        let preds = predecessors(Stage::QualityCheck);
        assert!(preds.contains(&Stage::Validation));
        assert!(preds.contains(&Stage::UserReview));
        assert_eq!(preds.len(), 2);
    }

    #[test]
    fn reception_has_no_predecessors() {
        assert!(predecessors(Stage::Reception).is_empty());
    }

    #[test]
    fn every_stage_maps_to_a_department() {
        for stage in Stage::ALL {
            let _ = department_of(stage);
        }
    }
}
