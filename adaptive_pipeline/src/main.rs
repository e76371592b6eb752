// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Pipeline Orchestrator CLI
//!
//! Composition root: parses and validates CLI arguments through the
//! bootstrap layer, wires the infrastructure adapters, and dispatches one
//! use case per subcommand. Ctrl-C/SIGTERM trigger the bootstrap
//! [`ShutdownCoordinator`], which drains the broker and joins the staging
//! sweeper and control-point monitor before the process exits.

use std::sync::Arc;

use pipeline_orchestrator::application::use_cases::{
    CancelPipelineUseCase, CreatePipelineUseCase, GetStatusUseCase, HandleComponentCompleteUseCase,
    ListPipelinesUseCase, PipelineConfig, StartPipelineUseCase, SubmitDecisionUseCase,
};
use pipeline_orchestrator::infrastructure::config::OrchestratorConfig;
use pipeline_orchestrator::infrastructure::logging::observability::init_tracing;
use pipeline_orchestrator::infrastructure::{ComponentRegistry, ControlPointManager, MessageBroker, StagingManager};
use pipeline_orchestrator::OrchestratorError;
use pipeline_orchestrator_domain::entities::SubscriptionPattern;
use pipeline_orchestrator_domain::services::{ComponentRegistryPort, MessageBrokerPort, MessageCallback};
use pipeline_orchestrator_domain::Subscription;

use adaptive_pipeline_bootstrap::shutdown::ShutdownCoordinator;
use adaptive_pipeline_bootstrap::{bootstrap_cli, result_to_exit_code, ValidatedCommand};

const CONDUCTOR_TARGET: &str = "pipeline_service.conductor";

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("error: {err}");
            return std::process::ExitCode::from(64);
        }
    };

    let config = match OrchestratorConfig::load_from(cli.config.clone()) {
        Ok(config) => config,
        Err(err) => return result_to_exit_code::<()>(Err(err)),
    };

    if let Err(err) = init_tracing(&config.logging) {
        eprintln!("warning: failed to install tracing subscriber: {err}");
    }

    result_to_exit_code(run(cli.command, config).await)
}

async fn run(command: ValidatedCommand, config: OrchestratorConfig) -> Result<(), OrchestratorError> {
    let metrics = Arc::new(pipeline_orchestrator::infrastructure::metrics::OrchestratorMetrics::new()?);
    let registry: Arc<dyn ComponentRegistryPort> = Arc::new(ComponentRegistry::new());
    let broker: Arc<dyn MessageBrokerPort> = Arc::new(MessageBroker::new(
        config.broker.pool_size,
        config.broker.queue_bound,
        Arc::clone(&metrics),
        Arc::clone(&registry),
    ));
    let staging = Arc::new(StagingManager::new(
        config.staging.default_retention(),
        config.staging.cleanup_interval(),
        Arc::clone(&metrics),
    ));
    let cpm = Arc::new(ControlPointManager::new(config.control_point, Arc::clone(&broker), Arc::clone(&metrics)));

    let handle_component_complete = Arc::new(HandleComponentCompleteUseCase::new(Arc::clone(&cpm)));
    let pattern = SubscriptionPattern::new(CONDUCTOR_TARGET)?;
    broker
        .subscribe(Subscription::new("pipeline_service", pattern), handle_component_complete as Arc<dyn MessageCallback>)
        .await?;

    let shutdown = ShutdownCoordinator::new(std::time::Duration::from_secs(5));
    let signal_token = shutdown.token();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received shutdown signal");
        signal_token.cancel();
    });

    let outcome = dispatch(command, Arc::clone(&cpm)).await;

    shutdown.initiate_shutdown();
    staging.stop_sweeper();
    cpm.stop_monitor();
    broker.shutdown().await?;
    shutdown.complete_shutdown();

    outcome
}

async fn dispatch(command: ValidatedCommand, cpm: Arc<ControlPointManager>) -> Result<(), OrchestratorError> {
    match command {
        ValidatedCommand::Create { name, stages } => {
            let use_case = CreatePipelineUseCase::new(Arc::clone(&cpm));
            let config = PipelineConfig {
                name,
                stage_sequence: stages,
                metadata: Default::default(),
            };
            let (pipeline_id, control_point_id) = use_case.execute(config, None).await?;
            println!("pipeline_id: {pipeline_id}");
            println!("control_point_id: {control_point_id}");
            Ok(())
        }
        ValidatedCommand::Start { pipeline_id, input: _ } => {
            let use_case = StartPipelineUseCase::new(Arc::clone(&cpm));
            let control_point_id = use_case.execute(&pipeline_id, None).await?;
            println!("control_point_id: {control_point_id}");
            Ok(())
        }
        ValidatedCommand::Decide {
            pipeline_id,
            control_point_id,
            decision,
            decided_by,
        } => {
            let use_case = SubmitDecisionUseCase::new(Arc::clone(&cpm));
            let decision_type = match decision {
                adaptive_pipeline_bootstrap::cli::ValidatedDecision::Approve => {
                    pipeline_orchestrator_domain::entities::DecisionType::Approve
                }
                adaptive_pipeline_bootstrap::cli::ValidatedDecision::Rework { rework_stage } => {
                    pipeline_orchestrator_domain::entities::DecisionType::Rework { rework_stage }
                }
                adaptive_pipeline_bootstrap::cli::ValidatedDecision::Reject { reason } => {
                    pipeline_orchestrator_domain::entities::DecisionType::Reject { reason }
                }
            };
            use_case.execute(&pipeline_id, &control_point_id, decision_type, decided_by).await
        }
        ValidatedCommand::Status { pipeline_id } => {
            let use_case = GetStatusUseCase::new(Arc::clone(&cpm));
            let view = use_case.execute(&pipeline_id).await?;
            println!("current_stage: {}", view.current_stage);
            println!("status: {:?}", view.status);
            println!("active_control_points: {}", view.active_control_points.len());
            println!("history: {}", view.history.len());
            Ok(())
        }
        ValidatedCommand::List => {
            let use_case = ListPipelinesUseCase::new(Arc::clone(&cpm));
            for context in use_case.execute(None).await {
                println!("{} {} {:?}", context.pipeline_id, context.current_stage, context.status);
            }
            Ok(())
        }
        ValidatedCommand::Cancel { pipeline_id } => {
            let use_case = CancelPipelineUseCase::new(Arc::clone(&cpm));
            use_case.execute(&pipeline_id).await
        }
    }
}
