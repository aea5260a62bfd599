use crate::core::{Pipeline, Stage};
use crate::domain::model::PipelineState;
use crate::utils::error::{EtlError, Result};
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub rows_in: usize,
    pub rows_out: usize,
    pub outputs: Vec<String>,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub pipeline: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub final_state: PipelineState,
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Drives a pipeline through `Start -> Retrieved -> ... -> Checked -> End`.
///
/// Stages run one at a time; the first failure stops the run and is returned
/// as `StageFailedError` carrying the stage name. Nothing is retried.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    name: String,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            name: "loan_data_pipeline".to_string(),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        let run_id = format!("{}-{}", self.name, started_at.format("%Y%m%dT%H%M%S"));
        tracing::info!("🚀 Starting run {}", run_id);

        let mut state = PipelineState::Start;
        let mut stages = Vec::with_capacity(Stage::ALL.len());

        while let Some(stage) = state.next_stage() {
            tracing::info!("▶️  Stage {} ({:?})", stage, state);
            let timer = Instant::now();

            let output = self.pipeline.run_stage(stage).await.map_err(|e| {
                tracing::error!("❌ Stage {} failed: {}", stage, e);
                EtlError::StageFailedError {
                    stage,
                    source: Box::new(e),
                }
            })?;

            let duration = timer.elapsed();
            tracing::debug!(
                "Stage {} finished in {:?}: {} rows in, {} rows out",
                stage,
                duration,
                output.rows_in,
                output.rows_out
            );
            self.monitor.log_stats(stage.name());

            stages.push(StageReport {
                stage,
                rows_in: output.rows_in,
                rows_out: output.rows_out,
                outputs: output.outputs,
                duration_ms: duration.as_millis(),
            });
            state = state.advance();
        }

        let final_state = state.advance();
        self.monitor.log_final_stats();
        tracing::info!("🏁 Run {} reached {:?}", run_id, final_state);

        Ok(RunReport {
            run_id,
            pipeline: self.name.clone(),
            started_at,
            finished_at: Utc::now(),
            final_state,
            stages,
        })
    }
}
