use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use extract::{
    ExtractError, ExtractionMode, Measurement, OllamaChatClient, ResponseOutput, ServerTimings,
};

use crate::config::ModelGroup;
use crate::corpus::InputText;
use crate::models::ModelController;
use crate::storage::check_distinct_file_names;

/// One timed request for a (model, input text) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub model: String,
    pub extraction_type: ExtractionMode,
    pub num_tokens: usize,
    /// Wall-clock seconds; `None` when the request never completed
    pub processing_time: Option<f64>,
    pub response_status: Option<u16>,
    pub output: ResponseOutput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_timings: Option<ServerTimings>,
    pub text_id: String,
}

impl BenchmarkResult {
    pub fn from_measurement(measurement: Measurement, text_id: &str) -> Self {
        Self {
            model: measurement.model,
            extraction_type: measurement.mode,
            num_tokens: measurement.num_tokens,
            processing_time: measurement.processing_time,
            response_status: measurement.response_status,
            output: measurement.output,
            server_timings: measurement.server_timings,
            text_id: text_id.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.output.is_failure()
    }
}

/// Models for one extraction mode, after the mode tag has been checked
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPlan {
    pub mode: ExtractionMode,
    pub models: Vec<String>,
}

/// Resolve configured mode tags. Any unknown tag fails the whole plan.
pub fn plan_runs(groups: &[ModelGroup]) -> Result<Vec<ModelPlan>, ExtractError> {
    groups
        .iter()
        .map(|group| -> Result<ModelPlan, ExtractError> {
            Ok(ModelPlan {
                mode: group.mode.parse()?,
                models: group.models.clone(),
            })
        })
        .collect()
}

pub struct Benchmarker<C> {
    client: OllamaChatClient,
    controller: C,
}

impl<C: ModelController> Benchmarker<C> {
    pub fn new(client: OllamaChatClient, controller: C) -> Self {
        Self { client, controller }
    }

    /// Every model of every mode against every text, one request at a time.
    /// Models are stopped before the run and after each model's pass.
    pub async fn run_benchmark(
        &self,
        texts: &[InputText],
        groups: &[ModelGroup],
    ) -> Result<Vec<BenchmarkResult>> {
        let plans = plan_runs(groups)?;
        check_distinct_file_names(
            plans
                .iter()
                .flat_map(|p| p.models.iter().map(String::as_str)),
        )?;
        check_unique_ids(texts)?;

        let total: usize = plans.iter().map(|p| p.models.len()).sum::<usize>() * texts.len();
        info!(requests = total, texts = texts.len(), "Running benchmark");

        self.controller.stop_running_models().await;

        let mut results = Vec::with_capacity(total);
        for plan in &plans {
            info!(mode = %plan.mode, models = plan.models.len(), "Testing extraction mode");

            for model in &plan.models {
                for input in texts {
                    let measurement = self
                        .client
                        .run_extraction(model, &input.text, plan.mode)
                        .await;
                    results.push(BenchmarkResult::from_measurement(measurement, &input.text_id));
                }
                self.controller.stop_running_models().await;
            }
        }

        Ok(results)
    }
}

fn check_unique_ids(texts: &[InputText]) -> Result<()> {
    let mut seen = HashSet::new();
    for input in texts {
        if !seen.insert(input.text_id.as_str()) {
            anyhow::bail!("Duplicate text_id in inputs: {}", input.text_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_runs() {
        let groups = vec![
            ModelGroup {
                mode: "default".to_string(),
                models: vec!["a".to_string()],
            },
            ModelGroup {
                mode: "nuextract".to_string(),
                models: vec![],
            },
        ];
        let plans = plan_runs(&groups).unwrap();
        assert_eq!(plans[0].mode, ExtractionMode::Default);
        assert_eq!(plans[1].mode, ExtractionMode::NuExtract);
    }

    #[test]
    fn test_plan_rejects_unknown_mode() {
        let groups = vec![
            ModelGroup {
                mode: "default".to_string(),
                models: vec!["a".to_string()],
            },
            ModelGroup {
                mode: "gliner".to_string(),
                models: vec!["b".to_string()],
            },
        ];
        assert_eq!(
            plan_runs(&groups).unwrap_err(),
            ExtractError::UnknownMode("gliner".to_string())
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let texts = vec![InputText::new("a", "x"), InputText::new("a", "y")];
        assert!(check_unique_ids(&texts).is_err());
        assert!(check_unique_ids(&texts[..1]).is_ok());
    }
}
