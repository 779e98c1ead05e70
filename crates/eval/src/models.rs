use std::future::Future;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Frees server-side model state between benchmark groups.
pub trait ModelController {
    /// Best-effort: implementations log problems instead of returning them.
    fn stop_running_models(&self) -> impl Future<Output = ()> + Send;
}

/// Drives the `ollama` CLI: `ollama ps` to list, `ollama stop` per model.
#[derive(Debug, Clone)]
pub struct OllamaCli {
    program: String,
}

impl OllamaCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn list_running(&self) -> Option<Vec<String>> {
        let output = match Command::new(&self.program).arg("ps").output().await {
            Ok(output) => output,
            Err(e) => {
                warn!(program = %self.program, error = %e, "Could not run model listing");
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Model listing failed"
            );
            return None;
        }

        Some(parse_ps_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Default for OllamaCli {
    fn default() -> Self {
        Self::new("ollama")
    }
}

impl ModelController for OllamaCli {
    async fn stop_running_models(&self) {
        info!("Stopping running Ollama models (if any)...");

        let Some(models) = self.list_running().await else {
            return;
        };

        for model in models {
            match Command::new(&self.program).arg("stop").arg(&model).status().await {
                Ok(status) if status.success() => debug!(model = %model, "Stopped model"),
                Ok(status) => warn!(model = %model, status = %status, "Model stop failed"),
                Err(e) => warn!(model = %model, error = %e, "Could not run model stop"),
            }
        }
    }
}

/// Used when stopping models is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopController;

impl ModelController for NoopController {
    async fn stop_running_models(&self) {}
}

/// Model names from `ollama ps` output: first column, header row skipped.
pub fn parse_ps_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
