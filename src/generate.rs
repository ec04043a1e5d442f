//! The `generate` operation: validate, name, build, run.

use crate::command::build_command;
use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Result};
use crate::models::{GenerationOutcome, GenerationRequest, Source};
use crate::naming::{derive_project_name, final_output_path};
use crate::runner::execute_generation;

/// Handle one generation request end to end.
///
/// Spawns exactly one generator process. The returned
/// `final_output_directory` follows the `{output}/{name}/html` convention
/// and is not checked against the filesystem.
pub async fn generate(
    config: &GeneratorConfig,
    request: GenerationRequest,
) -> Result<GenerationOutcome> {
    let request = request.validate()?;

    let project_name = match &request.name {
        Some(name) => name.clone(),
        None => derive_project_name(&request.source).ok_or_else(|| {
            GenerateError::ClientInput(format!(
                "Project name not provided and could not be derived from source: {}",
                request.source.as_str()
            ))
        })?,
    };

    let expected_final_path = final_output_path(&request.output, &project_name);

    if let Source::Local(dir) = &request.source {
        tracing::warn!(
            local_dir = %dir,
            "processing a server-local directory; check permissions on this host"
        );
    }

    let invocation = build_command(config, &request);
    tracing::info!(command = %invocation, "executing generator");

    match execute_generation(&invocation).await {
        Ok(output) => {
            tracing::info!(project = %project_name, "generator finished successfully");
            tracing::debug!(stdout = %output.stdout, "generator stdout");
            if !output.stderr.is_empty() {
                tracing::warn!(stderr = %output.stderr, "generator stderr");
            }
            Ok(GenerationOutcome {
                message: "Tutorial generation completed successfully.".to_string(),
                final_output_directory: expected_final_path,
            })
        }
        Err(err) => {
            log_failure(&err);
            Err(err)
        }
    }
}

fn log_failure(err: &GenerateError) {
    match err {
        GenerateError::ProcessExecution {
            return_code,
            stdout,
            stderr,
        } => {
            tracing::error!(return_code, %stdout, %stderr, "generator failed");
        }
        other => tracing::error!(error = %other, "generator could not be run"),
    }
}
