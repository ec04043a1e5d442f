//! Run the generator as a child process and classify how it ended.

use std::io::ErrorKind;
use tokio::process::Command;

use crate::command::CommandInvocation;
use crate::error::{GenerateError, Result};

/// Captured output of a successful run. Informational only.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Spawn `invocation`, wait for it to exit and capture both streams.
///
/// The child inherits this process's environment. There is no timeout.
pub async fn execute_generation(invocation: &CommandInvocation) -> Result<ProcessOutput> {
    check_script_exists(invocation)?;

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);
    if let Some(dir) = &invocation.working_dir {
        cmd.current_dir(dir);
    }

    let output = cmd.output().await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => GenerateError::Configuration(format!(
            "Error: Script '{}' or interpreter '{}' not found.",
            script_arg(invocation),
            invocation.program
        )),
        _ => GenerateError::Internal(e.to_string()),
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        return Err(GenerateError::ProcessExecution {
            // Killed by a signal: no exit code.
            return_code: output.status.code().unwrap_or(-1),
            stdout,
            stderr,
        });
    }

    Ok(ProcessOutput { stdout, stderr })
}

fn script_arg(invocation: &CommandInvocation) -> &str {
    invocation.args.first().map(String::as_str).unwrap_or_default()
}

fn check_script_exists(invocation: &CommandInvocation) -> Result<()> {
    let script = std::path::Path::new(script_arg(invocation));
    let resolved = match &invocation.working_dir {
        Some(dir) if script.is_relative() => dir.join(script),
        _ => script.to_path_buf(),
    };

    if resolved.exists() {
        Ok(())
    } else {
        Err(GenerateError::Configuration(format!(
            "Error: Script '{}' not found.",
            resolved.display()
        )))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn invocation(dir: &TempDir, script_body: &str, extra: &[&str]) -> CommandInvocation {
        let script = dir.path().join("gen.sh");
        fs::write(&script, script_body).unwrap();
        let mut args = vec![script.to_string_lossy().to_string()];
        args.extend(extra.iter().map(|s| s.to_string()));
        CommandInvocation {
            program: "sh".to_string(),
            args,
            working_dir: None,
        }
    }

    #[tokio::test]
    async fn test_success_captures_streams() {
        let tmp = TempDir::new().unwrap();
        let inv = invocation(&tmp, "echo \"args: $*\"\necho warn >&2\n", &["-o", "out"]);
        let out = execute_generation(&inv).await.unwrap();
        assert_eq!(out.stdout, "args: -o out\n");
        assert_eq!(out.stderr, "warn\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_keeps_code_and_streams() {
        let tmp = TempDir::new().unwrap();
        let inv = invocation(&tmp, "printf 'partial'\nprintf 'boom' >&2\nexit 3\n", &[]);
        match execute_generation(&inv).await.unwrap_err() {
            GenerateError::ProcessExecution {
                return_code,
                stdout,
                stderr,
            } => {
                assert_eq!(return_code, 3);
                assert_eq!(stdout, "partial");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let mut inv = invocation(&tmp, "exit 0\n", &[]);
        inv.program = "definitely-not-an-interpreter-xyz".to_string();
        let err = execute_generation(&inv).await.unwrap_err();
        assert!(matches!(err, GenerateError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_unrunnable_program_is_internal_error() {
        let tmp = TempDir::new().unwrap();
        let mut inv = invocation(&tmp, "exit 0\n", &[]);
        // A directory exists but cannot be executed: PermissionDenied, not NotFound.
        inv.program = tmp.path().to_string_lossy().to_string();
        let err = execute_generation(&inv).await.unwrap_err();
        assert!(matches!(err, GenerateError::Internal(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_missing_script_is_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let inv = CommandInvocation {
            program: "sh".to_string(),
            args: vec![tmp.path().join("nope.sh").to_string_lossy().to_string()],
            working_dir: None,
        };
        let err = execute_generation(&inv).await.unwrap_err();
        assert!(matches!(err, GenerateError::Configuration(_)));
        assert!(err.to_string().contains("nope.sh"));
    }

    #[tokio::test]
    async fn test_relative_script_resolves_against_working_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("gen.sh"), "pwd\n").unwrap();
        let inv = CommandInvocation {
            program: "sh".to_string(),
            args: vec!["gen.sh".to_string()],
            working_dir: Some(tmp.path().to_path_buf()),
        };
        let out = execute_generation(&inv).await.unwrap();
        assert!(!out.stdout.trim().is_empty());
    }
}
