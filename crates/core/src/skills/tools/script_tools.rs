//! # Script Tool
//!
//! `run_script` lets the developer check a snippet (date math, data
//! reshaping) before committing its component. Nothing downstream reads the
//! result; it only informs the model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::ToolSpec;
use crate::error::{ChartError, Result};

/// Captured output is cut to this many characters per stream
const MAX_OUTPUT_CHARS: usize = 8_000;

/// Interpreter used by `run_script`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptConfig {
    /// Executable, e.g. `python3`
    pub interpreter: String,
    /// Arguments placed before the snippet, e.g. `["-c"]`
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            args: vec!["-c".to_string()],
            timeout: Duration::from_secs(30),
        }
    }
}

/// Arguments for `run_script`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunScriptArgs {
    /// Source code of the snippet
    pub code: String,
}

/// Result of one snippet run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run a snippet with the configured interpreter
pub async fn run_script(config: &ScriptConfig, code: &str) -> Result<ScriptOutput> {
    let child = Command::new(&config.interpreter)
        .args(&config.args)
        .arg(code)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ChartError::Config(format!("cannot start {}: {}", config.interpreter, e)))?;

    let output = tokio::time::timeout(config.timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            ChartError::Timeout(format!("script ran longer than {}s", config.timeout.as_secs()))
        })??;

    Ok(ScriptOutput {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: truncate(&String::from_utf8_lossy(&output.stdout)),
        stderr: truncate(&String::from_utf8_lossy(&output.stderr)),
    })
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_OUTPUT_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_OUTPUT_CHARS).collect();
    cut.push_str("\n... [truncated]");
    cut
}

/// The `run_script` tool
pub fn run_script_tool(config: ScriptConfig) -> ToolSpec {
    ToolSpec::new(
        "run_script",
        "Run a short script to verify logic before writing the component. \
         Args: {\"code\": \"...\"}. Returns success, exit_code, stdout and stderr. \
         Use print(...) to see values.",
        move |args: RunScriptArgs| {
            let config = config.clone();
            async move {
                tracing::debug!(interpreter = %config.interpreter, "Running script");
                let output = run_script(&config, &args.code).await?;
                Ok(serde_json::to_value(output)?)
            }
        },
    )
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;

    fn shell() -> ScriptConfig {
        ScriptConfig {
            interpreter: "sh".to_string(),
            args: vec!["-c".to_string()],
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_captures_output() {
        let output = run_script(&shell(), "echo hello; echo oops >&2").await.unwrap();
        assert!(output.success);
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn test_failing_script_is_not_an_error() {
        let result = run_script_tool(shell())
            .call(json!({ "code": "exit 3" }))
            .await
            .unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["exit_code"], 3);
    }

    #[tokio::test]
    async fn test_timeout() {
        let config = ScriptConfig {
            timeout: Duration::from_millis(100),
            ..shell()
        };
        let err = run_script(&config, "sleep 5").await.unwrap_err();
        assert!(matches!(err, ChartError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let config = ScriptConfig {
            interpreter: "definitely-not-an-interpreter".to_string(),
            ..shell()
        };
        assert!(matches!(
            run_script(&config, "1").await,
            Err(ChartError::Config(_))
        ));
    }

    #[test]
    fn test_truncate() {
        let long = "x".repeat(MAX_OUTPUT_CHARS + 10);
        assert!(truncate(&long).ends_with("[truncated]"));
        assert_eq!(truncate("short"), "short");
    }
}
