//! External command execution.
//!
//! Every external tool (`wg`, `ip`, `tar`, `zip`, `sh`) is run through a
//! [`ToolRunner`], so tests can swap in a fake.

use crate::config;
use crate::error::WgError;
use colored::Colorize;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Runs external commands and reports whether tools are installed.
#[allow(async_fn_in_trait)]
pub trait ToolRunner {
    /// Run `cmd`, optionally feeding `input` on stdin and running inside
    /// `dir`, and return its stdout.
    async fn run(&self, cmd: &str, input: Option<&str>, dir: Option<&Path>)
        -> Result<String, WgError>;

    /// True when `tool` can be found on the PATH.
    fn has_tool(&self, tool: &str) -> bool;
}

/// Runs commands on the host with a per-command timeout.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> SystemRunner {
        SystemRunner { timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        SystemRunner::new(Duration::from_secs(config::COMMAND_TIMEOUT_SECS))
    }
}

impl ToolRunner for SystemRunner {
    /// The command string is split on spaces, with quoted substrings preserved.
    async fn run(
        &self,
        cmd: &str,
        input: Option<&str>,
        dir: Option<&Path>,
    ) -> Result<String, WgError> {
        log::debug!("run({cmd})", cmd = cmd.on_blue());

        let cmds: Vec<&str> = split_and_strip(cmd);
        log::trace!("split cmds={:?}", cmds);
        let (program, args) = cmds
            .split_first()
            .ok_or_else(|| WgError::ExternalTool("empty command".to_string()))?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            log::error!("Command execution failed: {}", e);
            WgError::ExternalTool(format!("failed to execute {program}: {e}"))
        })?;

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|e| WgError::ExternalTool(format!("writing stdin of {program}: {e}")))?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                log::warn!("{} after {:?}: {cmd}", "timeout".on_red(), self.timeout);
                WgError::EnvironmentProbeTimeout {
                    probe: cmd.to_string(),
                    secs: self.timeout.as_secs(),
                }
            })?
            .map_err(|e| WgError::ExternalTool(format!("waiting for {program}: {e}")))?;

        if output.status.success() {
            log::debug!("Success cmd: {cmd}");
            log::debug!("Success output.stdout.len(): {}", output.stdout.len());

            if output.stdout.len() > config::MAX_OUTPUT_BYTES {
                return Err(WgError::ExternalTool(format!(
                    "Response too large: {} bytes for command: {:?}",
                    output.stdout.len(),
                    cmds
                )));
            }
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::trace!(
                "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
                code = output.status.code(),
                status = output.status,
                stderr = stderr.red()
            );
            log::warn!(
                "{failed} to run {cmd}",
                failed = "failed".on_red(),
                cmd = cmd.on_blue()
            );
            return Err(WgError::ExternalTool(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| WgError::ExternalTool(format!("Invalid UTF-8 from {program}: {e}")))
    }

    fn has_tool(&self, tool: &str) -> bool {
        find_in_path(tool).is_some()
    }
}

/// Locate an executable file named `tool` on the PATH.
pub fn find_in_path(tool: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(tool))
        .find(|candidate| candidate.is_file())
}

/// Fail with [`WgError::MissingTool`] on the first tool that is not installed.
pub fn require_tools<R: ToolRunner>(runner: &R, tools: &[&str]) -> Result<(), WgError> {
    for tool in tools {
        if !runner.has_tool(tool) {
            log::error!("missing tool: {}", tool.red());
            return Err(WgError::MissingTool(tool.to_string()));
        }
        log::debug!("found tool: {tool}");
    }
    Ok(())
}

/// A timed out tool run is a tool failure, not an environment probe failure.
pub(crate) fn tool_error(e: WgError) -> WgError {
    match e {
        WgError::EnvironmentProbeTimeout { probe, secs } => {
            WgError::ExternalTool(format!("'{probe}' timed out after {secs}s"))
        }
        other => other,
    }
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_and_strip_complex() {
        let input = "tar czf 'wg server.tgz'  wg0_server.conf install_wg_server.sh";
        let expected = vec![
            "tar",
            "czf",
            "wg server.tgz",
            "wg0_server.conf",
            "install_wg_server.sh",
        ];
        assert_eq!(split_and_strip(input), expected);
    }

    #[test]
    fn test_split_and_strip_nospaces() {
        assert_eq!(split_and_strip("wg"), vec!["wg"]);
    }

    #[test]
    fn test_split_and_strip_double_quotes() {
        let input = "ip -json -4 addr show dev \"eth0\"";
        let expected = vec!["ip", "-json", "-4", "addr", "show", "dev", "eth0"];
        assert_eq!(split_and_strip(input), expected);
    }

    #[test]
    fn test_find_in_path_missing() {
        assert!(find_in_path("definitely-not-a-real-tool-4711").is_none());
    }

    #[tokio::test]
    async fn test_run_empty_command() {
        let runner = SystemRunner::default();
        assert!(matches!(
            runner.run("", None, None).await,
            Err(WgError::ExternalTool(_))
        ));
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let runner = SystemRunner::default();
        assert!(matches!(
            runner
                .run("definitely-not-a-real-tool-4711 --version", None, None)
                .await,
            Err(WgError::ExternalTool(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_with_stdin() {
        if find_in_path("cat").is_none() {
            return;
        }
        let runner = SystemRunner::default();
        let out = runner.run("cat", Some("hello\n"), None).await.unwrap();
        assert_eq!(out, "hello\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_timeout() {
        if find_in_path("sleep").is_none() {
            return;
        }
        let runner = SystemRunner::new(Duration::from_millis(100));
        assert!(matches!(
            runner.run("sleep 5", None, None).await,
            Err(WgError::EnvironmentProbeTimeout { .. })
        ));
    }
}
