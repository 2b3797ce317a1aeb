//! One-shot network diagnostics.
//!
//! Each diagnostic runs an external read-only command (route dump,
//! interface list, DNS lookup, ping) with captured output and a bounded
//! execution time. A failing or missing command is reported as data in the
//! result, never as an error: diagnostics exist to describe a broken
//! network, so they must work on one.

use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

/// Bound on any single diagnostic command.
pub const DIAG_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one diagnostic command.
#[derive(Debug, Clone)]
pub struct DiagnosticResult {
    /// The command line that ran, rendered for display.
    pub command: String,
    /// Whether the command exited zero. Timeouts and spawn failures are
    /// reported as `false` with an explanation in `stderr`.
    pub succeeded: bool,
    /// Captured stdout, trailing whitespace trimmed.
    pub stdout: String,
    /// Captured stderr, trailing whitespace trimmed.
    pub stderr: String,
}

/// Run one diagnostic command under the default timeout.
pub async fn run_diagnostic(program: &str, args: &[&str]) -> DiagnosticResult {
    run_diagnostic_with_timeout(program, args, DIAG_TIMEOUT).await
}

/// Run one diagnostic command with an explicit timeout.
pub async fn run_diagnostic_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> DiagnosticResult {
    let command_line = render_command(program, args);
    debug!(command = %command_line, "Running diagnostic");

    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);

    let outcome = tokio::select! {
        result = command.output() => result,
        () = tokio::time::sleep(timeout) => {
            return DiagnosticResult {
                command: command_line,
                succeeded: false,
                stdout: String::new(),
                stderr: format!("timed out after {}s", timeout.as_secs()),
            };
        }
    };

    match outcome {
        Ok(output) => DiagnosticResult {
            command: command_line,
            succeeded: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        },
        Err(e) => DiagnosticResult {
            command: command_line,
            succeeded: false,
            stdout: String::new(),
            stderr: e.to_string(),
        },
    }
}

/// Route table, interface list and DNS resolution, in that order.
pub async fn network_info() -> Vec<DiagnosticResult> {
    vec![
        run_diagnostic("ip", &["route", "show"]).await,
        run_diagnostic("ip", &["-o", "addr", "show"]).await,
        run_diagnostic("nslookup", &["google.com"]).await,
    ]
}

/// Internet reachability probe.
pub async fn connectivity_check() -> DiagnosticResult {
    run_diagnostic("ping", &["-c", "3", "8.8.8.8"]).await
}

fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command_captures_stdout() {
        let result = run_diagnostic("echo", &["hello"]).await;

        assert!(result.succeeded);
        assert_eq!(result.stdout, "hello");
        assert_eq!(result.stderr, "");
        assert_eq!(result.command, "echo hello");
    }

    #[tokio::test]
    async fn test_failing_command_reports_status() {
        let result = run_diagnostic("false", &[]).await;

        assert!(!result.succeeded);
        assert_eq!(result.command, "false");
    }

    #[tokio::test]
    async fn test_missing_command_is_data_not_error() {
        let result = run_diagnostic("portkeep-no-such-diagnostic", &[]).await;

        assert!(!result.succeeded);
        assert!(!result.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_reported_in_stderr() {
        let result =
            run_diagnostic_with_timeout("sleep", &["5"], Duration::from_millis(100)).await;

        assert!(!result.succeeded);
        assert!(result.stderr.contains("timed out"));
    }

    #[test]
    fn test_render_command_without_args() {
        assert_eq!(render_command("ip", &[]), "ip");
        assert_eq!(render_command("ip", &["route", "show"]), "ip route show");
    }
}
