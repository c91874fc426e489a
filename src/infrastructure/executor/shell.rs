//! Shell command executor with a hard timeout

use std::process::Stdio;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::application::ports::{
    CommandExecutor, DetachedProcess, ExecutionResult, ExecutorError,
};
use crate::domain::duration::Duration;

#[cfg(unix)]
const SHELL: (&str, &str) = ("/bin/sh", "-c");
#[cfg(windows)]
const SHELL: (&str, &str) = ("cmd", "/C");

/// Characters separating simple commands in a shell line
const COMMAND_SEPARATORS: &[char] = &[';', '&', '|', '\n', '(', ')', '`'];

/// Substrings matched against the whitespace-normalized command
const DANGEROUS_SUBSTRINGS: &[&str] = &["sudo rm ", "mkfs", ":(){"];

/// Substrings matched against the command with all whitespace removed
const DEVICE_WRITE_SUBSTRINGS: &[&str] = &[
    ">/dev/sd",
    ">/dev/nvme",
    ">/dev/disk",
    ">/dev/mmcblk",
    "of=/dev/sd",
    "of=/dev/nvme",
    "of=/dev/disk",
    "of=/dev/mmcblk",
];

/// Reject blank commands and commands matching the destructive deny-list.
pub fn validate_command(command: &str) -> Result<(), ExecutorError> {
    if command.trim().is_empty() {
        return Err(ExecutorError::InvalidCommand(
            "command must not be empty".to_string(),
        ));
    }

    let normalized = command
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let compact: String = normalized.chars().filter(|c| !c.is_whitespace()).collect();

    let deletes_tree = command
        .to_lowercase()
        .split(COMMAND_SEPARATORS)
        .any(deletes_protected_tree);

    let dangerous = deletes_tree
        || DANGEROUS_SUBSTRINGS.iter().any(|p| normalized.contains(p))
        || DEVICE_WRITE_SUBSTRINGS.iter().any(|p| compact.contains(p));

    if dangerous {
        return Err(ExecutorError::DangerousCommand(command.trim().to_string()));
    }
    Ok(())
}

/// `/`, `~`, `$HOME` and their globbed contents
fn is_protected_root(target: &str) -> bool {
    let target = target.strip_suffix('*').unwrap_or(target);
    matches!(
        target.trim_end_matches('/'),
        "" | "~" | "$home" | "${home}" | "/." | "/.."
    )
}

/// Whether one simple command is a recursive `rm` of a protected root.
///
/// `--no-preserve-root` is refused whatever the targets.
fn deletes_protected_tree(simple_command: &str) -> bool {
    let tokens = shlex::split(simple_command).unwrap_or_else(|| {
        simple_command
            .split_whitespace()
            .map(str::to_string)
            .collect()
    });

    let Some(rm_at) = tokens
        .iter()
        .position(|t| t.rsplit('/').next() == Some("rm"))
    else {
        return false;
    };

    let mut recursive = false;
    let mut targets = Vec::new();
    let mut options_done = false;
    for arg in &tokens[rm_at + 1..] {
        if options_done || !arg.starts_with('-') || arg == "-" {
            targets.push(arg.as_str());
        } else if arg == "--" {
            options_done = true;
        } else if arg == "--no-preserve-root" {
            return true;
        } else if arg == "--recursive" {
            recursive = true;
        } else if !arg.starts_with("--") && arg.contains('r') {
            recursive = true;
        }
    }

    recursive && targets.into_iter().any(is_protected_root)
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            debug!(error = %e, "Output pipe closed with error");
        }
    }
    buf
}

fn exit_code(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(-1)
}

/// Kill the whole process group started for a command
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        debug!(pid, error = %e, "killpg failed");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

/// Runs commands through the system shell.
///
/// Each command gets its own process group so a timeout kills the shell and
/// everything it started.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    default_timeout: StdDuration,
}

impl ShellExecutor {
    /// Create a new executor with the default 30 second timeout
    pub fn new() -> Self {
        Self {
            default_timeout: Duration::default_command_timeout().as_std(),
        }
    }

    /// Create with a custom default timeout
    pub fn with_timeout(timeout: StdDuration) -> Self {
        Self {
            default_timeout: timeout,
        }
    }

    fn shell_command(command: &str) -> Command {
        let mut cmd = Command::new(SHELL.0);
        cmd.arg(SHELL.1).arg(command);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(
        &self,
        command: &str,
        timeout: StdDuration,
    ) -> Result<ExecutionResult, ExecutorError> {
        validate_command(command)?;

        let mut child = Self::shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutorError::ExecutionFailed(e.to_string()))?;

        let pid = child.id();
        debug!(command, ?pid, ?timeout, "Spawned command");

        let stdout_task = tokio::spawn(read_pipe(child.stdout.take()));
        let stderr_task = tokio::spawn(read_pipe(child.stderr.take()));

        // Readers are part of the race: a grandchild holding the pipes open
        // must not outlive the timeout either.
        let completed = async {
            let status = child.wait().await;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            (status, stdout, stderr)
        };

        let (status, stdout, stderr) = tokio::select! {
            finished = completed => finished,
            _ = tokio::time::sleep(timeout) => {
                warn!(command, ?timeout, "Command timed out, killing process group");
                kill_process_group(pid);
                if let Err(e) = child.start_kill() {
                    debug!(error = %e, "Child already exited");
                }
                if let Err(e) = child.wait().await {
                    debug!(error = %e, "Failed to reap killed child");
                }
                return Err(ExecutorError::Timeout);
            }
        };

        let status = status.map_err(|e| ExecutorError::ExecutionFailed(e.to_string()))?;
        let result = ExecutionResult {
            command: command.to_string(),
            exit_code: exit_code(status),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        };

        if !result.succeeded() {
            let detail = if result.stderr.trim().is_empty() {
                result.stdout.trim()
            } else {
                result.stderr.trim()
            };
            return Err(ExecutorError::CommandFailed(
                result.exit_code,
                detail.to_string(),
            ));
        }

        Ok(result)
    }

    fn execute_detached(&self, command: &str) -> Result<DetachedProcess, ExecutorError> {
        validate_command(command)?;

        let mut cmd = std::process::Command::new(SHELL.0);
        cmd.arg(SHELL.1)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| ExecutorError::ExecutionFailed(e.to_string()))?;
        let pid = child.id();
        debug!(command, pid, "Spawned detached command");

        // Reap off-thread; usable with or without a runtime
        let reaper = std::thread::Builder::new()
            .name("detached-reaper".to_string())
            .spawn(move || match child.wait() {
                Ok(status) => debug!(pid, ?status, "Detached command exited"),
                Err(e) => debug!(pid, error = %e, "Failed to reap detached command"),
            });
        if let Err(e) = reaper {
            warn!(pid, error = %e, "Failed to start reaper thread");
        }

        Ok(DetachedProcess { pid })
    }

    fn default_timeout(&self) -> StdDuration {
        self.default_timeout
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_command() {
        assert!(matches!(
            validate_command("   "),
            Err(ExecutorError::InvalidCommand(_))
        ));
    }

    #[test]
    fn rejects_destructive_commands() {
        for command in [
            "rm -rf /",
            "rm  -rf  /*",
            "echo hi; rm -fr ~",
            "rm -rf --no-preserve-root /",
            "rm --no-preserve-root -rf /tmp/x",
            "rm -r /",
            "rm -R /",
            "rm --recursive --force /",
            "rm -f -R ~/",
            "rm -rf -- /",
            "/bin/rm -rf /",
            "rm -rf \"/\"",
            "rm -rf $HOME",
            "true && rm -vfr /*",
            "sudo rm -r /etc",
            "mkfs.ext4 /dev/sda1",
            "cat image > /dev/sda",
            "dd if=/dev/zero of=/dev/nvme0n1",
            ":(){ :|:& };:",
        ] {
            assert!(
                matches!(validate_command(command), Err(ExecutorError::DangerousCommand(_))),
                "expected rejection: {}",
                command
            );
        }
    }

    #[test]
    fn allows_ordinary_commands() {
        for command in [
            "rm -rf /tmp/build-cache",
            "rm -rf ./target",
            "rm -f ~/notes.txt",
            "rm -r ~/projects/old",
            "rm /tmp/x /",
            "firmware --recursive /",
            "echo done > /dev/null",
            "dd if=in.img of=out.img",
            "make format",
        ] {
            assert!(validate_command(command).is_ok(), "expected allow: {}", command);
        }
    }

    #[tokio::test]
    async fn captures_stdout() {
        let executor = ShellExecutor::new();
        let result = executor
            .execute("echo hello; echo oops 1>&2", StdDuration::from_secs(5))
            .await
            .unwrap();

        assert!(result.succeeded());
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "oops\n");
    }

    #[tokio::test]
    async fn nonzero_exit_is_command_failed() {
        let executor = ShellExecutor::new();
        let err = executor
            .execute("echo broken 1>&2; exit 3", StdDuration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err, ExecutorError::CommandFailed(3, "broken".to_string()));
    }

    #[tokio::test]
    async fn failure_falls_back_to_stdout() {
        let executor = ShellExecutor::new();
        let err = executor
            .execute("echo visible; exit 1", StdDuration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err, ExecutorError::CommandFailed(1, "visible".to_string()));
    }

    #[tokio::test]
    async fn timeout_wins_race() {
        let executor = ShellExecutor::new();
        let started = std::time::Instant::now();
        let err = executor
            .execute("sleep 10", StdDuration::from_millis(100))
            .await
            .unwrap_err();

        assert_eq!(err, ExecutorError::Timeout);
        assert!(started.elapsed() < StdDuration::from_secs(5));
    }

    #[tokio::test]
    async fn timeout_kills_process_group() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let command = format!("sleep 1 && touch {}", marker.display());

        let executor = ShellExecutor::new();
        let err = executor
            .execute(&command, StdDuration::from_millis(100))
            .await
            .unwrap_err();
        assert_eq!(err, ExecutorError::Timeout);

        tokio::time::sleep(StdDuration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn dangerous_command_never_spawns() {
        let executor = ShellExecutor::new();
        let err = executor
            .execute("rm -rf /", StdDuration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::DangerousCommand(_)));
    }

    #[test]
    fn detached_spawn_returns_pid() {
        let executor = ShellExecutor::new();
        let process = executor.execute_detached("true").unwrap();
        assert!(process.pid > 0);
        assert!(executor.execute_detached("").is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn detached_child_is_reaped() {
        let executor = ShellExecutor::new();
        let process = executor.execute_detached("true").unwrap();
        let proc_entry = std::path::PathBuf::from(format!("/proc/{}", process.pid));

        let deadline = std::time::Instant::now() + StdDuration::from_secs(5);
        while proc_entry.exists() && std::time::Instant::now() < deadline {
            std::thread::sleep(StdDuration::from_millis(20));
        }
        assert!(!proc_entry.exists(), "detached child left as a zombie");
    }

    #[test]
    fn default_timeout_is_thirty_seconds() {
        assert_eq!(ShellExecutor::new().default_timeout(), StdDuration::from_secs(30));
        assert_eq!(
            ShellExecutor::with_timeout(StdDuration::from_secs(2)).default_timeout(),
            StdDuration::from_secs(2)
        );
    }
}
