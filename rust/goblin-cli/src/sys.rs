//! `:sys`: run a shell command with live output, cancellable with Escape.
//!
//! The command runs in its own process group so Escape can terminate it
//! together with anything it spawned. While it runs the terminal is in raw
//! mode, so output lines end in `\r\n`.

use crate::colors;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, Write};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// How often the key listener checks whether it should stop.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum SysError {
    #[error("Usage: :sys <command> [args...]")]
    MissingCommand,

    #[error("invalid command line: {0}")]
    Parse(String),

    #[error("failed to set raw terminal mode: {0}")]
    Terminal(#[source] io::Error),

    #[error("failed to start runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("error starting command `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("error waiting for command: {0}")]
    Wait(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysOutcome {
    Exited(ExitStatus),
    /// Escape was pressed and the process group was terminated.
    Cancelled,
}

/// Split a `:sys` argument string into argv with shell quoting rules.
pub fn parse_command_line(line: &str) -> Result<Vec<String>, SysError> {
    let argv = shell_words::split(line).map_err(|err| SysError::Parse(err.to_string()))?;
    if argv.is_empty() {
        return Err(SysError::MissingCommand);
    }
    Ok(argv)
}

/// Raw terminal mode for as long as the guard lives.
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub fn enable() -> Result<Self, SysError> {
        enable_raw_mode().map_err(SysError::Terminal)?;
        Ok(Self { active: true })
    }

    /// A guard that leaves the terminal alone.
    pub fn inactive() -> Self {
        Self { active: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
        }
    }
}

/// Run `argv` to completion or until Escape is pressed.
///
/// With `interactive` set the terminal goes raw and an Escape listener runs;
/// without it the command simply runs to completion.
pub fn run_system_command(argv: &[String], interactive: bool) -> Result<SysOutcome, SysError> {
    let (program, args) = argv.split_first().ok_or(SysError::MissingCommand)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(SysError::Runtime)?;

    let guard = if interactive {
        RawModeGuard::enable()?
    } else {
        RawModeGuard::inactive()
    };
    let outcome = runtime.block_on(supervise(program, args, guard.is_active()));
    let raw = guard.is_active();
    drop(guard);

    if raw {
        print!("\r\n");
        let _ = io::stdout().flush();
    }
    outcome
}

enum Race {
    Exited(io::Result<ExitStatus>),
    Escape,
}

async fn supervise(program: &str, args: &[String], listen: bool) -> Result<SysOutcome, SysError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|source| SysError::Spawn {
        program: program.to_string(),
        source,
    })?;
    debug!(%program, pid = ?child.id(), "system command started");

    let stdout = child.stdout.take().map(|out| tokio::spawn(pump(out, Stream::Stdout)));
    let stderr = child.stderr.take().map(|err| tokio::spawn(pump(err, Stream::Stderr)));

    let stop = Arc::new(AtomicBool::new(false));
    let (escape_tx, mut escape_rx) = oneshot::channel();
    let listener = tokio::task::spawn_blocking({
        let stop = Arc::clone(&stop);
        move || {
            if listen && wait_for_escape(&stop) {
                let _ = escape_tx.send(());
            }
        }
    });

    let race = tokio::select! {
        status = child.wait() => Race::Exited(status),
        Ok(()) = &mut escape_rx => Race::Escape,
    };

    stop.store(true, Ordering::Relaxed);
    let _ = listener.await;

    let outcome = match race {
        Race::Exited(status) => SysOutcome::Exited(status.map_err(SysError::Wait)?),
        Race::Escape => {
            print!(
                "\r\n{}\r\n",
                colors::info("Escape pressed. Terminating system command...")
            );
            let _ = io::stdout().flush();
            terminate(&mut child);
            child.wait().await.map_err(SysError::Wait)?;
            SysOutcome::Cancelled
        }
    };

    for task in [stdout, stderr].into_iter().flatten() {
        let _ = task.await;
    }
    debug!(?outcome, "system command finished");
    Ok(outcome)
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

async fn pump<R: AsyncRead + Unpin>(reader: R, stream: Stream) {
    let mut segments = BufReader::new(reader).split(b'\n');
    while let Ok(Some(segment)) = segments.next_segment().await {
        let text = String::from_utf8_lossy(&segment);
        let line = text.trim_end_matches('\r');
        match stream {
            Stream::Stdout => {
                let mut out = io::stdout().lock();
                let _ = write!(out, "{}\r\n", colors::success(line));
                let _ = out.flush();
            }
            Stream::Stderr => {
                let mut err = io::stderr().lock();
                let _ = write!(err, "{}\r\n", colors::error(line));
                let _ = err.flush();
            }
        }
    }
}

/// Block until Escape is pressed (true) or `stop` is raised (false).
fn wait_for_escape(stop: &AtomicBool) -> bool {
    while !stop.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key))
                    if key.code == KeyCode::Esc && key.kind == KeyEventKind::Press =>
                {
                    return true;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(%err, "key listener stopped");
                    return false;
                }
            },
            Ok(false) => {}
            Err(err) => {
                warn!(%err, "key listener stopped");
                return false;
            }
        }
    }
    false
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return;
    };
    let Ok(raw) = i32::try_from(pid) else {
        let _ = child.start_kill();
        return;
    };
    if let Err(err) = killpg(Pid::from_raw(raw), Signal::SIGTERM) {
        warn!(%err, "failed to terminate process group");
        let _ = child.start_kill();
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.start_kill();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_command_line() {
        assert_eq!(
            parse_command_line("ls -la 'my dir'").expect("parses"),
            argv(&["ls", "-la", "my dir"])
        );
        assert!(matches!(
            parse_command_line("   "),
            Err(SysError::MissingCommand)
        ));
        assert!(matches!(
            parse_command_line("echo 'open"),
            Err(SysError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_argv_is_usage_error() {
        assert!(matches!(
            run_system_command(&[], false),
            Err(SysError::MissingCommand)
        ));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = run_system_command(&argv(&["goblin-no-such-command"]), false).unwrap_err();
        assert!(matches!(err, SysError::Spawn { ref program, .. } if program == "goblin-no-such-command"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_reported() {
        match run_system_command(&argv(&["true"]), false).expect("true runs") {
            SysOutcome::Exited(status) => assert!(status.success()),
            other => panic!("unexpected outcome {other:?}"),
        }
        match run_system_command(&argv(&["false"]), false).expect("false runs") {
            SysOutcome::Exited(status) => assert!(!status.success()),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_output_is_streamed_to_completion() {
        let outcome = run_system_command(
            &argv(&["sh", "-c", "echo out; echo err >&2; exit 3"]),
            false,
        )
        .expect("sh runs");
        match outcome {
            SysOutcome::Exited(status) => assert_eq!(status.code(), Some(3)),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
