//! Shell task runner
//!
//! Executes task descriptors as host processes. A descriptor is either a
//! command line string or a table:
//!
//! ```toml
//! tasks = [
//!     "make -j4",
//!     { name = "tests", run = "go", args = ["test", "./..."], dir = "cmd" },
//! ]
//! ```
//!
//! Command lines are split on whitespace; there is no shell quoting. Use the
//! table form with `args` when an argument contains spaces.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use tokio::process::Command;
use tokio::runtime::Handle;

use crate::config::defaults::STDERR_TAIL_LINES;
use crate::core::language::{EnvMap, Language, TaskDescriptor, TaskRunner};
use crate::core::session::Session;
use crate::error::TaskError;
use crate::infra::filesystem;

/// A task descriptor interpreted as a process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// Name used in logs and errors
    pub name: String,
    /// Program to execute
    pub program: String,
    /// Program arguments
    pub args: Vec<String>,
    /// Working directory relative to the language directory
    pub dir: Option<String>,
}

impl ShellCommand {
    /// Interpret a task descriptor
    pub fn from_descriptor(task: &TaskDescriptor) -> Result<Self, TaskError> {
        match task.value() {
            toml::Value::String(line) => Self::from_line(line, None, None, Vec::new()),
            toml::Value::Table(table) => {
                let run = table
                    .get("run")
                    .and_then(toml::Value::as_str)
                    .ok_or_else(|| invalid("table task requires a string 'run' field"))?;
                let name = optional_str(table, "name")?;
                let dir = optional_str(table, "dir")?;
                let args = match table.get("args") {
                    None => Vec::new(),
                    Some(toml::Value::Array(items)) => items
                        .iter()
                        .map(|item| {
                            item.as_str()
                                .map(str::to_string)
                                .ok_or_else(|| invalid("'args' must contain only strings"))
                        })
                        .collect::<Result<_, _>>()?,
                    Some(_) => return Err(invalid("'args' must be an array of strings")),
                };
                Self::from_line(run, name, dir, args)
            }
            other => Err(invalid(&format!(
                "expected a string or table, found {}",
                other.type_str()
            ))),
        }
    }

    fn from_line(
        line: &str,
        name: Option<String>,
        dir: Option<String>,
        extra_args: Vec<String>,
    ) -> Result<Self, TaskError> {
        let mut words = line.split_whitespace().map(str::to_string);
        let program = words.next().ok_or_else(|| invalid("empty command"))?;
        let mut args: Vec<String> = words.collect();
        args.extend(extra_args);

        Ok(Self {
            name: name.unwrap_or_else(|| line.trim().to_string()),
            program,
            args,
            dir,
        })
    }
}

fn invalid(reason: &str) -> TaskError {
    TaskError::InvalidDescriptor {
        reason: reason.to_string(),
    }
}

fn optional_str(table: &toml::Table, key: &str) -> Result<Option<String>, TaskError> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(&format!("'{key}' must be a string"))),
    }
}

/// Runs tasks as child processes of the current process
#[derive(Debug, Clone)]
pub struct ShellTaskRunner {
    logs_dir: Option<PathBuf>,
}

impl ShellTaskRunner {
    /// Create a runner that does not keep logs
    pub fn new() -> Self {
        Self { logs_dir: None }
    }

    /// Append task output to `<dir>/<language>.log`
    #[must_use]
    pub fn with_logs_dir(mut self, dir: PathBuf) -> Self {
        self.logs_dir = Some(dir);
        self
    }

    /// Log file for a language, when logging is enabled
    pub fn log_path(&self, language: &str) -> Option<PathBuf> {
        self.logs_dir
            .as_ref()
            .map(|dir| dir.join(format!("{language}.log")))
    }

    fn resolve_program(program: &str, cwd: &Path, env: &EnvMap) -> Result<PathBuf, TaskError> {
        if program.contains('/') || program.contains(std::path::MAIN_SEPARATOR) {
            return Ok(cwd.join(program));
        }

        let paths = env
            .get("PATH")
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"));
        which::which_in(program, paths, cwd).map_err(|_| TaskError::ProgramNotFound {
            program: program.to_string(),
        })
    }

    fn write_log(
        &self,
        session: &Session,
        language: &Language,
        command: &ShellCommand,
        stdout: &[u8],
        stderr: &[u8],
    ) -> Result<(), TaskError> {
        let Some(path) = self.log_path(language.id()) else {
            return Ok(());
        };

        let mut content = format!("==> [{}] {}\n", session.id(), command.name).into_bytes();
        content.extend_from_slice(stdout);
        content.extend_from_slice(stderr);
        filesystem::append_file(&path, &content).map_err(|e| TaskError::Log {
            path: path.clone(),
            error: e.to_string(),
        })
    }
}

impl Default for ShellTaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRunner for ShellTaskRunner {
    fn run_task(
        &self,
        session: &Session,
        language: &Language,
        task: &TaskDescriptor,
        env: &EnvMap,
    ) -> Result<(), TaskError> {
        let command = ShellCommand::from_descriptor(task)?;
        if session.is_cancelled() {
            return Err(TaskError::Cancelled { task: command.name });
        }

        let cwd = match command.dir {
            Some(ref dir) => language.root().join(dir),
            None => language.root().to_path_buf(),
        };
        let program = Self::resolve_program(&command.program, &cwd, env)?;

        tracing::info!(language = %language.id(), task = %command.name, "running task");
        let outcome = block_on(execute(&program, &command, &cwd, env, session))
            .and_then(|result| result)
            .map_err(|e| TaskError::Spawn {
                task: command.name.clone(),
                error: e.to_string(),
            })?;

        let Some(output) = outcome else {
            self.write_log(session, language, &command, b"", b"cancelled\n")?;
            tracing::warn!(language = %language.id(), task = %command.name, "task cancelled");
            return Err(TaskError::Cancelled { task: command.name });
        };

        self.write_log(session, language, &command, &output.stdout, &output.stderr)?;

        if output.status.success() {
            tracing::debug!(language = %language.id(), task = %command.name, "task finished");
            Ok(())
        } else {
            Err(TaskError::Failed {
                task: command.name,
                code: output.status.code(),
                stderr: tail(&output.stderr, STDERR_TAIL_LINES),
            })
        }
    }
}

/// Run a future to completion from synchronous code.
///
/// Uses the ambient runtime when called from one of its blocking threads,
/// otherwise a private current-thread runtime.
fn block_on<F: Future>(future: F) -> std::io::Result<F::Output> {
    match Handle::try_current() {
        Ok(handle) => Ok(handle.block_on(future)),
        Err(_) => Ok(tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(future)),
    }
}

/// Spawn the task and wait for it, or for the session to be cancelled.
///
/// Returns `None` when the task was killed. The child runs in its own
/// process group so that cancellation also reaches the processes it started.
async fn execute(
    program: &Path,
    command: &ShellCommand,
    cwd: &Path,
    env: &EnvMap,
    session: &Session,
) -> std::io::Result<Option<Output>> {
    let mut cmd = Command::new(program);
    cmd.args(&command.args)
        .current_dir(cwd)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd.spawn()?;
    let pid = child.id();

    tokio::select! {
        output = child.wait_with_output() => output.map(Some),
        () = session.cancelled() => {
            kill_process_group(pid);
            Ok(None)
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) {
        // The group may already have exited
        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
    }
}

// kill_on_drop takes care of the child itself
#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

/// Last `lines` lines of process output
fn tail(output: &[u8], lines: usize) -> String {
    let text = String::from_utf8_lossy(output);
    let all: Vec<&str> = text.trim_end().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
