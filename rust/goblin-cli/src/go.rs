//! The Go toolchain behind `:run` and `:tidy`.

use crate::config::ToolchainSection;
use goblin_core::{Execution, FormatError, SourceFormatter, Toolchain, ToolchainError};
use std::collections::BTreeMap;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, trace};

/// Runs programs with `go run` from a throwaway directory.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    program: String,
    env: BTreeMap<String, String>,
}

impl GoToolchain {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &ToolchainSection) -> Self {
        Self {
            program: config.go.clone(),
            env: config.env.clone(),
        }
    }

    /// First line of `go version`, if the toolchain can be started.
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.program).arg("version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(str::to_string)
    }
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self::new("go")
    }
}

impl Toolchain for GoToolchain {
    fn run(&self, source: &str, args: &[String]) -> Result<Execution, ToolchainError> {
        let workspace = tempfile::Builder::new()
            .prefix("goblin-run")
            .tempdir()
            .map_err(ToolchainError::Workspace)?;
        let main_go = workspace.path().join("main.go");
        std::fs::write(&main_go, source).map_err(ToolchainError::Workspace)?;

        debug!(program = %self.program, file = %main_go.display(), ?args, "go run");
        let output = Command::new(&self.program)
            .arg("run")
            .arg(&main_go)
            .args(args)
            .env("GOWORK", "off")
            .envs(&self.env)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ToolchainError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        trace!(status = ?output.status, bytes = combined.len(), "go run finished");

        Ok(Execution {
            output: combined,
            exit_code: output.status.code(),
        })
    }
}

/// Pipes source through `gofmt`.
#[derive(Debug, Clone)]
pub struct Gofmt {
    program: String,
}

impl Gofmt {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Gofmt {
    fn default() -> Self {
        Self::new("gofmt")
    }
}

impl SourceFormatter for Gofmt {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let unavailable = |reason: String| FormatError::Unavailable {
            program: self.program.clone(),
            reason,
        };

        debug!(program = %self.program, bytes = source.len(), "formatting");
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| unavailable(err.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|err| unavailable(err.to_string()))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|err| unavailable(err.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FormatError::Syntax(stderr.trim_end().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goblin_core::{run_lines, tidy};

    fn available(program: &str) -> bool {
        let found = Command::new(program)
            .arg("-h")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok();
        if !found {
            eprintln!("skipping: `{program}` not found");
        }
        found
    }

    #[test]
    fn test_missing_go_is_a_spawn_error() {
        let toolchain = GoToolchain::new("goblin-no-such-go");
        let err = toolchain.run("package main", &[]).unwrap_err();
        assert!(matches!(err, ToolchainError::Spawn { ref program, .. } if program == "goblin-no-such-go"));
    }

    #[test]
    fn test_missing_gofmt_is_unavailable() {
        let err = Gofmt::new("goblin-no-such-gofmt")
            .format("package main")
            .unwrap_err();
        assert!(matches!(err, FormatError::Unavailable { .. }));
    }

    #[test]
    fn test_println_runs() {
        if !available("go") {
            return;
        }
        let execution = run_lines(
            &["import \"fmt\"", "fmt.Println(1)"],
            &GoToolchain::default(),
            &[],
        )
        .expect("go starts");
        assert!(execution.succeeded(), "{}", execution.output);
        assert_eq!(execution.output, "1\n");
    }

    #[test]
    fn test_program_args_are_passed() {
        if !available("go") {
            return;
        }
        let execution = run_lines(
            &["import \"os\"", "fmt.Println(len(os.Args[1:]))"],
            &GoToolchain::default(),
            &["a".to_string(), "b".to_string()],
        )
        .expect("go starts");
        assert_eq!(execution.output, "2\n");
    }

    #[test]
    fn test_compile_error_is_an_execution_failure() {
        if !available("go") {
            return;
        }
        let execution = run_lines(&["x := undefinedName"], &GoToolchain::default(), &[])
            .expect("go starts");
        assert!(!execution.succeeded());
        assert!(execution.output.contains("undefined"), "{}", execution.output);
    }

    #[test]
    fn test_gofmt_rejects_bad_syntax() {
        if !available("gofmt") {
            return;
        }
        let err = tidy(&["if x {"], &Gofmt::default()).unwrap_err();
        assert!(matches!(err, FormatError::Syntax(ref message) if !message.is_empty()));
    }

    #[test]
    fn test_gofmt_tidy_is_idempotent() {
        if !available("gofmt") {
            return;
        }
        let buffer = [
            "import \"strings\"",
            "type Pair struct{A,B int}",
            "p:=Pair{1,2}",
            "fmt.Println(p,strings.ToUpper(\"x\"))",
        ];
        let once = tidy(&buffer, &Gofmt::default()).expect("formats");
        let twice = tidy(&once, &Gofmt::default()).expect("formats again");
        assert_eq!(once, twice);
        assert_eq!(once[0], "import \"strings\"");
        assert!(once.contains(&"p := Pair{1, 2}".to_string()), "{once:?}");
    }
}
