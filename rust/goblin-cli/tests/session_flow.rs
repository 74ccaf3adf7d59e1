//! End-to-end tests for a REPL session: editing, saving, loading and
//! running snippets through the public library API.

use goblin_cli::commands::{run_file, tidy_file, TidyOutcome};
use goblin_cli::go::GoToolchain;
use goblin_cli::session::{SaveTarget, Session, SessionError};
use goblin_cli::store::{SnippetStore, StoreError};
use goblin_core::{run_lines, Execution, FormatError, Submission, Toolchain, ToolchainError};
use std::path::Path;
use std::process::{Command, Stdio};

// =============================================================================
// Helpers
// =============================================================================

fn new_session(dir: &Path) -> Session {
    goblin_cli::colors::set_enabled(false);
    Session::new(SnippetStore::new(dir.join("snippets")))
}

fn type_lines(session: &mut Session, lines: &[&str]) {
    for line in lines {
        session.buffer_mut().submit(line);
    }
}

fn go_available() -> bool {
    let found = Command::new("go")
        .arg("version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());
    if !found {
        eprintln!("skipping: `go` not found");
    }
    found
}

/// Echoes the program it was asked to run.
struct EchoToolchain;

impl Toolchain for EchoToolchain {
    fn run(&self, source: &str, _args: &[String]) -> Result<Execution, ToolchainError> {
        Ok(Execution {
            output: source.to_string(),
            exit_code: Some(0),
        })
    }
}

// =============================================================================
// Editing and persistence
// =============================================================================

#[test]
fn typed_session_survives_save_and_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut session = new_session(dir.path());
    type_lines(
        &mut session,
        &[
            "import \"strings\"",
            "func shout(s string) string {",
            "\treturn strings.ToUpper(s)",
            "}",
            "fmt.Println(shout(\"hi\"))",
        ],
    );
    assert!(session.buffer().is_dirty());

    let saved = session.save(Some("shout")).expect("save");
    assert_eq!(saved.target, SaveTarget::Named);
    assert_eq!(session.prompt(false), "[shout]go> ");

    let mut other = new_session(dir.path());
    other.load("shout").expect("load");
    assert_eq!(other.buffer().lines(), session.buffer().lines());
    assert!(!other.buffer().is_dirty());
}

#[test]
fn insert_mode_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut session = new_session(dir.path());
    type_lines(&mut session, &["a := 1", "fmt.Println(a, b)"]);

    session.buffer_mut().insert_blank(2).expect("valid line");
    assert_eq!(session.prompt(true), "   2> ");
    assert_eq!(
        session.buffer_mut().submit("b := 2"),
        Submission::Replaced(2)
    );
    assert_eq!(
        session.buffer().lines(),
        &["a := 1", "b := 2", "fmt.Println(a, b)"]
    );
    assert_eq!(session.prompt(false), "go> ");
}

#[test]
fn append_then_undo_is_clean_again() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut session = new_session(dir.path());
    type_lines(&mut session, &["x := 1"]);
    session.save(Some("x")).expect("save");

    type_lines(&mut session, &["x++"]);
    assert_eq!(session.prompt(false), "[x*]go> ");
    session.buffer_mut().undo();
    assert_eq!(session.prompt(false), "[x]go> ");
}

#[test]
fn save_as_and_rename_keep_store_consistent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut session = new_session(dir.path());
    type_lines(&mut session, &["x := 1"]);

    session.save_as("first").expect("save as");
    session.rename("second").expect("rename");
    let names: Vec<String> = session
        .store()
        .list()
        .expect("list")
        .into_iter()
        .map(|entry| entry.file_name)
        .collect();
    assert_eq!(names, vec!["second.go"]);

    session.save_as("third").expect("save as");
    assert!(matches!(
        session.rename("second"),
        Err(SessionError::Store(StoreError::AlreadyExists(_)))
    ));
}

#[test]
fn failed_load_keeps_buffer() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut session = new_session(dir.path());
    type_lines(&mut session, &["x := 1"]);

    assert!(matches!(
        session.load("missing"),
        Err(SessionError::Store(StoreError::NotFound(_)))
    ));
    assert_eq!(session.buffer().lines(), &["x := 1"]);
}

// =============================================================================
// Running
// =============================================================================

#[test]
fn run_hands_assembled_program_to_toolchain() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut session = new_session(dir.path());
    type_lines(&mut session, &["import \"os\"", "fmt.Println(len(os.Args))"]);

    let execution = run_lines(session.buffer().lines(), &EchoToolchain, &[]).expect("echo");
    assert!(execution.output.contains("package main"));
    assert!(execution.output.contains("\t\"os\"\n"));
    assert!(execution.output.contains("func main() {\nfmt.Println(len(os.Args))\n"));
}

#[test]
fn saved_snippet_runs_from_file() {
    if !go_available() {
        return;
    }
    let dir = tempfile::tempdir().expect("temp dir");
    let mut session = new_session(dir.path());
    type_lines(&mut session, &["import \"fmt\"", "fmt.Println(1)"]);
    let saved = session.save(Some("one")).expect("save");

    let execution = run_file(&saved.path, &GoToolchain::default(), &[]).expect("go runs");
    assert!(execution.succeeded(), "{}", execution.output);
    assert_eq!(execution.output, "1\n");
}

#[test]
fn tidy_file_with_rejecting_formatter_leaves_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut session = new_session(dir.path());
    type_lines(&mut session, &["if x {"]);
    let saved = session.save(Some("broken")).expect("save");

    let reject = |_: &str| -> Result<String, FormatError> {
        Err(FormatError::Syntax("1:1: expected statement".into()))
    };
    let err = tidy_file(&saved.path, &reject, false).unwrap_err();
    assert_eq!(err.to_string(), "1:1: expected statement");
    assert_eq!(
        std::fs::read_to_string(&saved.path).expect("read"),
        "if x {"
    );

    let identity = |source: &str| -> Result<String, FormatError> { Ok(source.to_string()) };
    let outcome = tidy_file(&saved.path, &identity, true).expect("tidy");
    assert_eq!(outcome, TidyOutcome::Unchanged);
}
