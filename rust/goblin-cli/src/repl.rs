//! Interactive REPL for Go.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use goblin_core::{run_lines, tidy, Submission, Undo};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::debug;

use crate::colors::{bold, error, gray, info, output, success};
use crate::config::{GoblinConfig, GoblinPaths};
use crate::editor::edit_lines;
use crate::go::{GoToolchain, Gofmt};
use crate::session::{SaveTarget, Session};
use crate::store::{file_name_of, snippet_stem, SnippetStore};
use crate::sys::{parse_command_line, run_system_command, SysOutcome};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const HOMEPAGE: &str = "https://github.com/jplozf/goblin";

/// REPL commands for tab completion.
const COMMANDS: &[&str] = &[
    ":run", ":sys", ":clear", ":show", ":tidy", ":list", ":save", ":saveas", ":load", ":rename",
    ":export", ":edit", ":undo", ":delete", ":insert", ":help", ":quit", ":exit", ":bye",
];

/// Commands whose argument is a saved snippet.
const SNIPPET_COMMANDS: &[&str] = &[":load", ":save", ":saveas", ":rename"];

/// Go keywords and common builtins for tab completion.
const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var", "append", "cap", "close", "copy",
    "delete", "len", "make", "new", "panic", "print", "println", "recover", "fmt.Println",
    "fmt.Printf", "fmt.Sprintf",
];

/// Completer for the REPL.
struct GoblinCompleter {
    store: SnippetStore,
}

impl GoblinCompleter {
    fn snippet_candidates(&self, word: &str) -> Vec<Pair> {
        let Ok(entries) = self.store.list() else {
            return Vec::new();
        };
        entries
            .iter()
            .map(|entry| snippet_stem(&entry.file_name).to_string())
            .filter(|name| name.starts_with(word))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect()
    }
}

impl Completer for GoblinCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == '{')
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &line[start..pos];
        let head = line[..start].trim();

        if head.is_empty() && word.starts_with(':') {
            let candidates = COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(word))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            return Ok((start, candidates));
        }

        if SNIPPET_COMMANDS.contains(&head) {
            return Ok((start, self.snippet_candidates(word)));
        }

        if word.is_empty() || head.starts_with(':') {
            return Ok((start, Vec::new()));
        }

        let candidates = KEYWORDS
            .iter()
            .filter(|kw| kw.starts_with(word))
            .map(|kw| Pair {
                display: kw.to_string(),
                replacement: kw.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for GoblinCompleter {
    type Hint = String;
}

impl Highlighter for GoblinCompleter {}

impl Validator for GoblinCompleter {}

impl Helper for GoblinCompleter {}

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Run(Option<&'a str>),
    Sys(&'a str),
    Clear,
    Show,
    Tidy,
    List,
    Save(Option<&'a str>),
    SaveAs(&'a str),
    Load(&'a str),
    Rename(&'a str),
    Export(Option<&'a str>),
    Edit,
    Undo,
    Delete(&'a str),
    Insert(&'a str),
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum ParsedCommand<'a> {
    NotACommand,
    InvalidUsage(&'static str),
    Command(ReplCommand<'a>),
}

fn parse_repl_command(line: &str) -> ParsedCommand<'_> {
    let trimmed = line.trim();
    if !trimmed.starts_with(':') {
        return ParsedCommand::NotACommand;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let arg = parts
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let command = match cmd {
        ":run" => ReplCommand::Run(arg),
        ":sys" => match arg {
            Some(command_line) => ReplCommand::Sys(command_line),
            None => return ParsedCommand::InvalidUsage("Usage: :sys <command> [args...]"),
        },
        ":clear" => ReplCommand::Clear,
        ":show" => ReplCommand::Show,
        ":tidy" => ReplCommand::Tidy,
        ":list" => ReplCommand::List,
        ":save" => ReplCommand::Save(arg),
        ":saveas" => match arg {
            Some(name) => ReplCommand::SaveAs(name),
            None => return ParsedCommand::InvalidUsage("Usage: :saveas <new_filename>"),
        },
        ":load" => match arg {
            Some(name) => ReplCommand::Load(name),
            None => return ParsedCommand::InvalidUsage("Usage: :load <filename>"),
        },
        ":rename" => match arg {
            Some(name) => ReplCommand::Rename(name),
            None => return ParsedCommand::InvalidUsage("Usage: :rename <new_filename>"),
        },
        ":export" => ReplCommand::Export(arg),
        ":edit" => ReplCommand::Edit,
        ":undo" | ":u" => ReplCommand::Undo,
        ":delete" | ":d" => match arg {
            Some(line) => ReplCommand::Delete(line),
            None => return ParsedCommand::InvalidUsage("Usage: :delete <line_number>"),
        },
        ":insert" | ":i" => match arg {
            Some(line) => ReplCommand::Insert(line),
            None => return ParsedCommand::InvalidUsage("Usage: :insert <line_number>"),
        },
        ":help" => ReplCommand::Help,
        ":quit" | ":exit" | ":bye" | ":q" => ReplCommand::Quit,
        // Unknown `:` lines are Go input like any other line.
        _ => return ParsedCommand::NotACommand,
    };
    ParsedCommand::Command(command)
}

/// Everything one REPL instance owns.
pub struct Repl {
    session: Session,
    toolchain: GoToolchain,
    formatter: Gofmt,
    editor: String,
    history: PathBuf,
}

impl Repl {
    pub fn new(config: &GoblinConfig, paths: &GoblinPaths) -> Self {
        Self {
            session: Session::new(SnippetStore::new(paths.snippets.clone())),
            toolchain: GoToolchain::from_config(&config.toolchain),
            formatter: Gofmt::new(config.toolchain.gofmt.clone()),
            editor: config.editor_command(),
            history: paths.history.clone(),
        }
    }
}

pub fn run_repl(mut repl: Repl) -> rustyline::Result<()> {
    print_banner(&repl.toolchain);

    let config = rustyline::Config::builder().auto_add_history(true).build();
    let mut rl: Editor<GoblinCompleter, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(GoblinCompleter {
        store: repl.session.store().clone(),
    }));

    if repl.history.exists() {
        if let Err(err) = rl.load_history(&repl.history) {
            eprintln!(
                "{} failed to load history from {}: {}",
                error("Warning:"),
                repl.history.display(),
                err
            );
        }
    }

    let mut after_code = false;
    loop {
        let prompt = repl.session.prompt(after_code);

        match rl.readline(&prompt) {
            Ok(line) => {
                if let Some(keep_going) = handle_command(&line, &mut rl, &mut repl) {
                    if !keep_going {
                        break;
                    }
                    after_code = false;
                    continue;
                }

                match repl.session.buffer_mut().submit(&line) {
                    Submission::Appended => after_code = true,
                    Submission::Replaced(line_number) => {
                        println!("Line {line_number} updated.");
                        after_code = false;
                    }
                    Submission::LeftBlank(line_number) => {
                        println!("Line {line_number} remains empty.");
                        after_code = false;
                    }
                    Submission::Ignored => {}
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", gray("(Use :quit or Ctrl-D to exit)"));
            }
            Err(ReadlineError::Eof) => {
                if prompt_to_save(&mut rl, &mut repl.session, true) {
                    println!("{}", info("\nExiting Goblin REPL."));
                    break;
                }
            }
            Err(err) => {
                eprintln!("{} {:?}", error("Error:"), err);
                break;
            }
        }
    }

    if let Some(parent) = repl.history.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!(
                "{} failed to create history directory {}: {}",
                error("Warning:"),
                parent.display(),
                err
            );
        }
    }
    if let Err(err) = rl.save_history(&repl.history) {
        eprintln!(
            "{} failed to save history to {}: {}",
            error("Warning:"),
            repl.history.display(),
            err
        );
    }
    Ok(())
}

/// Handle REPL commands. Returns Some(true) to continue, Some(false) to quit, None if not a command.
fn handle_command<H: Helper>(
    line: &str,
    rl: &mut Editor<H, DefaultHistory>,
    repl: &mut Repl,
) -> Option<bool> {
    let command = match parse_repl_command(line) {
        ParsedCommand::NotACommand => return None,
        ParsedCommand::InvalidUsage(usage) => {
            println!("{}", info(usage));
            return Some(true);
        }
        ParsedCommand::Command(command) => command,
    };
    debug!(?command, "repl command");

    match command {
        ReplCommand::Quit => {
            if !prompt_to_save(rl, &mut repl.session, true) {
                return Some(true);
            }
            println!("{}", info(&format!("\nGoblin v{VERSION} - {HOMEPAGE}")));
            return Some(false);
        }
        ReplCommand::Help => print_help(),
        ReplCommand::Run(args) => cmd_run(repl, args),
        ReplCommand::Sys(command_line) => cmd_sys(command_line),
        ReplCommand::Clear => {
            if prompt_to_save(rl, &mut repl.session, false) {
                repl.session.clear();
                println!("{}", info("Code buffer cleared."));
            }
        }
        ReplCommand::Show => print_buffer(repl.session.buffer().lines()),
        ReplCommand::Tidy => cmd_tidy(repl),
        ReplCommand::List => cmd_list(repl.session.store()),
        ReplCommand::Save(name) => cmd_save(&mut repl.session, name),
        ReplCommand::SaveAs(name) => match repl.session.save_as(name) {
            Ok(path) => println!(
                "{}",
                success(&format!(
                    "Code successfully saved as '{}'. Current snippet is now '{}'.",
                    file_name_of(&path),
                    repl.session.snippet_name().unwrap_or_default()
                ))
            ),
            Err(err) => report(&err),
        },
        ReplCommand::Load(name) => {
            if prompt_to_save(rl, &mut repl.session, false) {
                match repl.session.load(name) {
                    Ok(path) => println!(
                        "{}",
                        success(&format!(
                            "Code successfully loaded from '{}'. Buffer reset and updated.",
                            path.display()
                        ))
                    ),
                    Err(err) => report(&err),
                }
            }
        }
        ReplCommand::Rename(name) => match repl.session.rename(name) {
            Ok(path) => println!(
                "{}",
                success(&format!(
                    "Snippet successfully renamed to '{}'.",
                    file_name_of(&path)
                ))
            ),
            Err(err) => report(&err),
        },
        ReplCommand::Export(path) => {
            let home = dirs::home_dir();
            match repl.session.export(path, home.as_deref()) {
                Ok(exported) => {
                    if exported.defaulted {
                        println!(
                            "{}",
                            info(&format!(
                                "No filename provided. Exporting to '{}' in home directory.",
                                file_name_of(&exported.path)
                            ))
                        );
                    }
                    println!(
                        "{}",
                        success(&format!(
                            "Code successfully exported to '{}'.",
                            exported.path.display()
                        ))
                    );
                }
                Err(err) => report(&err),
            }
        }
        ReplCommand::Edit => match edit_lines(&repl.editor, repl.session.buffer().lines()) {
            Ok(lines) => {
                repl.session.buffer_mut().replace_contents(lines);
                println!("{}", success("Buffer updated from editor."));
            }
            Err(err) => report(&err),
        },
        ReplCommand::Undo => match repl.session.buffer_mut().undo() {
            Undo::Removed(_) => println!("{}", success("Last entry removed.")),
            Undo::NothingToUndo => println!("{}", info("Buffer is empty, nothing to undo.")),
        },
        ReplCommand::Delete(arg) => {
            let buffer = repl.session.buffer_mut();
            let max = buffer.len();
            match parse_line_number(arg, max).and_then(|n| buffer.delete(n).map(|d| (n, d))) {
                Ok((line_number, deleted)) => {
                    if deleted.cancelled_insert {
                        println!("{}", info("Insert mode cancelled."));
                    }
                    println!(
                        "{}",
                        success(&format!("Line {line_number} deleted. Current buffer:"))
                    );
                    print_buffer(buffer.lines());
                }
                Err(err) => report(&err),
            }
        }
        ReplCommand::Insert(arg) => {
            let buffer = repl.session.buffer_mut();
            let max = buffer.len() + 1;
            match parse_line_number(arg, max).and_then(|n| buffer.insert_blank(n).map(|()| n)) {
                Ok(line_number) => println!(
                    "{}",
                    success(&format!(
                        "Empty line inserted at line {line_number}. Enter code at the prompt."
                    ))
                ),
                Err(err) => report(&err),
            }
        }
    }
    Some(true)
}

/// Parse a 1-based line number argument. Range checks are left to the buffer.
fn parse_line_number(arg: &str, max: usize) -> Result<usize, goblin_core::BufferError> {
    arg.parse::<usize>()
        .map_err(|_| goblin_core::BufferError::NotANumber {
            input: arg.to_string(),
            max,
        })
}

fn report(err: &dyn std::error::Error) {
    eprintln!("{} {}", error("Error:"), err);
}

/// Reply to the unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveAnswer {
    Yes,
    No,
    Invalid,
    Interrupted,
    EndOfInput,
}

impl SaveAnswer {
    fn from_reply(reply: Result<&str, &ReadlineError>) -> Self {
        match reply {
            Ok(answer) => match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => Self::Yes,
                "n" | "no" => Self::No,
                _ => Self::Invalid,
            },
            Err(ReadlineError::Eof) => Self::EndOfInput,
            Err(_) => Self::Interrupted,
        }
    }
}

/// What the caller of the save prompt does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveDecision {
    Save,
    Proceed,
    Stay,
}

/// `leaving` is set when the REPL is about to exit. Input that has already
/// ended cannot answer again, so it discards instead of staying.
fn save_decision(answer: SaveAnswer, leaving: bool) -> SaveDecision {
    match answer {
        SaveAnswer::Yes => SaveDecision::Save,
        SaveAnswer::No => SaveDecision::Proceed,
        SaveAnswer::EndOfInput if leaving => SaveDecision::Proceed,
        SaveAnswer::Invalid | SaveAnswer::Interrupted | SaveAnswer::EndOfInput => {
            SaveDecision::Stay
        }
    }
}

/// Offer to save a dirty buffer. Returns true when the calling action may
/// proceed.
fn prompt_to_save<H: Helper>(
    rl: &mut Editor<H, DefaultHistory>,
    session: &mut Session,
    leaving: bool,
) -> bool {
    if !session.buffer().is_dirty() {
        return true;
    }

    let reply = rl.readline(&info("Current snippet has unsaved changes. Save now? (y/n) "));
    let answer = SaveAnswer::from_reply(reply.as_deref());
    match save_decision(answer, leaving) {
        SaveDecision::Save => {
            cmd_save(session, None);
            !session.buffer().is_dirty()
        }
        SaveDecision::Proceed => {
            if answer == SaveAnswer::EndOfInput {
                println!("{}", error("\nUnsaved changes discarded."));
            }
            true
        }
        SaveDecision::Stay => {
            let message = match answer {
                SaveAnswer::Invalid => "Invalid input. Operation cancelled.",
                _ => "\nOperation cancelled.",
            };
            println!("{}", error(message));
            false
        }
    }
}

fn cmd_run(repl: &mut Repl, args: Option<&str>) {
    let buffer = repl.session.buffer();
    if buffer.pending_insert().is_some() {
        println!(
            "{}",
            info("Cannot run while in insert mode. Finish editing the line first.")
        );
        return;
    }
    if buffer.is_empty() {
        println!("{}", info("No code to run. Add statements first."));
        return;
    }

    let args = match args.map(shell_words::split).transpose() {
        Ok(args) => args.unwrap_or_default(),
        Err(err) => {
            eprintln!("{} invalid arguments: {}", error("Error:"), err);
            return;
        }
    };

    let start = Instant::now();
    let execution = match run_lines(buffer.lines(), &repl.toolchain, &args) {
        Ok(execution) => execution,
        Err(err) => {
            report(&err);
            return;
        }
    };
    let elapsed = humantime::format_duration(round_to_millis(start.elapsed()));

    println!("{}", info("--- Output ---"));
    print!("{}", output(&execution.output));
    if !execution.output.is_empty() && !execution.output.ends_with('\n') {
        println!();
    }
    println!("{}", info("--------------"));

    if execution.succeeded() {
        println!(
            "{} {}",
            success("Code Execution Successful."),
            gray(&format!("({elapsed})"))
        );
    } else {
        let status = match execution.exit_code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        eprintln!(
            "{} {}",
            error("Code Execution Finished with Error Status."),
            gray(&format!("({status}, {elapsed})"))
        );
    }
}

fn round_to_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

fn cmd_sys(command_line: &str) {
    let interactive = io::stdin().is_terminal();
    let outcome = parse_command_line(command_line)
        .and_then(|argv| run_system_command(&argv, interactive));
    match outcome {
        Ok(SysOutcome::Exited(status)) if !status.success() => {
            println!("{}", info(&format!("Command exited with {status}.")));
        }
        Ok(_) => {}
        Err(err) => eprintln!("{} {}", error("Error executing system command:"), err),
    }
}

fn cmd_tidy(repl: &mut Repl) {
    if repl.session.buffer().is_empty() {
        println!("{}", info("No code in buffer to tidy."));
        return;
    }
    match tidy(repl.session.buffer().lines(), &repl.formatter) {
        Ok(lines) => {
            repl.session.buffer_mut().replace_contents(lines);
            println!("{}", success("Code buffer tidied."));
            print_buffer(repl.session.buffer().lines());
        }
        Err(err) => eprintln!("{} {}", error("Error tidying code:"), err),
    }
}

fn cmd_list(store: &SnippetStore) {
    println!("{}", info("--- Saved Snippets ---"));
    match store.list() {
        Ok(entries) if entries.is_empty() => println!("{}", info("No saved files found.")),
        Ok(entries) => {
            for entry in entries {
                println!("> {} ({} bytes)", entry.file_name, entry.size);
            }
        }
        Err(err) => report(&err),
    }
    println!("{}", info("----------------------"));
}

fn cmd_save(session: &mut Session, name: Option<&str>) {
    match session.save(name) {
        Ok(saved) => {
            let file_name = file_name_of(&saved.path);
            match saved.target {
                SaveTarget::Named => {}
                SaveTarget::Current => println!(
                    "{}",
                    info(&format!(
                        "No filename provided. Saving to current snippet: '{file_name}'"
                    ))
                ),
                SaveTarget::Generated => println!(
                    "{}",
                    info(&format!(
                        "No filename provided. Saving to new file: '{file_name}'"
                    ))
                ),
            }
            println!(
                "{}",
                success(&format!(
                    "Code successfully saved to '{}'.",
                    saved.path.display()
                ))
            );
        }
        Err(err) => report(&err),
    }
}

fn print_buffer(lines: &[String]) {
    if lines.is_empty() {
        println!("{}", info("Code buffer is empty."));
        return;
    }
    println!("{}", info("\n--- Current Code Buffer ---"));
    for (i, line) in lines.iter().enumerate() {
        println!("{:4}: {}", i + 1, line);
    }
    println!("{}", info("---------------------------"));
}

fn print_banner(toolchain: &GoToolchain) {
    println!(
        "{}",
        bold(&info(&format!("Goblin v{VERSION} - An enhanced REPL for Go.")))
    );
    match toolchain.version() {
        Some(version) => println!("{}", info(&version)),
        None => println!("{}", error("Go toolchain not found; :run is unavailable.")),
    }
    println!("{}", info("Enter Go statements and type ':run' to execute."));
    println!("{}", info("Type 'fmt.Println(...)' to display results."));
    println!("{}\n", info("Type ':help' to see the available commands."));
    let _ = io::stdout().flush();
}

fn print_help() {
    const ROWS: &[(&str, &str)] = &[
        (":run [args...]", "Execute the buffer with optional program arguments"),
        (":sys <command> [args...]", "Execute a system command (Escape cancels)"),
        (":clear", "Clear the code buffer"),
        (":show", "Display the numbered code buffer"),
        (":tidy", "Format the buffer with gofmt"),
        (":list", "List saved snippets"),
        (":save [file]", "Save the buffer to a snippet"),
        (":saveas <file>", "Save to a new snippet and make it active"),
        (":load <file>", "Replace the buffer with a saved snippet"),
        (":rename <new_name>", "Rename the active snippet"),
        (":export [filepath]", "Write the buffer as a complete Go program"),
        (":edit", "Edit the buffer in $EDITOR"),
        (":u(ndo)", "Remove the last line"),
        (":d(elete) <line>", "Delete a line by number"),
        (":i(nsert) <line>", "Insert an empty line before a line number"),
        (":help", "Show this help"),
        (":q(uit), :exit, :bye", "Exit the REPL"),
    ];

    println!("{}", bold(&format!("Goblin v{VERSION} commands:")));
    for (command, summary) in ROWS {
        println!("  {:<26}{}", info(command), gray(summary));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repl_command() {
        assert_eq!(
            parse_repl_command(":run -n 3"),
            ParsedCommand::Command(ReplCommand::Run(Some("-n 3")))
        );
        assert_eq!(
            parse_repl_command(":run"),
            ParsedCommand::Command(ReplCommand::Run(None))
        );
        assert_eq!(
            parse_repl_command("  :save  my snippet "),
            ParsedCommand::Command(ReplCommand::Save(Some("my snippet")))
        );
        assert_eq!(
            parse_repl_command(":load"),
            ParsedCommand::InvalidUsage("Usage: :load <filename>")
        );
        assert_eq!(
            parse_repl_command(":sys ls -la"),
            ParsedCommand::Command(ReplCommand::Sys("ls -la"))
        );
        assert_eq!(parse_repl_command(":nope"), ParsedCommand::NotACommand);
        assert_eq!(parse_repl_command(":runx"), ParsedCommand::NotACommand);
        assert_eq!(parse_repl_command("x := 1"), ParsedCommand::NotACommand);
    }

    #[test]
    fn test_parse_aliases() {
        for alias in [":quit", ":exit", ":bye", ":q"] {
            assert_eq!(
                parse_repl_command(alias),
                ParsedCommand::Command(ReplCommand::Quit)
            );
        }
        assert_eq!(
            parse_repl_command(":u"),
            ParsedCommand::Command(ReplCommand::Undo)
        );
        assert_eq!(
            parse_repl_command(":d 2"),
            ParsedCommand::Command(ReplCommand::Delete("2"))
        );
        assert_eq!(
            parse_repl_command(":i 1"),
            ParsedCommand::Command(ReplCommand::Insert("1"))
        );
        assert_eq!(
            parse_repl_command(":delete"),
            ParsedCommand::InvalidUsage("Usage: :delete <line_number>")
        );
    }

    #[test]
    fn test_parse_line_number() {
        assert_eq!(parse_line_number("3", 5), Ok(3));
        let err = parse_line_number("three", 5).unwrap_err();
        assert_eq!(
            err,
            goblin_core::BufferError::NotANumber {
                input: "three".to_string(),
                max: 5
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid line number 'three': expected a number between 1 and 5"
        );
    }

    #[test]
    fn test_save_answer_from_reply() {
        assert_eq!(SaveAnswer::from_reply(Ok(" Y ")), SaveAnswer::Yes);
        assert_eq!(SaveAnswer::from_reply(Ok("no")), SaveAnswer::No);
        assert_eq!(SaveAnswer::from_reply(Ok("maybe")), SaveAnswer::Invalid);
        assert_eq!(
            SaveAnswer::from_reply(Err(&ReadlineError::Eof)),
            SaveAnswer::EndOfInput
        );
        assert_eq!(
            SaveAnswer::from_reply(Err(&ReadlineError::Interrupted)),
            SaveAnswer::Interrupted
        );
    }

    #[test]
    fn test_end_of_input_while_leaving_discards() {
        assert_eq!(
            save_decision(SaveAnswer::EndOfInput, true),
            SaveDecision::Proceed
        );
        assert_eq!(
            save_decision(SaveAnswer::EndOfInput, false),
            SaveDecision::Stay
        );
        assert_eq!(save_decision(SaveAnswer::Yes, true), SaveDecision::Save);
        assert_eq!(save_decision(SaveAnswer::No, false), SaveDecision::Proceed);
        assert_eq!(save_decision(SaveAnswer::Invalid, true), SaveDecision::Stay);
        assert_eq!(
            save_decision(SaveAnswer::Interrupted, true),
            SaveDecision::Stay
        );
    }

    #[test]
    fn test_round_to_millis() {
        assert_eq!(
            round_to_millis(Duration::from_micros(1_234_567)),
            Duration::from_millis(1_234)
        );
    }

    #[test]
    fn test_commands_complete_at_line_start() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SnippetStore::new(dir.path());
        store.save("hello", "x := 1").expect("save");
        let completer = GoblinCompleter { store };
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let (start, pairs) = completer.complete(":sa", 3, &ctx).expect("complete");
        assert_eq!(start, 0);
        let names: Vec<_> = pairs.iter().map(|p| p.replacement.as_str()).collect();
        assert_eq!(names, vec![":save", ":saveas"]);

        let (start, pairs) = completer.complete(":load he", 8, &ctx).expect("complete");
        assert_eq!(start, 6);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].replacement, "hello");

        let (_, pairs) = completer.complete("fmt.Pr", 6, &ctx).expect("complete");
        let names: Vec<_> = pairs.iter().map(|p| p.replacement.as_str()).collect();
        assert_eq!(names, vec!["fmt.Println", "fmt.Printf"]);
    }
}
