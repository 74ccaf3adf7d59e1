//! Line classification for reassembling REPL input into a Go program.
//!
//! Every buffer line belongs to one of three blocks of the synthesized
//! program: imports, top-level declarations, or statements for the body of
//! `main`. Multi-line constructs (import groups, `var (` groups, function
//! bodies) are followed with a single depth counter.
//!
//! Delimiters are counted on the raw line, including the ones that sit
//! inside string or comment literals. A statement such as
//! `fmt.Println("}")` therefore shifts the depth of an enclosing block.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

static IMPORT_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^import\s*\($").expect("import group pattern is valid"));

/// `import "path"`, `import "path"` without quotes, or `import alias "path"`.
static IMPORT_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import\s+((?:[\w.]+\s+"[\w/.\-]+")|(?:"?[\w/.\-]+"?))$"#)
        .expect("single import pattern is valid")
});

static DECL_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:var|const|type)\s+").expect("declaration pattern is valid"));

static FUNC_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^func\s+").expect("func pattern is valid"));

/// Block of the synthesized program a line is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Import,
    Declaration,
    Statement,
    Skip,
}

/// Delimiter pair whose balance keeps a multi-line block open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Paren,
    Brace,
}

impl Delimiter {
    /// Net number of opening delimiters on `line`.
    pub fn balance(self, line: &str) -> i32 {
        let (open, close) = match self {
            Delimiter::Paren => ('(', ')'),
            Delimiter::Brace => ('{', '}'),
        };
        line.chars().fold(0, |depth, ch| {
            if ch == open {
                depth + 1
            } else if ch == close {
                depth - 1
            } else {
                depth
            }
        })
    }
}

/// Which construct the classifier is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Default,
    /// Inside `import ( ... )`.
    ImportGroup,
    /// Inside a `var`/`const`/`type` declaration spanning several lines.
    DeclGroup(Delimiter),
    /// Inside the body of a top-level `func`.
    FuncBody,
}

/// State carried from one line to the next during a single partition pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierState {
    mode: Mode,
    depth: i32,
}

impl ClassifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// True while an import group, declaration group or function body is open.
    pub fn is_block_open(&self) -> bool {
        self.mode != Mode::Default
    }

    fn enter(&mut self, mode: Mode, depth: i32) {
        trace!(?mode, depth, "block opened");
        self.mode = mode;
        self.depth = depth;
    }

    /// Add `delta` to the depth and close the block once it is balanced.
    fn advance(&mut self, delta: i32) -> bool {
        self.depth += delta;
        if self.depth <= 0 {
            trace!(mode = ?self.mode, "block closed");
            self.mode = Mode::Default;
            self.depth = 0;
            true
        } else {
            false
        }
    }
}

/// A classified line together with the text it contributes to its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    /// An import spec. Single-line imports are rewritten to `\t"path"`.
    Import(Cow<'a, str>),
    Declaration(&'a str),
    Statement(&'a str),
    Skip,
}

impl Classified<'_> {
    pub fn bucket(&self) -> Bucket {
        match self {
            Classified::Import(_) => Bucket::Import,
            Classified::Declaration(_) => Bucket::Declaration,
            Classified::Statement(_) => Bucket::Statement,
            Classified::Skip => Bucket::Skip,
        }
    }

    /// Text emitted into the bucket, `None` for skipped lines.
    pub fn text(&self) -> Option<&str> {
        match self {
            Classified::Import(text) => Some(text.as_ref()),
            Classified::Declaration(text) | Classified::Statement(text) => Some(text),
            Classified::Skip => None,
        }
    }
}

/// Classify one raw line, updating `state` for the lines that follow.
pub fn classify<'a>(line: &'a str, state: &mut ClassifierState) -> Classified<'a> {
    match state.mode {
        Mode::Default => classify_top_level(line, state),
        Mode::ImportGroup => {
            if state.advance(Delimiter::Paren.balance(line)) {
                // The closing paren belongs to the skeleton's own group.
                Classified::Skip
            } else {
                Classified::Import(Cow::Borrowed(line))
            }
        }
        Mode::DeclGroup(delimiter) => {
            state.advance(delimiter.balance(line));
            Classified::Declaration(line)
        }
        Mode::FuncBody => {
            state.advance(Delimiter::Brace.balance(line));
            Classified::Declaration(line)
        }
    }
}

fn classify_top_level<'a>(line: &'a str, state: &mut ClassifierState) -> Classified<'a> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Classified::Skip;
    }

    if IMPORT_GROUP.is_match(trimmed) {
        state.enter(Mode::ImportGroup, 1);
        return Classified::Skip;
    }

    if let Some(caps) = IMPORT_SINGLE.captures(trimmed) {
        return Classified::Import(Cow::Owned(format!("\t{}", &caps[1])));
    }

    if DECL_START.is_match(trimmed) {
        let delimiter = if trimmed.ends_with('(') {
            Some(Delimiter::Paren)
        } else if trimmed.ends_with('{') {
            Some(Delimiter::Brace)
        } else {
            None
        };
        if let Some(delimiter) = delimiter {
            let depth = delimiter.balance(line);
            if depth > 0 {
                state.enter(Mode::DeclGroup(delimiter), depth);
            }
        }
        return Classified::Declaration(line);
    }

    if FUNC_START.is_match(trimmed) {
        let depth = Delimiter::Brace.balance(line);
        if depth > 0 {
            state.enter(Mode::FuncBody, depth);
        }
        return Classified::Declaration(line);
    }

    Classified::Statement(line)
}
