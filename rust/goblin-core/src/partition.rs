//! Splitting a buffer into import, declaration and statement blocks.

use tracing::debug;

use crate::classify::{classify, Classified, ClassifierState};

/// The three blocks of a buffer. Each block is the concatenation of its
/// lines, every line terminated by `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub imports: String,
    pub declarations: String,
    pub statements: String,
}

impl Partition {
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.declarations.is_empty() && self.statements.is_empty()
    }

    /// Import specs without blank lines or surrounding whitespace.
    pub fn import_specs(&self) -> impl Iterator<Item = &str> {
        self.imports
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

/// Run the classifier over every line, in order.
pub fn partition<S: AsRef<str>>(lines: &[S]) -> Partition {
    let mut state = ClassifierState::new();
    let mut parts = Partition::default();

    for line in lines {
        match classify(line.as_ref(), &mut state) {
            Classified::Import(text) => push_line(&mut parts.imports, &text),
            Classified::Declaration(text) => push_line(&mut parts.declarations, text),
            Classified::Statement(text) => push_line(&mut parts.statements, text),
            Classified::Skip => {}
        }
    }

    if state.is_block_open() {
        debug!(
            mode = ?state.mode(),
            depth = state.depth(),
            "buffer ends inside an open block"
        );
    }
    parts
}

/// Partition a whole source text, splitting it on `\n`.
pub fn partition_source(source: &str) -> Partition {
    let lines: Vec<&str> = source.split('\n').collect();
    partition(&lines)
}

fn push_line(block: &mut String, line: &str) {
    block.push_str(line);
    block.push('\n');
}
