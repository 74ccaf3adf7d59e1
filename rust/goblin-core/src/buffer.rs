//! The line buffer edited from the REPL prompt.
//!
//! Line numbers taken and reported by this module are 1-based, matching the
//! numbered listing shown to the user. Out-of-range numbers are rejected and
//! leave the buffer untouched.

use tracing::debug;

/// Errors from positional buffer edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("invalid line number {line}: expected a number between 1 and {max}")]
    OutOfRange { line: usize, max: usize },

    #[error("invalid line number '{input}': expected a number between 1 and {max}")]
    NotANumber { input: String, max: usize },
}

/// What a non-command input line did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Appended,
    /// A pending insert was filled at this line.
    Replaced(usize),
    /// Empty input while an insert was pending; the blank line stays.
    LeftBlank(usize),
    /// Empty input with no insert pending.
    Ignored,
}

/// Result of `undo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undo {
    Removed(String),
    NothingToUndo,
}

/// Result of a successful `delete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deleted {
    pub line: String,
    /// The pending insert targeted the deleted line and was cancelled.
    pub cancelled_insert: bool,
}

/// Ordered source lines plus insert-mode and dirty tracking.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    lines: Vec<String>,
    /// Content as of the last load or save.
    snapshot: Vec<String>,
    /// 0-based index of the blank line the next input replaces.
    pending: Option<usize>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Buffer content joined with `\n`, as persisted.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// True when the content differs from the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.lines != self.snapshot
    }

    /// Record the current content as persisted.
    pub fn mark_clean(&mut self) {
        self.snapshot = self.lines.clone();
    }

    /// 1-based line the next input will replace, if an insert is pending.
    pub fn pending_insert(&self) -> Option<usize> {
        self.pending.map(|index| index + 1)
    }

    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Feed one non-command input line: it fills a pending insert or is
    /// appended.
    pub fn submit(&mut self, input: &str) -> Submission {
        match self.pending.take() {
            Some(index) if input.trim().is_empty() => Submission::LeftBlank(index + 1),
            Some(index) => {
                self.lines[index] = input.to_string();
                Submission::Replaced(index + 1)
            }
            None if input.trim().is_empty() => Submission::Ignored,
            None => {
                self.append(input);
                Submission::Appended
            }
        }
    }

    /// Remove the last line.
    pub fn undo(&mut self) -> Undo {
        let Some(line) = self.lines.pop() else {
            return Undo::NothingToUndo;
        };
        if self.pending == Some(self.lines.len()) {
            self.pending = None;
        }
        Undo::Removed(line)
    }

    /// Remove line `line_number`.
    pub fn delete(&mut self, line_number: usize) -> Result<Deleted, BufferError> {
        let index = self.index_of(line_number, self.lines.len())?;
        let line = self.lines.remove(index);

        let mut cancelled_insert = false;
        self.pending = match self.pending {
            Some(pending) if pending == index => {
                cancelled_insert = true;
                None
            }
            Some(pending) if pending > index => Some(pending - 1),
            other => other,
        };
        debug!(line_number, cancelled_insert, "line deleted");
        Ok(Deleted {
            line,
            cancelled_insert,
        })
    }

    /// Insert a blank line before `line_number` (up to one past the end) and
    /// make the next input replace it.
    pub fn insert_blank(&mut self, line_number: usize) -> Result<(), BufferError> {
        let index = self.index_of(line_number, self.lines.len() + 1)?;
        self.lines.insert(index, String::new());
        self.pending = Some(index);
        Ok(())
    }

    /// Replace the whole buffer with persisted content. The buffer is clean
    /// afterwards.
    pub fn load(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.pending = None;
        self.mark_clean();
    }

    pub fn clear(&mut self) {
        self.load(Vec::new());
    }

    /// Replace the whole buffer with edited content (`:tidy`, `:edit`).
    pub fn replace_contents(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.pending = None;
    }

    fn index_of(&self, line_number: usize, max: usize) -> Result<usize, BufferError> {
        if line_number == 0 || line_number > max {
            return Err(BufferError::OutOfRange {
                line: line_number,
                max,
            });
        }
        Ok(line_number - 1)
    }
}

impl<S: Into<String>> FromIterator<S> for Buffer {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut buffer = Buffer::new();
        buffer.load(iter.into_iter().map(Into::into).collect());
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> Buffer {
        lines.iter().copied().collect()
    }

    #[test]
    fn test_append_marks_dirty_and_undo_restores() {
        let mut buf = Buffer::new();
        assert!(!buf.is_dirty());
        assert_eq!(buf.submit("x := 1"), Submission::Appended);
        assert!(buf.is_dirty());
        assert_eq!(buf.undo(), Undo::Removed("x := 1".to_string()));
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_undo_on_empty_buffer() {
        let mut buf = Buffer::new();
        assert_eq!(buf.undo(), Undo::NothingToUndo);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut buf = Buffer::new();
        assert_eq!(buf.submit("   "), Submission::Ignored);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_delete_middle_line() {
        let mut buf = buffer(&["a", "b", "c"]);
        let deleted = buf.delete(2).expect("in range");
        assert_eq!(deleted.line, "b");
        assert_eq!(buf.lines(), &["a", "c"]);
        assert!(buf.is_dirty());
    }

    #[test]
    fn test_delete_out_of_range_leaves_buffer() {
        let mut buf = buffer(&["a", "b", "c"]);
        assert_eq!(
            buf.delete(5),
            Err(BufferError::OutOfRange { line: 5, max: 3 })
        );
        assert_eq!(buf.delete(0), Err(BufferError::OutOfRange { line: 0, max: 3 }));
        assert_eq!(buf.lines(), &["a", "b", "c"]);
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_insert_then_replace() {
        let mut buf = buffer(&["a", "b"]);
        buf.insert_blank(1).expect("in range");
        assert_eq!(buf.pending_insert(), Some(1));
        assert_eq!(buf.submit("x := 1"), Submission::Replaced(1));
        assert_eq!(buf.lines(), &["x := 1", "a", "b"]);
        assert_eq!(buf.pending_insert(), None);
    }

    #[test]
    fn test_insert_past_end_and_out_of_range() {
        let mut buf = buffer(&["a"]);
        buf.insert_blank(2).expect("one past the end is valid");
        assert_eq!(buf.lines(), &["a", ""]);
        assert_eq!(
            buf.insert_blank(4),
            Err(BufferError::OutOfRange { line: 4, max: 3 })
        );
        assert_eq!(buf.pending_insert(), Some(2));
    }

    #[test]
    fn test_empty_input_leaves_inserted_blank() {
        let mut buf = buffer(&["a"]);
        buf.insert_blank(1).expect("in range");
        assert_eq!(buf.submit(""), Submission::LeftBlank(1));
        assert_eq!(buf.lines(), &["", "a"]);
        assert_eq!(buf.pending_insert(), None);
        assert_eq!(buf.submit("b"), Submission::Appended);
    }

    #[test]
    fn test_delete_cancels_insert_on_deleted_line() {
        let mut buf = buffer(&["a", "b"]);
        buf.insert_blank(2).expect("in range");
        let deleted = buf.delete(2).expect("in range");
        assert!(deleted.cancelled_insert);
        assert_eq!(buf.pending_insert(), None);
        assert_eq!(buf.lines(), &["a", "b"]);
    }

    #[test]
    fn test_delete_above_pending_insert_shifts_it() {
        let mut buf = buffer(&["a", "b", "c"]);
        buf.insert_blank(3).expect("in range");
        let deleted = buf.delete(1).expect("in range");
        assert!(!deleted.cancelled_insert);
        assert_eq!(buf.pending_insert(), Some(2));
        buf.submit("z");
        assert_eq!(buf.lines(), &["b", "z", "c"]);
    }

    #[test]
    fn test_undo_of_pending_blank_cancels_insert() {
        let mut buf = buffer(&["a"]);
        buf.insert_blank(2).expect("in range");
        assert_eq!(buf.undo(), Undo::Removed(String::new()));
        assert_eq!(buf.pending_insert(), None);
    }

    #[test]
    fn test_load_and_clear_reset_state() {
        let mut buf = buffer(&["a"]);
        buf.insert_blank(1).expect("in range");
        buf.load(vec!["x".to_string(), "y".to_string()]);
        assert!(!buf.is_dirty());
        assert_eq!(buf.pending_insert(), None);

        buf.append("z");
        buf.clear();
        assert!(buf.is_empty());
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_replace_contents_tracks_dirtiness_by_content() {
        let mut buf = buffer(&["a", "b"]);
        buf.replace_contents(vec!["a".to_string(), "b".to_string()]);
        assert!(!buf.is_dirty());
        buf.replace_contents(vec!["b".to_string()]);
        assert!(buf.is_dirty());
        buf.mark_clean();
        assert!(!buf.is_dirty());
    }
}
