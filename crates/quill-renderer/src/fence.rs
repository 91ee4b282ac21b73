//! Fenced code block tracking for line-based passes.
//!
//! The footnote extractor and the extension scanner both walk the document
//! line by line and must leave fenced code untouched. A fence opens with a
//! run of three or more backticks or tildes; it closes with a run of the
//! same character at least as long, with nothing but whitespace after it.

/// Line-by-line fence state.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether the scan is currently inside a fenced block.
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line; returns `true` when the line itself is a fence
    /// boundary (opening or closing).
    pub(crate) fn observe(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.open {
            Some((marker, min_len)) => {
                if closes_fence(trimmed, marker, min_len) {
                    self.open = None;
                    true
                } else {
                    false
                }
            }
            None => {
                if let Some(opened) = opens_fence(trimmed) {
                    self.open = Some(opened);
                    true
                } else {
                    false
                }
            }
        }
    }
}

fn opens_fence(trimmed: &str) -> Option<(char, usize)> {
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = trimmed.chars().take_while(|c| *c == marker).count();
    (run >= 3).then_some((marker, run))
}

fn closes_fence(trimmed: &str, marker: char, min_len: usize) -> bool {
    let run = trimmed.chars().take_while(|c| *c == marker).count();
    run >= min_len && trimmed[run..].trim().is_empty()
}
