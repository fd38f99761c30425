//! Stack of cursor requests; the most recent live request wins.

#[cfg(test)]
#[path = "cursor_test.rs"]
mod cursor_test;

use tracing::warn;

pub const DEFAULT_CURSOR: &str = "default";

/// Proof of a push, handed back to [`CursorStack::pop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorToken(u64);

#[derive(Debug, Clone, Default)]
pub struct CursorStack {
    entries: Vec<(CursorToken, String)>,
    next: u64,
}

impl CursorStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `name` on top. Returns the token and whether the visible cursor changed.
    pub fn push(&mut self, name: &str) -> (CursorToken, bool) {
        let before = self.current().to_owned();
        self.next += 1;
        let token = CursorToken(self.next);
        self.entries.push((token, name.to_owned()));
        (token, before != name)
    }

    /// Remove the entry for `token`, wherever it sits. Returns whether the
    /// visible cursor changed.
    pub fn pop(&mut self, token: CursorToken) -> bool {
        let Some(pos) = self.entries.iter().position(|(t, _)| *t == token) else {
            warn!(?token, "cursor: pop of unknown token");
            return false;
        };
        let before = self.current().to_owned();
        self.entries.remove(pos);
        before != self.current()
    }

    /// The cursor to show.
    #[must_use]
    pub fn current(&self) -> &str {
        self.entries.last().map_or(DEFAULT_CURSOR, |(_, name)| name.as_str())
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}
