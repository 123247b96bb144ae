use crate::contracts::Router;
use crate::contracts::RouterOp;

/// Browser-style history held in memory. Every navigation is recorded as a
/// [`RouterOp`].
#[derive(Debug, Default, Clone)]
pub struct MemoryRouter {
    entries: Vec<String>,
    cursor: usize,
    ops: Vec<RouterOp>,
}

impl MemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router opened on `url`, as when the dashboard is loaded from a link.
    pub fn at(url: impl Into<String>) -> Self {
        Self {
            entries: vec![url.into()],
            cursor: 0,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[RouterOp] {
        &self.ops
    }

    pub fn history(&self) -> &[String] {
        &self.entries
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}

impl Router for MemoryRouter {
    fn push(&mut self, url: &str) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(url.to_string());
        self.cursor = self.entries.len() - 1;
        self.ops.push(RouterOp::Push(url.to_string()));
    }

    fn replace(&mut self, url: &str) {
        match self.entries.get_mut(self.cursor) {
            Some(entry) => *entry = url.to_string(),
            None => {
                self.entries.push(url.to_string());
                self.cursor = 0;
            }
        }
        self.ops.push(RouterOp::Replace(url.to_string()));
    }

    fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    fn back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        let url = self.entries[self.cursor].as_str();
        self.ops.push(RouterOp::Back(url.to_string()));
        Some(url)
    }

    fn forward(&mut self) -> Option<&str> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        let url = self.entries[self.cursor].as_str();
        self.ops.push(RouterOp::Forward(url.to_string()));
        Some(url)
    }
}
