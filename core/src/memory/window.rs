//! Rolling conversation memory

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Number of turns kept by default
pub const DEFAULT_MEMORY_WINDOW: usize = 8;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
    Tool,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::Tool => "tool",
        };
        f.write_str(name)
    }
}

/// One entry of the conversation. Fields are private so a turn cannot change
/// after it has been appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: TurnRole,
    content: String,
}

impl Turn {
    pub fn new<S: Into<String>>(role: TurnRole, content: S) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    pub fn role(&self) -> TurnRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Fixed-capacity FIFO window of the most recent turns.
///
/// `len() <= capacity()` always holds; appending to a full window evicts the
/// oldest turn first.
#[derive(Debug, Clone)]
pub struct MemoryWindow {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl MemoryWindow {
    /// Create an empty window. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, turn: Turn) {
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Chronological copy of the current turns
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MemoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_never_exceeds_capacity() {
        for capacity in 1..=10 {
            let mut window = MemoryWindow::new(capacity);
            for count in 1..=25usize {
                window.append(Turn::user(format!("turn {}", count)));
                assert!(window.len() <= capacity);

                // Exactly the most recent min(count, capacity) turns, oldest first
                let expected: Vec<Turn> = (1..=count)
                    .skip(count.saturating_sub(capacity))
                    .map(|i| Turn::user(format!("turn {}", i)))
                    .collect();
                assert_eq!(window.snapshot(), expected);
            }
        }
    }

    #[test]
    fn test_eviction_is_fifo() {
        let mut window = MemoryWindow::new(2);
        window.append(Turn::user("q1"));
        window.append(Turn::assistant("a1"));
        window.append(Turn::user("q2"));

        let snapshot = window.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0], Turn::assistant("a1"));
        assert_eq!(snapshot[1], Turn::user("q2"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut window = MemoryWindow::default();
        window.append(Turn::user("hello"));
        let snapshot = window.snapshot();
        window.append(Turn::assistant("hi"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut window = MemoryWindow::new(4);
        window.append(Turn::user("hello"));
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 4);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut window = MemoryWindow::new(0);
        window.append(Turn::user("a"));
        window.append(Turn::user("b"));
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.snapshot(), vec![Turn::user("b")]);
    }

    #[test]
    fn test_turn_role_serialization() {
        let json = serde_json::to_string(&Turn::assistant("ok")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    }
}
