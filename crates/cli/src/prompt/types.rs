//! Type definitions for interactive prompting.
//!
//! This module defines the state of the list selector and the outcome lines
//! printed after each answered prompt.

use std::fmt::{Display, Formatter};

/// Direction to move through the options of the list selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleDirection {
    Up,
    Down,
}

/// Selection state of the list selector.
///
/// The index always points at an option; moving past either end wraps
/// around to the other.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ListState {
    pub selected_index: usize,
    pub option_count: usize,
}

impl ListState {
    /// Starts at `initial`, or at the first option when `initial` is out of range.
    #[must_use]
    pub fn new(option_count: usize, initial: usize) -> Self {
        Self {
            selected_index: if initial < option_count { initial } else { 0 },
            option_count,
        }
    }

    #[must_use]
    pub fn move_selected_index(&self, direction: CycleDirection) -> Self {
        if self.option_count == 0 {
            return self.clone();
        }

        let selected_index = match direction {
            CycleDirection::Up if self.selected_index == 0 => self.option_count - 1,
            CycleDirection::Up => self.selected_index - 1,
            CycleDirection::Down => (self.selected_index + 1) % self.option_count,
        };

        Self {
            selected_index,
            option_count: self.option_count,
        }
    }
}

/// Outcome line printed once a prompt has been answered.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Announcement {
    Accepted,
    Skipped,
    Selected(String),
}

impl Display for Announcement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Announcement::Accepted => f.write_str("✓ Accepted"),
            Announcement::Skipped => f.write_str("○ Skipped"),
            Announcement::Selected(option) => write!(f, "✓ Selected: {option}"),
        }
    }
}
