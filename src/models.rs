// Data models for the task list

use serde::{Deserialize, Serialize};

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub description: String,
    /// Always false when created; kept for snapshot compatibility.
    pub completed: bool,
}

impl Task {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            completed: false,
        }
    }
}

/// Draft being composed in the create/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub name: String,
    pub description: String,
}

impl TaskForm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// A draft with a whitespace-only name cannot be submitted
    pub fn is_submittable(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.description.clear();
    }

    pub fn to_task(&self) -> Task {
        Task::new(self.name.clone(), self.description.clone())
    }
}

/// Which task (if any) the form overwrites on submit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditState {
    pub is_editing: bool,
    pub edit_index: Option<usize>,
}
