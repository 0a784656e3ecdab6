// Task list state store with snapshot persistence

use crate::events::{StoreEvent, SubscriptionId, Subscribers};
use crate::filter::{SearchFilter, filter_tasks};
use crate::kv::{KvStore, validate_key};
use crate::models::{EditState, Task, TaskForm};
use crate::snapshot::{self, TASKS_KEY};
use eyre::{Context, Result};
use tracing::{debug, info, warn};

/// Result of `TaskStore::submit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The draft name was blank; nothing changed
    Ignored,
    /// A new task was appended at this index
    Created(usize),
    /// The task at this index was overwritten
    Replaced(usize),
}

/// Task list plus the transient form, edit, search and modal state
///
/// Every mutation of the task list writes a full snapshot to the backend
/// under a fixed key. Write failures are logged and reported through
/// `last_storage_error` and `StoreEvent::StorageFailed`; they never undo
/// the in-memory change.
pub struct TaskStore<K: KvStore> {
    backend: K,
    key: String,
    tasks: Vec<Task>,
    search_query: String,
    form: TaskForm,
    edit: EditState,
    modal_open: bool,
    last_storage_error: Option<String>,
    subscribers: Subscribers,
}

impl<K: KvStore> TaskStore<K> {
    /// Open a store over `backend`, loading the snapshot under the default key
    pub fn open(backend: K) -> Result<Self> {
        Self::open_with_key(backend, TASKS_KEY)
    }

    /// Open a store whose snapshot lives under `key`
    pub fn open_with_key(backend: K, key: &str) -> Result<Self> {
        validate_key(key)?;

        let mut store = Self {
            backend,
            key: key.to_string(),
            tasks: Vec::new(),
            search_query: String::new(),
            form: TaskForm::default(),
            edit: EditState::default(),
            modal_open: false,
            last_storage_error: None,
            subscribers: Subscribers::new(),
        };

        store.initialize()?;

        Ok(store)
    }

    /// Load the persisted snapshot, if any
    ///
    /// An absent or empty value yields an empty list. Anything else that does
    /// not parse as task data, whitespace included, is an error.
    fn initialize(&mut self) -> Result<()> {
        let raw = self
            .backend
            .get(&self.key)
            .wrap_err_with(|| format!("Failed to read task list from key: {}", self.key))?;

        self.tasks = match raw {
            Some(raw) if !raw.is_empty() => snapshot::decode(&raw)
                .wrap_err_with(|| format!("Failed to load task list from key: {}", self.key))?,
            _ => Vec::new(),
        };

        info!(key = %self.key, count = self.tasks.len(), "Loaded task list");
        Ok(())
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn edit_state(&self) -> EditState {
        self.edit
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_editing
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Message of the most recent failed snapshot write, cleared by the next successful one
    pub fn last_storage_error(&self) -> Option<&str> {
        self.last_storage_error.as_deref()
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut K {
        &mut self.backend
    }

    pub fn into_backend(self) -> K {
        self.backend
    }

    /// Tasks matching the current search query, in list order
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        filter_tasks(&self.tasks, &self.search_query)
    }

    /// Like `filtered_tasks`, paired with each task's position in the full list
    pub fn filtered_entries(&self) -> Vec<(usize, &Task)> {
        let filter = SearchFilter::new(&self.search_query);
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| filter.matches(task))
            .collect()
    }

    // ========================================================================
    // Writable state
    // ========================================================================

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.search_query {
            self.search_query = query;
            self.subscribers.emit(StoreEvent::SearchChanged);
        }
    }

    pub fn set_form(&mut self, form: TaskForm) {
        if form != self.form {
            self.form = form;
            self.subscribers.emit(StoreEvent::FormChanged);
        }
    }

    pub fn set_form_name(&mut self, name: impl Into<String>) {
        let form = TaskForm {
            name: name.into(),
            description: self.form.description.clone(),
        };
        self.set_form(form);
    }

    pub fn set_form_description(&mut self, description: impl Into<String>) {
        let form = TaskForm {
            name: self.form.name.clone(),
            description: description.into(),
        };
        self.set_form(form);
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Create a task from the draft, or overwrite the one being edited
    ///
    /// A draft whose name is blank after trimming is ignored and leaves all
    /// state untouched. Otherwise the form is reset and the modal closed.
    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.form.is_submittable() {
            debug!("submit: blank name, ignoring");
            return SubmitOutcome::Ignored;
        }

        let task = self.form.to_task();

        let outcome = if self.edit.is_editing {
            let target = self.edit.edit_index.filter(|&i| i < self.tasks.len());
            self.set_edit(EditState {
                is_editing: false,
                ..self.edit
            });
            match target {
                Some(index) => {
                    debug!(index, "submit: replacing task");
                    self.tasks[index] = task;
                    SubmitOutcome::Replaced(index)
                }
                None => {
                    warn!(edit_index = ?self.edit.edit_index, "submit: edit target no longer exists, appending");
                    self.tasks.push(task);
                    SubmitOutcome::Created(self.tasks.len() - 1)
                }
            }
        } else {
            self.tasks.push(task);
            debug!(index = self.tasks.len() - 1, "submit: appended task");
            SubmitOutcome::Created(self.tasks.len() - 1)
        };

        self.persist();

        self.reset_form();
        self.close_modal();

        outcome
    }

    /// Remove the task at `index`
    ///
    /// Out-of-range indices are ignored and return `None`.
    pub fn delete(&mut self, index: usize) -> Option<Task> {
        if index >= self.tasks.len() {
            debug!(index, len = self.tasks.len(), "delete: index out of range, ignoring");
            return None;
        }

        let removed = self.tasks.remove(index);
        debug!(index, "delete: removed task");
        self.persist();

        Some(removed)
    }

    /// Load the task at `index` into the form and open the modal for editing
    ///
    /// The modal is opened rather than toggled, so calling this while the
    /// modal is already open keeps it open. Returns false for an
    /// out-of-range index.
    pub fn edit(&mut self, index: usize) -> bool {
        let Some(task) = self.tasks.get(index) else {
            debug!(index, len = self.tasks.len(), "edit: index out of range, ignoring");
            return false;
        };

        let form = TaskForm::new(task.name.clone(), task.description.clone());
        self.set_edit(EditState {
            is_editing: true,
            edit_index: Some(index),
        });
        self.set_form(form);
        self.open_modal();

        true
    }

    /// Flip modal visibility; closing clears the draft and the editing flag
    pub fn toggle_modal(&mut self) {
        self.set_modal(!self.modal_open);
    }

    pub fn open_modal(&mut self) {
        self.set_modal(true);
    }

    pub fn close_modal(&mut self) {
        self.set_modal(false);
    }

    /// Clear the draft and all edit state, including the edit index
    pub fn reset_form(&mut self) {
        self.set_edit(EditState::default());
        self.clear_form();
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn set_edit(&mut self, edit: EditState) {
        if edit != self.edit {
            self.edit = edit;
            self.subscribers.emit(StoreEvent::EditChanged(edit));
        }
    }

    fn clear_form(&mut self) {
        if self.form != TaskForm::default() {
            self.form.clear();
            self.subscribers.emit(StoreEvent::FormChanged);
        }
    }

    fn set_modal(&mut self, open: bool) {
        let changed = self.modal_open != open;
        self.modal_open = open;

        if !open {
            // edit_index survives a close; only reset_form clears it
            self.set_edit(EditState {
                is_editing: false,
                ..self.edit
            });
            self.clear_form();
        }

        if changed {
            self.subscribers.emit(StoreEvent::ModalChanged { open });
        }
    }

    /// Write the full task list under the store key
    fn persist(&mut self) {
        let result = snapshot::encode(&self.tasks).and_then(|raw| self.backend.set(&self.key, &raw));

        match result {
            Ok(()) => {
                debug!(key = %self.key, count = self.tasks.len(), "Persisted task list");
                self.last_storage_error = None;
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(key = %self.key, error = %message, "Failed to persist task list, keeping in-memory state");
                self.last_storage_error = Some(message.clone());
                self.subscribers.emit(StoreEvent::StorageFailed { message });
            }
        }

        self.subscribers.emit(StoreEvent::TasksChanged { len: self.tasks.len() });
    }
}

impl<K: KvStore> std::fmt::Debug for TaskStore<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("key", &self.key)
            .field("tasks", &self.tasks)
            .field("search_query", &self.search_query)
            .field("form", &self.form)
            .field("edit", &self.edit)
            .field("modal_open", &self.modal_open)
            .finish()
    }
}
