//! Local list state and its synchronization with the remote collection.
//!
//! # Design
//! `TodoList` owns the ordered tasks, the new-task draft and the single edit
//! session. Operations that need the backend return an [`Outgoing`]: a
//! request tagged with a [`Ticket`]. The host executes it and hands the
//! outcome back through [`TodoList::complete`], in whatever order the
//! responses arrive.
//!
//! Add, delete and save are applied when the backend confirms them. Toggle
//! flips `completed` immediately and rolls back if its request fails.
//!
//! Each task tracks its update requests still in flight. A successful
//! response is shown only if no newer update for the task is outstanding and
//! nothing newer has been shown; otherwise it is stale and only advances the
//! confirmed state. Once a task has no update in flight it settles on the
//! newest representation the backend confirmed, which is how a failed toggle
//! rolls back.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::client::TodoClient;
use crate::error::{ApiError, SyncError, ValidationError};
use crate::http::{HttpRequest, HttpResponse, TransportError};
use crate::types::{Task, TaskFields, TaskId};

/// Identifies one outstanding request. Tickets increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Load,
    Add,
    Delete,
    SaveEdit,
    Toggle,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpKind::Load => "load",
            OpKind::Add => "add",
            OpKind::Delete => "delete",
            OpKind::SaveEdit => "save",
            OpKind::Toggle => "toggle",
        })
    }
}

/// A request the host must execute and report back with the same ticket.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub ticket: Ticket,
    pub request: HttpRequest,
}

/// What a successful completion did to local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Loaded { count: usize },
    Added(TaskId),
    Deleted(TaskId),
    Saved(TaskId),
    Toggled(TaskId),
    /// A newer update for the task was issued or shown before this one
    /// returned.
    Stale(TaskId),
    /// A newer load was already applied.
    LoadSuperseded,
    /// The task is no longer in the local list.
    Orphaned(TaskId),
}

#[derive(Debug, Clone)]
enum Pending {
    Load,
    Add { submitted: String },
    Delete(TaskId),
    Update { id: TaskId, op: OpKind },
}

impl Pending {
    fn op(&self) -> OpKind {
        match self {
            Pending::Load => OpKind::Load,
            Pending::Add { .. } => OpKind::Add,
            Pending::Delete(_) => OpKind::Delete,
            Pending::Update { op, .. } => *op,
        }
    }
}

#[derive(Debug, Clone)]
struct EditSession {
    id: TaskId,
    text: String,
}

/// Per-task bookkeeping for update fencing and rollback.
#[derive(Debug, Clone)]
struct RowSync {
    /// Newest representation the backend acknowledged, and the ticket that
    /// produced it.
    confirmed: Task,
    confirmed_at: Ticket,
    /// Ticket of the response currently shown.
    shown_at: Ticket,
    /// Outstanding updates, each with the unconfirmed edit text it carries.
    updates: BTreeMap<Ticket, Option<String>>,
}

impl RowSync {
    fn confirmed(task: &Task, ticket: Ticket) -> Self {
        Self {
            confirmed: task.clone(),
            confirmed_at: ticket,
            shown_at: ticket,
            updates: BTreeMap::new(),
        }
    }

    /// Edit text of the newest outstanding save; later toggles send it
    /// instead of the displayed text so they don't revert the edit.
    fn pending_text(&self) -> Option<&String> {
        self.updates.values().rev().flatten().next()
    }

    fn newest_update(&self) -> Option<Ticket> {
        self.updates.keys().next_back().copied()
    }
}

#[derive(Debug)]
pub struct TodoList {
    client: TodoClient,
    tasks: Vec<Task>,
    draft_text: String,
    editing: Option<EditSession>,
    rows: HashMap<TaskId, RowSync>,
    in_flight: HashMap<Ticket, Pending>,
    loaded_at: Option<Ticket>,
    next_ticket: u64,
}

impl TodoList {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            tasks: Vec::new(),
            draft_text: String::new(),
            editing: None,
            rows: HashMap::new(),
            in_flight: HashMap::new(),
            loaded_at: None,
            next_ticket: 1,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn draft_text(&self) -> &str {
        &self.draft_text
    }

    pub fn editing_id(&self) -> Option<&TaskId> {
        self.editing.as_ref().map(|e| &e.id)
    }

    pub fn editing_text(&self) -> Option<&str> {
        self.editing.as_ref().map(|e| e.text.as_str())
    }

    /// Number of requests issued but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn load(&mut self) -> Outgoing {
        let request = self.client.build_list_tasks();
        self.issue(Pending::Load, request)
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft_text = text.into();
    }

    /// Create a task from the draft. The draft is sent untrimmed.
    pub fn add(&mut self) -> Result<Outgoing, SyncError> {
        if self.draft_text.trim().is_empty() {
            return Err(ValidationError::EmptyDraft.into());
        }
        let input = TaskFields {
            text: self.draft_text.clone(),
            completed: false,
        };
        let request = self
            .client
            .build_create_task(&input)
            .map_err(|source| SyncError::Request { op: OpKind::Add, source })?;
        Ok(self.issue(Pending::Add { submitted: input.text }, request))
    }

    /// Request deletion. The task stays visible until the backend confirms.
    pub fn delete(&mut self, id: &TaskId) -> Result<Outgoing, SyncError> {
        self.require_task(id)?;
        let request = self.client.build_delete_task(id);
        Ok(self.issue(Pending::Delete(id.clone()), request))
    }

    /// Start editing `id`, replacing any other edit session.
    pub fn begin_edit(&mut self, id: &TaskId) -> Result<(), SyncError> {
        let text = self.require_task(id)?.text.clone();
        self.editing = Some(EditSession { id: id.clone(), text });
        Ok(())
    }

    pub fn set_edit_text(&mut self, text: impl Into<String>) -> Result<(), SyncError> {
        let session = self.editing.as_mut().ok_or(SyncError::NotEditing)?;
        session.text = text.into();
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Send the edited text together with the task's current `completed`.
    /// The edit session stays open until the backend confirms.
    pub fn save_edit(&mut self) -> Result<Outgoing, SyncError> {
        let session = self.editing.as_ref().ok_or(SyncError::NotEditing)?;
        if session.text.trim().is_empty() {
            return Err(ValidationError::EmptyEdit.into());
        }
        let id = session.id.clone();
        let input = TaskFields {
            text: session.text.clone(),
            completed: self.require_task(&id)?.completed,
        };
        let request = self
            .client
            .build_update_task(&id, &input)
            .map_err(|source| SyncError::Request { op: OpKind::SaveEdit, source })?;
        let outgoing = self.issue(Pending::Update { id: id.clone(), op: OpKind::SaveEdit }, request);
        self.track_update(&id, outgoing.ticket, Some(input.text));
        Ok(outgoing)
    }

    /// Flip `completed` locally, then send the task's new state.
    pub fn toggle_complete(&mut self, id: &TaskId) -> Result<Outgoing, SyncError> {
        let index = self
            .tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| SyncError::UnknownTask(id.clone()))?;
        let pending_text = self.rows.get(id).and_then(RowSync::pending_text).cloned();
        let input = TaskFields {
            text: pending_text
                .clone()
                .unwrap_or_else(|| self.tasks[index].text.clone()),
            completed: !self.tasks[index].completed,
        };
        let request = self
            .client
            .build_update_task(id, &input)
            .map_err(|source| SyncError::Request { op: OpKind::Toggle, source })?;

        self.tasks[index].completed = input.completed;
        let outgoing = self.issue(Pending::Update { id: id.clone(), op: OpKind::Toggle }, request);
        self.track_update(id, outgoing.ticket, pending_text);
        tracing::debug!(%id, completed = input.completed, ticket = %outgoing.ticket, "toggled locally");
        Ok(outgoing)
    }

    // -----------------------------------------------------------------------
    // Completions
    // -----------------------------------------------------------------------

    /// Apply the outcome of the request issued under `ticket`.
    ///
    /// On failure the error is returned after any rollback has been applied;
    /// an unknown ticket changes nothing.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Result<Applied, SyncError> {
        let pending = self
            .in_flight
            .remove(&ticket)
            .ok_or(SyncError::UnknownTicket(ticket))?;
        let op = pending.op();
        let response = outcome.map_err(ApiError::from);
        let failed = |source: ApiError| {
            tracing::warn!(%ticket, %op, error = %source, "request failed");
            SyncError::Request { op, source }
        };

        match pending {
            Pending::Load => {
                let tasks = response
                    .and_then(|r| self.client.parse_list_tasks(r))
                    .map_err(failed)?;
                if self.loaded_at.is_some_and(|newest| newest > ticket) {
                    tracing::debug!(%ticket, "discarding load superseded by a newer one");
                    return Ok(Applied::LoadSuperseded);
                }
                Ok(self.replace_all(ticket, tasks))
            }
            Pending::Add { submitted } => {
                let task = response
                    .and_then(|r| self.client.parse_create_task(r))
                    .map_err(failed)?;
                if self.draft_text == submitted {
                    self.draft_text.clear();
                }
                let id = task.id.clone();
                self.rows.insert(id.clone(), RowSync::confirmed(&task, ticket));
                self.tasks.push(task);
                tracing::debug!(%id, %ticket, "added");
                Ok(Applied::Added(id))
            }
            Pending::Delete(id) => {
                response
                    .and_then(|r| self.client.parse_delete_task(r))
                    .map_err(failed)?;
                self.tasks.retain(|t| t.id != id);
                self.rows.remove(&id);
                if self.editing_id() == Some(&id) {
                    self.editing = None;
                }
                tracing::debug!(%id, %ticket, "deleted");
                Ok(Applied::Deleted(id))
            }
            Pending::Update { id, op } => {
                match response.and_then(|r| self.client.parse_update_task(r)) {
                    Ok(task) => Ok(self.apply_update(ticket, op, id, task)),
                    Err(source) => {
                        self.settle_failed_update(ticket, &id);
                        Err(failed(source))
                    }
                }
            }
        }
    }

    /// Updates issued before `ticket` become stale for the new rows.
    fn replace_all(&mut self, ticket: Ticket, tasks: Vec<Task>) -> Applied {
        self.loaded_at = Some(ticket);
        self.rows = tasks
            .iter()
            .map(|t| (t.id.clone(), RowSync::confirmed(t, ticket)))
            .collect();
        self.tasks = tasks;
        let edit_target_gone = self
            .editing_id()
            .is_some_and(|id| !self.rows.contains_key(id));
        if edit_target_gone {
            self.editing = None;
        }
        tracing::debug!(count = self.tasks.len(), "loaded");
        Applied::Loaded { count: self.tasks.len() }
    }

    fn apply_update(&mut self, ticket: Ticket, op: OpKind, id: TaskId, task: Task) -> Applied {
        if op == OpKind::SaveEdit && self.editing_id() == Some(&id) {
            self.editing = None;
        }
        let Some(row) = self.rows.get_mut(&id) else {
            tracing::debug!(%id, %ticket, "update response for a task no longer listed");
            return Applied::Orphaned(id);
        };
        row.updates.remove(&ticket);
        if ticket > row.confirmed_at {
            row.confirmed = task.clone();
            row.confirmed_at = ticket;
        }
        let newer_outstanding = row.newest_update().is_some_and(|newest| newest > ticket);
        if newer_outstanding || ticket < row.shown_at {
            tracing::debug!(%id, %ticket, shown = %row.shown_at, "discarding stale update response");
            if row.updates.is_empty() {
                row.shown_at = row.confirmed_at;
                let settled = row.confirmed.clone();
                self.show(settled);
            }
            return Applied::Stale(id);
        }
        row.shown_at = ticket;
        self.show(task);
        match op {
            OpKind::SaveEdit => Applied::Saved(id),
            _ => Applied::Toggled(id),
        }
    }

    /// Drop a failed update. Once no update for the task is outstanding, the
    /// task falls back to the newest confirmed representation; until then
    /// the remaining requests settle it.
    fn settle_failed_update(&mut self, ticket: Ticket, id: &TaskId) {
        let Some(row) = self.rows.get_mut(id) else {
            return;
        };
        row.updates.remove(&ticket);
        if !row.updates.is_empty() {
            return;
        }
        row.shown_at = row.confirmed_at;
        let confirmed = row.confirmed.clone();
        if self.task(id) != Some(&confirmed) {
            tracing::info!(%id, completed = confirmed.completed, "rolled back to confirmed state");
            self.show(confirmed);
        }
    }

    fn show(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn issue(&mut self, pending: Pending, request: HttpRequest) -> Outgoing {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        tracing::debug!(%ticket, op = %pending.op(), method = request.method.as_str(), path = %request.path, "issuing");
        self.in_flight.insert(ticket, pending);
        Outgoing { ticket, request }
    }

    fn require_task(&self, id: &TaskId) -> Result<&Task, SyncError> {
        self.task(id).ok_or_else(|| SyncError::UnknownTask(id.clone()))
    }

    fn track_update(&mut self, id: &TaskId, ticket: Ticket, carried_text: Option<String>) {
        if let Some(row) = self.rows.get_mut(id) {
            row.updates.insert(ticket, carried_text);
        }
    }
}
