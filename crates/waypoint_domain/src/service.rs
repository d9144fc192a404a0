use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::completion::{
    complete_occurrence, resolve_toggle_target, toggle_one_off, uncomplete_occurrence,
};
use crate::error::DomainError;
use crate::notifications::{reminder_context, ReminderSink};
use crate::ordering::{sort_tasks, Geolocator, NoGeolocation, SortMode};
use crate::recurrence::{is_task_completed, is_task_completed_on};
use crate::settings::Settings;
use crate::task::{Category, Schedule, Task, TaskDraft, TaskId};

/// In-memory task store plus the mutation entry points and their policy side
/// effects. The host's persistence layer snapshots the service's state and
/// guarantees call-level atomicity; nothing here reenters itself.
pub struct TaskService {
    settings: Settings,
    tasks: RwLock<HashMap<TaskId, Task>>,
    categories: RwLock<HashMap<String, Category>>,
    next_id: RwLock<u64>,
    reminder_sink: Option<Box<dyn ReminderSink>>,
    geolocator: Box<dyn Geolocator>,
}

pub struct TaskServiceBuilder {
    settings: Settings,
    reminder_sink: Option<Box<dyn ReminderSink>>,
    geolocator: Box<dyn Geolocator>,
}

impl TaskServiceBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            reminder_sink: None,
            geolocator: Box::new(NoGeolocation),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_reminder_sink(mut self, sink: Box<dyn ReminderSink>) -> Self {
        self.reminder_sink = Some(sink);
        self
    }

    pub fn with_geolocator(mut self, geolocator: Box<dyn Geolocator>) -> Self {
        self.geolocator = geolocator;
        self
    }

    pub fn build(self) -> TaskService {
        TaskService {
            settings: self.settings,
            tasks: RwLock::new(HashMap::new()),
            categories: RwLock::new(HashMap::new()),
            next_id: RwLock::new(1),
            reminder_sink: self.reminder_sink,
            geolocator: self.geolocator,
        }
    }
}

impl Default for TaskServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskService {
    pub fn builder() -> TaskServiceBuilder {
        TaskServiceBuilder::new()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Create a task from a draft. `today` becomes its immutable creation
    /// date; an absent priority falls back to the configured default.
    pub fn create_task(&self, draft: TaskDraft, today: NaiveDate) -> Result<TaskId> {
        self.ensure_known_category(draft.category.as_deref())?;
        let id = self.allocate_id();
        let mut task = Task::new(id, today, draft, self.settings.default_priority);
        task.is_expanded = self.settings.expand_cells_by_default;
        self.sync_reminders(&task, today);
        tracing::debug!(?id, title = %task.title, "created task");
        self.tasks.write().insert(id, task);
        Ok(id)
    }

    /// Replace a task's editable fields. Creation date, completion history
    /// and lifecycle flags survive the edit.
    pub fn update_task(&self, id: TaskId, draft: TaskDraft, today: NaiveDate) -> Result<()> {
        self.ensure_known_category(draft.category.as_deref())?;
        let mut tasks = self.tasks.write();
        let task = tasks.get_mut(&id).ok_or(DomainError::UnknownTask(id))?;
        task.title = draft.title;
        task.notes = draft.notes;
        if let Some(priority) = draft.priority {
            task.priority = priority;
        }
        task.category = draft.category;
        task.schedule = draft.schedule;
        task.location = draft.location;
        task.reminders = draft.reminders;
        self.sync_reminders(task, today);
        Ok(())
    }

    pub fn get_task(&self, id: TaskId) -> Result<Task> {
        self.tasks
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::UnknownTask(id).into())
    }

    pub fn tasks(&self) -> Vec<Task> {
        let tasks = self.tasks.read();
        let mut all: Vec<Task> = tasks.values().cloned().collect();
        all.sort_by_key(|task| task.id);
        all
    }

    /// The forward-looking toggle used by list and home screens: complete
    /// the next open occurrence, or catch up on the last missed one when
    /// nothing lies ahead. One-off tasks just flip their flag.
    pub fn toggle_task(&self, id: TaskId, today: NaiveDate) -> Result<()> {
        let mut tasks = self.tasks.write();
        let task = tasks.get_mut(&id).ok_or(DomainError::UnknownTask(id))?;
        if task.is_routine() {
            if let Some(target) = resolve_toggle_target(task, today) {
                complete_occurrence(task, target)?;
            }
        } else {
            toggle_one_off(task);
        }
        self.after_completion_mutation(&mut tasks, id, today);
        Ok(())
    }

    /// The calendar-view toggle: acts on the day being looked at, undoing an
    /// occurrence that is already recorded there.
    pub fn toggle_occurrence(&self, id: TaskId, date: NaiveDate, today: NaiveDate) -> Result<()> {
        let mut tasks = self.tasks.write();
        let task = tasks.get_mut(&id).ok_or(DomainError::UnknownTask(id))?;
        if task.is_routine() {
            if task.completed_dates.contains(&date) {
                uncomplete_occurrence(task, date)?;
                task.is_expanded = true;
            } else {
                complete_occurrence(task, date)?;
                task.is_expanded = false;
            }
        } else {
            toggle_one_off(task);
        }
        self.after_completion_mutation(&mut tasks, id, today);
        Ok(())
    }

    pub fn complete_occurrence(&self, id: TaskId, date: NaiveDate, today: NaiveDate) -> Result<()> {
        let mut tasks = self.tasks.write();
        let task = tasks.get_mut(&id).ok_or(DomainError::UnknownTask(id))?;
        complete_occurrence(task, date)?;
        self.after_completion_mutation(&mut tasks, id, today);
        Ok(())
    }

    pub fn uncomplete_occurrence(
        &self,
        id: TaskId,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<()> {
        let mut tasks = self.tasks.write();
        let task = tasks.get_mut(&id).ok_or(DomainError::UnknownTask(id))?;
        uncomplete_occurrence(task, date)?;
        self.after_completion_mutation(&mut tasks, id, today);
        Ok(())
    }

    /// Hard-delete on explicit user request. Deleting an id that is already
    /// gone is a no-op.
    pub fn delete_task(&self, id: TaskId) {
        let removed = self.tasks.write().remove(&id);
        if let Some(mut task) = removed {
            task.is_deleted = true;
            if let Some(sink) = &self.reminder_sink {
                sink.clear(id);
            }
            tracing::debug!(?id, "deleted task");
        }
    }

    pub fn add_category(&self, category: Category) -> Result<()> {
        let mut categories = self.categories.write();
        if categories.contains_key(&category.title) {
            return Err(DomainError::DuplicateCategory(category.title).into());
        }
        categories.insert(category.title.clone(), category);
        Ok(())
    }

    /// Remove a category. Tasks that referenced it are nullified, never
    /// cascaded away.
    pub fn delete_category(&self, title: &str) -> Result<()> {
        let removed = self.categories.write().remove(title);
        if removed.is_none() {
            return Err(DomainError::UnknownCategory(title.to_string()).into());
        }
        let mut tasks = self.tasks.write();
        for task in tasks.values_mut() {
            if task.category.as_deref() == Some(title) {
                task.category = None;
            }
        }
        tracing::debug!(title, "deleted category and nullified its tasks");
        Ok(())
    }

    pub fn categories(&self) -> Vec<Category> {
        let categories = self.categories.read();
        let mut all: Vec<Category> = categories.values().cloned().collect();
        all.sort_by(|a, b| a.title.cmp(&b.title));
        all
    }

    /// Snapshot of every task, ordered for one display mode.
    pub fn sorted_tasks(&self, mode: SortMode, today: NaiveDate) -> Vec<Task> {
        let mut all = self.tasks();
        sort_tasks(&mut all, mode, today, self.geolocator.as_ref());
        all
    }

    /// The list screen's feed: honors the hide-completed switch and the
    /// configured list sort.
    pub fn visible_tasks(&self, today: NaiveDate) -> Vec<Task> {
        let mut all = self.tasks();
        if self.settings.hide_completed_in_list {
            all.retain(|task| !is_task_completed(task, today));
        }
        sort_tasks(&mut all, self.settings.list_sort, today, self.geolocator.as_ref());
        all
    }

    /// Tasks scheduled on one calendar day: one-offs pinned to it plus
    /// routines whose rule produces it.
    pub fn tasks_on(&self, date: NaiveDate, today: NaiveDate) -> Vec<Task> {
        let mut matching: Vec<Task> = self
            .tasks()
            .into_iter()
            .filter(|task| Self::scheduled_on(task, date))
            .filter(|task| {
                !self.settings.hide_completed_in_calendar || !is_task_completed_on(task, date)
            })
            .collect();
        sort_tasks(
            &mut matching,
            self.settings.calendar_sort,
            today,
            self.geolocator.as_ref(),
        );
        matching
    }

    /// Week-strip dot query: does any (visible) task land on this day?
    pub fn day_has_tasks(&self, date: NaiveDate) -> bool {
        self.tasks.read().values().any(|task| {
            Self::scheduled_on(task, date)
                && (!self.settings.hide_completed_in_calendar
                    || !is_task_completed_on(task, date))
        })
    }

    /// Expand or shrink every task card at once.
    pub fn set_all_expanded(&self, expanded: bool) {
        for task in self.tasks.write().values_mut() {
            task.is_expanded = expanded;
        }
    }

    fn scheduled_on(task: &Task, date: NaiveDate) -> bool {
        match &task.schedule {
            Schedule::Floating => false,
            Schedule::Once { date: scheduled, .. } => *scheduled == date,
            Schedule::Routine(_) => task
                .routine_state()
                .map(|state| state.occurs_on(date))
                .unwrap_or(false),
        }
    }

    fn allocate_id(&self) -> TaskId {
        let mut next = self.next_id.write();
        let id = TaskId(*next);
        *next += 1;
        id
    }

    fn ensure_known_category(&self, category: Option<&str>) -> Result<()> {
        if let Some(title) = category {
            if !self.categories.read().contains_key(title) {
                return Err(DomainError::UnknownCategory(title.to_string()).into());
            }
        }
        Ok(())
    }

    /// Runs after every completion mutation: re-expose reminder state, and
    /// apply the delete-on-completion policy. Idempotent — a task that was
    /// already removed is left alone.
    fn after_completion_mutation(
        &self,
        tasks: &mut HashMap<TaskId, Task>,
        id: TaskId,
        today: NaiveDate,
    ) {
        let Some(task) = tasks.get_mut(&id) else {
            return;
        };
        let completed = is_task_completed(task, today);
        if completed && self.settings.delete_on_completion {
            task.is_deleted = true;
            if let Some(sink) = &self.reminder_sink {
                sink.clear(id);
            }
            tasks.remove(&id);
            tracing::debug!(?id, "removed task on completion per policy");
            return;
        }
        if let Some(task) = tasks.get(&id) {
            if completed {
                if let Some(sink) = &self.reminder_sink {
                    sink.clear(id);
                }
            } else {
                self.sync_reminders(task, today);
            }
        }
    }

    fn sync_reminders(&self, task: &Task, today: NaiveDate) {
        if let Some(sink) = &self.reminder_sink {
            let context = reminder_context(task, today, self.settings.reminder_time);
            sink.sync(&context);
        }
    }
}
