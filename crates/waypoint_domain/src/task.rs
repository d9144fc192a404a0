use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Sort rank: the most urgent priority orders first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
            Priority::None => 3,
        }
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "None" => Ok(Priority::None),
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            other => Err(DomainError::UnknownPriority(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub subtitle: String,
}

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Per-task reminder switches; the global enablement lives in `Settings`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderPrefs {
    pub time_enabled: bool,
    pub location_enabled: bool,
}

impl Default for ReminderPrefs {
    fn default() -> Self {
        Self {
            time_enabled: true,
            location_enabled: true,
        }
    }
}

/// A weekly repetition rule. `weekdays` is never empty and is kept sorted by
/// Sunday-based code so phrase rendering and serialization are deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Routine {
    weekdays: Vec<Weekday>,
    pub end_date: Option<NaiveDate>,
    pub time_of_day: Option<NaiveTime>,
}

impl Routine {
    pub fn new(
        weekdays: impl IntoIterator<Item = Weekday>,
        end_date: Option<NaiveDate>,
        time_of_day: Option<NaiveTime>,
    ) -> Result<Self, DomainError> {
        let mut weekdays: Vec<Weekday> = weekdays.into_iter().collect();
        weekdays.sort_by_key(|day| day.number_from_sunday());
        weekdays.dedup();
        if weekdays.is_empty() {
            return Err(DomainError::EmptyRoutine);
        }
        Ok(Self {
            weekdays,
            end_date,
            time_of_day,
        })
    }

    pub fn weekdays(&self) -> &[Weekday] {
        &self.weekdays
    }

    pub fn includes_weekday(&self, day: Weekday) -> bool {
        self.weekdays.contains(&day)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Schedule {
    /// One-off task with no date attached.
    #[serde(rename = "floating")]
    Floating,
    /// One-off task pinned to a calendar day, optionally to a clock time.
    #[serde(rename = "once")]
    Once {
        date: NaiveDate,
        time: Option<NaiveTime>,
    },
    /// Weekly repeating task.
    #[serde(rename = "routine")]
    Routine(Routine),
}

impl Schedule {
    pub fn is_routine(&self) -> bool {
        matches!(self, Schedule::Routine(_))
    }

    pub fn routine(&self) -> Option<&Routine> {
        match self {
            Schedule::Routine(routine) => Some(routine),
            _ => None,
        }
    }
}

/// Editable task fields, used for creation and whole-task edits. Lifecycle
/// state (creation date, completion history, flags) stays with the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub notes: String,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub schedule: Schedule,
    pub location: Location,
    pub reminders: ReminderPrefs,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub notes: String,
    pub priority: Priority,
    /// Weak reference to a category title; nulled when the category goes away.
    pub category: Option<String>,
    /// Lower bound for recurrence resolution. Immutable after creation.
    pub created: NaiveDate,
    pub schedule: Schedule,
    /// One entry per completed occurrence of a routine. Unused for one-offs.
    pub completed_dates: BTreeSet<NaiveDate>,
    /// Completion state for one-off tasks only.
    pub is_completed: bool,
    pub location: Location,
    pub reminders: ReminderPrefs,
    /// Display hint persisted alongside the task; not part of scheduling.
    pub is_expanded: bool,
    /// Soft-delete marker for the host's deferred cleanup pass.
    pub is_deleted: bool,
}

impl Task {
    pub fn new(id: TaskId, created: NaiveDate, draft: TaskDraft, default_priority: Priority) -> Self {
        Self {
            id,
            title: draft.title,
            notes: draft.notes,
            priority: draft.priority.unwrap_or(default_priority),
            category: draft.category,
            created,
            schedule: draft.schedule,
            completed_dates: BTreeSet::new(),
            is_completed: false,
            location: draft.location,
            reminders: draft.reminders,
            is_expanded: true,
            is_deleted: false,
        }
    }

    pub fn is_routine(&self) -> bool {
        self.schedule.is_routine()
    }

    pub fn coordinate(&self) -> Coordinate {
        self.location.coordinate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub title: String,
    pub color: String,
}
