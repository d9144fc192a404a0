use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::recurrence::{is_task_completed, RoutineState};
use crate::task::{Coordinate, Schedule, Task};

/// Supplies the user position and a numeric distance. The engine does no
/// geodesy of its own; a host without location services can pass
/// [`NoGeolocation`].
pub trait Geolocator: Send + Sync {
    fn current_position(&self) -> Option<Coordinate>;
    /// Distance in meters between two coordinates.
    fn distance_between(&self, from: Coordinate, to: Coordinate) -> f64;
}

/// Fallback collaborator: no position, so every task sorts at distance zero.
pub struct NoGeolocation;

impl Geolocator for NoGeolocation {
    fn current_position(&self) -> Option<Coordinate> {
        None
    }

    fn distance_between(&self, _from: Coordinate, _to: Coordinate) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Distance,
    Title,
    Category,
    Priority,
    Time,
}

impl FromStr for SortMode {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Distance" => Ok(SortMode::Distance),
            "Title" => Ok(SortMode::Title),
            "Category" => Ok(SortMode::Category),
            "Priority" => Ok(SortMode::Priority),
            "Time" => Ok(SortMode::Time),
            other => Err(DomainError::UnknownSortMode(other.to_string())),
        }
    }
}

/// Per-task sort key, computed once per sort pass so the recurrence scans
/// run once per task rather than once per comparison.
#[derive(Debug, Clone)]
struct SortKey {
    completed: u8,
    title: String,
    category_rank: u8,
    category_title: String,
    priority_rank: u8,
    schedule_rank: u8,
    effective_date: NaiveDate,
    timed_rank: u8,
    effective_time: Option<NaiveTime>,
    distance: f64,
}

impl SortKey {
    fn of(task: &Task, today: NaiveDate, geo: &dyn Geolocator) -> Self {
        let distance = geo
            .current_position()
            .map(|position| geo.distance_between(position, task.coordinate()))
            .unwrap_or(0.0);

        let (schedule_rank, effective_date, timed_rank, effective_time) = match &task.schedule {
            Schedule::Floating => (1, today, 1, None),
            Schedule::Once { date, time } => {
                (0, *date, if time.is_some() { 0 } else { 1 }, *time)
            }
            Schedule::Routine(routine) => {
                let state = RoutineState {
                    routine,
                    created: task.created,
                    completed: &task.completed_dates,
                };
                let date = state
                    .next_occurrence(today)
                    .or_else(|| state.last_missed_occurrence(today))
                    .unwrap_or(today);
                let timed = if routine.time_of_day.is_some() { 0 } else { 1 };
                (0, date, timed, routine.time_of_day)
            }
        };

        Self {
            completed: if is_task_completed(task, today) { 1 } else { 0 },
            title: task.title.clone(),
            category_rank: if task.category.is_some() { 0 } else { 1 },
            category_title: task.category.clone().unwrap_or_default(),
            priority_rank: task.priority.rank(),
            schedule_rank,
            effective_date,
            timed_rank,
            effective_time,
            distance,
        }
    }

    fn compare(&self, other: &Self, mode: SortMode) -> Ordering {
        let by_distance = |ord: Ordering| ord.then(self.distance.total_cmp(&other.distance));
        let primary = self.completed.cmp(&other.completed);
        match mode {
            SortMode::Distance => by_distance(primary),
            SortMode::Title => by_distance(primary.then_with(|| self.title.cmp(&other.title))),
            SortMode::Category => by_distance(
                primary
                    .then(self.category_rank.cmp(&other.category_rank))
                    .then_with(|| self.category_title.cmp(&other.category_title)),
            ),
            SortMode::Priority => {
                by_distance(primary.then(self.priority_rank.cmp(&other.priority_rank)))
            }
            SortMode::Time => by_distance(
                primary
                    .then(self.schedule_rank.cmp(&other.schedule_rank))
                    .then(self.effective_date.cmp(&other.effective_date))
                    .then(self.timed_rank.cmp(&other.timed_rank))
                    .then(self.effective_time.cmp(&other.effective_time)),
            ),
        }
    }
}

/// Stable in-place sort of a task collection for one display mode.
/// Incomplete tasks always order before completed ones.
pub fn sort_tasks(tasks: &mut Vec<Task>, mode: SortMode, today: NaiveDate, geo: &dyn Geolocator) {
    let mut keyed: Vec<(SortKey, Task)> = tasks
        .drain(..)
        .map(|task| (SortKey::of(&task, today, geo), task))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.compare(b, mode));
    tasks.extend(keyed.into_iter().map(|(_, task)| task));
}
