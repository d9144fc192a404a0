use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::weekday_code;
use crate::task::{Coordinate, Schedule, Task, TaskId};

/// Everything a reminder scheduler needs to decide whether and when to fire
/// for one task. Recomputed and re-exposed after every completion mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderContext {
    pub task_id: TaskId,
    pub title: String,
    pub category: Option<String>,
    pub repeats: bool,
    /// One-off tasks: the pinned date, if any.
    pub date: Option<NaiveDate>,
    /// Routines: the resolved open occurrences.
    pub next_occurrence: Option<NaiveDate>,
    pub last_missed: Option<NaiveDate>,
    /// Task time, routine time, or the configured default reminder time.
    pub time_of_day: NaiveTime,
    pub time_reminder_enabled: bool,
    pub location_reminder_enabled: bool,
    pub coordinate: Coordinate,
    pub place: String,
    /// Human phrase for the repeat pattern, e.g. "Weekdays" or "Mon and Fri".
    pub routine_phrase: Option<String>,
}

/// Platform-specific reminder schedulers (push plumbing, geofences)
/// implement this trait; the core only feeds them fresh state.
pub trait ReminderSink: Send + Sync {
    fn sync(&self, context: &ReminderContext);
    fn clear(&self, task_id: TaskId);
}

pub fn reminder_context(task: &Task, today: NaiveDate, default_time: NaiveTime) -> ReminderContext {
    let (repeats, date, next_occurrence, last_missed, time, phrase) = match &task.schedule {
        Schedule::Floating => (false, None, None, None, None, None),
        Schedule::Once { date, time } => (false, Some(*date), None, None, *time, None),
        Schedule::Routine(routine) => {
            let state = task.routine_state();
            let next = state.and_then(|s| s.next_occurrence(today));
            let last = state.and_then(|s| s.last_missed_occurrence(today));
            let phrase = describe_routine_days(routine.weekdays());
            (true, None, next, last, routine.time_of_day, Some(phrase))
        }
    };

    ReminderContext {
        task_id: task.id,
        title: task.title.clone(),
        category: task.category.clone(),
        repeats,
        date,
        next_occurrence,
        last_missed,
        time_of_day: time.unwrap_or(default_time),
        time_reminder_enabled: task.reminders.time_enabled,
        location_reminder_enabled: task.reminders.location_enabled,
        coordinate: task.coordinate(),
        place: task.location.title.clone(),
        routine_phrase: phrase,
    }
}

/// Render a weekday set the way a reminder subtitle reads it.
pub fn describe_routine_days(weekdays: &[Weekday]) -> String {
    const SHORT: [&str; 7] = ["Sun", "Mon", "Tues", "Wed", "Thurs", "Fri", "Sat"];

    let codes: Vec<u8> = weekdays.iter().map(|day| weekday_code(*day)).collect();
    if codes == [1, 7] {
        return "Weekends".to_string();
    }
    if codes == [2, 3, 4, 5, 6] {
        return "Weekdays".to_string();
    }
    if codes.len() == 7 {
        return "Daily".to_string();
    }

    let names: Vec<&str> = codes
        .iter()
        .map(|code| SHORT[(*code - 1) as usize])
        .collect();
    match names.as_slice() {
        [only] => (*only).to_string(),
        [head @ .., last] if head.len() == 1 => format!("{} and {}", head[0], last),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
        [] => String::new(),
    }
}
