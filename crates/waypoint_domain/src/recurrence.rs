use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};

use crate::task::{Routine, Schedule, Task};

/// Hard ceiling on forward day scans under an unbounded end date. A routine
/// whose completion history somehow covers ten years of future occurrences
/// resolves to "no next occurrence" instead of looping.
pub const SCAN_HORIZON_DAYS: i64 = 3_660;

/// Read-only view of everything recurrence resolution needs from a task.
#[derive(Debug, Clone, Copy)]
pub struct RoutineState<'a> {
    pub routine: &'a Routine,
    pub created: NaiveDate,
    pub completed: &'a BTreeSet<NaiveDate>,
}

impl<'a> RoutineState<'a> {
    pub fn is_occurrence_completed(&self, date: NaiveDate) -> bool {
        self.completed.contains(&date)
    }

    /// Whether `date` is an occurrence of the rule: its weekday is selected
    /// and it lies within `[created, end_date]` (both inclusive).
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        if date < self.created {
            return false;
        }
        if let Some(end) = self.routine.end_date {
            if date > end {
                return false;
            }
        }
        self.routine.includes_weekday(date.weekday())
    }

    /// First uncompleted occurrence on or after `today`, scanning day by day.
    /// `None` once the end date is exhausted, or when an unbounded scan hits
    /// the defensive horizon.
    pub fn next_occurrence(&self, today: NaiveDate) -> Option<NaiveDate> {
        let mut date = today;
        match self.routine.end_date {
            Some(end) => {
                while date <= end {
                    if self.occurs_on(date) && !self.is_occurrence_completed(date) {
                        return Some(date);
                    }
                    date += Duration::days(1);
                }
                None
            }
            None => {
                let horizon = today + Duration::days(SCAN_HORIZON_DAYS);
                while date <= horizon {
                    if self.occurs_on(date) && !self.is_occurrence_completed(date) {
                        return Some(date);
                    }
                    date += Duration::days(1);
                }
                tracing::warn!(
                    %today,
                    horizon_days = SCAN_HORIZON_DAYS,
                    "routine scan exhausted its horizon without an open occurrence"
                );
                None
            }
        }
    }

    /// Most recent uncompleted occurrence strictly before `today`. The
    /// creation date is a hard floor; nothing earlier is ever reported.
    pub fn last_missed_occurrence(&self, today: NaiveDate) -> Option<NaiveDate> {
        let mut date = today - Duration::days(1);
        while date >= self.created {
            if self.occurs_on(date) && !self.is_occurrence_completed(date) {
                return Some(date);
            }
            date -= Duration::days(1);
        }
        None
    }

    /// Fully caught up: no occurrence pending and none missed.
    pub fn is_satisfied(&self, today: NaiveDate) -> bool {
        self.next_occurrence(today).is_none() && self.last_missed_occurrence(today).is_none()
    }
}

impl Task {
    pub fn routine_state(&self) -> Option<RoutineState<'_>> {
        self.schedule.routine().map(|routine| RoutineState {
            routine,
            created: self.created,
            completed: &self.completed_dates,
        })
    }
}

/// Completion predicate over either scheduling mode: the boolean flag for
/// one-off tasks, full satisfaction for routines.
pub fn is_task_completed(task: &Task, today: NaiveDate) -> bool {
    match &task.schedule {
        Schedule::Routine(_) => task
            .routine_state()
            .map(|state| state.is_satisfied(today))
            .unwrap_or(false),
        Schedule::Floating | Schedule::Once { .. } => task.is_completed,
    }
}

/// Day-level completion predicate used by calendar views: did this task get
/// done on `date` specifically? Routines test the history set; one-offs fall
/// back to their flag.
pub fn is_task_completed_on(task: &Task, date: NaiveDate) -> bool {
    match &task.schedule {
        Schedule::Routine(_) => task.completed_dates.contains(&date),
        Schedule::Floating | Schedule::Once { .. } => task.is_completed,
    }
}
