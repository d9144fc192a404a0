use chrono::NaiveDate;

use crate::error::DomainError;
use crate::task::Task;

/// Flip a one-off task's completion flag. The expanded display hint follows
/// the flag: a freshly completed card collapses, an undone one reopens.
pub fn toggle_one_off(task: &mut Task) {
    task.is_completed = !task.is_completed;
    task.is_expanded = !task.is_completed;
}

/// Record one occurrence of a routine as done. Inserting a date that is
/// already present is a no-op; a date the rule never produces is a caller
/// programming error and is rejected rather than coerced.
pub fn complete_occurrence(task: &mut Task, date: NaiveDate) -> Result<(), DomainError> {
    ensure_occurrence(task, date)?;
    task.completed_dates.insert(date);
    Ok(())
}

/// Undo one recorded occurrence, e.g. from the calendar view where the
/// target is the day being looked at rather than a resolved occurrence.
pub fn uncomplete_occurrence(task: &mut Task, date: NaiveDate) -> Result<(), DomainError> {
    ensure_occurrence(task, date)?;
    task.completed_dates.remove(&date);
    Ok(())
}

/// The occurrence a forward-looking toggle should complete: the next open
/// occurrence, or — once nothing lies ahead — the most recent missed one,
/// letting users catch up on skipped routine days without a date picker.
pub fn resolve_toggle_target(task: &Task, today: NaiveDate) -> Option<NaiveDate> {
    let state = task.routine_state()?;
    state
        .next_occurrence(today)
        .or_else(|| state.last_missed_occurrence(today))
}

fn ensure_occurrence(task: &Task, date: NaiveDate) -> Result<(), DomainError> {
    let state = task.routine_state().ok_or(DomainError::NotARoutine)?;
    if !state.occurs_on(date) {
        return Err(DomainError::InvalidOccurrence { date });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::task::{Priority, Routine, Schedule, Task, TaskDraft, TaskId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn routine_task() -> Task {
        let routine = Routine::new([Weekday::Mon, Weekday::Wed], None, None).unwrap();
        let draft = TaskDraft {
            title: "Water the plants".into(),
            notes: String::new(),
            priority: None,
            category: None,
            schedule: Schedule::Routine(routine),
            location: Default::default(),
            reminders: Default::default(),
        };
        Task::new(TaskId(1), date(2024, 1, 1), draft, Priority::None)
    }

    fn one_off_task() -> Task {
        let draft = TaskDraft {
            title: "Return the library book".into(),
            notes: String::new(),
            priority: None,
            category: None,
            schedule: Schedule::Floating,
            location: Default::default(),
            reminders: Default::default(),
        };
        Task::new(TaskId(2), date(2024, 1, 1), draft, Priority::None)
    }

    #[test]
    fn one_off_toggle_flips_flag_and_display_hint() {
        let mut task = one_off_task();
        toggle_one_off(&mut task);
        assert!(task.is_completed);
        assert!(!task.is_expanded);
        toggle_one_off(&mut task);
        assert!(!task.is_completed);
        assert!(task.is_expanded);
    }

    #[test]
    fn completing_the_same_occurrence_twice_is_idempotent() {
        let mut task = routine_task();
        complete_occurrence(&mut task, date(2024, 1, 1)).unwrap();
        let snapshot = task.completed_dates.clone();
        complete_occurrence(&mut task, date(2024, 1, 1)).unwrap();
        assert_eq!(task.completed_dates, snapshot);
    }

    #[test]
    fn uncomplete_restores_the_original_history() {
        let mut task = routine_task();
        let before = task.completed_dates.clone();
        complete_occurrence(&mut task, date(2024, 1, 3)).unwrap();
        uncomplete_occurrence(&mut task, date(2024, 1, 3)).unwrap();
        assert_eq!(task.completed_dates, before);
    }

    #[test]
    fn off_rule_dates_are_rejected() {
        let mut task = routine_task();
        // A Tuesday: right range, wrong weekday.
        let err = complete_occurrence(&mut task, date(2024, 1, 2)).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidOccurrence {
                date: date(2024, 1, 2)
            }
        );
        // Before creation.
        assert!(complete_occurrence(&mut task, date(2023, 12, 25)).is_err());
        assert!(task.completed_dates.is_empty());
    }

    #[test]
    fn occurrence_mutation_on_a_one_off_is_an_error() {
        let mut task = one_off_task();
        let err = complete_occurrence(&mut task, date(2024, 1, 1)).unwrap_err();
        assert_eq!(err, DomainError::NotARoutine);
    }

    #[test]
    fn toggle_target_prefers_next_then_falls_back_to_missed() {
        let mut task = routine_task();
        let today = date(2024, 1, 10);
        assert_eq!(resolve_toggle_target(&task, today), Some(date(2024, 1, 10)));

        // Close out everything ahead by bounding the rule, leaving one miss.
        let routine = Routine::new(
            [Weekday::Mon, Weekday::Wed],
            Some(date(2024, 1, 8)),
            None,
        )
        .unwrap();
        task.schedule = Schedule::Routine(routine);
        complete_occurrence(&mut task, date(2024, 1, 1)).unwrap();
        complete_occurrence(&mut task, date(2024, 1, 3)).unwrap();
        assert_eq!(resolve_toggle_target(&task, today), Some(date(2024, 1, 8)));
    }
}
