use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use parking_lot::Mutex;

use waypoint_domain::notifications::{ReminderContext, ReminderSink};
use waypoint_domain::ordering::SortMode;
use waypoint_domain::task::{Category, Priority, Routine, Schedule, TaskDraft, TaskId};
use waypoint_domain::{Settings, TaskService};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Default)]
struct RecorderInner {
    synced: Mutex<Vec<ReminderContext>>,
    cleared: Mutex<Vec<TaskId>>,
}

#[derive(Clone, Default)]
struct Recorder(Arc<RecorderInner>);

impl ReminderSink for Recorder {
    fn sync(&self, context: &ReminderContext) {
        self.0.synced.lock().push(context.clone());
    }

    fn clear(&self, task_id: TaskId) {
        self.0.cleared.lock().push(task_id);
    }
}

fn draft(title: &str, schedule: Schedule) -> TaskDraft {
    TaskDraft {
        title: title.into(),
        notes: String::new(),
        priority: None,
        category: None,
        schedule,
        location: Default::default(),
        reminders: Default::default(),
    }
}

#[test]
fn routine_and_one_off_round_trip() {
    let recorder = Recorder::default();
    let service = TaskService::builder()
        .with_reminder_sink(Box::new(recorder.clone()))
        .build();

    service
        .add_category(Category {
            title: "Errands".into(),
            color: "mint".into(),
        })
        .expect("add category");

    let routine = Routine::new([Weekday::Mon, Weekday::Wed], None, None).expect("valid routine");
    let mut errand = draft("Water the plants", Schedule::Routine(routine));
    errand.category = Some("Errands".into());
    let routine_id = service
        .create_task(errand, date(2024, 1, 1))
        .expect("create routine task");

    let one_off_id = service
        .create_task(
            draft(
                "Pick up the parcel",
                Schedule::Once {
                    date: date(2024, 1, 11),
                    time: None,
                },
            ),
            date(2024, 1, 9),
        )
        .expect("create one-off task");

    // Both creations pushed reminder state; the routine carries its phrase.
    {
        let synced = recorder.0.synced.lock();
        assert_eq!(synced.len(), 2);
        assert_eq!(synced[0].routine_phrase.as_deref(), Some("Mon and Wed"));
        assert_eq!(synced[0].category.as_deref(), Some("Errands"));
        assert!(!synced[1].repeats);
    }

    let today = date(2024, 1, 10); // a Wednesday

    // Forward toggle completes today's occurrence.
    service.toggle_task(routine_id, today).expect("toggle routine");
    let task = service.get_task(routine_id).expect("routine task");
    assert!(task.completed_dates.contains(&date(2024, 1, 10)));

    // The calendar view undoes the same occurrence from its viewed day.
    service
        .toggle_occurrence(routine_id, date(2024, 1, 10), today)
        .expect("undo occurrence");
    let task = service.get_task(routine_id).expect("routine task");
    assert!(task.completed_dates.is_empty());
    assert!(task.is_expanded);

    // Calendar day queries follow the rule, not the completion history.
    assert!(service.day_has_tasks(date(2024, 1, 10)));
    assert!(!service.day_has_tasks(date(2024, 1, 9))); // a Tuesday
    let on_thursday = service.tasks_on(date(2024, 1, 11), today);
    assert_eq!(on_thursday.len(), 1);
    assert_eq!(on_thursday[0].id, one_off_id);

    // Time sort: the one-off on the 11th lands before the routine's next
    // open occurrence (still the 10th here, so the routine leads).
    let ordered = service.sorted_tasks(SortMode::Time, today);
    assert_eq!(ordered[0].id, routine_id);
    assert_eq!(ordered[1].id, one_off_id);

    // Category deletion nullifies, never cascades.
    service.delete_category("Errands").expect("delete category");
    let task = service.get_task(routine_id).expect("routine survives");
    assert_eq!(task.category, None);

    // Explicit deletion clears reminders and is idempotent.
    service.delete_task(one_off_id);
    service.delete_task(one_off_id);
    assert_eq!(recorder.0.cleared.lock().clone(), vec![one_off_id]);
    assert_eq!(service.tasks().len(), 1);
}

#[test]
fn delete_on_completion_policy_removes_finished_tasks() {
    let recorder = Recorder::default();
    let settings = Settings {
        delete_on_completion: true,
        ..Settings::default()
    };
    let service = TaskService::builder()
        .with_settings(settings)
        .with_reminder_sink(Box::new(recorder.clone()))
        .build();

    let id = service
        .create_task(draft("One and done", Schedule::Floating), date(2024, 1, 9))
        .expect("create task");

    service.toggle_task(id, date(2024, 1, 10)).expect("toggle");

    assert!(service.get_task(id).is_err());
    assert!(recorder.0.cleared.lock().contains(&id));

    // A bounded routine disappears once its last occurrence is ticked off.
    let routine = Routine::new([Weekday::Wed], Some(date(2024, 1, 3)), None).expect("routine");
    let routine_id = service
        .create_task(draft("Short routine", Schedule::Routine(routine)), date(2024, 1, 1))
        .expect("create routine");
    service
        .complete_occurrence(routine_id, date(2024, 1, 3), date(2024, 1, 10))
        .expect("complete the only occurrence");
    assert!(service.get_task(routine_id).is_err());
}

#[test]
fn hidden_completed_tasks_drop_out_of_the_feeds() {
    let settings = Settings {
        hide_completed_in_list: true,
        hide_completed_in_calendar: true,
        ..Settings::default()
    };
    let service = TaskService::builder().with_settings(settings).build();

    let kept = service
        .create_task(draft("Still open", Schedule::Floating), date(2024, 1, 9))
        .expect("create");
    let finished = service
        .create_task(
            draft(
                "Already done",
                Schedule::Once {
                    date: date(2024, 1, 10),
                    time: None,
                },
            ),
            date(2024, 1, 9),
        )
        .expect("create");
    service.toggle_task(finished, date(2024, 1, 10)).expect("toggle");

    let today = date(2024, 1, 10);
    let visible = service.visible_tasks(today);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, kept);
    assert!(service.tasks_on(date(2024, 1, 10), today).is_empty());
}

#[test]
fn unknown_categories_are_rejected_at_create_time() {
    let service = TaskService::builder().build();
    let mut bad = draft("Orphan", Schedule::Floating);
    bad.category = Some("Nonexistent".into());
    assert!(service.create_task(bad, date(2024, 1, 1)).is_err());
}

#[test]
fn schedules_serialize_with_a_stable_tag() {
    let routine = Routine::new([Weekday::Fri], None, None).expect("routine");
    let value = serde_json::to_value(Schedule::Routine(routine)).expect("serialize");
    assert_eq!(value["type"], "routine");

    let value = serde_json::to_value(Schedule::Floating).expect("serialize");
    assert_eq!(value["type"], "floating");
}

#[test]
fn drafts_inherit_the_configured_default_priority() {
    let settings = Settings {
        default_priority: Priority::Medium,
        ..Settings::default()
    };
    let service = TaskService::builder().with_settings(settings).build();
    let id = service
        .create_task(draft("Inherits", Schedule::Floating), date(2024, 1, 1))
        .expect("create");
    assert_eq!(service.get_task(id).expect("task").priority, Priority::Medium);
}
