use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::ordering::SortMode;
use crate::task::Priority;

/// Host-level behavior switches, passed explicitly into the service instead
/// of living in ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Hard-delete a task as soon as it becomes fully completed.
    pub delete_on_completion: bool,
    pub hide_completed_in_list: bool,
    pub hide_completed_in_calendar: bool,
    pub expand_cells_by_default: bool,
    pub default_priority: Priority,
    /// Reminder time for tasks without one of their own.
    pub reminder_time: NaiveTime,
    /// Geofence radius in meters for location reminders.
    pub reminder_distance: f64,
    pub list_sort: SortMode,
    pub calendar_sort: SortMode,
    /// Card color for tasks without a category.
    pub uncategorized_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delete_on_completion: false,
            hide_completed_in_list: false,
            hide_completed_in_calendar: false,
            expand_cells_by_default: true,
            default_priority: Priority::None,
            reminder_time: NaiveTime::from_hms_opt(8, 0, 0).expect("valid default time"),
            reminder_distance: 500.0,
            list_sort: SortMode::Distance,
            calendar_sort: SortMode::Distance,
            uncategorized_color: "gray".to_string(),
        }
    }
}
