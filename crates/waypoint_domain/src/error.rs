use chrono::NaiveDate;
use thiserror::Error;

use crate::task::TaskId;

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("a routine must repeat on at least one weekday")]
    EmptyRoutine,

    #[error("unknown priority: {0:?}")]
    UnknownPriority(String),

    #[error("unknown sort mode: {0:?}")]
    UnknownSortMode(String),

    #[error("{date} is not an occurrence of this task's routine")]
    InvalidOccurrence { date: NaiveDate },

    #[error("occurrence dates only apply to repeating tasks")]
    NotARoutine,

    #[error("no task with id {0:?}")]
    UnknownTask(TaskId),

    #[error("category {0:?} already exists")]
    DuplicateCategory(String),

    #[error("no category named {0:?}")]
    UnknownCategory(String),
}
