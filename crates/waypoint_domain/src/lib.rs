pub mod calendar;
pub mod completion;
pub mod error;
pub mod notifications;
pub mod ordering;
pub mod recurrence;
pub mod service;
pub mod settings;
pub mod task;

pub use crate::error::DomainError;
pub use crate::service::{TaskService, TaskServiceBuilder};
pub use crate::settings::Settings;
