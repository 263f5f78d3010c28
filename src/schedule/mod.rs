use std::sync::Arc;

pub mod controller;
pub mod geometry;
pub mod model;
pub mod paging;
pub mod store;

pub use controller::{PickerMode, ScheduleController};
pub use model::{Day, Event};

/// Called from background tasks after they post a result, so the UI
/// thread picks it up without waiting for input
pub type Wake = Arc<dyn Fn() + Send + Sync>;
