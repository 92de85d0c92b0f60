/// Core functionality modules
///
/// Session handling, the task list mirror and the screen that drives them.

pub mod screen;
pub mod session;
pub mod task_list;

pub use screen::{Navigation, StoreOutcome, TaskListScreen, ViewSignal};
pub use session::Session;
pub use task_list::{ContextAction, EditRequest, ListChange, TaskList};
