pub mod project;
pub mod task;
pub mod user;

pub use project::{NewProject, Project};
pub use task::{NewTask, Task, TaskChanges};
pub use user::{NewUser, User};
