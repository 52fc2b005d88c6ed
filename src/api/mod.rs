pub mod format;

pub use format::{project_resource, task_resource, task_resources, ProjectResource, TaskResource, UserResource};
