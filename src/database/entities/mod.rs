pub mod employees;
pub mod epics;
pub mod evaluation_models;
pub mod features;
pub mod projects;
pub mod roles;
pub mod seniority_levels;
pub mod t_shirt_size;
pub mod task_roles;
pub mod tasks;
pub mod timelines;

pub use t_shirt_size::TShirtSize;
