pub mod commands;
pub mod error;
pub mod input;
pub mod logging;
pub mod model;
pub mod output;
pub mod store;
pub mod task_id;
