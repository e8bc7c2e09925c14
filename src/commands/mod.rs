pub mod create;
pub mod delete;
pub mod doctor;
pub mod edit;
pub mod lifecycle;
pub mod list;
pub mod reindex;
pub mod show;
