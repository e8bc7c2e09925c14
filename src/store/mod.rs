pub mod codec;
pub mod db;
pub mod index;
pub mod listing;
pub mod lock;
pub mod paths;
pub mod repo;
pub mod tasks;
