pub mod cache;
pub mod config;
pub mod db;
pub mod docs;
pub mod health;
pub mod inbox;
pub mod metadata;
pub mod model;
pub mod read_time;
pub mod summary;
