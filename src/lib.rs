pub mod alert;
pub mod config;
pub mod credential;
pub mod feed;
pub mod reconcile;
pub mod scheduler;
