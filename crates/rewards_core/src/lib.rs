pub mod action;
pub mod catalog;
pub mod categorize;
pub mod clock;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod model;
pub mod notify;
pub mod storage;
pub mod task_api;
