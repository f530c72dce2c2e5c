pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod gate;
pub mod generation;
pub mod llm;
pub mod logger;
pub mod models;
pub mod pagination;
pub mod revenue;
pub mod tracker;
pub mod wallet;

pub use error::{Result, StoryError};
