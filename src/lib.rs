pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod library;
pub mod metadata;
pub mod nfo;
pub mod output;
pub mod tmdb;
pub mod tui;
