pub mod album_art;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod flight;
pub mod handlers;
pub mod logging;
pub mod poller;
pub mod push;
pub mod schedule;
pub mod spotify;
pub mod surface;
pub mod ui;
pub mod weather;
