// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod generate;
pub mod history;
pub mod progress;
pub mod runtime;
pub mod snippet;
pub mod typing;
pub mod ui;
