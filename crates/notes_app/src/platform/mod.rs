mod app;
pub mod config;
mod effects;
pub mod logging;
mod scratch;
mod tabs;

pub use app::{run, ExportAction, ExportRequest};
