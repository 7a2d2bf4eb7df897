//! code-navigator - A TUI dashboard for exploring repositories and planning
//! open-source contributions.
//!
//! The binary is a thin shell; the view-state orchestration lives here so it
//! can be tested without a terminal.

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod region;
pub mod session;
pub mod ui;
pub mod view;

pub use error::{ErrorCode, ErrorInfo, RegionError};
pub use region::{AsyncRegion, RegionRegistry, RegionStatus, SelectionCascade};
