//! # ragline-cli
//!
//! Console front end for the [`ragline`] pipeline: settings from flags and
//! environment, logging setup, and the interactive question loop.

pub mod console;
pub mod logging;
pub mod settings;

pub use console::{BufReadSource, ConsoleSummary, EditorSource, LineSource, run_console};
pub use logging::init_logging;
pub use settings::Settings;
