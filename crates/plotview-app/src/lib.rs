//! Plotview Application
//!
//! Hosts processed plots: the plotting-engine contract, the plot figure with
//! its sizing and pointer plumbing, PNG export, configuration and the winit
//! input adapter.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod figure;
pub mod sizing;
pub mod winit_input;

pub use cli::CliArgs;
pub use config::AppConfig;
pub use engine::{EngineFailure, PlotEngine, ProcessedSpec, SceneSpecEngine, SpecOptions, SpecOverride};
pub use error::{AppError, AppResult};
pub use export::{ExportJob, render_snapshot};
pub use figure::PlotFigure;
pub use sizing::SizingPolicy;
pub use winit_input::WinitPointerAdapter;
