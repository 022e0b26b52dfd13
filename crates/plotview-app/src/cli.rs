//! Command-line rendering of a JSON scene to PNG.

use crate::config::AppConfig;
use crate::engine::{PlotEngine, SceneSpecEngine, SpecOptions};
use crate::error::{AppError, AppResult};
use crate::export::render_snapshot;
use crate::figure::PlotFigure;
use crate::sizing::SizingPolicy;
use std::path::PathBuf;

pub const USAGE: &str = "usage: plotview <scene.json> <out.png> [--config <config.json>]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub scene: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: impl IntoIterator<Item = String>) -> AppResult<Self> {
        let mut positional = Vec::new();
        let mut config = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args
                        .next()
                        .ok_or_else(|| AppError::Usage(format!("--config needs a path\n{USAGE}")))?;
                    config = Some(PathBuf::from(path));
                }
                "--help" | "-h" => return Err(AppError::Usage(USAGE.to_string())),
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(AppError::Usage(format!("unknown option `{flag}`\n{USAGE}")));
                }
                _ => positional.push(PathBuf::from(arg)),
            }
        }
        let [scene, output]: [PathBuf; 2] = positional
            .try_into()
            .map_err(|_| AppError::Usage(USAGE.to_string()))?;
        Ok(Self {
            scene,
            output,
            config,
        })
    }
}

/// Render the scene file to the output PNG. Returns the bytes written.
pub fn run(args: &CliArgs) -> AppResult<usize> {
    let config = AppConfig::load(args.config.as_deref())?;
    let spec: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&args.scene)?)?;

    let processed = SceneSpecEngine.process_spec(&spec, &SpecOptions::default())?;
    let mut figure = PlotFigure::with_pointer_config(config.pointer.clone());
    figure.set_background_override(config.background_color());
    figure.update(processed, SizingPolicy::Fixed, |messages| {
        for message in messages {
            log::warn!("{}", message);
        }
    })?;

    let job = render_snapshot(&figure, config.export_scale)?;
    figure.dispose();

    let output = args.output.clone();
    std::thread::spawn(move || job.write_to(&output))
        .join()
        .map_err(|_| AppError::Io(std::io::Error::other("export thread panicked")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> AppResult<CliArgs> {
        CliArgs::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_positional() {
        let parsed = args(&["scene.json", "out.png"]).unwrap();
        assert_eq!(parsed.scene, PathBuf::from("scene.json"));
        assert_eq!(parsed.output, PathBuf::from("out.png"));
        assert!(parsed.config.is_none());
    }

    #[test]
    fn test_parse_config_anywhere() {
        let parsed = args(&["--config", "cfg.json", "a.json", "b.png"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("cfg.json")));
        assert_eq!(parsed.scene, PathBuf::from("a.json"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(args(&["only.json"]), Err(AppError::Usage(_))));
        assert!(matches!(args(&["a", "b", "c"]), Err(AppError::Usage(_))));
        assert!(matches!(args(&["a", "b", "--config"]), Err(AppError::Usage(_))));
        assert!(matches!(args(&["a", "b", "--verbose"]), Err(AppError::Usage(_))));
    }
}
