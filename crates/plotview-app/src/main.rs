//! Command-line entry point (native).

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use plotview_app::{AppError, CliArgs, cli};
    use std::process::ExitCode;

    env_logger::init();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(AppError::Usage(usage)) => {
            eprintln!("{usage}");
            return ExitCode::from(2);
        }
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Rendering {} to {}", args.scene.display(), args.output.display());

    match cli::run(&args) {
        Ok(bytes) => {
            log::info!("Wrote {} bytes", bytes);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Export failed: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
