use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod info;
pub mod run;
pub mod snap;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a sequence acquisition and print frames as they arrive.
    Run(RunArgs),
    /// Capture a single image.
    Snap(SnapArgs),
    /// Show the instance's format and buffer configuration.
    Info(InfoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Snap(args) => snap::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct CameraArgs {
    /// Image width in pixels.
    #[arg(long, default_value = "640")]
    pub width: u32,
    /// Image height in pixels.
    #[arg(long, default_value = "480")]
    pub height: u32,
    /// Exposure time in milliseconds.
    #[arg(long, default_value = "10")]
    pub exposure: f64,
    /// Circular buffer memory footprint in bytes.
    #[arg(long, value_name = "BYTES")]
    pub footprint: Option<u64>,
}

impl CameraArgs {
    /// Build a core instance around a simulated camera with these settings.
    pub fn build_core(&self) -> CliResult<acqcore_session::Core> {
        use crate::exit::{session_error, CliError, USAGE};

        let format = acqcore_frame::FrameFormat::new(self.width, self.height, 1, 8)
            .map_err(|err| CliError::new(USAGE, format!("invalid image format: {err}")))?;
        let camera = acqcore_device::SimCamera::new()
            .with_format(format)
            .with_exposure_ms(self.exposure);

        let mut config = acqcore_session::CoreConfig::default();
        if let Some(footprint) = self.footprint {
            config.buffer_footprint = usize::try_from(footprint)
                .map_err(|_| CliError::new(USAGE, format!("footprint {footprint} is too large")))?;
        }

        acqcore_session::Core::new(Box::new(camera), config)
            .map_err(|err| session_error("core setup failed", err))
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Number of frames to acquire.
    #[arg(long, short = 'n', conflicts_with = "continuous")]
    pub count: Option<u64>,
    /// Acquire until interrupted, dropping the oldest frame on overflow.
    #[arg(long)]
    pub continuous: bool,
    /// Inter-frame interval (e.g. 100ms, 1s).
    #[arg(long, default_value = "0ms")]
    pub interval: String,
    /// Halt the run instead of dropping frames when the buffer fills.
    #[arg(long, conflicts_with = "continuous")]
    pub stop_on_overflow: bool,
    #[command(flatten)]
    pub camera: CameraArgs,
}

#[derive(Args, Debug)]
pub struct SnapArgs {
    /// Write raw pixel bytes to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub camera: CameraArgs,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub camera: CameraArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
