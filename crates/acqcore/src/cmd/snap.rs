use crate::cmd::SnapArgs;
use crate::exit::{io_error, session_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: SnapArgs, format: OutputFormat) -> CliResult<i32> {
    let core = args.camera.build_core()?;

    core.snap_image()
        .map_err(|err| session_error("snap failed", err))?;
    let frame = core
        .snapped_image()
        .map_err(|err| session_error("snap failed", err))?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, frame.pixels())
                .map_err(|err| io_error("write failed", err))?;
            println!(
                "wrote {} bytes ({}x{}) to {}",
                frame.byte_size(),
                frame.format.width,
                frame.format.height,
                path.display()
            );
        }
        None => print_frame(&frame, format),
    }

    Ok(SUCCESS)
}
