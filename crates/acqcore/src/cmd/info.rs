use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct InfoOutput {
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
    bit_depth: u32,
    image_bytes: usize,
    buffer_capacity: usize,
    buffer_footprint: usize,
    device_timeout_ms: u128,
    stop_timeout_ms: u128,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let core = args.camera.build_core()?;
    let config = core.config();

    let out = InfoOutput {
        width: core.image_width(),
        height: core.image_height(),
        bytes_per_pixel: core.bytes_per_pixel(),
        bit_depth: core.bit_depth(),
        image_bytes: core.image_buffer_size(),
        buffer_capacity: core.buffer_total_capacity(),
        buffer_footprint: config.buffer_footprint,
        device_timeout_ms: config.device_timeout.as_millis(),
        stop_timeout_ms: config.stop_timeout.as_millis(),
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Acquisition Core:");
            println!("  Image:            {}x{}", out.width, out.height);
            println!(
                "  Pixel:            {} byte(s), {}-bit",
                out.bytes_per_pixel, out.bit_depth
            );
            println!("  Image size:       {} bytes", out.image_bytes);
            println!(
                "  Buffer:           {} frames ({} bytes)",
                out.buffer_capacity, out.buffer_footprint
            );
            println!("  Device timeout:   {}ms", out.device_timeout_ms);
            println!("  Stop timeout:     {}ms", out.stop_timeout_ms);
        }
        OutputFormat::Raw => {
            println!("{}", out.buffer_capacity);
        }
    }

    Ok(SUCCESS)
}
