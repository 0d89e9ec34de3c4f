use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use acqcore_frame::Frame;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    frame_number: u64,
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
    bit_depth: u32,
    elapsed_ms: f64,
    exposure_ms: f64,
    mean_intensity: f64,
    timestamp: String,
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                frame_number: frame.meta.number,
                width: frame.format.width,
                height: frame.format.height,
                bytes_per_pixel: frame.format.bytes_per_pixel,
                bit_depth: frame.format.bit_depth,
                elapsed_ms: frame.meta.elapsed.as_secs_f64() * 1000.0,
                exposure_ms: frame.meta.exposure_ms,
                mean_intensity: mean_intensity(frame.pixels()),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FRAME", "SIZE", "ELAPSED", "MEAN"])
                .add_row(vec![
                    frame.meta.number.to_string(),
                    format!("{}x{}", frame.format.width, frame.format.height),
                    format!("{:.1}ms", frame.meta.elapsed.as_secs_f64() * 1000.0),
                    format!("{:.1}", mean_intensity(frame.pixels())),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "frame={} size={}x{} elapsed={:.1}ms mean={:.1}",
                frame.meta.number,
                frame.format.width,
                frame.format.height,
                frame.meta.elapsed.as_secs_f64() * 1000.0,
                mean_intensity(frame.pixels())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.pixels());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Mean raw byte value over the payload. A cheap liveness signal for the
/// terminal, not a calibrated photometric statistic.
pub fn mean_intensity(pixels: &[u8]) -> f64 {
    if pixels.is_empty() {
        return 0.0;
    }
    let sum: u64 = pixels.iter().map(|&b| u64::from(b)).sum();
    sum as f64 / pixels.len() as f64
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_intensity_of_uniform_payload() {
        assert_eq!(mean_intensity(&[7u8; 16]), 7.0);
        assert_eq!(mean_intensity(&[]), 0.0);
    }
}
