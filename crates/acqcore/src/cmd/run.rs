use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use acqcore_session::{Core, SessionFault};
use tracing::info;

use crate::cmd::RunArgs;
use crate::exit::{session_error, CliError, CliResult, DEVICE_ERROR, FAILURE, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_interval(&args.interval)?;
    let interval_ms = interval.as_secs_f64() * 1000.0;
    let core = args.camera.build_core()?;

    if args.continuous {
        run_continuous(&core, interval_ms, format)
    } else {
        let count = args
            .count
            .ok_or_else(|| CliError::new(USAGE, "either --count or --continuous is required"))?;
        run_finite(&core, count, interval_ms, args.stop_on_overflow, format)
    }
}

fn run_finite(
    core: &Core,
    count: u64,
    interval_ms: f64,
    stop_on_overflow: bool,
    format: OutputFormat,
) -> CliResult<i32> {
    core.start_sequence_acquisition(count, interval_ms, stop_on_overflow)
        .map_err(|err| session_error("start failed", err))?;

    let mut printed = 0u64;
    loop {
        if core.wait_for_image(POLL_TIMEOUT) {
            let frame = core
                .pop_next_image()
                .map_err(|err| session_error("pop failed", err))?;
            print_frame(&frame, format);
            printed += 1;
            if printed == count {
                break;
            }
            continue;
        }

        // No frame within the poll window; a finished producer means no
        // more are coming.
        if !core.is_sequence_running() && core.remaining_image_count() == 0 {
            break;
        }
    }

    core.stop_sequence_acquisition()
        .map_err(|err| session_error("stop failed", err))?;

    match core.last_acquisition_fault() {
        None => Ok(SUCCESS),
        Some(SessionFault::Overflow) => Err(CliError::new(
            FAILURE,
            format!("acquisition halted on buffer overflow after {printed} frames"),
        )),
        Some(SessionFault::Device(message)) => Err(CliError::new(
            DEVICE_ERROR,
            format!("device fault after {printed} frames: {message}"),
        )),
    }
}

fn run_continuous(core: &Core, interval_ms: f64, format: OutputFormat) -> CliResult<i32> {
    core.start_continuous_acquisition(interval_ms)
        .map_err(|err| session_error("start failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0u64;
    while running.load(Ordering::SeqCst) {
        if !core.wait_for_image(POLL_TIMEOUT) {
            if let Some(SessionFault::Device(message)) = core.last_acquisition_fault() {
                let _ = core.stop_sequence_acquisition();
                return Err(CliError::new(
                    DEVICE_ERROR,
                    format!("device fault after {printed} frames: {message}"),
                ));
            }
            continue;
        }
        let frame = core
            .pop_next_image()
            .map_err(|err| session_error("pop failed", err))?;
        print_frame(&frame, format);
        printed += 1;
    }

    info!(frames = printed, "interrupted, stopping acquisition");
    core.stop_sequence_acquisition()
        .map_err(|err| session_error("stop failed", err))?;
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

fn parse_interval(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "interval must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "ms")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid interval value: {input}")))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported interval unit: {unit}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interval_units() {
        assert_eq!(parse_interval("0ms").unwrap(), Duration::ZERO);
        assert_eq!(parse_interval("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_interval("2s").unwrap(), Duration::from_secs(2));
        // Bare numbers are milliseconds.
        assert_eq!(parse_interval("25").unwrap(), Duration::from_millis(25));
    }

    #[test]
    fn parse_interval_invalid() {
        assert!(parse_interval("").is_err());
        assert!(parse_interval("fast").is_err());
        assert!(parse_interval("-5ms").is_err());
    }
}
