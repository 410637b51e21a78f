use chrono::Local;
use clap::Parser;
use env_logger::Env;
use log::{debug, error, info};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod display;
mod error;
mod frame;
mod input;
mod output;
mod reader;
mod text;
mod window;

use display::StatusLine;
use error::StreamError;
use frame::{FrameSpec, DEFAULT_SAMPLE_RATE};
use input::serial::{DEFAULT_BAUD, DEFAULT_PORT};
use input::{PortConfig, SerialSource};
use output::{generate_filename, FrameWriter};
use reader::{ReaderConfig, StreamReader, DEFAULT_CHUNK_SIZE};
use window::{DisplayWindow, DEFAULT_WINDOW_LEN};

/// Stream, plot, or record raw samples from a serial-connected microcontroller.
///
/// With no mode flag the raw byte stream is copied to stdout.
#[derive(Parser, Debug)]
#[command(name = "mic-tap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Serial device path
    #[arg(value_name = "PORT", default_value = DEFAULT_PORT)]
    port: String,

    /// Read newline-delimited ASCII samples and show a live status line
    #[arg(long)]
    plot: bool,

    /// Record raw 16-bit mono PCM to a WAV file
    #[arg(long)]
    record: bool,

    /// Output WAV file for --record
    #[arg(short, long, default_value = "mic.wav")]
    output: PathBuf,

    /// Append a timestamp to the output file name
    #[arg(long)]
    timestamp: bool,

    /// Baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Sample rate of the recorded stream (Hz)
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE)]
    rate: u32,

    /// Recording length in seconds
    #[arg(short, long, default_value = "10")]
    seconds: u32,

    /// Largest read request in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk: usize,

    /// Number of samples kept for --plot
    #[arg(long, default_value_t = DEFAULT_WINDOW_LEN)]
    window: usize,

    /// Serial read timeout in milliseconds
    #[arg(long, default_value = "100")]
    timeout_ms: u64,

    /// Minimum time between status line refreshes in milliseconds
    #[arg(long, default_value = "50")]
    refresh_ms: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    // Validate mode and sizes
    if args.plot && args.record {
        eprintln!("Error: Cannot specify both --plot and --record");
        std::process::exit(1);
    }
    if args.chunk == 0 || args.window == 0 {
        eprintln!("Error: --chunk and --window must be greater than zero");
        std::process::exit(1);
    }
    if args.record && (args.rate == 0 || args.seconds == 0) {
        eprintln!("Error: --rate and --seconds must be greater than zero");
        std::process::exit(1);
    }

    let frame = FrameSpec::mono_i16(args.rate);
    let bytes_needed = match frame.byte_budget(args.seconds) {
        Some(bytes) => bytes,
        None if args.record => {
            eprintln!(
                "Error: --seconds {} at --rate {} is too long to record",
                args.seconds, args.rate
            );
            std::process::exit(1);
        }
        None => 0,
    };

    let port_config = PortConfig::new(&args.port)
        .with_baud_rate(args.baud)
        .with_timeout(Duration::from_millis(args.timeout_ms))
        .with_clear_input(args.record);
    let source = SerialSource::open(port_config)?;
    info!("Connected to {} at {} baud", args.port, args.baud);

    let reader_config = ReaderConfig {
        chunk_size: args.chunk,
        ..Default::default()
    };
    let mut reader = StreamReader::new(source, reader_config);

    let outcome = if args.record {
        record(&mut reader, &args, frame, bytes_needed)
    } else if args.plot {
        plot(&mut reader, &args)
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        reader.pass_through(&mut out).map(|_| ()).map_err(Into::into)
    };

    if let Err(e) = &outcome {
        if e.downcast_ref::<StreamError>().is_some_and(StreamError::is_transport) {
            error!("Lost connection to {}", args.port);
        }
    }
    outcome
}

fn record(
    reader: &mut StreamReader<SerialSource>,
    args: &Args,
    frame: FrameSpec,
    bytes_needed: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = output_path(&args.output, args.timestamp);

    info!(
        "Recording {}s at {} Hz ({} bytes) to {}",
        args.seconds,
        frame.sample_rate,
        bytes_needed,
        path.display()
    );

    let mut writer = FrameWriter::create(&path, frame)?;
    let result = reader.record(&mut writer, frame, bytes_needed);
    debug!("{} PCM bytes written", writer.bytes_written());
    // Finalize even on failure so the header matches the frames on disk
    writer.finalize()?;
    result?;

    println!("Saved {}", path.display());
    Ok(())
}

fn plot(
    reader: &mut StreamReader<SerialSource>,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut window = DisplayWindow::new(args.window);
    let mut status = StatusLine::new(io::stderr(), Duration::from_millis(args.refresh_ms));

    let stats = reader.ingest_text(&mut window, &mut status)?;

    let mut stderr = status.into_inner();
    writeln!(stderr)?;
    info!(
        "Stream closed: {} samples, {} malformed lines dropped",
        stats.samples, stats.rejected
    );
    Ok(())
}

/// Resolve the recording path, optionally stamping the file name
fn output_path(output: &Path, timestamp: bool) -> PathBuf {
    if !timestamp {
        return output.to_path_buf();
    }
    let prefix = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mic");
    output.with_file_name(generate_filename(prefix, Local::now()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_firmware() {
        let args = Args::parse_from(["mic-tap"]);
        assert_eq!(args.port, "/dev/cu.usbmodem1101");
        assert_eq!(args.baud, 921_600);
        assert_eq!(args.rate, 16_000);
        assert_eq!(args.seconds, 10);
        assert_eq!(args.chunk, 4096);
        assert_eq!(args.window, 1000);
        assert!(!args.plot && !args.record);
    }

    #[test]
    fn test_record_flags() {
        let args = Args::parse_from([
            "mic-tap", "/dev/ttyACM0", "--record", "-s", "3", "-o", "take.wav",
        ]);
        assert!(args.record);
        assert_eq!(args.port, "/dev/ttyACM0");
        assert_eq!(args.seconds, 3);
        assert_eq!(args.output, PathBuf::from("take.wav"));
    }

    #[test]
    fn test_output_path() {
        let plain = output_path(Path::new("out/mic.wav"), false);
        assert_eq!(plain, PathBuf::from("out/mic.wav"));

        let stamped = output_path(Path::new("out/mic.wav"), true);
        assert_eq!(stamped.parent(), Some(Path::new("out")));
        let name = stamped.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("mic_") && name.ends_with(".wav"));
    }
}
