use std::io::{ErrorKind, Read};
use std::time::Duration;

use log::debug;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::ByteSource;
use crate::error::StreamError;

/// Baud rate the microphone firmware streams at
pub const DEFAULT_BAUD: u32 = 921_600;

/// Device path the board usually enumerates as on macOS
pub const DEFAULT_PORT: &str = "/dev/cu.usbmodem1101";

/// Serial port settings
#[derive(Debug, Clone)]
pub struct PortConfig {
    pub port_path: String,
    pub baud_rate: u32,
    /// How long a single read may block before reporting no data
    pub timeout: Duration,
    /// Drop whatever the OS buffered before we opened the port
    pub clear_input: bool,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_path: String::from(DEFAULT_PORT),
            baud_rate: DEFAULT_BAUD,
            timeout: Duration::from_millis(100),
            clear_input: false,
        }
    }
}

impl PortConfig {
    pub fn new(port_path: &str) -> Self {
        Self {
            port_path: port_path.to_string(),
            ..Default::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_clear_input(mut self, clear_input: bool) -> Self {
        self.clear_input = clear_input;
        self
    }
}

/// Raw byte stream from a serial-connected board
pub struct SerialSource {
    port: Box<dyn SerialPort>,
}

impl SerialSource {
    /// Open the port 8N1 without flow control, with DTR and RTS deasserted
    /// so the board is not reset into its bootloader.
    pub fn open(config: PortConfig) -> Result<Self, StreamError> {
        let mut port = serialport::new(&config.port_path, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.timeout)
            .open()
            .map_err(|source| StreamError::Open {
                path: config.port_path.clone(),
                source,
            })?;

        port.write_data_terminal_ready(false)?;
        port.write_request_to_send(false)?;
        if config.clear_input {
            port.clear(ClearBuffer::Input)?;
        }

        debug!(
            "opened {} at {} baud (timeout {:?})",
            config.port_path, config.baud_rate, config.timeout
        );

        Ok(Self { port })
    }
}

impl ByteSource for SerialSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<Option<usize>, StreamError> {
        match self.port.read(buf) {
            Ok(n) => Ok(Some(n)),
            Err(e) if is_idle(e.kind()) => Ok(Some(0)),
            Err(e) => Err(StreamError::Transport(e)),
        }
    }
}

/// Read errors that only mean "nothing arrived within the timeout"
fn is_idle(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PortConfig::default();
        assert_eq!(config.baud_rate, 921_600);
        assert_eq!(config.port_path, "/dev/cu.usbmodem1101");
        assert!(!config.clear_input);
    }

    #[test]
    fn test_config_builder() {
        let config = PortConfig::new("/dev/ttyACM0")
            .with_baud_rate(115_200)
            .with_timeout(Duration::from_secs(1))
            .with_clear_input(true);

        assert_eq!(config.port_path, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert!(config.clear_input);
    }

    #[test]
    fn test_idle_kinds() {
        assert!(is_idle(ErrorKind::TimedOut));
        assert!(is_idle(ErrorKind::WouldBlock));
        assert!(!is_idle(ErrorKind::BrokenPipe));
        assert!(!is_idle(ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_open_missing_port_fails() {
        let err = SerialSource::open(PortConfig::new("/dev/does-not-exist-mic-tap"))
            .err()
            .expect("opening a missing device should fail");
        assert!(matches!(err, StreamError::Open { .. }));
    }
}
