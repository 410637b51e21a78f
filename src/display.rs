use std::io::Write;
use std::time::{Duration, Instant};

use crate::error::StreamError;
use crate::window::DisplayWindow;

/// Something that visualizes the display window after it changes
pub trait Redraw {
    fn redraw(&mut self, window: &DisplayWindow) -> Result<(), StreamError>;
}

/// One-line textual view of the window, refreshed in place
pub struct StatusLine<W: Write> {
    out: W,
    interval: Duration,
    last_draw: Option<Instant>,
}

impl<W: Write> StatusLine<W> {
    pub fn new(out: W, interval: Duration) -> Self {
        Self {
            out,
            interval,
            last_draw: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Redraw for StatusLine<W> {
    fn redraw(&mut self, window: &DisplayWindow) -> Result<(), StreamError> {
        let now = Instant::now();
        if let Some(last) = self.last_draw {
            if now.duration_since(last) < self.interval {
                return Ok(());
            }
        }
        self.last_draw = Some(now);

        let (min, max) = window.min_max().unwrap_or((0, 0));
        write!(
            self.out,
            "\rlast {:>6}  min {:>6}  max {:>6}  rms {:>8.1}",
            window.latest().unwrap_or(0),
            min,
            max,
            window.rms()
        )
        .and_then(|_| self.out.flush())
        .map_err(StreamError::Sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_window_stats() {
        let mut window = DisplayWindow::new(2);
        window.push(100);
        window.push(-200);

        let mut status = StatusLine::new(Vec::new(), Duration::ZERO);
        status.redraw(&window).unwrap();
        let text = String::from_utf8(status.into_inner()).unwrap();
        assert!(text.starts_with('\r'));
        assert!(text.contains("last   -200"));
        assert!(text.contains("max    100"));
    }

    #[test]
    fn test_throttles_redraws() {
        let window = DisplayWindow::new(4);
        let mut status = StatusLine::new(Vec::new(), Duration::from_secs(3600));
        status.redraw(&window).unwrap();
        status.redraw(&window).unwrap();
        let text = String::from_utf8(status.into_inner()).unwrap();
        assert_eq!(text.matches('\r').count(), 1);
    }
}
