//! Call-stack snapshots stored in [`crate::Error::context`].
//!
//! A snapshot is a diagnostic aid, not a complete trace: it is bounded to
//! [`MAX_FRAMES`] frames and frames that cannot be resolved are left out.
//! Each frame takes two lines:
//!
//! ```text
//! src/net.rs:42
//!     net::connect
//! ```

/// Maximum number of frames kept in a snapshot.
pub const MAX_FRAMES: usize = 50;

/// Source of call-stack snapshots.
///
/// `skip == 0` starts the snapshot at the capturer's own entry frame; each
/// increment moves one frame towards the program entry point.
pub trait StackCapturer: Send + Sync {
    fn capture(&self, skip: usize) -> String;
}

/// Captures the real call stack through the `backtrace` crate.
#[derive(Debug, Clone, Copy)]
pub struct BacktraceCapturer {
    max_frames: usize,
}

impl BacktraceCapturer {
    pub const fn new() -> Self {
        Self {
            max_frames: MAX_FRAMES,
        }
    }

    pub const fn with_max_frames(max_frames: usize) -> Self {
        Self { max_frames }
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }
}

impl Default for BacktraceCapturer {
    fn default() -> Self {
        Self::new()
    }
}

impl StackCapturer for BacktraceCapturer {
    #[inline(never)]
    fn capture(&self, skip: usize) -> String {
        let frames = collect_frames();
        // The frame right above the anchor is this method.
        let entry = frames
            .iter()
            .position(Frame::is_anchor)
            .map_or(0, |anchor| anchor + 1);

        let mut out = String::new();
        let complete = frames.iter().skip(entry + skip).filter(|f| f.is_complete());
        for frame in complete.take(self.max_frames) {
            frame.write_to(&mut out);
        }
        out
    }
}

/// Always returns the same snapshot, whatever the skip count.
#[derive(Debug, Clone, Default)]
pub struct FixedCapturer(pub String);

impl StackCapturer for FixedCapturer {
    fn capture(&self, _skip: usize) -> String {
        self.0.clone()
    }
}

/// Produces empty snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCapturer;

impl StackCapturer for NoopCapturer {
    fn capture(&self, _skip: usize) -> String {
        String::new()
    }
}

struct Frame {
    file: Option<String>,
    line: Option<u32>,
    function: Option<String>,
}

const ANCHOR: &str = concat!(module_path!(), "::collect_frames");

impl Frame {
    fn is_anchor(&self) -> bool {
        self.function.as_deref() == Some(ANCHOR)
    }

    fn is_complete(&self) -> bool {
        self.file.is_some() && self.line.is_some() && self.function.is_some()
    }

    fn write_to(&self, out: &mut String) {
        use std::fmt::Write;

        if let (Some(file), Some(line), Some(function)) = (&self.file, self.line, &self.function)
        {
            let _ = write!(out, "{}:{}\n\t{}\n", file, line, function);
        }
    }
}

/// Resolves every frame of the current stack, innermost first.
///
/// Inlined calls resolve to one entry each. Frames that resolve to no symbol
/// at all are dropped here.
#[inline(never)]
fn collect_frames() -> Vec<Frame> {
    let mut frames = Vec::new();
    backtrace::trace(|raw| {
        backtrace::resolve_frame(raw, |symbol| {
            frames.push(Frame {
                file: symbol.filename().map(|p| p.display().to_string()),
                line: symbol.lineno(),
                function: symbol.name().map(|name| format!("{:#}", name)),
            });
        });
        true
    });
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_starts_at_caller() {
        let trace = BacktraceCapturer::new().capture(1);
        let lines: Vec<&str> = trace.lines().collect();
        assert!(lines.len() >= 2, "empty trace: {trace}");
        assert!(
            lines[1].starts_with('\t') && lines[1].ends_with("test_capture_starts_at_caller"),
            "unexpected first frame: {trace}"
        );
    }

    #[test]
    fn test_capture_entry_frame() {
        let trace = BacktraceCapturer::new().capture(0);
        let second = trace.lines().nth(1).unwrap_or_default();
        assert!(second.ends_with("::capture"), "unexpected entry frame: {trace}");
    }

    #[test]
    fn test_frame_pairs() {
        let trace = BacktraceCapturer::new().capture(1);
        let lines: Vec<&str> = trace.lines().collect();
        assert_eq!(lines.len() % 2, 0);
        for pair in lines.chunks(2) {
            let (_, line) = pair[0].rsplit_once(':').expect("file:line");
            assert!(line.parse::<u32>().is_ok(), "bad location: {}", pair[0]);
            assert!(pair[1].starts_with('\t'));
        }
    }

    #[test]
    fn test_max_frames_truncates() {
        let trace = BacktraceCapturer::with_max_frames(2).capture(0);
        assert!(trace.lines().count() <= 4);
    }

    #[inline(never)]
    fn capture_at_depth(depth: usize) -> String {
        if depth == 0 {
            BacktraceCapturer::new().capture(0)
        } else {
            std::hint::black_box(capture_at_depth(depth - 1))
        }
    }

    #[test]
    fn test_default_bound_truncates_deep_stack() {
        let trace = capture_at_depth(70);
        assert_eq!(trace.lines().count(), 2 * MAX_FRAMES, "{trace}");
        let deepest = trace.lines().nth(3).unwrap_or_default();
        assert!(deepest.ends_with("capture_at_depth"), "{trace}");
    }

    #[test]
    fn test_skip_past_stack() {
        assert_eq!(BacktraceCapturer::new().capture(10_000), "");
    }

    #[test]
    fn test_fixed_and_noop() {
        let fixed = FixedCapturer("main.rs:1\n\tmain\n".to_string());
        assert_eq!(fixed.capture(0), fixed.capture(7));
        assert_eq!(NoopCapturer.capture(3), "");
    }
}
