//! Fenced code block tracking.
//!
//! Directive openers inside ``` or ~~~ fences are literal text.

/// Open fence: marker character and run length.
#[derive(Debug, Clone, Copy)]
struct OpenFence {
    marker: char,
    len: usize,
}

/// Line-by-line tracker of fenced code blocks.
///
/// A fence closes on a line of the same marker character that is at least as
/// long as the opener and carries nothing but trailing whitespace.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line. Returns `true` when the line opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.open {
            Some(open) => {
                let (marker, len) = marker_run(trimmed);
                let closes = marker == Some(open.marker)
                    && len >= open.len
                    && trimmed[len..].trim().is_empty();
                if closes {
                    self.open = None;
                }
                closes
            }
            None => match marker_run(trimmed) {
                (Some(marker), len) if len >= 3 => {
                    self.open = Some(OpenFence { marker, len });
                    true
                }
                _ => false,
            },
        }
    }
}

/// Leading run of '`' or '~'. Both characters are ASCII, so the run length is
/// also its byte length.
fn marker_run(trimmed: &str) -> (Option<char>, usize) {
    match trimmed.chars().next() {
        Some(c @ ('`' | '~')) => (Some(c), trimmed.chars().take_while(|&x| x == c).count()),
        _ => (None, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtick_fence_round_trip() {
        let mut fence = FenceTracker::default();
        assert!(fence.update("```python"));
        assert!(fence.in_fence());
        assert!(!fence.update(":::quizly[q1]"));
        assert!(fence.in_fence());
        assert!(fence.update("```"));
        assert!(!fence.in_fence());
    }

    #[test]
    fn test_closing_needs_same_marker_and_length() {
        let mut fence = FenceTracker::default();
        assert!(fence.update("~~~~"));
        assert!(!fence.update("```"));
        assert!(!fence.update("~~~"));
        assert!(fence.in_fence());
        assert!(fence.update("~~~~~  "));
        assert!(!fence.in_fence());
    }

    #[test]
    fn test_closing_rejects_info_string() {
        let mut fence = FenceTracker::default();
        fence.update("```");
        assert!(!fence.update("```rust"));
        assert!(fence.in_fence());
    }

    #[test]
    fn test_short_runs_are_not_fences() {
        let mut fence = FenceTracker::default();
        assert!(!fence.update("``inline``"));
        assert!(!fence.update("::: note"));
        assert!(!fence.in_fence());
    }

    #[test]
    fn test_indented_fence() {
        let mut fence = FenceTracker::default();
        assert!(fence.update("   ```"));
        assert!(fence.update("  ```"));
        assert!(!fence.in_fence());
    }
}
