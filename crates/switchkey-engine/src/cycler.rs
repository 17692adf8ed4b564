use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::ops::{ProcessOps, WinOps, WindowInfo};

/// Delay before the single retry when a process reports no windows; window
/// creation is asynchronous relative to activation.
pub(crate) const WINDOW_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Delay between activating the process and raising the target window, so
/// activation has settled before the raise lands.
pub(crate) const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Per-process window order and cursor.
///
/// Holds the cycle-eligible windows (minimized excluded) for exactly one
/// process id, and the index of the currently selected window. `None`
/// means no selection yet. Created lazily by the [`crate::CyclerStore`] on
/// the first cycle request for a pid.
#[derive(Debug)]
pub struct WindowCycler {
    pid: i32,
    windows: Vec<WindowInfo>,
    cursor: Option<usize>,
}

impl WindowCycler {
    /// Create an empty cycler for a process.
    pub fn new(pid: i32) -> Self {
        Self {
            pid,
            windows: Vec::new(),
            cursor: None,
        }
    }

    /// The process this cycler belongs to.
    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// Current cycle-eligible windows, in enumeration order.
    pub fn windows(&self) -> &[WindowInfo] {
        &self.windows
    }

    /// Cursor position, `None` before the first advance.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Re-query the window list and replace it wholesale.
    ///
    /// No diffing against the previous list; minimized windows are
    /// excluded. Idempotent when the underlying window set is unchanged.
    pub fn refresh(&mut self, win: &dyn WinOps) {
        self.windows = win.query_windows(self.pid).visible();
        trace!(
            pid = self.pid,
            count = self.windows.len(),
            "refreshed window list"
        );
    }

    /// Advance the cursor with wraparound and return the selected window.
    ///
    /// Requires a non-empty window list.
    fn advance(&mut self) -> WindowInfo {
        let len = self.windows.len();
        let next = match self.cursor {
            None => 0,
            Some(i) => (i + 1) % len,
        };
        self.cursor = Some(next);
        self.windows[next].clone()
    }

    /// Cycle to the next window of the owning process.
    ///
    /// Activates the process unconditionally. An empty window list gets one
    /// delayed retry; if that also comes up empty the process activation is
    /// the terminal fallback. Otherwise the cursor advances and the
    /// selected window is raised after a short settle delay.
    pub async fn cycle_to_next(&mut self, procs: &dyn ProcessOps, win: &dyn WinOps) {
        self.refresh(win);

        if let Err(e) = procs.activate(self.pid) {
            debug!(pid = self.pid, error = %e, "activation before cycle failed");
        }

        if self.windows.is_empty() {
            debug!(pid = self.pid, "no windows found; retrying after delay");
            tokio::time::sleep(WINDOW_RETRY_DELAY).await;
            self.refresh(win);
            if self.windows.is_empty() {
                warn!(pid = self.pid, "still no windows after retry; activating");
                if let Err(e) = procs.activate(self.pid) {
                    debug!(pid = self.pid, error = %e, "fallback activation failed");
                }
                return;
            }
            self.cursor = Some(0);
            let target = self.windows[0].clone();
            self.raise(&target, procs, win);
            return;
        }

        let target = self.advance();
        tokio::time::sleep(SETTLE_DELAY).await;
        self.raise(&target, procs, win);
    }

    /// Raise one window, falling back to process activation on failure.
    fn raise(&self, target: &WindowInfo, procs: &dyn ProcessOps, win: &dyn WinOps) {
        match win.raise_window(target.pid, target.id) {
            Ok(()) => trace!(pid = target.pid, id = target.id, "raised window"),
            Err(e) => {
                warn!(
                    pid = target.pid,
                    id = target.id,
                    error = %e,
                    "raise failed; activating process instead"
                );
                if let Err(e) = procs.activate(self.pid) {
                    debug!(pid = self.pid, error = %e, "fallback activation failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockWinOps;
    use crate::ops::WindowQuery;

    fn win(id: u32, minimized: bool) -> WindowInfo {
        WindowInfo {
            pid: 9,
            id,
            title: format!("w{id}"),
            minimized,
        }
    }

    #[test]
    fn refresh_is_idempotent() {
        let ops = MockWinOps::new();
        ops.set_windows(vec![win(1, false), win(2, true), win(3, false)]);
        let mut c = WindowCycler::new(9);
        c.refresh(&ops);
        let first: Vec<_> = c.windows().to_vec();
        c.refresh(&ops);
        assert_eq!(c.windows(), first.as_slice());
        assert_eq!(first.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn refresh_uses_main_window_fallback() {
        let ops = MockWinOps::new();
        ops.set_query(WindowQuery::MainOnly(win(5, false)));
        let mut c = WindowCycler::new(9);
        c.refresh(&ops);
        assert_eq!(c.windows().len(), 1);
        assert_eq!(c.windows()[0].id, 5);
    }

    #[test]
    fn wraparound_at_end() {
        let ops = MockWinOps::new();
        ops.set_windows(vec![win(1, false), win(2, false), win(3, false)]);
        let mut c = WindowCycler::new(9);
        c.refresh(&ops);
        c.cursor = Some(2);
        let w = c.advance();
        assert_eq!(c.cursor(), Some(0));
        assert_eq!(w.id, 1);
    }

    #[test]
    fn first_advance_selects_index_zero() {
        let ops = MockWinOps::new();
        ops.set_windows(vec![win(7, false), win(8, false)]);
        let mut c = WindowCycler::new(9);
        c.refresh(&ops);
        assert_eq!(c.cursor(), None);
        let w = c.advance();
        assert_eq!(c.cursor(), Some(0));
        assert_eq!(w.id, 7);
    }

    #[test]
    fn advance_survives_a_shrunken_list() {
        let ops = MockWinOps::new();
        ops.set_windows(vec![win(1, false), win(2, false), win(3, false)]);
        let mut c = WindowCycler::new(9);
        c.refresh(&ops);
        c.cursor = Some(2);
        // Two windows disappear between presses.
        ops.set_windows(vec![win(1, false)]);
        c.refresh(&ops);
        let w = c.advance();
        assert_eq!(w.id, 1);
        assert_eq!(c.cursor(), Some(0));
    }
}
