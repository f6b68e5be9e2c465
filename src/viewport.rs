//! Cursor and scroll tracking for the interactive status list.
//!
//! The viewport is the window of `height` rows starting at `origin`.
//! `cursor` is the highlighted row relative to the top of the window, so
//! the globally selected index is always `origin + cursor`. Moving past
//! either end of the list wraps to the opposite end and repositions the
//! window so the new selection is visible.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    total: usize,
    height: usize,
    origin: usize,
    cursor: usize,
}

impl Viewport {
    pub fn new(total: usize, height: usize) -> Self {
        let viewport = Self {
            total,
            height: height.max(1),
            origin: 0,
            cursor: 0,
        };
        viewport.check();
        viewport
    }

    /// Global index of the highlighted item, or `None` for an empty list.
    pub fn selected(&self) -> Option<usize> {
        if self.total == 0 {
            None
        } else {
            Some(self.origin + self.cursor)
        }
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn move_down(&mut self) {
        let Some(selected) = self.selected() else {
            return;
        };
        if selected + 1 == self.total {
            // Wrap to the first item and scroll back to the top.
            self.origin = 0;
            self.cursor = 0;
        } else if self.cursor + 1 < self.height {
            self.cursor += 1;
        } else {
            // Cursor pinned to the bottom edge, the window slides down.
            self.origin += 1;
        }
        self.check();
    }

    pub fn move_up(&mut self) {
        let Some(selected) = self.selected() else {
            return;
        };
        if selected == 0 {
            // Wrap to the last item with the window holding the list tail.
            self.origin = self.total.saturating_sub(self.height);
            self.cursor = self.total - 1 - self.origin;
        } else if self.cursor > 0 {
            self.cursor -= 1;
        } else {
            self.origin -= 1;
        }
        self.check();
    }

    /// Adjusts to a new window height, keeping the current selection
    /// visible with the smallest possible scroll adjustment.
    pub fn resize(&mut self, height: usize) {
        let height = height.max(1);
        if height == self.height {
            return;
        }
        let selected = self.origin + self.cursor;
        self.height = height;
        if self.total <= height {
            self.origin = 0;
        } else if selected >= self.origin + height {
            self.origin = selected + 1 - height;
        }
        self.cursor = selected - self.origin;
        self.check();
    }

    fn check(&self) {
        debug_assert!(self.height >= 1);
        debug_assert!(self.cursor < self.height);
        if self.total == 0 {
            debug_assert_eq!((self.origin, self.cursor), (0, 0));
        } else {
            debug_assert!(self.origin + self.cursor < self.total);
        }
    }
}
