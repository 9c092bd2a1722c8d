//! Scroll state for paging through a rendered document.
//!
//! The pager knows nothing about rendering. A host re-renders when
//! [`Pager::set_width`] reports a change, feeds the new line count back in,
//! and draws the lines returned by [`Pager::visible`].

/// Vertical scroll offset over a rendered document.
///
/// The offset stays within `0..=max(0, lines - viewport + 1)`, so the last
/// line can be scrolled up to leave one blank row below it.
#[derive(Debug, Clone, Default)]
pub struct Pager {
    /// Current scroll offset (lines from top)
    offset: usize,
    /// Rendered document height in lines
    lines: usize,
    /// Visible viewport height in lines
    viewport_height: usize,
    /// Width the document was last rendered at
    width: Option<usize>,
}

impl Pager {
    pub fn new(viewport_height: usize) -> Self {
        Self {
            viewport_height,
            ..Self::default()
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    fn max_offset(&self) -> usize {
        (self.lines + 1).saturating_sub(self.viewport_height)
    }

    fn clamp_offset(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }

    /// Record the terminal width. Returns true when it differs from the
    /// previous one, meaning the document must be re-rendered.
    pub fn set_width(&mut self, width: usize) -> bool {
        if self.width == Some(width) {
            return false;
        }
        self.width = Some(width);
        true
    }

    /// Update the document height after a render.
    pub fn set_line_count(&mut self, lines: usize) {
        self.lines = lines;
        self.clamp_offset();
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
        self.clamp_offset();
    }

    pub fn up(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    pub fn down(&mut self) {
        self.offset = (self.offset + 1).min(self.max_offset());
    }

    /// Page up (scroll by half viewport).
    pub fn page_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.viewport_height / 2);
    }

    /// Page down (scroll by half viewport).
    pub fn page_down(&mut self) {
        self.offset = (self.offset + self.viewport_height / 2).min(self.max_offset());
    }

    /// Lines of `rendered` that fall inside the viewport.
    pub fn visible<'a>(&self, rendered: &'a str) -> impl Iterator<Item = &'a str> {
        rendered
            .split('\n')
            .skip(self.offset)
            .take(self.viewport_height)
    }
}
