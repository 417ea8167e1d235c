use crate::core::Viewport;
use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// Headless renderer: validates each frame and records what would be painted.
///
/// A rejected frame leaves the previous counts untouched.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub frames_rejected: usize,
    pub last_viewport: Option<Viewport>,
    pub last_rect_count: usize,
    pub last_line_count: usize,
    pub last_text_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        if let Err(err) = frame.validate() {
            self.frames_rejected += 1;
            return Err(err);
        }
        self.frames_rendered += 1;
        self.last_viewport = Some(frame.viewport);
        self.last_rect_count = frame.rects.len();
        self.last_line_count = frame.lines.len();
        self.last_text_count = frame.texts.len();
        Ok(())
    }
}
