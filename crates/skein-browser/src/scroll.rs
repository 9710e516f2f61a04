//! Viewport scroll offset and visibility culling.

use crate::layout::{FontMetrics, Placement};

/// Vertical scroll state for one viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollState {
    /// Current offset from the top of the document.
    pub offset: f32,
    /// Bottom edge of the laid-out document.
    pub content_height: f32,
    pub viewport_height: f32,
    /// Distance moved by one key press or one wheel notch.
    step: f32,
    /// Largest wheel delta honoured in one event, in notches.
    max_notches: i32,
}

impl ScrollState {
    pub fn new(viewport_height: f32, step: f32, max_notches: i32) -> Self {
        Self {
            offset: 0.0,
            content_height: 0.0,
            viewport_height,
            step,
            max_notches: max_notches.max(1),
        }
    }

    /// Scroll down by one step.
    pub fn scroll_down(&mut self) {
        self.offset += self.step;
        self.clamp();
    }

    /// Scroll up by one step.
    pub fn scroll_up(&mut self) {
        self.offset -= self.step;
        self.clamp();
    }

    /// Scroll by a wheel delta in notches; positive moves down. Large
    /// deltas are capped at the configured notch limit.
    pub fn wheel(&mut self, notches: i32) {
        let notches = notches.clamp(-self.max_notches, self.max_notches);
        self.offset += notches as f32 * self.step;
        self.clamp();
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0.0;
    }

    /// Update content height (after layout).
    pub fn set_content_height(&mut self, height: f32) {
        self.content_height = height;
        self.clamp();
    }

    /// Update viewport height (after resize).
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
        self.clamp();
    }

    pub fn max_scroll(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    fn clamp(&mut self) {
        self.offset = self.offset.clamp(0.0, self.max_scroll());
    }

    /// Placements that intersect the viewport, with `y` translated into
    /// viewport coordinates.
    pub fn visible(&self, placements: &[Placement], metrics: &dyn FontMetrics) -> Vec<Placement> {
        let bottom = self.offset + self.viewport_height;
        placements
            .iter()
            .filter(|p| {
                let m = metrics.metrics(&p.font);
                p.y <= bottom && p.y + m.ascent + m.descent >= self.offset
            })
            .map(|p| Placement {
                y: p.y - self.offset,
                ..p.clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FontDescriptor, MonospaceMetrics, Slant, Weight};

    fn state(content: f32) -> ScrollState {
        let mut s = ScrollState::new(600.0, 100.0, 3);
        s.set_content_height(content);
        s
    }

    fn word(y: f32) -> Placement {
        Placement {
            x: 13.0,
            y,
            text: "w".to_string(),
            font: FontDescriptor::new(16, Weight::Normal, Slant::Roman),
        }
    }

    #[test]
    fn starts_at_top() {
        let s = state(2000.0);
        assert_eq!(s.offset, 0.0);
        assert_eq!(s.max_scroll(), 1400.0);
    }

    #[test]
    fn step_down_and_up() {
        let mut s = state(2000.0);
        s.scroll_down();
        s.scroll_down();
        assert_eq!(s.offset, 200.0);
        s.scroll_up();
        assert_eq!(s.offset, 100.0);
    }

    #[test]
    fn never_scrolls_above_top() {
        let mut s = state(2000.0);
        s.scroll_up();
        assert_eq!(s.offset, 0.0);
        s.wheel(-2);
        assert_eq!(s.offset, 0.0);
    }

    #[test]
    fn never_scrolls_past_content() {
        let mut s = state(750.0);
        s.scroll_down();
        s.scroll_down();
        assert_eq!(s.offset, 150.0);
    }

    #[test]
    fn short_document_does_not_scroll() {
        let mut s = state(300.0);
        s.scroll_down();
        assert_eq!(s.offset, 0.0);
    }

    #[test]
    fn wheel_clamped_to_max_notches() {
        let mut s = state(10_000.0);
        s.wheel(10);
        assert_eq!(s.offset, 300.0);
        s.wheel(1);
        assert_eq!(s.offset, 400.0);
        s.wheel(-50);
        assert_eq!(s.offset, 100.0);
    }

    #[test]
    fn shrinking_content_pulls_offset_back() {
        let mut s = state(5000.0);
        s.wheel(3);
        s.wheel(3);
        s.set_content_height(700.0);
        assert_eq!(s.offset, 100.0);
    }

    #[test]
    fn growing_viewport_pulls_offset_back() {
        let mut s = state(1000.0);
        s.wheel(3);
        assert_eq!(s.offset, 300.0);
        s.set_viewport_height(900.0);
        assert_eq!(s.offset, 100.0);
    }

    #[test]
    fn visible_culls_and_translates() {
        let mut s = state(5000.0);
        s.scroll_down();
        let placements = vec![word(50.0), word(90.0), word(400.0), word(700.0), word(800.0)];
        let shown = s.visible(&placements, &MonospaceMetrics);
        let ys: Vec<f32> = shown.iter().map(|p| p.y).collect();
        // 50 ends at 66 (above the viewport); 800 starts below 700.
        assert_eq!(ys, vec![-10.0, 300.0, 600.0]);
    }

    #[test]
    fn scroll_to_top_resets() {
        let mut s = state(5000.0);
        s.wheel(3);
        s.scroll_to_top();
        assert_eq!(s.offset, 0.0);
    }
}
