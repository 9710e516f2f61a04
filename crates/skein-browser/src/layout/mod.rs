//! Inline layout: turns a token stream into positioned words.
//!
//! Words are collected into a line buffer and placed on a common
//! baseline when the line is flushed, so mixed font sizes on one line
//! line up at the bottom instead of the top.

pub mod font;
pub mod style;

pub use font::{FontDescriptor, FontMetrics, LineMetrics, MonospaceMetrics, Slant, Weight};
pub use style::StyleState;

use crate::html::{TagKind, Token};

/// Extra leading applied above the tallest ascent and below the
/// deepest descent of each line.
const LEADING: f32 = 1.25;

/// Geometry shared by every layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Viewport width.
    pub width: f32,
    /// Left margin and right wrap margin.
    pub hstep: f32,
    /// Top margin and paragraph gap.
    pub vstep: f32,
    /// Font size text starts at.
    pub base_size: u16,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            width: 800.0,
            hstep: 13.0,
            vstep: 18.0,
            base_size: 16,
        }
    }
}

impl LayoutParams {
    pub fn with_width(width: f32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }
}

/// One word at its final position. `y` is the top of the word's box.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font: FontDescriptor,
}

/// Lay out `tokens` for a viewport `width` wide using default margins.
pub fn layout(tokens: &[Token], width: f32, metrics: &dyn FontMetrics) -> Vec<Placement> {
    layout_with(tokens, &LayoutParams::with_width(width), metrics)
}

/// Lay out `tokens` with explicit geometry.
///
/// Pure in its inputs: the same tokens, parameters and metrics always
/// produce the same placements.
pub fn layout_with(
    tokens: &[Token],
    params: &LayoutParams,
    metrics: &dyn FontMetrics,
) -> Vec<Placement> {
    let mut state = LayoutState::new(params, metrics);
    for token in tokens {
        state.token(token);
    }
    state.finish()
}

/// Bottom edge of the lowest placement, or zero for an empty display
/// list.
pub fn content_height(placements: &[Placement], metrics: &dyn FontMetrics) -> f32 {
    placements
        .iter()
        .map(|p| {
            let m = metrics.metrics(&p.font);
            p.y + m.ascent + m.descent
        })
        .fold(0.0, f32::max)
}

/// A word waiting in the line buffer.
struct LineEntry<'t> {
    x: f32,
    text: &'t str,
    font: FontDescriptor,
}

/// Everything a layout pass mutates, threaded through one value.
struct LayoutState<'a, 't> {
    params: &'a LayoutParams,
    metrics: &'a dyn FontMetrics,
    style: StyleState,
    cursor_x: f32,
    cursor_y: f32,
    line: Vec<LineEntry<'t>>,
    placements: Vec<Placement>,
}

impl<'a, 't> LayoutState<'a, 't> {
    fn new(params: &'a LayoutParams, metrics: &'a dyn FontMetrics) -> Self {
        Self {
            params,
            metrics,
            style: StyleState::new(params.base_size),
            cursor_x: params.hstep,
            cursor_y: params.vstep,
            line: Vec::new(),
            placements: Vec::new(),
        }
    }

    fn token(&mut self, token: &'t Token) {
        match token {
            Token::Text(text) => {
                if self.style.in_body {
                    for word in text.split_whitespace() {
                        self.word(word);
                    }
                }
            },
            Token::Tag(tag) => {
                let kind = TagKind::classify(tag);
                match kind {
                    TagKind::LineBreak => self.flush(),
                    TagKind::ParagraphClose => {
                        self.flush();
                        self.cursor_y += self.params.vstep;
                    },
                    _ => self.style.apply(kind),
                }
            },
        }
    }

    fn word(&mut self, word: &'t str) {
        let font = self.style.font();
        let w = self.metrics.measure(word, &font);
        // An overlong word still lands on its own line at the margin.
        if self.cursor_x + w > self.params.width - self.params.hstep {
            self.flush();
        }
        self.line.push(LineEntry {
            x: self.cursor_x,
            text: word,
            font,
        });
        self.cursor_x += w + self.metrics.measure(" ", &font);
    }

    /// Place the buffered line on a shared baseline and start a new one.
    /// An empty buffer only resets the horizontal cursor.
    fn flush(&mut self) {
        self.cursor_x = self.params.hstep;
        if self.line.is_empty() {
            return;
        }

        let mut max_ascent = 0.0f32;
        let mut max_descent = 0.0f32;
        for entry in &self.line {
            let m = self.metrics.metrics(&entry.font);
            max_ascent = max_ascent.max(m.ascent);
            max_descent = max_descent.max(m.descent);
        }

        let baseline = self.cursor_y + LEADING * max_ascent;
        for entry in self.line.drain(..) {
            let ascent = self.metrics.metrics(&entry.font).ascent;
            self.placements.push(Placement {
                x: entry.x,
                y: baseline - ascent,
                text: entry.text.to_string(),
                font: entry.font,
            });
        }
        self.cursor_y = baseline + LEADING * max_descent;
    }

    fn finish(mut self) -> Vec<Placement> {
        self.flush();
        self.placements
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::html::tokenize;

    fn run(html: &str, width: f32) -> Vec<Placement> {
        layout(&tokenize(html), width, &MonospaceMetrics)
    }

    fn words(placements: &[Placement]) -> Vec<&str> {
        placements.iter().map(|p| p.text.as_str()).collect()
    }

    fn find<'p>(placements: &'p [Placement], text: &str) -> &'p Placement {
        placements
            .iter()
            .find(|p| p.text == text)
            .unwrap_or_else(|| panic!("no placement for {text:?}"))
    }

    fn baseline(p: &Placement) -> f32 {
        p.y + MonospaceMetrics.metrics(&p.font).ascent
    }

    #[test]
    fn empty_input_places_nothing() {
        assert!(layout(&[], 800.0, &MonospaceMetrics).is_empty());
    }

    #[test]
    fn text_outside_body_is_ignored() {
        let placed = run("<head><title>Title</title></head><body>shown</body>after", 800.0);
        assert_eq!(words(&placed), vec!["shown"]);
    }

    #[test]
    fn first_line_geometry() {
        let placed = run("<body>hello world</body>", 800.0);
        assert_eq!(words(&placed), vec!["hello", "world"]);
        // baseline = 18 + 1.25 * 12, y = baseline - 12
        assert_eq!(placed[0].x, 13.0);
        assert_eq!(placed[0].y, 21.0);
        // 13 + "hello" (40) + space (8)
        assert_eq!(placed[1].x, 61.0);
        assert_eq!(placed[1].y, 21.0);
    }

    #[test]
    fn whitespace_runs_collapse() {
        let placed = run("<body>  a \n\t b   </body>", 800.0);
        assert_eq!(words(&placed), vec!["a", "b"]);
        assert_eq!(placed[1].x, 13.0 + 8.0 + 8.0);
    }

    #[test]
    fn wraps_at_right_margin() {
        // Right limit is 100 - 13 = 87; "world" would end at 101.
        let placed = run("<body>hello world</body>", 100.0);
        let hello = find(&placed, "hello");
        let world = find(&placed, "world");
        assert_eq!(world.x, 13.0);
        assert!(world.y > hello.y);
        // Second baseline: 18 + 15 + 1.25 * 4 + 15 = 53
        assert_eq!(world.y, 41.0);
    }

    #[test]
    fn overlong_word_sits_at_margin() {
        let placed = run("<body>abcdefghijklmnop</body>", 50.0);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].x, 13.0);
        assert_eq!(placed[0].y, 21.0);
    }

    #[test]
    fn every_word_starts_inside_margin() {
        let placed = run(
            "<body>the quick brown fox jumps over the lazy dog again and again</body>",
            120.0,
        );
        for p in &placed {
            assert!(p.x >= 13.0);
            let right = p.x + MonospaceMetrics.measure(&p.text, &p.font);
            // Only words that start a line may cross the margin.
            assert!(right <= 120.0 - 13.0 || p.x == 13.0, "{p:?}");
        }
    }

    #[test]
    fn mixed_sizes_share_a_baseline() {
        let placed = run("<body>a <big>B</big> <small>c</small></body>", 800.0);
        let a = find(&placed, "a");
        let b = find(&placed, "B");
        let c = find(&placed, "c");
        assert_eq!(b.font.size, 20);
        assert_eq!(c.font.size, 14);
        assert_eq!(baseline(a), baseline(b));
        assert_eq!(baseline(a), baseline(c));
        // Larger glyphs reach higher.
        assert!(b.y < a.y && a.y < c.y);
        // Tallest ascent on the line sets the baseline: 18 + 1.25 * 15.
        assert_eq!(baseline(b), 36.75);
    }

    #[test]
    fn paragraph_close_adds_gap_line_break_does_not() {
        let br = run("<body>a<br>b</body>", 800.0);
        let p = run("<body>a</p>b</body>", 800.0);
        let gap = find(&p, "b").y - find(&br, "b").y;
        assert_eq!(gap, 18.0);
        assert_eq!(find(&br, "b").x, 13.0);
        assert!(find(&br, "b").y > find(&br, "a").y);
    }

    #[test]
    fn break_on_empty_line_is_a_no_op() {
        let once = run("<body>a<br>b</body>", 800.0);
        let twice = run("<body>a<br><br/>b</body>", 800.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn paragraph_gap_accumulates() {
        let one = run("<body>a</p>b</body>", 800.0);
        let two = run("<body>a</p></p>b</body>", 800.0);
        assert_eq!(find(&two, "b").y - find(&one, "b").y, 18.0);
    }

    #[test]
    fn styles_reach_descriptors() {
        let placed = run("<body><b>bold</b> <i>slanted</i> plain</body>", 800.0);
        assert_eq!(find(&placed, "bold").font.weight, Weight::Bold);
        assert_eq!(find(&placed, "slanted").font.slant, Slant::Italic);
        let plain = find(&placed, "plain").font;
        assert_eq!(plain, FontDescriptor::new(16, Weight::Normal, Slant::Roman));
    }

    #[test]
    fn text_run_split_by_style_tags_continues_on_line() {
        let placed = run("<body>one <b>two</b> three</body>", 800.0);
        let ys: Vec<f32> = placed.iter().map(|p| p.y).collect();
        assert!(ys.iter().all(|&y| y == ys[0]));
        assert!(placed.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn attributes_do_not_hide_tags() {
        let placed = run("<body class=\"main\"><b id=x>x</b></body>", 800.0);
        assert_eq!(find(&placed, "x").font.weight, Weight::Bold);
    }

    #[test]
    fn custom_params() {
        let params = LayoutParams {
            width: 400.0,
            hstep: 20.0,
            vstep: 30.0,
            base_size: 32,
        };
        let placed = layout_with(&tokenize("<body>x</body>"), &params, &MonospaceMetrics);
        // baseline = 30 + 1.25 * 24, y = baseline - 24
        assert_eq!(placed[0].x, 20.0);
        assert_eq!(placed[0].y, 36.0);
        assert_eq!(placed[0].font.size, 32);
    }

    #[test]
    fn content_height_covers_last_line() {
        let placed = run("<body>a</p>b</body>", 800.0);
        let b = find(&placed, "b");
        assert_eq!(content_height(&placed, &MonospaceMetrics), b.y + 16.0);
        assert_eq!(content_height(&[], &MonospaceMetrics), 0.0);
    }

    proptest! {
        #[test]
        fn layout_is_deterministic(input in "[a-z <>/bip]{0,200}", width in 40.0f32..1200.0) {
            let tokens = tokenize(&input);
            let first = layout(&tokens, width, &MonospaceMetrics);
            let second = layout(&tokens, width, &MonospaceMetrics);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn placements_stay_below_top_margin(input in "[a-z <>/bigpsml]{0,200}", width in 40.0f32..1200.0) {
            let tokens = tokenize(&format!("<body>{input}"));
            for p in layout(&tokens, width, &MonospaceMetrics) {
                prop_assert!(p.y >= 18.0, "{:?}", p);
                prop_assert!(p.x >= 13.0, "{:?}", p);
            }
        }

        #[test]
        fn lines_flow_downward(text in "[a-z]{1,12}( [a-z]{1,12}){0,40}", width in 60.0f32..600.0) {
            let tokens = tokenize(&format!("<body>{text}</body>"));
            let placed = layout(&tokens, width, &MonospaceMetrics);
            prop_assert_eq!(placed.len(), text.split_whitespace().count());
            for pair in placed.windows(2) {
                let same_line = pair[0].y == pair[1].y;
                prop_assert!(same_line || pair[1].y > pair[0].y);
                if same_line {
                    prop_assert!(pair[1].x > pair[0].x);
                } else {
                    prop_assert_eq!(pair[1].x, 13.0);
                }
            }
        }
    }
}
