//! Block layout for the built-in previews.
//!
//! Previews are a vertical stack of [`Block`]s laid out to the width of an A4
//! page at 96 dpi. Text is word-wrapped with a fixed per-character advance
//! and painted as greeked bars, one per word: the capture and pagination
//! stages only care about geometry, and glyph rendering is out of scope.
//!
//! Layout happens once, when the surface is built. Painting replays the
//! resulting rectangles at the requested scale and never touches the layout.

use super::{Surface, Theme};
use image::{Rgba, RgbaImage};

/// Laid-out width of every document surface (A4 at 96 dpi).
pub const PAGE_WIDTH_PX: u32 = 794;

const PADDING_PX: u32 = 48;

/// Width available to content inside the page padding.
pub const CONTENT_WIDTH_PX: u32 = PAGE_WIDTH_PX - 2 * PADDING_PX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// One vertical unit of a preview.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Large document title (the candidate's name).
    Title { text: String, align: Align },
    /// Section heading with an underline rule.
    Heading(String),
    /// Bold entry heading (job title, degree).
    Subheading(String),
    /// Accent-coloured line (company, institution).
    Accent(String),
    /// Small muted line (contact details, dates).
    Meta { text: String, align: Align },
    Paragraph(String),
    Bullet(String),
    /// Wrapped row of pills (skills).
    Chips(Vec<String>),
    Rule,
    Spacer(u32),
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Rgba<u8>,
    ink: Rgba<u8>,
    muted: Rgba<u8>,
    accent: Rgba<u8>,
    chip: Rgba<u8>,
    rule: Rgba<u8>,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Modern => Palette {
                background: Rgba([255, 255, 255, 255]),
                ink: Rgba([30, 41, 59, 255]),
                muted: Rgba([100, 116, 139, 255]),
                accent: Rgba([37, 99, 235, 255]),
                chip: Rgba([219, 234, 254, 255]),
                rule: Rgba([226, 232, 240, 255]),
            },
            Theme::Classic => Palette {
                background: Rgba([255, 255, 255, 255]),
                ink: Rgba([17, 17, 17, 255]),
                muted: Rgba([102, 102, 102, 255]),
                accent: Rgba([51, 51, 51, 255]),
                chip: Rgba([235, 235, 235, 255]),
                rule: Rgba([200, 200, 200, 255]),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    line_px: u32,
    glyph_px: u32,
    advance: f32,
}

const TITLE: TextStyle = TextStyle {
    line_px: 40,
    glyph_px: 22,
    advance: 15.0,
};
const HEADING: TextStyle = TextStyle {
    line_px: 28,
    glyph_px: 13,
    advance: 10.5,
};
const SUBHEADING: TextStyle = TextStyle {
    line_px: 22,
    glyph_px: 10,
    advance: 8.5,
};
const BODY: TextStyle = TextStyle {
    line_px: 22,
    glyph_px: 9,
    advance: 7.8,
};
const META: TextStyle = TextStyle {
    line_px: 20,
    glyph_px: 8,
    advance: 7.0,
};

const CHIP_HEIGHT_PX: u32 = 24;
const CHIP_GAP_PX: u32 = 8;
const CHIP_PADDING_PX: u32 = 10;
const BULLET_INDENT_PX: u32 = 20;
const FRAME_PX: u32 = 4;

/// A filled rectangle in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    color: Rgba<u8>,
}

/// A wrapped line: word spans `(x, width)` relative to the line start.
#[derive(Debug, Clone, PartialEq)]
struct Line {
    words: Vec<(f32, f32)>,
    width: f32,
}

/// Greedy word wrap with a fixed advance per character. Words wider than
/// `max_width` are clipped to it and sit on their own line.
fn wrap(text: &str, advance: f32, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut words: Vec<(f32, f32)> = Vec::new();
    let mut width = 0.0_f32;

    for word in text.split_whitespace() {
        let w = (word.chars().count() as f32 * advance).min(max_width);
        if !words.is_empty() && width + advance + w > max_width {
            lines.push(Line {
                words: std::mem::take(&mut words),
                width,
            });
            width = 0.0;
        }
        let x = if words.is_empty() { 0.0 } else { width + advance };
        words.push((x, w));
        width = x + w;
    }
    if !words.is_empty() {
        lines.push(Line { words, width });
    }
    lines
}

struct Layouter {
    palette: Palette,
    y: u32,
    rects: Vec<Rect>,
}

impl Layouter {
    fn fill(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
        if w > 0 && h > 0 {
            self.rects.push(Rect { x, y, w, h, color });
        }
    }

    fn text(&mut self, text: &str, style: TextStyle, color: Rgba<u8>, align: Align, indent: u32) {
        let max_width = (CONTENT_WIDTH_PX - indent) as f32;
        for line in wrap(text, style.advance, max_width) {
            let slack = (max_width - line.width).max(0.0);
            let offset = match align {
                Align::Left => 0.0,
                Align::Center => slack / 2.0,
                Align::Right => slack,
            };
            let x0 = (PADDING_PX + indent) as f32 + offset;
            let top = self.y + (style.line_px - style.glyph_px) / 2;
            for (x, w) in line.words {
                self.fill(
                    (x0 + x).round() as u32,
                    top,
                    w.round() as u32,
                    style.glyph_px,
                    color,
                );
            }
            self.y += style.line_px;
        }
    }

    fn rule(&mut self, color: Rgba<u8>) {
        self.fill(PADDING_PX, self.y, CONTENT_WIDTH_PX, 1, color);
        self.y += 1;
    }

    fn chips(&mut self, labels: &[String]) {
        let mut x = 0;
        let mut row_used = false;
        for label in labels.iter().filter(|l| !l.trim().is_empty()) {
            let text_w = (label.chars().count() as f32 * META.advance).round() as u32;
            let w = (text_w + 2 * CHIP_PADDING_PX).min(CONTENT_WIDTH_PX);
            if row_used && x + w > CONTENT_WIDTH_PX {
                self.y += CHIP_HEIGHT_PX + CHIP_GAP_PX;
                x = 0;
            }
            let left = PADDING_PX + x;
            self.fill(left, self.y, w, CHIP_HEIGHT_PX, self.palette.chip);
            self.fill(
                left + CHIP_PADDING_PX,
                self.y + (CHIP_HEIGHT_PX - META.glyph_px) / 2,
                w.saturating_sub(2 * CHIP_PADDING_PX),
                META.glyph_px,
                self.palette.ink,
            );
            x += w + CHIP_GAP_PX;
            row_used = true;
        }
        if row_used {
            self.y += CHIP_HEIGHT_PX + CHIP_GAP_PX;
        }
    }

    fn block(&mut self, block: &Block) {
        let p = self.palette;
        match block {
            Block::Title { text, align } => {
                self.text(text, TITLE, p.ink, *align, 0);
                self.y += 6;
            }
            Block::Heading(text) => {
                self.y += 18;
                self.text(text, HEADING, p.accent, Align::Left, 0);
                self.y += 2;
                self.rule(p.rule);
                self.y += 10;
            }
            Block::Subheading(text) => self.text(text, SUBHEADING, p.ink, Align::Left, 0),
            Block::Accent(text) => self.text(text, BODY, p.accent, Align::Left, 0),
            Block::Meta { text, align } => self.text(text, META, p.muted, *align, 0),
            Block::Paragraph(text) => {
                self.text(text, BODY, p.ink, Align::Left, 0);
                self.y += 8;
            }
            Block::Bullet(text) => {
                let dot = 5;
                self.fill(
                    PADDING_PX + 6,
                    self.y + (BODY.line_px - dot) / 2,
                    dot,
                    dot,
                    p.ink,
                );
                self.text(text, BODY, p.ink, Align::Left, BULLET_INDENT_PX);
            }
            Block::Chips(labels) => self.chips(labels),
            Block::Rule => {
                self.y += 6;
                self.rule(p.rule);
                self.y += 6;
            }
            Block::Spacer(px) => self.y += px,
        }
    }
}

/// A preview laid out from [`Block`]s.
#[derive(Debug, Clone)]
pub struct DocumentSurface {
    width: u32,
    height: u32,
    background: Rgba<u8>,
    rects: Vec<Rect>,
}

impl DocumentSurface {
    /// Lay out `blocks` top to bottom in the given theme.
    pub fn layout(blocks: &[Block], theme: Theme) -> Self {
        let palette = Palette::for_theme(theme);
        let mut layouter = Layouter {
            palette,
            y: PADDING_PX,
            rects: Vec::new(),
        };
        for block in blocks {
            layouter.block(block);
        }
        let height = layouter.y + PADDING_PX;

        match theme {
            Theme::Modern => layouter.fill(0, 0, FRAME_PX, height, palette.accent),
            Theme::Classic => {
                let edge = palette.rule;
                layouter.fill(0, 0, PAGE_WIDTH_PX, 1, edge);
                layouter.fill(0, height - 1, PAGE_WIDTH_PX, 1, edge);
                layouter.fill(0, 0, 1, height, edge);
                layouter.fill(PAGE_WIDTH_PX - 1, 0, 1, height, edge);
            }
        }

        Self {
            width: PAGE_WIDTH_PX,
            height,
            background: palette.background,
            rects: layouter.rects,
        }
    }

    /// Number of painted shapes. Useful for checking that content made it
    /// into the layout.
    pub fn shape_count(&self) -> usize {
        self.rects.len()
    }
}

impl Surface for DocumentSurface {
    fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn paint(&self, scale: u32) -> Result<RgbaImage, String> {
        let scale = scale.max(1);
        let width = self
            .width
            .checked_mul(scale)
            .ok_or_else(|| format!("width {} overflows at {scale}x", self.width))?;
        let height = self
            .height
            .checked_mul(scale)
            .ok_or_else(|| format!("height {} overflows at {scale}x", self.height))?;

        let mut image = RgbaImage::from_pixel(width, height, self.background);
        for r in &self.rects {
            let x1 = ((r.x + r.w) * scale).min(width);
            let y1 = ((r.y + r.h) * scale).min(height);
            for y in (r.y * scale).min(y1)..y1 {
                for x in (r.x * scale).min(x1)..x1 {
                    image.put_pixel(x, y, r.color);
                }
            }
        }
        Ok(image)
    }
}
