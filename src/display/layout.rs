/*
 *  display/layout.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text grid geometry for the message viewer and status overlay
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_8X13};
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::constants::{
    LINE_BAND_BLEED, LINE_BAND_HEIGHT, NO_MESSAGES_Y, OLED_LINES_CNT, OLED_TXTLEN, TIMESTAMP_CHARS,
};
use crate::display::traits::DisplayCapabilities;

/// Font size categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSize {
    /// 6x10, overlay clock
    Small,

    /// 8x13, message rows and timestamps
    #[default]
    Large,
}

impl FontSize {
    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            FontSize::Small => &FONT_6X10,
            FontSize::Large => &FONT_8X13,
        }
    }

    /// Horizontal advance of one glyph in pixels
    pub fn char_width(&self) -> u32 {
        let font = self.font();
        font.character_size.width + font.character_spacing
    }

    pub fn char_height(&self) -> u32 {
        self.font().character_size.height
    }

    /// Pixel width of `chars` glyphs
    pub fn text_width(&self, chars: u32) -> u32 {
        chars * self.char_width()
    }
}

/// Geometry of the fixed text grid
///
/// The grid is `lines` rows of `line_width` characters, each row occupying a
/// band of `band_height` pixels. Row 0 is shared by the overlay clock on the
/// left and the message timestamp on the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Characters per row
    pub line_width: usize,

    /// Number of rows
    pub lines: usize,

    /// Height of one row band in pixels
    pub band_height: u32,

    /// Font for message rows and timestamps
    pub text_font: FontSize,

    /// Font for the overlay clock
    pub overlay_font: FontSize,

    /// Y position of the "(NO MESSAGES)" placeholder
    pub no_messages_y: i32,
}

impl GridLayout {
    /// Create the grid for the given display
    pub fn for_display(caps: &DisplayCapabilities) -> Self {
        let text_font = FontSize::Large;
        let fit_chars = (caps.width / text_font.char_width()) as usize;
        let fit_lines = (caps.height / LINE_BAND_HEIGHT) as usize;

        Self {
            width: caps.width,
            height: caps.height,
            line_width: OLED_TXTLEN.min(fit_chars).max(1),
            lines: OLED_LINES_CNT.min(fit_lines).max(1),
            band_height: LINE_BAND_HEIGHT,
            text_font,
            overlay_font: FontSize::Small,
            no_messages_y: NO_MESSAGES_Y.min(caps.height.saturating_sub(LINE_BAND_HEIGHT) as i32),
        }
    }

    /// Top-left corner of a text row
    pub fn line_origin(&self, line: usize) -> Point {
        Point::new(0, line as i32 * self.band_height as i32)
    }

    /// Full-width band of a row, bleeding one pixel into its neighbours and
    /// clipped to the panel
    pub fn band(&self, line: usize) -> Rectangle {
        let top = line as i32 * self.band_height as i32 - LINE_BAND_BLEED;
        let bottom = line as i32 * self.band_height as i32 + self.band_height as i32 + LINE_BAND_BLEED;
        let top = top.max(0);
        let bottom = bottom.min(self.height as i32);
        let rows = (bottom - top).max(0) as u32;
        Rectangle::new(Point::new(0, top), Size::new(self.width, rows))
    }

    /// Region from `origin` to the right edge, one band high
    pub fn clear_at(&self, origin: Point) -> Rectangle {
        let x = origin.x.clamp(0, self.width as i32);
        let width = self.width - x as u32;
        let rows = self.band_height.min((self.height as i32 - origin.y).max(0) as u32);
        Rectangle::new(Point::new(x, origin.y), Size::new(width, rows))
    }

    /// Right edge anchor of the timestamp, the last pixel column
    pub fn timestamp_anchor_x(&self) -> i32 {
        self.width as i32 - 1
    }

    /// X where the right-aligned timestamp region on row 0 begins, one
    /// column of slack left of the glyphs
    pub fn timestamp_x(&self) -> i32 {
        self.width.saturating_sub(self.text_font.text_width(TIMESTAMP_CHARS) + 1) as i32
    }

    /// Region behind the overlay clock, top-left of row 0
    pub fn clock_area(&self) -> Rectangle {
        let width = self.overlay_font.text_width(TIMESTAMP_CHARS).min(self.width);
        let height = self.overlay_font.char_height().min(self.height);
        Rectangle::new(Point::zero(), Size::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_128x64() {
        let grid = GridLayout::for_display(&DisplayCapabilities::oled(128, 64));
        assert_eq!(grid.line_width, 15);
        assert_eq!(grid.lines, 4);
        assert_eq!(grid.band_height, 16);
        assert_eq!(grid.no_messages_y, 16);
        assert_eq!(grid.timestamp_x(), 63);
        assert_eq!(grid.timestamp_anchor_x(), 127);
    }

    #[test]
    fn test_grid_128x32() {
        let grid = GridLayout::for_display(&DisplayCapabilities::oled(128, 32));
        assert_eq!(grid.lines, 2);
        assert_eq!(grid.line_width, 15);
        assert_eq!(grid.no_messages_y, 16);
    }

    #[test]
    fn test_grid_narrow_display() {
        let grid = GridLayout::for_display(&DisplayCapabilities::oled(64, 48));
        assert_eq!(grid.line_width, 8);
        assert_eq!(grid.lines, 3);
    }

    #[test]
    fn test_band_bleed_and_clip() {
        let grid = GridLayout::for_display(&DisplayCapabilities::oled(128, 64));

        // row 0 cannot bleed above the panel
        assert_eq!(grid.band(0), Rectangle::new(Point::new(0, 0), Size::new(128, 17)));
        // inner rows bleed one pixel each way
        assert_eq!(grid.band(1), Rectangle::new(Point::new(0, 15), Size::new(128, 18)));
        // last row is clipped at the bottom edge
        assert_eq!(grid.band(3), Rectangle::new(Point::new(0, 47), Size::new(128, 17)));
    }

    #[test]
    fn test_clear_at_right_edge() {
        let grid = GridLayout::for_display(&DisplayCapabilities::oled(128, 64));
        let r = grid.clear_at(Point::new(64, 0));
        assert_eq!(r, Rectangle::new(Point::new(64, 0), Size::new(64, 16)));
    }

    #[test]
    fn test_clock_area_does_not_meet_timestamp() {
        let grid = GridLayout::for_display(&DisplayCapabilities::oled(128, 64));
        let clock = grid.clock_area();
        assert_eq!(clock.size, Size::new(48, 10));
        assert!((clock.size.width as i32) <= grid.timestamp_x());
    }

    #[test]
    fn test_font_metrics() {
        assert_eq!(FontSize::Small.char_width(), 6);
        assert_eq!(FontSize::Large.char_width(), 8);
        assert_eq!(FontSize::Large.text_width(15), 120);
    }
}
