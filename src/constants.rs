/*
 *  constants.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Global constants for the OLED text grid, overlay and message viewer
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

//! Global constants used across the display and layout modules.

/// The total width of the OLED display in pixels.
pub const DISPLAY_WIDTH: u32 = 128;
/// The total height of the OLED display in pixels.
pub const DISPLAY_HEIGHT: u32 = 64;

/// Characters that fit on one message line.
pub const OLED_TXTLEN: usize = 15;
/// Number of text rows in the message grid.
pub const OLED_LINES_CNT: usize = 4;

/// Height of one line band in pixels.
pub const LINE_BAND_HEIGHT: u32 = 16;
/// Rows erased above and below a band when it is cleared.
pub const LINE_BAND_BLEED: i32 = 1;

/// Line 0 carries the timestamp, message text starts below it.
pub const MESSAGE_START_LINE: usize = 1;
/// Characters in a `HH:MM:SS` timestamp.
pub const TIMESTAMP_CHARS: u32 = 8;

/// Placeholder shown when there is nothing to display.
pub const NO_MESSAGES_TEXT: &str = "(NO MESSAGES)";
/// Y-position of the placeholder row.
pub const NO_MESSAGES_Y: i32 = 16;

/// Brightness assumed to be on the panel at power-up (0-100).
pub const DEFAULT_BRIGHTNESS: u8 = 100;
/// Logical 0-100 brightness is doubled for the panel contrast register.
pub const BRIGHTNESS_HW_SCALE: u8 = 2;

/// First hour (inclusive) treated as daytime by the day/night rule.
pub const DAY_START_HOUR: u32 = 6;
/// Last hour (inclusive) treated as daytime by the day/night rule.
pub const DAY_END_HOUR: u32 = 18;

/// Default overlay tick period.
pub const TICK_INTERVAL_MS: u64 = 100;
