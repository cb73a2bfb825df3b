/*
 *  display/traits.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for display driver abstraction
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

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use crate::display::error::DisplayError;

/// Display capabilities and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Whether the display supports brightness control
    pub supports_brightness: bool,

    /// Whether the display supports inversion
    pub supports_invert: bool,

    /// Whether the panel can be flipped upside down
    pub supports_flip: bool,
}

impl DisplayCapabilities {
    /// Capabilities of a 128x64 class OLED controller
    pub fn oled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            supports_brightness: true,
            supports_invert: true,
            supports_flip: true,
        }
    }
}

/// Minimal hardware abstraction - all display drivers must implement this trait
///
/// Drawing goes through the driver's framebuffer via `DrawTarget`; this trait
/// covers the controller commands that bypass the framebuffer.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Initialize the display hardware
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Set panel contrast (0-255)
    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError>;

    /// Switch the panel on or off, framebuffer contents are kept
    fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Flush the current framebuffer to the display hardware
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Clear the framebuffer to black, does not flush
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Set display inversion (if supported)
    ///
    /// When inverted, light pixels become dark and vice versa.
    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        let _ = inverted;
        Err(DisplayError::UnsupportedOperation)
    }

    /// Rotate the panel 180 degrees (if supported)
    fn set_flip(&mut self, flipped: bool) -> Result<(), DisplayError> {
        let _ = flipped;
        Err(DisplayError::UnsupportedOperation)
    }
}

/// A monochrome driver that can also be drawn on with embedded-graphics
pub trait MonoDisplay: DisplayDriver + DrawTarget<Color = BinaryColor> {}

impl<T> MonoDisplay for T where T: DisplayDriver + DrawTarget<Color = BinaryColor> {}
