/*
 *  display/drivers/mock.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display driver for tests and headless runs
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

use embedded_graphics::geometry::Size;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::config::DisplayConfig;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};
use crate::vframebuf::VarFrameBuf;

use std::sync::{Arc, Mutex, MutexGuard};

/// Mock display driver
///
/// Simulates a monochrome OLED without hardware. Every controller command is
/// recorded in a shared [`MockDriverState`] so tests can check exactly which
/// hardware writes were issued.
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// Framebuffer for drawing operations
    framebuffer: VarFrameBuf<BinaryColor>,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Shared state for testing
    state: Arc<Mutex<MockDriverState>>,
}

/// Recorded controller traffic (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    pub init_count: usize,
    pub flush_count: usize,
    pub clear_count: usize,

    /// Every contrast value written, in order
    pub brightness_writes: Vec<u8>,

    /// Every power command, in order
    pub power_writes: Vec<bool>,

    /// Every invert command, in order
    pub invert_writes: Vec<bool>,

    /// Last flip state set
    pub flipped: Option<bool>,

    pub is_initialized: bool,

    /// Simulate failures (for error testing)
    pub simulate_flush_failure: bool,
    pub simulate_brightness_failure: bool,
}

impl MockDriverState {
    pub fn last_brightness(&self) -> Option<u8> {
        self.brightness_writes.last().copied()
    }

    pub fn is_on(&self) -> bool {
        self.power_writes.last().copied().unwrap_or(true)
    }

    pub fn is_inverted(&self) -> bool {
        self.invert_writes.last().copied().unwrap_or(false)
    }
}

impl MockDriver {
    /// Create a mock driver sized from the display configuration
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let width = config.width.unwrap_or(DISPLAY_WIDTH);
        let height = config.height.unwrap_or(DISPLAY_HEIGHT);
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "Mock display size {}x{}", width, height
            )));
        }

        Ok(Self {
            framebuffer: VarFrameBuf::new(width, height, BinaryColor::Off),
            capabilities: DisplayCapabilities::oled(width, height),
            state: Arc::new(Mutex::new(MockDriverState::default())),
        })
    }

    /// Create a mock driver with specific dimensions
    pub fn new_with_size(width: u32, height: u32) -> Result<Self, DisplayError> {
        let config = DisplayConfig {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        };
        Self::new(&config)
    }

    /// Get pixel at position for testing
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        self.framebuffer.pixel(Point::new(x as i32, y as i32))
    }

    /// Lit pixels on the whole panel
    pub fn count_on_pixels(&self) -> usize {
        self.framebuffer.count_in(&self.framebuffer.bounding_box(), BinaryColor::On)
    }

    /// Lit pixels inside `area`
    pub fn count_on_pixels_in(&self, area: &Rectangle) -> usize {
        self.framebuffer.count_in(area, BinaryColor::On)
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    fn state_mut(&self) -> MutexGuard<'_, MockDriverState> {
        // a panicking test thread must not hide the recorded traffic
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state_mut();
        state.init_count += 1;
        state.is_initialized = true;
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        let mut state = self.state_mut();
        if state.simulate_brightness_failure {
            // same error the controller interface reports on a failed bus write
            return Err(display_interface::DisplayError::BusWriteError.into());
        }
        state.brightness_writes.push(value);
        Ok(())
    }

    fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError> {
        self.state_mut().power_writes.push(on);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state_mut();
        if state.simulate_flush_failure {
            return Err(display_interface::DisplayError::BusWriteError.into());
        }
        state.flush_count += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.state_mut().clear_count += 1;
        self.framebuffer.clear_color(BinaryColor::Off);
        Ok(())
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.state_mut().invert_writes.push(inverted);
        Ok(())
    }

    fn set_flip(&mut self, flipped: bool) -> Result<(), DisplayError> {
        self.state_mut().flipped = Some(flipped);
        Ok(())
    }
}

impl DrawTarget for MockDriver {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.framebuffer.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.clear(color)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.framebuffer.fill_contiguous(area, colors)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.fill_solid(area, color)
    }
}

impl OriginDimensions for MockDriver {
    fn size(&self) -> Size {
        Size::new(self.capabilities.width, self.capabilities.height)
    }
}
