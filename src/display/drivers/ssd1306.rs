/*
 *  display/drivers/ssd1306.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 OLED display driver implementation
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

use linux_embedded_hal::I2cdev;
use ssd1306::{
    mode::BufferedGraphicsMode,
    prelude::{Brightness, DisplayConfig as _, DisplayRotation, I2CInterface},
    size::{DisplaySize, DisplaySize128x32, DisplaySize128x64},
    I2CDisplayInterface,
    Ssd1306,
};

use embedded_graphics::geometry::Size;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};
use crate::vframebuf::VarFrameBuf;

use log::{debug, info};

type Panel<SIZE> = Ssd1306<I2CInterface<I2cdev>, SIZE, BufferedGraphicsMode<SIZE>>;

/// SSD1306 display driver wrapper
pub struct Ssd1306Driver {
    /// The underlying ssd1306 driver
    display: Ssd1306Variants,

    /// Framebuffer for drawing operations
    framebuffer: VarFrameBuf<BinaryColor>,

    /// Display capabilities
    capabilities: DisplayCapabilities,
}

/// Enum to handle different SSD1306 display sizes
enum Ssd1306Variants {
    Size128x64(Panel<DisplaySize128x64>),
    Size128x32(Panel<DisplaySize128x32>),
}

/// Dispatch `$body` over whichever panel size is wired
macro_rules! with_panel {
    ($variants:expr, $panel:ident => $body:expr) => {
        match $variants {
            Ssd1306Variants::Size128x64($panel) => $body,
            Ssd1306Variants::Size128x32($panel) => $body,
        }
    };
}

impl Ssd1306Driver {
    /// Create a new SSD1306 driver using I2C
    ///
    /// # Arguments
    ///
    /// * `i2c_bus_path` - Path to I2C device (e.g., "/dev/i2c-1")
    /// * `address` - I2C address (typically 0x3C or 0x3D)
    /// * `config` - Display configuration
    pub fn new_i2c(
        i2c_bus_path: &str,
        address: u8,
        config: &DisplayConfig,
    ) -> Result<Self, DisplayError> {
        info!("Opening SSD1306 on {} at address 0x{:02X}", i2c_bus_path, address);

        let i2c = I2cdev::new(i2c_bus_path)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", i2c_bus_path, e)))?;

        let width = config.width.unwrap_or(128);
        let height = config.height.unwrap_or(64);

        let display = match (width, height) {
            (128, 64) => {
                let interface = I2CDisplayInterface::new_custom_address(i2c, address);
                Ssd1306Variants::Size128x64(
                    Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                        .into_buffered_graphics_mode(),
                )
            }
            (128, 32) => {
                let interface = I2CDisplayInterface::new_custom_address(i2c, address);
                Ssd1306Variants::Size128x32(
                    Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
                        .into_buffered_graphics_mode(),
                )
            }
            _ => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Unsupported SSD1306 size: {}x{}", width, height)
                ));
            }
        };

        Ok(Self {
            display,
            framebuffer: VarFrameBuf::new(width, height, BinaryColor::Off),
            capabilities: DisplayCapabilities::oled(width, height),
        })
    }
}

/// Copy the framebuffer into the controller buffer and push it over I2C
fn push_frame<SIZE: DisplaySize>(
    panel: &mut Panel<SIZE>,
    framebuffer: &VarFrameBuf<BinaryColor>,
) -> Result<(), DisplayError> {
    let w = framebuffer.width();
    for (i, &color) in framebuffer.as_slice().iter().enumerate() {
        panel.set_pixel((i % w) as u32, (i / w) as u32, color.is_on());
    }
    panel.flush()?;
    Ok(())
}

/// Pre-charge period used with every custom contrast
const PRECHARGE: u8 = 1;

/// (pre-charge, contrast) register pair for a 0-255 level, the level is
/// written as is so every step is visible on the panel
fn contrast_registers(value: u8) -> (u8, u8) {
    (PRECHARGE, value)
}

fn contrast(value: u8) -> Brightness {
    let (precharge, level) = contrast_registers(value);
    Brightness::custom(precharge, level)
}

impl DisplayDriver for Ssd1306Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        with_panel!(&mut self.display, panel => panel.init())
            .map_err(|e| DisplayError::InitializationFailed(format!("{:?}", e)))?;
        info!("SSD1306 initialized ({}x{})", self.capabilities.width, self.capabilities.height);
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        debug!("SSD1306 contrast {}", value);
        with_panel!(&mut self.display, panel => panel.set_brightness(contrast(value)))
            .map_err(DisplayError::from)
    }

    fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError> {
        with_panel!(&mut self.display, panel => panel.set_display_on(on))
            .map_err(DisplayError::from)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        with_panel!(&mut self.display, panel => push_frame(panel, &self.framebuffer))
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.framebuffer.clear_color(BinaryColor::Off);
        Ok(())
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        with_panel!(&mut self.display, panel => panel.set_invert(inverted))
            .map_err(DisplayError::from)
    }

    fn set_flip(&mut self, flipped: bool) -> Result<(), DisplayError> {
        let rotation = if flipped { DisplayRotation::Rotate180 } else { DisplayRotation::Rotate0 };
        with_panel!(&mut self.display, panel => panel.set_rotation(rotation))
            .map_err(DisplayError::from)
    }
}

// Provide direct DrawTarget access on the driver itself
impl DrawTarget for Ssd1306Driver {
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

impl OriginDimensions for Ssd1306Driver {
    fn size(&self) -> Size {
        Size::new(self.capabilities.width, self.capabilities.height)
    }
}
