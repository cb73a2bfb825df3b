/*
 *  display/mod.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - driver abstraction, text grid and the display session
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

// Core trait definitions
pub mod traits;
pub mod error;

// Text grid geometry
pub mod layout;

// Owned display session
pub mod session;

// Display drivers (ssd1306 conditionally compiled)
pub mod drivers;

// Re-exports for convenience
pub use traits::{DisplayCapabilities, DisplayDriver, MonoDisplay};
pub use error::DisplayError;
pub use layout::{FontSize, GridLayout};
pub use session::DisplaySession;
pub use drivers::mock::MockDriver;

#[cfg(feature = "driver-ssd1306")]
pub use drivers::ssd1306::Ssd1306Driver;
