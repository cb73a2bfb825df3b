/*
 *  display/session.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display session - drawing primitives, render plans and overlay effects
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

use core::fmt;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use log::{debug, info};

use crate::config::DisplayConfigSnapshot;
use crate::display::error::DisplayError;
use crate::display::layout::{FontSize, GridLayout};
use crate::display::traits::{DisplayDriver, MonoDisplay};
use crate::message::{DrawOp, RenderPlan};
use crate::overlay::{BrightnessChange, OverlayEffects, OverlayState, Polarity};

fn draw_error<E: fmt::Debug>(err: E) -> DisplayError {
    DisplayError::DrawingError(format!("{:?}", err))
}

/// Sole owner of the panel
///
/// Holds the pen state (color, alignment, font) used by the drawing
/// primitives and tracks the controller state last written, so polarity and
/// power changes are only logged when they actually change.
pub struct DisplaySession<D: MonoDisplay> {
    driver: D,
    grid: GridLayout,
    color: BinaryColor,
    alignment: Alignment,
    font: FontSize,
    polarity: Option<Polarity>,
    powered: bool,
}

impl<D> DisplaySession<D>
where
    D: MonoDisplay,
    <D as DrawTarget>::Error: fmt::Debug,
{
    pub fn new(driver: D) -> Self {
        let grid = GridLayout::for_display(driver.capabilities());
        Self {
            driver,
            grid,
            color: BinaryColor::On,
            alignment: Alignment::Left,
            font: FontSize::default(),
            polarity: None,
            powered: true,
        }
    }

    /// Bring the panel up: init, blank, flip when configured
    pub fn init(&mut self, config: &DisplayConfigSnapshot) -> Result<(), DisplayError> {
        self.driver.init()?;
        self.clear()?;
        if config.flip_enabled {
            self.flip_screen_vertically()?;
        }
        self.display()?;
        info!(
            "Display session ready ({}x{}, {} cols x {} rows)",
            self.grid.width, self.grid.height, self.grid.line_width, self.grid.lines
        );
        Ok(())
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_inner(self) -> D {
        self.driver
    }

    pub fn width(&self) -> u32 {
        self.grid.width
    }

    pub fn height(&self) -> u32 {
        self.grid.height
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Blank the framebuffer, does not flush
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        DisplayDriver::clear(&mut self.driver)
    }

    pub fn set_color(&mut self, color: BinaryColor) {
        self.color = color;
    }

    pub fn set_text_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    pub fn set_font(&mut self, font: FontSize) {
        self.font = font;
    }

    pub fn draw_horizontal_line(&mut self, x: i32, y: i32, width: u32) -> Result<(), DisplayError> {
        if width == 0 {
            return Ok(());
        }
        Line::new(Point::new(x, y), Point::new(x + width as i32 - 1, y))
            .into_styled(PrimitiveStyle::with_stroke(self.color, 1))
            .draw(&mut self.driver)
            .map_err(draw_error)
    }

    /// Erase `area` to black, one horizontal line per row
    pub fn clear_region(&mut self, area: &Rectangle) -> Result<(), DisplayError> {
        let pen = self.color;
        self.set_color(BinaryColor::Off);
        let result = (0..area.size.height as i32).try_for_each(|dy| {
            self.draw_horizontal_line(area.top_left.x, area.top_left.y + dy, area.size.width)
        });
        self.set_color(pen);
        result
    }

    /// Draw `text` with its top edge at `y`, using the current pen
    pub fn draw_string(&mut self, x: i32, y: i32, text: &str) -> Result<(), DisplayError> {
        let character_style = MonoTextStyle::new(self.font.font(), self.color);
        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(Baseline::Top)
            .build();
        Text::with_text_style(text, Point::new(x, y), character_style, text_style)
            .draw(&mut self.driver)
            .map_err(draw_error)?;
        Ok(())
    }

    /// Push the framebuffer to the panel
    pub fn display(&mut self) -> Result<(), DisplayError> {
        self.driver.flush()
    }

    /// Controller contrast 0-255
    pub fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        debug!("contrast -> {}", value);
        self.driver.set_brightness(value)
    }

    pub fn display_off(&mut self) -> Result<(), DisplayError> {
        debug!("panel off");
        self.driver.set_display_on(false)?;
        self.powered = false;
        Ok(())
    }

    pub fn display_on(&mut self) -> Result<(), DisplayError> {
        debug!("panel on");
        self.driver.set_display_on(true)?;
        self.powered = true;
        Ok(())
    }

    pub fn normal_display(&mut self) -> Result<(), DisplayError> {
        self.set_polarity(Polarity::Normal)
    }

    pub fn invert_display(&mut self) -> Result<(), DisplayError> {
        self.set_polarity(Polarity::Inverted)
    }

    pub fn flip_screen_vertically(&mut self) -> Result<(), DisplayError> {
        debug!("panel flipped");
        self.driver.set_flip(true)
    }

    fn set_polarity(&mut self, polarity: Polarity) -> Result<(), DisplayError> {
        self.driver.set_invert(polarity == Polarity::Inverted)?;
        if self.polarity != Some(polarity) {
            debug!("polarity -> {:?}", polarity);
        }
        self.polarity = Some(polarity);
        Ok(())
    }

    /// Run a render plan in order
    pub fn execute(&mut self, plan: &RenderPlan) -> Result<(), DisplayError> {
        for op in plan.ops() {
            match op {
                DrawOp::Clear(area) => self.clear_region(area)?,
                DrawOp::Text { position, text, alignment, font } => {
                    self.set_text_alignment(*alignment);
                    self.set_font(*font);
                    self.draw_string(position.x, position.y, text)?;
                }
                DrawOp::Flush => self.display()?,
            }
        }
        Ok(())
    }

    /// Apply one overlay tick: clock, polarity, then brightness.
    ///
    /// The brightness is only recorded in `state` once the controller accepted it,
    /// so a failed write is retried on the next tick.
    pub fn apply_overlay(
        &mut self,
        effects: &OverlayEffects,
        state: &mut OverlayState,
    ) -> Result<(), DisplayError> {
        // top-left, the right end of row 0 belongs to the message timestamp
        let area = self.grid.clock_area();
        self.clear_region(&area)?;
        self.set_text_alignment(Alignment::Left);
        self.set_font(self.grid.overlay_font);
        self.draw_string(area.top_left.x, area.top_left.y, effects.clock_text.as_str())?;

        match effects.polarity {
            Polarity::Normal => self.normal_display()?,
            Polarity::Inverted => self.invert_display()?,
        }

        if let Some(change) = effects.brightness_change {
            match change {
                BrightnessChange::Off => self.display_off()?,
                BrightnessChange::On { level } => {
                    if !self.powered {
                        self.display_on()?;
                    }
                    self.set_brightness(level)?;
                }
            }
            state.record_applied(effects.brightness_level);
        }

        self.display()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TimePoint;
    use crate::display::drivers::mock::MockDriver;
    use crate::message::MessagePlanner;
    use crate::overlay::OverlayUpdater;

    fn session() -> DisplaySession<MockDriver> {
        DisplaySession::new(MockDriver::new_with_size(128, 64).unwrap())
    }

    fn snapshot(brightness: u8, day_night: bool) -> DisplayConfigSnapshot {
        DisplayConfigSnapshot {
            brightness_level: brightness,
            day_night_enabled: day_night,
            ..Default::default()
        }
    }

    #[test]
    fn test_init_flips_when_configured() {
        let mut s = session();
        let cfg = DisplayConfigSnapshot { flip_enabled: true, ..Default::default() };
        s.init(&cfg).unwrap();

        let state = s.driver().state();
        let state = state.lock().unwrap();
        assert!(state.is_initialized);
        assert_eq!(state.flipped, Some(true));
        assert_eq!(state.flush_count, 1);
    }

    #[test]
    fn test_init_without_flip() {
        let mut s = session();
        s.init(&DisplayConfigSnapshot::default()).unwrap();
        assert_eq!(s.driver().state().lock().unwrap().flipped, None);
    }

    #[test]
    fn test_draw_string_and_clear_region() {
        let mut s = session();
        s.draw_string(0, 16, "HELLO").unwrap();
        let band = s.grid().band(1);
        assert!(s.driver().count_on_pixels_in(&band) > 0);

        s.clear_region(&band).unwrap();
        assert_eq!(s.driver().count_on_pixels_in(&band), 0);

        // pen restored after clearing
        s.draw_horizontal_line(0, 40, 10).unwrap();
        assert_eq!(s.driver().count_on_pixels(), 10);
    }

    #[test]
    fn test_execute_message_plan() {
        let mut s = session();
        let planner = MessagePlanner::new(s.grid().clone());
        let ts = TimePoint::new(14, 2, 9).unwrap();

        s.execute(&planner.plan("ID123:hello world", &ts, "ID123:")).unwrap();

        let grid = s.grid().clone();
        assert!(s.driver().count_on_pixels_in(&grid.band(1)) > 0);
        let stamp = grid.clear_at(Point::new(grid.timestamp_x(), 0));
        assert!(s.driver().count_on_pixels_in(&stamp) > 0);
        assert_eq!(s.driver().state().lock().unwrap().flush_count, 1);
    }

    #[test]
    fn test_shorter_message_overwrites_band() {
        let mut s = session();
        let planner = MessagePlanner::new(s.grid().clone());
        let ts = TimePoint::new(14, 2, 9).unwrap();

        s.execute(&planner.plan("WWWWWWWWWWWWWWW", &ts, "")).unwrap();
        let before = s.driver().count_on_pixels_in(&s.grid().band(1));
        s.execute(&planner.plan("i", &ts, "")).unwrap();
        let after = s.driver().count_on_pixels_in(&s.grid().band(1));
        assert!(after < before);
        assert!(after > 0);
    }

    #[test]
    fn test_prefix_only_message_wipes_first_row() {
        let mut s = session();
        let planner = MessagePlanner::new(s.grid().clone());
        let ts = TimePoint::new(14, 2, 9).unwrap();

        s.execute(&planner.plan("ID:old message", &ts, "ID:")).unwrap();
        let band = s.grid().band(1);
        assert!(s.driver().count_on_pixels_in(&band) > 0);

        s.execute(&planner.plan("ID:", &ts, "ID:")).unwrap();
        assert_eq!(s.driver().count_on_pixels_in(&band), 0);
    }

    #[test]
    fn test_apply_overlay_brightness_and_polarity() {
        let mut s = session();
        let mut state = OverlayState::default();
        let noon = TimePoint::new(12, 0, 0).unwrap();

        let fx = OverlayUpdater::update(&noon, &snapshot(40, true), &state);
        s.apply_overlay(&fx, &mut state).unwrap();

        assert_eq!(state.last_applied_brightness(), 40);
        {
            let shared = s.driver().state();
            let mock = shared.lock().unwrap();
            assert_eq!(mock.brightness_writes, vec![80]);
            assert!(mock.is_inverted());
        }
        assert!(s.driver().count_on_pixels_in(&s.grid().clock_area()) > 0);

        // same config again: polarity rewritten, no brightness write
        let fx = OverlayUpdater::update(&noon, &snapshot(40, true), &state);
        s.apply_overlay(&fx, &mut state).unwrap();
        let shared = s.driver().state();
        let mock = shared.lock().unwrap();
        assert_eq!(mock.brightness_writes.len(), 1);
        assert_eq!(mock.invert_writes, vec![true, true]);
    }

    #[test]
    fn test_apply_overlay_off_then_on() {
        let mut s = session();
        let mut state = OverlayState::default();
        let night = TimePoint::new(22, 0, 0).unwrap();

        let fx = OverlayUpdater::update(&night, &snapshot(0, true), &state);
        s.apply_overlay(&fx, &mut state).unwrap();
        assert!(!s.is_powered());
        assert_eq!(state.last_applied_brightness(), 0);

        let fx = OverlayUpdater::update(&night, &snapshot(25, true), &state);
        s.apply_overlay(&fx, &mut state).unwrap();
        assert!(s.is_powered());

        let shared = s.driver().state();
        let mock = shared.lock().unwrap();
        assert_eq!(mock.power_writes, vec![false, true]);
        assert_eq!(mock.last_brightness(), Some(50));
        assert!(!mock.is_inverted());
    }

    #[test]
    fn test_failed_brightness_not_recorded() {
        let mut s = session();
        s.driver().state().lock().unwrap().simulate_brightness_failure = true;
        let mut state = OverlayState::default();

        let fx = OverlayUpdater::update(&TimePoint::new(9, 0, 0).unwrap(), &snapshot(10, false), &state);
        assert!(matches!(s.apply_overlay(&fx, &mut state), Err(DisplayError::InterfaceError(_))));
        assert_eq!(state.last_applied_brightness(), 100);
    }
}
