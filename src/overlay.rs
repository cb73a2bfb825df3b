/*
 *  overlay.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Status overlay - clock text, day/night polarity and brightness changes
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

use arrayvec::ArrayString;
use log::{debug, warn};

use crate::clock::{TimePoint, TimeSource};
use crate::config::DisplayConfigSnapshot;
use crate::constants::{BRIGHTNESS_HW_SCALE, DAY_END_HOUR, DAY_START_HOUR, DEFAULT_BRIGHTNESS};

/// Pixel polarity of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// White on black
    #[default]
    Normal,
    /// Black on white
    Inverted,
}

/// Panel power requested by a brightness change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    On,
    Off,
}

/// Hardware write needed to follow a new brightness setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessChange {
    /// Brightness 0 switches the panel off
    Off,
    /// Panel on at this contrast (already scaled for the controller)
    On { level: u8 },
}

impl BrightnessChange {
    pub fn power(&self) -> Power {
        match self {
            BrightnessChange::Off => Power::Off,
            BrightnessChange::On { .. } => Power::On,
        }
    }

    /// Controller contrast, `None` when switching off
    pub fn level(&self) -> Option<u8> {
        match self {
            BrightnessChange::Off => None,
            BrightnessChange::On { level } => Some(*level),
        }
    }
}

/// Everything one overlay tick wants done to the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayEffects {
    /// `HH:MM:SS`
    pub clock_text: ArrayString<8>,

    pub polarity: Polarity,

    /// `Some` only when the configured brightness differs from the applied one
    pub brightness_change: Option<BrightnessChange>,

    /// Logical 0-100 level the change came from, to record once applied
    pub brightness_level: u8,
}

/// Hysteresis state that outlives a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayState {
    last_applied_brightness: u8,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self { last_applied_brightness: DEFAULT_BRIGHTNESS }
    }
}

impl OverlayState {
    pub fn new(last_applied_brightness: u8) -> Self {
        Self { last_applied_brightness }
    }

    pub fn last_applied_brightness(&self) -> u8 {
        self.last_applied_brightness
    }

    /// Record a brightness that has been written to the panel
    pub fn record_applied(&mut self, brightness_level: u8) {
        self.last_applied_brightness = brightness_level;
    }
}

/// Day/night rule: inverted from 06:00 through 18:59 when enabled
pub fn polarity_for(hour: u32, day_night_enabled: bool) -> Polarity {
    if !day_night_enabled {
        return Polarity::Normal;
    }
    if hour < DAY_START_HOUR || hour > DAY_END_HOUR {
        Polarity::Normal
    } else {
        Polarity::Inverted
    }
}

/// Brightness write needed to move from `last_applied` to `configured`
pub fn brightness_change(configured: u8, last_applied: u8) -> Option<BrightnessChange> {
    if configured == last_applied {
        return None;
    }
    if configured == 0 {
        Some(BrightnessChange::Off)
    } else {
        Some(BrightnessChange::On { level: configured.saturating_mul(BRIGHTNESS_HW_SCALE) })
    }
}

/// Pure overlay computation; the display session applies the result
pub struct OverlayUpdater;

impl OverlayUpdater {
    pub fn update(
        now: &TimePoint,
        config: &DisplayConfigSnapshot,
        state: &OverlayState,
    ) -> OverlayEffects {
        OverlayEffects {
            clock_text: now.hms(),
            polarity: polarity_for(now.hour, config.day_night_enabled),
            brightness_change: brightness_change(config.brightness_level, state.last_applied_brightness),
            brightness_level: config.brightness_level,
        }
    }

    /// Read the clock and compute this tick's effects.
    ///
    /// Returns `None` when the clock cannot be read; the tick is skipped
    /// and nothing is drawn.
    pub fn tick<C: TimeSource>(
        clock: &C,
        config: &DisplayConfigSnapshot,
        state: &OverlayState,
    ) -> Option<OverlayEffects> {
        match clock.now() {
            Ok(now) => {
                let effects = Self::update(&now, config, state);
                if let Some(change) = effects.brightness_change {
                    debug!(
                        "brightness {} -> {} ({:?})",
                        state.last_applied_brightness, config.brightness_level, change
                    );
                }
                Some(effects)
            }
            Err(e) => {
                warn!("Failed to obtain time, overlay skipped: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn at(hour: u32) -> TimePoint {
        TimePoint::new(hour, 30, 15).unwrap()
    }

    fn config(brightness: u8, day_night: bool) -> DisplayConfigSnapshot {
        DisplayConfigSnapshot {
            brightness_level: brightness,
            day_night_enabled: day_night,
            ..Default::default()
        }
    }

    #[test]
    fn test_clock_text() {
        let fx = OverlayUpdater::update(&TimePoint::new(9, 5, 7).unwrap(), &config(100, false), &OverlayState::default());
        assert_eq!(fx.clock_text.as_str(), "09:05:07");
    }

    #[test]
    fn test_day_night_boundaries() {
        let state = OverlayState::default();
        let cfg = config(100, true);
        let polarity = |h| OverlayUpdater::update(&at(h), &cfg, &state).polarity;

        assert_eq!(polarity(12), Polarity::Inverted);
        assert_eq!(polarity(19), Polarity::Normal);
        assert_eq!(polarity(6), Polarity::Inverted);
        assert_eq!(polarity(5), Polarity::Normal);
        assert_eq!(polarity(18), Polarity::Inverted);
        assert_eq!(polarity(0), Polarity::Normal);
        assert_eq!(polarity(23), Polarity::Normal);
    }

    #[test]
    fn test_day_night_disabled_is_normal() {
        for hour in 0..24 {
            assert_eq!(polarity_for(hour, false), Polarity::Normal);
        }
    }

    #[test]
    fn test_brightness_unchanged() {
        let fx = OverlayUpdater::update(&at(12), &config(100, false), &OverlayState::default());
        assert_eq!(fx.brightness_change, None);
    }

    #[test]
    fn test_brightness_off() {
        let fx = OverlayUpdater::update(&at(12), &config(0, false), &OverlayState::default());
        assert_eq!(fx.brightness_change, Some(BrightnessChange::Off));
        assert_eq!(fx.brightness_change.map(|c| c.power()), Some(Power::Off));
        assert_eq!(fx.brightness_change.and_then(|c| c.level()), None);
    }

    #[test]
    fn test_brightness_doubled() {
        let fx = OverlayUpdater::update(&at(12), &config(50, false), &OverlayState::new(80));
        assert_eq!(fx.brightness_change, Some(BrightnessChange::On { level: 100 }));
        assert_eq!(fx.brightness_change.map(|c| c.power()), Some(Power::On));
        assert_eq!(fx.brightness_level, 50);
    }

    #[test]
    fn test_second_update_is_idempotent() {
        let mut state = OverlayState::default();
        let cfg = config(30, false);

        let first = OverlayUpdater::update(&at(8), &cfg, &state);
        assert!(first.brightness_change.is_some());
        state.record_applied(first.brightness_level);

        let second = OverlayUpdater::update(&at(8), &cfg, &state);
        assert_eq!(second.brightness_change, None);
        assert_eq!(state.last_applied_brightness(), 30);
    }

    #[test]
    fn test_update_does_not_touch_state() {
        let state = OverlayState::default();
        let _ = OverlayUpdater::update(&at(8), &config(10, true), &state);
        assert_eq!(state, OverlayState::default());
    }

    #[test]
    fn test_tick_skips_without_clock() {
        let state = OverlayState::default();
        assert!(OverlayUpdater::tick(&FixedClock(None), &config(10, true), &state).is_none());

        let fx = OverlayUpdater::tick(&FixedClock(Some(at(7))), &config(10, true), &state).unwrap();
        assert_eq!(fx.polarity, Polarity::Inverted);
        assert_eq!(fx.brightness_change, Some(BrightnessChange::On { level: 20 }));
    }
}
