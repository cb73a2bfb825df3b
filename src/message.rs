/*
 *  message.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Message viewer - prefix filter, timestamp row and wrapped text rows
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

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::Alignment;
use log::debug;

use crate::clock::TimePoint;
use crate::constants::{MESSAGE_START_LINE, NO_MESSAGES_TEXT};
use crate::display::layout::{FontSize, GridLayout};
use crate::wrap;

/// A received transmission, consumed as soon as it is laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePayload {
    pub text: String,
    pub timestamp: TimePoint,
    /// Overrides the configured user id when set
    pub sender_prefix: Option<String>,
}

impl MessagePayload {
    pub fn new(text: impl Into<String>, timestamp: TimePoint) -> Self {
        Self { text: text.into(), timestamp, sender_prefix: None }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sender_prefix = Some(prefix.into());
        self
    }
}

/// One step of a render plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    /// Erase a region to black
    Clear(Rectangle),

    /// Draw text with its top edge at `position.y`
    Text {
        position: Point,
        text: String,
        alignment: Alignment,
        font: FontSize,
    },

    /// Push the framebuffer to the panel
    Flush,
}

/// Ordered draw operations; every `Text` is preceded by a `Clear` covering it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPlan {
    ops: Vec<DrawOp>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Texts in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn clear(&mut self, area: Rectangle) {
        self.ops.push(DrawOp::Clear(area));
    }

    fn text(&mut self, position: Point, text: &str, alignment: Alignment, font: FontSize) {
        self.ops.push(DrawOp::Text { position, text: text.to_string(), alignment, font });
    }

    fn flush(&mut self) {
        self.ops.push(DrawOp::Flush);
    }
}

/// Lays messages out on the fixed text grid
#[derive(Debug, Clone)]
pub struct MessagePlanner {
    grid: GridLayout,
}

impl MessagePlanner {
    pub fn new(grid: GridLayout) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    /// Plan the screen for a received message.
    ///
    /// * empty `message` - the "(NO MESSAGES)" placeholder, no timestamp
    /// * `message` without `sender_prefix` - empty plan, the message is dropped
    /// * otherwise - timestamp right-aligned on row 0 and the text after the
    ///   prefix wrapped from row 1 down
    pub fn plan(&self, message: &str, timestamp: &TimePoint, sender_prefix: &str) -> RenderPlan {
        if message.is_empty() {
            return self.plan_no_messages();
        }

        let Some(body) = message.strip_prefix(sender_prefix) else {
            debug!("message dropped, sender prefix {:?} not present", sender_prefix);
            return RenderPlan::default();
        };

        let mut plan = RenderPlan::default();
        self.push_timestamp(&mut plan, timestamp);

        let rows = wrap::layout(body, MESSAGE_START_LINE, self.grid.lines, self.grid.line_width);
        if rows.is_empty() {
            // nothing to draw, still wipe the previous message's first row
            plan.clear(self.grid.band(MESSAGE_START_LINE));
        }
        for chunk in &rows {
            plan.clear(self.grid.band(chunk.line));
            plan.text(self.grid.line_origin(chunk.line), chunk.text, Alignment::Left, self.grid.text_font);
        }

        plan.flush();
        plan
    }

    /// Plan for a payload, using `default_prefix` unless the payload brings its own
    pub fn plan_payload(&self, payload: &MessagePayload, default_prefix: &str) -> RenderPlan {
        let prefix = payload.sender_prefix.as_deref().unwrap_or(default_prefix);
        self.plan(&payload.text, &payload.timestamp, prefix)
    }

    /// "(NO MESSAGES)" on its fixed row
    pub fn plan_no_messages(&self) -> RenderPlan {
        let mut plan = RenderPlan::default();
        let origin = Point::new(0, self.grid.no_messages_y);
        plan.clear(self.grid.clear_at(origin));
        plan.text(origin, NO_MESSAGES_TEXT, Alignment::Left, self.grid.text_font);
        plan.flush();
        plan
    }

    /// Current time at the top-left of row 0
    pub fn plan_current_time(&self, now: &TimePoint) -> RenderPlan {
        let mut plan = RenderPlan::default();
        let origin = Point::zero();
        plan.clear(self.grid.clear_at(origin));
        plan.text(origin, now.hms().as_str(), Alignment::Left, self.grid.text_font);
        plan.flush();
        plan
    }

    fn push_timestamp(&self, plan: &mut RenderPlan, timestamp: &TimePoint) {
        plan.clear(self.grid.clear_at(Point::new(self.grid.timestamp_x(), 0)));
        plan.text(
            Point::new(self.grid.timestamp_anchor_x(), 0),
            timestamp.hms().as_str(),
            Alignment::Right,
            self.grid.text_font,
        );
    }
}
