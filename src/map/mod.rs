//! Floor-plan placement of personnel markers.
//!
//! This module provides:
//! - geometry shared by the map pieces (`Point`, `Marker`, `ScrollPosition`)
//! - `MarkerBoard`, the set of markers currently drawn on the plan
//! - the roster parsed from the admin map page
//! - drag panning, marker blinking and the placement controller
//! - a line-oriented event session driving the controller
//! - the HTTP client persisting placements on the server

pub mod blink;
pub mod controller;
pub mod pan;
pub mod remote;
pub mod roster;
pub mod session;

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};

/// Markers are drawn as squares of this size, centered on their point.
pub const MARKER_SIZE: f64 = 24.0;

/// Identifier of a person as published by the roster (`data-user-id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            bail!("person id must not be empty");
        }
        if id.contains('/') {
            bail!("person id `{}` must not contain '/'", id);
        }
        Ok(Self(id))
    }

}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pixel offset from the top-left corner of the floor plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Only finite coordinates survive the `x,y` wire form.
    pub fn try_new(x: f64, y: f64) -> Result<Self> {
        for value in [x, y] {
            if !value.is_finite() {
                bail!("coordinate `{}` is not a finite number", value);
            }
        }
        Ok(Self::new(x, y))
    }
}

/// Wire form used by the server: `"x,y"` with the shortest decimal
/// representation (`100,50`, `100.5,50`).
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("coordinates `{}` are not in `x,y` form", s))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| anyhow!("invalid coordinate `{}` in `{}`", part.trim(), s))
        };
        Point::try_new(parse(x)?, parse(y)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    pub left: f64,
    pub top: f64,
}

impl ScrollPosition {
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Visible part of the floor plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub person: PersonId,
    pub position: Point,
}

impl Marker {
    /// Left edge of the drawn marker.
    pub fn left(&self) -> f64 {
        self.position.x - MARKER_SIZE / 2.0
    }

    /// Top edge of the drawn marker.
    pub fn top(&self) -> f64 {
        self.position.y - MARKER_SIZE / 2.0
    }

    /// Scroll offset that puts this marker in the middle of `viewport`.
    /// Negative offsets are clamped to the plan's edge.
    pub fn centered_in(&self, viewport: Viewport) -> ScrollPosition {
        let left = self.left() - viewport.width / 2.0 + MARKER_SIZE / 2.0;
        let top = self.top() - viewport.height / 2.0 + MARKER_SIZE / 2.0;
        ScrollPosition::new(left.max(0.0), top.max(0.0))
    }
}

/// Markers drawn on the plan, in drawing order. At most one per person.
#[derive(Debug, Clone, Default)]
pub struct MarkerBoard {
    markers: Vec<Marker>,
}

impl MarkerBoard {
    /// Draw a marker for `person`, replacing any marker it already had.
    pub fn place(&mut self, person: PersonId, position: Point) -> &Marker {
        self.remove(&person);
        self.markers.push(Marker { person, position });
        let last = self.markers.len() - 1;
        &self.markers[last]
    }

    pub fn remove(&mut self, person: &PersonId) -> Option<Marker> {
        let index = self.markers.iter().position(|m| &m.person == person)?;
        Some(self.markers.remove(index))
    }

    pub fn get(&self, person: &PersonId) -> Option<&Marker> {
        self.markers.iter().find(|m| &m.person == person)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

/// Pointer shown over the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Plain arrow, shown after a placement ends until the next drag
    Arrow,
    Grab,
    Grabbing,
    Crosshair,
}
