//! Line-oriented events for driving the placement controller from a terminal.

use anyhow::{anyhow, bail, Result};

use crate::map::pan::MouseButton;
use crate::map::{PersonId, Point};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// "Place" pressed for a person; the name defaults to the roster's
    Place { person: PersonId, name: Option<String> },
    Cancel,
    Click(Point),
    MouseDown(MouseButton, Point),
    /// Pointer moved; `held` tells whether the primary button is down
    MouseMove { held: bool, pointer: Point },
    MouseUp,
    Find(PersonId),
    Remove(PersonId),
    Search(String),
    Markers,
    State,
    Quit,
}

impl SessionEvent {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let event = match verb {
            "place" => {
                let (id, name) = rest.split_once(' ').unwrap_or((rest, ""));
                let name = name.trim();
                SessionEvent::Place {
                    person: PersonId::new(id)?,
                    name: (!name.is_empty()).then(|| name.to_string()),
                }
            }
            "cancel" => SessionEvent::Cancel,
            "click" => SessionEvent::Click(point(rest)?),
            "down" => SessionEvent::MouseDown(MouseButton::Primary, point(rest)?),
            "rdown" => SessionEvent::MouseDown(MouseButton::Other, point(rest)?),
            "move" => SessionEvent::MouseMove {
                held: true,
                pointer: point(rest)?,
            },
            "hover" => SessionEvent::MouseMove {
                held: false,
                pointer: point(rest)?,
            },
            "up" => SessionEvent::MouseUp,
            "find" => SessionEvent::Find(PersonId::new(rest)?),
            "remove" => SessionEvent::Remove(PersonId::new(rest)?),
            "search" => SessionEvent::Search(rest.to_string()),
            "markers" => SessionEvent::Markers,
            "state" => SessionEvent::State,
            "quit" | "q" => SessionEvent::Quit,
            other => bail!("unknown command `{}`", other),
        };
        Ok(Some(event))
    }
}

/// `X Y` or `X,Y`.
fn point(args: &str) -> Result<Point> {
    let normalized = args.replace(',', " ");
    let mut parts = normalized.split_whitespace();
    let mut next = |axis: &str| {
        parts
            .next()
            .ok_or_else(|| anyhow!("missing {} coordinate", axis))?
            .parse::<f64>()
            .map_err(|_| anyhow!("invalid {} coordinate in `{}`", axis, args))
    };
    let x = next("x")?;
    let y = next("y")?;
    Point::try_new(x, y)
}
