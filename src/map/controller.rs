//! Placement controller for the admin floor plan.
//!
//! The controller owns everything the page script used to keep in the DOM:
//! the placement mode, the drawn markers, the roster and the map's scroll
//! position. Handlers run to completion one at a time; the only suspension
//! point is the server round-trip, and the mode is settled before it.

use tracing::{error, info};

use crate::map::blink::{self, BlinkFrame};
use crate::map::pan::{DragPan, MouseButton};
use crate::map::remote::{ApiResponse, MapError, MapRemote};
use crate::map::roster::{self, RosterEntry};
use crate::map::{Cursor, Marker, MarkerBoard, PersonId, Point, ScrollPosition, Viewport};
use crate::notify::{NoticeLevel, Notifier};

pub const MSG_SAVED: &str = "Координаты сохранены";
pub const MSG_SAVE_FAILED: &str = "Ошибка сохранения";
pub const MSG_REMOVED: &str = "Пользователь удален с карты";
pub const MSG_REMOVE_FAILED: &str = "Ошибка удаления";
pub const MSG_UNKNOWN_ERROR: &str = "Unknown error";
pub const CONFIRM_REMOVE: &str = "Убрать пользователя с карты?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementMode {
    Idle,
    Placing { person: PersonId, name: String },
}

/// What a click on the plan led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not in placement mode; the click did nothing.
    Ignored,
    Saved,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FindOutcome {
    pub scroll: ScrollPosition,
    pub blink: Vec<BlinkFrame>,
}

pub struct MapController<R, N> {
    remote: R,
    notifier: N,
    roster: Vec<RosterEntry>,
    board: MarkerBoard,
    mode: PlacementMode,
    pan: DragPan,
    scroll: ScrollPosition,
}

impl<R: MapRemote, N: Notifier> MapController<R, N> {
    /// Draws a marker for every roster entry that is already placed.
    pub fn new(remote: R, notifier: N, roster: Vec<RosterEntry>) -> Self {
        let mut board = MarkerBoard::default();
        for entry in &roster {
            if let Some(point) = entry.coordinates {
                board.place(entry.id.clone(), point);
            }
        }
        Self {
            remote,
            notifier,
            roster,
            board,
            mode: PlacementMode::Idle,
            pan: DragPan::default(),
            scroll: ScrollPosition::default(),
        }
    }

    pub fn mode(&self) -> &PlacementMode {
        &self.mode
    }

    pub fn is_placing(&self) -> bool {
        matches!(self.mode, PlacementMode::Placing { .. })
    }

    pub fn markers(&self) -> &[Marker] {
        self.board.markers()
    }

    pub fn marker(&self, person: &PersonId) -> Option<&Marker> {
        self.board.get(person)
    }

    pub fn roster_entry(&self, person: &PersonId) -> Option<&RosterEntry> {
        self.roster.iter().find(|entry| &entry.id == person)
    }

    /// Roster entries whose name, title or department contain `text`.
    pub fn search_roster(&self, text: &str) -> Vec<&RosterEntry> {
        roster::search(&self.roster, text)
    }

    pub fn scroll(&self) -> ScrollPosition {
        self.scroll
    }

    pub fn cursor(&self) -> Cursor {
        self.pan.cursor(self.is_placing())
    }

    #[cfg(test)]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// "Place" was chosen for `person`; the next click on the plan positions
    /// them. Choosing another person replaces the pending one.
    pub fn begin_placement(&mut self, person: PersonId, name: impl Into<String>) {
        let name = name.into();
        info!("placement mode for {} ({})", person, name);
        self.notifier.notify(
            NoticeLevel::Info,
            &format!("Режим размещения: {}. Кликните на карте", name),
        );
        self.mode = PlacementMode::Placing { person, name };
    }

    pub fn cancel_placement(&mut self) {
        if self.is_placing() {
            self.pan.placement_ended();
        }
        self.mode = PlacementMode::Idle;
    }

    /// Click on the plan at `point` (relative to the plan's top-left corner).
    pub async fn click_map(&mut self, point: Point) -> ClickOutcome {
        let PlacementMode::Placing { person, .. } =
            std::mem::replace(&mut self.mode, PlacementMode::Idle)
        else {
            return ClickOutcome::Ignored;
        };
        self.pan.placement_ended();

        match self.remote.save_coordinates(&person, point).await {
            Ok(ApiResponse { success: true, .. }) => {
                self.set_coordinates(&person, Some(point));
                self.notifier.notify(NoticeLevel::Success, MSG_SAVED);
                ClickOutcome::Saved
            }
            Ok(ApiResponse { message, .. }) => {
                let message = message.unwrap_or_else(|| MSG_UNKNOWN_ERROR.to_string());
                error!("saving coordinates of {} rejected: {}", person, message);
                self.notifier
                    .notify(NoticeLevel::Error, &format!("{}: {}", MSG_SAVE_FAILED, message));
                ClickOutcome::Failed
            }
            Err(err) => {
                self.report(&person, err);
                ClickOutcome::Failed
            }
        }
    }

    /// Take `person` off the map. Returns true when the server agreed.
    pub async fn remove(&mut self, person: &PersonId) -> bool {
        match self.remote.remove_placement(person).await {
            Ok(ApiResponse { success: true, .. }) => {
                self.set_coordinates(person, None);
                self.notifier.notify(NoticeLevel::Success, MSG_REMOVED);
                true
            }
            Ok(ApiResponse { message, .. }) => {
                error!(
                    "removing {} rejected: {}",
                    person,
                    message.as_deref().unwrap_or(MSG_UNKNOWN_ERROR)
                );
                self.notifier.notify(NoticeLevel::Error, MSG_REMOVE_FAILED);
                false
            }
            Err(err) => {
                self.report(person, err);
                false
            }
        }
    }

    /// Scroll position centering `person`'s marker and the blink to play on
    /// it; `None` when the person is not on the map.
    pub fn find(&mut self, person: &PersonId, viewport: Viewport) -> Option<FindOutcome> {
        let scroll = self.board.get(person)?.centered_in(viewport);
        self.scroll = scroll;
        Some(FindOutcome {
            scroll,
            blink: blink::schedule(),
        })
    }

    pub fn mouse_down(&mut self, button: MouseButton, pointer: Point) -> bool {
        let placing = self.is_placing();
        self.pan.mouse_down(button, pointer, self.scroll, placing)
    }

    pub fn mouse_move(&mut self, primary_held: bool, pointer: Point) -> Option<ScrollPosition> {
        let placing = self.is_placing();
        let scroll = self.pan.mouse_move(primary_held, pointer, placing)?;
        self.scroll = scroll;
        Some(scroll)
    }

    pub fn mouse_up(&mut self) {
        self.pan.mouse_up();
    }

    fn set_coordinates(&mut self, person: &PersonId, coordinates: Option<Point>) {
        match coordinates {
            Some(point) => {
                self.board.place(person.clone(), point);
            }
            None => {
                self.board.remove(person);
            }
        }
        if let Some(entry) = self.roster.iter_mut().find(|entry| &entry.id == person) {
            entry.coordinates = coordinates;
        }
    }

    fn report(&mut self, person: &PersonId, err: MapError) {
        error!("map request for {} failed: {}", person, err);
        self.notifier
            .notify(NoticeLevel::Error, &format!("Ошибка: {}", err));
    }
}
