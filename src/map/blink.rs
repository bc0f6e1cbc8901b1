//! Blink animation for a found marker.
//!
//! A repeating timer fires every [`BLINK_INTERVAL`]; each tick hides the
//! marker and shows it again [`BLINK_HIDDEN`] later. The timer is cancelled
//! once [`BLINK_CYCLES`] cycles have completed, so the animation always ends
//! with the marker visible.

use std::time::Duration;

use tokio::time::{self, Instant};

pub const BLINK_INTERVAL: Duration = Duration::from_millis(400);
pub const BLINK_HIDDEN: Duration = Duration::from_millis(200);
pub const BLINK_CYCLES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Shown,
}

/// A visibility change, `at` measured from the start of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkFrame {
    pub at: Duration,
    pub visibility: Visibility,
}

pub fn schedule() -> Vec<BlinkFrame> {
    let mut frames = Vec::with_capacity(BLINK_CYCLES as usize * 2);
    for cycle in 1..=BLINK_CYCLES {
        let tick = BLINK_INTERVAL * cycle;
        frames.push(BlinkFrame {
            at: tick,
            visibility: Visibility::Hidden,
        });
        frames.push(BlinkFrame {
            at: tick + BLINK_HIDDEN,
            visibility: Visibility::Shown,
        });
    }
    frames
}

/// Run the animation in real time, handing every frame to `on_frame` as it
/// is due. Returns once the last cycle has shown the marker again; the
/// interval is dropped at that point.
pub async fn play(mut on_frame: impl FnMut(BlinkFrame)) {
    let mut ticker = time::interval_at(Instant::now() + BLINK_INTERVAL, BLINK_INTERVAL);
    for cycle in 1..=BLINK_CYCLES {
        ticker.tick().await;
        let tick = BLINK_INTERVAL * cycle;
        on_frame(BlinkFrame {
            at: tick,
            visibility: Visibility::Hidden,
        });
        time::sleep(BLINK_HIDDEN).await;
        on_frame(BlinkFrame {
            at: tick + BLINK_HIDDEN,
            visibility: Visibility::Shown,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_frames() {
        let frames: Vec<_> = schedule()
            .into_iter()
            .map(|f| (f.at.as_millis(), f.visibility))
            .collect();
        assert_eq!(
            frames,
            vec![
                (400, Visibility::Hidden),
                (600, Visibility::Shown),
                (800, Visibility::Hidden),
                (1000, Visibility::Shown),
                (1200, Visibility::Hidden),
                (1400, Visibility::Shown),
            ]
        );
    }

    #[test]
    fn test_schedule_terminates_visible() {
        let frames = schedule();
        assert_eq!(frames.len(), 6);
        assert_eq!(frames.last().unwrap().visibility, Visibility::Shown);
        assert_eq!(frames.last().unwrap().at, BLINK_INTERVAL * BLINK_CYCLES + BLINK_HIDDEN);
    }

    #[tokio::test]
    async fn test_play_follows_schedule_and_stops() {
        let started = std::time::Instant::now();
        let mut played = Vec::new();
        play(|frame| played.push((frame, started.elapsed()))).await;
        let total = started.elapsed();

        let frames: Vec<_> = played.iter().map(|(frame, _)| *frame).collect();
        assert_eq!(frames, schedule());
        for (frame, elapsed) in &played {
            assert!(*elapsed >= frame.at, "{frame:?} played early at {elapsed:?}");
        }
        assert!(total >= BLINK_INTERVAL * BLINK_CYCLES + BLINK_HIDDEN);
    }
}
