// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/crop/selection.rs
//
// Drag-to-select gesture state machine in display space.

use crate::constant::MIN_SELECTION_SIZE;
use crate::domain::viewport::{Point, Rect};

/// Raw pointer input relative to the display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    /// Pointer left the surface or the gesture was aborted.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        origin: Point,
        candidate: Option<Rect>,
    },
}

/// What a single event produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutput {
    /// Nothing to report.
    None,
    /// In-progress rectangle for the renderer; not a commit.
    Candidate(Rect),
    /// Released above the size threshold.
    Committed(Rect),
    /// Released too small, or cancelled.
    Discarded,
}

/// Pure transition: next state plus what to report.
pub fn transition(state: DragState, event: PointerEvent, min_size: f32) -> (DragState, GestureOutput) {
    match (state, event) {
        // A second press restarts from the new origin.
        (_, PointerEvent::Down(origin)) => (
            DragState::Dragging {
                origin,
                candidate: None,
            },
            GestureOutput::None,
        ),
        (DragState::Dragging { origin, .. }, PointerEvent::Move(pos)) => {
            let rect = Rect::from_corners(origin, pos);
            (
                DragState::Dragging {
                    origin,
                    candidate: Some(rect),
                },
                GestureOutput::Candidate(rect),
            )
        }
        (DragState::Dragging { candidate, .. }, PointerEvent::Up) => match candidate {
            Some(rect) if rect.exceeds(min_size) => (DragState::Idle, GestureOutput::Committed(rect)),
            _ => (DragState::Idle, GestureOutput::Discarded),
        },
        (DragState::Dragging { .. }, PointerEvent::Cancel) => {
            (DragState::Idle, GestureOutput::Discarded)
        }
        (DragState::Idle, _) => (DragState::Idle, GestureOutput::None),
    }
}

/// Selection gesture tracker for one canvas.
///
/// Holds only transient drag state plus the rectangle currently drawn on the
/// overlay. Commits are reported to the caller, which owns the accepted
/// selection.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    state: DragState,
    overlay: Option<Rect>,
    interactive: bool,
    min_size: f32,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(true, MIN_SELECTION_SIZE)
    }
}

impl GestureTracker {
    pub fn new(interactive: bool, min_size: f32) -> Self {
        Self {
            state: DragState::Idle,
            overlay: None,
            interactive,
            min_size,
        }
    }

    /// Tracker that ignores every event.
    pub fn non_interactive() -> Self {
        Self::new(false, MIN_SELECTION_SIZE)
    }

    pub fn handle(&mut self, event: PointerEvent) -> GestureOutput {
        if !self.interactive {
            return GestureOutput::None;
        }

        if matches!(event, PointerEvent::Down(_)) {
            self.overlay = None;
        }

        let (next, output) = transition(self.state, event, self.min_size);
        self.state = next;

        match output {
            GestureOutput::Candidate(rect) | GestureOutput::Committed(rect) => {
                self.overlay = Some(rect);
            }
            GestureOutput::Discarded => self.overlay = None,
            GestureOutput::None => {}
        }
        output
    }

    /// Drop drag state and overlay, e.g. when the image underneath changes.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.overlay = None;
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Rectangle the renderer should draw: the live candidate or the last commit.
    pub fn overlay(&self) -> Option<Rect> {
        self.overlay
    }
}
