//! # Drag-and-Drop Controller
//!
//! Turns pointer gestures on the widget palette into drops.
//!
//! ```text
//!            pointer_down(widget)          moved > threshold
//!   Idle ─────────────────────────▶ Pressed ─────────────────▶ Dragging
//!    ▲                                 │                          │
//!    └──────────── pointer_up ─────────┴──────── pointer_up ──────┘
//! ```
//!
//! Only one drag can be in flight. A press while already dragging is ignored.
//! Dragging elements that are already on the canvas is not supported.

use marble_model::{find_widget, Widget};
use serde::{Deserialize, Serialize};

/// Default activation distance in CSS pixels
pub const DEFAULT_DRAG_THRESHOLD: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// What the pointer went down on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum DragSource {
    /// Palette entry, by kind tag
    Widget(String),
    /// Element already on the canvas
    Element(String),
}

/// Where the pointer was released
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DropTarget {
    /// Canvas drop surface
    Canvas,
    /// A column slot of a section or container
    #[serde(rename_all = "camelCase")]
    Column {
        section_id: String,
        column_index: usize,
    },
    /// Anywhere else
    Outside,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    /// Pointer is down on a widget but has not moved far enough yet
    Pressed {
        widget: &'static Widget,
        origin: Point,
    },
    /// Widget is being carried; a proxy follows `position`
    Dragging {
        widget: &'static Widget,
        position: Point,
    },
}

impl DragState {
    pub fn phase(&self) -> &'static str {
        match self {
            DragState::Idle => "idle",
            DragState::Pressed { .. } => "pressed",
            DragState::Dragging { .. } => "dragging",
        }
    }
}

/// Result of releasing the pointer
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// A widget was released over a drop target; the caller creates the element
    Dropped {
        widget: &'static Widget,
        target: DropTarget,
    },
    /// Released outside any drop target
    Discarded,
    /// Released before the threshold was crossed, or with no press at all
    NoDrag,
}

#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    threshold: f64,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

impl DragController {
    pub fn new(threshold: f64) -> Self {
        Self {
            state: DragState::Idle,
            threshold: threshold.max(0.0),
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Widget currently carried, for drawing the drag proxy
    pub fn carried(&self) -> Option<&'static Widget> {
        match self.state {
            DragState::Dragging { widget, .. } => Some(widget),
            _ => None,
        }
    }

    pub fn proxy_position(&self) -> Option<Point> {
        match self.state {
            DragState::Dragging { position, .. } => Some(position),
            _ => None,
        }
    }

    /// Arm a press. Returns false when the press is ignored.
    pub fn pointer_down(&mut self, source: &DragSource, at: Point) -> bool {
        if self.is_dragging() {
            tracing::warn!(?source, "drag already in progress, ignoring new drag start");
            return false;
        }
        let tag = match source {
            DragSource::Widget(tag) => tag,
            DragSource::Element(id) => {
                tracing::warn!(id = %id, "moving existing elements is not supported");
                return false;
            }
        };
        let Some(widget) = find_widget(tag) else {
            tracing::warn!(tag = %tag, "no palette widget for drag source");
            return false;
        };
        self.state = DragState::Pressed { widget, origin: at };
        true
    }

    /// Track pointer movement. Returns true while a drag is active.
    pub fn pointer_move(&mut self, to: Point) -> bool {
        match self.state {
            DragState::Pressed { widget, origin } => {
                if origin.distance(&to) > self.threshold {
                    tracing::debug!(widget = %widget.kind, "drag started");
                    self.state = DragState::Dragging {
                        widget,
                        position: to,
                    };
                    true
                } else {
                    false
                }
            }
            DragState::Dragging { widget, .. } => {
                self.state = DragState::Dragging {
                    widget,
                    position: to,
                };
                true
            }
            DragState::Idle => false,
        }
    }

    /// Release the pointer and return to Idle
    pub fn pointer_up(&mut self, target: DropTarget) -> DropOutcome {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Dragging { widget, .. } => match target {
                DropTarget::Outside => {
                    tracing::debug!(widget = %widget.kind, "dropped outside, discarding");
                    DropOutcome::Discarded
                }
                target => DropOutcome::Dropped { widget, target },
            },
            DragState::Pressed { .. } | DragState::Idle => DropOutcome::NoDrag,
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(tag: &str) -> DragSource {
        DragSource::Widget(tag.to_string())
    }

    #[test]
    fn test_threshold_must_be_crossed() {
        let mut drag = DragController::default();
        assert!(drag.pointer_down(&widget("text"), Point::new(0.0, 0.0)));
        assert!(!drag.pointer_move(Point::new(6.0, 5.0)));
        assert_eq!(drag.state().phase(), "pressed");
        assert_eq!(drag.pointer_up(DropTarget::Canvas), DropOutcome::NoDrag);
        assert_eq!(drag.state().phase(), "idle");
    }

    #[test]
    fn test_drop_on_canvas() {
        let mut drag = DragController::default();
        drag.pointer_down(&widget("section"), Point::new(0.0, 0.0));
        assert!(drag.pointer_move(Point::new(9.0, 0.0)));
        assert_eq!(drag.carried().map(|w| w.label), Some("Section"));

        match drag.pointer_up(DropTarget::Canvas) {
            DropOutcome::Dropped { widget, target } => {
                assert_eq!(widget.kind.as_str(), "section");
                assert_eq!(target, DropTarget::Canvas);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_drop_outside_is_discarded() {
        let mut drag = DragController::default();
        drag.pointer_down(&widget("quote"), Point::default());
        drag.pointer_move(Point::new(20.0, 20.0));
        assert_eq!(drag.pointer_up(DropTarget::Outside), DropOutcome::Discarded);
    }

    #[test]
    fn test_second_drag_start_ignored() {
        let mut drag = DragController::default();
        drag.pointer_down(&widget("quote"), Point::default());
        drag.pointer_move(Point::new(20.0, 0.0));

        assert!(!drag.pointer_down(&widget("image"), Point::default()));
        assert_eq!(drag.carried().map(|w| w.kind.as_str()), Some("quote"));
    }

    #[test]
    fn test_moving_elements_is_rejected() {
        let mut drag = DragController::default();
        assert!(!drag.pointer_down(&DragSource::Element("abc".into()), Point::default()));
        assert!(!drag.pointer_down(&widget("marquee"), Point::default()));
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn test_proxy_follows_pointer() {
        let mut drag = DragController::new(2.0);
        drag.pointer_down(&widget("card"), Point::default());
        drag.pointer_move(Point::new(3.0, 0.0));
        drag.pointer_move(Point::new(40.0, 12.0));
        assert_eq!(drag.proxy_position(), Some(Point::new(40.0, 12.0)));
    }
}
