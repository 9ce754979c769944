//! Tool selection and the element capture state machine.

use crate::element::{Element, ElementId, ElementKind, SerializableColor};
use crate::layer::LayerId;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    /// Repurposed as a move tool: hits are dragged, not erased.
    Eraser,
    Freehand,
    Rectangle,
    Ellipse,
    Arrow,
    Text,
    Highlight,
}

impl ToolKind {
    /// The element kind a drawing tool produces.
    pub fn element_kind(&self) -> Option<ElementKind> {
        match self {
            ToolKind::Freehand => Some(ElementKind::Freehand),
            ToolKind::Rectangle => Some(ElementKind::Rectangle),
            ToolKind::Ellipse => Some(ElementKind::Ellipse),
            ToolKind::Arrow => Some(ElementKind::Arrow),
            ToolKind::Highlight => Some(ElementKind::Highlight),
            ToolKind::Select | ToolKind::Eraser | ToolKind::Text => None,
        }
    }

    /// Select and eraser both resolve hits for drag-move.
    pub fn selects(&self) -> bool {
        matches!(self, ToolKind::Select | ToolKind::Eraser)
    }
}

/// Style applied to new elements, copied at creation time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToolSettings {
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            stroke_width: 3.0,
        }
    }
}

/// State of the capture machine: Idle → Capturing → Idle, with a Dragging
/// sub-mode for select/eraser and a pending marker for text placement.
#[derive(Debug, Clone, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    /// A working element accumulating pointer samples.
    Capturing { element: Element },
    /// An existing element being rigid-translated.
    Dragging { id: ElementId, last: Point },
    /// A text position waiting for confirmation; no element exists yet.
    PendingText { position: Point },
}

/// What a finished capture produced.
#[derive(Debug)]
pub enum CaptureOutcome {
    /// Nothing was in progress.
    None,
    /// A working element ready to commit.
    Commit(Element),
    /// A degenerate two-point shape, dropped without commit.
    Discard,
    /// A drag finished; the translated element needs a snapshot.
    DragEnd(ElementId),
}

/// Manages the current tool and its in-progress capture.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    pub current_tool: ToolKind,
    pub settings: ToolSettings,
    pub state: CaptureState,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools; any in-progress capture is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = CaptureState::Idle;
    }

    /// Start capturing a new element for the current drawing tool, or a
    /// pending text marker for the text tool. No-op for select/eraser.
    pub fn begin_capture(&mut self, position: Point, layer_id: LayerId) {
        if self.current_tool == ToolKind::Text {
            self.state = CaptureState::PendingText { position };
            return;
        }
        if let Some(kind) = self.current_tool.element_kind() {
            let element = Element::new(
                kind,
                position,
                self.settings.color,
                self.settings.stroke_width,
                layer_id,
            );
            self.state = CaptureState::Capturing { element };
        }
    }

    /// Start dragging an existing element from a grab point.
    pub fn begin_drag(&mut self, id: ElementId, position: Point) {
        self.state = CaptureState::Dragging { id, last: position };
    }

    /// Feed a pointer-move sample. For a drag, returns the rigid delta the
    /// caller must apply to the dragged element.
    pub fn update(&mut self, position: Point) -> Option<(ElementId, Vec2)> {
        match &mut self.state {
            CaptureState::Capturing { element } => {
                element.update_end(position);
                None
            }
            CaptureState::Dragging { id, last } => {
                let delta = Vec2::new(position.x - last.x, position.y - last.y);
                *last = position;
                Some((*id, delta))
            }
            _ => None,
        }
    }

    /// Finish the capture on pointer-up.
    pub fn end(&mut self) -> CaptureOutcome {
        match std::mem::take(&mut self.state) {
            CaptureState::Capturing { element } => {
                if element.is_degenerate() {
                    log::debug!("discarding degenerate {:?}", element.kind);
                    CaptureOutcome::Discard
                } else {
                    CaptureOutcome::Commit(element)
                }
            }
            CaptureState::Dragging { id, .. } => CaptureOutcome::DragEnd(id),
            CaptureState::PendingText { position } => {
                // Pointer-up does not confirm text; keep waiting.
                self.state = CaptureState::PendingText { position };
                CaptureOutcome::None
            }
            CaptureState::Idle => CaptureOutcome::None,
        }
    }

    /// Discard any in-progress capture without committing.
    pub fn cancel(&mut self) {
        self.state = CaptureState::Idle;
    }

    /// Confirm pending text. Empty input cancels the marker instead.
    pub fn confirm_text(&mut self, content: &str, layer_id: LayerId) -> Option<Element> {
        if let CaptureState::PendingText { position } = self.state {
            self.state = CaptureState::Idle;
            let content = content.trim();
            if content.is_empty() {
                return None;
            }
            return Some(Element::text(
                position,
                content.to_string(),
                self.settings.color,
                self.settings.stroke_width,
                layer_id,
            ));
        }
        None
    }

    /// The uncommitted working element, if any (painted on top of
    /// everything by the composer).
    pub fn preview(&self) -> Option<&Element> {
        match &self.state {
            CaptureState::Capturing { element } => Some(element),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, CaptureState::Idle)
    }
}
