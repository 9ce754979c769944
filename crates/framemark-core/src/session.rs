//! Drawing session: the single mutation surface over the annotation state.
//!
//! A session exclusively owns the document, history, view transform, and
//! capture state for one open drawing surface. All mutations happen
//! synchronously inside the input handlers; the only side effects are the
//! fire-and-forget draft writes and the final save handoff.

use crate::camera::ViewTransform;
use crate::document::{Document, EngineError};
use crate::draft::Draft;
use crate::element::{Element, ElementId};
use crate::history::History;
use crate::layer::LayerId;
use crate::storage::DraftStore;
use crate::tools::{CaptureOutcome, ToolKind, ToolManager};
use kurbo::{Point, Vec2};
use thiserror::Error;

/// Fixed hit-test padding in surface units; makes thin strokes grabbable.
pub const HIT_PADDING: f64 = 10.0;

/// Display duration bounds in seconds, clamped at save time.
pub const MIN_DURATION_SECS: u32 = 1;
pub const MAX_DURATION_SECS: u32 = 30;

/// Non-blocking, host-visible notices. None of these are fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Drawing was attempted on a locked layer.
    LayerLocked { layer: String },
    NothingToUndo,
    NothingToRedo,
    /// A stored draft was loaded on open.
    DraftRestored { elements: usize },
    Saved,
    /// The host save contract rejected; state is untouched and retryable.
    SaveFailed { reason: String },
}

/// Host-side save contract failure.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Save failed: {0}")]
    Rejected(String),
}

/// The sole persistence contract for finished annotations.
pub trait SaveSink {
    fn save(
        &mut self,
        image: &[u8],
        timestamp_secs: u64,
        duration_secs: u32,
    ) -> Result<(), SaveError>;
}

/// Host callbacks around session lifecycle.
pub trait HostBridge {
    /// Invoked once when the drawing session opens.
    fn pause_playback(&mut self);
    /// Input-routing hint: the surface opened or closed.
    fn drawing_mode_changed(&mut self, is_open: bool);
}

/// Session construction parameters.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Drawing surface pixel dimensions.
    pub width: u32,
    pub height: u32,
    /// External target identifier (e.g. the video/file id); drafts are
    /// keyed by it so multiple targets never collide.
    pub target_key: String,
    /// Video timestamp of the paused frame, in seconds.
    pub timestamp: f64,
}

/// An in-progress pinch/pan gesture.
#[derive(Debug, Clone, Copy)]
struct Gesture {
    last_dist: f64,
    last_centroid: Point,
}

/// One open drawing surface and everything it owns.
pub struct Session<S: DraftStore> {
    document: Document,
    history: History,
    view: ViewTransform,
    tools: ToolManager,
    selected: Option<ElementId>,
    gesture: Option<Gesture>,
    notices: Vec<Notice>,
    store: S,
    bridge: Option<Box<dyn HostBridge>>,
    target_key: String,
    width: u32,
    height: u32,
    timestamp: f64,
    duration: u32,
}

impl<S: DraftStore> Session<S> {
    /// Open a drawing session. Pauses host playback, flips drawing mode on,
    /// and restores a stored draft for the target if one parses.
    pub fn open(config: SessionConfig, store: S, mut bridge: Option<Box<dyn HostBridge>>) -> Self {
        if let Some(b) = bridge.as_mut() {
            b.pause_playback();
            b.drawing_mode_changed(true);
        }
        let mut session = Self {
            document: Document::new(),
            history: History::new(),
            view: ViewTransform::new(),
            tools: ToolManager::new(),
            selected: None,
            gesture: None,
            notices: Vec::new(),
            store,
            bridge,
            target_key: config.target_key,
            width: config.width,
            height: config.height,
            timestamp: config.timestamp,
            duration: 5,
        };
        session.restore_draft();
        session
    }

    /// Attempt draft restoration; only applies to an empty element set.
    fn restore_draft(&mut self) {
        if !self.document.is_empty() {
            return;
        }
        let json = match self.store.read(&self.target_key) {
            Ok(Some(json)) => json,
            Ok(None) => return,
            Err(e) => {
                log::warn!("draft read failed for {}: {e}", self.target_key);
                return;
            }
        };
        let Some(draft) = Draft::from_json(&json) else {
            return;
        };
        if draft.elements.is_empty() || draft.layers.is_empty() {
            return;
        }
        let count = draft.elements.len();
        self.document.elements = draft.elements;
        self.document.layers = draft.layers;
        self.document.current_layer = draft.current_layer_id;
        if self.document.layer(self.document.current_layer).is_none() {
            self.document.current_layer = self.document.layers[0].id;
        }
        self.document.remove_orphans();
        self.duration = draft.duration;
        self.timestamp = draft.timestamp;
        self.history = History::seeded(self.document.elements.clone());
        log::info!("restored draft with {count} element(s) for {}", self.target_key);
        self.notices.push(Notice::DraftRestored { elements: count });
    }

    /// Fire-and-forget draft write; failures are logged, never surfaced.
    fn write_draft(&self) {
        let draft = Draft::new(
            self.document.elements.clone(),
            self.document.layers.clone(),
            self.document.current_layer,
            self.duration,
            self.timestamp,
        );
        match draft.to_json() {
            Ok(json) => {
                if let Err(e) = self.store.write(&self.target_key, &json) {
                    log::warn!("draft write failed for {}: {e}", self.target_key);
                }
            }
            Err(e) => log::warn!("draft serialization failed: {e}"),
        }
    }

    fn commit_change(&mut self) {
        self.history.commit(self.document.elements.clone());
        self.write_draft();
    }

    // --- pointer protocol -------------------------------------------------

    /// Pointer/touch down with all active device-space contact points.
    pub fn pointer_down(&mut self, contacts: &[Point]) {
        if contacts.len() >= 2 {
            // A second contact always wins over drawing: the in-progress
            // capture is discarded without commit.
            if self.tools.is_active() {
                log::debug!("pinch start discarded in-progress capture");
            }
            self.tools.cancel();
            self.gesture = Some(Gesture {
                last_dist: contact_distance(contacts),
                last_centroid: centroid(contacts),
            });
            return;
        }
        let Some(&device) = contacts.first() else {
            return;
        };
        let position = self.view.to_surface(device);

        let active = self.document.active_layer();
        if active.locked {
            let layer = active.name.clone();
            log::info!("rejected input on locked layer \"{layer}\"");
            self.notices.push(Notice::LayerLocked { layer });
            return;
        }

        if self.tools.current_tool.selects() {
            match self.document.hit_test_top(position, HIT_PADDING) {
                Some(id) => {
                    self.selected = Some(id);
                    self.tools.begin_drag(id, position);
                }
                None => self.selected = None,
            }
            return;
        }
        self.tools.begin_capture(position, self.document.current_layer);
    }

    /// Pointer/touch move with all active device-space contact points.
    pub fn pointer_move(&mut self, contacts: &[Point]) {
        if let Some(gesture) = self.gesture {
            if contacts.len() >= 2 {
                let dist = contact_distance(contacts);
                let center = centroid(contacts);
                self.view.pinch(gesture.last_dist, dist);
                self.view.pan_by(center - gesture.last_centroid);
                self.gesture = Some(Gesture {
                    last_dist: dist,
                    last_centroid: center,
                });
            } else if let Some(&device) = contacts.first() {
                // Pinch collapsed to one contact: a single-contact drag
                // pans, but only while zoomed in.
                self.view.pan_by(device - gesture.last_centroid);
                self.gesture = Some(Gesture {
                    last_dist: gesture.last_dist,
                    last_centroid: device,
                });
            }
            return;
        }
        let Some(&device) = contacts.first() else {
            return;
        };
        let position = self.view.to_surface(device);
        if let Some((id, delta)) = self.tools.update(position) {
            if let Some(element) = self.document.element_mut(id) {
                element.translate(delta);
            }
        }
    }

    /// Pointer/touch up; `remaining_contacts` is the count still down.
    pub fn pointer_up(&mut self, remaining_contacts: usize) {
        if self.gesture.is_some() {
            if remaining_contacts == 0 {
                self.gesture = None;
            }
            return;
        }
        match self.tools.end() {
            CaptureOutcome::Commit(element) => {
                self.document.add_element(element);
                self.commit_change();
            }
            CaptureOutcome::DragEnd(_) => self.commit_change(),
            CaptureOutcome::Discard | CaptureOutcome::None => {}
        }
    }

    /// Input stream cancelled (e.g. the surface lost focus).
    pub fn pointer_cancel(&mut self) {
        self.tools.cancel();
        self.gesture = None;
    }

    /// Confirm pending text; empty input cancels the marker with no
    /// history mutation.
    pub fn confirm_text(&mut self, content: &str) {
        if let Some(element) = self.tools.confirm_text(content, self.document.current_layer) {
            self.document.add_element(element);
            self.commit_change();
        }
    }

    /// Drop the pending text marker.
    pub fn cancel_text(&mut self) {
        self.tools.cancel();
    }

    // --- history ----------------------------------------------------------

    pub fn undo(&mut self) {
        match self.history.undo() {
            Some(snapshot) => {
                self.document.elements = snapshot.to_vec();
                self.document.remove_orphans();
                self.selected = None;
                self.write_draft();
            }
            None => self.notices.push(Notice::NothingToUndo),
        }
    }

    pub fn redo(&mut self) {
        match self.history.redo() {
            Some(snapshot) => {
                self.document.elements = snapshot.to_vec();
                self.document.remove_orphans();
                self.selected = None;
                self.write_draft();
            }
            None => self.notices.push(Notice::NothingToRedo),
        }
    }

    // --- layer operations -------------------------------------------------

    pub fn add_layer(&mut self) -> LayerId {
        let id = self.document.add_layer();
        self.write_draft();
        id
    }

    pub fn toggle_visibility(&mut self, id: LayerId) -> Result<(), EngineError> {
        self.document.toggle_visibility(id)?;
        self.write_draft();
        Ok(())
    }

    pub fn toggle_lock(&mut self, id: LayerId) -> Result<(), EngineError> {
        self.document.toggle_lock(id)?;
        self.write_draft();
        Ok(())
    }

    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> Result<(), EngineError> {
        self.document.rename_layer(id, name)?;
        self.write_draft();
        Ok(())
    }

    pub fn reorder_layers(&mut self, from: usize, to: usize) -> Result<(), EngineError> {
        self.document.reorder_layers(from, to)?;
        self.write_draft();
        Ok(())
    }

    /// Delete a layer and its elements; records a history snapshot since
    /// the element set changed.
    pub fn delete_layer(&mut self, id: LayerId) -> Result<(), EngineError> {
        self.document.delete_layer(id)?;
        if self.selected.is_some_and(|s| self.document.element(s).is_none()) {
            self.selected = None;
        }
        self.commit_change();
        Ok(())
    }

    /// Merge source layers into a target; records a history snapshot since
    /// element ownership changed.
    pub fn merge_layers(&mut self, target: LayerId, sources: &[LayerId]) -> Result<(), EngineError> {
        self.document.merge_layers(target, sources)?;
        self.commit_change();
        Ok(())
    }

    pub fn set_current_layer(&mut self, id: LayerId) -> Result<(), EngineError> {
        self.document.set_current_layer(id)?;
        self.write_draft();
        Ok(())
    }

    // --- save / lifecycle -------------------------------------------------

    /// Display duration for the saved annotation; persisted with the draft.
    pub fn set_duration(&mut self, seconds: u32) {
        self.duration = seconds;
        self.write_draft();
    }

    /// Hand a flattened image to the host save contract. The timestamp is
    /// floored to whole seconds and the duration clamped to [1, 30]. On
    /// failure nothing is cleared, not even the draft, so a retry
    /// requires no redone work.
    pub fn submit(&mut self, sink: &mut dyn SaveSink, image: Vec<u8>) {
        let timestamp_secs = self.timestamp.max(0.0).floor() as u64;
        let duration_secs = self.duration.clamp(MIN_DURATION_SECS, MAX_DURATION_SECS);
        match sink.save(&image, timestamp_secs, duration_secs) {
            Ok(()) => {
                if let Err(e) = self.store.clear(&self.target_key) {
                    log::warn!("draft clear failed for {}: {e}", self.target_key);
                }
                log::info!("saved annotation for {} at {timestamp_secs}s", self.target_key);
                self.notices.push(Notice::Saved);
            }
            Err(e) => {
                log::warn!("save failed for {}: {e}", self.target_key);
                self.notices.push(Notice::SaveFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Discard the session after the host confirmed: clears in-memory
    /// state but intentionally preserves the stored draft for later
    /// restoration.
    pub fn cancel(&mut self) {
        self.document = Document::new();
        self.history = History::new();
        self.tools.cancel();
        self.selected = None;
        self.gesture = None;
        if let Some(b) = self.bridge.as_mut() {
            b.drawing_mode_changed(false);
        }
    }

    /// Surface dimension update from the host.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Drain pending host-visible notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // --- accessors --------------------------------------------------------

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    /// The uncommitted working element, painted on top of everything.
    pub fn preview(&self) -> Option<&Element> {
        self.tools.preview()
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn settings_mut(&mut self) -> &mut crate::tools::ToolSettings {
        &mut self.tools.settings
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

fn contact_distance(contacts: &[Point]) -> f64 {
    if contacts.len() < 2 {
        return 0.0;
    }
    let (a, b) = (contacts[0], contacts[1]);
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

fn centroid(contacts: &[Point]) -> Point {
    if contacts.is_empty() {
        return Point::ZERO;
    }
    let sum = contacts
        .iter()
        .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / contacts.len() as f64).to_point()
}
