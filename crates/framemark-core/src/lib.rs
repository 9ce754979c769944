//! Framemark Core Library
//!
//! Platform-agnostic annotation engine for drawing on paused video frames:
//! element capture, hit-testing, layers, history, view transform, and draft
//! persistence. Rendering lives in `framemark-render`.

pub mod camera;
pub mod document;
pub mod draft;
pub mod element;
pub mod geometry;
pub mod history;
pub mod layer;
pub mod session;
pub mod storage;
pub mod tools;

pub use camera::{ViewTransform, MAX_ZOOM, MIN_ZOOM};
pub use document::{Document, EngineError};
pub use draft::Draft;
pub use element::{Element, ElementId, ElementKind, SerializableColor};
pub use history::History;
pub use layer::{Layer, LayerId};
pub use session::{
    HostBridge, Notice, SaveError, SaveSink, Session, SessionConfig, HIT_PADDING,
    MAX_DURATION_SECS, MIN_DURATION_SECS,
};
pub use storage::{DraftStore, MemoryDraftStore, StorageError, StorageResult};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileDraftStore;
pub use tools::{CaptureOutcome, CaptureState, ToolKind, ToolManager, ToolSettings};
