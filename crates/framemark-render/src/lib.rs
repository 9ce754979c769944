//! Framemark Render Library
//!
//! CPU composer for Framemark annotations: paints documents to an RGBA
//! surface and flattens committed content to PNG for the save handoff.

mod composer;
mod surface;

pub use composer::{ComposeError, Composer};
pub use surface::Surface;
