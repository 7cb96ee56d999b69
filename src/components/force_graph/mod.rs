//! Canvas force-graph view: glyph binding, per-frame engine state, painting
//! and the Leptos component that drives them.

mod binder;
mod component;
mod render;
mod state;

pub use binder::{BindReport, ENTER_FRAMES, Hit, LinkGlyph, NodeGlyph, Scene};
pub use component::ForceGraphCanvas;
pub use state::{DragSession, ForceGraphState, MOUSE_POINTER, PointerAction, PointerId};
