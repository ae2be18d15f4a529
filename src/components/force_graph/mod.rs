//! Native force-directed graph drawn on an HTML canvas.
//!
//! The default renderer. It needs no external scripts and offers:
//! - Physics-based node positioning via the `force_graph` simulation
//! - Pan, zoom and node dragging
//! - Hover highlighting of a node and its neighbors
//! - Click reporting for the node detail panel
//!
//! Node colors and sizes and link colors and weights come from the mapped
//! data; the [`Theme`] only styles the surroundings.

mod backend;
mod render;
pub mod scale;
mod state;
pub mod theme;

pub use backend::ForceBackend;
pub use theme::Theme;
