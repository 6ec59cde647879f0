//! Senda Viewer - Application Library
//!
//! This is the main application crate: it hosts the walkers map, the trail
//! layer plugin and the info panels, and wires pointer interaction into the
//! selection and enrichment core from `senda-lib`.

mod app;

pub use app::SendaViewerApp;
