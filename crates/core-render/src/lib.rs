//! Drawing the editor onto a cell grid.
//!
//! `Renderer::draw` repaints a whole `Canvas` from an `EditorModel`: text
//! rows coloured from the lexer classification, then a reversed status row.
//! `Frame` bundles model, canvas and renderer behind one `Mutex`;
//! `spawn_resize_handler` is the tokio task that applies terminal resizes to
//! it.

pub mod canvas;
pub mod render;
pub mod resize;
pub mod status;
pub mod style;

pub use canvas::{Canvas, Cell, MemoryCanvas};
pub use render::Renderer;
pub use resize::{Frame, SharedFrame, spawn_resize_handler};
pub use status::status_text;
pub use style::{Color, Theme};
