//! The shared frame and the task that keeps it in step with the terminal.
//!
//! One coarse `Mutex` guards the model, the canvas and the renderer
//! together. The edit loop and the resize task each take it for a whole
//! operation, so a redraw never sees a half-applied resize.

use crate::canvas::Canvas;
use crate::render::Renderer;
use core_config::Config;
use core_events::{Event, StatusLine};
use core_model::EditorModel;
use core_text::{ScreenPos, Viewport};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct Frame<C: Canvas> {
    pub model: EditorModel,
    pub canvas: C,
    pub renderer: Renderer,
    pub status: StatusLine,
    /// Holds the configured wrap column; the model carries the clamped one.
    pub config: Config,
}

pub type SharedFrame<C> = Arc<Mutex<Frame<C>>>;

impl<C: Canvas> Frame<C> {
    pub fn new(model: EditorModel, canvas: C, renderer: Renderer, status: StatusLine) -> Self {
        let mut config = Config::default();
        config.file.wrap.column = model.state().settings.wrap_column;
        config.effective_wrap_column = config.file.wrap.column;
        Self {
            model,
            canvas,
            renderer,
            status,
            config,
        }
    }

    pub fn shared(self) -> SharedFrame<C> {
        Arc::new(Mutex::new(self))
    }

    pub fn redraw(&mut self) -> ScreenPos {
        let message = self.status.current();
        self.renderer
            .draw(&mut self.model, &mut self.canvas, message.as_deref())
    }

    /// Resize the canvas, fit the viewport and the wrap column to it and
    /// redraw.
    pub fn resize(&mut self, cols: usize, rows: usize) -> ScreenPos {
        self.canvas.resize(cols, rows);
        let text_rows = self.renderer.text_rows(rows);
        self.model.set_viewport(Viewport::new(cols, text_rows));
        if let Some(column) = self.config.recompute_after_resize(cols) {
            self.model.state_mut().settings.wrap_column = column;
        }
        self.redraw()
    }
}

fn lock<C: Canvas>(frame: &SharedFrame<C>) -> MutexGuard<'_, Frame<C>> {
    frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Apply `Event::Resize` to the shared frame and redraw on status and job
/// events. Stops on `Event::Shutdown` or when every sender is gone; the
/// handle yields the number of redraws.
pub fn spawn_resize_handler<C>(
    frame: SharedFrame<C>,
    mut rx: mpsc::Receiver<Event>,
) -> JoinHandle<usize>
where
    C: Canvas + Send + 'static,
{
    tokio::spawn(async move {
        let mut redraws = 0;
        while let Some(event) = rx.recv().await {
            match event {
                Event::Resize { cols, rows } => {
                    lock(&frame).resize(cols, rows);
                    debug!(target: "render", cols, rows, "resize_applied");
                }
                Event::StatusCleared | Event::JobFinished(_) => {
                    lock(&frame).redraw();
                }
                Event::Shutdown => break,
            }
            redraws += 1;
        }
        debug!(target: "render", redraws, "resize_handler_stopped");
        redraws
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::MemoryCanvas;
    use core_state::{EditSettings, EditorState};
    use core_text::TextBuffer;

    #[test]
    fn resize_shrinks_viewport_and_wrap_column() {
        let settings = EditSettings {
            wrap_column: Some(60),
            ..EditSettings::default()
        };
        let model = EditorModel::new(EditorState::new(TextBuffer::from_text("hello"), settings));
        let canvas = MemoryCanvas::new(80, 24);
        let mut frame = Frame::new(model, canvas, Renderer::default(), StatusLine::new());
        frame.resize(40, 10);
        assert_eq!(frame.model.viewport(), Viewport::new(40, 9));
        assert_eq!(frame.model.state().settings.wrap_column, Some(40));
        assert_eq!(frame.canvas.row(0), "hello");
        frame.resize(100, 10);
        assert_eq!(frame.model.state().settings.wrap_column, Some(60));
    }

    #[test]
    fn resize_follows_the_session_config() {
        let model = EditorModel::new(EditorState::new(TextBuffer::new(), EditSettings::default()));
        let mut frame = Frame::new(model, MemoryCanvas::new(80, 24), Renderer::default(), StatusLine::new());
        frame.config.file.wrap.column = Some(72);
        frame.resize(50, 10);
        assert_eq!(frame.config.effective_wrap_column, Some(50));
        assert_eq!(frame.model.state().settings.wrap_column, Some(50));
        frame.resize(90, 10);
        assert_eq!(frame.model.state().settings.wrap_column, Some(72));
    }
}
