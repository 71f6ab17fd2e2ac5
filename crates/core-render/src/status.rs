//! Status line text.
//!
//! Format: `<name>[*] Ln X, Col Y  [mode]` followed by the current message,
//! if any. `<name>` is the base file name or `[No Name]`; `*` marks unsaved
//! changes. Line and column are 1-based, the column being the screen column.

use core_model::EditorModel;

pub fn status_text(model: &EditorModel, message: Option<&str>) -> String {
    let state = model.state();
    let name = state
        .file_name
        .as_deref()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .unwrap_or("[No Name]");
    let dirty = if state.dirty() { "*" } else { "" };
    let pos = model.position();
    let mut out = format!(
        "{name}{dirty} Ln {}, Col {}  [{}]",
        pos.data_y() + 1,
        pos.column() + 1,
        state.mode
    );
    if let Some(msg) = message.filter(|m| !m.is_empty()) {
        out.push_str("  ");
        out.push_str(msg);
    }
    out
}
