pub mod assets;
pub mod bridge;
pub mod diff_view;
pub mod editor_view;
#[cfg(test)]
mod fake;
pub mod language;
pub mod options;
pub mod protocol;
pub mod runtime;
pub mod scripts;
pub mod session;

pub use diff_view::DiffView;
pub use editor_view::EditorView;
pub use runtime::ScriptRuntime;
pub use session::{BridgeState, LoadingOverlay};
