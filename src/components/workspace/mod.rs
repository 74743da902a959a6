mod editor;
mod format;
mod preview;
mod state;
mod window;

pub use state::WorkspaceState;
pub use window::Workspace;
