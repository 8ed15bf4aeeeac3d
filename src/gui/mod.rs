//! GUI module - User interface components

mod app;
mod control_panel;
mod preview;

pub use app::CompilerApp;
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use preview::PreviewTable;
