mod help;
mod logs;
mod plot;

use crossterm::event::Event;
use ratatui::widgets::WidgetRef;

pub use self::{
    help::render_help,
    logs::{apply_capture_levels, Logs},
    plot::Plots,
};

/// A widget that also reacts to terminal input
pub trait Component: WidgetRef {
    /// Returns whether the event was consumed
    fn handle_ui_event(&mut self, event: &Event) -> bool;
}
