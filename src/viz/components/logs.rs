use crossterm::event::{Event, KeyCode};
use log::LevelFilter;
use ratatui::{prelude::*, widgets::*};
use tui_logger::{TuiLoggerSmartWidget, TuiWidgetEvent, TuiWidgetState};

use super::Component;
use crate::viz::util::event_keycode;

/// Emits one record per pursuer per tick
const RUNNER: &str = "pursuit_rl::runner";

/// Capture level of each target of this crate while the dashboard runs
const TARGETS: [(&str, LevelFilter); 4] = [
    ("pursuit_rl::trainer", LevelFilter::Debug),
    ("pursuit_rl::agent", LevelFilter::Debug),
    ("pursuit_rl::game", LevelFilter::Info),
    (RUNNER, LevelFilter::Debug),
];

/// Capture levels, with the runner raised to `Trace` when per-tick tracing is on
fn capture_levels(tick_trace: bool) -> impl Iterator<Item = (&'static str, LevelFilter)> {
    TARGETS.into_iter().map(move |(target, level)| match target {
        RUNNER if tick_trace => (target, LevelFilter::Trace),
        _ => (target, level),
    })
}

/// Most verbose level any target captures
fn max_level(tick_trace: bool) -> LevelFilter {
    capture_levels(tick_trace)
        .map(|(_, level)| level)
        .max()
        .unwrap_or(LevelFilter::Info)
}

/// Install the crate's capture levels into `log` and tui-logger
///
/// Records below a target's level are dropped before they are formatted.
pub fn apply_capture_levels(tick_trace: bool) {
    log::set_max_level(max_level(tick_trace));
    tui_logger::set_default_level(LevelFilter::Info);
    for (target, level) in capture_levels(tick_trace) {
        tui_logger::set_level_for_target(target, level);
    }
}

/// Pretraining and agent log, per-tick pursuer tracing on demand
pub struct Logs {
    state: TuiWidgetState,
    tick_trace: bool,
}

impl Logs {
    pub fn new() -> Self {
        let state = capture_levels(true).fold(
            TuiWidgetState::new().set_default_display_level(LevelFilter::Info),
            |state, (target, level)| state.set_level_for_target(target, level),
        );
        Self {
            state,
            tick_trace: false,
        }
    }

    /// Start or stop capturing the runner's per-tick records
    pub fn toggle_tick_trace(&mut self) {
        self.tick_trace = !self.tick_trace;
        apply_capture_levels(self.tick_trace);
        log::info!(
            "Per-tick pursuer tracing {}",
            if self.tick_trace { "on" } else { "off" }
        );
    }

    fn header(&self) -> Line<'static> {
        let mut spans = vec![Span::raw("capturing ")];
        for (target, level) in capture_levels(self.tick_trace) {
            let name = target.trim_start_matches("pursuit_rl::");
            spans.push(name.light_cyan());
            spans.push(Span::raw(format!(" {level}  ")));
        }
        spans.push("[t]".light_cyan().bold());
        spans.push(Span::raw(if self.tick_trace {
            " tick trace on"
        } else {
            " tick trace off"
        }));
        Line::from(spans)
    }
}

impl Default for Logs {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetRef for Logs {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let [header_area, log_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        Paragraph::new(self.header()).dark_gray().render(header_area, buf);

        TuiLoggerSmartWidget::default()
            .style_error(Style::default().light_red())
            .style_warn(Style::default().light_yellow())
            .style_info(Style::default().cyan())
            .style_debug(Style::default().white())
            .style_trace(Style::default().dark_gray())
            .output_separator(' ')
            .output_target(false)
            .state(&self.state)
            .render(log_area, buf);
    }
}

impl Component for Logs {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        let Some(key) = event_keycode(event) else {
            return false;
        };

        let widget_event = match key {
            KeyCode::Char('t') => {
                self.toggle_tick_trace();
                return true;
            }
            KeyCode::Up => TuiWidgetEvent::UpKey,
            KeyCode::Down => TuiWidgetEvent::DownKey,
            KeyCode::Left => TuiWidgetEvent::LeftKey,
            KeyCode::Right => TuiWidgetEvent::RightKey,
            KeyCode::PageUp => TuiWidgetEvent::PrevPageKey,
            KeyCode::PageDown => TuiWidgetEvent::NextPageKey,
            KeyCode::Esc => TuiWidgetEvent::EscapeKey,
            KeyCode::Char('s') => TuiWidgetEvent::HideKey,
            KeyCode::Char('f') => TuiWidgetEvent::FocusKey,
            _ => return false,
        };

        self.state.transition(widget_event);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_tick_records_off_by_default() {
        let levels: Vec<_> = capture_levels(false).collect();
        assert!(
            levels.iter().all(|&(_, level)| level <= LevelFilter::Debug),
            "Nothing captured at trace level: {levels:?}"
        );
        assert_eq!(max_level(false), LevelFilter::Debug);
    }

    #[test]
    fn tick_trace_raises_only_the_runner() {
        for ((target, off), (_, on)) in capture_levels(false).zip(capture_levels(true)) {
            if target == RUNNER {
                assert_eq!(on, LevelFilter::Trace, "Runner traced");
            } else {
                assert_eq!(on, off, "{target} unchanged");
            }
        }
        assert_eq!(max_level(true), LevelFilter::Trace);
    }
}
