use ratatui::{prelude::*, widgets::*};

const GLOBAL_KEYS: [(&str, &str); 3] = [
    ("  q  ", "Quit the dashboard"),
    ("  h  ", "Toggle this popup"),
    (" Tab ", "Switch between plots and logs"),
];

const PLOT_KEYS: [(&str, &str); 1] = [("⬅ / ➡", "Previous / next metric")];

const LOG_KEYS: [(&str, &str); 7] = [
    ("  t  ", "Toggle per-tick pursuer tracing"),
    ("⬆ / ⬇", "Select log target"),
    ("⬅ / ➡", "Show one level less / more"),
    ("  s  ", "Toggle the target selector"),
    ("  f  ", "Focus the selected target"),
    ("PgUp ", "Page mode, scroll up"),
    (" Esc ", "Leave page mode"),
];

/// Centered popup listing the key bindings for the selected tab
pub fn render_help(area: Rect, buf: &mut Buffer, selected_tab: usize) {
    let tab_keys: &[(&str, &str)] = match selected_tab {
        0 => &PLOT_KEYS,
        _ => &LOG_KEYS,
    };

    let lines: Vec<Line> = GLOBAL_KEYS
        .iter()
        .chain(tab_keys)
        .map(|(key, action)| {
            Line::from(vec![
                key.light_cyan().bold(),
                Span::raw(format!(" : {action}")),
            ])
        })
        .collect();

    let [_, row, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(lines.len() as u16 + 4),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, popup, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(60),
        Constraint::Fill(1),
    ])
    .areas(row);

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1))
                .title("Keys"),
        )
        .render(popup, buf);
}
