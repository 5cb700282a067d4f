use std::collections::VecDeque;

use crossterm::event::{Event, KeyCode};
use ratatui::{prelude::*, widgets::*};

use super::Component;
use crate::viz::{util::event_keycode, Update};

/// Episodes averaged for the trend line
const WINDOW: usize = 50;

/// Running mean over the last [`WINDOW`] values
#[derive(Default)]
struct Trend {
    window: VecDeque<f64>,
    sum: f64,
}

impl Trend {
    fn push(&mut self, value: f64) -> f64 {
        self.window.push_back(value);
        self.sum += value;
        if self.window.len() > WINDOW {
            self.sum -= self.window.pop_front().unwrap_or_default();
        }
        self.sum / self.window.len() as f64
    }
}

/// One metric against episode number: raw points plus a moving average
struct Plot {
    title: &'static str,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    points: Vec<(f64, f64)>,
    trend: Vec<(f64, f64)>,
    running: Trend,
}

fn labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    bounds.iter().map(|b| format!("{b:.2}").bold()).collect()
}

impl Plot {
    fn new(title: &'static str, episodes: u32) -> Self {
        Self {
            title,
            x_bounds: [0.0, episodes.max(1) as f64],
            y_bounds: [f64::MAX, f64::MIN],
            points: Vec::new(),
            trend: Vec::new(),
            running: Trend::default(),
        }
    }

    fn push(&mut self, x: f64, y: f64) {
        if !y.is_finite() {
            return;
        }
        self.x_bounds[1] = self.x_bounds[1].max(x);
        self.y_bounds[0] = self.y_bounds[0].min(y);
        self.y_bounds[1] = self.y_bounds[1].max(y);
        self.points.push((x, y));
        self.trend.push((x, self.running.push(y)));
    }

    fn y_bounds(&self) -> [f64; 2] {
        match self.y_bounds {
            [lo, hi] if lo > hi => [0.0, 1.0],
            [lo, hi] if lo == hi => [lo - 0.5, hi + 0.5],
            bounds => bounds,
        }
    }
}

impl WidgetRef for Plot {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let datasets = vec![
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Scatter)
                .dark_gray()
                .data(&self.points),
            Dataset::default()
                .name(format!("mean of {WINDOW}"))
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .cyan()
                .data(&self.trend),
        ];

        let y_bounds = self.y_bounds();
        Chart::new(datasets)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title(self.title)
                    .padding(Padding::uniform(1)),
            )
            .x_axis(
                Axis::default()
                    .title("Episode")
                    .dark_gray()
                    .labels(labels(self.x_bounds))
                    .bounds(self.x_bounds),
            )
            .y_axis(
                Axis::default()
                    .title(self.title)
                    .dark_gray()
                    .labels(labels(y_bounds))
                    .bounds(y_bounds),
            )
            .render(area, buf);
    }
}

/// Every metric, one visible at a time
pub struct Plots {
    plots: Vec<Plot>,
    selected: usize,
}

impl Plots {
    pub fn new(metrics: Vec<&'static str>, episodes: u32) -> Self {
        Self {
            plots: metrics.into_iter().map(|m| Plot::new(m, episodes)).collect(),
            selected: 0,
        }
    }

    pub fn update(&mut self, update: Update) {
        let x = update.episode as f64;
        for (plot, y) in self.plots.iter_mut().zip(update.data) {
            plot.push(x, y);
        }
    }

    fn shift(&mut self, by: usize) {
        let len = self.plots.len();
        if len > 0 {
            self.selected = (self.selected + by) % len;
        }
    }
}

impl WidgetRef for Plots {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let [tabs_area, plot_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        Tabs::new(self.plots.iter().map(|p| p.title))
            .white()
            .highlight_style(Style::default().light_green())
            .select(self.selected)
            .render(tabs_area, buf);

        if let Some(plot) = self.plots.get(self.selected) {
            plot.render_ref(plot_area, buf);
        }
    }
}

impl Component for Plots {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        match event_keycode(event) {
            Some(KeyCode::Right) => self.shift(1),
            Some(KeyCode::Left) => self.shift(self.plots.len().saturating_sub(1)),
            _ => return false,
        }
        true
    }
}
