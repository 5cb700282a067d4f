use std::{
    io,
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};

use crossterm::event::{self, KeyCode};
use ratatui::{prelude::*, widgets::*};

use super::{
    components::{render_help, Component, Logs, Plots},
    tui,
    util::event_keycode,
};

const TABS: [&str; 2] = ["Plots", "Logs"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Training,
    Done,
    Quit,
}

/// One point per metric for a finished episode
#[derive(Clone, Debug)]
pub struct Update {
    /// Number of episodes completed so far
    pub episode: u32,
    pub data: Vec<f64>,
}

/// Root component: tab bar, the selected tab, a progress gauge and a help popup
pub struct App {
    state: State,
    episode: u32,
    total_episodes: u32,
    selected_tab: usize,
    show_help: bool,
    plots: Plots,
    logs: Logs,
}

impl App {
    pub fn new(metrics: &[&'static str], episodes: u32) -> Self {
        Self {
            state: State::default(),
            episode: 0,
            total_episodes: episodes,
            selected_tab: 0,
            show_help: false,
            plots: Plots::new(metrics.to_vec(), episodes),
            logs: Logs::new(),
        }
    }

    /// Initialize the terminal and draw until the user quits
    ///
    /// Restores the terminal on exit
    pub fn run(&mut self, rx: Receiver<Update>) -> io::Result<()> {
        let mut terminal = tui::init()?;

        while self.state != State::Quit {
            if self.state == State::Training {
                self.drain(&rx);
            }

            terminal.draw(|frame| frame.render_widget(&*self, frame.size()))?;

            if event::poll(Duration::from_millis(16))? {
                let event = event::read()?;
                self.handle_event(&event);
            }
        }

        tui::restore()
    }

    fn drain(&mut self, rx: &Receiver<Update>) {
        loop {
            match rx.try_recv() {
                Ok(update) => {
                    self.episode = update.episode;
                    self.plots.update(update);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::info!("Pretraining finished, press q to exit");
                    self.state = State::Done;
                    break;
                }
            }
        }
    }

    fn handle_event(&mut self, event: &event::Event) {
        let Some(key) = event_keycode(event) else {
            return;
        };

        match key {
            KeyCode::Char('q') => self.state = State::Quit,
            KeyCode::Char('h') => self.show_help = !self.show_help,
            KeyCode::Tab => self.selected_tab = (self.selected_tab + 1) % TABS.len(),
            _ if self.selected_tab == 0 => {
                self.plots.handle_ui_event(event);
            }
            _ => {
                self.logs.handle_ui_event(event);
            }
        }
    }

    fn ratio(&self) -> f64 {
        if self.total_episodes == 0 {
            return 1.0;
        }
        (self.episode as f64 / self.total_episodes as f64).clamp(0.0, 1.0)
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [menu_area, main_area, progress_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        match self.selected_tab {
            0 => self.plots.render_ref(main_area, buf),
            _ => self.logs.render_ref(main_area, buf),
        }

        let title = match self.state {
            State::Training => "Pretraining",
            _ => "Done (q to exit)",
        };
        Gauge::default()
            .block(Block::bordered().border_type(BorderType::Rounded).title(title))
            .gauge_style(Color::Cyan)
            .label(format!("{}/{}", self.episode, self.total_episodes))
            .ratio(self.ratio())
            .render(progress_area, buf);

        if self.show_help {
            render_help(area, buf, self.selected_tab);
        }
    }
}
