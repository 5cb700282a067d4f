//! Terminal dashboard for watching pretraining
//!
//! ```no_run
//! use pursuit_rl::{store::MemoryStore, viz, Agent, Config};
//!
//! let mut agent = Agent::new(Config::default(), MemoryStore::new()).unwrap();
//! let (handle, tx) = viz::init(&["reward", "steps"], 500);
//! agent.pretrain_with(500, |report| {
//!     let _ = tx.send(viz::Update {
//!         episode: report.episode + 1,
//!         data: vec![report.reward as f64, report.steps as f64],
//!     });
//! });
//! drop(tx);
//! let _ = handle.join();
//! ```

use std::{
    io,
    sync::mpsc::{self, Sender},
    thread::{self, JoinHandle},
};

use log::LevelFilter;

mod app;
mod components;
mod tui;
mod util;

pub use app::{App, Update};

/// Route `log` records into the dashboard and start it on its own thread
///
/// Pretraining, agent and game records are captured; per-tick pursuer records only once the user
/// turns them on from the Logs tab.
///
/// Each [`Update`] sent on the returned channel adds one point to each of the named `metrics`,
/// in order. Dropping the sender marks the run as finished; the dashboard stays open until the
/// user quits with `q`.
pub fn init(metrics: &[&'static str], episodes: u32) -> (JoinHandle<io::Result<()>>, Sender<Update>) {
    // a second call keeps the logger installed by the first
    let _ = tui_logger::init_logger(LevelFilter::Trace);
    components::apply_capture_levels(false);

    let (tx, rx) = mpsc::channel();
    let mut app = App::new(metrics, episodes);
    let handle = thread::spawn(move || app.run(rx));

    (handle, tx)
}
