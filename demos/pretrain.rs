use std::{env, time::Duration};

use pursuit_rl::{
    game::{Session, Status, Ticker},
    grid::{Action, Pos},
    store::FileStore,
    viz, Agent, Config,
};
use strum::IntoEnumIterator;

const MAX_TICKS: u32 = 400;

/// Greedy target: step toward the nearest collectible
fn target_move(target: Pos, collectibles: &[Pos]) -> Action {
    let Some(goal) = collectibles.iter().min_by_key(|c| target.manhattan(**c)) else {
        return Action::Stay;
    };
    Action::iter()
        .min_by_key(|a| target.offset(*a).manhattan(*goal))
        .unwrap_or(Action::Stay)
}

fn main() {
    let config = match env::args().nth(1) {
        Some(path) => Config::from_path(path).unwrap(),
        None => Config::default(),
    };
    let episodes = config.trainer.episodes;
    let (cols, rows) = (config.grid.cols, config.grid.rows);

    let mut agent = Agent::new(config, FileStore::new("target/pursuit")).unwrap();

    let (handle, tx) = viz::init(&["reward", "steps", "epsilon"], episodes);
    let summary = agent.pretrain_with(episodes, |report| {
        let _ = tx.send(viz::Update {
            episode: report.episode + 1,
            data: vec![
                report.reward as f64,
                report.steps as f64,
                report.epsilon as f64,
            ],
        });
    });
    drop(tx);
    handle.join().unwrap().unwrap();

    println!(
        "Pretrained {} episodes: {} captures, {} boards cleared, {:.1} mean steps, {} states",
        summary.episodes,
        summary.captures,
        summary.cleared,
        summary.mean_steps(),
        agent.table().len()
    );

    let mut session = Session::new(cols, rows);
    let mut ticker = Ticker::new(Duration::from_millis(5));
    ticker.start();

    let mut ticks = 0;
    while session.status() == Status::Playing && ticks < MAX_TICKS && ticker.wait() {
        let world = session.world();
        let action = target_move(world.target, &world.collectibles);
        session.move_target(action, &mut agent);
        session.tick(&mut agent);
        ticks += 1;
    }
    ticker.stop();

    println!(
        "Live play after {ticks} ticks: {:?}, level {}, score {}, lives {}, exploration {:.3}",
        session.status(),
        session.level(),
        session.score(),
        session.lives(),
        agent.exploration_rate()
    );
}
