pub mod learner;
pub mod q_table;

pub use learner::{Exp, Learner, LearnerConfig};
pub use q_table::{ActionValues, QTable};
