use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::VariantArray;

use crate::{
    error::{Error, Result},
    exploration::Choice,
    grid::{Action, NUM_ACTIONS},
    state::{StateKey, NUM_STATES},
};

/// Estimated value of each action in one state, indexed by [`Action::index`]
pub type ActionValues = [f32; NUM_ACTIONS];

/// Serialized form: rendered state key to action values
type Record = BTreeMap<String, Vec<f32>>;

/// Action-value table over the fixed set of [`StateKey`]s
///
/// Every state is either unobserved or holds exactly [`NUM_ACTIONS`] values, zeroed when first
/// touched. Only observed states are serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Record", into = "Record")]
pub struct QTable {
    rows: [Option<ActionValues>; NUM_STATES],
}

impl Default for QTable {
    fn default() -> Self {
        Self::new()
    }
}

impl QTable {
    pub fn new() -> Self {
        Self {
            rows: [None; NUM_STATES],
        }
    }

    /// Number of observed states
    pub fn len(&self) -> usize {
        self.rows.iter().filter(|r| r.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Option::is_none)
    }

    /// Forget every observed state
    pub fn clear(&mut self) {
        self.rows = [None; NUM_STATES];
    }

    pub fn get(&self, state: StateKey) -> Option<&ActionValues> {
        self.rows[state.index()].as_ref()
    }

    /// Values for `state`, materializing a zero row if it has not been observed yet
    pub fn ensure(&mut self, state: StateKey) -> &mut ActionValues {
        self.rows[state.index()].get_or_insert([0.0; NUM_ACTIONS])
    }

    /// Observed states and their values in index order
    pub fn iter(&self) -> impl Iterator<Item = (StateKey, &ActionValues)> {
        self.rows.iter().enumerate().filter_map(|(i, row)| {
            let values = row.as_ref()?;
            StateKey::from_index(i).map(|key| (key, values))
        })
    }

    /// Highest action value in `state`, `0.0` if unobserved
    pub fn max_value(&self, state: StateKey) -> f32 {
        self.get(state)
            .map(|values| values.iter().copied().fold(f32::NEG_INFINITY, f32::max))
            .unwrap_or(0.0)
    }

    /// Greedy action in `state`
    ///
    /// Scans left to right and keeps the first strictly greater value, so ties go to the lowest
    /// index and an unobserved or all-equal row yields [`Action::Up`].
    pub fn best_action(&self, state: StateKey) -> Action {
        let Some(values) = self.get(state) else {
            return Action::Up;
        };
        let mut best = Action::Up;
        let mut best_value = f32::NEG_INFINITY;
        for (&action, &value) in Action::VARIANTS.iter().zip(values) {
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        best
    }

    /// Epsilon greedy action selection over the row for `state`
    pub fn choose_action(&mut self, state: StateKey, epsilon: f32, rng: &mut impl Rng) -> Action {
        self.ensure(state);
        match Choice::roll(epsilon, rng) {
            Choice::Explore => Action::random(rng),
            Choice::Exploit => self.best_action(state),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

impl TryFrom<Record> for QTable {
    type Error = Error;

    fn try_from(record: Record) -> Result<Self> {
        let mut table = QTable::new();
        for (key, values) in record {
            let state: StateKey = key.parse()?;
            let values: ActionValues = values.try_into().map_err(|v: Vec<f32>| {
                Error::InvalidRecord(format!(
                    "state `{key}` has {} action values, expected {NUM_ACTIONS}",
                    v.len()
                ))
            })?;
            table.rows[state.index()] = Some(values);
        }
        Ok(table)
    }
}

impl From<QTable> for Record {
    fn from(table: QTable) -> Self {
        table
            .iter()
            .map(|(state, values)| (state.to_string(), values.to_vec()))
            .collect()
    }
}
