use crate::error::{Error, Result};

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

fn validate(rate: f32, vi: f32, vf: f32) -> Result<()> {
    (rate > 0.0 && rate <= 1.0 && vi >= 0.0 && vf >= 0.0)
        .then_some(())
        .ok_or_else(|| {
            Error::InvalidSchedule(format!(
                "expected 0 < rate <= 1 and non-negative values, got rate={rate}, vi={vi}, vf={vf}"
            ))
        })
}

/// v(t) = max(v<sub>i</sub> * r<sup>floor(t/s)</sup>, v<sub>f</sub>) once the first step has
/// passed, v<sub>i</sub> before it
///
/// With `s = 1` this is the value after `t` rounds of `v = max(v * r, v_f)`. A start below the
/// floor is kept until the first step and then lifted to the floor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    rate: f32,
    vi: f32,
    vf: f32,
    step: f32,
}

impl Step {
    pub fn new(rate: f32, vi: f32, vf: f32, step: f32) -> Result<Self> {
        validate(rate, vi, vf)?;
        if step <= 0.0 {
            return Err(Error::InvalidSchedule(format!("step must be positive, got {step}")));
        }
        Ok(Self { rate, vi, vf, step })
    }
}

impl Decay for Step {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf, step } = self;
        let n = (t / step).floor();
        if n < 1.0 {
            return vi;
        }
        (vi * rate.powf(n)).max(vf)
    }
}
