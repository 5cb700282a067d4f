use std::{fmt, str::FromStr};

use crate::{
    error::{Error, Result},
    grid::Pos,
};

/// Number of distinct [`StateKey`]s: 3 signs of dx, 3 signs of dy, 3 distance buckets
pub const NUM_STATES: usize = 27;

/// Coarse Manhattan distance between a pursuer and the target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DistanceBucket {
    /// distance 0 to 2
    Near = 0,
    /// distance 3 to 5
    Mid = 1,
    /// distance 6 and up
    Far = 2,
}

impl DistanceBucket {
    pub fn from_distance(dist: i32) -> Self {
        if dist <= 2 {
            Self::Near
        } else if dist <= 5 {
            Self::Mid
        } else {
            Self::Far
        }
    }

    fn symbol(self) -> char {
        match self {
            Self::Near => 'N',
            Self::Mid => 'M',
            Self::Far => 'F',
        }
    }

    fn from_symbol(c: &str) -> Option<Self> {
        match c {
            "N" => Some(Self::Near),
            "M" => Some(Self::Mid),
            "F" => Some(Self::Far),
            _ => None,
        }
    }
}

/// Discretized relative geometry between a pursuer and the target
///
/// Depends only on the offset between the two positions, so one table generalizes across
/// levels and board layouts. Renders as `"sdx,sdy,B"`, e.g. `"-1,-1,F"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    sdx: i8,
    sdy: i8,
    bucket: DistanceBucket,
}

impl StateKey {
    /// Build a key from its components
    ///
    /// **Panics** if `sdx` or `sdy` is not a sign in `{-1, 0, 1}`
    pub fn new(sdx: i8, sdy: i8, bucket: DistanceBucket) -> Self {
        assert!(
            (-1..=1).contains(&sdx) && (-1..=1).contains(&sdy),
            "State signs must be in {{-1, 0, 1}}."
        );
        Self { sdx, sdy, bucket }
    }

    pub fn sdx(&self) -> i8 {
        self.sdx
    }

    pub fn sdy(&self) -> i8 {
        self.sdy
    }

    pub fn bucket(&self) -> DistanceBucket {
        self.bucket
    }

    /// Dense index in `0..NUM_STATES`
    pub fn index(&self) -> usize {
        ((self.sdx + 1) as usize * 3 + (self.sdy + 1) as usize) * 3 + self.bucket as usize
    }

    /// Inverse of [`StateKey::index`]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= NUM_STATES {
            return None;
        }
        let bucket = match index % 3 {
            0 => DistanceBucket::Near,
            1 => DistanceBucket::Mid,
            _ => DistanceBucket::Far,
        };
        let sdy = ((index / 3) % 3) as i8 - 1;
        let sdx = (index / 9) as i8 - 1;
        Some(Self { sdx, sdy, bucket })
    }
}

/// Map a pursuer position and a target position to a [`StateKey`]
pub fn encode(agent: Pos, target: Pos) -> StateKey {
    let dx = target.x - agent.x;
    let dy = target.y - agent.y;
    StateKey {
        sdx: dx.signum() as i8,
        sdy: dy.signum() as i8,
        bucket: DistanceBucket::from_distance(dx.abs() + dy.abs()),
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.sdx, self.sdy, self.bucket.symbol())
    }
}

impl FromStr for StateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidRecord(format!("malformed state key `{s}`"));
        let mut parts = s.split(',');
        let (Some(sdx), Some(sdy), Some(bucket), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let sign = |p: &str| p.parse::<i8>().ok().filter(|v| (-1..=1).contains(v));
        Ok(Self {
            sdx: sign(sdx).ok_or_else(invalid)?,
            sdy: sign(sdy).ok_or_else(invalid)?,
            bucket: DistanceBucket::from_symbol(bucket).ok_or_else(invalid)?,
        })
    }
}
