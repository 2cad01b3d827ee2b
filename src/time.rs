use std::ops::{Add, AddAssign, Sub};

use crate::units::{Bytes, BytesPerSec};

macro_rules! time_unit {
    ($name: ident) => {
        #[derive(
            Debug,
            Default,
            Copy,
            Clone,
            PartialOrd,
            PartialEq,
            derive_more::Add,
            derive_more::Display,
            derive_more::FromStr,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(f64);

        impl $name {
            pub const ZERO: $name = Self::new(0.0);
            pub const INFINITY: $name = Self::new(f64::INFINITY);
            pub const NEG_INFINITY: $name = Self::new(f64::NEG_INFINITY);

            pub const fn new(secs: f64) -> Self {
                Self(secs)
            }

            pub const fn into_f64(self) -> f64 {
                self.0
            }

            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            pub fn scale_by(self, val: f64) -> Self {
                Self(self.0 * val)
            }
        }
    };
}

// Absolute simulated time, in dilated seconds.
time_unit!(Time);

impl Time {
    pub fn max(self, other: Time) -> Time {
        Self(self.0.max(other.0))
    }
}

// A span of simulated time, in dilated seconds.
time_unit!(Delta);

impl Delta {
    /// Bytes moved over this span at `rate`.
    pub fn at(self, rate: BytesPerSec) -> Bytes {
        rate.width(self)
    }
}

impl From<f64> for Time {
    fn from(secs: f64) -> Self {
        Self(secs)
    }
}

impl From<f64> for Delta {
    fn from(secs: f64) -> Self {
        Self(secs)
    }
}

impl Add<Delta> for Time {
    type Output = Time;

    fn add(self, rhs: Delta) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub<Delta> for Time {
    type Output = Time;

    fn sub(self, rhs: Delta) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub<Time> for Time {
    type Output = Delta;

    fn sub(self, rhs: Time) -> Self::Output {
        Delta::new(self.0 - rhs.0)
    }
}

impl AddAssign<Delta> for Time {
    fn add_assign(&mut self, rhs: Delta) {
        *self = Self(self.0 + rhs.0)
    }
}
