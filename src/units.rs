use crate::time::Delta;

macro_rules! unit {
    ($name: ident) => {
        #[derive(
            Debug,
            Default,
            Copy,
            Clone,
            PartialOrd,
            PartialEq,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::SubAssign,
            derive_more::Sum,
            derive_more::Display,
            derive_more::FromStr,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(f64);

        impl $name {
            pub const ZERO: $name = Self::new(0.0);

            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            pub const fn into_f64(self) -> f64 {
                self.0
            }

            pub fn scale_by(self, val: f64) -> Self {
                Self(self.0 * val)
            }
        }

        impl From<f64> for $name {
            fn from(val: f64) -> Self {
                Self(val)
            }
        }
    };
}

unit!(Bytes);
unit!(BytesPerSec);

impl BytesPerSec {
    /// Returns `true` if a transfer at this rate can make progress.
    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }

    /// Time needed to move `size` at this rate.
    ///
    /// This is plain floating-point division: a zero rate yields a signed infinity (or NaN for a
    /// zero size), and a negative rate yields a negative span.
    pub fn length(&self, size: Bytes) -> Delta {
        Delta::new(size.0 / self.0)
    }

    /// Bytes moved at this rate over `delta`.
    pub fn width(&self, delta: Delta) -> Bytes {
        Bytes::new(self.0 * delta.into_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_length() {
        let rate = BytesPerSec::new(100.0);
        let size = Bytes::new(1_000.0);
        assert_eq!(rate.length(size), Delta::new(10.0));
    }

    #[test]
    fn rate_width() {
        let rate = BytesPerSec::new(100.0);
        let delta = Delta::new(2.5);
        assert_eq!(rate.width(delta), Bytes::new(250.0));
    }

    #[test]
    fn zero_rate_length_is_infinite() {
        let rate = BytesPerSec::ZERO;
        assert_eq!(rate.length(Bytes::new(1.0)).into_f64(), f64::INFINITY);
        assert!(!rate.is_positive());
    }

    #[test]
    fn bytes_sum() {
        let total: Bytes = [1.0, 2.0, 3.5].into_iter().map(Bytes::new).sum();
        assert_eq!(total, Bytes::new(6.5));
    }
}
