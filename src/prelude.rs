use crate::error::{Result, UrnError};
use core::ops::{Add, Div, Mul, Sub};
use serde::{Deserialize, Serialize};

macro_rules! constrained_f64 {
    ( $name:ident, $closure:tt, $error:expr ) => {
        #[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(try_from = "f64", into = "f64")]
        pub struct $name(f64);

        impl $name {
            pub fn new(x: f64) -> Result<Self> {
                if ($closure)(x) {
                    Ok(Self(x))
                } else {
                    Err(($error)(x))
                }
            }

            pub fn unwrap(self) -> f64 {
                self.0
            }

            pub fn ln(self) -> f64 {
                self.0.ln()
            }
        }

        impl TryFrom<f64> for $name {
            type Error = UrnError;

            fn try_from(x: f64) -> Result<Self> {
                Self::new(x)
            }
        }

        impl From<$name> for f64 {
            fn from(x: $name) -> f64 {
                x.0
            }
        }

        impl Add<f64> for $name {
            type Output = f64;

            fn add(self, other: f64) -> f64 {
                self.0 + other
            }
        }

        impl Add<$name> for f64 {
            type Output = f64;

            fn add(self, other: $name) -> f64 {
                self + other.0
            }
        }

        impl Sub<f64> for $name {
            type Output = f64;

            fn sub(self, other: f64) -> f64 {
                self.0 - other
            }
        }

        impl Sub<$name> for f64 {
            type Output = f64;

            fn sub(self, other: $name) -> f64 {
                self - other.0
            }
        }

        impl Mul<f64> for $name {
            type Output = f64;

            fn mul(self, other: f64) -> f64 {
                self.0 * other
            }
        }

        impl Mul<$name> for f64 {
            type Output = f64;

            fn mul(self, other: $name) -> f64 {
                self * other.0
            }
        }

        impl Div<f64> for $name {
            type Output = f64;

            fn div(self, other: f64) -> f64 {
                self.0 / other
            }
        }

        impl Div<$name> for f64 {
            type Output = f64;

            fn div(self, other: $name) -> f64 {
                self / other.0
            }
        }
    };
}

// NaN fails both comparisons and is rejected.
constrained_f64!(
    Concentration,
    (|x: f64| x > 0.0 && x.is_finite()),
    UrnError::NonPositiveConcentration
);

constrained_f64!(
    Level,
    (|x: f64| x > 0.0 && x < 1.0),
    UrnError::InvalidLevel
);
