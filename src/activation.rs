use std::fmt;
use std::str::FromStr;

use num::Float;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;

/// Builtin activation functions.
///
/// [`Activation::differentiate`] takes the raw pre-activation value `x`,
/// not the activated output `f(x)`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    Identity,
    /// 1 for `x >= 0`, 0 otherwise. Its derivative is 0 everywhere, so
    /// training never changes the weights of a network using it.
    BinaryStep,
    #[default]
    Sigmoid,
    Tanh,
    ArcTan,
    Softsign,
    Relu,
    LeakyRelu,
    Sinusoid,
    Sinc,
    Gaussian,
}

const LEAKY_SLOPE: f64 = 0.01;

#[inline]
fn cast<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

#[inline]
fn sigmoid<T: Float>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

impl Activation {
    pub const ALL: [Activation; 11] = [
        Activation::Identity,
        Activation::BinaryStep,
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::ArcTan,
        Activation::Softsign,
        Activation::Relu,
        Activation::LeakyRelu,
        Activation::Sinusoid,
        Activation::Sinc,
        Activation::Gaussian,
    ];

    pub fn name(&self) -> &'static str {
        use Activation::*;

        match self {
            Identity => "identity",
            BinaryStep => "binary-step",
            Sigmoid => "sigmoid",
            Tanh => "tanh",
            ArcTan => "arc-tan",
            Softsign => "softsign",
            Relu => "relu",
            LeakyRelu => "leaky-relu",
            Sinusoid => "sinusoid",
            Sinc => "sinc",
            Gaussian => "gaussian",
        }
    }

    /// Activation function.
    pub fn activate<T: Float>(&self, x: T) -> T {
        use Activation::*;

        match self {
            Identity => x,
            BinaryStep => {
                if x < T::zero() {
                    T::zero()
                } else {
                    T::one()
                }
            }
            Sigmoid => sigmoid(x),
            Tanh => x.tanh(),
            ArcTan => x.atan(),
            Softsign => x / (T::one() + x.abs()),
            Relu => {
                if x < T::zero() {
                    T::zero()
                } else {
                    x
                }
            }
            LeakyRelu => {
                if x < T::zero() {
                    cast::<T>(LEAKY_SLOPE) * x
                } else {
                    x
                }
            }
            Sinusoid => x.sin(),
            Sinc => {
                if x == T::zero() {
                    T::one()
                } else {
                    x.sin() / x
                }
            }
            Gaussian => (-x * x).exp(),
        }
    }

    /// Derivative function, evaluated at the pre-activation value `x`.
    pub fn differentiate<T: Float>(&self, x: T) -> T {
        use Activation::*;

        match self {
            Identity => T::one(),
            BinaryStep => T::zero(),
            Sigmoid => {
                let f = sigmoid(x);
                f * (T::one() - f)
            }
            Tanh => T::one() - x.tanh().powi(2),
            ArcTan => T::one() / (x * x + T::one()),
            Softsign => T::one() / (T::one() + x.abs()).powi(2),
            Relu => {
                if x < T::zero() {
                    T::zero()
                } else {
                    T::one()
                }
            }
            LeakyRelu => {
                if x < T::zero() {
                    cast(LEAKY_SLOPE)
                } else {
                    T::one()
                }
            }
            Sinusoid => x.cos(),
            Sinc => {
                if x == T::zero() {
                    T::zero()
                } else {
                    x.cos() / x - x.sin() / (x * x)
                }
            }
            Gaussian => cast::<T>(-2.0) * x * (-x * x).exp(),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activation::ALL
            .into_iter()
            .find(|activation| activation.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_argument(format!("unknown activation function `{s}`")))
    }
}
