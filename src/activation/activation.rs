use serde::{Deserialize, Serialize};

/// Slope of `LeakyReLU` for negative inputs.
pub const LEAKY_SLOPE: f64 = 0.01;

/// Scalar activation functions, each paired with its derivative.
///
/// A layer's activation is applied elementwise to its pre-activation sums
/// `z = W·a + b`; the derivative is evaluated at the same `z` during
/// backpropagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Identity,
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "leaky_relu")]
    LeakyReLU,
    /// Softplus, `ln(1 + e^x)`.
    #[serde(rename = "smooth_relu")]
    SmoothReLU,
    Tanh,
}

impl Activation {
    pub const ALL: [Activation; 6] = [
        Activation::Identity,
        Activation::Sigmoid,
        Activation::ReLU,
        Activation::LeakyReLU,
        Activation::SmoothReLU,
        Activation::Tanh,
    ];

    pub fn function(&self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::Sigmoid => sigmoid(x),
            Activation::ReLU => x.max(0.0),
            Activation::LeakyReLU => (LEAKY_SLOPE * x).max(x),
            Activation::SmoothReLU => x.max(0.0) + (-x.abs()).exp().ln_1p(),
            Activation::Tanh => x.tanh(),
        }
    }

    /// Derivative of `function` at `x`.
    ///
    /// The rectifiers report a slope of 1 at exactly zero.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Activation::Identity => 1.0,
            Activation::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            Activation::ReLU => if x < 0.0 { 0.0 } else { 1.0 },
            Activation::LeakyReLU => if x < 0.0 { LEAKY_SLOPE } else { 1.0 },
            Activation::SmoothReLU => sigmoid(x),
            Activation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn known_values() {
        assert_eq!(Activation::Identity.function(-3.5), -3.5);
        assert_relative_eq!(Activation::Sigmoid.function(0.0), 0.5);
        assert_eq!(Activation::ReLU.function(-2.0), 0.0);
        assert_eq!(Activation::ReLU.function(2.0), 2.0);
        assert_relative_eq!(Activation::LeakyReLU.function(-2.0), -0.02);
        assert_relative_eq!(Activation::SmoothReLU.function(0.0), 2f64.ln());
        assert_relative_eq!(Activation::Tanh.function(1.0), 1f64.tanh());
    }

    #[test]
    fn derivatives_at_the_kink() {
        assert_eq!(Activation::ReLU.derivative(0.0), 1.0);
        assert_eq!(Activation::ReLU.derivative(-1e-9), 0.0);
        assert_eq!(Activation::LeakyReLU.derivative(0.0), 1.0);
        assert_eq!(Activation::LeakyReLU.derivative(-4.0), LEAKY_SLOPE);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let h = 1e-6;
        for activation in Activation::ALL {
            for &x in &[-2.3, -0.7, 0.4, 1.9] {
                let numeric = (activation.function(x + h) - activation.function(x - h)) / (2.0 * h);
                assert_abs_diff_eq!(activation.derivative(x), numeric, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn saturated_inputs_stay_finite() {
        for activation in [Activation::Sigmoid, Activation::Tanh, Activation::SmoothReLU] {
            for &x in &[-800.0, 800.0] {
                assert!(activation.function(x).is_finite());
                assert!(activation.derivative(x).is_finite());
            }
        }
        assert_relative_eq!(Activation::SmoothReLU.function(-50.0), (-50f64).exp(), max_relative = 1e-9);
        assert_relative_eq!(Activation::SmoothReLU.function(800.0), 800.0);
        assert_relative_eq!(Activation::SmoothReLU.function(0.0), 2f64.ln());
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&Activation::ALL).unwrap();
        assert_eq!(
            json,
            r#"["identity","sigmoid","relu","leaky_relu","smooth_relu","tanh"]"#
        );
        let back: Vec<Activation> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Activation::ALL.to_vec());
    }
}
