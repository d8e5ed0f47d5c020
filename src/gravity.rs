use nalgebra::Vector2;

use crate::SimulationError;

pub const G: f64 = 0.5;

pub const SOFTENING: f64 = 1e-18;

/// Newtonian attraction with the softening term added to the distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gravity {
    g: f64,
    softening: f64,
}

impl Gravity {
    #[must_use]
    pub fn new(g: f64, softening: f64) -> Self {
        Self { g, softening }
    }

    #[must_use]
    pub fn g(&self) -> f64 {
        self.g
    }

    #[must_use]
    pub fn softening(&self) -> f64 {
        self.softening
    }

    /// Rejects constants that would let a force divide by zero: the constant
    /// must be finite and the squared softening must stay a normal float.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.g.is_finite() {
            return Err(SimulationError::invalid_config(format!(
                "gravitational constant must be finite, got {}",
                self.g
            )));
        }
        if !(self.softening.is_finite() && self.softening * self.softening >= f64::MIN_POSITIVE) {
            return Err(SimulationError::invalid_config(format!(
                "softening {} is too small or not finite",
                self.softening
            )));
        }
        Ok(())
    }

    /// Softened distance between two positions. Never zero for a positive softening.
    #[must_use]
    pub fn distance(&self, position1: &Vector2<f64>, position2: &Vector2<f64>) -> f64 {
        (position2 - position1).norm() + self.softening
    }

    /// Force exerted by mass2 at position2 on mass1 at position1.
    ///
    /// $F = G m_1 m_2 / d^2$, pointing from position1 towards position2.
    #[must_use]
    pub fn force(
        &self,
        position1: &Vector2<f64>,
        mass1: f64,
        position2: &Vector2<f64>,
        mass2: f64,
    ) -> Vector2<f64> {
        let r = position2 - position1;
        let norm = r.norm();
        if norm == 0. {
            return Vector2::zeros();
        }
        let distance = norm + self.softening;
        let magnitude = self.g * mass1 * mass2 / (distance * distance);
        r * (magnitude / distance)
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(G, SOFTENING)
    }
}
