//! Construction-time configuration.
//!
//! Every field has a default, so a YAML file only needs the values it changes:
//!
//! ```yaml
//! width: 1024.0
//! height: 768.0
//! theta: 0.3
//! initial_bodies: 200
//! solver: direct_summation
//! seed: 42
//! ```

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::{
    barnes_hut::{BarnesHut, Rect},
    direct_summation::DirectSummation,
    gravity::Gravity,
    ForceSolver, SimulationError,
};

/// How forces are evaluated each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    #[default]
    BarnesHut,
    DirectSummation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Domain extent, also the wrap boundary.
    pub width: f64,
    pub height: f64,
    pub gravitational_constant: f64,
    /// Barnes-Hut opening angle.
    pub theta: f64,
    /// Added to every distance. Its square must stay a normal float.
    pub softening: f64,
    pub solver: SolverKind,
    /// Tick rate of the external clock.
    pub fps: u32,

    pub initial_bodies: usize,
    /// Seeded mass, `[low, high)`.
    pub mass_range: (f64, f64),
    /// Seeded radius in whole pixels, `[low, high]`.
    pub radius_range: (u32, u32),
    /// Seeded bodies keep this far from the edges, on whole pixels.
    pub spawn_margin: f64,
    /// Drag length to spawn velocity.
    pub drag_velocity_scale: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 800.,
            height: 600.,
            gravitational_constant: crate::gravity::G,
            theta: crate::barnes_hut::THETA,
            softening: crate::gravity::SOFTENING,
            solver: SolverKind::default(),
            fps: 60,
            initial_bodies: 10,
            mass_range: (10., 20.),
            radius_range: (5, 10),
            spawn_margin: 100.,
            drag_velocity_scale: 0.1,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0. {
                Ok(())
            } else {
                Err(SimulationError::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )))
            }
        };

        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("theta", self.theta)?;
        positive("minimum mass", self.mass_range.0)?;
        self.gravity().validate()?;
        if !(self.mass_range.0 < self.mass_range.1) || !self.mass_range.1.is_finite() {
            return Err(SimulationError::invalid_config(format!(
                "mass range {:?} is empty",
                self.mass_range
            )));
        }
        if self.radius_range.0 > self.radius_range.1 {
            return Err(SimulationError::invalid_config(format!(
                "radius range {:?} is empty",
                self.radius_range
            )));
        }
        let whole_pixels =
            |extent: f64| self.spawn_margin.ceil() <= (extent - self.spawn_margin).floor();
        if !(self.spawn_margin >= 0.) || !whole_pixels(self.width) || !whole_pixels(self.height) {
            return Err(SimulationError::invalid_config(format!(
                "spawn margin {} does not fit the domain",
                self.spawn_margin
            )));
        }
        if !self.drag_velocity_scale.is_finite() {
            return Err(SimulationError::invalid_config(
                "drag velocity scale must be finite",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn extent(&self) -> Vector2<f64> {
        Vector2::new(self.width, self.height)
    }

    #[must_use]
    pub fn domain(&self) -> Rect {
        Rect::from_extent(&self.extent())
    }

    #[must_use]
    pub fn gravity(&self) -> Gravity {
        Gravity::new(self.gravitational_constant, self.softening)
    }

    /// The solver named by [`Self::solver`].
    #[must_use]
    pub fn force_solver(&self) -> Box<dyn ForceSolver> {
        match self.solver {
            SolverKind::BarnesHut => Box::new(BarnesHut::new(self.theta)),
            SolverKind::DirectSummation => Box::new(DirectSummation),
        }
    }
}
