//! Interactive 2D N-body gravity.
//!
//! Forces come from a Barnes-Hut quadtree rebuilt every tick
//! ([`barnes_hut::BarnesHut`]) or from exact pairwise summation
//! ([`direct_summation::DirectSummation`]). Bodies that overlap merge,
//! conserving mass and momentum, and the domain wraps around at its edges.

pub mod barnes_hut;
pub mod body;
pub mod body_creator;
pub mod config;
pub mod csv;
pub mod direct_summation;
mod error;
pub mod gravity;
mod simulation;

pub use barnes_hut::{BarnesHut, QuadTree, Rect};
pub use body::{Body, BodyId, Origin};
pub use config::{SimulationConfig, SolverKind};
pub use direct_summation::DirectSummation;
pub use error::SimulationError;
pub use gravity::Gravity;
pub use simulation::*;

use nalgebra::Vector2;

/// Computes the net force on every body for one tick.
pub trait ForceSolver {
    /// Write the force on `bodies[i]` into `forces[i]`.
    ///
    /// Depleted bodies neither exert nor feel force. Implementations only read
    /// `bodies`; nothing is applied until all forces are known.
    fn calculate_forces(
        &mut self,
        bodies: &[Body],
        domain: &Rect,
        gravity: &Gravity,
        forces: &mut [Vector2<f64>],
    );
}

impl<S: ForceSolver + ?Sized> ForceSolver for Box<S> {
    fn calculate_forces(
        &mut self,
        bodies: &[Body],
        domain: &Rect,
        gravity: &Gravity,
        forces: &mut [Vector2<f64>],
    ) {
        (**self).calculate_forces(bodies, domain, gravity, forces);
    }
}
