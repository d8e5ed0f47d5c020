use nalgebra::Vector2;

use crate::{barnes_hut::Rect, body::Body, gravity::Gravity, ForceSolver};

/// Exact pairwise summation, O(n²).
///
/// The reference the Barnes-Hut forces are checked against, and a solver in
/// its own right for small body counts.
#[derive(Copy, Clone, Debug, Default)]
pub struct DirectSummation;

impl DirectSummation {
    /// Net force on `target` from every other active body in `bodies`.
    #[must_use]
    pub fn force_on(target: &Body, bodies: &[Body], gravity: &Gravity) -> Vector2<f64> {
        bodies
            .iter()
            .filter(|other| other.id != target.id && other.is_active())
            .map(|other| {
                gravity.force(&target.position, target.mass, &other.position, other.mass)
            })
            .sum()
    }
}

impl ForceSolver for DirectSummation {
    fn calculate_forces(
        &mut self,
        bodies: &[Body],
        _domain: &Rect,
        gravity: &Gravity,
        forces: &mut [Vector2<f64>],
    ) {
        for (body, force) in bodies.iter().zip(forces.iter_mut()) {
            *force = if body.is_active() {
                Self::force_on(body, bodies, gravity)
            } else {
                Vector2::zeros()
            };
        }
    }
}
