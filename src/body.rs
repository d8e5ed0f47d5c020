use std::fmt;

use nalgebra::Vector2;

use crate::SimulationError;

/// Stable identity of a body across ticks.
///
/// Two bodies may share a position, so the force and collision code compares
/// ids instead of values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a body came from. Carried for the renderer, never read by the physics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Origin {
    #[default]
    Seeded,
    Spawned,
}

/// A point mass with a visual radius.
///
/// A mass of exactly zero marks a body absorbed in a merge during the current
/// tick; it takes no further part in the tick and is pruned at its end.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub mass: f64,
    pub radius: f64,
    pub origin: Origin,
}

impl Body {
    /// Create an active body, rejecting states that would break the
    /// positive-mass invariant or poison the force sums with NaN.
    pub fn new(
        id: BodyId,
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        mass: f64,
        radius: f64,
    ) -> Result<Self, SimulationError> {
        if !mass.is_finite() || mass <= 0. {
            return Err(SimulationError::invalid_body(format!(
                "mass must be positive and finite, got {mass}"
            )));
        }
        if !radius.is_finite() || radius < 0. {
            return Err(SimulationError::invalid_body(format!(
                "radius must be non-negative and finite, got {radius}"
            )));
        }
        if !position.iter().all(|x| x.is_finite()) {
            return Err(SimulationError::invalid_body("position is not finite"));
        }
        if !velocity.iter().all(|v| v.is_finite()) {
            return Err(SimulationError::invalid_body("velocity is not finite"));
        }

        Ok(Self {
            id,
            position,
            velocity,
            mass,
            radius,
            origin: Origin::default(),
        })
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mass > 0.
    }

    #[must_use]
    pub fn momentum(&self) -> Vector2<f64> {
        self.velocity * self.mass
    }

    /// Accumulate the acceleration `force / mass` into the velocity.
    pub fn apply_force(&mut self, force: Vector2<f64>) {
        self.velocity += force / self.mass;
    }

    /// Advance by one tick and wrap into `[0, extent)` on both axes.
    pub fn integrate(&mut self, extent: &Vector2<f64>) {
        self.position += self.velocity;
        self.wrap(extent);
    }

    /// Bring the position back into `[0, extent)` on both axes.
    pub fn wrap(&mut self, extent: &Vector2<f64>) {
        self.position.x = wrap(self.position.x, extent.x);
        self.position.y = wrap(self.position.y, extent.y);
    }

    /// Centers closer than the sum of the radii.
    #[must_use]
    pub fn collides_with(&self, other: &Body) -> bool {
        (self.position - other.position).norm() < self.radius + other.radius
    }

    /// Absorb `other`, conserving mass and momentum. `other` is left depleted.
    pub fn merge_with(&mut self, other: &mut Body) {
        let total_mass = self.mass + other.mass;
        self.velocity = (self.momentum() + other.momentum()) / total_mass;
        self.radius = merged_radius(self.radius, other.radius, total_mass);
        self.mass = total_mass;
        other.mass = 0.;
    }
}

/// Radius after a merger: `floor(sqrt(r1 + r2 + total_mass))`.
///
/// A visual heuristic, not a conservation law; mass and radius are mixed on
/// purpose and the result is truncated to whole pixels.
#[must_use]
pub fn merged_radius(radius1: f64, radius2: f64, total_mass: f64) -> f64 {
    (radius1 + radius2 + total_mass).sqrt().floor()
}

/// `rem_euclid` can round up to `extent` for tiny negative inputs.
fn wrap(x: f64, extent: f64) -> f64 {
    let wrapped = x.rem_euclid(extent);
    if wrapped >= extent {
        0.
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn body(id: u64, x: f64, y: f64, mass: f64, radius: f64) -> Body {
        Body::new(BodyId(id), Vector2::new(x, y), Vector2::zeros(), mass, radius).unwrap()
    }

    #[test]
    fn rejects_non_positive_mass() {
        for mass in [0., -1., f64::NAN, f64::INFINITY] {
            let res = Body::new(BodyId(0), Vector2::zeros(), Vector2::zeros(), mass, 1.);
            assert!(matches!(res, Err(SimulationError::InvalidBody { .. })));
        }
    }

    #[test]
    fn rejects_non_finite_state() {
        let nan = Vector2::new(f64::NAN, 0.);
        assert!(Body::new(BodyId(0), nan, Vector2::zeros(), 1., 1.).is_err());
        assert!(Body::new(BodyId(0), Vector2::zeros(), nan, 1., 1.).is_err());
        assert!(Body::new(BodyId(0), Vector2::zeros(), Vector2::zeros(), 1., -1.).is_err());
    }

    #[test]
    fn apply_force_changes_velocity_only() {
        let mut b = body(0, 10., 10., 4., 1.);
        b.apply_force(Vector2::new(8., -4.));

        assert_abs_diff_eq!(b.velocity, Vector2::new(2., -1.));
        assert_abs_diff_eq!(b.position, Vector2::new(10., 10.));
    }

    #[test]
    fn integrate_wraps_both_axes() {
        let extent = Vector2::new(800., 600.);
        let mut b = body(0, 795., 2., 1., 1.);
        b.velocity = Vector2::new(10., -5.);
        b.integrate(&extent);

        assert_abs_diff_eq!(b.position, Vector2::new(5., 597.), epsilon = 1e-9);
    }

    #[test]
    fn integrate_stays_in_domain() {
        let extent = Vector2::new(800., 600.);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let mut b = body(0, rng.gen_range(0.0..800.), rng.gen_range(0.0..600.), 1., 1.);
            let scale = 10f64.powi(rng.gen_range(-20..12));
            b.velocity = Vector2::new(
                rng.gen_range(-1.0..1.0) * scale,
                rng.gen_range(-1.0..1.0) * scale,
            );
            b.integrate(&extent);

            assert!((0. ..800.).contains(&b.position.x), "{}", b.position.x);
            assert!((0. ..600.).contains(&b.position.y), "{}", b.position.y);
        }
    }

    #[test]
    fn tiny_negative_position_wraps_below_extent() {
        let extent = Vector2::new(800., 600.);
        let mut b = body(0, 0., 0., 1., 1.);
        b.velocity = Vector2::new(-1e-300, -1e-17);
        b.integrate(&extent);

        assert!(b.position.x < 800.);
        assert!(b.position.y < 600.);
    }

    #[test]
    fn collision_is_strict_and_symmetric() {
        let a = body(0, 0., 0., 1., 5.);
        let touching = body(1, 10., 0., 1., 5.);
        let overlapping = body(2, 9.9, 0., 1., 5.);

        assert!(!a.collides_with(&touching));
        assert!(a.collides_with(&overlapping));
        assert!(overlapping.collides_with(&a));
    }

    #[test]
    fn merge_conserves_mass_and_momentum() {
        let mut a = body(0, 0., 0., 3., 5.);
        a.velocity = Vector2::new(1., 2.);
        let mut b = body(1, 1., 0., 1., 5.);
        b.velocity = Vector2::new(-3., 6.);
        let momentum = a.momentum() + b.momentum();

        a.merge_with(&mut b);

        assert_abs_diff_eq!(a.mass, 4.);
        assert_abs_diff_eq!(a.velocity, Vector2::new(0., 3.));
        assert_abs_diff_eq!(a.momentum(), momentum);
        assert_eq!(b.mass, 0.);
        assert!(!b.is_active());
    }

    /// Pins the cosmetic radius heuristic; not a physical law.
    #[test]
    fn merged_radius_is_pinned() {
        assert_eq!(merged_radius(5., 5., 20.), 5.);
        assert_eq!(merged_radius(10., 6., 20.), 6.);
        assert_eq!(merged_radius(5., 9., 35.), 7.);

        let mut a = body(0, 0., 0., 10., 5.);
        let mut b = body(1, 1., 0., 10., 5.);
        a.merge_with(&mut b);
        assert_eq!(a.radius, 5.);
    }
}
