mod quadtree;

pub use quadtree::*;

use nalgebra::Vector2;

use crate::{body::Body, gravity::Gravity, ForceSolver};

/// Axis-aligned rectangle, half-open: `min <= p < max` on both axes.
///
/// Stored by corners so that the four quadrants partition it exactly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    min: Vector2<f64>,
    max: Vector2<f64>,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min: Vector2::new(x, y),
            max: Vector2::new(x + width, y + height),
        }
    }

    /// The domain `[0, extent.x) x [0, extent.y)`.
    #[must_use]
    pub fn from_extent(extent: &Vector2<f64>) -> Self {
        Self::new(0., 0., extent.x, extent.y)
    }

    #[must_use]
    pub fn min(&self) -> &Vector2<f64> {
        &self.min
    }

    #[must_use]
    pub fn max(&self) -> &Vector2<f64> {
        &self.max
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Vector2<f64> {
        (self.min + self.max) / 2.
    }

    #[must_use]
    pub fn contains(&self, position: &Vector2<f64>) -> bool {
        self.min.x <= position.x
            && position.x < self.max.x
            && self.min.y <= position.y
            && position.y < self.max.y
    }

    /// One of the four equal sub-rectangles. y grows downward, so north is `min.y`.
    #[must_use]
    pub fn quadrant(&self, quadrant: Quadrant) -> Self {
        let mid = self.center();
        match quadrant {
            Quadrant::NorthWest => Self {
                min: self.min,
                max: mid,
            },
            Quadrant::NorthEast => Self {
                min: Vector2::new(mid.x, self.min.y),
                max: Vector2::new(self.max.x, mid.y),
            },
            Quadrant::SouthWest => Self {
                min: Vector2::new(self.min.x, mid.y),
                max: Vector2::new(mid.x, self.max.y),
            },
            Quadrant::SouthEast => Self {
                min: mid,
                max: self.max,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    /// Insertion order of the children.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Position of this quadrant in a node's children.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Quadrant::NorthWest => 0,
            Quadrant::NorthEast => 1,
            Quadrant::SouthWest => 2,
            Quadrant::SouthEast => 3,
        }
    }
}

pub const THETA: f64 = 0.5;

/// Barnes-Hut force evaluation over one quadtree shared by all bodies of a tick.
#[derive(Clone, Debug)]
pub struct BarnesHut {
    theta: f64,
    tree: Option<QuadTree>,
}

impl BarnesHut {
    /// `theta` is the opening angle; smaller is more accurate and slower.
    #[must_use]
    pub fn new(theta: f64) -> Self {
        Self { theta, tree: None }
    }

    #[must_use]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// The tree built during the last force evaluation.
    #[must_use]
    pub fn tree(&self) -> Option<&QuadTree> {
        self.tree.as_ref()
    }
}

impl Default for BarnesHut {
    fn default() -> Self {
        Self::new(THETA)
    }
}

impl ForceSolver for BarnesHut {
    fn calculate_forces(
        &mut self,
        bodies: &[Body],
        domain: &Rect,
        gravity: &Gravity,
        forces: &mut [Vector2<f64>],
    ) {
        let tree = self.tree.get_or_insert_with(|| QuadTree::new(*domain));
        tree.reset(*domain);
        tree.insert_all(bodies);

        // the tree is complete and read-only from here on
        let tree: &QuadTree = tree;
        for (body, force) in bodies.iter().zip(forces.iter_mut()) {
            *force = if body.is_active() {
                tree.calculate_force(body, self.theta, gravity)
            } else {
                Vector2::zeros()
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{body::BodyId, direct_summation::DirectSummation};

    #[test]
    fn quadrants_partition_rect() {
        let rect = Rect::new(0., 0., 800., 600.);
        let mid = rect.center();
        assert_abs_diff_eq!(mid, Vector2::new(400., 300.));

        for p in [
            Vector2::new(0., 0.),
            Vector2::new(399.999, 299.999),
            Vector2::new(400., 0.),
            Vector2::new(0., 300.),
            Vector2::new(400., 300.),
            Vector2::new(799.9, 599.9),
        ] {
            let hits = Quadrant::ALL
                .iter()
                .filter(|&&q| rect.quadrant(q).contains(&p))
                .count();
            assert_eq!(hits, 1, "{p:?}");
        }

        assert_eq!(
            rect.quadrant(Quadrant::NorthEast),
            Rect::new(400., 0., 400., 300.)
        );
        assert_eq!(
            rect.quadrant(Quadrant::SouthWest),
            Rect::new(0., 300., 400., 300.)
        );
    }

    #[test]
    fn symmetry() {
        let bodies = vec![
            Body::new(BodyId(0), Vector2::new(100., 300.), Vector2::zeros(), 1e6, 1.).unwrap(),
            Body::new(BodyId(1), Vector2::new(700., 300.), Vector2::zeros(), 1e6, 1.).unwrap(),
        ];
        let mut forces = vec![Vector2::zeros(); 2];

        let mut bh = BarnesHut::new(0.);
        bh.calculate_forces(
            &bodies,
            &Rect::new(0., 0., 800., 600.),
            &Gravity::default(),
            &mut forces,
        );

        assert!(forces[0].x > 0.);
        assert_abs_diff_eq!(forces[0], -forces[1]);
    }

    #[test]
    fn reuses_tree_between_calls() {
        let domain = Rect::new(0., 0., 800., 600.);
        let gravity = Gravity::default();
        let mut bodies: Vec<Body> = (0..20)
            .map(|i| {
                Body::new(
                    BodyId(i),
                    Vector2::new(30. * i as f64 + 5., 20. * i as f64 + 5.),
                    Vector2::zeros(),
                    10.,
                    1.,
                )
                .unwrap()
            })
            .collect();
        let mut forces = vec![Vector2::zeros(); bodies.len()];

        let mut bh = BarnesHut::default();
        bh.calculate_forces(&bodies, &domain, &gravity, &mut forces);
        bodies.truncate(3);
        bh.calculate_forces(&bodies, &domain, &gravity, &mut forces[..3]);

        assert_abs_diff_eq!(bh.tree().unwrap().root().mass(), 30.);
    }

    #[test]
    fn matches_direct_summation_at_zero_theta() {
        let domain = Rect::new(0., 0., 800., 600.);
        let gravity = Gravity::new(0.5, 1e-3);
        let bodies: Vec<Body> = (0..64)
            .map(|i| {
                let (x, y) = ((i % 8) as f64, (i / 8) as f64);
                Body::new(
                    BodyId(i),
                    Vector2::new(90. * x + 13., 70. * y + 7.),
                    Vector2::zeros(),
                    10. + x,
                    1.,
                )
                .unwrap()
            })
            .collect();

        let mut bh_forces = vec![Vector2::zeros(); bodies.len()];
        let mut ds_forces = vec![Vector2::zeros(); bodies.len()];
        BarnesHut::new(0.).calculate_forces(&bodies, &domain, &gravity, &mut bh_forces);
        DirectSummation.calculate_forces(&bodies, &domain, &gravity, &mut ds_forces);

        for (bh, ds) in bh_forces.iter().zip(&ds_forces) {
            assert_abs_diff_eq!(*bh, *ds, epsilon = 1e-10);
        }
    }
}
