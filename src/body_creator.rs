use nalgebra::Vector2;

/// The physical state of a body about to be created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyTemplate {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub mass: f64,
    pub radius: f64,
}

pub trait BodyCreator {
    fn create_body(&mut self) -> BodyTemplate;

    fn create_bodies(&mut self, n: usize) -> Vec<BodyTemplate> {
        (0..n).map(|_| self.create_body()).collect()
    }
}

/// Velocity given to a body released by dragging from `press` to `release`.
#[must_use]
pub fn drag_velocity(press: &Vector2<f64>, release: &Vector2<f64>, scale: f64) -> Vector2<f64> {
    (release - press) * scale
}

#[cfg(feature = "randomization")]
pub use random::*;

#[cfg(feature = "randomization")]
mod random {
    use nalgebra::Vector2;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rand_distr::{Distribution, Uniform};

    use super::*;
    use crate::config::SimulationConfig;

    /// Bodies at rest, scattered uniformly over whole-pixel positions inside
    /// the domain minus a margin, with uniform mass and whole-pixel radius.
    pub struct DistrBodyCreator<R: Rng> {
        rng: R,
        x_distr: Uniform<i64>,
        y_distr: Uniform<i64>,
        mass_distr: Uniform<f64>,
        radius_distr: Uniform<u32>,
    }

    impl DistrBodyCreator<StdRng> {
        /// Seeded from `config.seed`, or from entropy when there is none.
        #[must_use]
        pub fn from_config(config: &SimulationConfig) -> Self {
            let rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            Self::rng(config, rng)
        }
    }

    impl<R: Rng> DistrBodyCreator<R> {
        /// `config` must have passed [`SimulationConfig::validate`].
        pub fn rng(config: &SimulationConfig, rng: R) -> Self {
            let margin = config.spawn_margin;
            Self {
                rng,
                x_distr: pixel_span(margin, config.width),
                y_distr: pixel_span(margin, config.height),
                mass_distr: Uniform::new(config.mass_range.0, config.mass_range.1),
                radius_distr: Uniform::new_inclusive(config.radius_range.0, config.radius_range.1),
            }
        }

        fn sample_mass_and_radius(&mut self) -> (f64, f64) {
            let rng = &mut self.rng;
            (
                self.mass_distr.sample(rng),
                f64::from(self.radius_distr.sample(rng)),
            )
        }
    }

    /// Whole pixels in `[margin, extent - margin]`, collapsed onto the upper
    /// bound when rounding leaves none.
    fn pixel_span(margin: f64, extent: f64) -> Uniform<i64> {
        let high = (extent - margin).floor() as i64;
        let low = (margin.ceil() as i64).min(high);
        Uniform::new_inclusive(low, high)
    }

    impl<R: Rng> BodyCreator for DistrBodyCreator<R> {
        fn create_body(&mut self) -> BodyTemplate {
            let position = Vector2::new(
                self.x_distr.sample(&mut self.rng) as f64,
                self.y_distr.sample(&mut self.rng) as f64,
            );
            let (mass, radius) = self.sample_mass_and_radius();

            BodyTemplate {
                position,
                velocity: Vector2::zeros(),
                mass,
                radius,
            }
        }
    }

    /// Turns a press/release gesture into a new body: placed at the press,
    /// moving along the drag, with mass and radius drawn like seeded bodies.
    pub struct DragSpawner<R: Rng> {
        creator: DistrBodyCreator<R>,
        velocity_scale: f64,
    }

    impl DragSpawner<StdRng> {
        #[must_use]
        pub fn from_config(config: &SimulationConfig) -> Self {
            Self {
                creator: DistrBodyCreator::from_config(config),
                velocity_scale: config.drag_velocity_scale,
            }
        }
    }

    impl<R: Rng> DragSpawner<R> {
        pub fn rng(config: &SimulationConfig, rng: R) -> Self {
            Self {
                creator: DistrBodyCreator::rng(config, rng),
                velocity_scale: config.drag_velocity_scale,
            }
        }

        pub fn release(&mut self, press: Vector2<f64>, release: Vector2<f64>) -> BodyTemplate {
            let (mass, radius) = self.creator.sample_mass_and_radius();
            BodyTemplate {
                position: press,
                velocity: drag_velocity(&press, &release, self.velocity_scale),
                mass,
                radius,
            }
        }
    }

}
