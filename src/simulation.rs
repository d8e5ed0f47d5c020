use nalgebra::Vector2;

use crate::{
    barnes_hut::Rect,
    body::{Body, BodyId, Origin},
    body_creator::{BodyCreator, BodyTemplate},
    config::SimulationConfig,
    gravity::Gravity,
    ForceSolver, SimulationError,
};

/// The simulation context: the active bodies, the force solver and the fixed
/// physical setup. Mutated only by [`Simulation::step`] and
/// [`Simulation::spawn`], so nothing can touch the body set mid-tick.
#[derive(Debug)]
pub struct Simulation<S: ForceSolver> {
    bodies: Vec<Body>,
    solver: S,
    gravity: Gravity,
    domain: Rect,
    forces: Vec<Vector2<f64>>,
    next_id: u64,
    tick: u64,
}

impl<S: ForceSolver> Simulation<S> {
    /// An empty simulation over `[0, extent.x) x [0, extent.y)`.
    pub fn new(extent: Vector2<f64>, gravity: Gravity, solver: S) -> Result<Self, SimulationError> {
        if !extent.iter().all(|e| e.is_finite() && *e > 0.) {
            return Err(SimulationError::invalid_config(format!(
                "domain extent must be positive, got {}x{}",
                extent.x, extent.y
            )));
        }
        gravity.validate()?;

        Ok(Self {
            bodies: Vec::new(),
            solver,
            gravity,
            domain: Rect::from_extent(&extent),
            forces: Vec::new(),
            next_id: 0,
            tick: 0,
        })
    }

    /// Add a body to the active set; it takes part from the next tick on.
    /// Positions outside the domain are wrapped into it.
    pub fn spawn(
        &mut self,
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        mass: f64,
        radius: f64,
    ) -> Result<BodyId, SimulationError> {
        self.add(
            BodyTemplate {
                position,
                velocity,
                mass,
                radius,
            },
            Origin::Spawned,
        )
    }

    /// Create `n` bodies from `creator`.
    pub fn seed(
        &mut self,
        creator: &mut impl BodyCreator,
        n: usize,
    ) -> Result<Vec<BodyId>, SimulationError> {
        creator
            .create_bodies(n)
            .into_iter()
            .map(|template| self.add(template, Origin::Seeded))
            .collect()
    }

    fn add(&mut self, template: BodyTemplate, origin: Origin) -> Result<BodyId, SimulationError> {
        let id = BodyId(self.next_id);
        let mut body = Body::new(
            id,
            template.position,
            template.velocity,
            template.mass,
            template.radius,
        )?
        .with_origin(origin);
        body.wrap(&self.extent());

        self.next_id += 1;
        self.bodies.push(body);
        log::debug!("added {:?} body {id}", origin);

        Ok(id)
    }

    /// Advance by exactly one tick: forces, collisions, pruning, integration.
    pub fn step(&mut self) {
        self.tick += 1;
        let n = self.bodies.len();

        self.forces.clear();
        self.forces.resize(n, Vector2::zeros());
        self.solver
            .calculate_forces(&self.bodies, &self.domain, &self.gravity, &mut self.forces);
        for (body, force) in self.bodies.iter_mut().zip(&self.forces) {
            body.apply_force(*force);
        }

        let merges = self.resolve_collisions();

        self.bodies.retain(Body::is_active);

        let extent = self.extent();
        for body in &mut self.bodies {
            body.integrate(&extent);
        }

        log::trace!(
            "tick {}: {} bodies, {} merged away",
            self.tick,
            self.bodies.len(),
            merges
        );
    }

    /// Merge every overlapping pair once, in `i < j` order. A body absorbed
    /// earlier in the scan is skipped for the rest of it.
    fn resolve_collisions(&mut self) -> usize {
        let mut merges = 0;
        for i in 0..self.bodies.len() {
            for j in i + 1..self.bodies.len() {
                let (head, tail) = self.bodies.split_at_mut(j);
                let (body, other) = (&mut head[i], &mut tail[0]);
                if !body.is_active() {
                    break;
                }
                if other.is_active() && body.collides_with(other) {
                    log::debug!("tick {}: {} absorbs {}", self.tick, body.id, other.id);
                    body.merge_with(other);
                    merges += 1;
                }
            }
        }
        merges
    }

    /// The bodies alive after the last tick, for rendering.
    #[must_use]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn domain(&self) -> &Rect {
        &self.domain
    }

    #[must_use]
    pub fn extent(&self) -> Vector2<f64> {
        Vector2::new(self.domain.width(), self.domain.height())
    }

    #[must_use]
    pub fn gravity(&self) -> &Gravity {
        &self.gravity
    }

    #[must_use]
    pub fn solver(&self) -> &S {
        &self.solver
    }

    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    #[must_use]
    pub fn total_momentum(&self) -> Vector2<f64> {
        self.bodies.iter().map(Body::momentum).sum()
    }
}

/// A simulation whose solver is chosen at runtime.
pub type DynSimulation = Simulation<Box<dyn ForceSolver>>;

impl DynSimulation {
    /// An empty simulation with the solver and constants named in `config`.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Self::new(config.extent(), config.gravity(), config.force_solver())
    }
}
