//! Soft-body separation for free-floating panels
//!
//! Each panel carries a ring of sample spheres around its border. Every
//! simulation step, overlapping sample pairs add velocity along the line
//! between the two panel centres, a spring pulls each panel back toward the
//! home position captured when the simulation was primed, and movable panels
//! can optionally be reprojected onto the sweet-spot sphere.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::DepenetrationConfig;
use crate::geometry::Pose;
use crate::panel::PanelId;

/// Velocities below this are treated as settled
pub const REST_SPEED: f32 = 1e-3;

/// Build the border sample grid for a panel with half extents `bounds`
///
/// Returns local sample positions and the extent used for the broad-phase
/// test. Degenerate bounds or radius produce no samples.
pub fn perimeter_samples(bounds: Vec2, radius: f32) -> (Vec<Vec3>, f32) {
    if bounds.x <= 0.0 || bounds.y <= 0.0 || radius <= 0.0 {
        return (Vec::new(), 0.0);
    }

    let inner = bounds - Vec2::splat(radius * 0.5);
    let across = ((inner.x * 2.0) / radius).ceil().max(2.0) as usize;
    let down = ((inner.y * 2.0) / radius).ceil().max(2.0) as usize;
    let x_step = inner.x * 2.0 / (across - 1) as f32;
    let y_step = inner.y * 2.0 / (down - 1) as f32;

    let mut samples = Vec::with_capacity(across * 2 + (down - 2) * 2);
    for i in 0..across {
        samples.push(Vec3::new(-inner.x + x_step * i as f32, -inner.y, 0.0));
    }
    for i in 1..down - 1 {
        let y = -inner.y + y_step * i as f32;
        samples.push(Vec3::new(-inner.x, y, 0.0));
        samples.push(Vec3::new(inner.x, y, 0.0));
    }
    for i in 0..across {
        samples.push(Vec3::new(-inner.x + x_step * i as f32, inner.y, 0.0));
    }

    let extent = samples
        .iter()
        .fold(0.0f32, |acc, s| acc.max(s.x.max(s.y)))
        + radius * 2.0;
    (samples, extent)
}

/// Simulation state of one panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepenetrationBody {
    pub id: PanelId,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    /// Spring anchor captured by `prime`
    pub home: Vec3,
    /// Broad-phase reach from the centre
    pub extent: f32,
    /// Centre-to-centre fallback radius
    pub collision_radius: f32,
    pub sample_radius: f32,
    pub local_samples: Vec<Vec3>,
}

impl DepenetrationBody {
    pub fn new(
        id: PanelId,
        pose: Pose,
        bounds: Vec2,
        sample_radius: f32,
        collision_radius: f32,
    ) -> Self {
        let (local_samples, extent) = perimeter_samples(bounds, sample_radius);
        Self {
            id,
            position: pose.position,
            rotation: pose.rotation,
            velocity: Vec3::ZERO,
            home: pose.position,
            extent,
            collision_radius,
            sample_radius,
            local_samples,
        }
    }

    /// Anchor the spring at the current position and stop
    pub fn prime(&mut self) {
        self.home = self.position;
        self.velocity = Vec3::ZERO;
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.position = pose.position;
        self.rotation = pose.rotation;
    }

    pub fn is_resting(&self) -> bool {
        self.velocity.length_squared() < REST_SPEED * REST_SPEED
    }

    fn world_samples(&self) -> Vec<Vec3> {
        self.local_samples
            .iter()
            .map(|s| self.position + self.rotation * *s)
            .collect()
    }
}

/// Sphere that floating panels can be held to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweetSpot {
    pub center: Vec3,
    pub radius: f32,
}

impl SweetSpot {
    /// Put `position` on the sphere, facing outward
    ///
    /// Returns None for a point at the centre.
    pub fn project(&self, position: Vec3) -> Option<Pose> {
        let dir = (position - self.center).try_normalize()?;
        Some(Pose::new(
            self.center + dir * self.radius,
            Quat::from_rotation_arc(Vec3::Z, dir),
        ))
    }

    /// Move the sphere, carrying `position` along at the same direction
    pub fn recenter(&self, position: Vec3, center: Vec3) -> Option<Pose> {
        let dir = (position - self.center).try_normalize()?;
        SweetSpot {
            center,
            radius: self.radius,
        }
        .project(center + dir)
    }
}

/// Pushes overlapping free-floating panels apart
#[derive(Debug, Clone)]
pub struct DepenetrationSolver {
    config: DepenetrationConfig,
}

impl DepenetrationSolver {
    pub fn new(config: DepenetrationConfig) -> Self {
        Self { config }
    }

    /// Start a new simulation: every body's home becomes its position
    pub fn prime(bodies: &mut [DepenetrationBody]) {
        for body in bodies {
            body.prime();
        }
    }

    /// Whether any body other than `immovable` is still moving
    pub fn is_settling(bodies: &[DepenetrationBody], immovable: Option<PanelId>) -> bool {
        bodies
            .iter()
            .any(|b| Some(b.id) != immovable && !b.is_resting())
    }

    /// Advance the simulation by `dt`
    ///
    /// The `immovable` body pushes others but never moves itself.
    pub fn step(
        &self,
        bodies: &mut [DepenetrationBody],
        immovable: Option<PanelId>,
        sweet_spot: Option<SweetSpot>,
        dt: f32,
    ) {
        let samples: Vec<Vec<Vec3>> = bodies
            .iter()
            .map(DepenetrationBody::world_samples)
            .collect();
        let scale = self.config.scalar * dt;

        let mut impulses = vec![Vec3::ZERO; bodies.len()];
        for i in 0..bodies.len() {
            if Some(bodies[i].id) == immovable {
                continue;
            }
            for j in 0..bodies.len() {
                if i == j {
                    continue;
                }
                let push = separation(&bodies[i], &samples[i], &bodies[j], &samples[j], i < j);
                impulses[i] += push * scale;
            }
        }

        for (body, impulse) in bodies.iter_mut().zip(impulses) {
            if Some(body.id) == immovable {
                continue;
            }
            body.velocity += impulse;

            let to_home = (body.home - body.position) * self.config.spring_k;
            body.velocity += to_home - body.velocity * self.config.dampen;
            body.position += body.velocity * dt;

            if let Some(pose) = sweet_spot.and_then(|s| s.project(body.position)) {
                body.set_pose(pose);
            }
        }
    }
}

/// Unscaled push on `a` away from `b`
fn separation(
    a: &DepenetrationBody,
    a_samples: &[Vec3],
    b: &DepenetrationBody,
    b_samples: &[Vec3],
    a_first: bool,
) -> Vec3 {
    let between = a.position - b.position;
    let dir = between.try_normalize().unwrap_or(if a_first { -Vec3::X } else { Vec3::X });

    if a_samples.is_empty() || b_samples.is_empty() {
        let combined = a.collision_radius + b.collision_radius;
        let distance = between.length();
        return if distance < combined {
            dir * (combined - distance)
        } else {
            Vec3::ZERO
        };
    }

    let reach = a.extent + b.extent;
    if between.length_squared() >= reach * reach {
        return Vec3::ZERO;
    }

    let combined = a.sample_radius + b.sample_radius;
    let mut depth = 0.0;
    for sa in a_samples {
        for sb in b_samples {
            let d = sa.distance(*sb);
            if d < combined {
                depth += combined - d;
            }
        }
    }
    dir * depth
}
