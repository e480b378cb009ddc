//! Physics simulation using `Rapier3D` with deterministic behavior.
//!
//! Controllers never touch rapier directly. They talk to the world through
//! [`PhysicsAdapter`], which is implemented here by [`PhysicsWorld`] and by a
//! recording fake in the test utilities.

use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fixed timestep for physics simulation (60Hz).
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// Default gravity vector (downward, in m/s²).
pub fn default_gravity() -> Vector<Real> {
    vector![0.0, -9.81, 0.0]
}

/// Errors reported by a physics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhysicsError {
    #[error("rigid body {0:?} does not exist")]
    StaleHandle(RigidBodyHandle),
    #[error("rigid body {0:?} is not kinematic")]
    NotKinematic(RigidBodyHandle),
    #[error("rigid body {0:?} is not dynamic")]
    NotDynamic(RigidBodyHandle),
}

/// Surface response of a collider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SurfaceMaterial {
    pub restitution: f32,
    pub friction: f32,
}

impl SurfaceMaterial {
    pub const fn new(restitution: f32, friction: f32) -> Self {
        Self {
            restitution,
            friction,
        }
    }
}

/// Velocity damping of a dynamic body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Damping {
    pub linear: f32,
    pub angular: f32,
}

/// Collision shape of a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Cuboid { half_extents: Vector<Real> },
    Ball { radius: Real },
}

/// A collider attached to a body at `offset` from the body origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderSpec {
    pub shape: BodyShape,
    pub offset: Vector<Real>,
    pub material: SurfaceMaterial,
}

impl ColliderSpec {
    pub fn new(shape: BodyShape, material: SurfaceMaterial) -> Self {
        Self {
            shape,
            offset: Vector::zeros(),
            material,
        }
    }

    pub fn with_offset(mut self, offset: Vector<Real>) -> Self {
        self.offset = offset;
        self
    }

    fn build(&self) -> Collider {
        let builder = match self.shape {
            BodyShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            BodyShape::Ball { radius } => ColliderBuilder::ball(radius),
        };
        builder
            .translation(self.offset)
            .restitution(self.material.restitution)
            .friction(self.material.friction)
            .build()
    }
}

/// Next pose of a kinematic body. Obstacles move either by rotation or by
/// translation, never both in the same update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KinematicPose {
    Rotation(Rotation<Real>),
    Translation(Vector<Real>),
}

/// Result of a successful ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin along the (unit) direction.
    pub distance: Real,
    pub point: Point<Real>,
}

/// Contract between the gameplay controllers and the rigid-body engine.
///
/// Operations on a handle that no longer exists return
/// [`PhysicsError::StaleHandle`]; callers decide whether that matters.
pub trait PhysicsAdapter {
    /// Creates an immovable body made of one or more colliders.
    fn create_fixed_body(
        &mut self,
        position: Vector<Real>,
        colliders: &[ColliderSpec],
    ) -> RigidBodyHandle;

    /// Creates a body whose pose is driven by [`PhysicsAdapter::set_next_kinematic_pose`].
    fn create_kinematic_body(
        &mut self,
        position: Vector<Real>,
        collider: ColliderSpec,
    ) -> RigidBodyHandle;

    /// Creates a body fully simulated by the engine.
    fn create_dynamic_body(
        &mut self,
        position: Vector<Real>,
        collider: ColliderSpec,
        damping: Damping,
    ) -> RigidBodyHandle;

    /// Removes a body and its colliders.
    fn remove_body(&mut self, handle: RigidBodyHandle) -> Result<(), PhysicsError>;

    fn set_next_kinematic_pose(
        &mut self,
        handle: RigidBodyHandle,
        pose: KinematicPose,
    ) -> Result<(), PhysicsError>;

    fn apply_impulse(
        &mut self,
        handle: RigidBodyHandle,
        impulse: Vector<Real>,
    ) -> Result<(), PhysicsError>;

    fn apply_torque_impulse(
        &mut self,
        handle: RigidBodyHandle,
        torque: Vector<Real>,
    ) -> Result<(), PhysicsError>;

    fn translation(&self, handle: RigidBodyHandle) -> Result<Vector<Real>, PhysicsError>;

    /// Casts a solid ray; `exclude` keeps a body (usually the caster) out of the query.
    fn cast_ray(
        &self,
        origin: Point<Real>,
        direction: Vector<Real>,
        max_distance: Real,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RayHit>;
}

/// Physics world containing all `Rapier3D` components for deterministic simulation.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
    pub gravity: Vector<Real>,
    pub frame: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings.
    pub fn new() -> Self {
        Self::with_gravity(default_gravity())
    }

    /// Creates a new physics world with custom gravity.
    pub fn with_gravity(gravity: Vector<Real>) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: PHYSICS_DT,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            gravity,
            frame: 0,
        }
    }

    /// Advances the physics simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.step_by(PHYSICS_DT);
    }

    /// Advances the physics simulation by `dt` seconds.
    ///
    /// The query pipeline is refreshed as part of the step, so ray casts
    /// issued afterwards see the new poses.
    pub fn step_by(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.frame += 1;
    }

    /// Advances the physics simulation by multiple steps.
    pub fn step_n(&mut self, n: u32) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Gets an immutable reference to a rigid body.
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.rigid_body_set
            .get_mut(handle)
            .ok_or(PhysicsError::StaleHandle(handle))
    }

    fn insert_body(&mut self, body: RigidBody, colliders: &[ColliderSpec]) -> RigidBodyHandle {
        let handle = self.rigid_body_set.insert(body);
        for spec in colliders {
            self.collider_set
                .insert_with_parent(spec.build(), handle, &mut self.rigid_body_set);
        }
        handle
    }

    /// Computes a deterministic hash of the current physics state.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.frame.hash(&mut hasher);

        for (handle, body) in self.rigid_body_set.iter() {
            let (index, generation) = handle.into_raw_parts();
            index.hash(&mut hasher);
            generation.hash(&mut hasher);

            for v in body.translation().iter() {
                hash_f32(*v, &mut hasher);
            }
            for v in body.rotation().coords.iter() {
                hash_f32(*v, &mut hasher);
            }
            for v in body.linvel().iter() {
                hash_f32(*v, &mut hasher);
            }
            for v in body.angvel().iter() {
                hash_f32(*v, &mut hasher);
            }
        }

        hasher.finish()
    }

    /// Returns the current simulation frame number.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }
}

impl PhysicsAdapter for PhysicsWorld {
    fn create_fixed_body(
        &mut self,
        position: Vector<Real>,
        colliders: &[ColliderSpec],
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed().translation(position).build();
        self.insert_body(body, colliders)
    }

    fn create_kinematic_body(
        &mut self,
        position: Vector<Real>,
        collider: ColliderSpec,
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(position)
            .build();
        self.insert_body(body, &[collider])
    }

    fn create_dynamic_body(
        &mut self,
        position: Vector<Real>,
        collider: ColliderSpec,
        damping: Damping,
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(position)
            .linear_damping(damping.linear)
            .angular_damping(damping.angular)
            .ccd_enabled(true)
            .build();
        self.insert_body(body, &[collider])
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) -> Result<(), PhysicsError> {
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .map(|_| ())
            .ok_or(PhysicsError::StaleHandle(handle))
    }

    fn set_next_kinematic_pose(
        &mut self,
        handle: RigidBodyHandle,
        pose: KinematicPose,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if !body.is_kinematic() {
            return Err(PhysicsError::NotKinematic(handle));
        }
        match pose {
            KinematicPose::Rotation(rotation) => body.set_next_kinematic_rotation(rotation),
            KinematicPose::Translation(translation) => {
                body.set_next_kinematic_translation(translation);
            }
        }
        Ok(())
    }

    fn apply_impulse(
        &mut self,
        handle: RigidBodyHandle,
        impulse: Vector<Real>,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if !body.is_dynamic() {
            return Err(PhysicsError::NotDynamic(handle));
        }
        body.apply_impulse(impulse, true);
        Ok(())
    }

    fn apply_torque_impulse(
        &mut self,
        handle: RigidBodyHandle,
        torque: Vector<Real>,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if !body.is_dynamic() {
            return Err(PhysicsError::NotDynamic(handle));
        }
        body.apply_torque_impulse(torque, true);
        Ok(())
    }

    fn translation(&self, handle: RigidBodyHandle) -> Result<Vector<Real>, PhysicsError> {
        self.rigid_body_set
            .get(handle)
            .map(|body| *body.translation())
            .ok_or(PhysicsError::StaleHandle(handle))
    }

    fn cast_ray(
        &self,
        origin: Point<Real>,
        direction: Vector<Real>,
        max_distance: Real,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RayHit> {
        let ray = Ray::new(origin, direction);
        let filter = match exclude {
            Some(handle) => QueryFilter::default().exclude_rigid_body(handle),
            None => QueryFilter::default(),
        };

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(_, distance)| RayHit {
                distance,
                point: ray.point_at(distance),
            })
    }
}

/// Hashes a f32 value by converting to bits.
fn hash_f32(value: f32, hasher: &mut impl Hasher) {
    value.to_bits().hash(hasher);
}
