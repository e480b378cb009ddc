//! Test utilities shared by the controller tests.
//!
//! `RecordingPhysics` is a [`PhysicsAdapter`] that integrates nothing: it
//! stores bodies in a map, records every pose, impulse and torque it is
//! handed, and answers downward ray casts from a configurable ground height.

use std::cell::RefCell;
use std::collections::BTreeMap;

use rapier3d::prelude::*;

use crate::physics::{
    ColliderSpec, Damping, KinematicPose, PhysicsAdapter, PhysicsError, RayHit,
};

/// A body as seen by [`RecordingPhysics`].
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordedBody {
    pub translation: Vector<Real>,
    pub kinematic: bool,
    pub dynamic: bool,
    pub colliders: usize,
    pub poses: Vec<KinematicPose>,
    pub impulses: Vec<Vector<Real>>,
    pub torques: Vec<Vector<Real>>,
}

/// Physics backend fake that records commands instead of simulating them.
#[derive(Debug, Default)]
pub(crate) struct RecordingPhysics {
    bodies: BTreeMap<u32, RecordedBody>,
    next_index: u32,
    /// Height of an infinite horizontal ground plane, if any.
    pub ground_height: Option<Real>,
    /// Every ray cast issued, as (origin, direction, max distance).
    pub rays: RefCell<Vec<(Point<Real>, Vector<Real>, Real)>>,
}

impl RecordingPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ground(height: Real) -> Self {
        Self {
            ground_height: Some(height),
            ..Self::default()
        }
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RecordedBody> {
        let (index, _) = handle.into_raw_parts();
        self.bodies.get(&index)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Moves a body, as if the engine had integrated it there.
    pub fn teleport(&mut self, handle: RigidBodyHandle, translation: Vector<Real>) {
        if let Ok(body) = self.body_mut(handle) {
            body.translation = translation;
        }
    }

    fn insert(&mut self, body: RecordedBody) -> RigidBodyHandle {
        let index = self.next_index;
        self.next_index += 1;
        self.bodies.insert(index, body);
        RigidBodyHandle::from_raw_parts(index, 0)
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> Result<&mut RecordedBody, PhysicsError> {
        let (index, _) = handle.into_raw_parts();
        self.bodies
            .get_mut(&index)
            .ok_or(PhysicsError::StaleHandle(handle))
    }
}

impl PhysicsAdapter for RecordingPhysics {
    fn create_fixed_body(
        &mut self,
        position: Vector<Real>,
        colliders: &[ColliderSpec],
    ) -> RigidBodyHandle {
        self.insert(RecordedBody {
            translation: position,
            colliders: colliders.len(),
            ..RecordedBody::default()
        })
    }

    fn create_kinematic_body(
        &mut self,
        position: Vector<Real>,
        _collider: ColliderSpec,
    ) -> RigidBodyHandle {
        self.insert(RecordedBody {
            translation: position,
            kinematic: true,
            colliders: 1,
            ..RecordedBody::default()
        })
    }

    fn create_dynamic_body(
        &mut self,
        position: Vector<Real>,
        _collider: ColliderSpec,
        _damping: Damping,
    ) -> RigidBodyHandle {
        self.insert(RecordedBody {
            translation: position,
            dynamic: true,
            colliders: 1,
            ..RecordedBody::default()
        })
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) -> Result<(), PhysicsError> {
        let (index, _) = handle.into_raw_parts();
        self.bodies
            .remove(&index)
            .map(|_| ())
            .ok_or(PhysicsError::StaleHandle(handle))
    }

    fn set_next_kinematic_pose(
        &mut self,
        handle: RigidBodyHandle,
        pose: KinematicPose,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if !body.kinematic {
            return Err(PhysicsError::NotKinematic(handle));
        }
        body.poses.push(pose);
        Ok(())
    }

    fn apply_impulse(
        &mut self,
        handle: RigidBodyHandle,
        impulse: Vector<Real>,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if !body.dynamic {
            return Err(PhysicsError::NotDynamic(handle));
        }
        body.impulses.push(impulse);
        Ok(())
    }

    fn apply_torque_impulse(
        &mut self,
        handle: RigidBodyHandle,
        torque: Vector<Real>,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if !body.dynamic {
            return Err(PhysicsError::NotDynamic(handle));
        }
        body.torques.push(torque);
        Ok(())
    }

    fn translation(&self, handle: RigidBodyHandle) -> Result<Vector<Real>, PhysicsError> {
        self.body(handle)
            .map(|body| body.translation)
            .ok_or(PhysicsError::StaleHandle(handle))
    }

    fn cast_ray(
        &self,
        origin: Point<Real>,
        direction: Vector<Real>,
        max_distance: Real,
        _exclude: Option<RigidBodyHandle>,
    ) -> Option<RayHit> {
        self.rays
            .borrow_mut()
            .push((origin, direction, max_distance));
        ground_hit(self.ground_height?, origin, direction, max_distance)
    }
}

/// Downward hit against the plane `y = ground`. Origins below the plane count
/// as a hit at distance zero, like a solid ray starting inside a collider.
fn ground_hit(
    ground: Real,
    origin: Point<Real>,
    direction: Vector<Real>,
    max_distance: Real,
) -> Option<RayHit> {
    if origin.y <= ground {
        return Some(RayHit {
            distance: 0.0,
            point: origin,
        });
    }
    if direction.y >= 0.0 {
        return None;
    }
    let distance = (origin.y - ground) / -direction.y;
    (distance <= max_distance).then(|| RayHit {
        distance,
        point: origin + direction * distance,
    })
}
