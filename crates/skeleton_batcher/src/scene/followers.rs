//! Bone followers
//!
//! A follower pins a host object (weapon sprite, particle emitter, hit box)
//! to a bone. Each frame the arena turns the bone's world transform into a
//! [`Transform2D`] in the host's space.

use slotmap::SlotMap;

use crate::foundation::logging::debug;
use crate::foundation::math::{Transform2D, Vec2};
use crate::skeleton::Skeleton;

slotmap::new_key_type! {
    /// Stable handle to a follower
    pub struct FollowerHandle;
}

/// Placement of a follower relative to its bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerParams {
    /// Translation added after the bone position
    pub offset: Vec2,
    /// Multiplier applied to the bone's world scale
    pub scale: Vec2,
    /// Rotation added to the bone's world rotation, in degrees
    pub rotation_degrees: f32,
}

impl Default for FollowerParams {
    fn default() -> Self {
        Self {
            offset: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            rotation_degrees: 0.0,
        }
    }
}

/// A host object bound to a bone
#[derive(Debug, Clone, PartialEq)]
pub struct Follower {
    /// Index into [`Skeleton::bones`]
    pub bone: usize,
    /// Name the follower was bound with
    pub bone_name: String,
    /// Placement relative to the bone
    pub params: FollowerParams,
}

/// Follower errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FollowerError {
    /// No bone with this name exists in the skeleton
    #[error("Unknown bone: {0}")]
    UnknownBone(String),

    /// The handle was detached or never issued by this arena
    #[error("Stale follower handle")]
    StaleHandle,
}

/// Transform of a follower placed on a bone
///
/// Position is the bone origin in the skeleton's parent space with Y
/// inverted, plus the offset. Scale multiplies the bone's world scale and
/// rotation adds to the bone's world rotation.
pub fn follower_transform(skeleton: &Skeleton, bone: usize, params: &FollowerParams) -> Option<Transform2D> {
    let bone = skeleton.bones.get(bone)?;
    Some(Transform2D {
        position: Vec2::new(bone.world_x + skeleton.x, skeleton.y - bone.world_y) + params.offset,
        rotation: bone.world_rotation() + params.rotation_degrees.to_radians(),
        scale: Vec2::new(bone.world_scale_x(), bone.world_scale_y()).component_mul(&params.scale),
    })
}

/// Collection of followers for one skeleton
#[derive(Debug, Default)]
pub struct FollowerArena {
    followers: SlotMap<FollowerHandle, Follower>,
}

impl FollowerArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a new follower to a bone
    pub fn attach(
        &mut self,
        skeleton: &Skeleton,
        bone_name: &str,
        params: FollowerParams,
    ) -> Result<FollowerHandle, FollowerError> {
        let bone = skeleton
            .find_bone(bone_name)
            .ok_or_else(|| FollowerError::UnknownBone(bone_name.to_string()))?;

        let handle = self.followers.insert(Follower {
            bone,
            bone_name: bone_name.to_string(),
            params,
        });
        debug!("Attached follower {:?} to bone '{}'", handle, bone_name);
        Ok(handle)
    }

    /// Update a follower's placement, re-binding it if the bone changed
    pub fn update(
        &mut self,
        handle: FollowerHandle,
        skeleton: &Skeleton,
        bone_name: &str,
        params: FollowerParams,
    ) -> Result<(), FollowerError> {
        let follower = self.followers.get_mut(handle).ok_or(FollowerError::StaleHandle)?;

        if follower.bone_name != bone_name {
            let bone = skeleton
                .find_bone(bone_name)
                .ok_or_else(|| FollowerError::UnknownBone(bone_name.to_string()))?;
            debug!(
                "Re-binding follower {:?} from '{}' to '{}'",
                handle, follower.bone_name, bone_name
            );
            follower.bone = bone;
            follower.bone_name = bone_name.to_string();
        }

        follower.params = params;
        Ok(())
    }

    /// Remove a follower
    pub fn detach(&mut self, handle: FollowerHandle) -> Option<Follower> {
        self.followers.remove(handle)
    }

    /// Get a follower
    pub fn get(&self, handle: FollowerHandle) -> Option<&Follower> {
        self.followers.get(handle)
    }

    /// Check if a handle is live
    pub fn contains(&self, handle: FollowerHandle) -> bool {
        self.followers.contains_key(handle)
    }

    /// Number of followers
    pub fn len(&self) -> usize {
        self.followers.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.followers.is_empty()
    }

    /// Keep only followers matching a predicate
    pub fn retain(&mut self, mut keep: impl FnMut(FollowerHandle, &Follower) -> bool) {
        self.followers.retain(|handle, follower| keep(handle, follower));
    }

    /// Current transform of one follower
    pub fn transform(&self, handle: FollowerHandle, skeleton: &Skeleton) -> Result<Transform2D, FollowerError> {
        let follower = self.followers.get(handle).ok_or(FollowerError::StaleHandle)?;
        follower_transform(skeleton, follower.bone, &follower.params)
            .ok_or_else(|| FollowerError::UnknownBone(follower.bone_name.clone()))
    }

    /// Current transforms of every follower whose bone exists in `skeleton`
    pub fn transforms<'a>(
        &'a self,
        skeleton: &'a Skeleton,
    ) -> impl Iterator<Item = (FollowerHandle, Transform2D)> + 'a {
        self.followers.iter().filter_map(move |(handle, follower)| {
            follower_transform(skeleton, follower.bone, &follower.params).map(|transform| (handle, transform))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Bone;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn rig() -> Skeleton {
        let mut skeleton = Skeleton::new(
            vec![
                Bone::new("root", 0.0, 0.0),
                // Rotated 90° and scaled 2× along both axes.
                Bone::new("hand", 10.0, 4.0).with_matrix(0.0, -2.0, 2.0, 0.0),
            ],
            Vec::new(),
        );
        skeleton.x = 100.0;
        skeleton.y = 50.0;
        skeleton
    }

    #[test]
    fn test_transform_follows_bone() {
        let skeleton = rig();
        let mut arena = FollowerArena::new();
        let handle = arena.attach(&skeleton, "hand", FollowerParams::default()).unwrap();

        let transform = arena.transform(handle, &skeleton).unwrap();
        assert_relative_eq!(transform.position.x, 110.0);
        assert_relative_eq!(transform.position.y, 46.0);
        assert_relative_eq!(transform.rotation, FRAC_PI_2);
        assert_relative_eq!(transform.scale.x, 2.0);
        assert_relative_eq!(transform.scale.y, 2.0);
    }

    #[test]
    fn test_params_compose_with_bone() {
        let skeleton = rig();
        let params = FollowerParams {
            offset: Vec2::new(1.0, -1.0),
            scale: Vec2::new(0.5, 3.0),
            rotation_degrees: 90.0,
        };
        let transform = follower_transform(&skeleton, 1, &params).unwrap();

        assert_relative_eq!(transform.position.x, 111.0);
        assert_relative_eq!(transform.position.y, 45.0);
        assert_relative_eq!(transform.rotation, std::f32::consts::PI);
        assert_relative_eq!(transform.scale.x, 1.0);
        assert_relative_eq!(transform.scale.y, 6.0);
    }

    #[test]
    fn test_unknown_bone_rejected() {
        let mut arena = FollowerArena::new();
        let result = arena.attach(&rig(), "tail", FollowerParams::default());
        assert_eq!(result, Err(FollowerError::UnknownBone("tail".to_string())));
        assert!(arena.is_empty());
    }

    #[test]
    fn test_update_same_bone_keeps_binding() {
        let skeleton = rig();
        let mut arena = FollowerArena::new();
        let handle = arena.attach(&skeleton, "hand", FollowerParams::default()).unwrap();

        let params = FollowerParams { rotation_degrees: 45.0, ..Default::default() };
        arena.update(handle, &skeleton, "hand", params).unwrap();

        let follower = arena.get(handle).unwrap();
        assert_eq!(follower.bone, 1);
        assert_eq!(follower.params, params);
    }

    #[test]
    fn test_update_other_bone_rebinds() {
        let skeleton = rig();
        let mut arena = FollowerArena::new();
        let handle = arena.attach(&skeleton, "hand", FollowerParams::default()).unwrap();

        arena.update(handle, &skeleton, "root", FollowerParams::default()).unwrap();
        assert_eq!(arena.get(handle).unwrap().bone, 0);
        assert_eq!(arena.len(), 1);

        let result = arena.update(handle, &skeleton, "tail", FollowerParams::default());
        assert!(matches!(result, Err(FollowerError::UnknownBone(_))));
        assert_eq!(arena.get(handle).unwrap().bone_name, "root");
    }

    #[test]
    fn test_detached_handle_is_stale() {
        let skeleton = rig();
        let mut arena = FollowerArena::new();
        let handle = arena.attach(&skeleton, "root", FollowerParams::default()).unwrap();

        assert!(arena.detach(handle).is_some());
        assert!(!arena.contains(handle));
        assert_eq!(arena.transform(handle, &skeleton), Err(FollowerError::StaleHandle));
    }

    #[test]
    fn test_transforms_skip_missing_bones() {
        let skeleton = rig();
        let mut arena = FollowerArena::new();
        arena.attach(&skeleton, "root", FollowerParams::default()).unwrap();
        arena.attach(&skeleton, "hand", FollowerParams::default()).unwrap();

        let mut smaller = skeleton.clone();
        smaller.bones.truncate(1);
        assert_eq!(arena.transforms(&smaller).count(), 1);
        assert_eq!(arena.transforms(&skeleton).count(), 2);

        arena.retain(|_, follower| follower.bone_name == "hand");
        assert_eq!(arena.len(), 1);
    }
}
