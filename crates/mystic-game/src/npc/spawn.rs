//! Spawn placement around a target

use glam::Vec3;
use mystic_core::Pose;
use rand::Rng;

use crate::world::WorldAdapter;

/// Find a clear spot exactly `distance` from `center` on the ground.
///
/// Tries up to `attempts` random bearings and returns the first position that
/// is clear, facing the center. `None` if every attempt was obstructed.
pub fn find_spawn_pose<W: WorldAdapter + ?Sized>(
    world: &W,
    center: Vec3,
    distance: f32,
    attempts: u32,
    rng: &mut impl Rng,
) -> Option<Pose> {
    for _ in 0..attempts {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let x = center.x + distance * angle.cos();
        let z = center.z + distance * angle.sin();
        // One above the surface block
        let y = world.ground_height(x, z) + 1.0;
        let candidate = Vec3::new(x, y, z);

        if world.is_position_clear(candidate) {
            // Face the target horizontally
            let facing = Vec3::new(center.x, y, center.z);
            return Some(Pose::from_position(candidate).looking_at(facing));
        }
    }
    None
}
