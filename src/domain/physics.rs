// Physical snapshots the host hands to the governor each tick.

use glam::{DVec3, Vec3};

use super::ship::{PlayerId, SizeClass};

/// World-space axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn from_center(center: DVec3, half_extents: DVec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn volume(&self) -> f64 {
        let size = self.size();
        size.x * size.y * size.z
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    // Corner `index` in 0..8; bit 0 selects x, bit 1 y, bit 2 z.
    pub fn corner(&self, index: usize) -> DVec3 {
        DVec3::new(
            if index & 1 == 0 { self.min.x } else { self.max.x },
            if index & 2 == 0 { self.min.y } else { self.max.y },
            if index & 4 == 0 { self.min.z } else { self.max.z },
        )
    }

    pub fn corners(&self) -> [DVec3; 8] {
        std::array::from_fn(|index| self.corner(index))
    }
}

/// State of a top-level grid as reported by the host for the current tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    pub name: String,
    pub size: SizeClass,
    // Projections and other ghosts have no physics body.
    pub has_physics: bool,
    pub is_static: bool,
    pub marked_for_close: bool,
    pub position: DVec3,
    pub world_aabb: Aabb,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub natural_gravity: Vec3,
    // Mass of the physics body, used for boost thrust targets.
    pub physics_mass: f32,
}

impl GridState {
    pub fn volume(&self) -> f32 {
        self.world_aabb.volume() as f32
    }

    // Only dynamic, physically simulated grids that are not being removed are governed.
    pub fn is_governable(&self) -> bool {
        self.has_physics && !self.is_static && !self.marked_for_close
    }
}

/// Mass of a mechanically linked grid group.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridMass {
    // Block mass without inventory or attachments.
    pub base: f32,
    // Total physical mass including cargo.
    pub physical: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelKind {
    // Ion and atmospheric thrusters.
    Electricity,
    // Hydrogen and other gas-burning thrusters.
    Gas,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrusterState {
    pub functional: bool,
    pub fuel: FuelKind,
    // Thrust currently produced, in newtons.
    pub current_thrust: f32,
    pub thrust_multiplier: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    pub functional: bool,
    // Passenger seats and similar blocks cannot steer the ship.
    pub can_control_ship: bool,
    pub pilot: Option<PlayerId>,
}

impl ControllerState {
    pub fn is_piloted(&self) -> bool {
        self.pilot.is_some()
    }
}

/// Engine-wide speed limits the session overrides while it runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimits {
    pub small: f32,
    pub large: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_box_is_built_from_center_then_volume_and_corners_match() {
        let aabb = Aabb::from_center(DVec3::new(10.0, 0.0, -5.0), DVec3::new(1.0, 2.0, 3.0));

        assert_eq!(aabb.volume(), 2.0 * 4.0 * 6.0);
        assert_eq!(aabb.corner(0), DVec3::new(9.0, -2.0, -8.0));
        assert_eq!(aabb.corner(7), DVec3::new(11.0, 2.0, -2.0));
        assert_eq!(aabb.center(), DVec3::new(10.0, 0.0, -5.0));
    }

    #[test]
    fn when_corners_are_listed_then_all_eight_are_distinct() {
        let aabb = Aabb::new(DVec3::ZERO, DVec3::ONE);
        let corners = aabb.corners();

        for (i, a) in corners.iter().enumerate() {
            for b in corners.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
