// Domain layer: closed-form speed and turn-rate model.
//
// Drag and thrust are empirical approximations tuned through the flight
// profiles, not a physical simulation. All functions are pure.

use glam::Vec3;

use super::settings::FlightProfile;
use super::ship::ShipState;

pub const GRAVITY: f32 = 9.81;
/// Sea-level air density in kg/m³.
pub const AIR_DENSITY: f32 = 1.225;
/// Sea water density in kg/m³.
pub const WATER_DENSITY: f32 = 1026.0;
pub const SUBMERGED_DENSITY_FACTOR: f32 = 1.1;
pub const FRONT_AREA_FACTOR: f32 = 0.05;
pub const DIVE_MAX_DRAG_REDUCTION: f32 = 0.8;
pub const DIVE_MIN_ANGLE_DEGREES: f32 = 45.0;
/// Roll is only limited by this ceiling, in rad/s.
pub const MAX_ROLL_RATE: f32 = 300.0 * std::f32::consts::PI / 180.0;
pub const TURN_RATE_RAMPDOWN: f32 = 0.05;
pub const SPEED_RAMPDOWN: f32 = 0.01;
/// Excess speed (m/s) below which the cap is applied exactly.
pub const SPEED_SNAP_THRESHOLD: f32 = 10.0;
/// A large grid this big counts as a dock for small grids, in m³.
pub const MIN_PARENT_GRID_VOLUME: f32 = 400.0;
/// Submerged bounding-box corners needed to count as in water.
pub const WATER_CORNER_THRESHOLD: usize = 2;
pub const BOUNDING_BOX_CORNERS: usize = 8;

const DRAG_EPSILON: f32 = 1e-6;
const SPEED_EPSILON: f32 = 1e-3;

// `value` limited to `[min, max]`; unlike `f32::clamp` it never panics on inverted bounds.
fn clamp_range(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

fn lerp(from: f32, to: f32, amount: f32) -> f32 {
    from + (to - from) * amount
}

/// Log-based thrust-to-weight adjustment; exactly 1 at the profile's base weight.
pub fn weight_penalty(dry_mass: f32, profile: &FlightProfile) -> f32 {
    1.0 - profile.weight_factor * (dry_mass / profile.base_weight).ln()
}

pub fn thrust(dry_mass: f32, profile: &FlightProfile) -> f32 {
    let twr = clamp_range(
        profile.base_twr * weight_penalty(dry_mass, profile),
        profile.minimum_twr,
        profile.maximum_twr,
    );
    dry_mass * GRAVITY * twr * profile.speed_factor
}

/// Density of the medium the ship flies through; 0 in vacuum.
pub fn fluid_density(state: &ShipState) -> f32 {
    if state.in_water {
        let factor = if state.is_submerged {
            SUBMERGED_DENSITY_FACTOR
        } else {
            1.0
        };
        WATER_DENSITY * factor
    } else if state.in_atmosphere() {
        AIR_DENSITY * state.air_density
    } else {
        0.0
    }
}

/// Angle in radians between the flight direction and gravity; 0 is a vertical dive.
pub fn dive_angle(velocity: Vec3, gravity: Vec3) -> Option<f32> {
    let direction = velocity.try_normalize()?;
    let down = gravity.try_normalize()?;
    Some(direction.dot(down).clamp(-1.0, 1.0).acos())
}

/// Inputs of the drag model that depend on where the ship is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightEnvironment {
    pub fluid_density: f32,
    // Present only in atmosphere outside water while moving under gravity.
    pub dive_angle: Option<f32>,
}

impl FlightEnvironment {
    pub fn new(state: &ShipState, velocity: Vec3, gravity: Vec3) -> Self {
        let dive_angle = if state.in_atmosphere() && !state.in_water {
            dive_angle(velocity, gravity)
        } else {
            None
        };
        Self {
            fluid_density: fluid_density(state),
            dive_angle,
        }
    }
}

pub fn fluid_drag(dry_mass: f32, profile: &FlightProfile, environment: &FlightEnvironment) -> f32 {
    let frontal_area = FRONT_AREA_FACTOR * dry_mass;
    let drag = 0.5 * environment.fluid_density * profile.drag_coefficient * frontal_area;

    match environment.dive_angle {
        Some(angle) if angle.to_degrees() <= DIVE_MIN_ANGLE_DEGREES => {
            drag - drag * DIVE_MAX_DRAG_REDUCTION * angle.sin().abs()
        }
        _ => drag,
    }
}

/// Terminal speed where thrust balances drag.
///
/// `None` when drag cannot bound the speed (vacuum) or the mass is not usable
/// yet; the caller then falls back to the size-class ceiling.
pub fn base_max_speed(
    dry_mass: f32,
    profile: &FlightProfile,
    environment: &FlightEnvironment,
) -> Option<f32> {
    if dry_mass.is_nan() || dry_mass <= 0.0 {
        return None;
    }
    let drag = fluid_drag(dry_mass, profile, environment);
    if drag.is_nan() || drag <= DRAG_EPSILON {
        return None;
    }
    let speed = (2.0 * thrust(dry_mass, profile) / drag).sqrt();
    speed.is_finite().then_some(speed)
}

/// Maximum angular speed in rad/s. X is roll, Y pitch and Z yaw.
pub fn max_turn_rate(
    angular_velocity: Vec3,
    current_speed: f32,
    dry_mass: f32,
    profile: &FlightProfile,
) -> f32 {
    let roll = angular_velocity.x.abs();
    let pitch = angular_velocity.y.abs();
    let yaw = angular_velocity.z.abs();
    if roll > pitch && roll > yaw {
        return MAX_ROLL_RATE;
    }

    let minimum = profile.minimum_turn_rate.to_radians();
    let maximum = profile.maximum_turn_rate.to_radians();
    if current_speed < SPEED_EPSILON || dry_mass.is_nan() || dry_mass <= 0.0 {
        return maximum;
    }

    let weight_factor = (profile.base_weight / dry_mass).powf(profile.turn_rate_weight_factor);
    let speed_factor =
        (profile.base_turn_rate_speed / current_speed).powf(profile.turn_rate_speed_factor);
    let target = profile.base_turn_rate.to_radians() * weight_factor * speed_factor;
    if target.is_nan() {
        return maximum;
    }
    clamp_range(target, minimum, maximum)
}

/// Applies the optional boost multiplier and the size-class ceiling.
pub fn cap_speed(base: Option<f32>, boost_multiplier: Option<f32>, ceiling: f32) -> f32 {
    let speed = base.unwrap_or(ceiling) * boost_multiplier.unwrap_or(1.0);
    clamp_range(speed, 0.0, ceiling)
}

/// Speed to write back for a ship over its cap. Large excesses ramp down.
pub fn smooth_linear(speed: f32, max_speed: f32) -> f32 {
    if speed <= max_speed {
        return speed;
    }
    if speed - max_speed >= SPEED_SNAP_THRESHOLD {
        lerp(speed, max_speed, SPEED_RAMPDOWN)
    } else {
        max_speed
    }
}

pub fn smooth_angular(rate: f32, max_rate: f32) -> f32 {
    if rate <= max_rate {
        return rate;
    }
    lerp(rate, max_rate, TURN_RATE_RAMPDOWN)
}
