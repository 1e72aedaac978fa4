//! Force model shared by every moving body
//!
//! The resultant force is rebuilt from zero each tick: residual gravity,
//! quadratic shape resistance against the medium, buoyancy in water and
//! friction on the ground. Integration happens later in each entity system.

use crate::game::body::{Body, Medium};
use crate::game::constants::physics::{
    AIR_RESISTANCE_UNIT, G, GROUND_FRICTION, MAX_RESISTANCE_FORCE, WATER_DENSITY, WATER_RESISTANCE_UNIT,
};
use crate::util::vec2::Vec2;

/// Rebuild `body.force` for this tick. `wind` only matters in air.
pub fn calculate(body: &mut Body, wind: Vec2) {
    body.force = Vec2::ZERO;
    body.force.y += body.mass * body.residual_gravity * G;

    let relative = if body.medium == Medium::Air {
        body.velocity - wind
    } else {
        body.velocity
    };
    let unit = match body.medium {
        Medium::Water => WATER_RESISTANCE_UNIT,
        Medium::Air | Medium::Ground => AIR_RESISTANCE_UNIT,
    } * body.resistance_rate;
    body.force.x -= shape_resistance(relative.x, unit);
    body.force.y -= shape_resistance(relative.y, unit);

    match body.medium {
        Medium::Water => body.force.y -= WATER_DENSITY * G * body.capacity,
        Medium::Ground => body.force.x -= ground_friction(body),
        Medium::Air => {}
    }
}

/// Signed, capped `unit * v²`
#[inline]
fn shape_resistance(velocity: f32, unit: f32) -> f32 {
    let magnitude = (unit * velocity * velocity).min(MAX_RESISTANCE_FORCE);
    if velocity > 0.0 {
        magnitude
    } else {
        -magnitude
    }
}

/// Friction opposing horizontal motion, proportional to the vertical force.
/// Never larger than what stops the body within this tick, and zero for a
/// body at rest.
fn ground_friction(body: &Body) -> f32 {
    let vx = body.velocity.x + body.force.x / body.mass;
    if vx == 0.0 || !vx.is_finite() {
        return 0.0;
    }
    let magnitude = (GROUND_FRICTION * body.force.y.abs()).min(vx.abs() * body.mass);
    magnitude.copysign(vx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{DECORATION_BODY, WORM_BODY};

    fn create_test_body(medium: Medium, velocity: Vec2) -> Body {
        let mut body = Body::new(WORM_BODY, Vec2::new(100.0, 100.0));
        body.medium = medium;
        body.velocity = velocity;
        body
    }

    #[test]
    fn test_gravity_at_rest_in_air() {
        let mut body = create_test_body(Medium::Air, Vec2::ZERO);
        calculate(&mut body, Vec2::ZERO);
        assert_eq!(body.force, Vec2::new(0.0, G));
    }

    #[test]
    fn test_force_is_rebuilt_each_tick() {
        let mut body = create_test_body(Medium::Air, Vec2::ZERO);
        body.force = Vec2::new(50.0, -50.0);
        calculate(&mut body, Vec2::ZERO);
        assert_eq!(body.force, Vec2::new(0.0, G));
    }

    #[test]
    fn test_drag_opposes_motion() {
        let mut body = create_test_body(Medium::Air, Vec2::new(5.0, -5.0));
        calculate(&mut body, Vec2::ZERO);
        let drag = AIR_RESISTANCE_UNIT * WORM_BODY.resistance_rate * 25.0;
        assert!((body.force.x + drag).abs() < 1e-6);
        assert!((body.force.y - (G + drag)).abs() < 1e-6);
    }

    #[test]
    fn test_drag_is_capped() {
        let mut body = Body::new(DECORATION_BODY, Vec2::ZERO);
        body.velocity = Vec2::new(1000.0, 0.0);
        calculate(&mut body, Vec2::ZERO);
        assert_eq!(body.force.x, -MAX_RESISTANCE_FORCE);
    }

    #[test]
    fn test_wind_only_in_air() {
        let wind = Vec2::new(2.0, 0.0);
        let mut air = create_test_body(Medium::Air, Vec2::ZERO);
        calculate(&mut air, wind);
        assert!(air.force.x > 0.0);

        let mut water = create_test_body(Medium::Water, Vec2::ZERO);
        calculate(&mut water, wind);
        assert_eq!(water.force.x, 0.0);
    }

    #[test]
    fn test_buoyancy_in_water() {
        let mut body = create_test_body(Medium::Water, Vec2::ZERO);
        calculate(&mut body, Vec2::ZERO);
        let expected = G - WATER_DENSITY * G * WORM_BODY.capacity;
        assert!((body.force.y - expected).abs() < 1e-6);
    }

    #[test]
    fn test_ground_friction_stops_without_reversing() {
        let mut resting = create_test_body(Medium::Ground, Vec2::ZERO);
        calculate(&mut resting, Vec2::ZERO);
        assert_eq!(resting.force.x, 0.0);

        let mut sliding = create_test_body(Medium::Ground, Vec2::new(1.0, 0.0));
        calculate(&mut sliding, Vec2::ZERO);
        assert!(sliding.force.x < 0.0);
        assert!(sliding.velocity.x + sliding.force.x / sliding.mass >= 0.0);

        let mut creeping = create_test_body(Medium::Ground, Vec2::new(-0.01, 0.0));
        calculate(&mut creeping, Vec2::ZERO);
        let next = creeping.velocity.x + creeping.force.x / creeping.mass;
        assert!(next.abs() < 1e-6);
    }
}
