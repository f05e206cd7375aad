//! Terrain sensing ahead of the camera
//!
//! Two downward probes classify what lies ahead of the follow target along
//! the camera heading. The long hill probe starts high above the ground; if it
//! finds nothing the short cliff probe checks closer in. The outcome is a
//! ratio used to blend the automatic camera placement toward the bump
//! height and distance, which themselves relax toward the deciding probe's
//! targets.

use glam::Vec3;
use platformer_core::{normalized_span, SmoothDamp};
use platformer_physics::{RaycastHit, Raycaster};

use super::HeightAttributes;

/// Result of one sensing pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Blend ratio: 0 for flat ground, rising with hills, 1 for a sheer drop
    pub ratio: f32,
    pub bump_height: f32,
    pub bump_distance: f32,
    pub hit: Option<RaycastHit>,
}

/// Which probe decided the last reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Hill,
    Cliff,
}

/// Smoothed sensor state carried between frames
#[derive(Debug, Clone)]
pub struct HeightSensor {
    /// Time for the bump values to settle
    pub smoothing_time: f32,
    bump_height: f32,
    bump_distance: f32,
    height_velocity: f32,
    distance_velocity: f32,
    ratio: f32,
    terrain: Terrain,
    last_hit: Option<RaycastHit>,
}

impl HeightSensor {
    pub fn new(smoothing_time: f32) -> Self {
        Self {
            smoothing_time,
            bump_height: 0.0,
            bump_distance: 0.0,
            height_velocity: 0.0,
            distance_velocity: 0.0,
            ratio: 0.0,
            terrain: Terrain::Hill,
            last_hit: None,
        }
    }

    /// Probe the terrain and advance the smoothed bump values by one frame.
    ///
    /// `down` is the probe direction (usually the follow target's down axis),
    /// `heading` the flattened camera forward.
    pub fn sense(
        &mut self,
        attrs: &HeightAttributes,
        origin: Vec3,
        down: Vec3,
        heading: Vec3,
        world: &impl Raycaster,
        dt: f32,
    ) -> SensorReading {
        let hill = attrs.hill;
        let hill_start = origin + heading * hill.cast_away_distance - down * hill.max_cast_distance;
        let near = origin.distance(hill_start + down * hill.max_cast_distance);
        let far = origin.distance(hill_start);

        let target = if let Some(hit) = world.cast(hill_start, down, hill.max_cast_distance, attrs.mask) {
            self.ratio = normalized_span(origin.distance(hit.point), near, far, 0.0);
            self.terrain = Terrain::Hill;
            self.last_hit = Some(hit);
            hill
        } else {
            let cliff = attrs.cliff;
            let cliff_start = origin + heading * cliff.cast_away_distance;
            let near = origin.distance(cliff_start);
            let far = origin.distance(cliff_start + down * cliff.max_cast_distance);

            self.last_hit = world.cast(cliff_start, down, cliff.max_cast_distance, attrs.mask);
            self.ratio = match self.last_hit {
                Some(hit) => normalized_span(origin.distance(hit.point), near, far, 1.0),
                None => 1.0,
            };
            self.terrain = Terrain::Cliff;
            cliff
        };

        (self.bump_height, self.height_velocity) = f32::smooth_damp(
            self.bump_height,
            target.height,
            self.height_velocity,
            self.smoothing_time,
            dt,
        );
        (self.bump_distance, self.distance_velocity) = f32::smooth_damp(
            self.bump_distance,
            target.distance,
            self.distance_velocity,
            self.smoothing_time,
            dt,
        );

        self.reading()
    }

    /// Latest values without probing again
    pub fn reading(&self) -> SensorReading {
        SensorReading {
            ratio: self.ratio,
            bump_height: self.bump_height,
            bump_distance: self.bump_distance,
            hit: self.last_hit,
        }
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Last probe hit, kept for diagnostics
    pub fn last_hit(&self) -> Option<&RaycastHit> {
        self.last_hit.as_ref()
    }
}

impl Default for HeightSensor {
    fn default() -> Self {
        Self::new(0.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platformer_core::LayerMask;
    use platformer_physics::EmptyWorld;

    /// Flat ground at `height` everywhere
    fn ground(height: f32) -> impl Fn(Vec3, Vec3, f32, LayerMask) -> Option<RaycastHit> {
        move |origin, direction, max_distance, _| {
            if direction.y >= 0.0 {
                return None;
            }
            let distance = (origin.y - height) / -direction.y;
            (distance >= 0.0 && distance <= max_distance)
                .then(|| RaycastHit::new(origin + direction * distance, Vec3::Y, distance))
        }
    }

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_flat_ground_reads_zero() {
        let mut sensor = HeightSensor::default();
        let attrs = HeightAttributes::default();
        let reading = sensor.sense(&attrs, Vec3::ZERO, -Vec3::Y, -Vec3::Z, &ground(0.0), DT);
        assert!(reading.ratio.abs() < 1e-5);
        assert_eq!(sensor.terrain(), Terrain::Hill);
        assert!(sensor.last_hit().is_some());
    }

    #[test]
    fn test_rising_ground_raises_ratio() {
        let mut sensor = HeightSensor::default();
        let attrs = HeightAttributes::default();
        let reading = sensor.sense(&attrs, Vec3::ZERO, -Vec3::Y, -Vec3::Z, &ground(50.0), DT);
        assert!(reading.ratio > 0.3 && reading.ratio < 1.0);
    }

    #[test]
    fn test_total_miss_is_sheer_cliff() {
        let mut sensor = HeightSensor::default();
        let attrs = HeightAttributes::default();
        let reading = sensor.sense(&attrs, Vec3::ZERO, -Vec3::Y, -Vec3::Z, &EmptyWorld, DT);
        assert_eq!(reading.ratio, 1.0);
        assert_eq!(sensor.terrain(), Terrain::Cliff);
        assert!(reading.hit.is_none());
    }

    #[test]
    fn test_shallow_drop_hits_cliff_probe() {
        let mut sensor = HeightSensor::default();
        let attrs = HeightAttributes::default();
        // The hill probe stops at the origin's height, so ground below it is only seen by the cliff probe
        let reading = sensor.sense(&attrs, Vec3::ZERO, -Vec3::Y, -Vec3::Z, &ground(-10.0), DT);
        assert_eq!(sensor.terrain(), Terrain::Cliff);
        assert!(reading.ratio > 0.0 && reading.ratio < 1.0);
    }

    #[test]
    fn test_bump_values_relax_without_snapping() {
        let mut sensor = HeightSensor::default();
        let attrs = HeightAttributes::default();
        let first = sensor.sense(&attrs, Vec3::ZERO, -Vec3::Y, -Vec3::Z, &EmptyWorld, DT);
        assert!(first.bump_height > 0.0 && first.bump_height < attrs.cliff.height);

        let mut reading = first;
        for _ in 0..600 {
            reading = sensor.sense(&attrs, Vec3::ZERO, -Vec3::Y, -Vec3::Z, &EmptyWorld, DT);
        }
        assert!((reading.bump_height - attrs.cliff.height).abs() < 1e-2);
        assert!((reading.bump_distance - attrs.cliff.distance).abs() < 1e-2);
    }
}
