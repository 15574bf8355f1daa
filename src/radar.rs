use crate::{border::Border, config::RadarConfig, geometry::Point, vehicle::Vehicle};

/// Distance from `origin` along `angle` degrees to the first pixel that is not open track, capped
/// at `max_range`. Leaving the bitmap counts as hitting something.
pub fn probe(origin: Point, angle: f64, border: &Border, max_range: u32) -> u32 {
    let (sin, cos) = angle.to_radians().sin_cos();
    let (ox, oy) = (origin.x as f64, origin.y as f64);

    let mut d = 0;
    loop {
        let at = Point::new(
            (ox + cos * d as f64).trunc() as i64,
            ((oy - sin * d as f64).trunc() as i64).max(1),
        );
        if d >= max_range || !border.is_open(at) {
            return d;
        }
        d += 1;
    }
}

/// A fixed fan of probes, relative to the car's heading
#[derive(Debug, Clone, PartialEq)]
pub struct Radar {
    angles: Vec<f64>,
    max_len: u32,
}

impl Radar {
    pub fn new(angles: Vec<f64>, max_len: u32) -> Self {
        Self { angles, max_len }
    }

    pub fn from_config(config: &RadarConfig) -> Self {
        Self::new(config.angles.clone(), config.max_len)
    }

    /// Probe count, which is also the controller's input size
    #[inline]
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    #[inline]
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    #[inline]
    pub fn max_len(&self) -> u32 {
        self.max_len
    }

    /// Refresh `vehicle.distances` from its current pose
    pub fn sense(&self, vehicle: &mut Vehicle, border: &Border) {
        let origin = vehicle.center();
        vehicle.distances.resize(self.angles.len(), 0);
        for (slot, offset) in vehicle.distances.iter_mut().zip(&self.angles) {
            *slot = probe(origin, vehicle.heading + offset, border, self.max_len);
        }
    }
}
