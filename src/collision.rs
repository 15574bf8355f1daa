use crate::{border::Border, geometry::Point, vehicle::Vehicle};

/// First border pixel touched by the car's rotated sprite, in the sprite's rotated frame.
///
/// The rotated sprite is centred where the unrotated one was, the way a rotated blit keeps its
/// centre, so its top-left moves out as the bounding box grows.
pub fn contact(vehicle: &Vehicle, border: &Border) -> Option<Point> {
    let sprite = vehicle.sprite();
    let mask = sprite.rotated(vehicle.heading);
    let center = vehicle.center();
    let origin = Point::new(
        center.x - (mask.width() / 2) as i64,
        center.y - (mask.height() / 2) as i64,
    );
    mask.overlap(border.mask(), border.origin() - origin)
}

#[inline]
pub fn collides(vehicle: &Vehicle, border: &Border) -> bool {
    contact(vehicle, border).is_some()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        bitmap::{Bitmap, Rgba},
        sprite::Sprite,
        vehicle::Handling,
    };
    use std::sync::Arc;

    const OPEN: Rgba = Rgba::new(255, 255, 255, 0);
    const WALL: Rgba = Rgba::new(20, 20, 20, 255);

    fn arena(origin: Point) -> Border {
        let mut bitmap = Bitmap::new(60, 40, OPEN);
        for x in 0..60 {
            bitmap.set(x, 0, WALL);
            bitmap.set(x, 39, WALL);
        }
        for y in 0..40 {
            bitmap.set(0, y, WALL);
            bitmap.set(59, y, WALL);
        }
        Border::new(origin, bitmap, OPEN)
    }

    fn car_at(x: f64, y: f64) -> Vehicle {
        Vehicle::new(x, y, Arc::new(Sprite::solid(0, 10, 4)), Handling::default(), 1)
    }

    #[test]
    fn test_clear_of_walls() {
        assert!(!collides(&car_at(20., 15.), &arena(Point::default())));
    }

    #[test]
    fn test_touching_wall() {
        let border = arena(Point::default());
        // sprite spans x 49..=58, clear of the wall at 59
        assert!(!collides(&car_at(49., 15.), &border));
        assert!(collides(&car_at(50., 15.), &border));
        assert!(collides(&car_at(20., 0.), &border));
    }

    #[test]
    fn test_border_origin_offsets() {
        let border = arena(Point::new(100, 50));
        assert!(!collides(&car_at(120., 65.), &border));
        assert!(collides(&car_at(150., 65.), &border));
        // entirely outside the bitmap there is nothing to hit
        assert!(!collides(&car_at(0., 0.), &border));
    }

    #[test]
    fn test_rotation_reaches_wall() {
        let border = arena(Point::default());
        // tall after a quarter turn: spans y 12..=21 around centre (25, 17)
        let mut car = car_at(20., 15.);
        car.heading = 90.;
        assert!(!collides(&car, &border));

        // a car lying flat near the floor only hits it once turned upright
        let mut car = car_at(20., 33.);
        assert!(!collides(&car, &border));
        car.heading = 90.;
        assert_eq!(contact(&car, &border).map(|p| p.y), Some(9));
    }

    #[test]
    fn test_y_is_rounded() {
        let border = arena(Point::default());
        // 35.6 rounds to 36, putting the bottom row of the sprite on the floor wall
        assert!(!collides(&car_at(20., 34.4), &border));
        assert!(collides(&car_at(20., 35.6), &border));
    }
}
