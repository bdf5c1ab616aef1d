use crate::geo::{geo_point::GeoPoint, kilometers::Kilometers};

pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Great-circle distance between two coordinates, using the Haversine formula.
pub fn haversine_distance(from: &GeoPoint, to: &GeoPoint) -> Kilometers {
    let lat1_rad = from.lat.to_radians();
    let lon1_rad = from.lng.to_radians();
    let lat2_rad = to.lat.to_radians();
    let lon2_rad = to.lng.to_radians();

    let delta_lat = lat2_rad - lat1_rad;
    let delta_lon = lon2_rad - lon1_rad;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Kilometers::new(EARTH_RADIUS_KM * c)
}

pub fn distance_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    haversine_distance(from, to).value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_itself_is_zero() {
        for point in [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(12.90, 77.58),
            GeoPoint::new(-36.8485, 174.7633),
            GeoPoint::new(89.9, -179.9),
        ] {
            assert_eq!(distance_km(&point, &point), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (GeoPoint::new(12.90, 77.58), GeoPoint::new(13.02, 77.64)),
            (GeoPoint::new(51.505, -0.09), GeoPoint::new(48.8566, 2.3522)),
            (GeoPoint::new(-33.86, 151.2), GeoPoint::new(40.71, -74.0)),
        ];

        for (a, b) in pairs {
            let forward = distance_km(&a, &b);
            let backward = distance_km(&b, &a);
            assert!((forward - backward).abs() < 1e-9, "{forward} != {backward}");
        }
    }

    #[test]
    fn one_degree_of_latitude() {
        let distance = distance_km(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(1.0, 0.0));
        assert!((distance - 111.194_926_6).abs() < 1e-6);
    }

    #[test]
    fn london_to_paris() {
        let london = GeoPoint::new(51.5074, -0.1278);
        let paris = GeoPoint::new(48.8566, 2.3522);
        let distance = distance_km(&london, &paris);
        assert!((distance - 343.5).abs() < 1.0, "got {distance}");
    }
}
