//! Transverse Mercator on the WGS84 ellipsoid, parameterized per UTM zone.
//!
//! Uses the Krüger n-series to third order, which is good to well under a
//! millimetre across a zone.

use crate::error::ProjectionError;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;

/// Forward and inverse transform for one UTM zone (northern hemisphere).
#[derive(Debug, Clone, PartialEq)]
pub struct UtmProjection {
    zone: u8,
    lon0_deg: f64,
    /// Central meridian, radians
    lon0: f64,
    /// Rectifying radius scaled by k0
    k0_a: f64,
    e: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl UtmProjection {
    pub fn new(zone: u8) -> Result<Self, ProjectionError> {
        if !(1..=60).contains(&zone) {
            return Err(ProjectionError::InvalidZone(zone));
        }

        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let a_rect = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

        let lon0_deg = zone as f64 * 6.0 - 183.0;

        Ok(Self {
            zone,
            lon0_deg,
            lon0: lon0_deg.to_radians(),
            k0_a: K0 * a_rect,
            e: 2.0 * n.sqrt() / (1.0 + n),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        })
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    /// Central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        self.lon0_deg
    }

    /// (lat, lon) in degrees → (easting, northing) in metres.
    pub fn forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let dl = lon.to_radians() - self.lon0;

        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - self.e * (self.e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(dl.cos());
        let eta_p = (dl.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        (FALSE_EASTING + self.k0_a * eta, self.k0_a * xi)
    }

    /// (easting, northing) in metres → (lat, lon) in degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> Result<(f64, f64), ProjectionError> {
        let xi = northing / self.k0_a;
        let eta = (easting - FALSE_EASTING) / self.k0_a;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, d) in self.delta.iter().enumerate() {
            phi += d * (2.0 * (j + 1) as f64 * chi).sin();
        }
        let lon = self.lon0 + eta_p.sinh().atan2(xi_p.cos());

        let (lat, lon) = (phi.to_degrees(), lon.to_degrees());
        if lat.is_finite() && lon.is_finite() {
            Ok((lat, lon))
        } else {
            Err(ProjectionError::NonFinite {
                zone: self.zone,
                easting,
                northing,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_zones() {
        assert_eq!(UtmProjection::new(0), Err(ProjectionError::InvalidZone(0)));
        assert_eq!(UtmProjection::new(61), Err(ProjectionError::InvalidZone(61)));
        assert!(UtmProjection::new(1).is_ok());
        assert!(UtmProjection::new(60).is_ok());
    }

    #[test]
    fn test_central_meridian() {
        assert_eq!(UtmProjection::new(13).unwrap().central_meridian(), -105.0);
        assert_eq!(UtmProjection::new(12).unwrap().central_meridian(), -111.0);
        assert_eq!(UtmProjection::new(31).unwrap().central_meridian(), 3.0);
    }

    #[test]
    fn test_known_forward_point() {
        // 40°N on the zone 13 central meridian
        let p = UtmProjection::new(13).unwrap();
        let (e, n) = p.forward(40.0, -105.0);
        assert!((e - 500_000.0).abs() < 1e-6, "easting {}", e);
        assert!((n - 4_427_757.219).abs() < 0.01, "northing {}", n);
    }

    #[test]
    fn test_known_inverse_point() {
        let p = UtmProjection::new(13).unwrap();
        let (lat, lon) = p.inverse(350_000.0, 3_800_000.0).unwrap();
        assert!((lat - 34.330_445_305).abs() < 1e-6, "lat {}", lat);
        assert!((lon - -106.630_554_181).abs() < 1e-6, "lon {}", lon);
    }

    #[test]
    fn test_equator_on_central_meridian() {
        let p = UtmProjection::new(13).unwrap();
        let (lat, lon) = p.inverse(500_000.0, 0.0).unwrap();
        assert!(lat.abs() < 1e-12);
        assert!((lon - -105.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_across_new_mexico() {
        let p = UtmProjection::new(13).unwrap();
        for (lat, lon) in [(34.5, -106.0), (32.0, -103.2), (36.9, -108.9)] {
            let (e, n) = p.forward(lat, lon);
            let (lat2, lon2) = p.inverse(e, n).unwrap();
            assert!((lat - lat2).abs() < 1e-7, "lat {} vs {}", lat, lat2);
            assert!((lon - lon2).abs() < 1e-7, "lon {} vs {}", lon, lon2);
        }
    }
}
