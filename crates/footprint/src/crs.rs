//! Coordinate reference systems and reprojection to and from WGS-84.
//!
//! UTM uses the Krüger series for the transverse Mercator projection
//! (third order in the third flattening `n`), which stays well under a
//! millimetre inside a zone.

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use geo::Coord;

use crate::error::{FootprintError, Result};

pub mod wgs84 {
    /// Semi-major axis (equatorial radius) in meters.
    pub const A: f64 = 6_378_137.0;

    /// Flattening factor (1 / 298.257223563).
    pub const F: f64 = 1.0 / 298.257_223_563;

    /// Third flattening.
    pub const N: f64 = F / (2.0 - F);
}

pub mod utm {
    /// Central meridian scale factor.
    pub const K0: f64 = 0.9996;

    pub const FALSE_EASTING_M: f64 = 500_000.0;

    /// Applied to the southern hemisphere only.
    pub const FALSE_NORTHING_SOUTH_M: f64 = 10_000_000.0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// EPSG:4326, coordinates are `(lon, lat)` in degrees.
    Wgs84,
    /// EPSG:3857 spherical Web Mercator, metres.
    WebMercator,
    /// EPSG:326zz (north) / 327zz (south), metres.
    Utm { zone: u8, north: bool },
}

impl Crs {
    pub fn from_epsg(code: u32) -> Result<Self> {
        match code {
            4326 => Ok(Crs::Wgs84),
            3857 => Ok(Crs::WebMercator),
            32601..=32660 => Ok(Crs::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(Crs::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => Err(FootprintError::UnsupportedEpsg(code)),
        }
    }

    pub fn epsg(self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
            Crs::Utm { zone, north: true } => 32600 + zone as u32,
            Crs::Utm { zone, north: false } => 32700 + zone as u32,
        }
    }

    /// Convert a coordinate in this CRS to WGS-84 `(lon, lat)` degrees.
    pub fn to_wgs84(self, c: Coord<f64>) -> Result<Coord<f64>> {
        let out = match self {
            Crs::Wgs84 => c,
            Crs::WebMercator => web_mercator_inverse(c),
            Crs::Utm { zone, north } => utm_inverse(c, zone, north),
        };
        check_geographic(out)
    }

    /// Convert a WGS-84 `(lon, lat)` coordinate into this CRS.
    pub fn from_wgs84(self, c: Coord<f64>) -> Result<Coord<f64>> {
        let c = check_geographic(c)?;
        Ok(match self {
            Crs::Wgs84 => c,
            Crs::WebMercator => web_mercator_forward(c),
            Crs::Utm { zone, north } => utm_forward(c, zone, north),
        })
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Reproject a single coordinate. Every path goes through WGS-84, so the
/// geographic range check also applies when `from == to`.
pub fn transform(c: Coord<f64>, from: Crs, to: Crs) -> Result<Coord<f64>> {
    to.from_wgs84(from.to_wgs84(c)?)
}

fn check_geographic(c: Coord<f64>) -> Result<Coord<f64>> {
    let in_range = c.x.is_finite()
        && c.y.is_finite()
        && (-180.0..=180.0).contains(&c.x)
        && (-90.0..=90.0).contains(&c.y);

    if in_range {
        Ok(c)
    } else {
        Err(FootprintError::OutOfRange { lon: c.x, lat: c.y })
    }
}

#[inline]
fn central_meridian_deg(zone: u8) -> f64 {
    zone as f64 * 6.0 - 183.0
}

/// Rectifying radius `A` scaled by the UTM scale factor.
#[inline]
fn k0_a() -> f64 {
    let n = wgs84::N;
    let n2 = n * n;
    utm::K0 * wgs84::A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0)
}

fn utm_inverse(c: Coord<f64>, zone: u8, north: bool) -> Coord<f64> {
    let n = wgs84::N;
    let (n2, n3) = (n * n, n * n * n);

    let beta = [
        n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
        n2 / 48.0 + n3 / 15.0,
        17.0 * n3 / 480.0,
    ];
    let delta = [
        2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
        7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
        56.0 * n3 / 15.0,
    ];

    let northing = if north {
        c.y
    } else {
        c.y - utm::FALSE_NORTHING_SOUTH_M
    };

    let xi = northing / k0_a();
    let eta = (c.x - utm::FALSE_EASTING_M) / k0_a();

    let mut xi_p = xi;
    let mut eta_p = eta;
    for (j, b) in beta.iter().enumerate() {
        let k = 2.0 * (j + 1) as f64;
        xi_p -= b * (k * xi).sin() * (k * eta).cosh();
        eta_p -= b * (k * xi).cos() * (k * eta).sinh();
    }

    // Conformal latitude, then geodetic latitude.
    let chi = (xi_p.sin() / eta_p.cosh()).asin();
    let mut lat = chi;
    for (j, d) in delta.iter().enumerate() {
        lat += d * (2.0 * (j + 1) as f64 * chi).sin();
    }

    let lon = central_meridian_deg(zone).to_radians() + eta_p.sinh().atan2(xi_p.cos());

    Coord {
        x: lon.to_degrees(),
        y: lat.to_degrees(),
    }
}

fn utm_forward(c: Coord<f64>, zone: u8, north: bool) -> Coord<f64> {
    let n = wgs84::N;
    let (n2, n3) = (n * n, n * n * n);

    let alpha = [
        n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
        13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
        61.0 * n3 / 240.0,
    ];

    let lat = c.y.to_radians();
    let dlon = (c.x - central_meridian_deg(zone)).to_radians();

    let e = 2.0 * n.sqrt() / (1.0 + n);
    let sin_lat = lat.sin();
    let t = (sin_lat.atanh() - e * (e * sin_lat).atanh()).sinh();

    let xi_p = t.atan2(dlon.cos());
    let eta_p = (dlon.sin() / (1.0 + t * t).sqrt()).atanh();

    let mut xi = xi_p;
    let mut eta = eta_p;
    for (j, a) in alpha.iter().enumerate() {
        let k = 2.0 * (j + 1) as f64;
        xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
        eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
    }

    let easting = utm::FALSE_EASTING_M + k0_a() * eta;
    let northing = k0_a() * xi;

    Coord {
        x: easting,
        y: if north {
            northing
        } else {
            northing + utm::FALSE_NORTHING_SOUTH_M
        },
    }
}

fn web_mercator_inverse(c: Coord<f64>) -> Coord<f64> {
    let lon = (c.x / wgs84::A).to_degrees();
    let lat = (2.0 * (c.y / wgs84::A).exp().atan() - FRAC_PI_2).to_degrees();
    Coord { x: lon, y: lat }
}

fn web_mercator_forward(c: Coord<f64>) -> Coord<f64> {
    // Clamp to the square Web Mercator extent.
    let lat = c.y.clamp(-85.051_128_78, 85.051_128_78).to_radians();
    Coord {
        x: wgs84::A * c.x.to_radians(),
        y: wgs84::A * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTM_13N: Crs = Crs::Utm {
        zone: 13,
        north: true,
    };

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn epsg_codes_round_trip_through_enum() {
        assert_eq!(Crs::from_epsg(32613).unwrap(), UTM_13N);
        assert_eq!(Crs::from_epsg(32733).unwrap().epsg(), 32733);
        assert_eq!(Crs::from_epsg(4326).unwrap(), Crs::Wgs84);
        assert_eq!(UTM_13N.to_string(), "EPSG:32613");
    }

    #[test]
    fn unknown_epsg_is_rejected() {
        assert!(matches!(
            Crs::from_epsg(32661),
            Err(FootprintError::UnsupportedEpsg(32661))
        ));
        assert!(Crs::from_epsg(2056).is_err());
    }

    #[test]
    fn utm_origin_maps_to_central_meridian_on_equator() {
        let ll = UTM_13N
            .to_wgs84(Coord {
                x: 500_000.0,
                y: 0.0,
            })
            .unwrap();
        assert!(close(ll.x, -105.0, 1e-9));
        assert!(close(ll.y, 0.0, 1e-9));
    }

    #[test]
    fn utm_meridian_arc_at_45_degrees() {
        // WGS-84 meridian distance to 45°N is 4 984 944.378 m; UTM scales it by k0.
        let ll = UTM_13N
            .to_wgs84(Coord {
                x: 500_000.0,
                y: 4_984_944.378 * utm::K0,
            })
            .unwrap();
        assert!(close(ll.y, 45.0, 1e-6), "lat = {}", ll.y);
        assert!(close(ll.x, -105.0, 1e-9));
    }

    #[test]
    fn utm_forward_inverts_inverse_near_boulder_county() {
        let ll = Coord {
            x: -105.1631,
            y: 39.9553,
        };
        let en = UTM_13N.from_wgs84(ll).unwrap();
        // Louisville, CO sits just west of the zone 13 central meridian.
        assert!(en.x > 480_000.0 && en.x < 500_000.0, "easting = {}", en.x);
        assert!(en.y > 4_420_000.0 && en.y < 4_430_000.0, "northing = {}", en.y);

        let back = UTM_13N.to_wgs84(en).unwrap();
        assert!(close(back.x, ll.x, 1e-8));
        assert!(close(back.y, ll.y, 1e-8));
    }

    #[test]
    fn southern_zone_uses_false_northing() {
        let south = Crs::Utm {
            zone: 56,
            north: false,
        };
        let ll = south
            .to_wgs84(Coord {
                x: 500_000.0,
                y: 10_000_000.0,
            })
            .unwrap();
        assert!(close(ll.x, 153.0, 1e-9));
        assert!(close(ll.y, 0.0, 1e-9));

        let sydney = south
            .to_wgs84(Coord {
                x: 334_000.0,
                y: 6_252_000.0,
            })
            .unwrap();
        assert!(sydney.y < -33.0 && sydney.y > -35.0);
    }

    #[test]
    fn web_mercator_inverse_matches_known_point() {
        let ll = Crs::WebMercator
            .to_wgs84(Coord {
                x: 10_018_754.171_394_622,
                y: 0.0,
            })
            .unwrap();
        assert!(close(ll.x, 90.0, 1e-9));
        assert!(close(ll.y, 0.0, 1e-9));
    }

    #[test]
    fn geographic_input_out_of_range_is_rejected() {
        let err = Crs::Wgs84
            .to_wgs84(Coord { x: 481_234.0, y: 4_423_000.0 })
            .unwrap_err();
        assert!(matches!(err, FootprintError::OutOfRange { .. }));
    }

    #[test]
    fn identity_transform_still_checks_range() {
        let ll = Coord { x: -105.1, y: 39.9 };
        assert_eq!(transform(ll, Crs::Wgs84, Crs::Wgs84).unwrap(), ll);

        let err = transform(Coord { x: 486_000.0, y: 4_422_000.0 }, Crs::Wgs84, Crs::Wgs84)
            .unwrap_err();
        assert!(matches!(err, FootprintError::OutOfRange { .. }));
    }

    #[test]
    fn transform_between_projected_systems() {
        let en = Coord {
            x: 486_000.0,
            y: 4_422_000.0,
        };
        let merc = transform(en, UTM_13N, Crs::WebMercator).unwrap();
        let back = transform(merc, Crs::WebMercator, UTM_13N).unwrap();
        assert!(close(back.x, en.x, 1e-3));
        assert!(close(back.y, en.y, 1e-3));
    }
}
