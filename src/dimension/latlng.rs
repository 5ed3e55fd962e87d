//! Points on the Earth's surface.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;

use geo_traits::{CoordTrait, RectTrait};
use once_cell::sync::OnceCell;

use crate::dimension::Dimensional;
use crate::error::{KDTreeError, Result};

/// Minimum latitude, in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum latitude, in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum longitude, in degrees.
pub const MIN_LNG: f64 = -180.0;
/// Maximum longitude, in degrees.
pub const MAX_LNG: f64 = 180.0;
/// Radius of the Earth in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Width of the longitude range; shifting a longitude by this much names the same meridian.
pub(crate) const WRAP_LNG: f64 = MAX_LNG - MIN_LNG;

/// Access to latitude and longitude, shared by the geographic [`Dimensional`] types.
pub trait GeoPoint: Dimensional {
    /// Latitude in degrees.
    fn lat(&self) -> f64;

    /// Longitude in degrees.
    fn lng(&self) -> f64;

    /// A copy of this point with a different longitude.
    fn with_lng(&self, lng: f64) -> Self;

    /// The same location written on the other side of the ±180° seam: longitude 160 becomes
    /// -200 and -160 becomes 200. Longitude 0 is returned unchanged.
    fn mirrored(&self) -> Self {
        let lng = self.lng();
        if lng > 0.0 {
            self.with_lng(lng - WRAP_LNG)
        } else if lng < 0.0 {
            self.with_lng(lng + WRAP_LNG)
        } else {
            self.clone()
        }
    }
}

/// A latitude/longitude pair. Coordinate 0 is latitude and coordinate 1 is longitude.
///
/// Distance is the great-circle distance in kilometers (haversine formula). Use
/// [`TunnelLatLng`] to rank by straight-line distance through the Earth instead.
#[derive(Debug, Clone)]
pub struct LatLng {
    lat: f64,
    lng: f64,
    lat_rad: f64,
    lng_rad: f64,
    /// Cartesian projection, computed on first use by [`LatLng::tunnel_distance`].
    cartesian: OnceCell<[f64; 3]>,
}

impl LatLng {
    /// Create a point. Values are not range-checked, so mirrored longitudes outside ±180° are
    /// allowed.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            lat_rad: lat.to_radians(),
            lng_rad: lng.to_radians(),
            cartesian: OnceCell::new(),
        }
    }

    /// Create a point, checking that latitude is within ±90° and longitude within ±180°.
    pub fn try_new(lat: f64, lng: f64) -> Result<Self> {
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(KDTreeError::InvalidCoordinate {
                name: "latitude",
                value: lat,
            });
        }
        if !(MIN_LNG..=MAX_LNG).contains(&lng) {
            return Err(KDTreeError::InvalidCoordinate {
                name: "longitude",
                value: lng,
            });
        }
        Ok(Self::new(lat, lng))
    }

    /// Create a point from a coordinate with `x` = longitude and `y` = latitude.
    pub fn from_coord(coord: &impl CoordTrait<T = f64>) -> Self {
        Self::new(coord.y(), coord.x())
    }

    /// Great-circle distance in kilometers.
    pub fn haversine_distance(&self, other: &LatLng) -> f64 {
        let dlat = other.lat_rad - self.lat_rad;
        let dlng = other.lng_rad - self.lng_rad;
        let a = (dlat / 2.0).sin().powi(2)
            + self.lat_rad.cos() * other.lat_rad.cos() * (dlng / 2.0).sin().powi(2);
        // rounding can push `a` past 1 for antipodal points
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Straight-line distance in kilometers between the two points' positions in 3-d space.
    pub fn tunnel_distance(&self, other: &LatLng) -> f64 {
        let [x1, y1, z1] = *self.cartesian();
        let [x2, y2, z2] = *other.cartesian();
        ((x1 - x2).powi(2) + (y1 - y2).powi(2) + (z1 - z2).powi(2)).sqrt()
    }

    /// Great-circle angle in radians from this point to the nearest point whose coordinate
    /// `axis` equals `value`.
    ///
    /// Along latitude that is the difference in latitude. Along longitude it is the cross-track
    /// angle to the meridian at `value` while the meridian is within 90° of longitude, and the
    /// angle to the nearer pole beyond that.
    pub fn angle_to_split(&self, axis: usize, value: f64) -> Result<f64> {
        match axis {
            0 => Ok((self.lat_rad - value.to_radians()).abs()),
            1 => {
                // folded into [-pi, pi), so mirrored longitudes work too
                let dlng = (self.lng_rad - value.to_radians() + PI).rem_euclid(TAU) - PI;
                if dlng.abs() <= FRAC_PI_2 {
                    Ok((self.lat_rad.cos() * dlng.sin()).abs().min(1.0).asin())
                } else {
                    Ok(FRAC_PI_2 - self.lat_rad.abs())
                }
            }
            _ => Err(KDTreeError::CoordinateOutOfRange {
                index: axis,
                dimensions: 2,
            }),
        }
    }

    fn cartesian(&self) -> &[f64; 3] {
        self.cartesian.get_or_init(|| {
            let (sin_lat, cos_lat) = self.lat_rad.sin_cos();
            let (sin_lng, cos_lng) = self.lng_rad.sin_cos();
            [
                EARTH_RADIUS_KM * cos_lat * cos_lng,
                EARTH_RADIUS_KM * cos_lat * sin_lng,
                EARTH_RADIUS_KM * sin_lat,
            ]
        })
    }
}

impl PartialEq for LatLng {
    fn eq(&self, other: &Self) -> bool {
        self.lat == other.lat && self.lng == other.lng
    }
}

impl Dimensional for LatLng {
    fn num_dimensions(&self) -> usize {
        2
    }

    fn coordinate(&self, index: usize) -> Result<f64> {
        match index {
            0 => Ok(self.lat),
            1 => Ok(self.lng),
            _ => Err(KDTreeError::CoordinateOutOfRange {
                index,
                dimensions: 2,
            }),
        }
    }

    fn distance_to(&self, other: &Self) -> Result<f64> {
        Ok(self.haversine_distance(other))
    }

    fn with_coordinate(&self, index: usize, value: f64) -> Result<Self> {
        match index {
            0 => Ok(Self::new(value, self.lng)),
            1 => Ok(Self::new(self.lat, value)),
            _ => Err(KDTreeError::CoordinateOutOfRange {
                index,
                dimensions: 2,
            }),
        }
    }

    fn distance_to_split(&self, axis: usize, value: f64) -> Result<f64> {
        Ok(EARTH_RADIUS_KM * self.angle_to_split(axis, value)?)
    }
}

impl GeoPoint for LatLng {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lng(&self) -> f64 {
        self.lng
    }

    fn with_lng(&self, lng: f64) -> Self {
        Self::new(self.lat, lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LatLng({}, {})", self.lat, self.lng)
    }
}

/// A [`LatLng`] ranked by tunnel distance: the chord through the Earth between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelLatLng(pub LatLng);

impl TunnelLatLng {
    /// Create a point without range checks, like [`LatLng::new`].
    pub fn new(lat: f64, lng: f64) -> Self {
        Self(LatLng::new(lat, lng))
    }
}

impl From<LatLng> for TunnelLatLng {
    fn from(value: LatLng) -> Self {
        Self(value)
    }
}

impl Dimensional for TunnelLatLng {
    fn num_dimensions(&self) -> usize {
        2
    }

    fn coordinate(&self, index: usize) -> Result<f64> {
        self.0.coordinate(index)
    }

    fn distance_to(&self, other: &Self) -> Result<f64> {
        Ok(self.0.tunnel_distance(&other.0))
    }

    fn with_coordinate(&self, index: usize, value: f64) -> Result<Self> {
        self.0.with_coordinate(index, value).map(Self)
    }

    fn distance_to_split(&self, axis: usize, value: f64) -> Result<f64> {
        // chord of the great-circle bound
        let angle = self.0.angle_to_split(axis, value)?;
        Ok(2.0 * EARTH_RADIUS_KM * (angle / 2.0).sin())
    }
}

impl GeoPoint for TunnelLatLng {
    fn lat(&self) -> f64 {
        self.0.lat
    }

    fn lng(&self) -> f64 {
        self.0.lng
    }

    fn with_lng(&self, lng: f64) -> Self {
        Self(self.0.with_lng(lng))
    }
}

impl fmt::Display for TunnelLatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TunnelLatLng({}, {})", self.0.lat, self.0.lng)
    }
}

/// A latitude/longitude rectangle, such as a map viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBox {
    /// Southern edge, in degrees.
    pub min_lat: f64,
    /// Western edge, in degrees. May be below -180 for a box crossing the seam.
    pub min_lng: f64,
    /// Northern edge, in degrees.
    pub max_lat: f64,
    /// Eastern edge, in degrees. May be above 180 for a box crossing the seam.
    pub max_lng: f64,
}

impl LatLngBox {
    /// Create a box from its south-west and north-east corners.
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            min_lng,
            max_lat,
            max_lng,
        }
    }

    /// Create a box from a rectangle with `x` = longitude and `y` = latitude.
    pub fn from_rect(rect: &impl RectTrait<T = f64>) -> Self {
        let min = rect.min();
        let max = rect.max();
        Self::new(min.y(), min.x(), max.y(), max.x())
    }

    /// Whether the point lies in this box, written either way around the ±180° seam.
    pub fn contains<P: GeoPoint>(&self, point: &P) -> bool {
        self.contains_raw(point.lat(), point.lng()) || {
            let mirrored = point.mirrored();
            self.contains_raw(mirrored.lat(), mirrored.lng())
        }
    }

    #[inline]
    fn contains_raw(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}
