//! Study space polygons and nearest-space lookup.
//!
//! The frontend draws polygons with Leaflet, which orders each vertex as
//! `[lat, lng]` under a `latlngs` key. Storage keeps `GeoJSON`, which orders
//! each vertex as `[lng, lat]` and wraps the ring in an outer array.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Polygon as exchanged with the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafletPolygon {
    pub latlngs: Vec<[f64; 2]>,
}

/// Polygon as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonPolygon {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

/// A position in `GeoJSON` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lng: f64,
    pub lat: f64,
}

impl Point {
    /// Build a point, rejecting anything on or past the antimeridian or the
    /// poles.
    pub fn new(lng: f64, lat: f64) -> Result<Self> {
        if !lng.is_finite() || lng <= -180.0 || lng >= 180.0 {
            return Err(Error::InvalidCoordinates(
                "longitude must be between -180 to 180".to_string(),
            ));
        }
        if !lat.is_finite() || lat <= -90.0 || lat >= 90.0 {
            return Err(Error::InvalidCoordinates(
                "latitude must be between -90 to 90".to_string(),
            ));
        }
        Ok(Self { lng, lat })
    }

    /// Great-circle distance in metres.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl LeafletPolygon {
    /// Validate and flip into storage order.
    pub fn to_geojson(&self) -> Result<GeoJsonPolygon> {
        if self.latlngs.len() < 3 {
            return Err(Error::InvalidPolygon(
                "polygon needs at least 3 points".to_string(),
            ));
        }
        let ring = self
            .latlngs
            .iter()
            .map(|&[lat, lng]| Point::new(lng, lat).map(|p| [p.lng, p.lat]))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| Error::InvalidPolygon(e.to_string()))?;
        Ok(GeoJsonPolygon {
            kind: "Polygon".to_string(),
            coordinates: vec![ring],
        })
    }
}

impl GeoJsonPolygon {
    /// Outer ring, or an empty slice for a polygon without rings.
    pub fn outer_ring(&self) -> &[[f64; 2]] {
        self.coordinates.first().map_or(&[], Vec::as_slice)
    }

    pub fn to_leaflet(&self) -> LeafletPolygon {
        LeafletPolygon {
            latlngs: self.outer_ring().iter().map(|&[lng, lat]| [lat, lng]).collect(),
        }
    }

    /// Even-odd ray cast against the outer ring in planar lng/lat.
    pub fn contains(&self, point: &Point) -> bool {
        let ring = self.outer_ring();
        let mut inside = false;
        let mut j = ring.len().wrapping_sub(1);
        for (i, &[xi, yi]) in ring.iter().enumerate() {
            let [xj, yj] = ring[j];
            if (yi > point.lat) != (yj > point.lat)
                && point.lng < (xj - xi) * (point.lat - yi) / (yj - yi) + xi
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Zero when the point lies inside, otherwise the distance to the
    /// nearest vertex. `None` for an empty polygon.
    pub fn distance_from(&self, point: &Point) -> Option<f64> {
        if self.contains(point) {
            return Some(0.0);
        }
        self.outer_ring()
            .iter()
            .map(|&[lng, lat]| point.distance_to(&Point { lng, lat }))
            .min_by(f64::total_cmp)
    }
}

/// Pick the item whose polygon is closest to `point`.
pub fn nearest<'a, T, F>(point: &Point, items: &'a [T], polygon_of: F) -> Option<&'a T>
where
    F: Fn(&T) -> &GeoJsonPolygon,
{
    items
        .iter()
        .filter_map(|item| polygon_of(item).distance_from(point).map(|d| (d, item)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, item)| item)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(lat: f64, lng: f64, size: f64) -> LeafletPolygon {
        LeafletPolygon {
            latlngs: vec![
                [lat, lng],
                [lat + size, lng],
                [lat + size, lng + size],
                [lat, lng + size],
            ],
        }
    }

    #[test]
    fn leaflet_round_trip_flips_axes() {
        let leaflet = square(43.78, -79.19, 0.001);
        let geo = leaflet.to_geojson().unwrap();
        assert_eq!(geo.kind, "Polygon");
        assert_eq!(geo.coordinates[0][0], [-79.19, 43.78]);
        assert_eq!(geo.to_leaflet(), leaflet);
    }

    #[test]
    fn serialized_shapes_match_wire_format() {
        let geo = square(1.0, 2.0, 1.0).to_geojson().unwrap();
        let json = serde_json::to_value(&geo).unwrap();
        assert_eq!(json["type"], "Polygon");
        assert_eq!(json["coordinates"][0][0][0], 2.0);
        let leaflet = serde_json::to_value(geo.to_leaflet()).unwrap();
        assert_eq!(leaflet["latlngs"][0][0], 1.0);
    }

    #[test]
    fn rejects_degenerate_or_out_of_range_polygons() {
        let two = LeafletPolygon {
            latlngs: vec![[0.0, 0.0], [1.0, 1.0]],
        };
        assert!(matches!(two.to_geojson(), Err(Error::InvalidPolygon(_))));
        assert!(square(89.9995, 0.0, 0.001).to_geojson().is_err());
    }

    #[test]
    fn point_bounds_are_strict() {
        assert!(Point::new(180.0, 0.0).is_err());
        assert!(Point::new(-180.0, 0.0).is_err());
        assert!(Point::new(0.0, 90.0).is_err());
        assert!(Point::new(0.0, f64::NAN).is_err());
        assert!(Point::new(179.999, -89.999).is_ok());
    }

    #[test]
    fn haversine_distance_is_plausible() {
        let a = Point::new(0.0, 0.0).unwrap();
        let b = Point::new(1.0, 0.0).unwrap();
        let d = a.distance_to(&b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
        assert!(a.distance_to(&a).abs() < f64::EPSILON);
    }

    #[test]
    fn point_inside_polygon_has_zero_distance() {
        let geo = square(10.0, 10.0, 1.0).to_geojson().unwrap();
        let inside = Point::new(10.5, 10.5).unwrap();
        let outside = Point::new(12.0, 10.5).unwrap();
        assert!(geo.contains(&inside));
        assert!(!geo.contains(&outside));
        assert_eq!(geo.distance_from(&inside), Some(0.0));
        assert!(geo.distance_from(&outside).unwrap() > 0.0);
    }

    #[test]
    fn nearest_picks_closest_polygon() {
        let polygons = [
            square(0.0, 0.0, 0.01).to_geojson().unwrap(),
            square(5.0, 5.0, 0.01).to_geojson().unwrap(),
        ];
        let point = Point::new(5.1, 5.1).unwrap();
        let found = nearest(&point, &polygons, |p| p).unwrap();
        assert_eq!(found, &polygons[1]);
        let empty: [GeoJsonPolygon; 0] = [];
        assert!(nearest(&point, &empty, |p| p).is_none());
    }
}
