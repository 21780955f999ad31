//! Regular polygon entity shared by active and target (ghost) shapes
//!
//! A shape is a regular polygon described by:
//! - center (cx, cy) in y-down canvas pixels
//! - size: circumradius in pixels
//! - rotation: angle of the first vertex in degrees, [0, 360)
//! - sides: vertex count

use glam::DVec2;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::{normalize_degrees, polar_to_cartesian};

/// Outline color of player-controlled shapes
pub const ACTIVE_COLOR: &str = "#6cb6ff";
/// Outline color of ghost targets
pub const TARGET_COLOR: &str = "#3fb950";

/// Which side of a pair a shape belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRole {
    Active,
    Target,
}

impl ShapeRole {
    pub fn color(&self) -> &'static str {
        match self {
            ShapeRole::Active => ACTIVE_COLOR,
            ShapeRole::Target => TARGET_COLOR,
        }
    }

    /// Unknown colors are treated as player shapes
    pub fn from_color(color: &str) -> Self {
        if color.eq_ignore_ascii_case(TARGET_COLOR) {
            ShapeRole::Target
        } else {
            ShapeRole::Active
        }
    }
}

/// Rejected shape record
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("side count {0} outside 3..=7")]
    Sides(u32),
    #[error("non-finite value in field '{0}'")]
    NonFinite(&'static str),
}

/// A regular polygon on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub cx: f64,
    pub cy: f64,
    pub size: u32,
    pub rotation: f64,
    pub sides: u32,
    /// Role tag, kept verbatim so records round-trip
    pub color: String,
}

impl Shape {
    pub fn new(center: DVec2, size: u32, rotation: f64, sides: u32, role: ShapeRole) -> Self {
        Self {
            cx: center.x,
            cy: center.y,
            size: size.clamp(MIN_SHAPE_SIZE, MAX_SHAPE_SIZE),
            rotation: normalize_degrees(rotation),
            sides,
            color: role.color().to_string(),
        }
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.cx, self.cy)
    }

    #[inline]
    pub fn set_center(&mut self, center: DVec2) {
        self.cx = center.x;
        self.cy = center.y;
    }

    pub fn role(&self) -> ShapeRole {
        ShapeRole::from_color(&self.color)
    }

    /// Polygon vertices, first vertex at `rotation`, evenly spaced
    pub fn vertices(&self) -> Vec<DVec2> {
        let center = self.center();
        let step = 360.0 / self.sides.max(1) as f64;
        (0..self.sides)
            .map(|k| center + polar_to_cartesian(self.size as f64, self.rotation + step * k as f64))
            .collect()
    }

    /// Cheap hit-test: circle of radius `size * 1.1` around the center.
    /// Over-approximates the polygon near its edges.
    pub fn contains(&self, point: DVec2) -> bool {
        let r = self.size as f64 * HIT_RADIUS_FACTOR;
        self.center().distance_squared(point) <= r * r
    }

    pub fn rotate_by(&mut self, degrees: f64) {
        self.rotation = normalize_degrees(self.rotation + degrees);
    }

    /// Multiplicative resize, rounded and clamped to the size range
    pub fn scale_by(&mut self, factor: f64) {
        let scaled = (self.size as f64 * factor).round();
        self.size = clamp_size(scaled);
    }

    pub fn to_record(&self) -> ShapeRecord {
        ShapeRecord {
            cx: self.cx,
            cy: self.cy,
            size: self.size,
            rotation: self.rotation,
            sides: self.sides,
            color: Some(self.color.clone()),
        }
    }

    /// Build a shape from a persisted record, restoring its invariants
    pub fn from_record(record: &ShapeRecord) -> Result<Self, ShapeError> {
        if !(BASE_SIDES..=MAX_SIDES).contains(&record.sides) {
            return Err(ShapeError::Sides(record.sides));
        }
        for (name, value) in [("cx", record.cx), ("cy", record.cy), ("rotation", record.rotation)] {
            if !value.is_finite() {
                return Err(ShapeError::NonFinite(name));
            }
        }
        Ok(Self {
            cx: record.cx,
            cy: record.cy,
            size: record.size.clamp(MIN_SHAPE_SIZE, MAX_SHAPE_SIZE),
            rotation: normalize_degrees(record.rotation),
            sides: record.sides,
            color: record.color.clone().unwrap_or_else(|| ACTIVE_COLOR.to_string()),
        })
    }
}

fn clamp_size(size: f64) -> u32 {
    if size.is_nan() {
        return MIN_SHAPE_SIZE;
    }
    size.clamp(MIN_SHAPE_SIZE as f64, MAX_SHAPE_SIZE as f64) as u32
}

/// Plain persisted form of a shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    #[serde(deserialize_with = "de_f64")]
    pub cx: f64,
    #[serde(deserialize_with = "de_f64")]
    pub cy: f64,
    #[serde(deserialize_with = "de_u32")]
    pub size: u32,
    #[serde(deserialize_with = "de_f64")]
    pub rotation: f64,
    #[serde(deserialize_with = "de_u32")]
    pub sides: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Numbers as written by older saves: ints, floats or numeric strings
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Numeric {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Int(i) => Some(*i as f64),
            Numeric::Float(f) => Some(*f),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn de_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Numeric::deserialize(deserializer)?
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| de::Error::custom("expected a finite number"))
}

fn de_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Numeric::deserialize(deserializer)?
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| de::Error::custom("expected a finite number"))?;
    let rounded = value.round();
    if rounded < 0.0 || rounded > u32::MAX as f64 {
        return Err(de::Error::custom(format!("{value} out of range")));
    }
    Ok(rounded as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Shape {
        Shape::new(DVec2::new(100.0, 100.0), 50, 0.0, 4, ShapeRole::Active)
    }

    #[test]
    fn test_vertices_regular_polygon() {
        let verts = square().vertices();
        assert_eq!(verts.len(), 4);
        // First vertex at rotation 0 sits to the right of the center
        assert!((verts[0] - DVec2::new(150.0, 100.0)).length() < 1e-9);
        // 90 degrees later, y-down, so below the center
        assert!((verts[1] - DVec2::new(100.0, 150.0)).length() < 1e-9);
        for v in &verts {
            assert!((v.distance(DVec2::new(100.0, 100.0)) - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_vertices_follow_rotation() {
        let mut tri = Shape::new(DVec2::ZERO, 100, 90.0, 3, ShapeRole::Target);
        let v = tri.vertices();
        assert!((v[0] - DVec2::new(0.0, 100.0)).length() < 1e-9);
        tri.rotate_by(-90.0);
        let v = tri.vertices();
        assert!((v[0] - DVec2::new(100.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_contains_circle_approximation() {
        let s = square();
        assert!(s.contains(DVec2::new(100.0, 100.0)));
        // Edge of the 1.1x circle
        assert!(s.contains(DVec2::new(155.0, 100.0)));
        assert!(!s.contains(DVec2::new(155.1, 100.0)));
        // Corner region outside the polygon still hits
        assert!(s.contains(DVec2::new(138.0, 138.0)));
    }

    #[test]
    fn test_rotate_wraps() {
        let mut s = square();
        s.rotate_by(-10.0);
        assert_eq!(s.rotation, 350.0);
        s.rotate_by(20.0);
        assert!((s.rotation - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_clamps() {
        let mut s = square();
        s.scale_by(100.0);
        assert_eq!(s.size, MAX_SHAPE_SIZE);
        s.scale_by(0.0);
        assert_eq!(s.size, MIN_SHAPE_SIZE);
        s.scale_by(1.04);
        assert_eq!(s.size, 31);
    }

    #[test]
    fn test_record_round_trip() {
        let s = Shape::new(DVec2::new(412.5, 233.0), 131, 271.25, 6, ShapeRole::Target);
        let json = serde_json::to_string(&s.to_record()).unwrap();
        let record: ShapeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(Shape::from_record(&record).unwrap(), s);
    }

    #[test]
    fn test_record_defaults_and_coercion() {
        let record: ShapeRecord = serde_json::from_str(
            r#"{"cx": "300", "cy": 200.0, "size": 120.4, "rotation": 370, "sides": "5"}"#,
        )
        .unwrap();
        let s = Shape::from_record(&record).unwrap();
        assert_eq!(s.cx, 300.0);
        assert_eq!(s.size, 120);
        assert_eq!(s.sides, 5);
        assert!((s.rotation - 10.0).abs() < 1e-9);
        assert_eq!(s.color, ACTIVE_COLOR);
        assert_eq!(s.role(), ShapeRole::Active);
    }

    #[test]
    fn test_record_rejects_bad_sides() {
        let record: ShapeRecord =
            serde_json::from_str(r#"{"cx": 1, "cy": 1, "size": 50, "rotation": 0, "sides": 2}"#)
                .unwrap();
        assert_eq!(Shape::from_record(&record), Err(ShapeError::Sides(2)));
    }

    #[test]
    fn test_record_rejects_non_numeric() {
        let parsed = serde_json::from_str::<ShapeRecord>(
            r#"{"cx": "left", "cy": 1, "size": 50, "rotation": 0, "sides": 4}"#,
        );
        assert!(parsed.is_err());
    }
}
