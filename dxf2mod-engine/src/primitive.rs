use dxf2mod_core::document::Entity;
use dxf2mod_core::geometry::{Point2, Vector2};

use crate::errors::EngineError;

/// 默认的端点重合容差（图纸单位）。
pub const DEFAULT_TOLERANCE: f64 = 1e-2;

/// 圆弧上指定角度（度）处的点。
#[inline]
pub fn arc_point(center: Point2, radius: f64, angle_degrees: f64) -> Point2 {
    center.translate(Vector2::from_polar_degrees(radius, angle_degrees))
}

/// 返回图元的起点与终点。圆弧使用原始角度，不做跨 360° 调整。
pub fn endpoints(entity: &Entity) -> Result<(Point2, Point2), EngineError> {
    match entity {
        Entity::Line(line) => Ok((line.start, line.end)),
        Entity::Arc(arc) => Ok((
            arc_point(arc.center, arc.radius, arc.start_angle),
            arc_point(arc.center, arc.radius, arc.end_angle),
        )),
        Entity::Unsupported(other) => Err(unsupported(entity, &other.layer)),
    }
}

/// 两点在 X/Y 方向上的差值都小于 `tolerance` 时视为相接。
#[inline]
pub fn touched(p1: Point2, p2: Point2, tolerance: f64) -> bool {
    let delta = p1.vector_to(p2);
    delta.x().abs() < tolerance && delta.y().abs() < tolerance
}

pub(crate) fn unsupported(entity: &Entity, layer: &str) -> EngineError {
    EngineError::UnsupportedPrimitiveKind {
        kind: entity.kind().to_string(),
        layer: layer.to_string(),
    }
}
