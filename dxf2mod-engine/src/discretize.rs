use dxf2mod_core::document::{Arc, Entity};
use dxf2mod_core::geometry::Point2;

use crate::errors::EngineError;
use crate::primitive::{arc_point, unsupported};

/// 把图元离散为有序采样点。
///
/// 线段固定返回 `[start, end]`。圆弧从起始角开始按 `1/radius` 度步进，
/// 下一步会越过终止角时改为追加精确的终止角点；终止角不大于起始角时先加 360°。
/// 每次调用都重新计算，不缓存任何状态。
pub fn sample_points(entity: &Entity) -> Result<Vec<Point2>, EngineError> {
    match entity {
        Entity::Line(line) => Ok(vec![line.start, line.end]),
        Entity::Arc(arc) => sample_arc(arc),
        Entity::Unsupported(other) => Err(unsupported(entity, &other.layer)),
    }
}

fn sample_arc(arc: &Arc) -> Result<Vec<Point2>, EngineError> {
    validate_arc(arc)?;

    let start_angle = arc.start_angle;
    let mut end_angle = arc.end_angle;
    if end_angle <= start_angle {
        end_angle += 360.0;
    }

    // 半径越大步长越小，弦长大致恒定
    let step = 1.0 / arc.radius;
    let mut points = Vec::new();
    let mut index: u64 = 0;
    loop {
        let angle = start_angle + step * index as f64;
        points.push(arc_point(arc.center, arc.radius, angle));
        if angle + step > end_angle {
            points.push(arc_point(arc.center, arc.radius, end_angle));
            break;
        }
        index += 1;
    }
    Ok(points)
}

fn validate_arc(arc: &Arc) -> Result<(), EngineError> {
    let reason = if !arc.radius.is_finite() || arc.radius <= 0.0 {
        format!("radius must be positive and finite (got {})", arc.radius)
    } else if !arc.start_angle.is_finite() || !arc.end_angle.is_finite() {
        format!(
            "angles must be finite (got {} and {})",
            arc.start_angle, arc.end_angle
        )
    } else if !arc.center.x().is_finite() || !arc.center.y().is_finite() {
        format!("center must be finite (got {})", arc.center)
    } else {
        return Ok(());
    };
    Err(EngineError::InvalidArc {
        layer: arc.layer.clone(),
        reason,
    })
}
