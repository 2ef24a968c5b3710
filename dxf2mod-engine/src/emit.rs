use dxf2mod_core::geometry::Point2;

use crate::stitch::Loop;

/// 把轮廓的各组采样点依次拼接为一条点序列。
///
/// 相邻两组的衔接点不去重，每个图元边界处都会留下一对近似重合的点。
pub fn flatten(shape: &Loop) -> Vec<Point2> {
    let total = shape.groups().iter().map(Vec::len).sum();
    let mut points = Vec::with_capacity(total);
    for group in shape.groups() {
        points.extend_from_slice(group);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_keeps_junction_duplicates() {
        let shape = Loop::new(vec![
            vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)],
            vec![Point2::new(10.0, 0.0), Point2::new(0.0, 10.0)],
            vec![Point2::new(0.0, 10.0), Point2::new(0.0, 0.0)],
        ]);
        let points = flatten(&shape);
        assert_eq!(points.len(), 6);
        assert_eq!(points[1], points[2]);
        assert_eq!(points[3], points[4]);
        assert_eq!(points.first(), points.last());
    }
}
