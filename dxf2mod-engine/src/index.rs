use std::collections::HashMap;

use dxf2mod_core::geometry::Point2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndpointSide {
    Start,
    End,
}

/// 以容差为边长的网格哈希，记录每个图元两个端点所在的格子。
///
/// 与某点相接（两轴差值都小于容差）的端点一定落在该点所在格子或其 8 个邻格内，
/// 查询只返回候选，调用方仍需做精确的相接判断。
#[derive(Debug)]
pub(crate) struct EndpointIndex {
    cell_size: f64,
    buckets: HashMap<(i64, i64), Vec<(usize, EndpointSide)>>,
}

impl EndpointIndex {
    pub(crate) fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            buckets: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, id: usize, side: EndpointSide, point: Point2) {
        self.buckets
            .entry(self.cell_of(point))
            .or_default()
            .push((id, side));
    }

    pub(crate) fn neighbours(
        &self,
        point: Point2,
    ) -> impl Iterator<Item = (usize, EndpointSide)> + '_ {
        let (cx, cy) = self.cell_of(point);
        (-1..=1)
            .flat_map(move |dx| {
                (-1..=1).map(move |dy| (cx.saturating_add(dx), cy.saturating_add(dy)))
            })
            .filter_map(move |cell| self.buckets.get(&cell))
            .flat_map(|entries| entries.iter().copied())
    }

    fn cell_of(&self, point: Point2) -> (i64, i64) {
        (
            (point.x() / self.cell_size).floor() as i64,
            (point.y() / self.cell_size).floor() as i64,
        )
    }
}
