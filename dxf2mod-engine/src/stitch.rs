use std::collections::BTreeMap;

use dxf2mod_core::document::Entity;
use dxf2mod_core::geometry::Point2;
use tracing::{debug, trace};

use crate::discretize::sample_points;
use crate::errors::EngineError;
use crate::index::{EndpointIndex, EndpointSide};
use crate::primitive::{DEFAULT_TOLERANCE, endpoints, touched};

/// 拼接参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StitchOptions {
    /// 端点相接判断的容差（图纸单位）。
    pub tolerance: f64,
    /// 一个端点同时与多个图元相接时报错；为 `false` 时按输入顺序取第一个。
    pub reject_ambiguous_junctions: bool,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            reject_ambiguous_junctions: true,
        }
    }
}

impl StitchOptions {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.tolerance.is_finite() && self.tolerance > 0.0 {
            Ok(())
        } else {
            Err(EngineError::InvalidTolerance(self.tolerance))
        }
    }
}

/// 一个闭合轮廓：每个图元贡献一组采样点，组与组首尾相接。
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    groups: Vec<Vec<Point2>>,
}

impl Loop {
    pub(crate) fn new(groups: Vec<Vec<Point2>>) -> Self {
        Self { groups }
    }

    #[inline]
    pub fn groups(&self) -> &[Vec<Point2>] {
        &self.groups
    }

    /// 组成该轮廓的图元数量。
    #[inline]
    pub fn primitive_count(&self) -> usize {
        self.groups.len()
    }

    pub fn first_point(&self) -> Option<Point2> {
        self.groups.first().and_then(|group| group.first()).copied()
    }

    pub fn last_point(&self) -> Option<Point2> {
        self.groups.last().and_then(|group| group.last()).copied()
    }
}

#[derive(Debug)]
struct WorkItem<'a> {
    entity: &'a Entity,
    start: Point2,
    end: Point2,
}

impl WorkItem<'_> {
    fn point(&self, side: EndpointSide) -> Point2 {
        match side {
            EndpointSide::Start => self.start,
            EndpointSide::End => self.end,
        }
    }
}

/// 单个图层的拼接器，逐个产出闭合轮廓。
///
/// 从剩余图元中按输入顺序取一个作为种子，沿端点不断寻找相接的下一个图元，
/// 直到回到种子起点。匹配到图元终点时该图元的采样点反向追加。
/// 遇到错误后迭代结束，不再产出。
#[derive(Debug)]
pub struct Stitcher<'a> {
    layer: &'a str,
    items: Vec<WorkItem<'a>>,
    consumed: Vec<bool>,
    remaining: usize,
    next_seed: usize,
    index: EndpointIndex,
    options: StitchOptions,
    failed: bool,
}

#[derive(Debug, Clone, Copy)]
struct Continuation {
    id: usize,
    reversed: bool,
}

impl<'a> Stitcher<'a> {
    pub fn new(
        layer: &'a str,
        primitives: &[&'a Entity],
        options: StitchOptions,
    ) -> Result<Self, EngineError> {
        options.validate()?;

        let mut index = EndpointIndex::new(options.tolerance);
        let mut items = Vec::with_capacity(primitives.len());
        for (id, entity) in primitives.iter().copied().enumerate() {
            let (start, end) = endpoints(entity)?;
            index.insert(id, EndpointSide::Start, start);
            index.insert(id, EndpointSide::End, end);
            items.push(WorkItem { entity, start, end });
        }

        Ok(Self {
            layer,
            consumed: vec![false; items.len()],
            remaining: items.len(),
            next_seed: 0,
            items,
            index,
            options,
            failed: false,
        })
    }

    /// 剩余尚未并入轮廓的图元数量。
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn trace_loop(&mut self) -> Result<Loop, EngineError> {
        let seed = self.take_seed();
        let (start, mut cursor) = (self.items[seed].start, self.items[seed].end);
        self.check_seed_junction(start)?;

        let mut groups = vec![sample_points(self.items[seed].entity)?];
        loop {
            match self.find_continuation(cursor)? {
                Some(next) => {
                    self.consume(next.id);
                    let mut points = sample_points(self.items[next.id].entity)?;
                    if next.reversed {
                        points.reverse();
                    }
                    trace!(
                        layer = self.layer,
                        primitive = next.id,
                        reversed = next.reversed,
                        "追加相接图元"
                    );
                    cursor = points.last().copied().unwrap_or(cursor);
                    groups.push(points);
                }
                None if touched(cursor, start, self.options.tolerance) => {
                    debug!(
                        layer = self.layer,
                        primitives = groups.len(),
                        remaining = self.remaining,
                        "轮廓已闭合"
                    );
                    return Ok(Loop::new(groups));
                }
                None => {
                    return Err(EngineError::UnclosedShape {
                        layer: self.layer.to_string(),
                        location: cursor,
                    });
                }
            }
        }
    }

    fn take_seed(&mut self) -> usize {
        while self.consumed[self.next_seed] {
            self.next_seed += 1;
        }
        let seed = self.next_seed;
        self.consume(seed);
        seed
    }

    fn consume(&mut self, id: usize) {
        self.consumed[id] = true;
        self.remaining -= 1;
    }

    /// 收集与 `point` 相接的未使用图元，按输入顺序排列；同一图元两端都相接时记为起点匹配。
    fn touching(&self, point: Point2) -> BTreeMap<usize, EndpointSide> {
        let mut found = BTreeMap::new();
        for (id, side) in self.index.neighbours(point) {
            let candidate = self.items[id].point(side);
            if self.consumed[id] || !touched(point, candidate, self.options.tolerance) {
                continue;
            }
            found
                .entry(id)
                .and_modify(|existing| {
                    if side == EndpointSide::Start {
                        *existing = side;
                    }
                })
                .or_insert(side);
        }
        found
    }

    fn find_continuation(&self, cursor: Point2) -> Result<Option<Continuation>, EngineError> {
        let candidates = self.touching(cursor);
        self.ensure_unambiguous(cursor, candidates.len())?;
        Ok(candidates
            .into_iter()
            .next()
            .map(|(id, side)| Continuation {
                id,
                reversed: side == EndpointSide::End,
            }))
    }

    /// 种子起点处除闭合用的那个图元外不应再有其他图元。
    fn check_seed_junction(&self, start: Point2) -> Result<(), EngineError> {
        let count = self.touching(start).len();
        self.ensure_unambiguous(start, count)
    }

    fn ensure_unambiguous(&self, location: Point2, candidates: usize) -> Result<(), EngineError> {
        if self.options.reject_ambiguous_junctions && candidates > 1 {
            return Err(EngineError::AmbiguousJunction {
                layer: self.layer.to_string(),
                location,
                candidates,
            });
        }
        Ok(())
    }
}

impl Iterator for Stitcher<'_> {
    type Item = Result<Loop, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        let result = self.trace_loop();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    /// 每个轮廓至少消耗一个图元。
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (usize::from(self.remaining() > 0), Some(self.remaining()))
        }
    }
}

/// 拼接一个图层的全部图元，任一轮廓失败则整体失败。
pub fn stitch_layer(
    layer: &str,
    primitives: &[&Entity],
    options: StitchOptions,
) -> Result<Vec<Loop>, EngineError> {
    Stitcher::new(layer, primitives, options)?.collect()
}
