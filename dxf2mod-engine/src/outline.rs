use dxf2mod_core::document::Entity;
use dxf2mod_core::geometry::Point2;
use tracing::info;

use crate::emit::flatten;
use crate::errors::EngineError;
use crate::group::group_by_layer;
use crate::stitch::{StitchOptions, Stitcher};

/// 一个图层拼接后得到的全部闭合轮廓（已展平）。
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOutline {
    pub layer: String,
    pub polygons: Vec<Vec<Point2>>,
}

/// 按图层分组并拼接所有图元。任一图层失败即整体失败，不返回部分结果。
pub fn trace_outlines<'a, I>(
    entities: I,
    options: &StitchOptions,
) -> Result<Vec<LayerOutline>, EngineError>
where
    I: IntoIterator<Item = &'a Entity>,
{
    options.validate()?;
    let groups = group_by_layer(entities);
    let mut outlines = Vec::with_capacity(groups.len());
    for (layer, primitives) in &groups {
        let mut polygons = Vec::new();
        for shape in Stitcher::new(layer, primitives, *options)? {
            polygons.push(flatten(&shape?));
        }
        info!(
            layer = *layer,
            primitives = primitives.len(),
            polygons = polygons.len(),
            "图层拼接完成"
        );
        outlines.push(LayerOutline {
            layer: (*layer).to_string(),
            polygons,
        });
    }
    Ok(outlines)
}
