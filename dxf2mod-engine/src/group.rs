use std::collections::BTreeMap;

use dxf2mod_core::document::Entity;

/// 图层名到该图层图元的映射，按图层名排序。
pub type LayerGroups<'a> = BTreeMap<&'a str, Vec<&'a Entity>>;

/// 按图层划分图元。每个图层内保持输入顺序。
pub fn group_by_layer<'a, I>(entities: I) -> LayerGroups<'a>
where
    I: IntoIterator<Item = &'a Entity>,
{
    let mut groups: LayerGroups<'a> = BTreeMap::new();
    for entity in entities {
        groups.entry(entity.layer_name()).or_default().push(entity);
    }
    groups
}
