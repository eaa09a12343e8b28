//! # 列落位模块
//!
//! 落位是纯几何：列宽把畸变系数除回去，列高取图片展示高度，
//! 横向偏移按序号累加，使各列自左向右相邻无缝。

use super::geometry::placement_width;
use super::source::{ColumnPlacement, SourceMeasurements, TileGeometry};

/// 计算一列的落位几何。
pub(crate) fn place(
    index: usize,
    geometry: &TileGeometry,
    measurements: &SourceMeasurements,
    distortion: f64,
) -> ColumnPlacement {
    let width = placement_width(geometry.portion_width, distortion);

    ColumnPlacement {
        index,
        width,
        height: measurements.display_height,
        x_offset: width * index as f64,
    }
}
