//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将"外部协作者"和"流水线中间结果"解耦：
//! - `GlassSurface` / `ColumnMount` 表示宿主环境（图片插槽与列挂载点）
//! - `SourceMeasurements` 表示单次布局使用的四项测量快照
//! - `Band` / `TileGeometry` 表示分带与双空间几何
//! - `ColumnTile` / `ColumnPlacement` / `ColumnRender` 表示每列的最终产物

use image::RgbaImage;
use serde::Serialize;

/// 源图片的四项测量。
///
/// 展示尺寸（页面布局中的渲染大小）与源尺寸（资源原生像素大小）相互独立，
/// 所有几何都要在两个空间各算一次并保持比例一致。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceMeasurements {
    /// 展示宽度（像素，响应式，随布局变化）。
    pub display_width: f64,
    /// 展示高度（像素）。
    pub display_height: f64,
    /// 源宽度（资源原生像素）。
    pub source_width: f64,
    /// 源高度（资源原生像素）。
    pub source_height: f64,
}

impl SourceMeasurements {
    /// 图片是否已加载完成。
    ///
    /// 未加载完成的图片源尺寸读出来是零，会产生退化的零宽瓦片，
    /// 因此布局前必须显式检查。
    pub fn is_ready(&self) -> bool {
        self.display_width > 0.0
            && self.display_height > 0.0
            && self.source_width > 0.0
            && self.source_height > 0.0
    }
}

/// 一个百分比分带：源图片宽度上的一条水平切片，对应一列。
///
/// 全部分带连续不重叠，恰好覆盖 `[0, 100)`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// 起始百分比（含）。
    pub start_pct: f64,
    /// 结束百分比（不含）。
    pub end_pct: f64,
}

/// 一个分带经畸变拉伸与右缘夹取后的双空间像素几何。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGeometry {
    /// 展示空间采样起点（夹取后）。
    pub start_x: f64,
    /// 源空间采样起点（夹取后）。
    pub start_source_x: f64,
    /// 展示空间瓦片宽度（已乘畸变系数）。
    pub portion_width: f64,
    /// 源空间采样宽度（已乘畸变系数）。
    pub portion_source_width: f64,
}

/// 瓦片导出结果：一列的镜像光栅，以 data URI 形式自包含。
#[derive(Debug, Clone, Serialize)]
pub struct ColumnTile {
    /// 列序号（0 起，自左向右）。
    pub index: usize,
    /// `data:image/png;base64,...` 形式的自包含图片资源。
    pub data_uri: String,
    /// 工作台像素宽度（展示空间，已乘畸变）。
    pub pixel_width: u32,
    /// 工作台像素高度（等于展示高度取整，切片只在水平方向）。
    pub pixel_height: u32,
}

/// 一列的布局值：宿主需要应用到列元素上的全部几何。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnPlacement {
    /// 列序号。
    pub index: usize,
    /// 落位宽度 = 瓦片展示宽度 / 畸变系数。
    pub width: f64,
    /// 落位高度 = 图片展示高度。
    pub height: f64,
    /// 横向偏移 = 落位宽度 × 序号（各列相邻无缝）。
    pub x_offset: f64,
}

/// 一列的完整产物：瓦片 + 布局。
#[derive(Debug, Clone, Serialize)]
pub struct ColumnRender {
    pub tile: ColumnTile,
    pub placement: ColumnPlacement,
}

/// 宿主侧图片插槽。
///
/// 前置条件：首次布局前图片必须已加载完成（`measure` 返回就绪测量）。
/// 测量在每次尺寸变化时重新读取；像素内容是资源的不变属性。
pub trait GlassSurface {
    /// 读取当前四项测量（展示尺寸随布局变化，源尺寸不变）。
    fn measure(&self) -> SourceMeasurements;

    /// 源图片的原生像素。
    fn pixels(&self) -> &RgbaImage;
}

/// 宿主侧列挂载点：接收每列的瓦片与布局并应用到列元素上。
pub trait ColumnMount {
    fn apply(&mut self, column: &ColumnRender);
}
