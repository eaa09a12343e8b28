//! # 几何计算模块
//!
//! ## 设计思路
//!
//! 分带与双空间几何全部收敛为纯函数：输入是测量快照与配置参数，
//! 输出是可直接驱动绘制与落位的数值，不接触光栅与宿主环境，便于独立测试。
//!
//! ## 实现思路
//!
//! 1. `partition` 按列数产出连续等宽的百分比分带，组件生命周期内只算一次
//! 2. `tile_geometry` 把一个分带换算为展示/源两个空间的像素区间，
//!    乘畸变系数后对右缘做回移夹取
//! 3. `placement_width` 把畸变除回去，得到落位列宽

use super::source::{Band, SourceMeasurements, TileGeometry};

/// 单个分带的百分比宽度。
pub fn band_width(column_count: u32) -> f64 {
    100.0 / column_count as f64
}

/// 将图片宽度划分为 `column_count` 个连续等宽百分比分带。
///
/// 分带覆盖 `[0, 100)`：`band[i] = [w*i, w*(i+1))`，末带终点强制取 100，
/// 消除浮点累计误差。分带只依赖列数，尺寸变化时不重算。
pub fn partition(column_count: u32) -> Vec<Band> {
    let width = band_width(column_count);

    (0..column_count)
        .map(|i| Band {
            start_pct: width * i as f64,
            end_pct: if i + 1 == column_count { 100.0 } else { width * (i + 1) as f64 },
        })
        .collect()
}

/// 把一个百分比分带换算为双空间像素几何。
///
/// 采样/绘制宽度乘畸变系数后可能越过图片右缘，此时把采样起点整体左移，
/// 让区间恰好贴住右缘。代价是靠右的列会与左邻重复采样一部分像素，
/// 属既定行为而非缺陷。
pub fn tile_geometry(
    band: Band,
    measurements: &SourceMeasurements,
    distortion: f64,
) -> TileGeometry {
    let mut start_x = measurements.display_width * (band.start_pct / 100.0);
    let mut start_source_x = measurements.source_width * (band.start_pct / 100.0);

    let end_x = measurements.display_width * (band.end_pct / 100.0);
    let end_source_x = measurements.source_width * (band.end_pct / 100.0);

    let portion_width = (end_x - start_x) * distortion;
    let portion_source_width = (end_source_x - start_source_x) * distortion;

    if start_x + portion_width > measurements.display_width {
        start_x = measurements.display_width - portion_width;
    }
    if start_source_x + portion_source_width > measurements.source_width {
        start_source_x = measurements.source_width - portion_source_width;
    }

    TileGeometry { start_x, start_source_x, portion_width, portion_source_width }
}

/// 落位列宽：绘制宽度把畸变系数除回去。
///
/// 瓦片内容按畸变倍数拉伸采样、落位时又压回原始列宽，
/// 视觉上形成"内容被压缩进列"的碎裂玻璃效果。
pub fn placement_width(portion_width: f64, distortion: f64) -> f64 {
    portion_width / distortion
}
