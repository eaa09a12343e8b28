//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `GlassSlicer` 只负责单次布局的流程编排与参数持有，不接触宿主环境。
//! 处理链路固定为：
//! 1. 校验测量就绪
//! 2. 逐分带计算双空间几何
//! 3. 渲染镜像瓦片并导出
//! 4. 计算落位几何
//!
//! ## 实现思路
//!
//! - 分带只依赖列数，构造时计算一次，终生不变。
//! - 整个布局的产物按测量快照键入缓存：测量未变的重算直接复用既有结果，
//!   保证无操作重算的字节级幂等；条目超限时淘汰最旧快照。
//! - 记录 `geometry/tiles/total` 阶段耗时，便于性能诊断。

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use image::RgbaImage;

use super::geometry::{partition, tile_geometry};
use super::placement::place;
use super::source::{Band, ColumnRender, SourceMeasurements};
use super::tile::render_tile;
use super::{SliceConfig, SliceError};

/// 缓存中最多保留的测量快照数，超出后淘汰最旧条目
const PASS_CACHE_CAPACITY: usize = 8;

/// 切片渲染器。
///
/// 持有会话期不变的配置与分带，编排各子模块完成一次完整布局。
pub struct GlassSlicer {
    config: SliceConfig,
    bands: Vec<Band>,
    pass_cache: Mutex<HashMap<String, CachedPass>>,
}

struct CachedPass {
    created_at: Instant,
    columns: Vec<ColumnRender>,
}

impl GlassSlicer {
    /// 根据配置创建渲染器，构造期校验并完成一次性分带。
    pub fn new(config: SliceConfig) -> Result<Self, SliceError> {
        config.validate()?;
        let bands = partition(config.column_count);

        Ok(Self { config, bands, pass_cache: Mutex::new(HashMap::new()) })
    }

    pub fn config(&self) -> &SliceConfig {
        &self.config
    }

    /// 分带快照（构造期算好，尺寸变化不重算）。
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// 执行一次完整布局：对每个分带按序产出瓦片与落位。
    pub fn layout_pass(
        &self,
        pixels: &RgbaImage,
        measurements: &SourceMeasurements,
    ) -> Result<Vec<ColumnRender>, SliceError> {
        if !measurements.is_ready() {
            return Err(SliceError::SourceNotReady(format!(
                "测量存在零值（展示 {}x{}，源 {}x{}），请在图片加载完成后再布局",
                measurements.display_width,
                measurements.display_height,
                measurements.source_width,
                measurements.source_height
            )));
        }

        let cache_key = Self::cache_key(measurements);
        if let Some(columns) = self.cached_pass(&cache_key) {
            log::debug!("♻️ 测量未变化，复用上一轮 {} 列布局", columns.len());
            return Ok(columns);
        }

        let total_start = Instant::now();

        let geometry_start = Instant::now();
        let geometries: Vec<_> = self
            .bands
            .iter()
            .map(|band| tile_geometry(*band, measurements, self.config.distortion))
            .collect();
        let geometry_elapsed = geometry_start.elapsed();

        let tiles_start = Instant::now();
        let mut columns = Vec::with_capacity(geometries.len());
        for (index, geometry) in geometries.iter().enumerate() {
            let tile = render_tile(pixels, geometry, measurements, &self.config, index)?;
            let placement = place(index, geometry, measurements, self.config.distortion);
            columns.push(ColumnRender { tile, placement });
        }
        let tiles_elapsed = tiles_start.elapsed();

        self.store_pass(cache_key, &columns);

        log::info!(
            "✅ 布局完成 - columns={} geometry={}ms tiles={}ms total={}ms",
            columns.len(),
            geometry_elapsed.as_millis(),
            tiles_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(columns)
    }

    fn cache_key(measurements: &SourceMeasurements) -> String {
        format!(
            "{}x{}|{}x{}",
            measurements.display_width,
            measurements.display_height,
            measurements.source_width,
            measurements.source_height
        )
    }

    fn cached_pass(&self, key: &str) -> Option<Vec<ColumnRender>> {
        let guard = match self.pass_cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("布局缓存锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        };

        guard.get(key).map(|pass| pass.columns.clone())
    }

    fn store_pass(&self, key: String, columns: &[ColumnRender]) {
        let mut guard = match self.pass_cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("布局缓存锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        };

        if guard.len() >= PASS_CACHE_CAPACITY && !guard.contains_key(&key) {
            let oldest = guard
                .iter()
                .min_by_key(|(_, pass)| pass.created_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                guard.remove(&oldest);
            }
        }

        guard.insert(key, CachedPass { created_at: Instant::now(), columns: columns.to_vec() });
    }
}
