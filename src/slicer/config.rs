//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有"可调策略"集中到 `SliceConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中渲染质量档位（quality / balanced / speed）作为高层语义，映射到底层滤镜选择。
//!
//! ## 实现思路
//!
//! - `Default` 提供标准效果参数（30 列、3 倍畸变、200ms 防抖）。
//! - `validate` 在构造期快速失败，杜绝除零与反向夹取。
//! - `RenderQuality` 负责档位字符串解析与反向输出。
//! - `apply_render_quality` 将档位转换为具体滤镜。
//! - `infer_render_quality` 用于从当前配置反推档位（给宿主展示状态）。

use image::imageops::FilterType;

use super::SliceError;

/// 切片渲染配置。
///
/// 会话期内不可变：列数与畸变系数决定分带与几何，滤镜决定缩放质量，
/// 防抖窗口决定尺寸变化事件的合并粒度。
#[derive(Debug, Clone)]
pub struct SliceConfig {
    /// 列数（等宽百分比分带的数量）。
    pub column_count: u32,
    /// 畸变系数：采样/绘制宽度相对落位列宽的放大倍数。
    ///
    /// `1.0` 表示不拉伸，恰好采样字面分带。
    pub distortion: f64,
    /// 瓦片缩放使用的滤镜策略。
    pub resize_filter: FilterType,
    /// 尺寸变化事件的防抖窗口（毫秒）。
    pub debounce_ms: u64,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            column_count: 30,
            distortion: 3.0,
            resize_filter: FilterType::Triangle,
            debounce_ms: 200,
        }
    }
}

impl SliceConfig {
    /// 校验配置合法性。
    ///
    /// 列数为零会导致分带除零，畸变小于 1 会导致夹取方向反转，
    /// 两者都在构造期拒绝而不是留到几何阶段产生未定义结果。
    pub fn validate(&self) -> Result<(), SliceError> {
        if self.column_count == 0 {
            return Err(SliceError::InvalidConfig("column_count 必须大于 0".to_string()));
        }
        if !self.distortion.is_finite() || self.distortion < 1.0 {
            return Err(SliceError::InvalidConfig(format!(
                "distortion 必须是不小于 1 的有限数（当前：{}）",
                self.distortion
            )));
        }
        if self.debounce_ms == 0 {
            return Err(SliceError::InvalidConfig("debounce_ms 必须大于 0".to_string()));
        }
        Ok(())
    }
}

/// 渲染质量档位（面向宿主/用户语义）。
///
/// - `Quality`：尽量保真
/// - `Balanced`：质量与速度平衡
/// - `Speed`：优先重算速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderQuality {
    Quality,
    Balanced,
    Speed,
}

impl RenderQuality {
    /// 从外部字符串解析档位。
    pub fn from_str(quality: &str) -> Result<Self, SliceError> {
        match quality.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(SliceError::InvalidConfig(format!(
                "未知渲染质量档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串，供宿主展示与持久化。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl SliceConfig {
    /// 基于当前滤镜反推质量档位。
    pub fn infer_render_quality(&self) -> RenderQuality {
        match self.resize_filter {
            FilterType::CatmullRom | FilterType::Lanczos3 => RenderQuality::Quality,
            FilterType::Nearest => RenderQuality::Speed,
            _ => RenderQuality::Balanced,
        }
    }

    /// 应用指定质量档位到实际滤镜参数。
    ///
    /// 保持"档位语义稳定"，便于宿主按档位切换而无需了解底层细节。
    pub fn apply_render_quality(&mut self, quality: RenderQuality) {
        self.resize_filter = match quality {
            RenderQuality::Quality => FilterType::CatmullRom,
            RenderQuality::Balanced => FilterType::Triangle,
            RenderQuality::Speed => FilterType::Nearest,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_effect_defaults() {
        let config = SliceConfig::default();
        assert_eq!(config.column_count, 30);
        assert_eq!(config.distortion, 3.0);
        assert_eq!(config.debounce_ms, 200);
        config.validate().expect("default config should validate");
    }

    #[test]
    fn validate_rejects_zero_columns() {
        let config = SliceConfig { column_count: 0, ..SliceConfig::default() };
        assert!(matches!(config.validate(), Err(SliceError::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_distortion_below_one() {
        let config = SliceConfig { distortion: 0.5, ..SliceConfig::default() };
        assert!(matches!(config.validate(), Err(SliceError::InvalidConfig(_))));

        let config = SliceConfig { distortion: f64::NAN, ..SliceConfig::default() };
        assert!(matches!(config.validate(), Err(SliceError::InvalidConfig(_))));
    }

    #[test]
    fn render_quality_round_trips_through_strings() {
        for quality in [RenderQuality::Quality, RenderQuality::Balanced, RenderQuality::Speed] {
            let parsed = RenderQuality::from_str(quality.as_str()).expect("parse failed");
            assert_eq!(parsed, quality);
        }
        assert!(RenderQuality::from_str("ultra").is_err());
    }

    #[test]
    fn apply_then_infer_is_consistent() {
        let mut config = SliceConfig::default();
        for quality in [RenderQuality::Quality, RenderQuality::Speed, RenderQuality::Balanced] {
            config.apply_render_quality(quality);
            assert_eq!(config.infer_render_quality(), quality);
        }
    }
}
