//! # 碎裂玻璃效果 — 演示程序入口
//!
//! 本文件仅负责参数解析、宿主协作者的文件实现与产物落盘。
//! 切片逻辑分布在库的各子模块中，详见 `lib.rs` 架构文档。
//!
//! 用法：`fractal-glass <图片路径> [展示宽度] [输出目录]`
//! 产物：`index.html`（绝对定位的列预览页）、每列一个 `column-<序号>.png`
//! 瓦片文件，以及 `layout.json`（布局清单）。

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::{Engine as _, engine::general_purpose};
use image::RgbaImage;

use fractal_glass::error::AppError;
use fractal_glass::slicer::{
    ColumnMount, ColumnRender, GlassController, GlassSurface, SliceConfig, SliceError,
    SourceMeasurements,
};

/// 文件图片插槽：源像素来自磁盘，展示尺寸由命令行模拟。
struct FileSurface {
    pixels: RgbaImage,
    display_width: f64,
    display_height: f64,
}

impl GlassSurface for FileSurface {
    fn measure(&self) -> SourceMeasurements {
        SourceMeasurements {
            display_width: self.display_width,
            display_height: self.display_height,
            source_width: self.pixels.width() as f64,
            source_height: self.pixels.height() as f64,
        }
    }

    fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// 收集挂载点：把每列产物记录下来，供落盘阶段读取。
#[derive(Default)]
struct CollectingMount {
    columns: Arc<Mutex<Vec<ColumnRender>>>,
}

impl ColumnMount for CollectingMount {
    fn apply(&mut self, column: &ColumnRender) {
        match self.columns.lock() {
            Ok(mut columns) => columns.push(column.clone()),
            Err(poisoned) => {
                log::warn!("列收集锁中毒，继续使用恢复数据");
                poisoned.into_inner().push(column.clone());
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let mut args = std::env::args().skip(1);

    let image_path = args.next().ok_or_else(|| {
        AppError::Usage("用法: fractal-glass <图片路径> [展示宽度] [输出目录]".to_string())
    })?;
    let display_width: f64 = match args.next() {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Usage(format!("展示宽度不是合法数字：{}", raw)))?,
        None => 800.0,
    };
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("glass-preview"));

    let pixels = image::open(&image_path)?.to_rgba8();
    let (source_width, source_height) = pixels.dimensions();
    // 展示高度按源图宽高比等比推算
    let display_height = display_width * source_height as f64 / source_width as f64;

    log::info!(
        "🖼️ 已加载 {}（源 {}x{}，展示 {:.0}x{:.0}）",
        image_path,
        source_width,
        source_height,
        display_width,
        display_height
    );

    let surface = FileSurface { pixels, display_width, display_height };
    let mount = CollectingMount::default();
    let collected = Arc::clone(&mount.columns);

    // 构造即完成首次布局并应用到挂载点
    let _controller =
        GlassController::from_slots(SliceConfig::default(), Some(surface), Some(mount))?;

    let columns = match collected.lock() {
        Ok(columns) => columns.clone(),
        Err(poisoned) => {
            log::warn!("列收集锁中毒，继续使用恢复数据");
            poisoned.into_inner().clone()
        }
    };

    fs::create_dir_all(&out_dir)?;

    write_column_tiles(&columns, &out_dir)?;

    let manifest = serde_json::to_string_pretty(&columns)?;
    fs::write(out_dir.join("layout.json"), manifest)?;

    let html = render_preview_page(&columns, display_width, display_height);
    fs::write(out_dir.join("index.html"), html)?;

    log::info!("✅ 预览已生成 - columns={} out={}", columns.len(), out_dir.display());

    Ok(())
}

/// 把每列瓦片落盘为独立 PNG 文件（`column-<序号>.png`）。
///
/// PNG 字节直接取自 data URI 负载，不做二次编码。
fn write_column_tiles(columns: &[ColumnRender], out_dir: &Path) -> Result<(), AppError> {
    for column in columns {
        let bytes = tile_png_bytes(&column.tile.data_uri)?;
        fs::write(out_dir.join(format!("column-{}.png", column.tile.index)), bytes)?;
    }
    Ok(())
}

/// 从 data URI 中取回 PNG 原始字节。
fn tile_png_bytes(data_uri: &str) -> Result<Vec<u8>, AppError> {
    let payload = data_uri
        .strip_prefix("data:image/png;base64,")
        .ok_or_else(|| SliceError::Encode("data URI 缺少 PNG base64 前缀".to_string()))?;

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| SliceError::Encode(format!("data URI base64 解码失败：{}", e)))?;

    Ok(bytes)
}

/// 生成绝对定位的列预览页：每列一个 div，瓦片作为背景压进列宽。
fn render_preview_page(columns: &[ColumnRender], display_width: f64, display_height: f64) -> String {
    let mut body = String::new();

    for column in columns {
        let p = &column.placement;
        let _ = write!(
            body,
            "    <div style=\"position:absolute;left:{:.2}px;top:0;width:{:.2}px;height:{:.2}px;\
background-image:url('{}');background-size:100% 100%;\"></div>\n",
            p.x_offset, p.width, p.height, column.tile.data_uri
        );
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>fractal glass preview</title>\n\
</head>\n<body>\n  <div style=\"position:relative;width:{:.0}px;height:{:.0}px;overflow:hidden;\">\n\
{}  </div>\n</body>\n</html>\n",
        display_width, display_height, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractal_glass::slicer::GlassSlicer;
    use image::{ImageBuffer, Rgba};

    #[test]
    fn column_tiles_land_as_decodable_png_files() {
        let config = SliceConfig { column_count: 3, distortion: 2.0, ..SliceConfig::default() };
        let slicer = GlassSlicer::new(config).expect("slicer init failed");
        let source: RgbaImage = ImageBuffer::from_fn(300, 150, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, 0, 255])
        });
        let m = SourceMeasurements {
            display_width: 300.0,
            display_height: 150.0,
            source_width: 300.0,
            source_height: 150.0,
        };
        let columns = slicer.layout_pass(&source, &m).expect("layout pass failed");

        let out_dir =
            std::env::temp_dir().join(format!("fractal-glass-tiles-{}", std::process::id()));
        fs::create_dir_all(&out_dir).expect("out dir create failed");

        write_column_tiles(&columns, &out_dir).expect("tile write failed");

        for column in &columns {
            let path = out_dir.join(format!("column-{}.png", column.tile.index));
            let decoded = image::open(&path).expect("tile png open failed").to_rgba8();
            assert_eq!(
                decoded.dimensions(),
                (column.tile.pixel_width, column.tile.pixel_height)
            );
        }

        fs::remove_dir_all(&out_dir).ok();
    }

    #[test]
    fn tile_png_bytes_rejects_foreign_payload() {
        let result = tile_png_bytes("data:image/jpeg;base64,AAAA");
        assert!(matches!(result, Err(AppError::Slice(SliceError::Encode(_)))));
    }
}
