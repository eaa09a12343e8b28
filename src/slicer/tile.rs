//! # 镜像瓦片生成模块
//!
//! ## 设计思路
//!
//! 每个瓦片使用函数作用域内的独立工作台（`RgbaImage`），绘制完成立即导出、
//! 随后丢弃，列与列之间不共享任何可变画布，也就不存在需要手动复位的变换状态。
//!
//! ## 实现思路
//!
//! 1. 按几何取整出工作台尺寸（宽 = 畸变后的展示宽度，高 = 展示高度）
//! 2. 左半幅：从源像素裁出 `[start_source_x, start_source_x + portion_source_width/2)`
//!    全高区域，缩放到左半幅展示尺寸后贴到 x = 0
//! 3. 右半幅：按 `dest[x] = left[w-1-x]` 水平镜像左半幅，
//!    瓦片关于竖直中线严格对称、接缝逐像素精确（奇数宽度时中线列共享）
//! 4. 导出为 `data:image/png;base64,...` 自包含资源
//!
//! 缩放优先走 `fast_image_resize`，失败时回退 `image::resize_exact`。

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use fast_image_resize as fr;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba, RgbaImage, imageops};

use super::source::{ColumnTile, SourceMeasurements, TileGeometry};
use super::{SliceConfig, SliceError};

/// 为一个分带渲染镜像瓦片并导出。
pub(crate) fn render_tile(
    pixels: &RgbaImage,
    geometry: &TileGeometry,
    measurements: &SourceMeasurements,
    config: &SliceConfig,
    index: usize,
) -> Result<ColumnTile, SliceError> {
    let tile_width = geometry.portion_width.round() as i64;
    let tile_height = measurements.display_height.round() as i64;

    if tile_width <= 0 || tile_height <= 0 {
        return Err(SliceError::Geometry(format!(
            "第 {} 列工作台尺寸退化：{}x{}",
            index, tile_width, tile_height
        )));
    }

    let tile_width = tile_width as u32;
    let tile_height = tile_height as u32;
    // 奇数宽度时中线列归属左半幅
    let left_width = tile_width.div_ceil(2);

    let half_source = crop_half_source(pixels, geometry)?;
    let left_half = scale_region(half_source, left_width, tile_height, config.resize_filter)?;

    let mut workbench = RgbaImage::new(tile_width, tile_height);
    imageops::replace(&mut workbench, &left_half, 0, 0);

    for x in left_width..tile_width {
        let mirrored_x = tile_width - 1 - x;
        for y in 0..tile_height {
            let pixel = *left_half.get_pixel(mirrored_x, y);
            workbench.put_pixel(x, y, pixel);
        }
    }

    let data_uri = export_data_uri(&workbench, index)?;

    log::trace!(
        "🪞 第 {} 列瓦片已生成：{}x{}（左半幅 {} 像素）",
        index,
        tile_width,
        tile_height,
        left_width
    );

    Ok(ColumnTile { index, data_uri, pixel_width: tile_width, pixel_height: tile_height })
}

/// 从源像素裁出当前分带的左半采样区（全高）。
///
/// 几何阶段已保证采样区间落在源图范围内，这里的夹取只吸收取整误差。
fn crop_half_source(
    pixels: &RgbaImage,
    geometry: &TileGeometry,
) -> Result<RgbaImage, SliceError> {
    let (source_width, source_height) = pixels.dimensions();
    if source_width == 0 || source_height == 0 {
        return Err(SliceError::SourceNotReady("源像素缓冲为空".to_string()));
    }

    let crop_x = (geometry.start_source_x.round().max(0.0) as u32).min(source_width - 1);
    let half_width = (geometry.portion_source_width / 2.0).round().max(1.0) as u32;
    let crop_width = half_width.min(source_width - crop_x);

    if crop_width == 0 {
        return Err(SliceError::Geometry(format!(
            "采样区间退化：起点 {}，源宽 {}",
            crop_x, source_width
        )));
    }

    Ok(imageops::crop_imm(pixels, crop_x, 0, crop_width, source_height).to_image())
}

/// 将采样区缩放到目标展示尺寸。
///
/// 优先使用 `fast_image_resize`，异常时回退 `image` 自带的 `resize_exact`。
fn scale_region(
    region: RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: imageops::FilterType,
) -> Result<RgbaImage, SliceError> {
    if region.dimensions() == (target_width, target_height) {
        return Ok(region);
    }

    match resize_with_fast_image_resize(&region, target_width, target_height, filter) {
        Ok(resized) => Ok(resized),
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}", err);
            let fallback = DynamicImage::ImageRgba8(region)
                .resize_exact(target_width, target_height, filter);
            Ok(fallback.to_rgba8())
        }
    }
}

fn resize_with_fast_image_resize(
    region: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: imageops::FilterType,
) -> Result<RgbaImage, SliceError> {
    let (src_width, src_height) = region.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        region.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| SliceError::Encode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| SliceError::Encode(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| SliceError::Encode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: imageops::FilterType) -> fr::FilterType {
    match filter {
        imageops::FilterType::Nearest => fr::FilterType::Box,
        imageops::FilterType::Triangle => fr::FilterType::Bilinear,
        imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
        imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
        imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}

/// 导出工作台当前像素内容为自包含 data URI。
fn export_data_uri(workbench: &RgbaImage, index: usize) -> Result<String, SliceError> {
    let mut cursor = Cursor::new(Vec::new());

    DynamicImage::ImageRgba8(workbench.clone())
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| SliceError::Encode(format!("第 {} 列 PNG 编码失败：{}", index, e)))?;

    let encoded = general_purpose::STANDARD.encode(cursor.into_inner());
    Ok(format!("data:image/png;base64,{}", encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicer::geometry::{partition, tile_geometry};

    fn gradient_source(width: u32, height: u32) -> RgbaImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x % 255) as u8;
            let g = (y % 255) as u8;
            let b = ((x + y) % 255) as u8;
            Rgba([r, g, b, 255])
        })
    }

    fn measurements(display_width: f64, display_height: f64, source: &RgbaImage) -> SourceMeasurements {
        SourceMeasurements {
            display_width,
            display_height,
            source_width: source.width() as f64,
            source_height: source.height() as f64,
        }
    }

    fn decode_data_uri(uri: &str) -> RgbaImage {
        let payload = uri
            .strip_prefix("data:image/png;base64,")
            .expect("data uri prefix missing");
        let bytes = general_purpose::STANDARD.decode(payload).expect("base64 decode failed");
        image::load_from_memory(&bytes).expect("png decode failed").to_rgba8()
    }

    #[test]
    fn tile_is_mirror_symmetric_about_centerline() {
        let source = gradient_source(320, 160);
        let m = measurements(320.0, 160.0, &source);
        let config = SliceConfig::default();
        let bands = partition(8);

        let geometry = tile_geometry(bands[2], &m, config.distortion);
        let tile = render_tile(&source, &geometry, &m, &config, 2).expect("render failed");
        let decoded = decode_data_uri(&tile.data_uri);

        assert_eq!(decoded.dimensions(), (tile.pixel_width, tile.pixel_height));
        for y in 0..decoded.height() {
            for x in 0..decoded.width() {
                let mirrored = decoded.width() - 1 - x;
                assert_eq!(
                    decoded.get_pixel(x, y),
                    decoded.get_pixel(mirrored, y),
                    "asymmetry at ({}, {})",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn odd_width_tile_keeps_exact_seam() {
        let source = gradient_source(300, 100);
        let m = measurements(135.0, 100.0, &source);
        let config = SliceConfig { distortion: 1.0, ..SliceConfig::default() };
        let bands = partition(3);

        // 135 / 3 = 45：奇数宽度，左半幅 23 列含中线
        let geometry = tile_geometry(bands[1], &m, config.distortion);
        let tile = render_tile(&source, &geometry, &m, &config, 1).expect("render failed");
        assert_eq!(tile.pixel_width, 45);

        let decoded = decode_data_uri(&tile.data_uri);
        for x in 0..decoded.width() {
            assert_eq!(
                decoded.get_pixel(x, 10),
                decoded.get_pixel(decoded.width() - 1 - x, 10)
            );
        }
    }

    #[test]
    fn unit_distortion_left_half_matches_source_strip() {
        // 展示与源同尺寸、畸变 1、Nearest 滤镜：左半幅应为源分带左半的逐像素拷贝
        let source = gradient_source(400, 120);
        let m = measurements(400.0, 120.0, &source);
        let config = SliceConfig {
            distortion: 1.0,
            resize_filter: imageops::FilterType::Nearest,
            ..SliceConfig::default()
        };
        let bands = partition(4);

        let geometry = tile_geometry(bands[1], &m, config.distortion);
        let tile = render_tile(&source, &geometry, &m, &config, 1).expect("render failed");
        let decoded = decode_data_uri(&tile.data_uri);

        assert_eq!(tile.pixel_width, 100);
        for y in 0..decoded.height() {
            for x in 0..50 {
                assert_eq!(decoded.get_pixel(x, y), source.get_pixel(100 + x, y));
            }
        }
    }

    #[test]
    fn degenerate_workbench_is_rejected() {
        let source = gradient_source(100, 100);
        let m = measurements(100.0, 100.0, &source);
        let config = SliceConfig::default();

        let geometry = TileGeometry {
            start_x: 0.0,
            start_source_x: 0.0,
            portion_width: 0.2,
            portion_source_width: 0.2,
        };
        let result = render_tile(&source, &geometry, &m, &config, 0);
        assert!(matches!(result, Err(SliceError::Geometry(_))));
    }
}
