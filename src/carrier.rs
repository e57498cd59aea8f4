//! # 载体图像读写模块
//!
//! 负责在图像文件与 [`PixelBuffer`] 之间转换。编解码器本身只处理已解码的像素。
//!
//! 隐写结果只能以无损格式保存：写入时只接受 PNG、BMP、TIFF、WebP（无损）和 QOI，
//! 其余格式一律拒绝。之后对文件做的任何有损转码都会破坏隐藏的数据，这一点需要调用方自行保证。

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use std::path::Path;

use crate::error::{PvdError, Result};
use crate::pixels::{ChannelMode, PixelBuffer};

impl ChannelMode {
    /// 彩色图像使用 RGB，其余使用灰度。
    pub fn detect(image: &DynamicImage) -> Self {
        if image.color().has_color() {
            ChannelMode::Rgb
        } else {
            ChannelMode::Grayscale
        }
    }
}

impl PixelBuffer {
    /// 将解码后的图像转换为 8 位缓冲区，Alpha 通道会被丢弃。
    pub fn from_image(image: &DynamicImage, mode: ChannelMode) -> Result<Self> {
        let (width, height, samples) = match mode {
            ChannelMode::Grayscale => {
                let luma = image.to_luma8();
                (luma.width(), luma.height(), luma.into_raw())
            }
            ChannelMode::Rgb => {
                let rgb = image.to_rgb8();
                (rgb.width(), rgb.height(), rgb.into_raw())
            }
        };
        PixelBuffer::new(width, height, mode, samples)
    }

    pub fn into_image(self) -> Result<DynamicImage> {
        let (width, height, mode) = (self.width(), self.height(), self.mode());
        let expected = width as usize * height as usize * mode.channels();
        let samples = self.into_samples();
        let actual = samples.len();

        let image = match mode {
            ChannelMode::Grayscale => {
                GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
            }
            ChannelMode::Rgb => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        };
        image.ok_or(PvdError::BufferSizeMismatch { expected, actual })
    }
}

/// 该格式写出的文件能否原样保留每个样本。
pub fn is_lossless(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tiff | ImageFormat::WebP | ImageFormat::Qoi
    )
}

/// 读取图像文件。`mode` 为 `None` 时根据图像本身的颜色类型决定。
pub fn load(path: &Path, mode: Option<ChannelMode>) -> Result<PixelBuffer> {
    let image = image::open(path)?;
    let mode = mode.unwrap_or_else(|| ChannelMode::detect(&image));
    log::debug!(
        "loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        mode
    );
    PixelBuffer::from_image(&image, mode)
}

/// 检查 `mode` 的缓冲区能否按 `path` 的扩展名无损写出，返回对应格式。
///
/// 应在嵌入之前调用，避免嵌入成功后才发现无法保存。
/// QOI 只能编码 RGB/RGBA，灰度缓冲区不能写成 QOI。
pub fn check_target(mode: ChannelMode, path: &Path) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(path)?;
    if !is_lossless(format) {
        return Err(PvdError::LossyCarrier(format!("{format:?}")));
    }
    if mode == ChannelMode::Grayscale && format == ImageFormat::Qoi {
        return Err(PvdError::UnsupportedTarget(format!(
            "{format:?} cannot store grayscale images"
        )));
    }
    Ok(format)
}

/// 按扩展名推断格式并保存，只接受无损格式。
pub fn save(buffer: PixelBuffer, path: &Path) -> Result<()> {
    let format = check_target(buffer.mode(), path)?;
    buffer.into_image()?.save_with_format(path, format)?;
    Ok(())
}
