//! # 图像质量评估模块
//!
//! 比较原始载体与隐写结果之间的失真程度。

use crate::error::{PvdError, Result};
use crate::pixels::PixelBuffer;

/// 8 位样本的最大值。
const MAX_SAMPLE: f64 = 255.0;

fn ensure_same_shape(cover: &PixelBuffer, stego: &PixelBuffer) -> Result<()> {
    if cover.same_shape(stego) {
        return Ok(());
    }
    Err(PvdError::DimensionMismatch(format!(
        "{}x{} {:?} vs {}x{} {:?}",
        cover.width(),
        cover.height(),
        cover.mode(),
        stego.width(),
        stego.height(),
        stego.mode()
    )))
}

/// 所有样本的均方误差。
pub fn mse(cover: &PixelBuffer, stego: &PixelBuffer) -> Result<f64> {
    ensure_same_shape(cover, stego)?;
    if cover.samples().is_empty() {
        return Ok(0.0);
    }

    let total: f64 = cover
        .samples()
        .iter()
        .zip(stego.samples())
        .map(|(&a, &b)| {
            let d = a as f64 - b as f64;
            d * d
        })
        .sum();

    Ok(total / cover.samples().len() as f64)
}

/// 峰值信噪比 (dB)。两幅图像完全相同时返回正无穷。
pub fn psnr(cover: &PixelBuffer, stego: &PixelBuffer) -> Result<f64> {
    let mse = mse(cover, stego)?;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(20.0 * (MAX_SAMPLE / mse.sqrt()).log10())
}
