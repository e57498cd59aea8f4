//! # 容量分析模块
//!
//! 只读地扫描一遍像素缓冲区，计算能够嵌入的总位数。
//! 调用方应在嵌入之前用它确认负载放得下。

use crate::constants::BITS_PER_BYTE;
use crate::error::Result;
use crate::framing::packed_len;
use crate::pixels::{PixelBuffer, ScanOrder};
use crate::range::classify;

/// 载体的嵌入容量。`bytes` 为 `bits / 8`，包含结束标记所占的字节。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capacity {
    pub bits: usize,
    pub bytes: usize,
}

impl Capacity {
    pub fn from_bits(bits: usize) -> Self {
        Self {
            bits,
            bytes: bits / BITS_PER_BYTE,
        }
    }

    /// 长度为 `payload_len` 的负载连同结束标记能否放入载体。
    pub fn fits(&self, payload_len: usize) -> bool {
        packed_len(payload_len) <= self.bits
    }

    /// 扣除结束标记后可容纳的最大负载字节数。
    pub fn max_payload_bytes(&self) -> usize {
        self.bytes.saturating_sub(1)
    }
}

/// 计算缓冲区的总容量。
///
/// 每个通道的每个像素对贡献其差值所在区间的位数。
/// 嵌入不会让差值离开原来的区间，因此容量在嵌入前后保持不变。
pub fn capacity(buffer: &PixelBuffer) -> Result<Capacity> {
    let samples = buffer.samples();
    // 容量与扫描顺序无关。
    let bits = buffer
        .pairs(ScanOrder::ChannelMajor)
        .map(|(first, second)| {
            classify(samples[first].abs_diff(samples[second])).map(|entry| entry.width as usize)
        })
        .sum::<Result<usize>>()?;

    Ok(Capacity::from_bits(bits))
}
