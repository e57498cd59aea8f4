//! # PVD 隐写核心模块
//!
//! 嵌入：按扫描顺序读取像素对，把若干位消息编码进两像素的差值，同时尽量保持两者之和不变。
//! 提取：以相同顺序读取差值，还原出位序列，直到遇到结束标记。
//!
//! 修改后的缓冲区必须以无损格式保存或传输（PNG、BMP 等），
//! 任何有损的重新编码都会破坏隐藏的数据。本模块不做检查，见 [`crate::carrier::save`]。

use crate::capacity::{Capacity, capacity};
use crate::constants::SENTINEL;
use crate::error::{PvdError, Result};
use crate::framing::{Unpacker, pack};
use crate::pixels::{PixelBuffer, ScanOrder};
use crate::range::classify;

/// 计算新像素值时 `x / 2` 遇到 `.5` 的取舍规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingPolicy {
    /// 向正无穷方向舍入，`8.5 -> 9`。
    #[default]
    HalfUp,
    /// 舍入到偶数，`8.5 -> 8`。
    HalfEven,
}

impl RoundingPolicy {
    /// 返回 `value / 2` 按规则舍入后的整数。
    pub fn halve(self, value: i32) -> i32 {
        let floor = value.div_euclid(2);
        if value.rem_euclid(2) == 0 {
            return floor;
        }
        match self {
            RoundingPolicy::HalfUp => floor + 1,
            RoundingPolicy::HalfEven if floor % 2 == 0 => floor,
            RoundingPolicy::HalfEven => floor + 1,
        }
    }
}

/// 编解码参数。嵌入和提取必须使用相同的扫描顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {
    pub order: ScanOrder,
    pub rounding: RoundingPolicy,
}

/// 一次嵌入的统计信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedReport {
    /// 写入的消息位数（含结束标记，不含末尾补齐的 0）。
    pub bits_embedded: usize,
    /// 被改写的像素对数量。
    pub pairs_modified: usize,
    pub capacity: Capacity,
}

/// 计算让像素对差值变为 `new_diff` 的新像素值，尽量保持两者的中点不变。
///
/// 若结果越出 `[0, 255]`，两个值一起平移回范围内，差值保持 `new_diff` 不变。
/// `new_diff` 不为 0 时，降序的像素对保持降序，升序或相等的像素对变为严格升序。
pub fn adjust_pair(p1: u8, p2: u8, new_diff: u8, rounding: RoundingPolicy) -> (u8, u8) {
    let (a, b, d) = (p1 as i32, p2 as i32, new_diff as i32);

    let (mut n1, mut n2) = if b >= a {
        let n1 = rounding.halve(a + b - d);
        (n1, n1 + d)
    } else {
        let n1 = rounding.halve(a + b + d);
        (n1, n1 - d)
    };

    let low = n1.min(n2);
    if low < 0 {
        n1 -= low;
        n2 -= low;
    }
    let high = n1.max(n2);
    if high > u8::MAX as i32 {
        let excess = high - u8::MAX as i32;
        n1 -= excess;
        n2 -= excess;
    }

    (to_sample(n1), to_sample(n2))
}

fn to_sample(value: i32) -> u8 {
    debug_assert!((0..=255).contains(&value), "sample {value} escaped [0, 255]");
    value.clamp(0, u8::MAX as i32) as u8
}

/// 从 `bits[cursor..]` 取出 `width` 位组成整数，不足时在右侧补 0。
fn take_segment(bits: &[bool], cursor: usize, width: u8) -> u8 {
    (0..width as usize).fold(0u8, |acc, offset| {
        let bit = bits.get(cursor + offset).copied().unwrap_or(false);
        (acc << 1) | bit as u8
    })
}

/// 将位序列直接嵌入缓冲区（原地修改）。
///
/// 在改动任何像素之前先检查容量，放不下时返回 `CapacityExceeded`，缓冲区保持原样。
/// 位序列用完后立即停止，其余像素对不做改动。
pub fn embed_bits(
    buffer: &mut PixelBuffer,
    bits: &[bool],
    options: &CodecOptions,
) -> Result<EmbedReport> {
    let available = capacity(buffer)?;
    if bits.len() > available.bits {
        return Err(PvdError::CapacityExceeded {
            required: bits.len(),
            available: available.bits,
        });
    }

    let scan = buffer.pairs(options.order);
    let samples = buffer.samples_mut();
    let mut cursor = 0;
    let mut pairs_modified = 0;

    for (first, second) in scan {
        if cursor >= bits.len() {
            break;
        }

        let (p1, p2) = (samples[first], samples[second]);
        let range = classify(p1.abs_diff(p2))?;
        let segment = take_segment(bits, cursor, range.width);
        cursor += range.width as usize;

        let (n1, n2) = adjust_pair(p1, p2, range.lower + segment, options.rounding);
        samples[first] = n1;
        samples[second] = n2;
        pairs_modified += 1;
    }

    let report = EmbedReport {
        bits_embedded: bits.len(),
        pairs_modified,
        capacity: available,
    };
    log::debug!(
        "embedded {} bits into {} pixel pairs (capacity {} bits)",
        report.bits_embedded,
        report.pairs_modified,
        report.capacity.bits
    );

    Ok(report)
}

/// 将负载连同结束标记嵌入缓冲区（原地修改）。
pub fn embed(
    buffer: &mut PixelBuffer,
    payload: &[u8],
    options: &CodecOptions,
) -> Result<EmbedReport> {
    if let Some(index) = payload.iter().position(|&byte| byte == SENTINEL) {
        log::warn!(
            "payload byte {index} equals the end-of-message marker {SENTINEL:#04x}; extraction will stop there"
        );
    }
    embed_bits(buffer, &pack(payload), options)
}

/// 与 [`embed`] 相同，但返回修改后的副本，输入缓冲区不变。
pub fn embed_copy(
    buffer: &PixelBuffer,
    payload: &[u8],
    options: &CodecOptions,
) -> Result<PixelBuffer> {
    let mut stego = buffer.clone();
    embed(&mut stego, payload, options)?;
    Ok(stego)
}

/// 从缓冲区中提取负载。
///
/// 扫描到结束标记后立即停止；扫描完整个缓冲区仍未找到时返回 `TerminatorNotFound`。
pub fn extract(buffer: &PixelBuffer, options: &CodecOptions) -> Result<Vec<u8>> {
    let samples = buffer.samples();
    let mut unpacker = Unpacker::default();
    let mut pairs_read = 0;

    for (first, second) in buffer.pairs(options.order) {
        let diff = samples[first].abs_diff(samples[second]);
        let range = classify(diff)?;
        pairs_read += 1;
        if unpacker.push_bits(diff - range.lower, range.width) {
            break;
        }
    }

    log::debug!(
        "read {pairs_read} pixel pairs, terminator found: {}",
        unpacker.is_done()
    );

    unpacker.finish()
}
