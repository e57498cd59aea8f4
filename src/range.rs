//! # 区间表模块
//!
//! 将像素对的绝对差值归入固定的量化区间，并给出该区间可以承载的位数。

use crate::constants::RANGE_TABLE;
use crate::error::{PvdError, Result};

/// 区间表中的一项：`[lower, upper]` 以及可嵌入的位数 `width`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeEntry {
    pub lower: u8,
    pub upper: u8,
    pub width: u8,
}

impl RangeEntry {
    pub const fn new(lower: u8, upper: u8, width: u8) -> Self {
        Self {
            lower,
            upper,
            width,
        }
    }

    pub fn contains(&self, diff: u8) -> bool {
        self.lower <= diff && diff <= self.upper
    }
}

/// 返回差值 `diff` 所在的区间。
///
/// 区间表覆盖了全部字节值，因此 `MalformedRange` 只会在表本身被改坏时出现。
pub fn classify(diff: u8) -> Result<RangeEntry> {
    RANGE_TABLE
        .iter()
        .find(|entry| entry.contains(diff))
        .copied()
        .ok_or(PvdError::MalformedRange(diff))
}
