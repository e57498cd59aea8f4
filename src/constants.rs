use crate::range::RangeEntry;

/// PVD 区间表。
/// 六个区间连续且无重叠地覆盖 `[0, 255]`，每个区间的可嵌入位数为
/// `floor(log2(upper - lower + 1))`。
pub const RANGE_TABLE: [RangeEntry; 6] = [
    RangeEntry::new(0, 7, 3),
    RangeEntry::new(8, 15, 3),
    RangeEntry::new(16, 31, 4),
    RangeEntry::new(32, 63, 5),
    RangeEntry::new(64, 127, 6),
    RangeEntry::new(128, 255, 7),
];

/// 消息结束标记。嵌入时追加在负载之后，提取时遇到即停止。
pub const SENTINEL: u8 = 0xFF;

/// 每个字节的位数。
pub const BITS_PER_BYTE: usize = 8;

/// 未指定输出路径时，隐写图像文件名的前缀。
pub const HIDDEN_IMAGE_PREFIX: &str = "doctored_";

/// 未指定输出路径时，恢复文本文件名的前缀。
pub const RECOVERED_TEXT_PREFIX: &str = "recovered_";
