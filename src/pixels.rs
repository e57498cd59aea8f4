//! # 像素缓冲区与扫描顺序模块
//!
//! 定义编解码器操作的像素缓冲区，以及嵌入、提取和容量计算共用的像素对扫描顺序。
//! 三者必须使用同一种扫描顺序，否则提取出来的消息会被悄无声息地破坏。

use crate::error::{PvdError, Result};

/// 缓冲区的通道模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// 单通道灰度。
    Grayscale,
    /// 三通道 RGB。
    Rgb,
}

impl ChannelMode {
    pub fn channels(self) -> usize {
        match self {
            ChannelMode::Grayscale => 1,
            ChannelMode::Rgb => 3,
        }
    }
}

/// 像素对的遍历顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOrder {
    /// 先遍历通道 0 的全部像素对，再遍历通道 1，依此类推。
    #[default]
    ChannelMajor,
    /// 对每个像素对依次遍历所有通道。
    PixelMajor,
}

/// 按行优先存储、通道交错排列的 8 位像素缓冲区。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    mode: ChannelMode,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// 创建缓冲区，样本数必须等于 `width * height * channels`。
    pub fn new(width: u32, height: u32, mode: ChannelMode, samples: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * mode.channels();
        if samples.len() != expected {
            return Err(PvdError::BufferSizeMismatch {
                expected,
                actual: samples.len(),
            });
        }

        Ok(Self {
            width,
            height,
            mode,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 每个通道中的像素对数量。像素数为奇数时，最后一个像素不参与配对。
    pub fn pairs_per_channel(&self) -> usize {
        self.pixel_count() / 2
    }

    /// 形状（宽、高、通道模式）是否相同。
    pub fn same_shape(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height && self.mode == other.mode
    }

    /// 按给定顺序产生每个像素对在 `samples` 中的两个下标。
    pub fn pairs(&self, order: ScanOrder) -> PairScan {
        PairScan {
            order,
            channels: self.channels(),
            pairs: self.pairs_per_channel(),
            outer: 0,
            inner: 0,
        }
    }
}

/// 像素对扫描迭代器，产生 `(first, second)` 样本下标。
#[derive(Debug, Clone)]
pub struct PairScan {
    order: ScanOrder,
    channels: usize,
    pairs: usize,
    outer: usize,
    inner: usize,
}

impl PairScan {
    fn indices(&self, pair: usize, channel: usize) -> (usize, usize) {
        let first = 2 * pair * self.channels + channel;
        (first, first + self.channels)
    }
}

impl Iterator for PairScan {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (outer_len, inner_len) = match self.order {
            ScanOrder::ChannelMajor => (self.channels, self.pairs),
            ScanOrder::PixelMajor => (self.pairs, self.channels),
        };

        if inner_len == 0 {
            return None;
        }
        if self.inner == inner_len {
            self.inner = 0;
            self.outer += 1;
        }
        if self.outer >= outer_len {
            return None;
        }

        let (pair, channel) = match self.order {
            ScanOrder::ChannelMajor => (self.inner, self.outer),
            ScanOrder::PixelMajor => (self.outer, self.inner),
        };
        self.inner += 1;

        Some(self.indices(pair, channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(width: u32, height: u32) -> PixelBuffer {
        let len = (width * height * 3) as usize;
        PixelBuffer::new(width, height, ChannelMode::Rgb, vec![0; len]).unwrap()
    }

    #[test]
    fn rejects_wrong_sample_count() {
        let err = PixelBuffer::new(2, 2, ChannelMode::Rgb, vec![0; 11]).unwrap_err();
        assert!(matches!(
            err,
            PvdError::BufferSizeMismatch {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn channel_major_walks_one_channel_at_a_time() {
        let buffer = rgb(2, 2);
        let pairs: Vec<_> = buffer.pairs(ScanOrder::ChannelMajor).collect();
        assert_eq!(
            pairs,
            vec![(0, 3), (6, 9), (1, 4), (7, 10), (2, 5), (8, 11)]
        );
    }

    #[test]
    fn pixel_major_walks_all_channels_of_a_pair() {
        let buffer = rgb(2, 2);
        let pairs: Vec<_> = buffer.pairs(ScanOrder::PixelMajor).collect();
        assert_eq!(
            pairs,
            vec![(0, 3), (1, 4), (2, 5), (6, 9), (7, 10), (8, 11)]
        );
    }

    #[test]
    fn pairs_cross_row_boundaries_and_skip_trailing_pixel() {
        let buffer = PixelBuffer::new(3, 1, ChannelMode::Grayscale, vec![1, 2, 3]).unwrap();
        let pairs: Vec<_> = buffer.pairs(ScanOrder::ChannelMajor).collect();
        assert_eq!(pairs, vec![(0, 1)]);

        let buffer = PixelBuffer::new(3, 3, ChannelMode::Grayscale, vec![0; 9]).unwrap();
        assert_eq!(buffer.pairs(ScanOrder::ChannelMajor).count(), 4);
    }

    #[test]
    fn empty_buffer_has_no_pairs() {
        let buffer = PixelBuffer::new(1, 1, ChannelMode::Rgb, vec![0; 3]).unwrap();
        assert_eq!(buffer.pairs(ScanOrder::ChannelMajor).count(), 0);
        assert_eq!(buffer.pairs(ScanOrder::PixelMajor).count(), 0);
    }
}
