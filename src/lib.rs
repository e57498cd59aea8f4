//! # pvd_hide 库
//!
//! 本库包含 PVD (像素值差分) 隐写工具的核心逻辑。
//!
//! 相邻像素对的差值被改写为承载消息位的新差值，两像素之和尽量保持不变。
//! 编解码器只处理已解码的像素缓冲区 ([`PixelBuffer`])，
//! 图像文件的读写由 [`carrier`] 负责，负载加密由 [`cipher`] 负责。
//!
//! 隐写结果必须以无损格式保存和传输，有损压缩会破坏隐藏的数据。

// 声明库包含的所有模块。

pub mod capacity;
pub mod carrier;
pub mod cipher;
pub mod cli;
pub mod constants;
pub mod error;
pub mod framing;
pub mod handler;
pub mod pixels;
pub mod quality;
pub mod range;
pub mod steganography;

pub use capacity::{Capacity, capacity};
pub use error::{PvdError, Result};
pub use pixels::{ChannelMode, PixelBuffer, ScanOrder};
pub use steganography::{CodecOptions, RoundingPolicy, embed, embed_copy, extract};
