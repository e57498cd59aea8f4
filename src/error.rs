//! # 错误类型模块
//!
//! 库内所有可恢复的失败都通过 [`PvdError`] 返回给调用方。

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PvdError>;

#[derive(Error, Debug)]
pub enum PvdError {
    /// 负载（含结束标记）所需的位数超过载体的容量。在修改任何像素之前检测。
    #[error("Capacity exceeded: the payload needs {required} bits, the carrier holds only {available} bits")]
    CapacityExceeded { required: usize, available: usize },

    /// 扫描完整个载体也没有找到结束标记。
    /// 通常意味着图像中没有隐藏消息，或嵌入与提取的扫描顺序不一致。
    #[error("No end-of-message marker found in the carrier")]
    TerminatorNotFound,

    /// 差值无法归入任何区间，属于内部不变量被破坏。
    #[error("Pixel difference {0} does not fall into any range of the range table")]
    MalformedRange(u8),

    /// 样本数量与宽、高、通道数不符。
    #[error("Pixel buffer holds {actual} samples, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// 两个缓冲区的尺寸或通道数不一致，无法比较。
    #[error("Pixel buffers differ in shape: {0}")]
    DimensionMismatch(String),

    /// 输出格式会有损压缩，隐藏的数据将被破坏。
    #[error("Refusing to write a lossy carrier format: {0}")]
    LossyCarrier(String),

    /// 无损格式本身无法保存该通道模式的缓冲区。
    #[error("Unsupported target format: {0}")]
    UnsupportedTarget(String),

    #[error("Image error")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Key derivation error")]
    KeyDerivation(argon2::Error),

    #[error("Encryption error")]
    Encryption(chacha20poly1305::Error),

    /// 口令错误或密文已损坏。
    #[error("Decryption error: wrong password or corrupted payload")]
    Decryption(chacha20poly1305::Error),

    #[error("Encrypted payload is not valid base64")]
    InvalidArmor(#[from] base64::DecodeError),

    /// RSA 加密或解密失败，例如明文过长或私钥不匹配。
    #[error("RSA error: {0}")]
    Rsa(#[from] rsa::Error),

    #[error("Invalid key file: {0}")]
    KeyFormat(String),

    #[error("No {0} key available for this operation")]
    MissingKey(&'static str),

    #[error("Encrypted payload is too short ({0} bytes)")]
    SealedPayloadTooShort(usize),
}
