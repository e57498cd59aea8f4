//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cipher::DEFAULT_RSA_BITS;
use crate::pixels::{ChannelMode, ScanOrder};
use crate::steganography::{CodecOptions, RoundingPolicy};

/// 一款基于 PVD (像素值差分) 隐写术的命令行工具，用于在无损格式图像 (如 PNG, BMP) 中隐藏或恢复文本。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 PVD (像素值差分) 隐写术的命令行工具，用于在无损格式图像 (如 PNG, BMP) 中隐藏或恢复文本。\n隐写后的图像必须以无损格式保存和传输，否则隐藏的数据会被破坏。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 在无损格式图像 (如 PNG, BMP) 中隐藏文本文件内容。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的文本。
    Recover(RecoverArgs),

    /// 显示图像可以隐藏的最大数据量。
    Capacity(CapacityArgs),

    /// 计算原始图像与隐写图像之间的 MSE 与 PSNR。
    Evaluate(EvaluateArgs),

    /// 生成用于加密隐藏内容的 RSA 密钥对。
    Keygen(KeygenArgs),
}

/// 通道模式。
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModeArg {
    /// 根据图像的颜色类型自动选择。
    #[default]
    Auto,
    /// 单通道灰度。
    Gray,
    /// 三通道 RGB。
    Rgb,
}

impl ModeArg {
    pub fn channel_mode(self) -> Option<ChannelMode> {
        match self {
            ModeArg::Auto => None,
            ModeArg::Gray => Some(ChannelMode::Grayscale),
            ModeArg::Rgb => Some(ChannelMode::Rgb),
        }
    }
}

/// 像素对的扫描顺序。
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderArg {
    /// 逐通道扫描全部像素对。
    #[default]
    Channel,
    /// 逐像素对扫描全部通道。
    Pixel,
}

/// 新像素值的舍入规则。
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingArg {
    #[default]
    HalfUp,
    HalfEven,
}

/// 编解码相关的公共参数。
#[derive(Args, Debug, Clone, Default)]
pub struct CodecArgs {
    /// 通道模式。
    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    pub mode: ModeArg,

    /// 扫描顺序，隐藏与恢复时必须一致。
    #[arg(long, value_enum, default_value_t = OrderArg::Channel)]
    pub order: OrderArg,

    /// 舍入规则，仅影响隐藏。
    #[arg(long, value_enum, default_value_t = RoundingArg::HalfUp)]
    pub rounding: RoundingArg,
}

impl CodecArgs {
    pub fn options(&self) -> CodecOptions {
        CodecOptions {
            order: match self.order {
                OrderArg::Channel => ScanOrder::ChannelMajor,
                OrderArg::Pixel => ScanOrder::PixelMajor,
            },
            rounding: match self.rounding {
                RoundingArg::HalfUp => RoundingPolicy::HalfUp,
                RoundingArg::HalfEven => RoundingPolicy::HalfEven,
            },
        }
    }
}

/// 'hide' 命令所需的参数。
#[derive(Args, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文本内容的文件路径。
    #[arg(short, long)]
    pub text: PathBuf,

    /// 隐写完成后，保存结果图像的输出路径。默认为输入图像旁的 `doctored_<文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,

    /// 使用口令加密隐藏的内容。
    #[arg(short, long, conflicts_with = "public_key")]
    pub password: Option<String>,

    /// 使用该 PEM 公钥以 RSA 加密隐藏的内容。
    #[arg(long)]
    pub public_key: Option<PathBuf>,

    #[command(flatten)]
    pub codec: CodecArgs,
}

/// 'recover' 命令所需的参数。
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// 已隐藏文本数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复文本后，保存文本内容的输出路径。默认为图像旁的 `recovered_<文件名>.txt`。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,

    /// 隐藏时使用的口令。
    #[arg(short, long, conflicts_with = "private_key")]
    pub password: Option<String>,

    /// 与隐藏时所用公钥配对的 PEM 私钥。
    #[arg(long)]
    pub private_key: Option<PathBuf>,

    #[command(flatten)]
    pub codec: CodecArgs,
}

/// 'capacity' 命令所需的参数。
#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// 要分析的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 通道模式。
    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    pub mode: ModeArg,
}

/// 'evaluate' 命令所需的参数。
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// 原始图像文件路径。
    #[arg(short, long)]
    pub cover: PathBuf,

    /// 隐写后的图像文件路径。
    #[arg(short, long)]
    pub stego: PathBuf,

    /// 将结果追加到该 CSV 文件。
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// 'keygen' 命令所需的参数。
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// 私钥 (PKCS#8 PEM) 的输出路径，由接收方保管。
    #[arg(long)]
    pub private_key: PathBuf,

    /// 公钥 (SPKI PEM) 的输出路径，交给发送方。
    #[arg(long)]
    pub public_key: PathBuf,

    /// 密钥位数。
    #[arg(short, long, default_value_t = DEFAULT_RSA_BITS)]
    pub bits: usize,

    /// 覆盖已存在的密钥文件。
    #[arg(short, long)]
    pub force: bool,
}
