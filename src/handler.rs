//! # 命令处理逻辑模块
//!
//! 包含处理各个子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用加密与隐写核心算法以及向用户报告结果。

use crate::capacity::capacity;
use crate::carrier::{self, is_lossless};
use crate::cipher::{Passphrase, PayloadCipher, Plaintext, RsaKeys};
use crate::cli::{CapacityArgs, EvaluateArgs, HideArgs, KeygenArgs, RecoverArgs};
use crate::constants::{HIDDEN_IMAGE_PREFIX, RECOVERED_TEXT_PREFIX};
use crate::quality::{mse, psnr};
use crate::steganography::{embed, extract};
use anyhow::{Context, Result};
use colored::Colorize;
use image::ImageFormat;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// 选择负载加密方式：优先使用 RSA 密钥文件，其次口令，否则不加密。
///
/// `load` 决定从密钥文件中读取公钥还是私钥。
fn payload_cipher(
    key: Option<&Path>,
    load: fn(&Path) -> crate::Result<RsaKeys>,
    password: Option<&str>,
) -> Result<Box<dyn PayloadCipher>> {
    if let Some(key) = key {
        let keys = load(key).with_context(|| {
            format!(
                "Unable to read key file: {}",
                key.to_string_lossy().red().bold()
            )
        })?;
        return Ok(Box::new(keys));
    }
    let cipher: Box<dyn PayloadCipher> = match password {
        Some(password) => Box::new(Passphrase::new(password)),
        None => Box::new(Plaintext),
    };
    Ok(cipher)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// 默认的隐写图像路径：输入图像旁的 `doctored_<文件名>`。
/// 输入为有损格式时改用 PNG。
pub fn default_hidden_path(image: &Path) -> PathBuf {
    let extension = match ImageFormat::from_path(image) {
        Ok(format) if is_lossless(format) => image
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "png".to_string()),
        _ => "png".to_string(),
    };
    image.with_file_name(format!(
        "{HIDDEN_IMAGE_PREFIX}{}.{extension}",
        file_stem(image)
    ))
}

/// 默认的恢复文本路径：图像旁的 `recovered_<文件名>.txt`。
pub fn default_recovered_path(image: &Path) -> PathBuf {
    image.with_file_name(format!("{RECOVERED_TEXT_PREFIX}{}.txt", file_stem(image)))
}

/// 输出文件已存在且未指定 `--force` 时拒绝继续。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本文件、按需加密文本、检查隐写空间是否足够、调用隐写核心函数嵌入数据，
/// 最后将结果以无损格式写入目标图像文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出文件已存在且未指定 `--force`。
/// * 无法读取输入的图像或文本文件。
/// * 图像没有足够的空间来隐藏文本。
/// * 目标路径不是无损图像格式、格式无法保存该通道模式 (如灰度 QOI)，或无法写入。
/// * 公钥文件无法读取，或文本超出 RSA 单块加密的长度上限。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_hidden_path(&args.image));
    ensure_writable(&dest, args.force)?;

    let mut picture = carrier::load(&args.image, args.codec.mode.channel_mode()).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    carrier::check_target(picture.mode(), &dest).with_context(|| {
        format!(
            "Cannot save the hidden image as: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    let text = fs::read(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    let payload = payload_cipher(
        args.public_key.as_deref(),
        RsaKeys::load_public,
        args.password.as_deref(),
    )?
    .encrypt(&text)
    .context("Failed to encrypt the text before hiding it.")?;

    let available = capacity(&picture).context("Failed to analyse the image capacity.")?;
    anyhow::ensure!(
        available.fits(payload.len()),
        "Not enough space in the image to hide the text. \nRequired: {} bytes, Available: {} bytes",
        payload.len().to_string().red().bold(),
        available.max_payload_bytes().to_string().green().bold()
    );

    let report = embed(&mut picture, &payload, &args.codec.options()).with_context(|| {
        "Failed to hide the text in the image. \nThe image may be corrupted."
    })?;

    carrier::save(picture, &dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    println!(
        "Used {} of {} bits across {} pixel pairs.",
        report.bits_embedded.to_string().green(),
        report.capacity.bits.to_string().green(),
        report.pairs_modified.to_string().green()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用提取核心函数取回数据、按需解密，
/// 最后将恢复的文本内容写入目标文本文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出文件已存在且未指定 `--force`。
/// * 无法读取输入的图像文件。
/// * 图像中找不到消息结束标记。
/// * 私钥文件无法读取。
/// * 口令或私钥错误，或数据已损坏。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let text_path = args
        .text
        .clone()
        .unwrap_or_else(|| default_recovered_path(&args.image));
    ensure_writable(&text_path, args.force)?;

    let picture = carrier::load(&args.image, args.codec.mode.channel_mode()).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let payload = extract(&picture, &args.codec.options()).with_context(|| {
        format!(
            "Failed to recover a message from '{}'. \nThe image may not contain a hidden message or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let text = payload_cipher(
        args.private_key.as_deref(),
        RsaKeys::load_private,
        args.password.as_deref(),
    )?
    .decrypt(&payload)
    .context("Failed to decrypt the recovered message. \nThe password or private key may be wrong.")?;

    fs::write(&text_path, text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            text_path.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        text_path.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令：打印图像可隐藏的位数与字节数。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let picture = carrier::load(&args.image, args.mode.channel_mode()).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let available = capacity(&picture).context("Failed to analyse the image capacity.")?;

    println!(
        "Capacity of {}: {} bits ({} bytes), up to {} bytes of text.",
        args.image.to_string_lossy().green().bold(),
        available.bits.to_string().green(),
        available.bytes.to_string().green(),
        available.max_payload_bytes().to_string().green().bold()
    );
    Ok(())
}

/// 处理 'Evaluate' 命令：计算 MSE 与 PSNR，并可追加到 CSV 文件。
pub fn handle_evaluate(args: EvaluateArgs) -> Result<()> {
    let cover = carrier::load(&args.cover, None).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.cover.to_string_lossy().red().bold()
        )
    })?;
    let stego = carrier::load(&args.stego, Some(cover.mode())).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.stego.to_string_lossy().red().bold()
        )
    })?;

    let mse = mse(&cover, &stego).context("The two images cannot be compared.")?;
    let psnr = psnr(&cover, &stego)?;

    println!(
        "MSE: {}, PSNR: {} dB",
        format!("{mse:.6}").green().bold(),
        format!("{psnr:.4}").green().bold()
    );

    if let Some(csv_path) = &args.csv {
        append_csv_row(csv_path, &args.cover, &args.stego, mse, psnr).with_context(|| {
            format!(
                "Unable to write to CSV file: {}",
                csv_path.to_string_lossy().red().bold()
            )
        })?;
    }
    Ok(())
}

/// 追加一行评估结果，文件为空时先写表头。含逗号或引号的路径按 CSV 规则转义。
fn append_csv_row(path: &Path, cover: &Path, stego: &Path, mse: f64, psnr: f64) -> Result<()> {
    let needs_header = fs::metadata(path).map(|meta| meta.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if needs_header {
        writer.write_record(["cover", "stego", "mse", "psnr"])?;
    }
    writer.write_record([
        cover.to_string_lossy().into_owned(),
        stego.to_string_lossy().into_owned(),
        mse.to_string(),
        psnr.to_string(),
    ])?;
    writer.flush()?;
    Ok(())
}

/// 处理 'Keygen' 命令：生成 RSA 密钥对并写入两个 PEM 文件。
///
/// 私钥由接收方保管，公钥交给发送方用于 `hide --public-key`。
pub fn handle_keygen(args: KeygenArgs) -> Result<()> {
    ensure_writable(&args.private_key, args.force)?;
    ensure_writable(&args.public_key, args.force)?;

    let keys = RsaKeys::generate(args.bits)
        .with_context(|| format!("Failed to generate a {}-bit RSA key pair.", args.bits))?;

    for (path, pem) in [
        (&args.private_key, keys.private_pem()?),
        (&args.public_key, keys.public_pem()?),
    ] {
        fs::write(path, pem).with_context(|| {
            format!(
                "Unable to write key file: {}",
                path.to_string_lossy().red().bold()
            )
        })?;
    }

    println!(
        "RSA key pair generated. Private key: {}, public key: {}",
        args.private_key.to_string_lossy().green().bold(),
        args.public_key.to_string_lossy().green().bold()
    );
    Ok(())
}
