//! # 负载加密模块
//!
//! 编解码器把负载当作不透明的字节序列。加密与解密通过显式传入的
//! [`PayloadCipher`] 完成，密钥材料由调用方提供。
//! 库本身不使用任何默认的密钥路径，只读写调用方明确给出的 PEM 文件。

use argon2::Argon2;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chacha20poly1305::aead::{Aead, AeadCore, OsRng};
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::fs;
use std::path::Path;
use zeroize::Zeroize;

use crate::error::{PvdError, Result};

const NONCE_LEN: usize = 24;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// 嵌入前加密、提取后解密负载的协作者。
pub trait PayloadCipher {
    fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>>;
}

/// 不做任何变换。
#[derive(Debug, Clone, Copy, Default)]
pub struct Plaintext;

impl PayloadCipher for Plaintext {
    fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>> {
        Ok(plain.to_vec())
    }

    fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        Ok(sealed.to_vec())
    }
}

/// 基于口令的加密：Argon2id 派生密钥，XChaCha20-Poly1305 加密。
///
/// 输出为 `密文 || nonce || salt` 的 base64 文本，不会出现 `0xFF` 字节，
/// 因此不会与消息结束标记冲突。
pub struct Passphrase {
    password: String,
}

impl Passphrase {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    fn derive_key(&self, salt: &[u8]) -> Result<[u8; KEY_LEN]> {
        let mut key = [0u8; KEY_LEN];
        Argon2::default()
            .hash_password_into(self.password.as_bytes(), salt, &mut key)
            .map_err(PvdError::KeyDerivation)?;
        Ok(key)
    }
}

impl Drop for Passphrase {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passphrase").finish_non_exhaustive()
    }
}

impl PayloadCipher for Passphrase {
    fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>> {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        let mut key = self.derive_key(&salt)?;

        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = XChaCha20Poly1305::new(&key.into())
            .encrypt(&nonce, plain)
            .map_err(PvdError::Encryption);
        key.zeroize();

        let mut sealed = sealed?;
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&salt);

        Ok(STANDARD.encode(sealed).into_bytes())
    }

    fn decrypt(&self, armored: &[u8]) -> Result<Vec<u8>> {
        let sealed = STANDARD.decode(armored)?;
        if sealed.len() < NONCE_LEN + SALT_LEN {
            return Err(PvdError::SealedPayloadTooShort(sealed.len()));
        }

        let (rest, salt) = sealed.split_at(sealed.len() - SALT_LEN);
        let (ciphertext, nonce) = rest.split_at(rest.len() - NONCE_LEN);
        let mut key = self.derive_key(salt)?;

        let plain = XChaCha20Poly1305::new(&key.into())
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(PvdError::Decryption);
        key.zeroize();

        plain
    }
}

/// 未指定时生成的 RSA 密钥位数。
pub const DEFAULT_RSA_BITS: usize = 2048;

/// 基于 RSA 密钥对的加密：发送方只需公钥，接收方用私钥解密。
///
/// 使用 RSA-OAEP (SHA-256) 加密单个数据块，输出经 base64 编码，不会出现 `0xFF` 字节。
/// 单块加密限制了明文长度：2048 位密钥最多 190 字节。
pub struct RsaKeys {
    public: RsaPublicKey,
    private: Option<RsaPrivateKey>,
}

impl RsaKeys {
    /// 生成新的密钥对。
    pub fn generate(bits: usize) -> Result<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, bits)?;
        Ok(Self {
            public: RsaPublicKey::from(&private),
            private: Some(private),
        })
    }

    /// 仅持有公钥，只能加密。
    pub fn from_public(public: RsaPublicKey) -> Self {
        Self {
            public,
            private: None,
        }
    }

    pub fn from_private(private: RsaPrivateKey) -> Self {
        Self {
            public: RsaPublicKey::from(&private),
            private: Some(private),
        }
    }

    /// 解析 PEM 公钥，支持 `PUBLIC KEY` (SPKI) 与 `RSA PUBLIC KEY` (PKCS#1)。
    pub fn from_public_pem(pem: &str) -> Result<Self> {
        RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map(Self::from_public)
            .map_err(|err| PvdError::KeyFormat(err.to_string()))
    }

    /// 解析 PEM 私钥，支持 `PRIVATE KEY` (PKCS#8) 与 `RSA PRIVATE KEY` (PKCS#1)。
    pub fn from_private_pem(pem: &str) -> Result<Self> {
        RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map(Self::from_private)
            .map_err(|err| PvdError::KeyFormat(err.to_string()))
    }

    pub fn load_public(path: &Path) -> Result<Self> {
        Self::from_public_pem(&fs::read_to_string(path)?)
    }

    pub fn load_private(path: &Path) -> Result<Self> {
        let mut pem = fs::read_to_string(path)?;
        let keys = Self::from_private_pem(&pem);
        pem.zeroize();
        keys
    }

    pub fn public_pem(&self) -> Result<String> {
        self.public
            .to_public_key_pem(LineEnding::LF)
            .map_err(|err| PvdError::KeyFormat(err.to_string()))
    }

    /// 以 PKCS#8 PEM 导出私钥。只持有公钥时返回 `MissingKey`。
    pub fn private_pem(&self) -> Result<String> {
        let private = self.private.as_ref().ok_or(PvdError::MissingKey("private"))?;
        let pem = private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|err| PvdError::KeyFormat(err.to_string()))?;
        Ok(pem.to_string())
    }
}

impl std::fmt::Debug for RsaKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeys")
            .field("has_private", &self.private.is_some())
            .finish_non_exhaustive()
    }
}

impl PayloadCipher for RsaKeys {
    fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>> {
        let sealed = self
            .public
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plain)?;
        Ok(STANDARD.encode(sealed).into_bytes())
    }

    fn decrypt(&self, armored: &[u8]) -> Result<Vec<u8>> {
        let private = self.private.as_ref().ok_or(PvdError::MissingKey("private"))?;
        let sealed = STANDARD.decode(armored)?;
        Ok(private.decrypt(Oaep::new::<Sha256>(), &sealed)?)
    }
}
