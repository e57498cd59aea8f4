//! # 位序列封装模块
//!
//! 将负载字节按高位在前展开为位序列并追加结束标记，以及逆向的解包。
//!
//! 结束标记没有转义：负载中出现的 `0xFF` 字节会被当作消息结束。
//! 需要隐藏任意二进制数据时，应先用 [`crate::cipher::Passphrase`] 之类会做文本编码的方式处理。

use crate::constants::{BITS_PER_BYTE, SENTINEL};
use crate::error::{PvdError, Result};

/// 负载长度为 `payload_len` 字节时，封装后的位数（含结束标记）。
pub fn packed_len(payload_len: usize) -> usize {
    (payload_len + 1) * BITS_PER_BYTE
}

/// 将负载展开为位序列，每个字节高位在前，末尾追加 8 位结束标记。
pub fn pack(payload: &[u8]) -> Vec<bool> {
    payload
        .iter()
        .chain(std::iter::once(&SENTINEL))
        .flat_map(|&byte| (0..BITS_PER_BYTE).rev().map(move |shift| (byte >> shift) & 1 == 1))
        .collect()
}

/// 将位序列还原为负载。遇到结束标记即停止，其后的位全部丢弃。
pub fn unpack<I>(bits: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = bool>,
{
    let mut unpacker = Unpacker::default();
    for bit in bits {
        if unpacker.push(bit) {
            break;
        }
    }
    unpacker.finish()
}

/// 逐位累积的解包器，供提取器在找到结束标记后立即停止扫描。
#[derive(Debug, Default)]
pub struct Unpacker {
    payload: Vec<u8>,
    current: u8,
    filled: usize,
    done: bool,
}

impl Unpacker {
    /// 追加一位。返回 `true` 表示已经遇到结束标记，后续的位将被忽略。
    pub fn push(&mut self, bit: bool) -> bool {
        if self.done {
            return true;
        }

        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;

        if self.filled == BITS_PER_BYTE {
            if self.current == SENTINEL {
                self.done = true;
            } else {
                self.payload.push(self.current);
            }
            self.current = 0;
            self.filled = 0;
        }

        self.done
    }

    /// 追加 `value` 的低 `width` 位，高位在前。
    pub fn push_bits(&mut self, value: u8, width: u8) -> bool {
        for shift in (0..width).rev() {
            if self.push((value >> shift) & 1 == 1) {
                return true;
            }
        }
        self.done
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// 取出负载。没有遇到结束标记时返回 `TerminatorNotFound`。
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.done {
            Ok(self.payload)
        } else {
            Err(PvdError::TerminatorNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(text: &str) -> Vec<bool> {
        text.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn pack_is_msb_first_with_sentinel() {
        assert_eq!(pack(&[0b1010_0001]), bits("1010000111111111"));
        assert_eq!(packed_len(1), 16);
    }

    #[test]
    fn empty_payload_packs_to_sentinel_only() {
        assert_eq!(pack(&[]), vec![true; 8]);
        assert_eq!(unpack(pack(&[])).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn unpack_discards_bits_after_sentinel() {
        let mut stream = pack(b"Hi");
        stream.extend(bits("0101010100"));
        assert_eq!(unpack(stream).unwrap(), b"Hi");
    }

    #[test]
    fn unpack_without_sentinel_fails() {
        let err = unpack(bits("0100100001101001")).unwrap_err();
        assert!(matches!(err, PvdError::TerminatorNotFound));
    }

    #[test]
    fn incomplete_trailing_chunk_is_not_a_byte() {
        let err = unpack(bits("01001000111")).unwrap_err();
        assert!(matches!(err, PvdError::TerminatorNotFound));
    }

    #[test]
    fn payload_byte_0xff_truncates_the_message() {
        assert_eq!(unpack(pack(&[0x41, 0xFF, 0x42])).unwrap(), vec![0x41]);
    }

    #[test]
    fn push_bits_spans_byte_boundaries() {
        let mut unpacker = Unpacker::default();
        // 0x48 = 010 010 00，再接 3 组 111 后结束标记跨越了分组边界。
        assert!(!unpacker.push_bits(0b010, 3));
        assert!(!unpacker.push_bits(0b010, 3));
        assert!(!unpacker.push_bits(0b0011, 4));
        assert!(!unpacker.push_bits(0b111, 3));
        assert!(unpacker.push_bits(0b111, 3));
        assert!(unpacker.is_done());
        assert_eq!(unpacker.finish().unwrap(), vec![0x48]);
    }
}
