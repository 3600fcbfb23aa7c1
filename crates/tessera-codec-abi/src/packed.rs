//! 紧凑（packed）模式编解码。
//!
//! ## 模块目的（Why）
//! - 链上入口（如资产入口合约）以最小宽度直拼的形式下发负载，
//!   无填充、无偏移、无长度前缀，本模块提供与之逐位兼容的双向转换。
//!
//! ## 契约说明（What）
//! - 定宽类型严格占用声明宽度：`uintN`/`intN` 为 N/8 字节，`address` 20 字节，
//!   `bool` 1 字节，`bytesN` 为 N 字节；
//! - 无界的 `bytes`/`string` 不带长度前缀：编码时原样拼接，
//!   解码时仅允许出现在最后一位并吞掉剩余字节；
//!   不在末位即返回 [`CodecError::AmbiguousPacked`]，从不按猜测重解释；
//! - 数组与元组在紧凑布局下无法无歧义还原，一律
//!   [`CodecError::UnsupportedPacked`]。
//!
//! ## 风险提示（Trade-offs）
//! - “无界字段必须在末位”本质上是调用方的布局义务，编解码器只负责把
//!   违例显式暴露出来，而不是提供额外的定界协商。

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::CodecError;
use crate::types::AbiType;
use crate::value::{Value, Word};

/// 将一组值按类型列表做紧凑编码。
pub fn encode_packed_values(types: &[AbiType], values: &[Value]) -> Result<Vec<u8>, CodecError> {
    if types.len() != values.len() {
        return Err(CodecError::ArityMismatch {
            expected: types.len(),
            found: values.len(),
        });
    }
    let refs: Vec<&Value> = values.iter().collect();
    encode_packed(types, &refs)
}

pub(crate) fn encode_packed(types: &[AbiType], values: &[&Value]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    for (ty, value) in types.iter().zip(values.iter()) {
        encode_packed_one(ty, value, &mut out)?;
    }
    Ok(out)
}

fn encode_packed_one(ty: &AbiType, value: &Value, out: &mut Vec<u8>) -> Result<(), CodecError> {
    match ty {
        AbiType::Uint(bits) => {
            let word = value.as_uint()?;
            if !word.fits_uint(*bits) {
                return Err(CodecError::ValueOutOfRange {
                    type_name: ty.to_string(),
                });
            }
            out.extend_from_slice(&word.as_bytes()[32 - bits / 8..]);
        }
        AbiType::Int(bits) => {
            let word = match value {
                Value::Int(word) => *word,
                other => {
                    return Err(CodecError::TypeMismatch {
                        expected: ty.to_string(),
                        found: other.kind_name(),
                    });
                }
            };
            if !word.fits_int(*bits) {
                return Err(CodecError::ValueOutOfRange {
                    type_name: ty.to_string(),
                });
            }
            out.extend_from_slice(&word.as_bytes()[32 - bits / 8..]);
        }
        AbiType::Address => out.extend_from_slice(value.as_address()?),
        AbiType::Bool => out.push(u8::from(value.as_bool()?)),
        AbiType::FixedBytes(len) => {
            let bytes = value.as_bytes()?;
            if bytes.len() != *len {
                return Err(CodecError::TypeMismatch {
                    expected: ty.to_string(),
                    found: value.kind_name(),
                });
            }
            out.extend_from_slice(bytes);
        }
        AbiType::Bytes => out.extend_from_slice(value.as_bytes()?),
        AbiType::String => out.extend_from_slice(value.as_str()?.as_bytes()),
        AbiType::Array(_) | AbiType::Tuple(_) => {
            return Err(CodecError::UnsupportedPacked {
                type_name: ty.to_string(),
            });
        }
    }
    Ok(())
}

/// 将紧凑字节流按类型列表解码为值序列。
pub fn decode_packed_values(types: &[AbiType], data: &[u8]) -> Result<Vec<Value>, CodecError> {
    let mut values = Vec::with_capacity(types.len());
    let mut cursor = 0usize;
    for (position, ty) in types.iter().enumerate() {
        let value = match ty {
            AbiType::Bytes | AbiType::String => {
                if position + 1 != types.len() {
                    return Err(CodecError::AmbiguousPacked { position });
                }
                let rest = &data[cursor..];
                cursor = data.len();
                if matches!(ty, AbiType::Bytes) {
                    Value::Bytes(rest.to_vec())
                } else {
                    let text = String::from_utf8(rest.to_vec())
                        .map_err(|_| CodecError::InvalidUtf8)?;
                    Value::String(text)
                }
            }
            AbiType::Uint(bits) => {
                let raw = take(data, cursor, bits / 8)?;
                cursor += bits / 8;
                let mut bytes = [0u8; 32];
                bytes[32 - raw.len()..].copy_from_slice(raw);
                Value::Uint(Word::from_be_bytes(bytes))
            }
            AbiType::Int(bits) => {
                let raw = take(data, cursor, bits / 8)?;
                cursor += bits / 8;
                let fill = if raw[0] & 0x80 != 0 { 0xff } else { 0x00 };
                let mut bytes = [fill; 32];
                bytes[32 - raw.len()..].copy_from_slice(raw);
                Value::Int(Word::from_be_bytes(bytes))
            }
            AbiType::Address => {
                let raw = take(data, cursor, 20)?;
                cursor += 20;
                let mut address = [0u8; 20];
                address.copy_from_slice(raw);
                Value::Address(address)
            }
            AbiType::Bool => {
                let raw = take(data, cursor, 1)?;
                cursor += 1;
                match raw[0] {
                    0 => Value::Bool(false),
                    1 => Value::Bool(true),
                    _ => return Err(CodecError::InvalidBool),
                }
            }
            AbiType::FixedBytes(len) => {
                let raw = take(data, cursor, *len)?;
                cursor += len;
                Value::FixedBytes(raw.to_vec())
            }
            AbiType::Array(_) | AbiType::Tuple(_) => {
                return Err(CodecError::UnsupportedPacked {
                    type_name: ty.to_string(),
                });
            }
        };
        values.push(value);
    }
    if cursor != data.len() {
        return Err(CodecError::TrailingBytes {
            remaining: data.len() - cursor,
        });
    }
    Ok(values)
}

fn take(data: &[u8], at: usize, len: usize) -> Result<&[u8], CodecError> {
    data.get(at..at + len).ok_or(CodecError::Truncated {
        expected: len,
        available: data.len().saturating_sub(at),
    })
}
