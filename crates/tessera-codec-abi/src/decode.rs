//! 标准模式解码器与记录绑定。
//!
//! ## 模块目的（Why）
//! - 镜像编码器：读头区、跟随偏移进尾区，恢复与输入类型列表一一对应的值序列；
//! - 解码产物可进一步绑定到模式，得到按字段名访问的 [`Record`] 实例，
//!   嵌套模型与模型列表在绑定阶段递归还原。
//!
//! ## 契约说明（What）
//! - 解码从严：长度不足、偏移越界、填充位非零、布尔槽位非 0/1、UTF-8 非法
//!   均返回对应的 [`CodecError`]，从不静默纠偏；
//! - 偏移与长度一律相对所在帧解释，嵌套帧自带坐标系。

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::encode::EncodingMode;
use crate::error::CodecError;
use crate::packed;
use crate::types::{AbiType, FieldType, Schema};
use crate::value::{Record, Value, Word};

/// 将字节流按类型列表解码为值序列（标准模式）。
pub fn decode_values(types: &[AbiType], data: &[u8]) -> Result<Vec<Value>, CodecError> {
    decode_frame(types.iter(), data)
}

/// 将字节流按模式解码并绑定为命名记录。
pub fn decode_record(
    data: &[u8],
    schema: &Schema,
    mode: EncodingMode,
) -> Result<Record, CodecError> {
    let types = schema.resolve()?;
    let values = match mode {
        EncodingMode::Standard => decode_values(&types, data)?,
        EncodingMode::Packed => packed::decode_packed_values(&types, data)?,
    };
    bind_record(schema, values)
}

/// 解码一帧：按类型顺序走头区，动态类型经偏移跳转到尾区。
fn decode_frame<'t>(
    types: impl Iterator<Item = &'t AbiType>,
    frame: &[u8],
) -> Result<Vec<Value>, CodecError> {
    let mut values = Vec::new();
    let mut cursor = 0usize;
    for ty in types {
        if ty.is_dynamic() {
            let offset = read_length(frame, cursor)?;
            if offset > frame.len() {
                return Err(CodecError::OffsetOutOfBounds {
                    offset,
                    length: frame.len(),
                });
            }
            values.push(decode_value(ty, frame, offset)?);
            cursor += 32;
        } else {
            values.push(decode_value(ty, frame, cursor)?);
            cursor += ty.static_size();
        }
    }
    Ok(values)
}

/// 在帧内 `at` 处解码一个值；动态类型的 `at` 已由调用方从偏移字解析。
fn decode_value(ty: &AbiType, frame: &[u8], at: usize) -> Result<Value, CodecError> {
    match ty {
        AbiType::Uint(bits) => {
            let word = read_word(frame, at)?;
            if !word.fits_uint(*bits) {
                return Err(CodecError::InvalidPadding {
                    type_name: ty.to_string(),
                });
            }
            Ok(Value::Uint(word))
        }
        AbiType::Int(bits) => {
            let word = read_word(frame, at)?;
            if !word.fits_int(*bits) {
                return Err(CodecError::InvalidPadding {
                    type_name: ty.to_string(),
                });
            }
            Ok(Value::Int(word))
        }
        AbiType::Address => {
            let slot = take(frame, at, 32)?;
            if slot[..12].iter().any(|byte| *byte != 0) {
                return Err(CodecError::InvalidPadding {
                    type_name: ty.to_string(),
                });
            }
            let mut address = [0u8; 20];
            address.copy_from_slice(&slot[12..]);
            Ok(Value::Address(address))
        }
        AbiType::Bool => {
            let slot = take(frame, at, 32)?;
            if slot[..31].iter().any(|byte| *byte != 0) {
                return Err(CodecError::InvalidPadding {
                    type_name: ty.to_string(),
                });
            }
            match slot[31] {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                _ => Err(CodecError::InvalidBool),
            }
        }
        AbiType::FixedBytes(len) => {
            let slot = take(frame, at, 32)?;
            if slot[*len..].iter().any(|byte| *byte != 0) {
                return Err(CodecError::InvalidPadding {
                    type_name: ty.to_string(),
                });
            }
            Ok(Value::FixedBytes(slot[..*len].to_vec()))
        }
        AbiType::Bytes => {
            let len = read_length(frame, at)?;
            let data = take(frame, at + 32, len)?;
            Ok(Value::Bytes(data.to_vec()))
        }
        AbiType::String => {
            let len = read_length(frame, at)?;
            let data = take(frame, at + 32, len)?;
            let text = String::from_utf8(data.to_vec()).map_err(|_| CodecError::InvalidUtf8)?;
            Ok(Value::String(text))
        }
        AbiType::Array(element) => {
            let count = read_length(frame, at)?;
            let sub = frame.get(at + 32..).unwrap_or(&[]);
            // 每个元素至少占 32 字节头宽，先行校验防御恶意个数字。
            if count > sub.len() / 32 {
                return Err(CodecError::Truncated {
                    expected: count.saturating_mul(32),
                    available: sub.len(),
                });
            }
            let items = decode_frame(core::iter::repeat_n(element.as_ref(), count), sub)?;
            Ok(Value::Array(items))
        }
        AbiType::Tuple(children) => {
            let sub = frame.get(at..).ok_or(CodecError::OffsetOutOfBounds {
                offset: at,
                length: frame.len(),
            })?;
            Ok(Value::Tuple(decode_frame(children.iter(), sub)?))
        }
    }
}

/// 读取帧内 `at` 处的长度或偏移字，并收窄为平台可寻址整数。
fn read_length(frame: &[u8], at: usize) -> Result<usize, CodecError> {
    let word = read_word(frame, at)?;
    let wide = word.to_u64().map_err(|_| CodecError::LengthOverflow)?;
    usize::try_from(wide).map_err(|_| CodecError::LengthOverflow)
}

fn read_word(frame: &[u8], at: usize) -> Result<Word, CodecError> {
    let slot = take(frame, at, 32)?;
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(slot);
    Ok(Word::from_be_bytes(bytes))
}

fn take(frame: &[u8], at: usize, len: usize) -> Result<&[u8], CodecError> {
    let end = at.checked_add(len).ok_or(CodecError::LengthOverflow)?;
    frame.get(at..end).ok_or(CodecError::Truncated {
        expected: len,
        available: frame.len().saturating_sub(at),
    })
}

/// 将解码出的值序列绑定到模式，递归还原嵌套记录。
fn bind_record(schema: &Schema, values: Vec<Value>) -> Result<Record, CodecError> {
    if values.len() != schema.fields().len() {
        return Err(CodecError::ArityMismatch {
            expected: schema.fields().len(),
            found: values.len(),
        });
    }
    let mut entries = Vec::with_capacity(values.len());
    for (field, value) in schema.fields().iter().zip(values) {
        entries.push((field.name_cow(), bind_field(field.ty(), value)?));
    }
    Ok(Record::new(entries))
}

fn bind_field(ty: &FieldType, value: Value) -> Result<Value, CodecError> {
    match ty {
        FieldType::Record(schema) => match value {
            Value::Tuple(items) => Ok(Value::Record(bind_record(schema, items)?)),
            other => Err(CodecError::TypeMismatch {
                expected: "tuple".into(),
                found: other.kind_name(),
            }),
        },
        FieldType::List(inner) => match value {
            Value::Array(items) => {
                let mut bound = Vec::with_capacity(items.len());
                for item in items {
                    bound.push(bind_field(inner, item)?);
                }
                Ok(Value::Array(bound))
            }
            other => Err(CodecError::TypeMismatch {
                expected: "array".into(),
                found: other.kind_name(),
            }),
        },
        _ => Ok(value),
    }
}
