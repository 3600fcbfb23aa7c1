//! 标准模式编码器：头区/尾区布局。
//!
//! ## 模块目的（Why）
//! - 产出与 Ethereum Contract ABI 规范逐位兼容的字节流，
//!   编码结果可直接被链上合约或任何 ABI 感知系统消费。
//!
//! ## 实现策略（How）
//! - 静态尺寸值按声明顺序写入头区，每个标量槽位补齐到 32 字节；
//! - 动态尺寸值（`bytes`/`string`/数组/含动态成员的元组）写入尾区，
//!   头区只存一个 32 字节大端偏移，偏移相对于所在帧的起点；
//! - 数组先写元素个数字，随后的元素序列按元组规则自成一帧，
//!   元素偏移相对于个数字之后的位置；元组递归复用同一帧算法。
//!
//! ## 契约说明（What）
//! - 输入值必须与类型逐位对应：类别不符返回 [`CodecError::TypeMismatch`]，
//!   数值超出声明位宽返回 [`CodecError::ValueOutOfRange`]；
//! - 编码从不静默收窄或重排，失败即上抛。

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::error::CodecError;
use crate::packed;
use crate::types::{AbiType, Schema};
use crate::value::{Record, Value, Word};

/// 编码布局模式。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodingMode {
    /// 标准头尾布局，32 字节槽位加偏移。
    Standard,
    /// 紧凑布局，最小宽度直拼，无填充无偏移。
    Packed,
}

/// 将一组值按类型列表编码为字节流（标准模式）。
pub fn encode_values(types: &[AbiType], values: &[Value]) -> Result<Vec<u8>, CodecError> {
    if types.len() != values.len() {
        return Err(CodecError::ArityMismatch {
            expected: types.len(),
            found: values.len(),
        });
    }
    let pairs: Vec<(&AbiType, &Value)> = types.iter().zip(values.iter()).collect();
    encode_frame(&pairs)
}

/// 将记录实例按模式编码。
///
/// 记录的字段名与顺序必须与模式声明一致，这是对“实例绑定于模式”的装配期约定
/// 的运行期复核；不一致返回 [`CodecError::MissingField`]。
pub fn encode_record(
    schema: &Schema,
    record: &Record,
    mode: EncodingMode,
) -> Result<Vec<u8>, CodecError> {
    let types = schema.resolve()?;
    if record.len() != schema.fields().len() {
        return Err(CodecError::ArityMismatch {
            expected: schema.fields().len(),
            found: record.len(),
        });
    }
    for (field, (name, _)) in schema.fields().iter().zip(record.entries()) {
        if field.name() != name {
            return Err(CodecError::MissingField {
                name: field.name().to_string(),
            });
        }
    }
    let values: Vec<&Value> = record.values().collect();
    match mode {
        EncodingMode::Standard => {
            let pairs: Vec<(&AbiType, &Value)> =
                types.iter().zip(values.iter().copied()).collect();
            encode_frame(&pairs)
        }
        EncodingMode::Packed => packed::encode_packed(&types, &values),
    }
}

/// 编码一帧：头区放静态值与动态偏移，尾区按出现顺序追加动态编码。
pub(crate) fn encode_frame(items: &[(&AbiType, &Value)]) -> Result<Vec<u8>, CodecError> {
    let head_len: usize = items.iter().map(|(ty, _)| ty.head_width()).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();
    for (ty, value) in items {
        if ty.is_dynamic() {
            let offset = head_len + tail.len();
            head.extend_from_slice(Word::from_u64(offset as u64).as_bytes());
            tail.extend_from_slice(&encode_value(ty, value)?);
        } else {
            head.extend_from_slice(&encode_value(ty, value)?);
        }
    }
    head.extend_from_slice(&tail);
    Ok(head)
}

/// 编码单个值：静态类型产出其完整槽位，动态类型产出尾区形态。
fn encode_value(ty: &AbiType, value: &Value) -> Result<Vec<u8>, CodecError> {
    match ty {
        AbiType::Uint(bits) => {
            let word = value.as_uint()?;
            if !word.fits_uint(*bits) {
                return Err(CodecError::ValueOutOfRange {
                    type_name: ty.to_string(),
                });
            }
            Ok(word.as_bytes().to_vec())
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
            Ok(word.as_bytes().to_vec())
        }
        AbiType::Address => {
            let address = value.as_address()?;
            let mut slot = [0u8; 32];
            slot[12..].copy_from_slice(address);
            Ok(slot.to_vec())
        }
        AbiType::Bool => {
            let mut slot = [0u8; 32];
            slot[31] = u8::from(value.as_bool()?);
            Ok(slot.to_vec())
        }
        AbiType::FixedBytes(len) => {
            let bytes = value.as_bytes()?;
            if bytes.len() != *len {
                return Err(CodecError::TypeMismatch {
                    expected: ty.to_string(),
                    found: value.kind_name(),
                });
            }
            let mut slot = [0u8; 32];
            slot[..bytes.len()].copy_from_slice(bytes);
            Ok(slot.to_vec())
        }
        AbiType::Bytes => {
            let bytes = value.as_bytes()?;
            Ok(length_prefixed(bytes))
        }
        AbiType::String => {
            let text = value.as_str()?;
            Ok(length_prefixed(text.as_bytes()))
        }
        AbiType::Array(element) => {
            let items = value.as_array()?;
            let pairs: Vec<(&AbiType, &Value)> =
                items.iter().map(|item| (element.as_ref(), item)).collect();
            let mut out = Word::from_u64(items.len() as u64).as_bytes().to_vec();
            out.extend_from_slice(&encode_frame(&pairs)?);
            Ok(out)
        }
        AbiType::Tuple(children) => {
            let values = value.tuple_values()?;
            if children.len() != values.len() {
                return Err(CodecError::ArityMismatch {
                    expected: children.len(),
                    found: values.len(),
                });
            }
            let pairs: Vec<(&AbiType, &Value)> =
                children.iter().zip(values.into_iter()).collect();
            encode_frame(&pairs)
        }
    }
}

/// 长度字加右侧零填充的数据区。
fn length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let mut out = Word::from_u64(bytes.len() as u64).as_bytes().to_vec();
    out.extend_from_slice(bytes);
    let rem = bytes.len() % 32;
    if rem != 0 {
        out.resize(out.len() + (32 - rem), 0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn single_uint_fills_one_slot() {
        let encoded = encode_values(&[AbiType::Uint(256)], &[Value::Uint(Word::from_u64(0x2a))])
            .expect("标量编码不应失败");
        let mut expected = [0u8; 32];
        expected[31] = 0x2a;
        assert_eq!(encoded, expected);
    }

    #[test]
    fn string_goes_through_the_tail() {
        let encoded = encode_values(&[AbiType::String], &[Value::String("hello".into())])
            .expect("字符串编码不应失败");
        assert_eq!(encoded.len(), 96);
        // 头区：偏移 0x20。
        assert_eq!(encoded[31], 0x20);
        // 尾区：长度 5，随后数据右侧补零。
        assert_eq!(encoded[63], 5);
        assert_eq!(&encoded[64..69], b"hello");
        assert!(encoded[69..].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn dynamic_array_prefixes_element_count() {
        let encoded = encode_values(
            &[AbiType::Array(Box::new(AbiType::Uint(256)))],
            &[Value::Array(vec![
                Value::Uint(Word::from_u64(1)),
                Value::Uint(Word::from_u64(2)),
            ])],
        )
        .expect("数组编码不应失败");
        assert_eq!(encoded.len(), 128);
        assert_eq!(encoded[31], 0x20); // 指向尾区的偏移
        assert_eq!(encoded[63], 2); // 元素个数
        assert_eq!(encoded[95], 1);
        assert_eq!(encoded[127], 2);
    }

    #[test]
    fn static_head_precedes_dynamic_offset() {
        // (uint256, string)：头区为值槽加偏移 0x40，尾区承载字符串。
        let encoded = encode_values(
            &[AbiType::Uint(256), AbiType::String],
            &[
                Value::Uint(Word::from_u64(7)),
                Value::String("ok".into()),
            ],
        )
        .expect("混合编码不应失败");
        assert_eq!(encoded.len(), 128);
        assert_eq!(encoded[31], 7);
        assert_eq!(encoded[63], 0x40);
        assert_eq!(encoded[95], 2);
        assert_eq!(&encoded[96..98], b"ok");
    }

    #[test]
    fn address_is_right_aligned() {
        let encoded = encode_values(
            &[AbiType::Address],
            &[Value::Address([0x11; 20])],
        )
        .expect("地址编码不应失败");
        assert!(encoded[..12].iter().all(|byte| *byte == 0));
        assert!(encoded[12..].iter().all(|byte| *byte == 0x11));
    }

    #[test]
    fn value_wider_than_declared_bits_is_rejected() {
        let wide = Value::Uint(Word::from_u64(0x1_00));
        assert!(matches!(
            encode_values(&[AbiType::Uint(8)], &[wide]),
            Err(CodecError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn fixed_bytes_length_must_match_declaration() {
        assert!(matches!(
            encode_values(
                &[AbiType::FixedBytes(4)],
                &[Value::FixedBytes(vec![1, 2, 3])]
            ),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        assert!(matches!(
            encode_values(&[AbiType::Bool], &[]),
            Err(CodecError::ArityMismatch { .. })
        ));
    }
}
