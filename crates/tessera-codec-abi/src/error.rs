//! 错误类型模块。
//!
//! ## 模块目的（Why）
//! - 将“模式定义期失败”与“编解码期失败”分为两个枚举，调用方可按阶段采取不同策略：
//!   [`SchemaError`] 在应用启动期即应暴露并终止装配，[`CodecError`] 则逐请求上抛。
//!
//! ## 使用契约（What）
//! - 模式校验相关 API 返回 [`SchemaError`]；编码、解码与取值 API 返回 [`CodecError`]；
//! - 两个枚举均不借用输入缓冲，可安全跨层携带与记录日志。

use alloc::string::String;
use core::fmt;

/// 模式定义期的失败枚举。
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// 字段既无显式类型标签，原生形状也不在默认表中。
    MissingAbiType {
        /// 出错字段名。
        field: String,
    },
    /// 类型标签文本不在 ABI 基元词汇表内。
    UnknownTag {
        /// 原始标签文本。
        tag: String,
    },
    /// 标签位宽不在标准集合内（`uintN`/`intN` 要求 8 的倍数且不超过 256，
    /// `bytesN` 要求 1 到 32）。
    InvalidWidth {
        /// 规范化后的标签文本。
        tag: String,
    },
    /// 字段名在同一模式内重复。
    DuplicateField {
        /// 重复的字段名。
        name: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::MissingAbiType { field } => {
                write!(f, "field `{field}` has no resolvable ABI type")
            }
            SchemaError::UnknownTag { tag } => write!(f, "unknown ABI type tag `{tag}`"),
            SchemaError::InvalidWidth { tag } => {
                write!(f, "ABI type tag `{tag}` has a non-standard width")
            }
            SchemaError::DuplicateField { name } => {
                write!(f, "duplicate field name `{name}` in schema")
            }
        }
    }
}

impl core::error::Error for SchemaError {}

/// 编解码期的失败枚举。
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    /// 缓冲剩余字节不足。
    Truncated {
        /// 本次读取需要的字节数。
        expected: usize,
        /// 实际剩余的字节数。
        available: usize,
    },
    /// 偏移指向缓冲之外。
    OffsetOutOfBounds {
        /// 读到的偏移。
        offset: usize,
        /// 所在帧的长度。
        length: usize,
    },
    /// 长度或偏移字超出平台可寻址范围。
    LengthOverflow,
    /// 静态槽位的填充字节不为零（或不符合符号扩展）。
    InvalidPadding {
        /// 槽位对应的类型名。
        type_name: String,
    },
    /// 布尔槽位不是 0 或 1。
    InvalidBool,
    /// 字节序列不是合法 UTF-8。
    InvalidUtf8,
    /// 数值超出目标类型可表示的范围。
    ValueOutOfRange {
        /// 目标类型名。
        type_name: String,
    },
    /// 取值或编码时的类型不匹配。
    TypeMismatch {
        /// 期望的类型描述。
        expected: String,
        /// 实际的值类别。
        found: &'static str,
    },
    /// 记录中缺少目标字段。
    MissingField {
        /// 字段名。
        name: String,
    },
    /// 类型数与值数不一致。
    ArityMismatch {
        /// 期望的个数。
        expected: usize,
        /// 实际的个数。
        found: usize,
    },
    /// 类型在 packed 模式下不受支持（数组与元组无法无歧义地紧凑布局）。
    UnsupportedPacked {
        /// 类型名。
        type_name: String,
    },
    /// 不定长字段不在 packed 布局的最后一位，解码存在歧义。
    AmbiguousPacked {
        /// 不定长字段所在的位置（从 0 起）。
        position: usize,
    },
    /// packed 解码结束后仍有剩余字节。
    TrailingBytes {
        /// 剩余字节数。
        remaining: usize,
    },
    /// 模式解析失败（由编解码入口转发）。
    Schema(SchemaError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Truncated {
                expected,
                available,
            } => write!(
                f,
                "truncated data: needed {expected} bytes, {available} available"
            ),
            CodecError::OffsetOutOfBounds { offset, length } => {
                write!(f, "offset {offset} points outside a frame of {length} bytes")
            }
            CodecError::LengthOverflow => f.write_str("length word exceeds addressable range"),
            CodecError::InvalidPadding { type_name } => {
                write!(f, "non-canonical padding in a `{type_name}` slot")
            }
            CodecError::InvalidBool => f.write_str("boolean slot holds a value other than 0 or 1"),
            CodecError::InvalidUtf8 => f.write_str("string payload is not valid UTF-8"),
            CodecError::ValueOutOfRange { type_name } => {
                write!(f, "value does not fit into `{type_name}`")
            }
            CodecError::TypeMismatch { expected, found } => {
                write!(f, "expected `{expected}`, found {found}")
            }
            CodecError::MissingField { name } => write!(f, "record has no field `{name}`"),
            CodecError::ArityMismatch { expected, found } => {
                write!(f, "expected {expected} values, found {found}")
            }
            CodecError::UnsupportedPacked { type_name } => {
                write!(f, "`{type_name}` is not supported in packed mode")
            }
            CodecError::AmbiguousPacked { position } => write!(
                f,
                "unbounded field at position {position} must be last in packed mode"
            ),
            CodecError::TrailingBytes { remaining } => {
                write!(f, "{remaining} trailing bytes after packed decoding")
            }
            CodecError::Schema(err) => write!(f, "schema resolution failed: {err}"),
        }
    }
}

impl core::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            CodecError::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for CodecError {
    fn from(err: SchemaError) -> Self {
        CodecError::Schema(err)
    }
}
