//! 运行时值模型：256 位字、值枚举与命名记录。
//!
//! ## 模块目的（Why）
//! - 编解码器内部以完整的 32 字节大端字承载整数，保证与链上表示无损互转；
//! - 应用侧通过带范围检查的视图（`u64`/`u128`/`i128`）取用数值，
//!   超界即返回 [`CodecError::ValueOutOfRange`]，对应“无法收窄到目标形状”的失败语义。
//!
//! ## 使用契约（What）
//! - [`Record`] 是绑定到模式的有序命名实例：解码产物自构造起不可变，
//!   编码输入在调用前整体构造完毕；
//! - 各 `as_*` 访问器在类别不符时返回 [`CodecError::TypeMismatch`]。

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::error::CodecError;

/// 256 位大端字，整数槽位的规范载体。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Word([u8; 32]);

impl Word {
    /// 全零字。
    pub const ZERO: Word = Word([0u8; 32]);

    /// 由 32 字节大端序列构造。
    pub const fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Word(bytes)
    }

    /// 大端字节视图。
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// 由无符号 64 位整数构造（高位补零）。
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Word(bytes)
    }

    /// 由无符号 128 位整数构造。
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Word(bytes)
    }

    /// 由有符号 128 位整数构造，负数按二补码符号扩展。
    pub fn from_i128(value: i128) -> Self {
        let fill = if value < 0 { 0xff } else { 0x00 };
        let mut bytes = [fill; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Word(bytes)
    }

    /// 收窄为 `u64`，高位非零时报错。
    pub fn to_u64(&self) -> Result<u64, CodecError> {
        if self.0[..24].iter().any(|byte| *byte != 0) {
            return Err(CodecError::ValueOutOfRange {
                type_name: "u64".into(),
            });
        }
        let mut tail = [0u8; 8];
        tail.copy_from_slice(&self.0[24..]);
        Ok(u64::from_be_bytes(tail))
    }

    /// 收窄为 `u128`，高位非零时报错。
    pub fn to_u128(&self) -> Result<u128, CodecError> {
        if self.0[..16].iter().any(|byte| *byte != 0) {
            return Err(CodecError::ValueOutOfRange {
                type_name: "u128".into(),
            });
        }
        let mut tail = [0u8; 16];
        tail.copy_from_slice(&self.0[16..]);
        Ok(u128::from_be_bytes(tail))
    }

    /// 收窄为 `i128`，高 16 字节必须是低半部的符号扩展。
    pub fn to_i128(&self) -> Result<i128, CodecError> {
        let fill = if self.0[16] & 0x80 != 0 { 0xff } else { 0x00 };
        if self.0[..16].iter().any(|byte| *byte != fill) {
            return Err(CodecError::ValueOutOfRange {
                type_name: "i128".into(),
            });
        }
        let mut tail = [0u8; 16];
        tail.copy_from_slice(&self.0[16..]);
        Ok(i128::from_be_bytes(tail))
    }

    /// 是否为零。
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }

    /// 作为无符号整数是否能放进 `bits` 位（声明位宽之外的高位全零）。
    ///
    /// 调用方保证 `bits` 为 8 的倍数且不超过 256（模式校验已约束）。
    pub fn fits_uint(&self, bits: usize) -> bool {
        let lead = 32 - bits / 8;
        self.0[..lead].iter().all(|byte| *byte == 0)
    }

    /// 作为二补码整数是否能放进 `bits` 位（高位须为低位的符号扩展）。
    pub fn fits_int(&self, bits: usize) -> bool {
        let lead = 32 - bits / 8;
        if lead == 0 {
            return true;
        }
        let fill = if self.0[lead] & 0x80 != 0 { 0xff } else { 0x00 };
        self.0[..lead].iter().all(|byte| *byte == fill)
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Word::from_u64(value)
    }
}

impl From<u128> for Word {
    fn from(value: u128) -> Self {
        Word::from_u128(value)
    }
}

impl fmt::Display for Word {
    /// 渲染为 `0x` 前缀的 64 位十六进制全宽形式。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// 运行时值，与 [`crate::AbiType`] 一一对应。
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// 无符号整数。
    Uint(Word),
    /// 有符号整数（二补码字）。
    Int(Word),
    /// 20 字节地址。
    Address([u8; 20]),
    /// 布尔。
    Bool(bool),
    /// 定长字节串。
    FixedBytes(Vec<u8>),
    /// 变长字节串。
    Bytes(Vec<u8>),
    /// UTF-8 字符串。
    String(String),
    /// 动态数组。
    Array(Vec<Value>),
    /// 无名元组（低层解码产物）。
    Tuple(Vec<Value>),
    /// 绑定到模式的命名记录。
    Record(Record),
}

impl Value {
    /// 值类别名，用于错误报告。
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Address(_) => "address",
            Value::Bool(_) => "bool",
            Value::FixedBytes(_) => "fixed bytes",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
            Value::Record(_) => "record",
        }
    }

    fn mismatch(&self, expected: &str) -> CodecError {
        CodecError::TypeMismatch {
            expected: expected.into(),
            found: self.kind_name(),
        }
    }

    /// 取无符号整数字。
    pub fn as_uint(&self) -> Result<Word, CodecError> {
        match self {
            Value::Uint(word) => Ok(*word),
            other => Err(other.mismatch("uint")),
        }
    }

    /// 取无符号整数并收窄为 `u64`。
    pub fn as_u64(&self) -> Result<u64, CodecError> {
        self.as_uint()?.to_u64()
    }

    /// 取无符号整数并收窄为 `u128`。
    pub fn as_u128(&self) -> Result<u128, CodecError> {
        self.as_uint()?.to_u128()
    }

    /// 取有符号整数并收窄为 `i128`。
    pub fn as_i128(&self) -> Result<i128, CodecError> {
        match self {
            Value::Int(word) => word.to_i128(),
            other => Err(other.mismatch("int")),
        }
    }

    /// 取地址字节。
    pub fn as_address(&self) -> Result<&[u8; 20], CodecError> {
        match self {
            Value::Address(addr) => Ok(addr),
            other => Err(other.mismatch("address")),
        }
    }

    /// 取布尔。
    pub fn as_bool(&self) -> Result<bool, CodecError> {
        match self {
            Value::Bool(flag) => Ok(*flag),
            other => Err(other.mismatch("bool")),
        }
    }

    /// 取变长或定长字节串的内容。
    pub fn as_bytes(&self) -> Result<&[u8], CodecError> {
        match self {
            Value::Bytes(bytes) | Value::FixedBytes(bytes) => Ok(bytes),
            other => Err(other.mismatch("bytes")),
        }
    }

    /// 取字符串。
    pub fn as_str(&self) -> Result<&str, CodecError> {
        match self {
            Value::String(text) => Ok(text),
            other => Err(other.mismatch("string")),
        }
    }

    /// 取数组元素。
    pub fn as_array(&self) -> Result<&[Value], CodecError> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(other.mismatch("array")),
        }
    }

    /// 取命名记录。
    pub fn as_record(&self) -> Result<&Record, CodecError> {
        match self {
            Value::Record(record) => Ok(record),
            other => Err(other.mismatch("record")),
        }
    }

    /// 元组槽位的有序值视图：无名元组与命名记录均可。
    pub fn tuple_values(&self) -> Result<Vec<&Value>, CodecError> {
        match self {
            Value::Tuple(items) => Ok(items.iter().collect()),
            Value::Record(record) => Ok(record.values().collect()),
            other => Err(other.mismatch("tuple")),
        }
    }
}

/// 绑定到模式的有序命名实例。
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Record {
    entries: Vec<(Cow<'static, str>, Value)>,
}

impl Record {
    /// 以有序键值对构造记录。
    pub fn new(entries: Vec<(Cow<'static, str>, Value)>) -> Self {
        Self { entries }
    }

    /// 按名取值。
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// 按名取值，缺失时返回 [`CodecError::MissingField`]。
    pub fn field(&self, name: &str) -> Result<&Value, CodecError> {
        self.get(name).ok_or_else(|| CodecError::MissingField {
            name: name.to_string(),
        })
    }

    /// 有序键值对视图。
    pub fn entries(&self) -> &[(Cow<'static, str>, Value)] {
        &self.entries
    }

    /// 有序值迭代器。
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// 字段个数。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 解析 `0x` 前缀的 40 位十六进制地址。
pub fn parse_address(text: &str) -> Result<[u8; 20], CodecError> {
    let stripped = text.strip_prefix("0x").ok_or(CodecError::ValueOutOfRange {
        type_name: "address".into(),
    })?;
    let bytes = hex::decode(stripped).map_err(|_| CodecError::ValueOutOfRange {
        type_name: "address".into(),
    })?;
    bytes.try_into().map_err(|_| CodecError::ValueOutOfRange {
        type_name: "address".into(),
    })
}

/// 将地址字节渲染为 `0x` 前缀小写十六进制。
pub fn format_address(address: &[u8; 20]) -> String {
    let mut out = String::with_capacity(42);
    out.push_str("0x");
    out.push_str(&hex::encode(address));
    out
}
