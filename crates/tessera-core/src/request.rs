//! 入站请求模型与负载工具。
//!
//! ## 模块目的（Why）
//! - 将 rollup 服务器下发的 JSON 请求固化为强类型结构，供路由与应用层直接消费；
//! - 负载统一为 `0x` 前缀十六进制文本，字节、字符串与 JSON 视图均按需解码。
//!
//! ## 使用契约（What）
//! - [`RollupRequest`] 一次请求只读一份，处理器执行期间不可变；
//! - inspect 请求不携带元数据，因此 [`RollupData::metadata`] 为 `Option`；
//! - 解码失败返回 [`PayloadError`]，调用方自行决定视为“无匹配”还是上抛。

use alloc::string::{FromUtf8Error, String};
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

/// 请求类型：`advance_state` 会推进应用状态，`inspect_state` 为只读查询。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// 状态推进请求，携带完整元数据。
    #[serde(rename = "advance_state")]
    Advance,
    /// 只读查询请求。
    #[serde(rename = "inspect_state")]
    Inspect,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Advance => f.write_str("advance_state"),
            RequestKind::Inspect => f.write_str("inspect_state"),
        }
    }
}

/// advance 请求随附的链上元数据。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupMetadata {
    /// 触发本次输入的外部账户或合约地址（`0x` 前缀十六进制）。
    pub msg_sender: String,
    /// 纪元序号。
    pub epoch_index: u64,
    /// 纪元内的输入序号。
    pub input_index: u64,
    /// 输入所在区块号。
    pub block_number: u64,
    /// 输入时间戳（秒）。
    pub timestamp: u64,
}

/// 请求数据：负载加可选元数据。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupData {
    /// advance 请求附带元数据，inspect 请求为 `None`。
    #[serde(default)]
    pub metadata: Option<RollupMetadata>,
    /// `0x` 前缀十六进制负载。
    pub payload: String,
}

impl RollupData {
    /// 将负载解码为原始字节。
    pub fn bytes_payload(&self) -> Result<Vec<u8>, PayloadError> {
        decode_hex_payload(&self.payload)
    }

    /// 将负载解码为 UTF-8 字符串。
    pub fn str_payload(&self) -> Result<String, PayloadError> {
        let bytes = self.bytes_payload()?;
        String::from_utf8(bytes).map_err(PayloadError::InvalidUtf8)
    }

    /// 将负载解码为 JSON 值。
    #[cfg(feature = "std_json")]
    pub fn json_payload(&self) -> Result<serde_json::Value, PayloadError> {
        let text = self.str_payload()?;
        serde_json::from_str(&text).map_err(PayloadError::InvalidJson)
    }
}

/// 一次完整的入站请求。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupRequest {
    /// 请求类型。
    #[serde(rename = "request_type")]
    pub kind: RequestKind,
    /// 请求数据。
    pub data: RollupData,
}

/// 负载解码失败的枚举。
#[derive(Debug)]
#[non_exhaustive]
pub enum PayloadError {
    /// 负载缺少 `0x` 前缀。
    MissingHexPrefix,
    /// 十六进制文本非法（奇数长度或非法字符）。
    InvalidHex(hex::FromHexError),
    /// 字节序列不是合法 UTF-8。
    InvalidUtf8(FromUtf8Error),
    /// 字符串不是合法 JSON。
    #[cfg(feature = "std_json")]
    InvalidJson(serde_json::Error),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::MissingHexPrefix => f.write_str("payload is missing the `0x` prefix"),
            PayloadError::InvalidHex(err) => write!(f, "payload is not valid hex: {err}"),
            PayloadError::InvalidUtf8(err) => write!(f, "payload is not valid UTF-8: {err}"),
            #[cfg(feature = "std_json")]
            PayloadError::InvalidJson(err) => write!(f, "payload is not valid JSON: {err}"),
        }
    }
}

impl core::error::Error for PayloadError {}

/// 将 `0x` 前缀十六进制文本解码为字节。
pub fn decode_hex_payload(payload: &str) -> Result<Vec<u8>, PayloadError> {
    let stripped = payload
        .strip_prefix("0x")
        .ok_or(PayloadError::MissingHexPrefix)?;
    hex::decode(stripped).map_err(PayloadError::InvalidHex)
}

/// 将字节编码为 `0x` 前缀十六进制文本。
pub fn encode_hex_payload(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    out.push_str(&hex::encode(bytes));
    out
}
