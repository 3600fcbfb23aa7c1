#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # tessera-codec-abi
//!
//! ## 定位与职责（Why）
//! - 为 tessera 框架提供与 Ethereum Contract ABI 规范逐位兼容的编解码能力：
//!   标准头尾布局与紧凑（packed）布局双模式，外加确定性的 4 字节函数选择子派生；
//! - 这是数据损坏风险最集中的一层：编码错一个字节，链上合约就会拒绝或误解负载，
//!   因此所有失败路径都显式建模，从不静默纠偏。
//!
//! ## 模块结构（How）
//! - `types`：类型标签词汇表与显式模式描述表（内省契约的载体）；
//! - `value`：256 位字、运行时值与命名记录；
//! - `encode`/`decode`：标准模式双向转换与记录绑定；
//! - `packed`：紧凑模式双向转换；
//! - `selector`：规范签名与 Keccak-256 选择子；
//! - `header`：字面头与选择子头的封闭抽象。
//!
//! ## 使用契约（What）
//! - 模式在应用启动期定义并整体校验（[`Schema::validate`]），进程生命周期内静态；
//! - 实例逐请求构造，解码产物自绑定起不可变；
//! - 全部 API 支持 `no_std + alloc`。

extern crate alloc;

pub mod decode;
pub mod encode;
pub mod error;
pub mod header;
pub mod packed;
pub mod selector;
pub mod types;
pub mod value;

pub use decode::{decode_record, decode_values};
pub use encode::{EncodingMode, encode_record, encode_values};
pub use error::{CodecError, SchemaError};
pub use header::AbiHeader;
pub use packed::{decode_packed_values, encode_packed_values};
pub use selector::{SELECTOR_LEN, function_selector, selector_of_signature, signature};
pub use types::{AbiType, Field, FieldType, NativeShape, Schema, TypeTag};
pub use value::{Record, Value, Word, format_address, parse_address};
