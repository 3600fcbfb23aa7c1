//! 负载头抽象。
//!
//! ## 模块目的（Why）
//! - ABI 路由依赖“负载前缀”区分操作：前缀要么是注册方选定的字面字节串，
//!   要么是由函数签名派生的 4 字节选择子。本模块把两者收敛为一个封闭枚举，
//!   注册期各产出一次字节形态，匹配期只做逐字节前缀比较。
//!
//! ## 使用契约（What）
//! - [`AbiHeader::to_bytes`] 是唯一操作；头对象从不反向解析负载；
//! - 选择子头的参数类型可显式给出，也可经内省从模式派生
//!   （[`AbiHeader::for_schema`]，模式畸形时在注册期即失败）。

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::SchemaError;
use crate::selector::function_selector;
use crate::types::Schema;

/// 负载头的封闭变体集合。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiHeader {
    /// 固定字节串。
    Literal(Vec<u8>),
    /// 由函数名与有序参数类型派生的 4 字节选择子。
    FunctionSelector {
        /// 函数名。
        function: String,
        /// 规范参数类型列表。
        argument_types: Vec<String>,
    },
}

impl AbiHeader {
    /// 字面头。
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        AbiHeader::Literal(bytes.into())
    }

    /// 选择子头，参数类型显式给出。
    pub fn function_selector(function: impl Into<String>, argument_types: Vec<String>) -> Self {
        AbiHeader::FunctionSelector {
            function: function.into(),
            argument_types,
        }
    }

    /// 选择子头，参数类型经内省从模式派生。
    pub fn for_schema(function: impl Into<String>, schema: &Schema) -> Result<Self, SchemaError> {
        Ok(AbiHeader::FunctionSelector {
            function: function.into(),
            argument_types: schema.abi_types()?,
        })
    }

    /// 产出用于前缀比较的头字节。
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            AbiHeader::Literal(bytes) => bytes.clone(),
            AbiHeader::FunctionSelector {
                function,
                argument_types,
            } => function_selector(function, argument_types).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldType, TypeTag};
    use alloc::vec;

    #[test]
    fn literal_header_returns_stored_bytes() {
        let header = AbiHeader::literal(vec![0x12, 0x34, 0x56, 0x78]);
        assert_eq!(header.to_bytes(), [0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn selector_header_derives_from_schema() {
        let schema = Schema::new(vec![
            Field::new("to", FieldType::Value(TypeTag::Address)),
            Field::new("amount", FieldType::Value(TypeTag::Uint(256))),
        ]);
        let header = AbiHeader::for_schema("transfer", &schema).expect("模式应可内省");
        assert_eq!(header.to_bytes(), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn malformed_schema_fails_at_registration() {
        use crate::types::NativeShape;
        let schema = Schema::new(vec![Field::new(
            "when",
            FieldType::Inferred(NativeShape::Opaque("datetime".into())),
        )]);
        assert!(AbiHeader::for_schema("op", &schema).is_err());
    }
}
