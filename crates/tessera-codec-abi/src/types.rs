//! ABI 类型标签与模式描述表。
//!
//! ## 模块目的（Why）
//! - 原型系统依靠运行时反射读取字段注解；这里改为显式的模式描述表：
//!   字段在定义处直接携带枚举化的类型标签，装配期即可整体校验，
//!   畸形模式在处理任何请求之前就会失败。
//!
//! ## 交互契约（What）
//! - [`Schema`] 是有序、命名、可嵌套的字段集合，字段声明顺序即 ABI 元组顺序；
//! - [`Schema::abi_types`] 输出规范类型字符串列表（内省契约），
//!   [`Schema::resolve`] 输出结构化的 [`AbiType`] 供编解码器消费；
//! - 未显式打标签的字段按原生形状查默认表：整数归 `int256`，文本归 `string`，
//!   原始字节归 `bytes`；两者皆无则返回 [`SchemaError::MissingAbiType`]。
//!
//! ## 实现策略（How）
//! - 嵌套模型渲染为带括号的元组 `(t1,t2)`，列表追加 `[]`，模型列表渲染 `(t1,t2)[]`；
//! - 输出顺序严格等于声明顺序，不重排也不去重。

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::error::SchemaError;

/// ABI 基元类型标签，模式作者附加在字段上的固定词汇表。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `uintN`，N 为 8 的倍数且不超过 256。
    Uint(usize),
    /// `intN`，约束同上。
    Int(usize),
    /// 20 字节地址。
    Address,
    /// 布尔。
    Bool,
    /// `bytesN`，N 为 1 到 32。
    FixedBytes(usize),
    /// 变长字节串。
    Bytes,
    /// UTF-8 字符串。
    String,
}

impl TypeTag {
    /// 从规范名称解析标签；裸 `uint`/`int` 归一化为 256 位。
    pub fn parse(tag: &str) -> Result<Self, SchemaError> {
        let parsed = match tag {
            "address" => TypeTag::Address,
            "bool" => TypeTag::Bool,
            "bytes" => TypeTag::Bytes,
            "string" => TypeTag::String,
            "uint" => TypeTag::Uint(256),
            "int" => TypeTag::Int(256),
            _ => {
                if let Some(width) = tag.strip_prefix("uint") {
                    TypeTag::Uint(parse_width(tag, width)?)
                } else if let Some(width) = tag.strip_prefix("int") {
                    TypeTag::Int(parse_width(tag, width)?)
                } else if let Some(width) = tag.strip_prefix("bytes") {
                    TypeTag::FixedBytes(parse_width(tag, width)?)
                } else {
                    return Err(SchemaError::UnknownTag { tag: tag.into() });
                }
            }
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// 校验位宽是否在标准集合内。
    pub fn validate(&self) -> Result<(), SchemaError> {
        let valid = match self {
            TypeTag::Uint(bits) | TypeTag::Int(bits) => {
                *bits >= 8 && *bits <= 256 && bits % 8 == 0
            }
            TypeTag::FixedBytes(len) => *len >= 1 && *len <= 32,
            _ => true,
        };
        if valid {
            Ok(())
        } else {
            Err(SchemaError::InvalidWidth {
                tag: self.to_string(),
            })
        }
    }
}

fn parse_width(tag: &str, width: &str) -> Result<usize, SchemaError> {
    width.parse().map_err(|_| SchemaError::UnknownTag { tag: tag.into() })
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Uint(bits) => write!(f, "uint{bits}"),
            TypeTag::Int(bits) => write!(f, "int{bits}"),
            TypeTag::Address => f.write_str("address"),
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::FixedBytes(len) => write!(f, "bytes{len}"),
            TypeTag::Bytes => f.write_str("bytes"),
            TypeTag::String => f.write_str("string"),
        }
    }
}

/// 未打标签字段的原生形状，用于查默认标签表。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeShape {
    /// 整数，默认 `int256`。
    Integer,
    /// 文本，默认 `string`。
    Text,
    /// 原始字节缓冲，默认 `bytes`。
    Buffer,
    /// 默认表之外的形状，解析必然失败，携带描述用于报错。
    Opaque(Cow<'static, str>),
}

impl NativeShape {
    fn default_tag(&self, field: &str) -> Result<TypeTag, SchemaError> {
        match self {
            NativeShape::Integer => Ok(TypeTag::Int(256)),
            NativeShape::Text => Ok(TypeTag::String),
            NativeShape::Buffer => Ok(TypeTag::Bytes),
            NativeShape::Opaque(_) => Err(SchemaError::MissingAbiType {
                field: field.into(),
            }),
        }
    }
}

/// 字段的类型声明。
#[derive(Clone, Debug, PartialEq)]
pub enum FieldType {
    /// 显式类型标签。
    Value(TypeTag),
    /// 未打标签，按原生形状查默认表。
    Inferred(NativeShape),
    /// 嵌套模型。
    Record(Schema),
    /// 列表，元素可为基元或嵌套模型。
    List(Box<FieldType>),
}

impl FieldType {
    fn resolve(&self, field: &str) -> Result<AbiType, SchemaError> {
        match self {
            FieldType::Value(tag) => {
                tag.validate()?;
                Ok(AbiType::from_tag(tag))
            }
            FieldType::Inferred(shape) => Ok(AbiType::from_tag(&shape.default_tag(field)?)),
            FieldType::Record(schema) => Ok(AbiType::Tuple(schema.resolve()?)),
            FieldType::List(inner) => Ok(AbiType::Array(Box::new(inner.resolve(field)?))),
        }
    }
}

/// 命名字段：名称加类型声明。
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    name: Cow<'static, str>,
    ty: FieldType,
}

impl Field {
    /// 构造新字段。
    pub fn new(name: impl Into<Cow<'static, str>>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// 字段名。
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 字段类型声明。
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// 字段名的共享副本，绑定记录时复用 `'static` 借用。
    pub(crate) fn name_cow(&self) -> Cow<'static, str> {
        self.name.clone()
    }
}

/// 模式：有序命名字段集合，即一个结构化模型的描述表。
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// 以字段列表构造模式。
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// 访问字段列表。
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// 装配期整体校验：字段名唯一，且每个字段都能解析出 ABI 类型。
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (index, field) in self.fields.iter().enumerate() {
            if self.fields[..index].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    name: field.name.to_string(),
                });
            }
        }
        self.resolve().map(|_| ())
    }

    /// 解析出编解码器消费的结构化类型列表，顺序即声明顺序。
    pub fn resolve(&self) -> Result<Vec<AbiType>, SchemaError> {
        self.fields
            .iter()
            .map(|field| field.ty.resolve(&field.name))
            .collect()
    }

    /// 内省契约：输出规范类型字符串列表。
    pub fn abi_types(&self) -> Result<Vec<String>, SchemaError> {
        Ok(self.resolve()?.iter().map(ToString::to_string).collect())
    }
}

/// 解析后的结构化 ABI 类型，编解码算法的直接输入。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `uintN`。
    Uint(usize),
    /// `intN`。
    Int(usize),
    /// 地址。
    Address,
    /// 布尔。
    Bool,
    /// `bytesN`。
    FixedBytes(usize),
    /// 变长字节串。
    Bytes,
    /// UTF-8 字符串。
    String,
    /// 动态数组。
    Array(Box<AbiType>),
    /// 元组（嵌套模型解析结果）。
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// 由基元标签构造。
    pub fn from_tag(tag: &TypeTag) -> Self {
        match tag {
            TypeTag::Uint(bits) => AbiType::Uint(*bits),
            TypeTag::Int(bits) => AbiType::Int(*bits),
            TypeTag::Address => AbiType::Address,
            TypeTag::Bool => AbiType::Bool,
            TypeTag::FixedBytes(len) => AbiType::FixedBytes(*len),
            TypeTag::Bytes => AbiType::Bytes,
            TypeTag::String => AbiType::String,
        }
    }

    /// 标准布局下是否为动态类型（进尾区、头区只放偏移）。
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::Tuple(children) => children.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// 头区占用的字节数：动态类型为一个偏移字，静态类型为其完整尺寸。
    pub(crate) fn head_width(&self) -> usize {
        if self.is_dynamic() {
            32
        } else {
            self.static_size()
        }
    }

    /// 静态类型的完整尺寸。调用方保证 `!self.is_dynamic()`。
    pub(crate) fn static_size(&self) -> usize {
        match self {
            AbiType::Tuple(children) => children.iter().map(AbiType::static_size).sum(),
            _ => 32,
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::FixedBytes(len) => write!(f, "bytes{len}"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::Array(inner) => write!(f, "{inner}[]"),
            AbiType::Tuple(children) => {
                f.write_str("(")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn deposit_schema() -> Schema {
        Schema::new(vec![
            Field::new("success", FieldType::Value(TypeTag::Bool)),
            Field::new("token", FieldType::Value(TypeTag::Address)),
            Field::new("sender", FieldType::Value(TypeTag::Address)),
            Field::new("depositAmount", FieldType::Value(TypeTag::Uint(256))),
            Field::new("execLayerData", FieldType::Inferred(NativeShape::Buffer)),
        ])
    }

    #[test]
    fn abi_types_follow_declaration_order() {
        let types = deposit_schema().abi_types().expect("模式应可解析");
        assert_eq!(types, ["bool", "address", "address", "uint256", "bytes"]);
    }

    #[test]
    fn nested_record_renders_parenthesized_tuple() {
        let inner = Schema::new(vec![
            Field::new("id", FieldType::Value(TypeTag::Uint(64))),
            Field::new("label", FieldType::Value(TypeTag::String)),
        ]);
        let schema = Schema::new(vec![
            Field::new("owner", FieldType::Value(TypeTag::Address)),
            Field::new("item", FieldType::Record(inner.clone())),
            Field::new("items", FieldType::List(Box::new(FieldType::Record(inner)))),
            Field::new(
                "flags",
                FieldType::List(Box::new(FieldType::Value(TypeTag::Bool))),
            ),
        ]);
        let types = schema.abi_types().expect("模式应可解析");
        assert_eq!(
            types,
            [
                "address",
                "(uint64,string)",
                "(uint64,string)[]",
                "bool[]"
            ]
        );
    }

    #[test]
    fn untagged_defaults_resolve_by_shape() {
        let schema = Schema::new(vec![
            Field::new("count", FieldType::Inferred(NativeShape::Integer)),
            Field::new("label", FieldType::Inferred(NativeShape::Text)),
            Field::new("blob", FieldType::Inferred(NativeShape::Buffer)),
        ]);
        let types = schema.abi_types().expect("默认表应覆盖三种形状");
        assert_eq!(types, ["int256", "string", "bytes"]);
    }

    #[test]
    fn opaque_shape_fails_with_missing_abi_type() {
        let schema = Schema::new(vec![Field::new(
            "bogus_field",
            FieldType::Inferred(NativeShape::Opaque("timestamp".into())),
        )]);
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::MissingAbiType { field }) if field == "bogus_field"
        ));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let schema = Schema::new(vec![
            Field::new("a", FieldType::Value(TypeTag::Bool)),
            Field::new("a", FieldType::Value(TypeTag::Bool)),
        ]);
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::DuplicateField { name }) if name == "a"
        ));
    }

    #[test]
    fn tag_parsing_normalizes_bare_aliases() {
        assert_eq!(TypeTag::parse("uint").expect("裸 uint 合法"), TypeTag::Uint(256));
        assert_eq!(TypeTag::parse("int").expect("裸 int 合法"), TypeTag::Int(256));
        assert_eq!(
            TypeTag::parse("bytes32").expect("bytes32 合法"),
            TypeTag::FixedBytes(32)
        );
    }

    #[test]
    fn unknown_or_misshaped_tags_are_rejected() {
        assert!(matches!(
            TypeTag::parse("uint7"),
            Err(SchemaError::InvalidWidth { .. })
        ));
        assert!(matches!(
            TypeTag::parse("bytes33"),
            Err(SchemaError::InvalidWidth { .. })
        ));
        assert!(matches!(
            TypeTag::parse("float64"),
            Err(SchemaError::UnknownTag { .. })
        ));
    }

    #[test]
    fn dynamic_classification() {
        assert!(AbiType::Bytes.is_dynamic());
        assert!(AbiType::Array(Box::new(AbiType::Bool)).is_dynamic());
        assert!(AbiType::Tuple(vec![AbiType::Uint(8), AbiType::String]).is_dynamic());
        assert!(!AbiType::Tuple(vec![AbiType::Uint(8), AbiType::Bool]).is_dynamic());
        assert!(!AbiType::FixedBytes(32).is_dynamic());
    }
}
