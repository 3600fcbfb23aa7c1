//! 出站 voucher 构造助手。
//!
//! ## 模块目的（Why）
//! - voucher 负载须符合标准合约调用约定：4 字节选择子加标准模式编码的参数，
//!   这里把“内省参数类型、派生选择子、编码参数、拼装负载”收敛为一次调用；
//! - 纯转账 voucher（只带 value、负载为空）与常见的取款调用也提供现成助手。
//!
//! ## 使用契约（What）
//! - `value` 渲染为 `0x` 前缀的 64 位十六进制全宽形式，与链上校验约定一致；
//! - 参数模式畸形或编码失败以 [`VoucherError`] 上抛，构造过程无副作用。

use thiserror::Error;

use tessera_codec_abi::{
    CodecError, EncodingMode, Field, FieldType, Record, Schema, SchemaError, TypeTag, Value, Word,
    encode_record, function_selector, parse_address,
};
use tessera_core::rollup::Voucher;

/// 附着在 voucher 上的合约调用描述。
pub struct VoucherCall<'a> {
    /// 目标函数名。
    pub function: &'a str,
    /// 参数模式。
    pub schema: &'a Schema,
    /// 参数实例。
    pub arguments: &'a Record,
}

/// voucher 构造失败。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VoucherError {
    /// 参数模式无法内省。
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// 参数编码失败。
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// 构造一张 voucher。
///
/// 附带调用时，负载为“选择子 + 标准编码参数”；否则负载为空 `0x`。
pub fn create_voucher(
    destination: &str,
    call: Option<VoucherCall<'_>>,
    value: Option<Word>,
) -> Result<Voucher, VoucherError> {
    let mut payload = String::from("0x");
    if let Some(call) = call {
        let types = call.schema.abi_types()?;
        let selector = function_selector(call.function, &types);
        payload.push_str(&hex::encode(selector));
        let arguments = encode_record(call.schema, call.arguments, EncodingMode::Standard)?;
        payload.push_str(&hex::encode(arguments));
    }
    Ok(Voucher {
        destination: destination.to_string(),
        value: value.unwrap_or(Word::ZERO).to_string(),
        payload,
    })
}

/// 纯转账取款 voucher：把 `amount` 原生代币发往 `receiver`。
pub fn ether_withdrawal(receiver: &str, amount: Word) -> Voucher {
    Voucher {
        destination: receiver.to_string(),
        value: amount.to_string(),
        payload: "0x".to_string(),
    }
}

/// ERC-20 取款 voucher：对应用合约发起
/// `withdrawERC20Tokens(address,address,uint256)` 调用。
pub fn erc20_withdrawal(
    app_contract: &str,
    token: &str,
    receiver: &str,
    amount: Word,
) -> Result<Voucher, VoucherError> {
    let schema = Schema::new(vec![
        Field::new("token", FieldType::Value(TypeTag::Address)),
        Field::new("receiver", FieldType::Value(TypeTag::Address)),
        Field::new("amount", FieldType::Value(TypeTag::Uint(256))),
    ]);
    let arguments = Record::new(vec![
        ("token".into(), Value::Address(parse_address(token)?)),
        ("receiver".into(), Value::Address(parse_address(receiver)?)),
        ("amount".into(), Value::Uint(amount)),
    ]);
    create_voucher(
        app_contract,
        Some(VoucherCall {
            function: "withdrawERC20Tokens",
            schema: &schema,
            arguments: &arguments,
        }),
        None,
    )
}
