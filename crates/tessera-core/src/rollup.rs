//! 传输边界契约与出站工件。
//!
//! ## 模块目的（Why）
//! - 处理器需要在执行期间向 rollup 服务器发布 notice/report/voucher，
//!   本模块以 [`Rollup`] trait 约定这一边界，真正的 HTTP 轮询循环由外部协作方实现；
//! - 测试场景可注入内存实现（见 `tessera-dapp` 的 testkit），与生产传输互换。
//!
//! ## 使用契约（What）
//! - 所有发布操作同步执行、可失败；失败以 [`EmitError`] 表达并由处理器决定是否上抛；
//! - [`Voucher`] 的 `value` 为 32 字节全宽十六进制（`0x` + 64 位），与链上校验约定一致。

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

/// 出站 voucher：请求基础层代表应用执行一次外部合约调用。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// 目标合约或账户地址（`0x` 前缀十六进制）。
    pub destination: String,
    /// 随调用转移的原生代币数量，`0x` 前缀的 64 位十六进制。
    pub value: String,
    /// 调用负载：选择子加 ABI 编码参数，无调用时为 `0x`。
    pub payload: String,
}

/// 出站 delegate-call voucher：以应用合约身份执行目标代码。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateCallVoucher {
    /// 目标合约地址。
    pub destination: String,
    /// 调用负载。
    pub payload: String,
}

/// 发布出站工件失败。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitError {
    detail: Cow<'static, str>,
}

impl EmitError {
    /// 以可读描述构造发布错误。
    pub fn new(detail: impl Into<Cow<'static, str>>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to emit rollup output: {}", self.detail)
    }
}

impl core::error::Error for EmitError {}

/// 与 rollup 基础层交互的传输边界。
///
/// ### 契约说明（What）
/// - `notice`/`report` 接收 `0x` 前缀十六进制负载；
/// - 实现负责把工件转交基础层并返回回执结果；
/// - 核心假定单请求单线程执行，方法以 `&mut self` 暴露内部记账的可变性。
pub trait Rollup {
    /// 发布一条可在链上验证的 notice。
    fn notice(&mut self, payload: &str) -> Result<(), EmitError>;

    /// 发布一条仅供查询的 report。
    fn report(&mut self, payload: &str) -> Result<(), EmitError>;

    /// 发布一张 voucher。
    fn voucher(&mut self, voucher: &Voucher) -> Result<(), EmitError>;

    /// 发布一张 delegate-call voucher。
    fn delegate_call_voucher(&mut self, voucher: &DelegateCallVoucher) -> Result<(), EmitError>;
}
