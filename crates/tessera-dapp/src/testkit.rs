//! 内存测试套件：rollup 桩与测试客户端。
//!
//! ## 模块目的（Why）
//! - 测试无需真实传输循环：[`MockRollup`] 在内存中记录全部出站工件并实现
//!   [`Rollup`] 契约，与生产传输可互换；
//! - [`TestClient`] 把“构造请求、驱动调度器、记录回执、推进序号”的样板
//!   收敛为两个调用，测试体只关心业务断言。
//!
//! ## 使用契约（What）
//! - advance 请求自动携带元数据（默认发送方、递增的区块与输入序号），
//!   inspect 请求不带元数据；
//! - 回执为 accept 时输入序号加一，与基础层的推进语义一致。

use tessera_core::request::{
    RequestKind, RollupData, RollupMetadata, RollupRequest,
};
use tessera_core::rollup::{DelegateCallVoucher, EmitError, Rollup, Voucher};

use crate::dapp::Dapp;

/// 一条被记录的出站负载，附带发生时的纪元与输入序号。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedOutput {
    /// 纪元序号。
    pub epoch_index: u64,
    /// 输入序号。
    pub input_index: u64,
    /// 负载文本。
    pub payload: String,
}

/// 一张被记录的 voucher。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedVoucher {
    /// 纪元序号。
    pub epoch_index: u64,
    /// 输入序号。
    pub input_index: u64,
    /// voucher 内容。
    pub voucher: Voucher,
}

/// 内存 rollup 桩：记录出站工件，供断言取用。
#[derive(Default)]
pub struct MockRollup {
    /// 已记录的 notice。
    pub notices: Vec<EmittedOutput>,
    /// 已记录的 report。
    pub reports: Vec<EmittedOutput>,
    /// 已记录的 voucher。
    pub vouchers: Vec<EmittedVoucher>,
    /// 已记录的 delegate-call voucher。
    pub delegate_call_vouchers: Vec<DelegateCallVoucher>,
    /// 当前纪元。
    pub epoch: u64,
    /// 当前输入序号。
    pub input: u64,
    /// 当前区块号。
    pub block: u64,
    /// 最近一次请求的回执。
    pub status: Option<bool>,
}

impl MockRollup {
    /// 构造空桩。
    pub fn new() -> Self {
        Self::default()
    }

    fn output(&self, payload: &str) -> EmittedOutput {
        EmittedOutput {
            epoch_index: self.epoch,
            input_index: self.input,
            payload: payload.to_string(),
        }
    }
}

impl Rollup for MockRollup {
    fn notice(&mut self, payload: &str) -> Result<(), EmitError> {
        let output = self.output(payload);
        self.notices.push(output);
        Ok(())
    }

    fn report(&mut self, payload: &str) -> Result<(), EmitError> {
        let output = self.output(payload);
        self.reports.push(output);
        Ok(())
    }

    fn voucher(&mut self, voucher: &Voucher) -> Result<(), EmitError> {
        self.vouchers.push(EmittedVoucher {
            epoch_index: self.epoch,
            input_index: self.input,
            voucher: voucher.clone(),
        });
        Ok(())
    }

    fn delegate_call_voucher(&mut self, voucher: &DelegateCallVoucher) -> Result<(), EmitError> {
        self.delegate_call_vouchers.push(voucher.clone());
        Ok(())
    }
}

/// 驱动 [`Dapp`] 的测试客户端。
pub struct TestClient {
    /// 被测应用。
    pub dapp: Dapp,
    /// 内存 rollup 桩。
    pub rollup: MockRollup,
}

impl TestClient {
    /// advance 请求的默认发送方。
    pub const DEFAULT_SENDER: &'static str = "0xdeadbeef7dc51b33c9a3e4a21ae053daa1872810";

    /// 包装被测应用。
    pub fn new(dapp: Dapp) -> Self {
        Self {
            dapp,
            rollup: MockRollup::new(),
        }
    }

    /// 以默认发送方发送一条 advance 输入。
    pub fn send_advance(&mut self, hex_payload: &str) -> bool {
        self.send_advance_from(hex_payload, Self::DEFAULT_SENDER, 0)
    }

    /// 以指定发送方与时间戳发送一条 advance 输入。
    pub fn send_advance_from(
        &mut self,
        hex_payload: &str,
        msg_sender: &str,
        timestamp: u64,
    ) -> bool {
        self.rollup.block += 1;
        let request = RollupRequest {
            kind: RequestKind::Advance,
            data: RollupData {
                metadata: Some(RollupMetadata {
                    msg_sender: msg_sender.to_string(),
                    epoch_index: self.rollup.epoch,
                    input_index: self.rollup.input,
                    block_number: self.rollup.block,
                    timestamp,
                }),
                payload: hex_payload.to_string(),
            },
        };
        self.dispatch(&request)
    }

    /// 发送一条 inspect 查询。
    pub fn send_inspect(&mut self, hex_payload: &str) -> bool {
        self.rollup.block += 1;
        let request = RollupRequest {
            kind: RequestKind::Inspect,
            data: RollupData {
                metadata: None,
                payload: hex_payload.to_string(),
            },
        };
        self.dispatch(&request)
    }

    fn dispatch(&mut self, request: &RollupRequest) -> bool {
        let status = self.dapp.handle(&mut self.rollup, request);
        self.rollup.status = Some(status);
        if status {
            self.rollup.input += 1;
        }
        status
    }
}
