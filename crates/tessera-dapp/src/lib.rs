//! # tessera-dapp
//!
//! ## 定位与职责（Why）
//! - 作为 rollup 应用的调度枢纽：把各路由表组合成单一分发面，
//!   为每个请求选定处理器并把结果换算为 accept/reject 回执；
//! - 同时承载围绕调度器生长的配套件：出站 voucher 构造助手、
//!   可直接挂载的内置应用（以太钱包、应用地址中继路由）与内存测试套件。
//!
//! ## 架构嵌入（Where）
//! - `dapp` 模块实现调度器与故障兜底；
//! - `vouchers` 模块封装“选择子加 ABI 参数”的出站负载拼装；
//! - `applications` 模块承载面向业务的内置路由应用；
//! - `testkit` 模块提供内存 rollup 桩与测试客户端，与生产传输互换。
//!
//! ## 使用契约（What）
//! - 路由挂载与默认处理器设置在应用启动期完成，随后调度器只读；
//! - 处理器内的错误与 panic 一律被调度器吞掉并换算为 reject，
//!   单个畸形请求不会中断处理循环。

pub mod applications;
pub mod dapp;
pub mod testkit;
pub mod vouchers;

pub use dapp::Dapp;
pub use testkit::{MockRollup, TestClient};
pub use vouchers::{VoucherCall, VoucherError, create_voucher, ether_withdrawal, erc20_withdrawal};
