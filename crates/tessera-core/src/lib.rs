#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

//! # tessera-core
//!
//! ## 定位与职责（Why）
//! - 作为 rollup 应用框架的最小契约层，沉淀请求模型、传输边界与路由判定接口，
//!   供编解码扩展（`tessera-codec-abi`）、路由实现（`tessera-router`）与应用枢纽
//!   （`tessera-dapp`）共同依赖。
//! - 核心刻意不包含任何 I/O：与 rollup 服务器的轮询循环由外部传输协作方承担，
//!   本层只约定双方交换的数据形状与回执语义。
//!
//! ## 模块结构（How）
//! - `request`：入站请求模型（请求类型、负载、元数据）与十六进制负载工具；
//! - `rollup`：出站工件（notice/report/voucher）与传输边界 [`Rollup`] 契约；
//! - `router`：路由判定契约（[`Router`]、[`RouteMatch`]）与处理器结果类型。
//!
//! ## 使用契约（What）
//! - 所有结构均支持 `no_std + alloc`；JSON 负载访问仅在 `std_json` Feature 下开放；
//! - 路由表在应用启动期构建完成后视为只读，整个处理流程单线程同步执行，
//!   因此处理器对象不要求 `Send + Sync`。
//!
//! ## 设计权衡（Trade-offs）
//! - 处理器失败通过显式的 [`router::HandlerResult`] 表达而非异常传播，
//!   含栈回溯的兜底逻辑（panic 捕获）留给上层调度器实现；
//! - 负载统一以 `0x` 前缀十六进制字符串承载，与 rollup 服务器的 JSON 协议对齐，
//!   字节视图按需解码，避免在模型层提前复制。

extern crate alloc;

pub mod request;
pub mod rollup;
pub mod router;

pub use request::{
    PayloadError, RequestKind, RollupData, RollupMetadata, RollupRequest, decode_hex_payload,
    encode_hex_payload,
};
pub use rollup::{DelegateCallVoucher, EmitError, Rollup, Voucher};
pub use router::{BoxError, HandlerOutcome, HandlerResult, RouteMatch, Router};
