//! 内置路由应用的集合入口。
//!
//! - **意图说明（Why）**：把常见的 rollup 业务能力做成可直接挂载的路由应用，
//!   应用侧一行 `add_router` 即可获得完整的存取款或地址中继能力；
//! - **契约定位（What）**：各应用实现 `tessera_core::router::Router` 契约，
//!   内部状态经 `Rc<RefCell<…>>` 共享给注册期捕获的处理器闭包（单线程模型）；
//! - **扩展指引（How）**：新应用按“构造期注册路由、运行期只读”的同一模式编写。

pub mod dapp_address;
pub mod ether_wallet;

use thiserror::Error;

use tessera_codec_abi::SchemaError;
use tessera_router::RouteSpecError;

pub use dapp_address::DappAddressRouter;
pub use ether_wallet::EtherWallet;

/// 内置应用装配失败。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApplicationError {
    /// 参数模式无法内省。
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// 路由注册规格非法。
    #[error(transparent)]
    RouteSpec(#[from] RouteSpecError),
}
