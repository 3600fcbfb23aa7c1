//! # tessera-router
//!
//! ## 定位与职责（Why）
//! - 实现 `tessera-core` 路由契约的全部具体匹配策略：JSON 内容匹配、
//!   URL 路径模板匹配、ABI 头/发送方匹配，以及把独立路由表组合成
//!   单一分发面的链式路由；
//! - 路由表在应用启动期以显式构建器注册完成，运行期只读，
//!   注册顺序即匹配优先级，首个命中者胜出。
//!
//! ## 模块结构（How）
//! - `json`：过滤字典的子集包含匹配；
//! - `url`：`{name}` 占位模板与查询串解析；
//! - `abi`：头字节前缀与发送方门控；
//! - `multi`：按序委托的组合路由。
//!
//! ## 使用契约（What）
//! - 所有路由器的 `get_handler` 均把“负载解析失败”视为无匹配而非错误；
//! - 注册期校验失败（畸形模板、非对象过滤器）返回 [`RouteSpecError`]，
//!   应用装配应当就地终止。

pub mod abi;
pub mod error;
pub mod json;
pub mod multi;
pub mod url;

pub use abi::{AbiContext, AbiRouteSpec, AbiRouter};
pub use error::RouteSpecError;
pub use json::{JsonContext, JsonRouter};
pub use multi::MultiRouter;
pub use url::{UrlContext, UrlParameters, UrlRouter};

pub use tessera_core::router::{BoxError, HandlerOutcome, HandlerResult, RouteMatch, Router};
