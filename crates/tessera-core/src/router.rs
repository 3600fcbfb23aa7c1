//! 路由判定契约。
//!
//! ## 模块目的（Why）
//! - 以最小的对象安全接口统一各类路由器（JSON、URL、ABI、组合路由）的判定入口，
//!   调度器只依赖本契约即可完成“找处理器、执行、换算回执”的全流程；
//! - 判定结果以 [`RouteMatch`] 承载：路由器在匹配阶段完成负载解析与参数绑定，
//!   调度器拿到的是一个可直接调用的闭包，无需了解各变体的绑定细节。
//!
//! ## 使用契约（What）
//! - [`Router::get_handler`] 返回 `None` 表示“本路由器无匹配”，属正常信号而非错误；
//! - 处理器通过 [`HandlerResult`] 显式表达接受/拒绝，意外故障以 [`BoxError`] 上抛，
//!   由调度器统一兜底为拒绝；
//! - 路由表注册期构建、运行期只读；整个判定与执行过程单线程同步，
//!   因此处理器对象不附加 `Send + Sync` 约束。

use alloc::boxed::Box;
use core::fmt;

use crate::request::RollupRequest;
use crate::rollup::Rollup;

/// 处理器的显式结果：接受或拒绝本次请求。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// 请求处理成功，向基础层回执 accept。
    Accept,
    /// 请求被业务逻辑拒绝，回执 reject。
    Reject,
}

impl HandlerOutcome {
    /// 转换为传输层的布尔回执。
    pub fn accepted(self) -> bool {
        matches!(self, HandlerOutcome::Accept)
    }
}

impl From<bool> for HandlerOutcome {
    fn from(accepted: bool) -> Self {
        if accepted {
            HandlerOutcome::Accept
        } else {
            HandlerOutcome::Reject
        }
    }
}

/// 处理器意外故障的统一载体。
pub type BoxError = Box<dyn core::error::Error + 'static>;

/// 处理器返回值：显式结果或意外故障。
pub type HandlerResult = Result<HandlerOutcome, BoxError>;

/// 一次命中的路由绑定：已完成负载解析与参数绑定、随时可执行的处理器。
///
/// 生命周期 `'req` 同时覆盖路由表与请求的借用，绑定只在当次请求内有效。
pub struct RouteMatch<'req> {
    run: Box<dyn FnOnce(&mut dyn Rollup) -> HandlerResult + 'req>,
}

impl<'req> RouteMatch<'req> {
    /// 用执行闭包构造绑定。
    pub fn new(run: impl FnOnce(&mut dyn Rollup) -> HandlerResult + 'req) -> Self {
        Self { run: Box::new(run) }
    }

    /// 执行绑定的处理器。
    pub fn invoke(self, rollup: &mut dyn Rollup) -> HandlerResult {
        (self.run)(rollup)
    }
}

impl fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch").finish_non_exhaustive()
    }
}

/// 路由器契约：为请求寻找处理器。
pub trait Router {
    /// 返回首个匹配的处理器绑定；无匹配时返回 `None`。
    fn get_handler<'req>(&'req self, request: &'req RollupRequest) -> Option<RouteMatch<'req>>;
}

impl<R: Router + ?Sized> Router for Box<R> {
    fn get_handler<'req>(&'req self, request: &'req RollupRequest) -> Option<RouteMatch<'req>> {
        (**self).get_handler(request)
    }
}

/// 应用持有 `Rc` 句柄即可在挂载后继续访问路由器自身的状态
/// （例如钱包余额查询），与单线程同步模型配套。
impl<R: Router + ?Sized> Router for alloc::rc::Rc<R> {
    fn get_handler<'req>(&'req self, request: &'req RollupRequest) -> Option<RouteMatch<'req>> {
        (**self).get_handler(request)
    }
}
