//! 调度器：路由链、默认处理器与故障兜底。
//!
//! ## 设计要点（How）
//! - 状态机只有 idle 与 handling 两态：同步的 [`Dapp::handle`] 调用本身就是
//!   handling 态，返回即回到 idle，无需显式状态字段；
//! - 每个请求先问路由链，链上无人应答则落到该请求类型的默认处理器
//!   （初始为“一律拒绝”）；
//! - 处理器的显式失败（`Err`）与 panic 都在此处被捕获、记录日志并换算为
//!   reject，调度器自身从不向外抛出处理器故障。

use std::panic::{AssertUnwindSafe, catch_unwind};

use tessera_core::request::{RequestKind, RollupRequest};
use tessera_core::rollup::Rollup;
use tessera_core::router::{BoxError, HandlerOutcome, HandlerResult, Router};
use tessera_router::MultiRouter;

/// 默认处理器签名：兜底处理整个请求。
pub type DefaultHandler = Box<dyn Fn(&mut dyn Rollup, &RollupRequest) -> HandlerResult>;

/// 处理器的意外故障分类，区别于正常的 `Reject` 结果。
enum Fault {
    /// 处理器返回了错误。
    Failed(BoxError),
    /// 处理器 panic，载荷尽量还原为文本。
    Panicked(String),
}

/// rollup 应用的调度器。
pub struct Dapp {
    chain: MultiRouter,
    default_advance: DefaultHandler,
    default_inspect: DefaultHandler,
}

impl Dapp {
    /// 构造调度器，默认处理器一律拒绝。
    pub fn new() -> Self {
        Self {
            chain: MultiRouter::new(),
            default_advance: Box::new(|_rollup, _request| Ok(HandlerOutcome::Reject)),
            default_inspect: Box::new(|_rollup, _request| Ok(HandlerOutcome::Reject)),
        }
    }

    /// 按注册顺序挂载一个路由器。
    pub fn add_router(&mut self, router: impl Router + 'static) {
        self.chain.add_router(router);
    }

    /// 设置 advance 请求的默认处理器。
    pub fn advance(
        &mut self,
        handler: impl Fn(&mut dyn Rollup, &RollupRequest) -> HandlerResult + 'static,
    ) {
        self.default_advance = Box::new(handler);
    }

    /// 设置 inspect 请求的默认处理器。
    pub fn inspect(
        &mut self,
        handler: impl Fn(&mut dyn Rollup, &RollupRequest) -> HandlerResult + 'static,
    ) {
        self.default_inspect = Box::new(handler);
    }

    /// 处理一个请求并产出 accept/reject 回执。
    ///
    /// 路由链首个应答者胜出；无人应答时按请求类型走默认处理器。
    /// 处理器故障在此处收敛，绝不向调用方传播。
    pub fn handle(&self, rollup: &mut dyn Rollup, request: &RollupRequest) -> bool {
        tracing::debug!(kind = %request.kind, "handling request");
        let result = match self.chain.get_handler(request) {
            Some(bound) => contain(move || bound.invoke(rollup)),
            None => {
                let fallback = match request.kind {
                    RequestKind::Advance => &self.default_advance,
                    RequestKind::Inspect => &self.default_inspect,
                };
                contain(move || fallback(rollup, request))
            }
        };
        match result {
            Ok(outcome) => outcome.accepted(),
            Err(Fault::Failed(error)) => {
                tracing::error!(error = %error, "handler failed; rejecting request");
                false
            }
            Err(Fault::Panicked(message)) => {
                tracing::error!(panic = %message, "handler panicked; rejecting request");
                false
            }
        }
    }
}

impl Default for Dapp {
    fn default() -> Self {
        Self::new()
    }
}

/// 执行处理器并把显式错误与 panic 都收敛为 [`Fault`]。
fn contain(run: impl FnOnce() -> HandlerResult) -> Result<HandlerOutcome, Fault> {
    match catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(error)) => Err(Fault::Failed(error)),
        Err(payload) => Err(Fault::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::request::{RollupData, encode_hex_payload};
    use tessera_core::rollup::{DelegateCallVoucher, EmitError, Voucher};
    use tessera_core::router::RouteMatch;

    struct NullRollup;

    impl Rollup for NullRollup {
        fn notice(&mut self, _payload: &str) -> Result<(), EmitError> {
            Ok(())
        }
        fn report(&mut self, _payload: &str) -> Result<(), EmitError> {
            Ok(())
        }
        fn voucher(&mut self, _voucher: &Voucher) -> Result<(), EmitError> {
            Ok(())
        }
        fn delegate_call_voucher(
            &mut self,
            _voucher: &DelegateCallVoucher,
        ) -> Result<(), EmitError> {
            Ok(())
        }
    }

    /// 对任意请求执行固定行为的桩路由器。
    struct StubRouter<F: Fn() -> HandlerResult> {
        behaviour: F,
    }

    impl<F: Fn() -> HandlerResult> Router for StubRouter<F> {
        fn get_handler<'req>(
            &'req self,
            _request: &'req RollupRequest,
        ) -> Option<RouteMatch<'req>> {
            Some(RouteMatch::new(move |_rollup| (self.behaviour)()))
        }
    }

    fn request(kind: RequestKind) -> RollupRequest {
        RollupRequest {
            kind,
            data: RollupData {
                metadata: None,
                payload: encode_hex_payload(b"payload"),
            },
        }
    }

    #[test]
    fn outcome_maps_to_accept_reject() {
        let mut dapp = Dapp::new();
        dapp.add_router(StubRouter {
            behaviour: || Ok(HandlerOutcome::Accept),
        });
        let mut rollup = NullRollup;
        assert!(dapp.handle(&mut rollup, &request(RequestKind::Advance)));
    }

    #[test]
    fn missing_route_falls_back_to_default_handler() {
        let mut dapp = Dapp::new();
        let mut rollup = NullRollup;
        // 初始默认处理器一律拒绝。
        assert!(!dapp.handle(&mut rollup, &request(RequestKind::Advance)));

        dapp.advance(|_rollup, _request| Ok(HandlerOutcome::Accept));
        assert!(dapp.handle(&mut rollup, &request(RequestKind::Advance)));
        // inspect 的默认处理器未改，仍拒绝。
        assert!(!dapp.handle(&mut rollup, &request(RequestKind::Inspect)));
    }

    #[test]
    fn erring_handler_is_contained_as_reject() {
        let mut dapp = Dapp::new();
        dapp.add_router(StubRouter {
            behaviour: || Err("boom".into()),
        });
        let mut rollup = NullRollup;
        assert!(!dapp.handle(&mut rollup, &request(RequestKind::Advance)));
    }

    #[test]
    fn panicking_handler_does_not_poison_the_next_request() {
        use std::cell::Cell;
        let mut dapp = Dapp::new();
        // 首次调用 panic，之后恢复正常，验证兜底不会中断处理循环。
        let first = Cell::new(true);
        dapp.add_router(StubRouter {
            behaviour: move || {
                if first.replace(false) {
                    panic!("handler exploded");
                }
                Ok(HandlerOutcome::Accept)
            },
        });
        let mut rollup = NullRollup;
        assert!(!dapp.handle(&mut rollup, &request(RequestKind::Advance)));
        assert!(dapp.handle(&mut rollup, &request(RequestKind::Advance)));
    }
}
