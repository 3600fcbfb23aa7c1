//! 应用地址中继路由。
//!
//! rollup 应用部署后并不知道自己的链上地址；地址中继合约会以一条 advance
//! 输入把 20 字节地址推送进来。本路由按中继合约的发送方门控接收该输入，
//! 存下地址供后续业务（如构造指向自身的 voucher）取用。

use std::cell::RefCell;
use std::rc::Rc;

use tessera_core::request::{RollupRequest, encode_hex_payload};
use tessera_core::router::{HandlerOutcome, RouteMatch, Router};
use tessera_router::{AbiRouteSpec, AbiRouter};

/// 接收并保存应用自身地址的路由。
pub struct DappAddressRouter {
    address: Rc<RefCell<Option<String>>>,
    router: AbiRouter,
}

impl DappAddressRouter {
    /// 以中继合约地址装配路由。
    pub fn new(relay_address: &str) -> Self {
        let address: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&address);
        let mut router = AbiRouter::with_namespace("dapp-address");
        router.advance(
            AbiRouteSpec::new("set_dapp_address")
                .msg_sender(relay_address)
                .summary("store the application address pushed by the relay"),
            move |_rollup, context| {
                let pushed = encode_hex_payload(context.args());
                tracing::info!(address = %pushed, "application address received");
                *slot.borrow_mut() = Some(pushed);
                Ok(HandlerOutcome::Accept)
            },
        );
        Self { address, router }
    }

    /// 已接收的应用地址（`0x` 前缀十六进制），未接收时为 `None`。
    pub fn address(&self) -> Option<String> {
        self.address.borrow().clone()
    }
}

impl Router for DappAddressRouter {
    fn get_handler<'req>(&'req self, request: &'req RollupRequest) -> Option<RouteMatch<'req>> {
        self.router.get_handler(request)
    }
}
