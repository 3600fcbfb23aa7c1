//! 组合路由：多个独立路由表合成一个分发面。
//!
//! 持有一组按注册顺序排列的路由器，逐个委托查询并返回首个非空结果。
//! 独立的 JSON、URL、ABI 路由表借此组合，无需集中注册表。

use tessera_core::request::RollupRequest;
use tessera_core::router::{RouteMatch, Router};

/// 按序委托的组合路由器。
#[derive(Default)]
pub struct MultiRouter {
    routers: Vec<Box<dyn Router>>,
}

impl MultiRouter {
    /// 构造空组合。
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个路由器，排在已注册者之后。
    pub fn add_router(&mut self, router: impl Router + 'static) {
        self.routers.push(Box::new(router));
    }

    /// 已挂载的路由器数量。
    pub fn len(&self) -> usize {
        self.routers.len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

impl Router for MultiRouter {
    fn get_handler<'req>(&'req self, request: &'req RollupRequest) -> Option<RouteMatch<'req>> {
        self.routers
            .iter()
            .find_map(|router| router.get_handler(request))
    }
}
