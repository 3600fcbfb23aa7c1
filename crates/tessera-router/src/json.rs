//! JSON 内容路由。
//!
//! ## 匹配语义（What）
//! - 负载解析为 JSON 对象后，与各路由的过滤字典做子集包含比较：
//!   过滤器的每个键值对都必须在负载中等值出现，负载多出的键忽略不计；
//! - advance 与 inspect 各自维护路由表；首个注册的命中路由胜出；
//! - 负载不是合法 JSON、或不是对象时视为无匹配，属正常信号而非错误。

use serde_json::{Map, Value as JsonValue};

use tessera_core::request::{RequestKind, RollupData, RollupRequest};
use tessera_core::rollup::Rollup;
use tessera_core::router::{HandlerResult, RouteMatch, Router};

use crate::error::RouteSpecError;

/// JSON 路由处理器签名。
pub type JsonHandler = Box<dyn Fn(&mut dyn Rollup, &JsonContext<'_>) -> HandlerResult>;

/// 传给 JSON 处理器的请求上下文：原始请求与解析后的负载按需取用。
pub struct JsonContext<'req> {
    request: &'req RollupRequest,
    payload: &'req JsonValue,
}

impl<'req> JsonContext<'req> {
    /// 原始请求。
    pub fn request(&self) -> &'req RollupRequest {
        self.request
    }

    /// 请求数据。
    pub fn data(&self) -> &'req RollupData {
        &self.request.data
    }

    /// 解析后的 JSON 负载。
    pub fn payload(&self) -> &'req JsonValue {
        self.payload
    }
}

struct JsonRoute {
    filter: Map<String, JsonValue>,
    handler: JsonHandler,
}

/// 基于过滤字典子集包含的内容路由器。
#[derive(Default)]
pub struct JsonRouter {
    advance_routes: Vec<JsonRoute>,
    inspect_routes: Vec<JsonRoute>,
}

impl JsonRouter {
    /// 构造空路由器。
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册 advance 路由；过滤器必须是 JSON 对象。
    pub fn advance(
        &mut self,
        filter: JsonValue,
        handler: impl Fn(&mut dyn Rollup, &JsonContext<'_>) -> HandlerResult + 'static,
    ) -> Result<(), RouteSpecError> {
        self.advance_routes.push(Self::route(filter, handler)?);
        Ok(())
    }

    /// 注册 inspect 路由；过滤器必须是 JSON 对象。
    pub fn inspect(
        &mut self,
        filter: JsonValue,
        handler: impl Fn(&mut dyn Rollup, &JsonContext<'_>) -> HandlerResult + 'static,
    ) -> Result<(), RouteSpecError> {
        self.inspect_routes.push(Self::route(filter, handler)?);
        Ok(())
    }

    fn route(
        filter: JsonValue,
        handler: impl Fn(&mut dyn Rollup, &JsonContext<'_>) -> HandlerResult + 'static,
    ) -> Result<JsonRoute, RouteSpecError> {
        match filter {
            JsonValue::Object(filter) => Ok(JsonRoute {
                filter,
                handler: Box::new(handler),
            }),
            _ => Err(RouteSpecError::NonObjectFilter),
        }
    }
}

/// 过滤器的每个键值对都在负载中等值出现。
fn contains_subset(filter: &Map<String, JsonValue>, payload: &Map<String, JsonValue>) -> bool {
    filter
        .iter()
        .all(|(key, expected)| payload.get(key) == Some(expected))
}

impl Router for JsonRouter {
    fn get_handler<'req>(&'req self, request: &'req RollupRequest) -> Option<RouteMatch<'req>> {
        let payload = request.data.json_payload().ok()?;
        let routes = match request.kind {
            RequestKind::Advance => &self.advance_routes,
            RequestKind::Inspect => &self.inspect_routes,
        };
        let route = {
            let object = payload.as_object()?;
            routes.iter().find(|route| contains_subset(&route.filter, object))?
        };
        tracing::debug!(kind = %request.kind, "json route matched");
        Some(RouteMatch::new(move |rollup| {
            let context = JsonContext {
                request,
                payload: &payload,
            };
            (route.handler)(rollup, &context)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_core::request::encode_hex_payload;
    use tessera_core::rollup::{DelegateCallVoucher, EmitError, Voucher};
    use tessera_core::router::HandlerOutcome;

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

    fn advance_request(payload: &str) -> RollupRequest {
        RollupRequest {
            kind: RequestKind::Advance,
            data: RollupData {
                metadata: None,
                payload: encode_hex_payload(payload.as_bytes()),
            },
        }
    }

    fn invoke(router: &JsonRouter, request: &RollupRequest) -> Option<HandlerResult> {
        let bound = router.get_handler(request)?;
        let mut rollup = NullRollup;
        Some(bound.invoke(&mut rollup))
    }

    #[test]
    fn subset_containment_ignores_extra_keys() {
        let mut router = JsonRouter::new();
        router
            .advance(json!({"op": "set"}), |_rollup, context| {
                assert_eq!(context.payload()["key"], "a");
                Ok(HandlerOutcome::Accept)
            })
            .expect("过滤器为对象");

        let request = advance_request(r#"{"op":"set","key":"a"}"#);
        let outcome = invoke(&router, &request).expect("应命中").expect("处理器应成功");
        assert_eq!(outcome, HandlerOutcome::Accept);

        let miss = advance_request(r#"{"op":"get"}"#);
        assert!(router.get_handler(&miss).is_none());
    }

    #[test]
    fn first_registered_route_wins() {
        let mut router = JsonRouter::new();
        router
            .advance(json!({"op": "set"}), |_rollup, _context| {
                Ok(HandlerOutcome::Accept)
            })
            .expect("过滤器为对象");
        router
            .advance(json!({}), |_rollup, _context| Ok(HandlerOutcome::Reject))
            .expect("过滤器为对象");

        let request = advance_request(r#"{"op":"set"}"#);
        let outcome = invoke(&router, &request).expect("应命中").expect("处理器应成功");
        assert_eq!(outcome, HandlerOutcome::Accept);
    }

    #[test]
    fn malformed_json_is_no_match() {
        let mut router = JsonRouter::new();
        router
            .advance(json!({}), |_rollup, _context| Ok(HandlerOutcome::Accept))
            .expect("过滤器为对象");
        let request = advance_request("not json at all");
        assert!(router.get_handler(&request).is_none());
    }

    #[test]
    fn request_kind_selects_the_route_table() {
        let mut router = JsonRouter::new();
        router
            .inspect(json!({"op": "get"}), |_rollup, _context| {
                Ok(HandlerOutcome::Accept)
            })
            .expect("过滤器为对象");
        // advance 请求不会命中 inspect 表。
        let request = advance_request(r#"{"op":"get"}"#);
        assert!(router.get_handler(&request).is_none());
    }

    #[test]
    fn non_object_filter_is_rejected_at_registration() {
        let mut router = JsonRouter::new();
        let result = router.advance(json!(["not", "an", "object"]), |_rollup, _context| {
            Ok(HandlerOutcome::Accept)
        });
        assert_eq!(result, Err(RouteSpecError::NonObjectFilter));
    }
}
