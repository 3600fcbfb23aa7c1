//! URL 路径模板路由。
//!
//! ## 匹配语义（What）
//! - 负载按 UTF-8 解释为路径文本，可带 `?query` 后缀；
//! - 模板中的 `{name}` 占位符在注册期编译为段模式：逐段比较，
//!   每个占位符捕获一个非空段（不跨越 `/`），段内允许字面前后缀；
//! - 命中要求请求类型相等且整条路径完全匹配；
//! - 查询串解析为“参数名到值列表”的多值映射：键重复时追加，
//!   空值与无 `=` 的裸键丢弃，`+` 还原为空格，键值均做百分号解码。
//!
//! ## 实现策略（How）
//! - 不引入正则：模板在注册期拆为字面段与捕获段，匹配是一次逐段线性走查，
//!   捕获与查询参数汇入 [`UrlParameters`]，经 [`UrlContext`] 暴露给处理器。

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;

use tessera_core::request::{RequestKind, RollupData, RollupRequest};
use tessera_core::rollup::Rollup;
use tessera_core::router::{HandlerResult, RouteMatch, Router};

use crate::error::RouteSpecError;

/// URL 路由处理器签名。
pub type UrlHandler = Box<dyn Fn(&mut dyn Rollup, &UrlContext<'_>) -> HandlerResult>;

/// 路径捕获与查询参数的参数包。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlParameters {
    /// 路径占位符捕获：占位名到捕获段。
    pub path_params: BTreeMap<String, String>,
    /// 查询参数：参数名到值列表（支持重复键）。
    pub query_params: BTreeMap<String, Vec<String>>,
}

/// 传给 URL 处理器的请求上下文。
pub struct UrlContext<'req> {
    request: &'req RollupRequest,
    params: &'req UrlParameters,
}

impl<'req> UrlContext<'req> {
    /// 原始请求。
    pub fn request(&self) -> &'req RollupRequest {
        self.request
    }

    /// 请求数据。
    pub fn data(&self) -> &'req RollupData {
        &self.request.data
    }

    /// 参数包。
    pub fn params(&self) -> &'req UrlParameters {
        self.params
    }
}

/// 编译后的模板段。
enum TemplateSegment {
    Literal(String),
    Capture {
        prefix: String,
        name: String,
        suffix: String,
    },
}

struct Template {
    segments: Vec<TemplateSegment>,
}

impl Template {
    /// 逐段匹配整条路径，命中时返回捕获映射。
    fn match_path(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() != self.segments.len() {
            return None;
        }
        let mut captures = BTreeMap::new();
        for (pattern, segment) in self.segments.iter().zip(segments) {
            match pattern {
                TemplateSegment::Literal(expected) => {
                    if expected != segment {
                        return None;
                    }
                }
                TemplateSegment::Capture {
                    prefix,
                    name,
                    suffix,
                } => {
                    let middle = segment.strip_prefix(prefix.as_str())?;
                    let middle = middle.strip_suffix(suffix.as_str())?;
                    if middle.is_empty() {
                        return None;
                    }
                    captures.insert(name.clone(), middle.to_string());
                }
            }
        }
        Some(captures)
    }
}

/// 将路径模板编译为段模式，注册期一次完成。
fn compile_template(template: &str) -> Result<Template, RouteSpecError> {
    let mut segments = Vec::new();
    for segment in template.split('/') {
        segments.push(compile_segment(template, segment)?);
    }
    Ok(Template { segments })
}

fn compile_segment(template: &str, segment: &str) -> Result<TemplateSegment, RouteSpecError> {
    let Some(open) = segment.find('{') else {
        if segment.contains('}') {
            return Err(RouteSpecError::UnbalancedBrace {
                template: template.to_string(),
            });
        }
        return Ok(TemplateSegment::Literal(segment.to_string()));
    };
    let close = segment.find('}').ok_or_else(|| RouteSpecError::UnbalancedBrace {
        template: template.to_string(),
    })?;
    if close < open {
        return Err(RouteSpecError::UnbalancedBrace {
            template: template.to_string(),
        });
    }
    let name = &segment[open + 1..close];
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if !head_ok || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(RouteSpecError::InvalidParameterName {
            template: template.to_string(),
        });
    }
    let suffix = &segment[close + 1..];
    if suffix.contains('{') || suffix.contains('}') {
        return Err(RouteSpecError::MultipleParameters {
            segment: segment.to_string(),
        });
    }
    Ok(TemplateSegment::Capture {
        prefix: segment[..open].to_string(),
        name: name.to_string(),
        suffix: suffix.to_string(),
    })
}

/// 解析查询串为多值映射。
fn parse_query(query: &str) -> BTreeMap<String, Vec<String>> {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let key = decode_component(key);
        let value = decode_component(value);
        params.entry(key).or_default().push(value);
    }
    params
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

struct UrlRoute {
    path: String,
    template: Template,
    kind: RequestKind,
    operation_id: String,
    handler: UrlHandler,
}

/// 基于路径模板的路由器。
#[derive(Default)]
pub struct UrlRouter {
    routes: Vec<UrlRoute>,
}

impl UrlRouter {
    /// 构造空路由器。
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册 advance 路由。
    pub fn advance(
        &mut self,
        path: &str,
        operation_id: impl Into<String>,
        handler: impl Fn(&mut dyn Rollup, &UrlContext<'_>) -> HandlerResult + 'static,
    ) -> Result<(), RouteSpecError> {
        self.register(path, RequestKind::Advance, operation_id.into(), handler)
    }

    /// 注册 inspect 路由。
    pub fn inspect(
        &mut self,
        path: &str,
        operation_id: impl Into<String>,
        handler: impl Fn(&mut dyn Rollup, &UrlContext<'_>) -> HandlerResult + 'static,
    ) -> Result<(), RouteSpecError> {
        self.register(path, RequestKind::Inspect, operation_id.into(), handler)
    }

    fn register(
        &mut self,
        path: &str,
        kind: RequestKind,
        operation_id: String,
        handler: impl Fn(&mut dyn Rollup, &UrlContext<'_>) -> HandlerResult + 'static,
    ) -> Result<(), RouteSpecError> {
        let template = compile_template(path)?;
        self.routes.push(UrlRoute {
            path: path.to_string(),
            template,
            kind,
            operation_id,
            handler: Box::new(handler),
        });
        Ok(())
    }
}

impl Router for UrlRouter {
    fn get_handler<'req>(&'req self, request: &'req RollupRequest) -> Option<RouteMatch<'req>> {
        let text = request.data.str_payload().ok()?;
        tracing::debug!(path = %text, "looking for URL routes");
        let (path, query) = match text.split_once('?') {
            Some((path, query)) => (path, query),
            None => (text.as_str(), ""),
        };
        for route in &self.routes {
            if route.kind != request.kind {
                continue;
            }
            let Some(path_params) = route.template.match_path(path) else {
                continue;
            };
            tracing::info!(
                path = %route.path,
                operation = %route.operation_id,
                "URL route matched"
            );
            let params = UrlParameters {
                path_params,
                query_params: parse_query(query),
            };
            return Some(RouteMatch::new(move |rollup| {
                let context = UrlContext {
                    request,
                    params: &params,
                };
                (route.handler)(rollup, &context)
            }));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::request::{RollupData, encode_hex_payload};
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

    fn request(kind: RequestKind, path: &str) -> RollupRequest {
        RollupRequest {
            kind,
            data: RollupData {
                metadata: None,
                payload: encode_hex_payload(path.as_bytes()),
            },
        }
    }

    #[test]
    fn template_captures_named_segment() {
        let mut router = UrlRouter::new();
        router
            .inspect("hello/{name}", "hello_name", |_rollup, context| {
                assert_eq!(context.params().path_params["name"], "Earth");
                Ok(HandlerOutcome::Accept)
            })
            .expect("模板合法");

        let req = request(RequestKind::Inspect, "hello/Earth");
        let bound = router.get_handler(&req).expect("应命中");
        let mut rollup = NullRollup;
        assert_eq!(
            bound.invoke(&mut rollup).expect("处理器应成功"),
            HandlerOutcome::Accept
        );
    }

    #[test]
    fn capture_does_not_cross_slashes() {
        let mut router = UrlRouter::new();
        router
            .inspect("hello/{name}", "hello_name", |_rollup, _context| {
                Ok(HandlerOutcome::Accept)
            })
            .expect("模板合法");
        assert!(router
            .get_handler(&request(RequestKind::Inspect, "hello/a/b"))
            .is_none());
        assert!(router
            .get_handler(&request(RequestKind::Inspect, "hello/"))
            .is_none());
    }

    #[test]
    fn kind_mismatch_never_matches() {
        let mut router = UrlRouter::new();
        router
            .advance("hello/", "hello_advance", |_rollup, _context| {
                Ok(HandlerOutcome::Accept)
            })
            .expect("模板合法");
        assert!(router
            .get_handler(&request(RequestKind::Inspect, "hello/"))
            .is_none());
        assert!(router
            .get_handler(&request(RequestKind::Advance, "hello/"))
            .is_some());
    }

    #[test]
    fn query_string_decodes_into_multimap() {
        let mut router = UrlRouter::new();
        router
            .inspect("hello/{name}", "hello_name", |_rollup, context| {
                let params = context.params();
                assert_eq!(params.query_params["suffix"], vec!["!"]);
                assert_eq!(params.query_params["tag"], vec!["a b", "c"]);
                assert!(!params.query_params.contains_key("empty"));
                Ok(HandlerOutcome::Accept)
            })
            .expect("模板合法");

        let req = request(
            RequestKind::Inspect,
            "hello/Earth?suffix=%21&tag=a+b&tag=c&empty=&bare",
        );
        let bound = router.get_handler(&req).expect("应命中");
        let mut rollup = NullRollup;
        bound.invoke(&mut rollup).expect("处理器应成功");
    }

    #[test]
    fn literal_prefix_and_suffix_inside_a_segment() {
        let mut router = UrlRouter::new();
        router
            .inspect("item-{id}.json", "item_json", |_rollup, context| {
                assert_eq!(context.params().path_params["id"], "42");
                Ok(HandlerOutcome::Accept)
            })
            .expect("模板合法");
        let req = request(RequestKind::Inspect, "item-42.json");
        let bound = router
            .get_handler(&req)
            .expect("应命中");
        let mut rollup = NullRollup;
        bound.invoke(&mut rollup).expect("处理器应成功");
    }

    #[test]
    fn first_registered_route_wins() {
        let mut router = UrlRouter::new();
        router
            .inspect("hello/{name}", "first", |_rollup, _context| {
                Ok(HandlerOutcome::Accept)
            })
            .expect("模板合法");
        router
            .inspect("hello/{other}", "second", |_rollup, _context| {
                Ok(HandlerOutcome::Reject)
            })
            .expect("模板合法");
        let req = request(RequestKind::Inspect, "hello/Earth");
        let bound = router
            .get_handler(&req)
            .expect("应命中");
        let mut rollup = NullRollup;
        assert_eq!(
            bound.invoke(&mut rollup).expect("处理器应成功"),
            HandlerOutcome::Accept
        );
    }

    #[test]
    fn malformed_templates_fail_at_registration() {
        let mut router = UrlRouter::new();
        let ok = |_rollup: &mut dyn Rollup, _context: &UrlContext<'_>| Ok(HandlerOutcome::Accept);
        assert!(matches!(
            router.inspect("hello/{name", "bad", ok),
            Err(RouteSpecError::UnbalancedBrace { .. })
        ));
        assert!(matches!(
            router.inspect("hello/{1name}", "bad", ok),
            Err(RouteSpecError::InvalidParameterName { .. })
        ));
        assert!(matches!(
            router.inspect("{a}{b}", "bad", ok),
            Err(RouteSpecError::MultipleParameters { .. })
        ));
    }

    #[test]
    fn non_utf8_payload_is_no_match() {
        let mut router = UrlRouter::new();
        router
            .inspect("hello/", "hello", |_rollup, _context| {
                Ok(HandlerOutcome::Accept)
            })
            .expect("模板合法");
        let req = RollupRequest {
            kind: RequestKind::Inspect,
            data: RollupData {
                metadata: None,
                payload: "0xff00ff".into(),
            },
        };
        assert!(router.get_handler(&req).is_none());
    }
}
