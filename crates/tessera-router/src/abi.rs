//! ABI 头/发送方路由。
//!
//! ## 匹配语义（What）
//! - 负载按原始字节解释（十六进制解码失败即无匹配）；
//! - 每条操作可选两道门：要求的发送方（与请求元数据大小写不敏感比较，
//!   无元数据视为不满足）与要求的头（其字节必须是负载前缀）；
//!   两道门都缺省的操作是通配，匹配任何负载；
//! - advance 与 inspect 各自维护操作表，按注册顺序测试，
//!   首个全部门控满足的操作胜出；
//! - 头命中后，处理器经 [`AbiContext::args`] 拿到头之后的有效参数字节。

use tessera_codec_abi::AbiHeader;
use tessera_core::request::{RequestKind, RollupData, RollupRequest};
use tessera_core::rollup::Rollup;
use tessera_core::router::{HandlerResult, RouteMatch, Router};

/// ABI 路由处理器签名。
pub type AbiHandler = Box<dyn Fn(&mut dyn Rollup, &AbiContext<'_>) -> HandlerResult>;

/// 传给 ABI 处理器的请求上下文。
pub struct AbiContext<'req> {
    request: &'req RollupRequest,
    payload: &'req [u8],
    header_len: usize,
}

impl<'req> AbiContext<'req> {
    /// 原始请求。
    pub fn request(&self) -> &'req RollupRequest {
        self.request
    }

    /// 请求数据。
    pub fn data(&self) -> &'req RollupData {
        &self.request.data
    }

    /// 完整负载字节。
    pub fn payload(&self) -> &'req [u8] {
        self.payload
    }

    /// 头之后的有效参数字节；无头操作等于完整负载。
    pub fn args(&self) -> &'req [u8] {
        &self.payload[self.header_len..]
    }
}

/// 一条 ABI 操作的注册规格。
#[derive(Clone, Debug, Default)]
pub struct AbiRouteSpec {
    operation_id: String,
    header: Option<AbiHeader>,
    msg_sender: Option<String>,
    summary: Option<String>,
    description: Option<String>,
}

impl AbiRouteSpec {
    /// 以操作标识构造规格。
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            ..Self::default()
        }
    }

    /// 要求负载以该头的字节开头。
    pub fn header(mut self, header: AbiHeader) -> Self {
        self.header = Some(header);
        self
    }

    /// 要求请求发送方等于该地址（大小写不敏感）。
    pub fn msg_sender(mut self, sender: impl Into<String>) -> Self {
        self.msg_sender = Some(sender.into().to_lowercase());
        self
    }

    /// 一句话摘要，仅用于目录展示。
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// 详细描述，仅用于目录展示。
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// 已注册操作的只读描述，面向目录与调试输出。
#[derive(Clone, Debug)]
pub struct AbiOperationInfo {
    /// 操作标识。
    pub operation_id: String,
    /// 请求类型。
    pub kind: RequestKind,
    /// 所属命名空间。
    pub namespace: String,
    /// 摘要。
    pub summary: Option<String>,
    /// 描述。
    pub description: Option<String>,
}

struct AbiOperation {
    info: AbiOperationInfo,
    header_bytes: Option<Vec<u8>>,
    msg_sender: Option<String>,
    handler: AbiHandler,
}

impl AbiOperation {
    /// 两道门控全部满足才算命中。
    fn matches(&self, request: &RollupRequest, payload: &[u8]) -> bool {
        if let Some(required) = &self.msg_sender {
            let Some(metadata) = &request.data.metadata else {
                return false;
            };
            if !metadata.msg_sender.eq_ignore_ascii_case(required) {
                return false;
            }
        }
        if let Some(header) = &self.header_bytes
            && !payload.starts_with(header)
        {
            return false;
        }
        true
    }
}

/// 基于头前缀与发送方门控的路由器。
#[derive(Default)]
pub struct AbiRouter {
    namespace: String,
    advance_ops: Vec<AbiOperation>,
    inspect_ops: Vec<AbiOperation>,
}

impl AbiRouter {
    /// 构造空路由器。
    pub fn new() -> Self {
        Self::default()
    }

    /// 带命名空间构造，命名空间随操作记入目录。
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// 注册 advance 操作。头字节在注册期一次性产出。
    pub fn advance(
        &mut self,
        spec: AbiRouteSpec,
        handler: impl Fn(&mut dyn Rollup, &AbiContext<'_>) -> HandlerResult + 'static,
    ) {
        let operation = self.operation(spec, RequestKind::Advance, Box::new(handler));
        self.advance_ops.push(operation);
    }

    /// 注册 inspect 操作。
    pub fn inspect(
        &mut self,
        spec: AbiRouteSpec,
        handler: impl Fn(&mut dyn Rollup, &AbiContext<'_>) -> HandlerResult + 'static,
    ) {
        let operation = self.operation(spec, RequestKind::Inspect, Box::new(handler));
        self.inspect_ops.push(operation);
    }

    /// 注册表的只读目录视图，按 advance、inspect 顺序列出。
    pub fn operations(&self) -> impl Iterator<Item = &AbiOperationInfo> {
        self.advance_ops
            .iter()
            .chain(self.inspect_ops.iter())
            .map(|operation| &operation.info)
    }

    fn operation(&self, spec: AbiRouteSpec, kind: RequestKind, handler: AbiHandler) -> AbiOperation {
        AbiOperation {
            info: AbiOperationInfo {
                operation_id: spec.operation_id,
                kind,
                namespace: self.namespace.clone(),
                summary: spec.summary,
                description: spec.description,
            },
            header_bytes: spec.header.as_ref().map(AbiHeader::to_bytes),
            msg_sender: spec.msg_sender,
            handler,
        }
    }
}

impl Router for AbiRouter {
    fn get_handler<'req>(&'req self, request: &'req RollupRequest) -> Option<RouteMatch<'req>> {
        let payload = request.data.bytes_payload().ok()?;
        let ops = match request.kind {
            RequestKind::Advance => &self.advance_ops,
            RequestKind::Inspect => &self.inspect_ops,
        };
        let operation = ops.iter().find(|op| op.matches(request, &payload))?;
        tracing::debug!(
            operation = %operation.info.operation_id,
            "ABI route matched"
        );
        let header_len = operation
            .header_bytes
            .as_ref()
            .map(Vec::len)
            .unwrap_or(0);
        Some(RouteMatch::new(move |rollup| {
            let context = AbiContext {
                request,
                payload: &payload,
                header_len,
            };
            (operation.handler)(rollup, &context)
        }))
    }
}
