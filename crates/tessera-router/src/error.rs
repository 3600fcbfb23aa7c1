//! 注册期校验错误。
//!
//! 路由规格在注册时整体校验，畸形规格立即失败，不会拖到请求处理期。

use thiserror::Error;

/// 路由注册规格非法。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouteSpecError {
    /// JSON 路由的过滤器必须是 JSON 对象。
    #[error("route filter must be a JSON object")]
    NonObjectFilter,
    /// 路径模板的花括号不配对。
    #[error("unbalanced braces in path template `{template}`")]
    UnbalancedBrace {
        /// 原始模板文本。
        template: String,
    },
    /// 占位符名称非法（须为 `[A-Za-z_][A-Za-z0-9_]*`）。
    #[error("invalid parameter name in path template `{template}`")]
    InvalidParameterName {
        /// 原始模板文本。
        template: String,
    },
    /// 单个路径段最多声明一个占位符。
    #[error("path template segment `{segment}` declares more than one parameter")]
    MultipleParameters {
        /// 出错的段文本。
        segment: String,
    },
}
