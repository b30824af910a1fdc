//! 分发层错误类型

use thiserror::Error;

/// 处理器和拦截器返回的错误类型
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// 参数绑定错误
#[derive(Debug, Error)]
pub enum BindError {
    /// 没有绑定器支持请求的内容类型
    #[error("No binder available for content type '{content_type}'")]
    UnsupportedContentType { content_type: String },

    /// 请求体解析失败
    #[error("Failed to parse request body: {0}")]
    BodyParse(String),

    /// 参数值无法转换为目标类型
    #[error("Failed to bind parameter '{name}' to {target_type}: {message}")]
    Conversion {
        name: String,
        target_type: String,
        message: String,
    },

    /// 必需参数未绑定
    #[error("Parameter '{name}' was not bound")]
    Missing { name: String },
}

/// 动作解析与执行错误
#[derive(Debug, Error)]
pub enum ActionError {
    /// 控制器实例化失败
    #[error("Failed to construct controller '{type_name}': {message}")]
    Construction { type_name: String, message: String },

    /// 参数绑定失败，请求直接终止
    #[error(transparent)]
    Bind(#[from] BindError),

    /// 控制器实例与处理器期望的类型不符
    #[error("Controller type mismatch: expected {expected}")]
    ControllerType { expected: String },

    /// 动作执行失败且没有拦截器处理该异常
    #[error("Action '{action}' failed: {message}")]
    Unhandled { action: String, message: String },
}
