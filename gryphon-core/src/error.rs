use thiserror::Error;

/// 容器统一结果类型
pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

/// 容器错误类型
#[derive(Error, Debug)]
pub enum ContainerError {
    /// 请求的 Bean 不存在
    #[error("Bean not found: {0}")]
    BeanNotFound(String),

    /// Bean 名称重复注册
    #[error("Bean already exists: {0}")]
    BeanAlreadyExists(String),

    /// Bean 工厂执行失败
    #[error("Bean creation failed: {0}")]
    BeanCreationFailed(String),

    /// 类型转换失败
    #[error("Type mismatch: expected {expected}")]
    TypeMismatch { expected: String },

    /// 日志系统初始化失败
    #[error("Logging initialization failed: {0}")]
    LoggingInitFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
