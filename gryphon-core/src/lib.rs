// gryphon-core: 类似 Spring Boot 的依赖注入容器
//
// 提供类型安全的依赖注入功能，支持：
// - 单例和原型作用域
// - 函数式 Bean 工厂
// - 多源配置环境（Environment / PropertySource）
// - 日志初始化

pub mod bean;
pub mod config;
pub mod container;
pub mod error;
pub mod logging;
pub mod scope;

// 重新导出常用类型
pub use bean::{BeanDefinition, BeanFactory, FunctionFactory};
pub use config::{
    ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource,
    TomlPropertySource,
};
pub use container::{Container, InjectionContext};
pub use error::{ContainerError, ContainerResult};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use scope::Scope;

// 导出 inventory，供注册宏使用
pub use inventory;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::bean::{BeanDefinition, BeanFactory, FunctionFactory};
    pub use crate::config::{
        self, ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource,
        PropertySource, TomlPropertySource,
    };
    pub use crate::container::{Container, InjectionContext};
    pub use crate::error::{ContainerError, ContainerResult};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::scope::Scope;
    // Re-export anyhow for convenience
    pub use anyhow::{anyhow, Context};
}
