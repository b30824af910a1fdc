//! 拦截器编译时注册机制
//!
//! 仿照 controller 的注册方式，使用 inventory 实现编译时自动收集

use std::sync::Arc;

use crate::interceptor::{ActionInterceptor, InterceptorRegistry, MarkerKind};

/// 拦截器注册信息
pub struct InterceptorRegistration {
    pub kind: &'static str,
    pub create: fn() -> Arc<dyn ActionInterceptor>,
}

impl InterceptorRegistration {
    pub const fn new(kind: &'static str, create: fn() -> Arc<dyn ActionInterceptor>) -> Self {
        Self { kind, create }
    }
}

inventory::collect!(InterceptorRegistration);

/// 获取所有注册的拦截器
pub fn get_all_interceptors() -> Vec<&'static InterceptorRegistration> {
    inventory::iter::<InterceptorRegistration>
        .into_iter()
        .collect()
}

/// 构建拦截器注册表 - 使用编译时收集的拦截器
pub fn build_interceptor_registry_from_inventory() -> InterceptorRegistry {
    let registry = InterceptorRegistry::new();

    tracing::info!("Discovering action interceptors from inventory...");

    for registration in get_all_interceptors() {
        let interceptor = (registration.create)();
        tracing::info!(
            "Auto-registered action interceptor for marker '{}'",
            registration.kind
        );
        registry.register(MarkerKind::new(registration.kind), interceptor);
    }

    tracing::info!(
        "Action interceptor discovery completed: {} interceptors registered",
        registry.len()
    );

    registry
}

/// 注册拦截器的便捷宏
///
/// ```ignore
/// submit_interceptor!("logged", || Arc::new(LoggingInterceptor::new()));
/// ```
#[macro_export]
macro_rules! submit_interceptor {
    ($kind:expr, $create:expr) => {
        gryphon_core::inventory::submit! {
            $crate::interceptor_registry::InterceptorRegistration::new($kind, $create)
        }
    };
}
