//! 控制器编译时注册机制
//!
//! 使用 inventory 在编译时收集控制器描述符，启动时一次性
//! 构建注册表，避免运行时扫描。

use crate::action::{ControllerDescriptor, ControllerRegistry};

/// 控制器注册信息
pub struct ControllerRegistration {
    pub name: &'static str,
    pub create: fn() -> ControllerDescriptor,
}

impl ControllerRegistration {
    pub const fn new(name: &'static str, create: fn() -> ControllerDescriptor) -> Self {
        Self { name, create }
    }
}

inventory::collect!(ControllerRegistration);

/// 获取所有注册的控制器
pub fn get_all_controllers() -> Vec<&'static ControllerRegistration> {
    inventory::iter::<ControllerRegistration>
        .into_iter()
        .collect()
}

/// 构建控制器注册表 - 使用编译时收集的控制器
pub fn build_controller_registry_from_inventory() -> ControllerRegistry {
    let registry = ControllerRegistry::new();

    tracing::info!("Discovering controllers from inventory...");

    for registration in get_all_controllers() {
        tracing::info!("Auto-registered controller: {}", registration.name);
        registry.register((registration.create)());
    }

    tracing::info!(
        "Controller discovery completed: {} controllers registered",
        registry.len()
    );

    registry
}

/// 注册控制器的便捷宏
///
/// ```ignore
/// submit_controller!("demo.user.UserController", UserController::descriptor);
/// ```
#[macro_export]
macro_rules! submit_controller {
    ($name:expr, $create:expr) => {
        gryphon_core::inventory::submit! {
            $crate::controller::ControllerRegistration::new($name, $create)
        }
    };
}
