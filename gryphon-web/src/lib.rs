// gryphon-web: 控制器分发层
//
// 把 "控制器.方法" 形式的动作名解析为可调用的方法动作，
// 提供参数绑定、拦截器和控制器实例缓存：
// - 字符串键的控制器注册表，不依赖运行时反射
// - 按内容类型选择的参数绑定器（JSON / multipart / 表单）
// - 标记驱动的拦截器（before / after / exception 三阶段）
// - 并发安全的控制器实例缓存

pub mod action;
pub mod binder;
pub mod constants;
pub mod controller;
pub mod error;
pub mod http_binder;
pub mod interceptor;
pub mod interceptor_registry;
pub mod introspection;
pub mod json_binder;
pub mod multipart;
pub mod path_binder;
pub mod request;
pub mod resolver;

// 重新导出常用类型
pub use action::{
    typed_handler, ControllerDescriptor, ControllerRegistry, Invoker, MethodAction,
    MethodDescriptor,
};
pub use binder::{ActionMethodBinder, BinderSet, ParameterBinderSet};
pub use constants::*;
pub use controller::{build_controller_registry_from_inventory, ControllerRegistration};
pub use error::{ActionError, BindError, HandlerError};
pub use http_binder::HttpBinder;
pub use interceptor::{
    ActionInterceptor, BoundInterceptor, InterceptorRegistry, Marker, MarkerKind,
};
pub use interceptor_registry::{
    build_interceptor_registry_from_inventory, InterceptorRegistration,
};
pub use introspection::{ActionArguments, BoundValue, ParameterDescription, ParameterType};
pub use json_binder::JsonBinder;
pub use multipart::{MultipartBinder, MultipartProperties, UploadedFile};
pub use path_binder::PathVariableBinder;
pub use request::{ActionRequest, ActionResponse, RouteType};
pub use resolver::MethodActionResolver;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::action::{
        typed_handler, ControllerDescriptor, ControllerRegistry, MethodAction, MethodDescriptor,
    };
    pub use crate::binder::{ActionMethodBinder, BinderSet};
    pub use crate::error::{ActionError, BindError, HandlerError};
    pub use crate::interceptor::{ActionInterceptor, InterceptorRegistry, Marker, MarkerKind};
    pub use crate::introspection::{
        ActionArguments, BoundValue, ParameterDescription, ParameterType,
    };
    pub use crate::multipart::{MultipartProperties, UploadedFile};
    pub use crate::request::{ActionRequest, ActionResponse, RouteType};
    pub use crate::resolver::MethodActionResolver;
    pub use gryphon_core::prelude::*;
}
