//! 动作解析与执行
//!
//! `MethodActionResolver` 负责把动作名解析为 `MethodAction`，
//! 并按 绑定 -> before -> 调用 -> after 的顺序执行；绑定失败
//! 直接终止请求，before/调用/after 阶段出错时进入 exception
//! 阶段，由拦截器决定是否接管该错误。

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use gryphon_core::{Container, InjectionContext};
use parking_lot::RwLock;
use serde_json::Value;

use crate::action::{
    split_action_name, ControllerRegistry, MethodAction,
};
use crate::binder::BinderSet;
use crate::controller::build_controller_registry_from_inventory;
use crate::error::{ActionError, HandlerError};
use crate::http_binder::HttpBinder;
use crate::interceptor::InterceptorRegistry;
use crate::interceptor_registry::build_interceptor_registry_from_inventory;
use crate::introspection::ActionArguments;
use crate::json_binder::JsonBinder;
use crate::multipart::{MultipartBinder, MultipartProperties};
use crate::request::{ActionRequest, ActionResponse};

type ControllerInstance = Arc<dyn Any + Send + Sync>;

/// 方法动作解析器
pub struct MethodActionResolver {
    container: Arc<InjectionContext>,
    controllers: ControllerRegistry,
    interceptors: InterceptorRegistry,
    binders: BinderSet,
    instances: RwLock<HashMap<String, ControllerInstance>>,
    cache_enabled: bool,
}

impl MethodActionResolver {
    /// 创建解析器，使用默认绑定器链
    ///
    /// JSON 绑定器排在表单/查询串绑定器之前，multipart 绑定器
    /// 处理文件上传，HTTP 绑定器兜底。
    pub fn new(container: Arc<InjectionContext>) -> Self {
        let multipart = MultipartProperties::from_environment(container.environment());
        let binders = BinderSet::new()
            .with_binder(Arc::new(JsonBinder))
            .with_binder(Arc::new(MultipartBinder::new(multipart)))
            .with_binder(Arc::new(HttpBinder));

        Self {
            container,
            controllers: ControllerRegistry::new(),
            interceptors: InterceptorRegistry::new(),
            binders,
            instances: RwLock::new(HashMap::new()),
            cache_enabled: true,
        }
    }

    /// 创建解析器并从 inventory 装载控制器和拦截器
    pub fn from_inventory(container: Arc<InjectionContext>) -> Self {
        let mut resolver = Self::new(container);
        resolver.controllers = build_controller_registry_from_inventory();
        resolver.interceptors = build_interceptor_registry_from_inventory();
        resolver
    }

    /// 设置是否缓存控制器实例
    ///
    /// 关闭缓存后每次分发都向容器请求新实例。
    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    pub fn interceptors(&self) -> &InterceptorRegistry {
        &self.interceptors
    }

    /// 尝试把动作名解析为 `MethodAction`
    ///
    /// 名称格式错误、控制器未注册或方法不存在时返回 `None`，
    /// 让路由层可以继续尝试其他解析方式。
    pub fn create_action_if_possible(&self, action_name: &str) -> Option<MethodAction> {
        let (controller_name, method_name) = match split_action_name(action_name) {
            Some(parts) => parts,
            None => {
                tracing::debug!("Action name '{}' is not of the form controller.method", action_name);
                return None;
            }
        };

        let descriptor = match self.controllers.lookup(controller_name) {
            Some(descriptor) => descriptor,
            None => {
                tracing::debug!("No controller registered for '{}'", controller_name);
                return None;
            }
        };

        let method = match descriptor.method(method_name) {
            Some(method) => method,
            None => {
                tracing::debug!(
                    "Controller '{}' has no method '{}'",
                    controller_name,
                    method_name
                );
                return None;
            }
        };

        // 拦截器在创建时解析一次，动作持有结果不再查注册表
        let interceptors = self.interceptors.find_interceptors(method.markers());
        Some(MethodAction::from_descriptor(&descriptor, method, interceptors))
    }

    /// 预热动作的控制器实例
    ///
    /// 在启动阶段调用，让实例化失败尽早暴露。
    pub fn initialise(&self, action: &MethodAction) -> Result<(), ActionError> {
        self.get_or_create_controller(action).map(|_| ())
    }

    /// 执行已解析的动作
    pub async fn resolve(
        &self,
        action: &MethodAction,
        request: &ActionRequest,
        response: &mut ActionResponse,
        path_variables: &HashMap<String, String>,
    ) -> Result<Value, ActionError> {
        tracing::debug!(action = %action, method = %request.method(), path = request.path(), "Resolving action");

        let controller = self.get_or_create_controller(action)?;

        // 绑定发生在拦截器管线之外，绑定失败不进入 exception 阶段
        let mut arguments = ActionArguments::new();
        self.binders
            .bind(action.parameters(), request, path_variables, &mut arguments)
            .await?;

        match self
            .execute(action, controller, arguments, request, response)
            .await
        {
            Ok(result) => Ok(result),
            Err(error) => {
                for (marker, interceptor) in action.interceptors() {
                    if let Some(result) = interceptor
                        .exception(marker.config(), &error, request, response)
                        .await
                    {
                        tracing::debug!(
                            action = %action,
                            marker = %marker.kind(),
                            "Exception handled by interceptor"
                        );
                        return Ok(result);
                    }
                }

                tracing::warn!(action = %action, error = %error, "Action failed with unhandled error");
                Err(ActionError::Unhandled {
                    action: action.name(),
                    message: error.to_string(),
                })
            }
        }
    }

    async fn execute(
        &self,
        action: &MethodAction,
        controller: ControllerInstance,
        arguments: ActionArguments,
        request: &ActionRequest,
        response: &mut ActionResponse,
    ) -> Result<Value, HandlerError> {
        // before 阶段：第一个返回值的拦截器短路后续拦截器和方法调用
        let mut short_circuit = None;
        for (marker, interceptor) in action.interceptors() {
            if let Some(result) = interceptor.before(marker.config(), request, response).await? {
                tracing::debug!(action = %action, marker = %marker.kind(), "Invocation short-circuited by interceptor");
                short_circuit = Some(result);
                break;
            }
        }

        let mut result = match short_circuit {
            Some(result) => result,
            None => (action.invoker())(controller, arguments).await?,
        };

        // after 阶段：全部执行，后出现的返回值覆盖先出现的
        for (marker, interceptor) in action.interceptors() {
            if let Some(replacement) = interceptor
                .after(marker.config(), &result, request, response)
                .await?
            {
                result = replacement;
            }
        }

        Ok(result)
    }

    fn get_or_create_controller(
        &self,
        action: &MethodAction,
    ) -> Result<ControllerInstance, ActionError> {
        if !self.cache_enabled {
            return self.create_controller(action);
        }

        {
            let instances = self.instances.read();
            if let Some(instance) = instances.get(action.controller()) {
                return Ok(Arc::clone(instance));
            }
        }

        // 写锁下二次检查，并发首次分发时至多实例化一次
        let mut instances = self.instances.write();
        if let Some(instance) = instances.get(action.controller()) {
            return Ok(Arc::clone(instance));
        }

        let instance = self.create_controller(action)?;
        instances.insert(action.controller().to_string(), Arc::clone(&instance));
        Ok(instance)
    }

    fn create_controller(&self, action: &MethodAction) -> Result<ControllerInstance, ActionError> {
        self.container
            .get_bean(action.bean_name())
            .map_err(|e| ActionError::Construction {
                type_name: action.controller_type().to_string(),
                message: e.to_string(),
            })
    }
}
