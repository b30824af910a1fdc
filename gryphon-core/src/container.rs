use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    bean::{BeanDefinition, FunctionFactory},
    config::Environment,
    error::{ContainerError, ContainerResult},
    Scope,
};

/// 容器 trait - 定义依赖注入容器的核心接口
pub trait Container: Send + Sync {
    /// 注册 Bean 定义
    fn register(&self, definition: BeanDefinition) -> ContainerResult<()>;

    /// 通过名称获取 Bean
    fn get_bean(&self, name: &str) -> ContainerResult<Arc<dyn Any + Send + Sync>>;

    /// 通过类型获取 Bean
    fn get_bean_by_type<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>>;

    /// 检查是否包含指定名称的 Bean
    fn contains_bean(&self, name: &str) -> bool;

    /// 检查是否包含指定类型的 Bean
    fn contains_bean_by_type<T: Any + Send + Sync>(&self) -> bool;

    /// 获取所有 Bean 的名称
    fn get_bean_names(&self) -> Vec<String>;
}

/// 注入上下文 - Container 的默认实现
///
/// 类似 Spring 的 BeanFactory：持有 Bean 定义、单例缓存和配置环境。
/// 单例创建使用双重检查写锁，保证并发首次访问时至多创建一次。
pub struct InjectionContext {
    /// Bean 定义存储
    definitions: RwLock<HashMap<String, BeanDefinition>>,

    /// 单例 Bean 缓存
    singletons: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,

    /// 类型到名称的映射
    type_to_name: RwLock<HashMap<TypeId, String>>,

    /// 配置环境
    environment: Arc<Environment>,
}

impl InjectionContext {
    /// 创建新的注入上下文
    pub fn new() -> Self {
        Self::with_environment(Arc::new(Environment::new()))
    }

    /// 使用指定 Environment 创建注入上下文
    pub fn with_environment(environment: Arc<Environment>) -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
            singletons: RwLock::new(HashMap::new()),
            type_to_name: RwLock::new(HashMap::new()),
            environment,
        }
    }

    /// 获取 Environment
    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    /// 注册单例 Bean
    pub fn register_singleton<T, F>(
        &self,
        name: impl Into<String>,
        factory: F,
    ) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
        F: Fn() -> ContainerResult<T> + Send + Sync + 'static,
    {
        let definition = BeanDefinition::new(name.into(), FunctionFactory::new(factory))
            .with_scope(Scope::Singleton);
        self.register(definition)
    }

    /// 注册原型 Bean
    pub fn register_prototype<T, F>(
        &self,
        name: impl Into<String>,
        factory: F,
    ) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
        F: Fn() -> ContainerResult<T> + Send + Sync + 'static,
    {
        let definition = BeanDefinition::new(name.into(), FunctionFactory::new(factory))
            .with_scope(Scope::Prototype);
        self.register(definition)
    }

    /// 创建 Bean 实例
    fn create_bean(&self, name: &str) -> ContainerResult<Arc<dyn Any + Send + Sync>> {
        let definitions = self.definitions.read();

        let definition = definitions
            .get(name)
            .ok_or_else(|| ContainerError::BeanNotFound(name.to_string()))?;

        let instance = definition
            .factory
            .create()
            .map_err(|e| ContainerError::BeanCreationFailed(format!("{}: {}", name, e)))?;

        Ok(Arc::from(instance))
    }
}

impl Default for InjectionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for InjectionContext {
    fn register(&self, definition: BeanDefinition) -> ContainerResult<()> {
        let name = definition.name.clone();
        let type_id = definition.factory.type_id();
        let type_name = definition.factory.type_name().to_string();

        {
            let definitions = self.definitions.read();
            if definitions.contains_key(&name) {
                tracing::warn!("Bean '{}' already exists, registration failed", name);
                return Err(ContainerError::BeanAlreadyExists(name));
            }
        }

        {
            let mut definitions = self.definitions.write();
            definitions.insert(name.clone(), definition);
        }

        {
            let mut type_to_name = self.type_to_name.write();
            type_to_name.insert(type_id, name.clone());
        }

        tracing::debug!(
            "Bean definition registered: name='{}', type='{}'",
            name,
            type_name
        );
        Ok(())
    }

    fn get_bean(&self, name: &str) -> ContainerResult<Arc<dyn Any + Send + Sync>> {
        let scope = {
            let definitions = self.definitions.read();

            let definition = definitions
                .get(name)
                .ok_or_else(|| ContainerError::BeanNotFound(name.to_string()))?;

            definition.scope
        };

        match scope {
            Scope::Singleton => {
                // 快速路径：读锁查缓存
                {
                    let singletons = self.singletons.read();
                    if let Some(bean) = singletons.get(name) {
                        return Ok(Arc::clone(bean));
                    }
                }

                // 慢速路径：写锁下二次检查后创建，保证并发下至多创建一次
                let mut singletons = self.singletons.write();
                if let Some(bean) = singletons.get(name) {
                    return Ok(Arc::clone(bean));
                }

                tracing::info!("Creating shared instance of singleton bean '{}'", name);
                let bean = self.create_bean(name)?;
                singletons.insert(name.to_string(), Arc::clone(&bean));
                Ok(bean)
            }
            Scope::Prototype => {
                tracing::debug!("Creating new instance of prototype bean '{}'", name);
                self.create_bean(name)
            }
        }
    }

    fn get_bean_by_type<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>> {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        // 首先尝试通过 TypeId 查找
        let name_opt = {
            let type_to_name = self.type_to_name.read();
            type_to_name.get(&type_id).cloned()
        };

        // TypeId 查找失败时回退到类型名称匹配
        let name_opt = name_opt.or_else(|| {
            let definitions = self.definitions.read();
            definitions
                .iter()
                .find(|(_, definition)| definition.factory.type_name() == type_name)
                .map(|(name, _)| name.clone())
        });

        match name_opt {
            Some(name) => {
                let bean = self.get_bean(&name)?;
                bean.downcast::<T>()
                    .map_err(|_| ContainerError::TypeMismatch {
                        expected: type_name.to_string(),
                    })
            }
            None => Err(ContainerError::BeanNotFound(format!(
                "No bean found for type '{}'",
                type_name
            ))),
        }
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.definitions.read().contains_key(name)
    }

    fn contains_bean_by_type<T: Any + Send + Sync>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        if self.type_to_name.read().contains_key(&type_id) {
            return true;
        }

        let type_name = std::any::type_name::<T>();
        let definitions = self.definitions.read();
        definitions
            .values()
            .any(|definition| definition.factory.type_name() == type_name)
    }

    fn get_bean_names(&self) -> Vec<String> {
        self.definitions.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Counter {
        value: usize,
    }

    #[test]
    fn singleton_bean_is_created_once() {
        static CREATED: AtomicUsize = AtomicUsize::new(0);

        let context = InjectionContext::new();
        context
            .register_singleton("counter", || {
                CREATED.fetch_add(1, Ordering::SeqCst);
                Ok(Counter { value: 42 })
            })
            .unwrap();

        let first = context.get_bean_by_type::<Counter>().unwrap();
        let second = context.get_bean_by_type::<Counter>().unwrap();

        assert_eq!(first.value, 42);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prototype_bean_is_created_per_request() {
        static CREATED: AtomicUsize = AtomicUsize::new(0);

        let context = InjectionContext::new();
        context
            .register_prototype("counter", || {
                CREATED.fetch_add(1, Ordering::SeqCst);
                Ok(Counter { value: 1 })
            })
            .unwrap();

        let first = context.get_bean_by_type::<Counter>().unwrap();
        let second = context.get_bean_by_type::<Counter>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(CREATED.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let context = InjectionContext::new();
        context
            .register_singleton("counter", || Ok(Counter { value: 1 }))
            .unwrap();

        let result = context.register_singleton("counter", || Ok(Counter { value: 2 }));
        assert!(matches!(result, Err(ContainerError::BeanAlreadyExists(_))));
    }

    #[test]
    fn missing_bean_reports_not_found() {
        let context = InjectionContext::new();
        let result = context.get_bean("nope");
        assert!(matches!(result, Err(ContainerError::BeanNotFound(_))));
    }

    #[test]
    fn creation_failure_is_wrapped_with_bean_name() {
        let context = InjectionContext::new();
        context
            .register_singleton::<Counter, _>("broken", || {
                Err(ContainerError::Other(anyhow::anyhow!("boom")))
            })
            .unwrap();

        let err = context.get_bean("broken").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("broken"));
        assert!(message.contains("boom"));
    }
}
