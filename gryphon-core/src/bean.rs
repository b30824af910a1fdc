use std::any::{Any, TypeId};
use std::fmt;

use crate::{ContainerResult, Scope};

/// Bean 工厂 trait - 用于创建 Bean 实例
pub trait BeanFactory: Send + Sync {
    /// 创建 Bean 实例
    fn create(&self) -> ContainerResult<Box<dyn Any + Send + Sync>>;

    /// 获取 Bean 的类型 ID
    fn type_id(&self) -> TypeId;

    /// 获取 Bean 的类型名称
    fn type_name(&self) -> &str;
}

/// Bean 定义 - 描述如何创建和管理 Bean
pub struct BeanDefinition {
    /// Bean 的名称
    pub name: String,

    /// Bean 的作用域
    pub scope: Scope,

    /// Bean 工厂
    pub factory: Box<dyn BeanFactory>,
}

impl BeanDefinition {
    /// 创建新的 Bean 定义
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: BeanFactory + 'static,
    {
        Self {
            name: name.into(),
            scope: Scope::default(),
            factory: Box::new(factory),
        }
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("type_name", &self.factory.type_name())
            .finish()
    }
}

/// 简单的函数工厂实现
pub struct FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn() -> ContainerResult<T> + Send + Sync,
{
    factory_fn: F,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T, F> FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn() -> ContainerResult<T> + Send + Sync,
{
    pub fn new(factory_fn: F) -> Self {
        Self {
            factory_fn,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, F> BeanFactory for FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn() -> ContainerResult<T> + Send + Sync,
{
    fn create(&self) -> ContainerResult<Box<dyn Any + Send + Sync>> {
        let instance = (self.factory_fn)()?;
        Ok(Box::new(instance))
    }

    fn type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &str {
        std::any::type_name::<T>()
    }
}
