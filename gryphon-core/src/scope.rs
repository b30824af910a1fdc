/// Bean 作用域
///
/// - `Singleton`：容器内共享一个实例（默认）
/// - `Prototype`：每次获取都创建新实例
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Singleton,
    Prototype,
}
