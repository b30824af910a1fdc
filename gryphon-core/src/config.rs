//! 配置环境
//!
//! 类似 Spring 的 Environment 抽象：多个按优先级排序的配置源（PropertySource），
//! 高优先级源覆盖低优先级源。

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;

/// 配置值
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(v) => Some(*v),
            ConfigValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(v) => Some(*v),
            ConfigValue::Integer(v) => Some(*v as f64),
            ConfigValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(v) => Some(*v),
            ConfigValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// 转为字符串表示
    pub fn to_display_string(&self) -> String {
        match self {
            ConfigValue::String(s) => s.clone(),
            ConfigValue::Integer(v) => v.to_string(),
            ConfigValue::Float(v) => v.to_string(),
            ConfigValue::Boolean(v) => v.to_string(),
        }
    }
}

/// 配置源 trait
pub trait PropertySource: Send + Sync {
    /// 配置源名称（用于日志）
    fn name(&self) -> &str;

    /// 优先级，数字越大优先级越高
    fn priority(&self) -> i32 {
        0
    }

    /// 获取配置项
    fn get_property(&self, key: &str) -> Option<ConfigValue>;
}

/// 基于内存 Map 的配置源
pub struct MapPropertySource {
    name: String,
    priority: i32,
    properties: HashMap<String, ConfigValue>,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn get_property(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }
}

/// 读取进程环境变量的配置源
///
/// 配置键 `gryphon.web.multipart.max-file-size` 映射为环境变量
/// `GRYPHON_WEB_MULTIPART_MAX_FILE_SIZE`。
pub struct EnvironmentPropertySource {
    priority: i32,
}

impl EnvironmentPropertySource {
    pub fn new() -> Self {
        Self { priority: 100 }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn env_var_name(key: &str) -> String {
        key.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl Default for EnvironmentPropertySource {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        "environment"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn get_property(&self, key: &str) -> Option<ConfigValue> {
        std::env::var(Self::env_var_name(key))
            .ok()
            .map(ConfigValue::String)
    }
}

/// 基于 TOML 文件的配置源
///
/// 嵌套的 table 会被展开为点号分隔的配置键。
pub struct TomlPropertySource {
    name: String,
    priority: i32,
    properties: HashMap<String, ConfigValue>,
}

impl TomlPropertySource {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        Self::from_str(&content, path.display().to_string())
    }

    pub fn from_str(content: &str, name: String) -> Result<Self, String> {
        let table: toml::Table = content
            .parse()
            .map_err(|e| format!("Failed to parse TOML config '{}': {}", name, e))?;

        let mut properties = HashMap::new();
        Self::flatten(&table, "", &mut properties);

        Ok(Self {
            name,
            priority: 10,
            properties,
        })
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn flatten(table: &toml::Table, prefix: &str, out: &mut HashMap<String, ConfigValue>) {
        for (key, value) in table {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };

            match value {
                toml::Value::Table(nested) => Self::flatten(nested, &full_key, out),
                toml::Value::String(s) => {
                    out.insert(full_key, ConfigValue::String(s.clone()));
                }
                toml::Value::Integer(v) => {
                    out.insert(full_key, ConfigValue::Integer(*v));
                }
                toml::Value::Float(v) => {
                    out.insert(full_key, ConfigValue::Float(*v));
                }
                toml::Value::Boolean(v) => {
                    out.insert(full_key, ConfigValue::Boolean(*v));
                }
                other => {
                    out.insert(full_key, ConfigValue::String(other.to_string()));
                }
            }
        }
    }
}

impl PropertySource for TomlPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn get_property(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }
}

/// 配置环境
pub struct Environment {
    sources: RwLock<Vec<Box<dyn PropertySource>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
        }
    }

    /// 添加配置源，按优先级从高到低排序
    pub fn add_property_source(&self, source: Box<dyn PropertySource>) {
        let mut sources = self.sources.write();
        tracing::debug!(
            "Adding property source '{}' with priority {}",
            source.name(),
            source.priority()
        );
        sources.push(source);
        sources.sort_by_key(|s| std::cmp::Reverse(s.priority()));
    }

    /// 获取配置项，高优先级源优先
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        let sources = self.sources.read();
        sources.iter().find_map(|source| source.get_property(key))
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_display_string())
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_f64())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priority_source_wins() {
        let env = Environment::new();
        env.add_property_source(Box::new(
            MapPropertySource::new("low")
                .with_priority(1)
                .with_property("server.port", ConfigValue::Integer(8080)),
        ));
        env.add_property_source(Box::new(
            MapPropertySource::new("high")
                .with_priority(50)
                .with_property("server.port", ConfigValue::Integer(9090)),
        ));

        assert_eq!(env.get_i64("server.port"), Some(9090));
    }

    #[test]
    fn missing_key_falls_back_to_default() {
        let env = Environment::new();
        assert_eq!(env.get_i64_or("does.not.exist", 7), 7);
        assert_eq!(env.get_string_or("does.not.exist", "fallback"), "fallback");
    }

    #[test]
    fn toml_source_flattens_nested_tables() {
        let source = TomlPropertySource::from_str(
            r#"
            [gryphon.web.multipart]
            max-file-size = 1024
            max-fields = 5
            "#,
            "test".to_string(),
        )
        .unwrap();

        assert_eq!(
            source.get_property("gryphon.web.multipart.max-file-size"),
            Some(ConfigValue::Integer(1024))
        );
        assert_eq!(
            source.get_property("gryphon.web.multipart.max-fields"),
            Some(ConfigValue::Integer(5))
        );
    }

    #[test]
    fn string_values_coerce_to_numbers_and_bools() {
        let value = ConfigValue::String("42".to_string());
        assert_eq!(value.as_i64(), Some(42));

        let value = ConfigValue::String("true".to_string());
        assert_eq!(value.as_bool(), Some(true));
    }

    #[test]
    fn env_var_names_are_upper_snake_case() {
        assert_eq!(
            EnvironmentPropertySource::env_var_name("gryphon.web.multipart.max-file-size"),
            "GRYPHON_WEB_MULTIPART_MAX_FILE_SIZE"
        );
    }
}
