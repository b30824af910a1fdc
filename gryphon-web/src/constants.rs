//! 框架配置常量定义
//!
//! 定义所有框架使用的配置键名称和内容类型

// ==================== 内容类型 ====================

/// JSON 请求体
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// URL 编码表单
pub const CONTENT_TYPE_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Multipart 表单
pub const CONTENT_TYPE_MULTIPART_FORM_DATA: &str = "multipart/form-data";

// ==================== Multipart 配置 ====================

/// Multipart 最大文件大小（字节）
pub const MULTIPART_MAX_FILE_SIZE: &str = "gryphon.web.multipart.max-file-size";

/// Multipart 最大字段数量
pub const MULTIPART_MAX_FIELDS: &str = "gryphon.web.multipart.max-fields";
