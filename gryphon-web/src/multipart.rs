//! Multipart/form-data 支持
//!
//! 基于 multer 提供文件上传的绑定

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use gryphon_core::Environment;

use crate::binder::{ActionMethodBinder, ParameterBinderSet};
use crate::constants::{
    CONTENT_TYPE_MULTIPART_FORM_DATA, MULTIPART_MAX_FIELDS, MULTIPART_MAX_FILE_SIZE,
};
use crate::error::BindError;
use crate::introspection::{ActionArguments, BoundValue, ParameterDescription, ParameterType};
use crate::path_binder::PathVariableBinder;
use crate::request::ActionRequest;

/// Multipart 配置属性
///
/// 可通过配置的 `gryphon.web.multipart` 前缀调整
#[derive(Debug, Clone)]
pub struct MultipartProperties {
    /// 最大文件大小（字节），默认 10MB
    pub max_file_size: usize,

    /// 最大字段数量，默认 100
    pub max_fields: usize,
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_max_fields() -> usize {
    100
}

impl Default for MultipartProperties {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_fields: default_max_fields(),
        }
    }
}

impl MultipartProperties {
    /// 从 Environment 加载配置
    pub fn from_environment(env: &Environment) -> Self {
        Self {
            max_file_size: env
                .get_i64(MULTIPART_MAX_FILE_SIZE)
                .map(|v| v as usize)
                .unwrap_or_else(default_max_file_size),
            max_fields: env
                .get_i64(MULTIPART_MAX_FIELDS)
                .map(|v| v as usize)
                .unwrap_or_else(default_max_fields),
        }
    }

    /// 转换为 multer::Constraints
    pub fn to_multer_constraints(&self) -> multer::Constraints {
        multer::Constraints::new()
            .size_limit(multer::SizeLimit::new().whole_stream(self.max_file_size as u64))
    }
}

/// 上传文件信息 - 类似 Spring 的 MultipartFile
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    /// 字段名称
    pub field_name: String,

    /// 原始文件名（如果提供）
    pub filename: Option<String>,

    /// 文件内容类型（如果提供）
    pub content_type: Option<String>,

    /// 文件数据
    pub data: Bytes,
}

impl UploadedFile {
    /// 从 multer Field 创建
    pub async fn from_field(field: multer::Field<'_>) -> Result<Self, multer::Error> {
        let field_name = field.name().unwrap_or("unknown").to_string();
        let filename = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|mime| mime.to_string());
        let data = field.bytes().await?;

        Ok(Self {
            field_name,
            filename,
            content_type,
            data,
        })
    }

    /// 文件大小（字节）
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 文件扩展名
    pub fn extension(&self) -> Option<&str> {
        self.filename
            .as_ref()
            .and_then(|name| name.rfind('.').map(|pos| &name[pos + 1..]))
    }

    /// 将文件数据保存到指定路径
    pub async fn save_to(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        tokio::fs::write(path, &self.data).await
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Multipart 绑定器
///
/// 路径变量已经覆盖全部参数时不解析请求体。
pub struct MultipartBinder {
    properties: MultipartProperties,
}

impl MultipartBinder {
    pub fn new(properties: MultipartProperties) -> Self {
        Self { properties }
    }

    async fn parse_body(
        &self,
        request: &ActionRequest,
    ) -> Result<(Vec<(String, String)>, HashMap<String, UploadedFile>), BindError> {
        let boundary = multer::parse_boundary(request.raw_content_type().unwrap_or_default())
            .map_err(|e| BindError::BodyParse(format!("invalid multipart boundary: {}", e)))?;

        let body = request.body().clone();
        let stream = futures_util::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
        let mut multipart = multer::Multipart::with_constraints(
            stream,
            boundary,
            self.properties.to_multer_constraints(),
        );

        let mut entries = Vec::new();
        let mut files: HashMap<String, UploadedFile> = HashMap::new();
        let mut field_count = 0usize;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| BindError::BodyParse(format!("failed to read multipart field: {}", e)))?
        {
            field_count += 1;
            if field_count > self.properties.max_fields {
                return Err(BindError::BodyParse(format!(
                    "multipart field count exceeds limit of {}",
                    self.properties.max_fields
                )));
            }

            let field_name = field.name().unwrap_or("unknown").to_string();

            if field.file_name().is_some() {
                let file = UploadedFile::from_field(field).await.map_err(|e| {
                    BindError::BodyParse(format!(
                        "failed to read file field '{}': {}",
                        field_name, e
                    ))
                })?;
                files.entry(field_name).or_insert(file);
            } else {
                let value = field.text().await.map_err(|e| {
                    BindError::BodyParse(format!(
                        "failed to read text field '{}': {}",
                        field_name, e
                    ))
                })?;
                entries.push((field_name, value));
            }
        }

        Ok((entries, files))
    }
}

#[async_trait]
impl ActionMethodBinder for MultipartBinder {
    fn can_bind(&self, content_type: Option<&str>) -> bool {
        content_type == Some(CONTENT_TYPE_MULTIPART_FORM_DATA)
    }

    async fn bind(
        &self,
        parameters: &[ParameterDescription],
        request: &ActionRequest,
        path_variables: &HashMap<String, String>,
        arguments: &mut ActionArguments,
    ) -> Result<(), BindError> {
        PathVariableBinder::bind(parameters, path_variables, arguments)?;

        if arguments.unbound(parameters).is_empty() {
            return Ok(());
        }

        let (entries, mut files) = self.parse_body(request).await?;

        for parameter in parameters {
            if arguments.is_bound(parameter.name()) {
                continue;
            }
            if parameter.is_a(ParameterType::File) {
                if let Some(file) = files.remove(parameter.name()) {
                    arguments.insert(parameter.name(), BoundValue::File(file));
                }
            }
        }

        ParameterBinderSet::bind_flat_entries(parameters, &entries, arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;

    const BOUNDARY: &str = "X-GRYPHON-BOUNDARY";

    fn multipart_request(body: String) -> ActionRequest {
        ActionRequest::new(Method::POST, "/upload")
            .with_header(
                "content-type",
                &format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .with_body(body)
    }

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        )
    }

    fn file_part(name: &str, filename: &str, contents: &str) -> String {
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n{}\r\n",
            BOUNDARY, name, filename, contents
        )
    }

    fn closing() -> String {
        format!("--{}--\r\n", BOUNDARY)
    }

    #[tokio::test]
    async fn binds_text_fields_and_files() {
        let body = format!(
            "{}{}{}",
            text_part("title", "my upload"),
            file_part("doc", "notes.txt", "file contents"),
            closing()
        );

        let parameters = vec![
            ParameterDescription::string("title"),
            ParameterDescription::file("doc"),
        ];
        let mut arguments = ActionArguments::new();

        MultipartBinder::new(MultipartProperties::default())
            .bind(
                &parameters,
                &multipart_request(body),
                &HashMap::new(),
                &mut arguments,
            )
            .await
            .unwrap();

        assert_eq!(arguments.json("title"), Some(&json!("my upload")));

        let file = arguments.file("doc").unwrap();
        assert_eq!(file.filename.as_deref(), Some("notes.txt"));
        assert_eq!(file.bytes(), b"file contents");
        assert_eq!(file.extension(), Some("txt"));
    }

    #[tokio::test]
    async fn body_is_not_parsed_when_path_variables_cover_all_parameters() {
        // 请求体是无效的 multipart，但路径变量已覆盖全部参数
        let parameters = vec![ParameterDescription::integer("id")];
        let mut path_variables = HashMap::new();
        path_variables.insert("id".to_string(), "9".to_string());
        let mut arguments = ActionArguments::new();

        MultipartBinder::new(MultipartProperties::default())
            .bind(
                &parameters,
                &multipart_request("definitely not multipart".to_string()),
                &path_variables,
                &mut arguments,
            )
            .await
            .unwrap();

        assert_eq!(arguments.json("id"), Some(&json!(9)));
    }

    #[tokio::test]
    async fn field_count_limit_is_enforced() {
        let body = format!(
            "{}{}{}",
            text_part("a", "1"),
            text_part("b", "2"),
            closing()
        );

        let properties = MultipartProperties {
            max_fields: 1,
            ..MultipartProperties::default()
        };
        let parameters = vec![ParameterDescription::string("a")];
        let mut arguments = ActionArguments::new();

        let err = MultipartBinder::new(properties)
            .bind(
                &parameters,
                &multipart_request(body),
                &HashMap::new(),
                &mut arguments,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BindError::BodyParse(_)));
    }

    #[test]
    fn properties_load_from_environment() {
        let env = Environment::new();
        env.add_property_source(Box::new(
            gryphon_core::MapPropertySource::new("test")
                .with_property(
                    MULTIPART_MAX_FILE_SIZE,
                    gryphon_core::ConfigValue::Integer(1024),
                )
                .with_property(MULTIPART_MAX_FIELDS, gryphon_core::ConfigValue::Integer(5)),
        ));

        let properties = MultipartProperties::from_environment(&env);
        assert_eq!(properties.max_file_size, 1024);
        assert_eq!(properties.max_fields, 5);
    }
}
