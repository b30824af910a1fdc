//! 表单和查询串绑定器

use std::collections::HashMap;

use async_trait::async_trait;

use crate::binder::{ActionMethodBinder, ParameterBinderSet};
use crate::constants::CONTENT_TYPE_FORM_URLENCODED;
use crate::error::BindError;
use crate::introspection::{ActionArguments, ParameterDescription};
use crate::path_binder::PathVariableBinder;
use crate::request::ActionRequest;

/// HTTP 参数绑定器 - 兜底绑定器，接受任意内容类型
///
/// URL 编码表单字段和查询串条目合并后按平铺键绑定，
/// 表单字段排在前面，同名时生效。
pub struct HttpBinder;

#[async_trait]
impl ActionMethodBinder for HttpBinder {
    fn can_bind(&self, _content_type: Option<&str>) -> bool {
        true
    }

    async fn bind(
        &self,
        parameters: &[ParameterDescription],
        request: &ActionRequest,
        path_variables: &HashMap<String, String>,
        arguments: &mut ActionArguments,
    ) -> Result<(), BindError> {
        PathVariableBinder::bind(parameters, path_variables, arguments)?;

        let mut entries = Vec::new();
        if request.content_type().as_deref() == Some(CONTENT_TYPE_FORM_URLENCODED) {
            entries.extend(request.form_entries());
        }
        entries.extend(request.query_entries());

        ParameterBinderSet::bind_flat_entries(parameters, &entries, arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Filter {
        status: String,
        page: i64,
    }

    #[tokio::test]
    async fn query_parameters_bind_scalars() {
        let parameters = vec![
            ParameterDescription::string("q"),
            ParameterDescription::integer("page"),
        ];
        let request = ActionRequest::new(Method::GET, "/search?q=rust&page=3");
        let mut arguments = ActionArguments::new();

        HttpBinder
            .bind(&parameters, &request, &HashMap::new(), &mut arguments)
            .await
            .unwrap();

        assert_eq!(arguments.json("q"), Some(&json!("rust")));
        assert_eq!(arguments.json("page"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn form_fields_take_precedence_over_query() {
        let parameters = vec![ParameterDescription::string("name")];
        let request = ActionRequest::new(Method::POST, "/users?name=from-query")
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body("name=from-form");
        let mut arguments = ActionArguments::new();

        HttpBinder
            .bind(&parameters, &request, &HashMap::new(), &mut arguments)
            .await
            .unwrap();

        assert_eq!(arguments.json("name"), Some(&json!("from-form")));
    }

    #[tokio::test]
    async fn dotted_form_fields_bind_composite_parameters() {
        let parameters = vec![ParameterDescription::bean::<Filter>("filter")];
        let request = ActionRequest::new(Method::POST, "/search")
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body("filter.status=open&filter.page=2");
        let mut arguments = ActionArguments::new();

        HttpBinder
            .bind(&parameters, &request, &HashMap::new(), &mut arguments)
            .await
            .unwrap();

        assert_eq!(
            arguments.json("filter"),
            Some(&json!({"status": "open", "page": 2}))
        );
    }

    #[tokio::test]
    async fn missing_entries_leave_parameters_unbound() {
        let parameters = vec![ParameterDescription::string("q")];
        let request = ActionRequest::new(Method::GET, "/search");
        let mut arguments = ActionArguments::new();

        HttpBinder
            .bind(&parameters, &request, &HashMap::new(), &mut arguments)
            .await
            .unwrap();

        assert!(!arguments.is_bound("q"));
    }
}
