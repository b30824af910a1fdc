//! JSON 请求体绑定器

use std::collections::HashMap;

use async_trait::async_trait;

use crate::binder::{ActionMethodBinder, ParameterBinderSet};
use crate::constants::CONTENT_TYPE_JSON;
use crate::error::BindError;
use crate::introspection::{ActionArguments, BoundValue, ParameterDescription, ParameterType};
use crate::path_binder::PathVariableBinder;
use crate::request::ActionRequest;

/// JSON 绑定器
///
/// 请求体整体反序列化后绑定到第一个未绑定的复合参数，
/// 其余参数回退到路径变量和查询串。
pub struct JsonBinder;

#[async_trait]
impl ActionMethodBinder for JsonBinder {
    fn can_bind(&self, content_type: Option<&str>) -> bool {
        content_type == Some(CONTENT_TYPE_JSON)
    }

    async fn bind(
        &self,
        parameters: &[ParameterDescription],
        request: &ActionRequest,
        path_variables: &HashMap<String, String>,
        arguments: &mut ActionArguments,
    ) -> Result<(), BindError> {
        PathVariableBinder::bind(parameters, path_variables, arguments)?;

        if !request.body().is_empty() {
            let value: serde_json::Value = serde_json::from_slice(request.body())
                .map_err(|e| BindError::BodyParse(e.to_string()))?;

            let target = parameters.iter().find(|p| {
                !arguments.is_bound(p.name()) && p.is_a(ParameterType::Bean)
            });

            if let Some(parameter) = target {
                parameter.check(&value)?;
                arguments.insert(parameter.name(), BoundValue::Json(value));
            }
        }

        ParameterBinderSet::bind_flat_entries(parameters, &request.query_entries(), arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct CreateUser {
        name: String,
        age: i64,
    }

    fn json_request(body: &str) -> ActionRequest {
        ActionRequest::new(Method::POST, "/users?verbose=true")
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    #[tokio::test]
    async fn body_binds_to_first_unbound_composite_parameter() {
        let parameters = vec![
            ParameterDescription::bean::<CreateUser>("user"),
            ParameterDescription::boolean("verbose"),
        ];
        let mut arguments = ActionArguments::new();

        JsonBinder
            .bind(
                &parameters,
                &json_request(r#"{"name": "alice", "age": 30}"#),
                &HashMap::new(),
                &mut arguments,
            )
            .await
            .unwrap();

        assert_eq!(
            arguments.json("user"),
            Some(&json!({"name": "alice", "age": 30}))
        );
        assert_eq!(arguments.json("verbose"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let parameters = vec![ParameterDescription::bean::<CreateUser>("user")];
        let mut arguments = ActionArguments::new();

        let err = JsonBinder
            .bind(
                &parameters,
                &json_request("{not json"),
                &HashMap::new(),
                &mut arguments,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BindError::BodyParse(_)));
    }

    #[tokio::test]
    async fn body_shape_mismatch_names_the_target_type() {
        let parameters = vec![ParameterDescription::bean::<CreateUser>("user")];
        let mut arguments = ActionArguments::new();

        let err = JsonBinder
            .bind(
                &parameters,
                &json_request(r#"{"name": "alice"}"#),
                &HashMap::new(),
                &mut arguments,
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("CreateUser"));
    }

    #[tokio::test]
    async fn path_variables_win_over_body() {
        let parameters = vec![ParameterDescription::integer("id")];
        let mut arguments = ActionArguments::new();

        let mut path_variables = HashMap::new();
        path_variables.insert("id".to_string(), "7".to_string());

        JsonBinder
            .bind(
                &parameters,
                &json_request(r#"{"id": 99}"#),
                &path_variables,
                &mut arguments,
            )
            .await
            .unwrap();

        assert_eq!(arguments.json("id"), Some(&json!(7)));
    }
}
