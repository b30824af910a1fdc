//! 路径变量绑定
//!
//! 所有方法绑定器共享的第一步：路由匹配得到的路径变量
//! 优先于请求体和查询串绑定到同名参数。

use std::collections::HashMap;

use crate::binder::ParameterBinderSet;
use crate::error::BindError;
use crate::introspection::{ActionArguments, BoundValue, ParameterDescription, ParameterType};

/// 路径变量绑定器
pub struct PathVariableBinder;

impl PathVariableBinder {
    /// 将路径变量绑定到同名的标量参数
    ///
    /// 复合和文件参数不参与路径变量绑定。
    pub fn bind(
        parameters: &[ParameterDescription],
        path_variables: &HashMap<String, String>,
        arguments: &mut ActionArguments,
    ) -> Result<(), BindError> {
        for parameter in parameters {
            if arguments.is_bound(parameter.name()) {
                continue;
            }
            if matches!(
                parameter.parameter_type(),
                ParameterType::Bean | ParameterType::File
            ) {
                continue;
            }

            if let Some(raw) = path_variables.get(parameter.name()) {
                let value = ParameterBinderSet::coerce_scalar(parameter, raw)?;
                arguments.insert(parameter.name(), BoundValue::Json(value));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path_variables(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn path_variables_bind_scalars_with_coercion() {
        let parameters = vec![
            ParameterDescription::integer("id"),
            ParameterDescription::string("slug"),
        ];
        let mut arguments = ActionArguments::new();

        PathVariableBinder::bind(
            &parameters,
            &path_variables(&[("id", "42"), ("slug", "hello")]),
            &mut arguments,
        )
        .unwrap();

        assert_eq!(arguments.json("id"), Some(&json!(42)));
        assert_eq!(arguments.json("slug"), Some(&json!("hello")));
    }

    #[test]
    fn invalid_path_variable_reports_conversion_error() {
        let parameters = vec![ParameterDescription::integer("id")];
        let mut arguments = ActionArguments::new();

        let err = PathVariableBinder::bind(
            &parameters,
            &path_variables(&[("id", "abc")]),
            &mut arguments,
        )
        .unwrap_err();

        assert!(matches!(err, BindError::Conversion { .. }));
    }

    #[test]
    fn composite_parameters_are_ignored() {
        let parameters = vec![ParameterDescription::file("upload")];
        let mut arguments = ActionArguments::new();

        PathVariableBinder::bind(
            &parameters,
            &path_variables(&[("upload", "nonsense")]),
            &mut arguments,
        )
        .unwrap();

        assert!(arguments.is_empty());
    }
}
