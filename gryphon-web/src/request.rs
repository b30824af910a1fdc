//! 请求/响应模型
//!
//! 分发层使用的与传输无关的请求抽象，外层服务器适配器负责
//! 将底层连接转换为 `ActionRequest`。

use std::str::FromStr;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};

/// 路由类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl From<&Method> for RouteType {
    fn from(method: &Method) -> Self {
        match *method {
            Method::POST => RouteType::Post,
            Method::PUT => RouteType::Put,
            Method::DELETE => RouteType::Delete,
            Method::PATCH => RouteType::Patch,
            Method::HEAD => RouteType::Head,
            Method::OPTIONS => RouteType::Options,
            _ => RouteType::Get,
        }
    }
}

impl std::fmt::Display for RouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RouteType::Get => "GET",
            RouteType::Post => "POST",
            RouteType::Put => "PUT",
            RouteType::Delete => "DELETE",
            RouteType::Patch => "PATCH",
            RouteType::Head => "HEAD",
            RouteType::Options => "OPTIONS",
        };
        write!(f, "{}", name)
    }
}

/// 请求抽象
#[derive(Debug, Clone)]
pub struct ActionRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl ActionRequest {
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        let uri = Uri::from_str(uri.as_ref()).unwrap_or_else(|_| Uri::from_static("/"));
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_str(name),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn route_type(&self) -> RouteType {
        RouteType::from(&self.method)
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Content-Type 头的原始值（包含 boundary 等参数）
    pub fn raw_content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// 规范化的内容类型（去掉参数、小写）
    pub fn content_type(&self) -> Option<String> {
        self.raw_content_type().map(|v| {
            v.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// 按声明顺序返回查询参数
    pub fn query_entries(&self) -> Vec<(String, String)> {
        match self.uri.query() {
            Some(query) => url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// 按声明顺序返回 URL 编码表单字段
    pub fn form_entries(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(&self.body)
            .into_owned()
            .collect()
    }
}

/// 响应抽象
///
/// 拦截器和处理器可以在分发过程中修改状态码和响应头，
/// 最终的响应体由动作的返回值决定。
#[derive(Debug, Clone)]
pub struct ActionResponse {
    status: StatusCode,
    headers: HeaderMap,
}

impl ActionResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn insert_header(&mut self, name: &str, value: &str) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_str(name),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
    }
}

impl Default for ActionResponse {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_is_normalized() {
        let request = ActionRequest::new(Method::POST, "/users")
            .with_header("content-type", "Application/JSON; charset=utf-8");

        assert_eq!(request.content_type().as_deref(), Some("application/json"));
        assert_eq!(
            request.raw_content_type(),
            Some("Application/JSON; charset=utf-8")
        );
    }

    #[test]
    fn query_entries_preserve_order_and_decoding() {
        let request = ActionRequest::new(Method::GET, "/search?q=hello%20world&page=2&q=again");

        let entries = request.query_entries();
        assert_eq!(entries[0], ("q".to_string(), "hello world".to_string()));
        assert_eq!(entries[1], ("page".to_string(), "2".to_string()));
        assert_eq!(entries[2], ("q".to_string(), "again".to_string()));
    }

    #[test]
    fn form_entries_parse_url_encoded_body() {
        let request = ActionRequest::new(Method::POST, "/users")
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body("name=alice&age=30");

        let entries = request.form_entries();
        assert_eq!(entries[0], ("name".to_string(), "alice".to_string()));
        assert_eq!(entries[1], ("age".to_string(), "30".to_string()));
    }

    #[test]
    fn route_type_follows_method() {
        let request = ActionRequest::new(Method::DELETE, "/users/1");
        assert_eq!(request.route_type(), RouteType::Delete);
        assert_eq!(request.route_type().to_string(), "DELETE");
    }
}
