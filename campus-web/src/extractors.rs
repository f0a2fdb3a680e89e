use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::HOST;
use axum::http::request::Parts;
use campus_infra::storage::RequestOrigin;
use std::convert::Infallible;

/// 请求来源提取器
/// 优先使用配置的external_url，否则按转发协议头和Host头推断
pub struct RequestBase(pub String);

impl RequestBase {
    pub fn origin(&self) -> RequestOrigin {
        RequestOrigin::new(self.0.clone())
    }
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for RequestBase {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(url) = &state.external_url {
            return Ok(Self(url.trim_end_matches('/').to_string()));
        }

        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("http");
        let host = parts
            .headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("localhost");

        Ok(Self(format!("{}://{}", scheme, host)))
    }
}
