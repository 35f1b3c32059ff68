// src/api/params.rs

use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Query, Request},
    http::Method,
    Json,
};
use serde_json::{Map, Value};

use crate::amount::expand_exponent;
use crate::api::response::ToolError;

/// Tool parameters, read from the query string for `GET` and from a JSON
/// object body otherwise. Each tool has one handler serving both.
#[derive(Debug, Clone, Default)]
pub struct ToolParams(Map<String, Value>);

#[axum::async_trait]
impl<S> FromRequest<S> for ToolParams
where
    S: Send + Sync,
{
    type Rejection = ToolError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if matches!(*req.method(), Method::GET | Method::HEAD) {
            let Query(query) = Query::<HashMap<String, String>>::try_from_uri(req.uri())
                .map_err(|rejection| ToolError::InvalidBody(rejection.body_text()))?;
            return Ok(query.into_iter().collect());
        }

        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ToolError::InvalidBody(rejection.body_text()))?;
        match body {
            Value::Object(map) => Ok(ToolParams(map)),
            other => Err(ToolError::InvalidBody(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}

impl FromIterator<(String, String)> for ToolParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ToolParams(iter.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

impl From<Map<String, Value>> for ToolParams {
    fn from(map: Map<String, Value>) -> Self {
        ToolParams(map)
    }
}

impl ToolParams {
    /// String value of a parameter. Empty strings and nulls count as absent;
    /// JSON numbers and booleans are rendered as text, numbers without exponents.
    pub fn str(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(expand_exponent(&n.to_string())),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// First present key among aliases.
    pub fn str_any(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.str(key))
    }

    pub fn bool(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}
