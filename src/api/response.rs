//! Response envelope and error bodies shared by every tool.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::error;

use crate::blockchain::models::{EvmSignRequest, Network, SuiSignRequest};

pub const SUI_INSTRUCTION: &str = "After receiving this response, use the 'generate-sui-tx' tool with the suiSignRequest data to execute the transaction in the user's wallet.";
pub const EVM_INSTRUCTION: &str = "After receiving this response, use the 'generate-evm-tx' tool with the evmSignRequest data to execute the transaction in the user's wallet.";
pub const NEAR_INSTRUCTION: &str = "After receiving this response, use the 'generate-transaction' tool with the transactionPayload data to execute the transaction in the user's wallet.";

/// Successful tool output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sui_sign_request: Option<SuiSignRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evm_sign_request: Option<EvmSignRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitte_instruction: Option<String>,
    /// Endpoint specific top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            sui_sign_request: None,
            evm_sign_request: None,
            data: None,
            message: message.into(),
            bitte_instruction: None,
            extra: Map::new(),
        }
    }

    pub fn sui(mut self, request: SuiSignRequest) -> Self {
        self.sui_sign_request = Some(request);
        self.bitte_instruction
            .get_or_insert_with(|| SUI_INSTRUCTION.to_string());
        self
    }

    pub fn evm(mut self, request: EvmSignRequest) -> Self {
        self.evm_sign_request = Some(request);
        self.bitte_instruction
            .get_or_insert_with(|| EVM_INSTRUCTION.to_string());
        self
    }

    /// NEAR payloads travel as `transactionPayload`.
    pub fn near(mut self, payload: impl Serialize) -> Self {
        self.extra
            .insert("transactionPayload".into(), to_value(payload));
        self.bitte_instruction
            .get_or_insert_with(|| NEAR_INSTRUCTION.to_string());
        self
    }

    pub fn data(mut self, data: impl Serialize) -> Self {
        self.data = Some(to_value(data));
        self
    }

    pub fn instruction(mut self, text: impl Into<String>) -> Self {
        self.bitte_instruction = Some(text.into());
        self
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.extra.insert(key.to_string(), to_value(value));
        self
    }
}

fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl IntoResponse for ToolResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `{error, details?, code?, ...}` body used by 400 and 501 answers.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.extra.insert(key.to_string(), to_value(value));
        self
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0} is required")]
    MissingParameter(&'static str),
    #[error("Invalid network '{0}'")]
    InvalidNetwork(String),
    #[error("{}", .0.error)]
    BadRequest(ErrorBody),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("{0} not configured in environment variables")]
    MissingConfig(&'static str),
    #[error("{context}: {details:#}")]
    Upstream {
        context: &'static str,
        details: anyhow::Error,
    },
    #[error("{}", .0.error)]
    Unsupported(ErrorBody),
}

impl ToolError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        ToolError::BadRequest(ErrorBody::new(error))
    }

    /// Adapter for `map_err` on service results.
    pub fn upstream(context: &'static str) -> impl FnOnce(anyhow::Error) -> ToolError {
        move |details| ToolError::Upstream { context, details }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ToolError::MissingParameter(_)
            | ToolError::InvalidNetwork(_)
            | ToolError::BadRequest(_)
            | ToolError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ToolError::MissingConfig(_) | ToolError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ToolError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }

    fn body(self) -> Value {
        match self {
            ToolError::MissingParameter(_) | ToolError::MissingConfig(_) => {
                json!({ "error": self.to_string() })
            }
            ToolError::InvalidNetwork(network) => json!({
                "error": format!("Invalid network. Must be one of: {}", Network::supported_list()),
                "details": format!("Received '{}'. Supported networks: {}", network, Network::supported_list()),
                "code": "INVALID_NETWORK",
            }),
            ToolError::BadRequest(body) => to_value(body),
            ToolError::InvalidBody(details) => json!({
                "error": "Invalid request body",
                "details": details,
            }),
            ToolError::Upstream { context, details } => json!({
                "error": context,
                "details": format!("{details:#}"),
            }),
            ToolError::Unsupported(body) => {
                let mut value = to_value(body);
                if let Value::Object(map) = &mut value {
                    map.insert("success".into(), Value::Bool(false));
                }
                value
            }
        }
    }
}

impl IntoResponse for ToolError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            error!("{}", self);
        }
        (status, Json(self.body())).into_response()
    }
}

pub type ToolResult<T = ToolResponse> = Result<T, ToolError>;
