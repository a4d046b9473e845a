/// Response envelope
///
/// Every endpoint answers with
///
/// ```json
/// {"code": 200, "msg": "ok", "data": {...}}
/// ```
///
/// `code` is a [`ResponseCode`]; the HTTP status is 200 for every domain
/// outcome and 500 only for [`ResponseCode::Error`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Domain result codes carried in the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    Error,
    InvalidParams,
    TagExists,
    TagInUse,
    TagNotFound,
    ArticleNotFound,
    AuthCheckTokenFail,
    AuthCheckTokenTimeout,
    AuthToken,
    Auth,
}

impl ResponseCode {
    pub const fn code(self) -> i32 {
        match self {
            ResponseCode::Success => 200,
            ResponseCode::Error => 500,
            ResponseCode::InvalidParams => 400,
            ResponseCode::TagExists => 10001,
            ResponseCode::TagInUse => 10002,
            ResponseCode::TagNotFound => 10003,
            ResponseCode::ArticleNotFound => 10011,
            ResponseCode::AuthCheckTokenFail => 20001,
            ResponseCode::AuthCheckTokenTimeout => 20002,
            ResponseCode::AuthToken => 20003,
            ResponseCode::Auth => 20004,
        }
    }

    pub const fn msg(self) -> &'static str {
        match self {
            ResponseCode::Success => "ok",
            ResponseCode::Error => "fail",
            ResponseCode::InvalidParams => "invalid request parameters",
            ResponseCode::TagExists => "tag name already exists",
            ResponseCode::TagInUse => "tag is still referenced by articles",
            ResponseCode::TagNotFound => "tag does not exist",
            ResponseCode::ArticleNotFound => "article does not exist",
            ResponseCode::AuthCheckTokenFail => "token check failed",
            ResponseCode::AuthCheckTokenTimeout => "token has expired",
            ResponseCode::AuthToken => "token generation failed",
            ResponseCode::Auth => "invalid username or password",
        }
    }

    pub const fn status(self) -> StatusCode {
        match self {
            ResponseCode::Error => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }
}

/// The `{code, msg, data}` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i32,
    pub msg: String,
    pub data: Value,
}

impl Envelope {
    pub fn new(code: ResponseCode, data: Value) -> Self {
        Self {
            code: code.code(),
            msg: code.msg().to_string(),
            data,
        }
    }

    /// An envelope with `data: {}`
    pub fn empty(code: ResponseCode) -> Self {
        Self::new(code, Value::Object(Default::default()))
    }
}

/// Successful handler output, serialized into the envelope's `data`
#[derive(Debug)]
pub struct ApiResponse<T>(pub T);

impl ApiResponse<Value> {
    /// Success with `data: {}`
    pub fn empty() -> Self {
        ApiResponse(Value::Object(Default::default()))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(self.0) {
            Ok(data) => Envelope::new(ResponseCode::Success, data).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                Envelope::empty(ResponseCode::Error).into_response()
            }
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = if self.code == ResponseCode::Error.code() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        };
        (status, Json(self)).into_response()
    }
}
