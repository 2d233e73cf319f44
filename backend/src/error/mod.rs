use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// The only message ever returned for a credential or token failure.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    Conflict(String),
    BadRequest(String),
    InternalServerError(anyhow::Error),
    /// Field-level messages formatted as `field: code`.
    Validation(Vec<String>),
}

impl AppError {
    pub fn invalid_credentials() -> Self {
        AppError::Unauthorized(INVALID_CREDENTIALS.to_string())
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let (error, details) = match self {
            AppError::Unauthorized(msg) | AppError::Conflict(msg) | AppError::BadRequest(msg) => {
                (msg, None)
            }
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                ("Internal server error".to_string(), None)
            }
            AppError::Validation(errors) => (
                "Validation failed".to_string(),
                Some(serde_json::json!({ "errors": errors })),
            ),
        };

        (status, Json(ErrorResponse { error, code, details })).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.into())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let code = e.code.as_ref();
                    format!("{}: {}", field, code)
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages)
    }
}

// Deserializer output stays in the logs; clients only see which part failed.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
        match rejection {
            JsonRejection::JsonDataError(_) => {
                AppError::Validation(vec!["body: invalid_type".to_string()])
            }
            JsonRejection::JsonSyntaxError(_) => {
                AppError::BadRequest("Malformed JSON body".to_string())
            }
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest("Expected an application/json body".to_string())
            }
            _ => AppError::BadRequest("Invalid request body".to_string()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected query string");
        AppError::Validation(vec!["query: invalid".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn app_error_into_response_maps_status_and_body() {
        let cases = [
            (AppError::BadRequest("bad".into()), StatusCode::BAD_REQUEST, "bad", "BAD_REQUEST"),
            (
                AppError::invalid_credentials(),
                StatusCode::UNAUTHORIZED,
                INVALID_CREDENTIALS,
                "UNAUTHORIZED",
            ),
            (AppError::Conflict("taken".into()), StatusCode::CONFLICT, "taken", "CONFLICT"),
        ];
        for (error, status, message, code) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), status);
            let json = response_json(response).await;
            assert_eq!(json["error"], message);
            assert_eq!(json["code"], code);
        }
    }

    #[tokio::test]
    async fn app_error_validation_includes_details() {
        let response = AppError::Validation(vec!["field: invalid".to_string()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"], "Validation failed");
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["details"]["errors"][0], "field: invalid");
    }

    #[tokio::test]
    async fn app_error_internal_maps_to_generic_message() {
        let response = AppError::InternalServerError(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["code"], "INTERNAL_SERVER_ERROR");
        assert!(json["details"].is_null());
    }

    #[test]
    fn sqlx_errors_are_internal() {
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::InternalServerError(_)
        ));
    }
}
