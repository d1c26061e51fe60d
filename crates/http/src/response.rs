//! Response envelope shared by every JSON endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Outcome reported in the `status` field of the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
    Error,
}

/// `{ status, message?, data? }` wrapper
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Successful response paired with its HTTP status code
#[derive(Debug)]
pub struct ApiResponse<T> {
    code: StatusCode,
    body: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with a data payload
    pub fn ok(data: T) -> Self {
        Self {
            code: StatusCode::OK,
            body: Envelope {
                status: Status::Success,
                message: None,
                data: Some(data),
            },
        }
    }

    /// 201 with a message and a data payload
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            code: StatusCode::CREATED,
            body: Envelope {
                status: Status::Success,
                message: Some(message.into()),
                data: Some(data),
            },
        }
    }

    /// Attach a human readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// 200 carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::OK,
            body: Envelope {
                status: Status::Success,
                message: Some(message.into()),
                data: None,
            },
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_created_envelope() {
        let response = ApiResponse::created("added", json!({"bookId": "abc"})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({"status": "success", "message": "added", "data": {"bookId": "abc"}})
        );
    }

    #[tokio::test]
    async fn test_message_only_envelope_omits_data() {
        let response = ApiResponse::message("deleted").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status": "success", "message": "deleted"})
        );
    }

    #[tokio::test]
    async fn test_ok_envelope_omits_message() {
        let response = ApiResponse::ok(json!({"books": []})).into_response();
        assert_eq!(
            body_json(response).await,
            json!({"status": "success", "data": {"books": []}})
        );
    }
}
