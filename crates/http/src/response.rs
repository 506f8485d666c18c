//! Response envelope shared by every JSON endpoint.

use serde::{Deserialize, Serialize};

/// `{ "message": ..., "data": ... }`, with `data` left out when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_only_omits_data() {
        let body = serde_json::to_value(ApiResponse::message("Book added")).unwrap();
        assert_eq!(body, json!({ "message": "Book added" }));
    }

    #[test]
    fn absent_inner_value_serializes_as_null() {
        let body =
            serde_json::to_value(ApiResponse::with_data("Book fetched successfully", None::<u8>))
                .unwrap();
        assert_eq!(
            body,
            json!({ "message": "Book fetched successfully", "data": null })
        );
    }
}
