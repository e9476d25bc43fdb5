//! Wire types shared by the endpoint wrappers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Standard success envelope returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Pagination block attached to list responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u64,
}

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login result: an access token plus the signed in profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: String,
    pub user: UserProfile,
}

/// Authenticated user's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: JsonValue,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Payload of the token refresh endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Natural language query sent to the chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatQueryRequest {
    pub message: String,
}

/// Record shaped values (assets, users, categories, ...) are passed through untyped
pub type Record = JsonValue;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_decodes_list_with_pagination() {
        let body = json!({
            "data": [{ "id": 1, "assetTag": "LAP-0001" }],
            "pagination": { "page": 1, "limit": 10, "total": 1, "totalPages": 1 }
        });

        let envelope: ApiEnvelope<Vec<Record>> = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert!(envelope.message.is_none());
        assert_eq!(envelope.pagination.unwrap().total_pages, 1);
    }

    #[test]
    fn login_data_keeps_unknown_profile_fields() {
        let body = json!({
            "data": {
                "accessToken": "abc",
                "user": { "id": 7, "name": "Dana", "role": "admin", "department": "IT" }
            },
            "message": "Login successful"
        });

        let envelope: ApiEnvelope<LoginData> = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.data.access_token, "abc");
        assert_eq!(envelope.data.user.role.as_deref(), Some("admin"));
        assert_eq!(envelope.data.user.extra["department"], "IT");
    }
}
