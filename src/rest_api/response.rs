//! # Response Formatting
//!
//! Success bodies for the write endpoints. List responses are a bare JSON
//! array of documents.

use serde::Serialize;

/// Create response with the effective identifier
#[derive(Debug, Clone, Serialize)]
pub struct InsertResponse {
    pub success: bool,
    pub inserted_id: String,
}

impl InsertResponse {
    pub fn new(inserted_id: impl Into<String>) -> Self {
        Self {
            success: true,
            inserted_id: inserted_id.into(),
        }
    }
}

/// Update response
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub updated_id: String,
}

impl UpdateResponse {
    pub fn new(updated_id: impl Into<String>) -> Self {
        Self {
            success: true,
            updated_id: updated_id.into(),
        }
    }
}

/// Delete response
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: String,
}

impl DeleteResponse {
    pub fn new(deleted_id: impl Into<String>) -> Self {
        Self {
            success: true,
            deleted_id: deleted_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_response_shapes() {
        assert_eq!(
            serde_json::to_value(InsertResponse::new("a1")).unwrap(),
            json!({"success": true, "inserted_id": "a1"})
        );
        assert_eq!(
            serde_json::to_value(UpdateResponse::new("a1")).unwrap(),
            json!({"success": true, "updated_id": "a1"})
        );
        assert_eq!(
            serde_json::to_value(DeleteResponse::new("a1")).unwrap(),
            json!({"success": true, "deleted_id": "a1"})
        );
    }
}
