//! Object-id identifiers, as stored in the `_id` field by the original
//! collections: a fresh BSON ObjectId rendered as 24 lowercase hex characters.

use bson::oid::ObjectId;

/// Generates a fresh 24-character hex identifier.
pub fn generate_id() -> String {
    ObjectId::new().to_hex()
}
