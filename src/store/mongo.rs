//! # MongoDB Document Store
//!
//! Persists collections in a MongoDB database through the driver's blocking
//! API. Callers on an async runtime run store calls on the blocking pool.
//!
//! Timestamps are stored as BSON datetimes so range filters compare instants.
//! Integers are written as Int64; Int32 and ObjectId values written by other
//! clients are read back as integers and hex strings.

use bson::{doc, Bson, Document as BsonDocument};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::sync::{Client, Collection, Database};

use super::errors::{StoreError, StoreResult};
use super::filter::{Filter, FilterExpr, FilterOperator};
use super::DocumentStore;
use crate::document::{DocValue, Document, ID_FIELD};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Document store backed by a MongoDB database
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connects to `uri` and checks the server answers a ping.
    pub fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).map_err(unavailable)?;
        let database = client.database(database);
        database
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(unavailable)?;
        Ok(Self { database })
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.collection(name)
    }
}

fn unavailable(err: MongoError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}

impl DocumentStore for MongoStore {
    fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let cursor = self
            .collection(collection)
            .find(filter_document(filter))
            .sort(doc! { "_id": 1 })
            .run()
            .map_err(unavailable)?;

        cursor
            .map(|item| item.map(|raw| from_bson_document(&raw)).map_err(unavailable))
            .collect()
    }

    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<String> {
        let id = document
            .id()
            .map(str::to_string)
            .ok_or_else(|| StoreError::MissingId(collection.to_string()))?;

        match self.collection(collection).insert_one(to_bson_document(&document)).run() {
            Ok(_) => Ok(id),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                id,
            }),
            Err(err) => Err(unavailable(err)),
        }
    }

    fn update_one(&self, collection: &str, filter: &Filter, set: &Document) -> StoreResult<u64> {
        let collection = self.collection(collection);
        let filter = filter_document(filter);

        // `$set` must not be empty; an empty patch only reports the match.
        if set.is_empty() {
            let found = collection.find_one(filter).run().map_err(unavailable)?;
            return Ok(found.map_or(0, |_| 1));
        }

        let mut fields = to_bson_document(set);
        fields.remove(ID_FIELD);
        let result = collection
            .update_one(filter, doc! { "$set": fields })
            .run()
            .map_err(unavailable)?;
        Ok(result.matched_count)
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let result = self
            .collection(collection)
            .delete_one(filter_document(filter))
            .run()
            .map_err(unavailable)?;
        Ok(result.deleted_count)
    }
}

// =============================================================================
// BSON conversion
// =============================================================================

fn to_bson(value: &DocValue) -> Bson {
    match value {
        DocValue::Null => Bson::Null,
        DocValue::Bool(b) => Bson::Boolean(*b),
        DocValue::Int(i) => Bson::Int64(*i),
        DocValue::Float(f) => Bson::Double(*f),
        DocValue::String(s) => Bson::String(s.clone()),
        DocValue::Timestamp(ts) => Bson::DateTime(bson::DateTime::from_chrono(*ts)),
        DocValue::Array(items) => Bson::Array(items.iter().map(to_bson).collect()),
        DocValue::Object(doc) => Bson::Document(to_bson_document(doc)),
    }
}

fn to_bson_document(document: &Document) -> BsonDocument {
    document
        .iter()
        .map(|(field, value)| (field.clone(), to_bson(value)))
        .collect()
}

fn from_bson(value: &Bson) -> DocValue {
    match value {
        Bson::Null | Bson::Undefined => DocValue::Null,
        Bson::Boolean(b) => DocValue::Bool(*b),
        Bson::Int32(i) => DocValue::Int(i64::from(*i)),
        Bson::Int64(i) => DocValue::Int(*i),
        Bson::Double(f) => DocValue::Float(*f),
        Bson::String(s) => DocValue::String(s.clone()),
        Bson::DateTime(dt) => DocValue::Timestamp(dt.to_chrono()),
        Bson::ObjectId(oid) => DocValue::String(oid.to_hex()),
        Bson::Array(items) => DocValue::Array(items.iter().map(from_bson).collect()),
        Bson::Document(doc) => DocValue::Object(from_bson_document(doc)),
        other => DocValue::String(other.to_string()),
    }
}

fn from_bson_document(document: &BsonDocument) -> Document {
    document
        .iter()
        .map(|(field, value)| (field.clone(), from_bson(value)))
        .collect()
}

fn clause_document(expr: &FilterExpr) -> BsonDocument {
    let value = to_bson(&expr.value);
    let predicate = match expr.operator {
        FilterOperator::Eq => value,
        op => {
            let mut predicate = BsonDocument::new();
            predicate.insert(op.as_str(), value);
            Bson::Document(predicate)
        }
    };

    let mut clause = BsonDocument::new();
    clause.insert(expr.field.clone(), predicate);
    clause
}

/// Query document for `filter`; several clauses are joined with `$and`.
fn filter_document(filter: &Filter) -> BsonDocument {
    let mut clauses: Vec<BsonDocument> = filter.clauses.iter().map(clause_document).collect();
    match clauses.len() {
        0 | 1 => clauses.pop().unwrap_or_default(),
        _ => doc! { "$and": clauses },
    }
}
