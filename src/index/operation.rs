use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use crate::core::types::PlaceId;
use crate::mapper::field_mapper::Payload;

/// One entry of a bulk request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BulkOperation {
    /// Full insert, replaces any existing document
    Create { id: PlaceId, payload: Payload },
    /// Partial update: the given fields replace the stored ones
    Update { id: PlaceId, payload: Payload },
    Delete { id: PlaceId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkAction {
    Create,
    Update,
    Delete,
}

impl BulkAction {
    /// Action name in the bulk API
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Create => "index",
            BulkAction::Update => "update",
            BulkAction::Delete => "delete",
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BulkOperation {
    pub fn id(&self) -> PlaceId {
        match self {
            BulkOperation::Create { id, .. }
            | BulkOperation::Update { id, .. }
            | BulkOperation::Delete { id } => *id,
        }
    }

    pub fn action(&self) -> BulkAction {
        match self {
            BulkOperation::Create { .. } => BulkAction::Create,
            BulkOperation::Update { .. } => BulkAction::Update,
            BulkOperation::Delete { .. } => BulkAction::Delete,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            BulkOperation::Create { payload, .. } | BulkOperation::Update { payload, .. } => {
                Some(payload)
            }
            BulkOperation::Delete { .. } => None,
        }
    }

    /// Action line followed by the optional source line, as sent to a bulk endpoint.
    pub fn to_bulk_lines(&self, index: &str, doc_type: &str) -> Vec<Value> {
        let mut header = Payload::new();
        header.insert(
            self.action().as_str().to_string(),
            json!({
                "_index": index,
                "_type": doc_type,
                "_id": self.id().to_string(),
            }),
        );
        let header = Value::Object(header);

        match self {
            BulkOperation::Create { payload, .. } => vec![header, Value::Object(payload.clone())],
            BulkOperation::Update { payload, .. } => {
                vec![header, json!({ "doc": Value::Object(payload.clone()) })]
            }
            BulkOperation::Delete { .. } => vec![header],
        }
    }
}

/// Outcome of one operation in a bulk request
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemResult {
    pub id: PlaceId,
    pub action: BulkAction,
    pub error: Option<String>,
}

impl BulkItemResult {
    pub fn ok(id: PlaceId, action: BulkAction) -> Self {
        BulkItemResult { id, action, error: None }
    }

    pub fn failed(id: PlaceId, action: BulkAction, error: impl Into<String>) -> Self {
        BulkItemResult { id, action, error: Some(error.into()) }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Per-item results of a bulk request, in request order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkResponse {
    pub items: Vec<BulkItemResult>,
}

impl BulkResponse {
    pub fn new(items: Vec<BulkItemResult>) -> Self {
        BulkResponse { items }
    }

    pub fn has_failures(&self) -> bool {
        self.items.iter().any(BulkItemResult::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BulkItemResult> {
        self.items.iter().filter(|item| item.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// One line per failed item: position, action, id and reason.
    pub fn failure_message(&self) -> String {
        let mut message = String::from("failure in bulk execution:");
        for (pos, item) in self.items.iter().enumerate() {
            if let Some(error) = &item.error {
                message.push_str(&format!(
                    "\n[{}]: {} of place {} failed: {}",
                    pos, item.action, item.id, error
                ));
            }
        }
        message
    }
}
