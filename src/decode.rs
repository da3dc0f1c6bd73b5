//! Snapshot decoding — raw remote documents into typed task records.
//!
//! Decoding is table-driven: every document field has an explicit
//! [`FieldRule`] saying what happens when it is missing and what happens
//! when it is present but malformed. Documents fail individually; a bad
//! document is logged and dropped without aborting the rest of the batch.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::model::{fields, Task, TaskStatus};
use crate::remote::{Document, RawDocument, Timestamp};

/// Per-document decode failure. Logged and dropped by [`decode_snapshot`],
/// never escalated past the decoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` has the wrong type")]
    WrongType(&'static str),
    #[error("malformed timestamp in field `{0}`")]
    BadTimestamp(&'static str),
}

// ─── Field rules ─────────────────────────────────────────────────────────────

/// Policy for a field that is absent (or JSON null) in the raw document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Substitute the field's documented default.
    Default,
    /// Drop the document.
    Fatal,
}

/// Policy for a field that is present but does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedPolicy {
    Default,
    Fatal,
}

/// One row of the decode table.
#[derive(Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub on_missing: MissingPolicy,
    pub on_malformed: MalformedPolicy,
}

const TITLE_RULE: FieldRule = FieldRule {
    name: fields::TITLE,
    on_missing: MissingPolicy::Default,
    on_malformed: MalformedPolicy::Default,
};
const DESCRIPTION_RULE: FieldRule = FieldRule {
    name: fields::DESCRIPTION,
    on_missing: MissingPolicy::Default,
    on_malformed: MalformedPolicy::Default,
};
const STATUS_RULE: FieldRule = FieldRule {
    name: fields::STATUS,
    on_missing: MissingPolicy::Default,
    on_malformed: MalformedPolicy::Default,
};
const DUE_DATE_RULE: FieldRule = FieldRule {
    name: fields::DUE_DATE,
    on_missing: MissingPolicy::Default,
    on_malformed: MalformedPolicy::Fatal,
};
const OWNER_RULE: FieldRule = FieldRule {
    name: fields::OWNER_ID,
    on_missing: MissingPolicy::Fatal,
    on_malformed: MalformedPolicy::Fatal,
};
const CREATED_AT_RULE: FieldRule = FieldRule {
    name: fields::CREATED_AT,
    on_missing: MissingPolicy::Default,
    on_malformed: MalformedPolicy::Default,
};
const UPDATED_AT_RULE: FieldRule = FieldRule {
    name: fields::UPDATED_AT,
    on_missing: MissingPolicy::Default,
    on_malformed: MalformedPolicy::Default,
};

/// The complete decode table.
///
/// Defaults: title/description → `""`, status → `open`, dueDate → absent,
/// createdAt/updatedAt → decode-time now. Only a malformed dueDate and a
/// missing or non-string owner are fatal for a document — a task without an
/// owner can never satisfy the ownership invariant, so it is dropped rather
/// than fabricated.
pub const FIELD_RULES: &[FieldRule] = &[
    TITLE_RULE,
    DESCRIPTION_RULE,
    STATUS_RULE,
    DUE_DATE_RULE,
    OWNER_RULE,
    CREATED_AT_RULE,
    UPDATED_AT_RULE,
];

// ─── Field extractors ────────────────────────────────────────────────────────

fn string_field(doc: &Document, rule: &FieldRule) -> Result<String, DecodeError> {
    match doc.get(rule.name) {
        None | Some(Value::Null) => match rule.on_missing {
            MissingPolicy::Default => Ok(String::new()),
            MissingPolicy::Fatal => Err(DecodeError::MissingField(rule.name)),
        },
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => match rule.on_malformed {
            MalformedPolicy::Default => Ok(String::new()),
            MalformedPolicy::Fatal => Err(DecodeError::WrongType(rule.name)),
        },
    }
}

fn status_field(doc: &Document) -> TaskStatus {
    match doc.get(STATUS_RULE.name) {
        Some(Value::String(s)) => TaskStatus::parse(s).unwrap_or_default(),
        _ => TaskStatus::default(),
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    serde_json::from_value::<Timestamp>(value.clone())
        .ok()?
        .to_datetime()
}

fn instant_field(
    doc: &Document,
    rule: &FieldRule,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, DecodeError> {
    match doc.get(rule.name) {
        None | Some(Value::Null) => match rule.on_missing {
            MissingPolicy::Default => Ok(now),
            MissingPolicy::Fatal => Err(DecodeError::MissingField(rule.name)),
        },
        Some(value) => match parse_timestamp(value) {
            Some(dt) => Ok(dt),
            None => match rule.on_malformed {
                MalformedPolicy::Default => Ok(now),
                MalformedPolicy::Fatal => Err(DecodeError::BadTimestamp(rule.name)),
            },
        },
    }
}

fn due_date_field(doc: &Document) -> Result<Option<DateTime<Utc>>, DecodeError> {
    match doc.get(DUE_DATE_RULE.name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match parse_timestamp(value) {
            Some(dt) => Ok(Some(dt)),
            None => Err(DecodeError::BadTimestamp(DUE_DATE_RULE.name)),
        },
    }
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Decode one raw document. `now` is substituted for missing/unparsable
/// creation and update instants; the batch decoder captures it once so every
/// document in a snapshot defaults consistently.
pub fn decode_document(doc: &RawDocument, now: DateTime<Utc>) -> Result<Task, DecodeError> {
    Ok(Task {
        id: doc.id.clone(),
        title: string_field(&doc.fields, &TITLE_RULE)?,
        description: string_field(&doc.fields, &DESCRIPTION_RULE)?,
        due_date: due_date_field(&doc.fields)?,
        status: status_field(&doc.fields),
        owner_id: string_field(&doc.fields, &OWNER_RULE)?,
        created_at: instant_field(&doc.fields, &CREATED_AT_RULE, now)?,
        updated_at: instant_field(&doc.fields, &UPDATED_AT_RULE, now)?,
    })
}

/// Decode a full snapshot batch. Documents that fail to decode are logged
/// and skipped; the remaining batch is unaffected. Output order is the
/// delivery order — the cache applies the total order.
pub fn decode_snapshot(docs: &[RawDocument]) -> Vec<Task> {
    let now = Utc::now();
    docs.iter()
        .filter_map(|doc| match decode_document(doc, now) {
            Ok(task) => Some(task),
            Err(err) => {
                warn!(doc_id = %doc.id, error = %err, "skipping undecodable task document");
                None
            }
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(fields_json: Value) -> RawDocument {
        let Value::Object(fields) = fields_json else {
            panic!("fixture must be a JSON object");
        };
        RawDocument {
            id: "doc-1".into(),
            fields,
        }
    }

    fn complete_doc() -> Value {
        json!({
            "title": "write tests",
            "description": "cover the decode table",
            "dueDate": { "seconds": 1_750_000_000, "nanos": 0 },
            "status": "open",
            "ownerId": "user-1",
            "createdAt": { "seconds": 1_740_000_000, "nanos": 0 },
            "updatedAt": { "seconds": 1_740_000_100, "nanos": 0 },
        })
    }

    #[test]
    fn decodes_a_complete_document() {
        let task = decode_document(&raw(complete_doc()), Utc::now()).unwrap();
        assert_eq!(task.id, "doc-1");
        assert_eq!(task.title, "write tests");
        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.owner_id, "user-1");
        assert_eq!(task.due_date.unwrap().timestamp(), 1_750_000_000);
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn missing_title_and_description_default_to_empty() {
        let mut doc = complete_doc();
        doc.as_object_mut().unwrap().remove("title");
        doc.as_object_mut().unwrap().remove("description");
        let task = decode_document(&raw(doc), Utc::now()).unwrap();
        assert_eq!(task.title, "");
        assert_eq!(task.description, "");
    }

    #[test]
    fn non_string_title_defaults_to_empty() {
        let mut doc = complete_doc();
        doc["title"] = json!(42);
        let task = decode_document(&raw(doc), Utc::now()).unwrap();
        assert_eq!(task.title, "");
    }

    #[test]
    fn missing_or_unrecognized_status_defaults_to_open() {
        let mut doc = complete_doc();
        doc.as_object_mut().unwrap().remove("status");
        assert_eq!(
            decode_document(&raw(doc), Utc::now()).unwrap().status,
            TaskStatus::Open
        );

        let mut doc = complete_doc();
        doc["status"] = json!("archived");
        assert_eq!(
            decode_document(&raw(doc), Utc::now()).unwrap().status,
            TaskStatus::Open
        );
    }

    #[test]
    fn missing_due_date_is_absent() {
        let mut doc = complete_doc();
        doc.as_object_mut().unwrap().remove("dueDate");
        assert_eq!(decode_document(&raw(doc), Utc::now()).unwrap().due_date, None);

        let mut doc = complete_doc();
        doc["dueDate"] = Value::Null;
        assert_eq!(decode_document(&raw(doc), Utc::now()).unwrap().due_date, None);
    }

    #[test]
    fn malformed_due_date_is_fatal() {
        let mut doc = complete_doc();
        doc["dueDate"] = json!("tomorrow");
        assert_eq!(
            decode_document(&raw(doc), Utc::now()),
            Err(DecodeError::BadTimestamp(fields::DUE_DATE))
        );
    }

    #[test]
    fn out_of_range_due_date_is_fatal() {
        let mut doc = complete_doc();
        doc["dueDate"] = json!({ "seconds": i64::MAX, "nanos": 0 });
        assert_eq!(
            decode_document(&raw(doc), Utc::now()),
            Err(DecodeError::BadTimestamp(fields::DUE_DATE))
        );
    }

    #[test]
    fn missing_owner_is_fatal() {
        let mut doc = complete_doc();
        doc.as_object_mut().unwrap().remove("ownerId");
        assert_eq!(
            decode_document(&raw(doc), Utc::now()),
            Err(DecodeError::MissingField(fields::OWNER_ID))
        );
    }

    #[test]
    fn missing_timestamps_default_to_now() {
        let mut doc = complete_doc();
        doc.as_object_mut().unwrap().remove("createdAt");
        doc.as_object_mut().unwrap().remove("updatedAt");
        let now = Utc::now();
        let task = decode_document(&raw(doc), now).unwrap();
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);
    }

    #[test]
    fn malformed_created_at_defaults_to_now() {
        let mut doc = complete_doc();
        doc["createdAt"] = json!("not-a-timestamp");
        let now = Utc::now();
        let task = decode_document(&raw(doc), now).unwrap();
        assert_eq!(task.created_at, now);
    }

    #[test]
    fn bad_document_does_not_abort_the_batch() {
        let mut bad = complete_doc();
        bad["dueDate"] = json!("tomorrow");
        let docs = vec![
            raw(complete_doc()),
            raw(bad),
            raw(complete_doc()),
            raw(complete_doc()),
        ];
        let tasks = decode_snapshot(&docs);
        assert_eq!(tasks.len(), 3);
    }

    #[test]
    fn batch_with_one_title_missing_keeps_all_documents() {
        let mut titleless = complete_doc();
        titleless.as_object_mut().unwrap().remove("title");
        let docs = vec![
            raw(complete_doc()),
            raw(complete_doc()),
            raw(complete_doc()),
            raw(titleless),
        ];
        let tasks = decode_snapshot(&docs);
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[3].title, "");
    }

    #[test]
    fn decode_table_covers_every_wire_field() {
        let names: Vec<_> = FIELD_RULES.iter().map(|r| r.name).collect();
        for field in [
            fields::TITLE,
            fields::DESCRIPTION,
            fields::DUE_DATE,
            fields::STATUS,
            fields::OWNER_ID,
            fields::CREATED_AT,
            fields::UPDATED_AT,
        ] {
            assert!(names.contains(&field), "no decode rule for `{field}`");
        }
    }
}
