//! Collection endpoints shared by every entity screen.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{ApiClient, ApiResponse};
use crate::errors::ClientError;
use crate::listing::CollectionBackend;
use crate::models::{render_value, Record, RecordId};

/// Peer-review action on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Accept,
    Reject,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Accept => "accept",
            ModerationAction::Reject => "reject",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            ModerationAction::Accept => "accepted",
            ModerationAction::Reject => "rejected",
        }
    }
}

/// File sent along with a multipart create.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub field: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DoiCheck {
    Flag { exists: bool },
    Bare(bool),
}

fn item_path(path: &str, id: &RecordId) -> String {
    format!("{}/{}", path.trim_end_matches('/'), id)
}

fn moderation_path(path: &str, action: ModerationAction, id: &RecordId) -> String {
    format!("{}/{}/{}", path.trim_end_matches('/'), action.as_str(), id)
}

impl ApiClient {
    /// GET /{collection} - Fetch the whole collection, optionally filtered.
    pub async fn list_records(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<Record>, ClientError> {
        let records: ApiResponse<Vec<Record>> = self.get_json(path, query).await?;
        Ok(records.into_inner())
    }

    /// GET /{collection}/{id} - Fetch one record.
    pub async fn fetch_record(&self, path: &str, id: &RecordId) -> Result<Record, ClientError> {
        let value: Value = self.get_json(&item_path(path, id), &[]).await?;
        Ok(Record::from(value))
    }

    /// POST /{collection} - Create a record from a JSON payload.
    pub async fn create_record(
        &self,
        path: &str,
        payload: &Map<String, Value>,
    ) -> Result<Record, ClientError> {
        let value: Value = self.post_json(path, payload).await?;
        Ok(Record::from(value))
    }

    /// POST /{collection} - Create a record with an uploaded file.
    pub async fn create_record_multipart(
        &self,
        path: &str,
        payload: &Map<String, Value>,
        attachment: Attachment,
    ) -> Result<Record, ClientError> {
        let mut form = Form::new();
        for (key, value) in payload {
            form = form.text(key.clone(), render_value(value));
        }
        let part = Part::bytes(attachment.bytes)
            .file_name(attachment.file_name)
            .mime_str(&attachment.mime_type)
            .map_err(|e| ClientError::field("file", format!("Invalid MIME type: {}", e)))?;
        form = form.part(attachment.field, part);

        let body = self
            .execute(self.request(Method::POST, path).multipart(form))
            .await?;
        let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        Ok(Record::from(value))
    }

    /// PUT /{collection}/{id} - Update a record.
    pub async fn update_record(
        &self,
        path: &str,
        id: &RecordId,
        payload: &Map<String, Value>,
    ) -> Result<Record, ClientError> {
        let value: Value = self.put_json(&item_path(path, id), payload).await?;
        Ok(Record::from(value))
    }

    /// DELETE /{collection}/{id} - Delete a record.
    pub async fn delete_record(&self, path: &str, id: &RecordId) -> Result<(), ClientError> {
        self.delete_path(&item_path(path, id)).await
    }

    /// POST /{collection}/{accept|reject}/{id} - Moderate a pending submission.
    pub async fn moderate_record(
        &self,
        path: &str,
        action: ModerationAction,
        id: &RecordId,
    ) -> Result<(), ClientError> {
        self.post_empty(&moderation_path(path, action, id)).await
    }

    /// POST /checkDOIExists... - True when another record already uses `doi`.
    pub async fn doi_exists(&self, check_path: &str, doi: &str) -> Result<bool, ClientError> {
        let check: DoiCheck = self
            .post_json(check_path, &serde_json::json!({ "DOI": doi.trim() }))
            .await?;
        Ok(match check {
            DoiCheck::Flag { exists } => exists,
            DoiCheck::Bare(exists) => exists,
        })
    }
}

#[async_trait]
impl CollectionBackend for ApiClient {
    async fn list(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<Record>, ClientError> {
        self.list_records(path, query).await
    }

    async fn delete(&self, path: &str, id: &RecordId) -> Result<(), ClientError> {
        self.delete_record(path, id).await
    }

    async fn moderate(
        &self,
        path: &str,
        action: ModerationAction,
        id: &RecordId,
    ) -> Result<(), ClientError> {
        self.moderate_record(path, action, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_paths() {
        let id = RecordId::from(42);
        assert_eq!(item_path("/articles/", &id), "/articles/42");
        assert_eq!(
            moderation_path("/articles", ModerationAction::Reject, &id),
            "/articles/reject/42"
        );
    }

    #[test]
    fn test_doi_check_shapes() {
        let flag: DoiCheck = serde_json::from_str(r#"{"exists":true}"#).unwrap();
        assert!(matches!(flag, DoiCheck::Flag { exists: true }));
        let bare: DoiCheck = serde_json::from_str("false").unwrap();
        assert!(matches!(bare, DoiCheck::Bare(false)));
    }
}
