//! Publication create/edit form.
//!
//! Validation runs locally first (required fields, DOI syntax), then the DOI
//! uniqueness pre-check, then the create or update call.

use serde_json::{Map, Value};

use crate::api::{ApiClient, Attachment};
use crate::errors::ClientError;
use crate::models::{
    compose_authors, join_user_ids, CurrentUser, Member, PublicationKind, Record, RecordId,
    PENDING_STATUS,
};
use crate::notify::Toasts;
use crate::validation::{require_fields, validate_doi};

#[derive(Debug, Clone)]
pub struct PublicationForm {
    pub kind: PublicationKind,
    pub title: String,
    /// Lab members picked as authors.
    pub members: Vec<Member>,
    /// Comma-separated external author names.
    pub extra_authors: String,
    pub doi: String,
    pub date_publication: String,
    /// Kind-specific fields (journal, volume, patent number, ...).
    pub extra: Map<String, Value>,
    pub attachment: Option<Attachment>,
}

impl PublicationForm {
    pub fn new(kind: PublicationKind) -> Self {
        Self {
            kind,
            title: String::new(),
            members: Vec::new(),
            extra_authors: String::new(),
            doi: String::new(),
            date_publication: String::new(),
            extra: Map::new(),
            attachment: None,
        }
    }

    pub fn author(&self) -> String {
        compose_authors(&self.members, &self.extra_authors)
    }

    /// Contributor ids: the submitter first, then the picked members.
    pub fn contributor_ids(&self, submitter: &CurrentUser) -> Vec<RecordId> {
        self.with_members(vec![submitter.id.clone()])
    }

    /// Contributor ids of an edited record: its stored contributors are
    /// kept, newly picked members are appended.
    pub fn merged_contributor_ids(&self, original: &Record) -> Vec<RecordId> {
        self.with_members(original.contributor_ids())
    }

    fn with_members(&self, mut ids: Vec<RecordId>) -> Vec<RecordId> {
        for member in &self.members {
            if !ids.contains(&member.id) {
                ids.push(member.id.clone());
            }
        }
        ids
    }

    /// Request body for a new submission.
    pub fn payload(&self, submitter: &CurrentUser) -> Map<String, Value> {
        self.payload_for(&self.contributor_ids(submitter))
    }

    fn payload_for(&self, contributors: &[RecordId]) -> Map<String, Value> {
        let mut payload = self.extra.clone();
        payload.insert("title".to_string(), Value::String(self.title.trim().to_string()));
        payload.insert("author".to_string(), Value::String(self.author()));
        payload.insert("DOI".to_string(), Value::String(self.doi.trim().to_string()));
        payload.insert(
            "date_publication".to_string(),
            Value::String(self.date_publication.trim().to_string()),
        );
        payload.insert(
            "id_user".to_string(),
            Value::String(join_user_ids(contributors)),
        );
        payload
    }

    /// Local checks only; no network.
    pub fn validate(&self, submitter: &CurrentUser) -> Result<(), ClientError> {
        self.validate_payload(&self.payload(submitter))
    }

    fn validate_payload(&self, payload: &Map<String, Value>) -> Result<(), ClientError> {
        require_fields(payload, &["title", "author", "date_publication"])?;
        validate_doi(&self.doi, self.kind.requires_doi())
    }

    async fn ensure_unique_doi(&self, client: &ApiClient) -> Result<(), ClientError> {
        let doi = self.doi.trim();
        if doi.is_empty() {
            return Ok(());
        }
        if client.doi_exists(self.kind.doi_check_path(), doi).await? {
            return Err(ClientError::Conflict(format!("DOI {} already exists", doi)));
        }
        Ok(())
    }

    /// Create the publication as a pending submission.
    pub async fn submit(
        &self,
        client: &ApiClient,
        submitter: &CurrentUser,
        toasts: &Toasts,
    ) -> Result<Record, ClientError> {
        let result = self.try_submit(client, submitter).await;
        report(toasts, &result, "created");
        result
    }

    async fn try_submit(
        &self,
        client: &ApiClient,
        submitter: &CurrentUser,
    ) -> Result<Record, ClientError> {
        self.validate(submitter)?;
        self.ensure_unique_doi(client).await?;

        let mut payload = self.payload(submitter);
        payload.insert("status".to_string(), Value::String(PENDING_STATUS.to_string()));

        match &self.attachment {
            Some(attachment) => {
                client
                    .create_record_multipart(self.kind.path(), &payload, attachment.clone())
                    .await
            }
            None => client.create_record(self.kind.path(), &payload).await,
        }
    }

    /// Update `original` as stored by the backend. Its contributors are
    /// kept, and the DOI pre-check is skipped when the DOI did not change.
    pub async fn update(
        &self,
        client: &ApiClient,
        original: &Record,
        toasts: &Toasts,
    ) -> Result<Record, ClientError> {
        let result = self.try_update(client, original).await;
        report(toasts, &result, "updated");
        result
    }

    async fn try_update(&self, client: &ApiClient, original: &Record) -> Result<Record, ClientError> {
        let id = original
            .id()
            .ok_or_else(|| ClientError::NotFound("Publication has no id".to_string()))?;
        let payload = self.payload_for(&self.merged_contributor_ids(original));
        self.validate_payload(&payload)?;

        if !self.doi.trim().eq_ignore_ascii_case(original.text("DOI").trim()) {
            self.ensure_unique_doi(client).await?;
        }
        client.update_record(self.kind.path(), &id, &payload).await
    }
}

fn report(toasts: &Toasts, result: &Result<Record, ClientError>, verb: &str) {
    match result {
        Ok(_) => toasts.success(format!("Publication {}", verb)),
        Err(e) => toasts.error(e.message()),
    }
}
