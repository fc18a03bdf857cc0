//! Generic list-manage screen.
//!
//! Fetches a whole collection, then searches, paginates and selects rows
//! client-side. Deletions and moderation actions update local state from the
//! per-item results instead of re-fetching.

mod pagination;
mod search;
mod selection;

pub use pagination::*;
pub use search::*;
pub use selection::*;

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use async_trait::async_trait;
use futures::future::join_all;

use crate::api::ModerationAction;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::entities::EntityConfig;
use crate::errors::ClientError;
use crate::models::{PublicationStatus, Record, RecordId};
use crate::notify::Toasts;
use crate::session::Session;

/// Backend operations a list screen needs.
#[async_trait]
pub trait CollectionBackend: Send + Sync {
    async fn list(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<Record>, ClientError>;
    async fn delete(&self, path: &str, id: &RecordId) -> Result<(), ClientError>;
    async fn moderate(
        &self,
        path: &str,
        action: ModerationAction,
        id: &RecordId,
    ) -> Result<(), ClientError>;
}

/// Blocking confirmation shown before destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Per-item outcome of a bulk action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    pub succeeded: Vec<RecordId>,
    pub failed: Vec<(RecordId, ClientError)>,
}

impl BulkReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Delete,
    Moderate(ModerationAction),
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Action::Delete => "delete",
            Action::Moderate(action) => action.as_str(),
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            Action::Delete => "deleted",
            Action::Moderate(action) => action.past_tense(),
        }
    }
}

/// State of one collection screen.
#[derive(Debug, Clone)]
pub struct ListManager {
    config: EntityConfig,
    items: Vec<Record>,
    query: String,
    pagination: Pagination,
    selection: Selection,
    error: Option<String>,
    loaded_for: Option<(Option<String>, Option<RecordId>)>,
    toasts: Toasts,
}

impl ListManager {
    pub fn new(config: EntityConfig, toasts: Toasts) -> Self {
        let pagination = Pagination::new(config.page_size.unwrap_or(DEFAULT_PAGE_SIZE));
        Self {
            config,
            items: Vec::new(),
            query: String::new(),
            pagination,
            selection: Selection::default(),
            error: None,
            loaded_for: None,
            toasts,
        }
    }

    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    /// Visible error message from the last load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the whole collection.
    ///
    /// A pending queue keeps only pending rows the current user did not
    /// contribute to, and cannot load without a known current user.
    /// A failed fetch empties the collection and sets the error message.
    pub async fn load<B>(&mut self, backend: &B, session: &Session) -> Result<usize, ClientError>
    where
        B: CollectionBackend + ?Sized,
    {
        self.loaded_for = Some(session.identity());
        let owner = session.current_user.as_ref().map(|user| user.id.clone());
        if self.config.moderation && owner.is_none() {
            return Err(self.load_failed(ClientError::Unauthorized(
                "The current user is unknown".to_string(),
            )));
        }

        match backend.list(self.config.path, self.config.filter).await {
            Ok(records) => {
                let moderation = self.config.moderation;
                self.items = records
                    .into_iter()
                    .filter(|record| !moderation || is_reviewable(record, owner.as_ref()))
                    .collect();
                self.error = None;
                self.after_items_changed();
                tracing::debug!(entity = self.config.key, count = self.items.len(), "Collection loaded");
                Ok(self.items.len())
            }
            Err(e) => Err(self.load_failed(e)),
        }
    }

    fn load_failed(&mut self, e: ClientError) -> ClientError {
        tracing::warn!(entity = self.config.key, "Failed to load collection: {}", e);
        self.items.clear();
        self.selection.clear();
        self.pagination.reset();
        self.error = Some(format!("Failed to load {}: {}", self.config.label, e.message()));
        e
    }

    /// Whether `id` is a row of the loaded collection.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.items.iter().any(|record| record.id().as_ref() == Some(id))
    }

    /// Reload only when the token or user changed since the last load.
    pub async fn reload_if_session_changed<B>(
        &mut self,
        backend: &B,
        session: &Session,
    ) -> Option<Result<usize, ClientError>>
    where
        B: CollectionBackend + ?Sized,
    {
        if self.loaded_for.as_ref() == Some(&session.identity()) {
            return None;
        }
        Some(self.load(backend, session).await)
    }

    // --- search ---

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Update the search text; always returns to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.pagination.reset();
    }

    pub fn filtered(&self) -> Vec<&Record> {
        filter(&self.items, &self.query, &self.config.search)
    }

    pub fn filtered_len(&self) -> usize {
        self.items
            .iter()
            .filter(|record| matches(record, &self.query, &self.config.search))
            .count()
    }

    // --- pagination ---

    pub fn current_page(&self) -> usize {
        self.pagination.current()
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.filtered_len())
    }

    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        self.pagination.numbers(self.filtered_len())
    }

    pub fn go_to_page(&mut self, page: usize) {
        let total = self.filtered_len();
        self.pagination.go_to(page, total);
    }

    pub fn next_page(&mut self) {
        let total = self.filtered_len();
        self.pagination.next(total);
    }

    pub fn previous_page(&mut self) {
        let total = self.filtered_len();
        self.pagination.previous(total);
    }

    /// "Previous" control enabled.
    pub fn has_previous(&self) -> bool {
        self.pagination.has_previous()
    }

    /// "Next" control enabled.
    pub fn has_next(&self) -> bool {
        self.pagination.has_next(self.filtered_len())
    }

    /// Rows on the current page.
    pub fn visible(&self) -> Vec<&Record> {
        let filtered = self.filtered();
        let range = self.pagination.range(filtered.len());
        filtered[range].to_vec()
    }

    pub fn visible_ids(&self) -> Vec<RecordId> {
        self.visible().iter().filter_map(|record| record.id()).collect()
    }

    // --- selection ---

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selection.contains(id)
    }

    /// Row checkbox. Ids outside the collection are ignored.
    pub fn toggle_row(&mut self, id: RecordId) {
        if self.contains(&id) {
            self.selection.toggle(id);
        }
    }

    /// Select a row without toggling. Returns false for unknown ids.
    pub fn select_row(&mut self, id: RecordId) -> bool {
        if !self.contains(&id) {
            return false;
        }
        self.selection.insert(id);
        true
    }

    /// Header checkbox state.
    pub fn page_selected(&self) -> bool {
        self.selection.all_selected(&self.visible_ids())
    }

    /// Header checkbox: acts on the rows of the current page only.
    pub fn toggle_page(&mut self) {
        let visible = self.visible_ids();
        self.selection.toggle_all(&visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- actions ---

    /// Delete one row after confirmation. Returns `Ok(false)` when cancelled.
    pub async fn delete_one<B, C>(
        &mut self,
        backend: &B,
        id: &RecordId,
        confirm: &C,
    ) -> Result<bool, ClientError>
    where
        B: CollectionBackend + ?Sized,
        C: Confirm + ?Sized,
    {
        self.act_on_one(backend, Action::Delete, id, confirm).await
    }

    /// Delete every selected row after one confirmation.
    pub async fn delete_selected<B, C>(&mut self, backend: &B, confirm: &C) -> Option<BulkReport>
    where
        B: CollectionBackend + ?Sized,
        C: Confirm + ?Sized,
    {
        self.act_on_selection(backend, Action::Delete, confirm).await
    }

    /// Accept or reject one pending row.
    pub async fn moderate_one<B, C>(
        &mut self,
        backend: &B,
        action: ModerationAction,
        id: &RecordId,
        confirm: &C,
    ) -> Result<bool, ClientError>
    where
        B: CollectionBackend + ?Sized,
        C: Confirm + ?Sized,
    {
        self.ensure_moderation()?;
        self.act_on_one(backend, Action::Moderate(action), id, confirm)
            .await
    }

    /// Accept or reject every selected pending row.
    pub async fn moderate_selected<B, C>(
        &mut self,
        backend: &B,
        action: ModerationAction,
        confirm: &C,
    ) -> Option<BulkReport>
    where
        B: CollectionBackend + ?Sized,
        C: Confirm + ?Sized,
    {
        if let Err(e) = self.ensure_moderation() {
            self.toasts.error(e.message());
            return None;
        }
        self.act_on_selection(backend, Action::Moderate(action), confirm)
            .await
    }

    fn ensure_moderation(&self) -> Result<(), ClientError> {
        if self.config.moderation {
            Ok(())
        } else {
            Err(ClientError::Forbidden(format!(
                "{} is not a moderation queue",
                self.config.label
            )))
        }
    }

    async fn act_on_one<B, C>(
        &mut self,
        backend: &B,
        action: Action,
        id: &RecordId,
        confirm: &C,
    ) -> Result<bool, ClientError>
    where
        B: CollectionBackend + ?Sized,
        C: Confirm + ?Sized,
    {
        if !self.contains(id) {
            return Err(ClientError::NotFound(format!(
                "No {} with id {}",
                self.config.key, id
            )));
        }
        if !confirm.confirm(&format!("Really {} this item?", action.verb())) {
            return Ok(false);
        }

        match dispatch(backend, self.config.path, action, id).await {
            Ok(()) => {
                self.remove_ids(std::slice::from_ref(id));
                self.toasts
                    .success(format!("Item {} {}", id, action.past_tense()));
                Ok(true)
            }
            Err(e) => {
                self.toasts
                    .error(format!("Could not {} item {}: {}", action.verb(), id, e.message()));
                Err(e)
            }
        }
    }

    /// Every selected id is sent concurrently; only the ids whose call
    /// succeeded leave the collection and the selection.
    async fn act_on_selection<B, C>(
        &mut self,
        backend: &B,
        action: Action,
        confirm: &C,
    ) -> Option<BulkReport>
    where
        B: CollectionBackend + ?Sized,
        C: Confirm + ?Sized,
    {
        let ids: Vec<RecordId> = self
            .selection
            .ids()
            .into_iter()
            .filter(|id| self.contains(id))
            .collect();
        if ids.is_empty() {
            self.toasts.warning("No item selected");
            return None;
        }
        if !confirm.confirm(&format!("Really {} {} selected items?", action.verb(), ids.len())) {
            return None;
        }

        let path = self.config.path;
        let results = join_all(ids.iter().map(|id| dispatch(backend, path, action, id))).await;

        let mut report = BulkReport::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => report.succeeded.push(id),
                Err(e) => {
                    tracing::warn!(entity = self.config.key, %id, "Bulk {} failed: {}", action.verb(), e);
                    report.failed.push((id, e));
                }
            }
        }

        self.remove_ids(&report.succeeded);
        tracing::info!(
            entity = self.config.key,
            action = action.verb(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Bulk action finished"
        );

        if report.is_complete() {
            self.toasts.success(format!(
                "{} items {}",
                report.succeeded.len(),
                action.past_tense()
            ));
        } else if report.succeeded.is_empty() {
            self.toasts.error(format!(
                "Could not {} any of the {} selected items",
                action.verb(),
                report.attempted()
            ));
        } else {
            let failed: Vec<String> = report.failed.iter().map(|(id, _)| id.to_string()).collect();
            self.toasts.warning(format!(
                "{} of {} items {}; failed: {}",
                report.succeeded.len(),
                report.attempted(),
                action.past_tense(),
                failed.join(", ")
            ));
        }
        Some(report)
    }

    fn remove_ids(&mut self, ids: &[RecordId]) {
        if ids.is_empty() {
            return;
        }
        let removed: BTreeSet<&RecordId> = ids.iter().collect();
        self.items
            .retain(|record| record.id().map_or(true, |id| !removed.contains(&id)));
        self.selection.remove_all(ids);
        self.after_items_changed();
    }

    fn after_items_changed(&mut self) {
        let known: BTreeSet<RecordId> = self.items.iter().filter_map(Record::id).collect();
        self.selection.retain_known(&known);
        let total = self.filtered_len();
        self.pagination.clamp(total);
    }
}

async fn dispatch<B>(
    backend: &B,
    path: &str,
    action: Action,
    id: &RecordId,
) -> Result<(), ClientError>
where
    B: CollectionBackend + ?Sized,
{
    match action {
        Action::Delete => backend.delete(path, id).await,
        Action::Moderate(moderation) => backend.moderate(path, moderation, id).await,
    }
}

/// A queue row is pending and not contributed to by `owner`.
fn is_reviewable(record: &Record, owner: Option<&RecordId>) -> bool {
    if record.status() != Some(PublicationStatus::Pending) {
        return false;
    }
    match owner {
        Some(owner) => !record.contributor_ids().iter().any(|id| id == owner),
        None => false,
    }
}
