//! Entity catalog: one configuration per collection screen.
//!
//! Every screen is the same list-manage component driven by one of these
//! entries, instead of a hand-written screen per entity.

use crate::auth::Access;
use crate::listing::SearchFields;
use crate::models::{PublicationKind, PENDING_STATUS};

const PUBLICATION_COLUMNS: &[&str] = &["title", "author", "DOI", "date_publication", "status"];
const PUBLICATION_SEARCH: &[&str] = &["title", "author", "DOI"];
const PENDING_FILTER: &[(&str, &str)] = &[("status", PENDING_STATUS)];

/// Configuration of one collection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityConfig {
    /// Name used on the command line.
    pub key: &'static str,
    pub label: &'static str,
    /// REST collection path.
    pub path: &'static str,
    pub columns: &'static [&'static str],
    pub search: SearchFields,
    /// Fixed page size; `None` uses the configured default.
    pub page_size: Option<usize>,
    pub access: Access,
    /// Server-side filter sent as query parameters on load.
    pub filter: &'static [(&'static str, &'static str)],
    /// Pending queue: rows are accepted/rejected by peers, and the viewer's
    /// own submissions are hidden.
    pub moderation: bool,
    pub doi_check: Option<&'static str>,
}

impl EntityConfig {
    /// Publication list of one kind.
    pub fn publications(kind: PublicationKind) -> Self {
        Self {
            key: publication_key(kind),
            label: kind.label(),
            path: kind.path(),
            columns: PUBLICATION_COLUMNS,
            search: match kind {
                // Articles and books search every field; the other
                // publication screens search a fixed subset.
                PublicationKind::Article | PublicationKind::Book => SearchFields::All,
                _ => SearchFields::Only(PUBLICATION_SEARCH),
            },
            page_size: None,
            access: Access::Member,
            filter: &[],
            moderation: false,
            doi_check: Some(kind.doi_check_path()),
        }
    }

    /// Pending submissions of one kind, awaiting peer review.
    pub fn pending(kind: PublicationKind) -> Self {
        Self {
            key: pending_key(kind),
            label: kind.label(),
            path: kind.path(),
            columns: PUBLICATION_COLUMNS,
            search: SearchFields::Only(PUBLICATION_SEARCH),
            page_size: Some(5),
            access: Access::Member,
            filter: PENDING_FILTER,
            moderation: true,
            doi_check: None,
        }
    }

    fn simple(
        key: &'static str,
        label: &'static str,
        path: &'static str,
        columns: &'static [&'static str],
        search: SearchFields,
        page_size: Option<usize>,
        access: Access,
    ) -> Self {
        Self {
            key,
            label,
            path,
            columns,
            search,
            page_size,
            access,
            filter: &[],
            moderation: false,
            doi_check: None,
        }
    }
}

fn publication_key(kind: PublicationKind) -> &'static str {
    match kind {
        PublicationKind::Article => "articles",
        PublicationKind::Patent => "patents",
        PublicationKind::Thesis => "theses",
        PublicationKind::Habilitation => "habilitations",
        PublicationKind::Report => "reports",
        PublicationKind::Book => "books",
    }
}

fn pending_key(kind: PublicationKind) -> &'static str {
    match kind {
        PublicationKind::Article => "pending-articles",
        PublicationKind::Patent => "pending-patents",
        PublicationKind::Thesis => "pending-theses",
        PublicationKind::Habilitation => "pending-habilitations",
        PublicationKind::Report => "pending-reports",
        PublicationKind::Book => "pending-books",
    }
}

/// Every collection screen of the application.
pub fn catalog() -> Vec<EntityConfig> {
    let mut entries: Vec<EntityConfig> = PublicationKind::ALL
        .iter()
        .map(|kind| EntityConfig::publications(*kind))
        .collect();
    entries.extend(PublicationKind::ALL.iter().map(|kind| EntityConfig::pending(*kind)));

    entries.extend([
        EntityConfig::simple(
            "members",
            "Members",
            "/users",
            &["name", "email", "role", "team"],
            SearchFields::Only(&["name", "email"]),
            None,
            Access::Admin,
        ),
        EntityConfig::simple(
            "teams",
            "Teams",
            "/teams",
            &["name", "leader", "description"],
            SearchFields::All,
            Some(5),
            Access::Admin,
        ),
        EntityConfig::simple(
            "projects",
            "Projects",
            "/projects",
            &["title", "leader", "start_date", "end_date"],
            SearchFields::All,
            None,
            Access::Admin,
        ),
        EntityConfig::simple(
            "seminars",
            "Seminars",
            "/seminars",
            &["title", "speaker", "date", "location"],
            SearchFields::All,
            None,
            Access::Admin,
        ),
        EntityConfig::simple(
            "news",
            "News",
            "/news",
            &["title", "date", "summary"],
            SearchFields::Only(&["title", "summary"]),
            Some(5),
            Access::Admin,
        ),
        EntityConfig::simple(
            "job-offers",
            "Job offers",
            "/offers",
            &["title", "type", "deadline"],
            SearchFields::All,
            None,
            Access::Admin,
        ),
        EntityConfig::simple(
            "messages",
            "Messages",
            "/messages",
            &["sender", "subject", "created_at"],
            SearchFields::Only(&["sender", "subject", "content"]),
            None,
            Access::Member,
        ),
    ]);
    entries
}

/// Look a screen up by its command-line key.
pub fn find(key: &str) -> Option<EntityConfig> {
    catalog().into_iter().find(|entry| entry.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let entries = catalog();
        let keys: HashSet<&str> = entries.iter().map(|e| e.key).collect();
        assert_eq!(keys.len(), entries.len());
    }

    #[test]
    fn test_pending_queue_preset() {
        let pending = find("pending-articles").unwrap();
        assert!(pending.moderation);
        assert_eq!(pending.path, "/articles");
        assert_eq!(pending.filter, &[("status", "en attente")]);
        assert_eq!(pending.page_size, Some(5));
        assert_eq!(find("articles").unwrap().page_size, None);
    }

    #[test]
    fn test_admin_only_screens() {
        assert_eq!(find("members").unwrap().access, Access::Admin);
        assert_eq!(find("articles").unwrap().access, Access::Member);
        assert!(find("unknown").is_none());
    }
}
