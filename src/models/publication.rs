//! Publication kinds, moderation status and author composition.

use serde::{Deserialize, Serialize};

use super::Member;

/// Status label of a submission waiting for peer review.
pub const PENDING_STATUS: &str = "en attente";

/// The publication collections managed by the lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicationKind {
    Article,
    Patent,
    Thesis,
    Habilitation,
    Report,
    Book,
}

impl PublicationKind {
    pub const ALL: [PublicationKind; 6] = [
        PublicationKind::Article,
        PublicationKind::Patent,
        PublicationKind::Thesis,
        PublicationKind::Habilitation,
        PublicationKind::Report,
        PublicationKind::Book,
    ];

    /// REST collection path.
    pub fn path(&self) -> &'static str {
        match self {
            PublicationKind::Article => "/articles",
            PublicationKind::Patent => "/patents",
            PublicationKind::Thesis => "/theses",
            PublicationKind::Habilitation => "/habilitations",
            PublicationKind::Report => "/reports",
            PublicationKind::Book => "/books",
        }
    }

    /// DOI uniqueness pre-check endpoint.
    pub fn doi_check_path(&self) -> &'static str {
        match self {
            PublicationKind::Article => "/checkDOIExistsArticle",
            PublicationKind::Patent => "/checkDOIExistsPatent",
            PublicationKind::Thesis => "/checkDOIExistsThese",
            PublicationKind::Habilitation => "/checkDOIExistsHabilitation",
            PublicationKind::Report => "/checkDOIExistsReport",
            PublicationKind::Book => "/checkDOIExistsOuvrage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PublicationKind::Article => "Journal articles",
            PublicationKind::Patent => "Patents",
            PublicationKind::Thesis => "Theses",
            PublicationKind::Habilitation => "Habilitations",
            PublicationKind::Report => "Reports",
            PublicationKind::Book => "Books",
        }
    }

    /// Articles cannot be submitted without a DOI.
    pub fn requires_doi(&self) -> bool {
        matches!(self, PublicationKind::Article)
    }
}

/// Moderation status of a publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationStatus {
    #[serde(rename = "en attente")]
    Pending,
    #[serde(rename = "accepté")]
    Accepted,
    #[serde(rename = "refusé")]
    Rejected,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Pending => PENDING_STATUS,
            PublicationStatus::Accepted => "accepté",
            PublicationStatus::Rejected => "refusé",
        }
    }
}

/// Build the display author string: selected members first, then the
/// free-text names, comma separated, without duplicates or blanks.
pub fn compose_authors(members: &[Member], extra_names: &str) -> String {
    let mut names: Vec<String> = Vec::new();
    let candidates = members
        .iter()
        .map(|m| m.name.trim().to_string())
        .chain(extra_names.split(',').map(|n| n.trim().to_string()));

    for name in candidates {
        if name.is_empty() {
            continue;
        }
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            names.push(name);
        }
    }
    names.join(", ")
}
