//! JSON knowledge document loading

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Deserialize;
use specforge_core_types::PageId;
use tracing::{debug, warn};

use crate::concept::normalize_concept;
use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::model::{KnowledgeBase, PageKind, PageProfile, SiteKnowledge};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KnowledgeDoc {
    site: SiteDoc,
    pages: IndexMap<String, PageDoc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SiteDoc {
    search_locator: Option<String>,
    search_action: Option<String>,
    dropdown_locators: Vec<String>,
    display_texts: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageDoc {
    kind: Option<PageKind>,
    fields: IndexMap<String, String>,
    primary_action: Option<String>,
    secondary_actions: IndexMap<String, String>,
    dropdowns: Vec<String>,
    display_texts: Vec<String>,
}

impl KnowledgeBase {
    pub fn from_json_str(raw: &str) -> KnowledgeResult<Self> {
        let doc: KnowledgeDoc = serde_json::from_str(raw)?;
        build(doc)
    }

    pub fn from_slice(raw: &[u8]) -> KnowledgeResult<Self> {
        let doc: KnowledgeDoc = serde_json::from_slice(raw)?;
        build(doc)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn build(doc: KnowledgeDoc) -> KnowledgeResult<KnowledgeBase> {
    let site = SiteKnowledge {
        search_locator: non_empty(doc.site.search_locator),
        search_action: non_empty(doc.site.search_action),
        dropdown_locators: doc
            .site
            .dropdown_locators
            .into_iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect(),
        display_texts: doc.site.display_texts,
    };

    let mut profiles = Vec::with_capacity(doc.pages.len());
    for (key, page) in doc.pages {
        if key.trim().is_empty() {
            return Err(KnowledgeError::InvalidEntry {
                key,
                reason: "page id is empty".to_string(),
            });
        }
        let mut profile = PageProfile::new(PageId::from_url(&key));
        for (concept, locator) in page.fields {
            let locator = locator.trim();
            if locator.is_empty() || normalize_concept(&concept).is_empty() {
                warn!(page = %key, %concept, "skipping field without concept or locator");
                continue;
            }
            profile = profile.with_field(&concept, locator);
        }
        for (name, locator) in page.secondary_actions {
            let locator = locator.trim();
            if locator.is_empty() {
                continue;
            }
            profile = profile.with_secondary_action(&name, locator);
        }
        profile.primary_action = non_empty(page.primary_action);
        profile.dropdowns = page
            .dropdowns
            .into_iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect::<BTreeSet<_>>();
        profile.display_texts = page.display_texts;
        profile.kind = match page.kind {
            Some(kind) => kind,
            None => profile.infer_kind(&site),
        };
        debug!(
            page = %profile.page,
            kind = profile.kind.name(),
            fields = profile.fields.len(),
            "loaded page profile"
        );
        profiles.push(profile);
    }

    Ok(KnowledgeBase::new(site, profiles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_valid() {
        let kb = KnowledgeBase::from_json_str("{}").unwrap();
        assert!(kb.is_empty());
        assert!(kb.site().search_locator.is_none());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(KnowledgeBase::from_json_str("{\"pages\": [").is_err());
    }

    #[test]
    fn blank_primary_action_is_absent() {
        let kb = KnowledgeBase::from_json_str(
            r#"{"pages": {"/my-account/sign-in.php": {"fields": {"email": "email"}, "primary_action": " "}}}"#,
        )
        .unwrap();
        let profile = kb
            .profile(&PageId::from_url("/my-account/sign-in.php"))
            .unwrap();
        assert!(profile.primary_action.is_none());
        assert_eq!(profile.kind, PageKind::Login);
    }
}
