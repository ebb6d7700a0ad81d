//! Knowledge base model

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use specforge_core_types::PageId;

use crate::concept::{self, normalize_concept, FieldMatch};
use crate::texts::TextRegistry;

/// Coarse page classification driving verification derivation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Calculator,
    Login,
    Search,
    #[default]
    Generic,
}

impl PageKind {
    pub fn name(&self) -> &'static str {
        match self {
            PageKind::Calculator => "calculator",
            PageKind::Login => "login",
            PageKind::Search => "search",
            PageKind::Generic => "generic",
        }
    }
}

/// Knowledge shared by every page of the crawled site
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteKnowledge {
    /// Generic free-text search box present site-wide
    pub search_locator: Option<String>,
    /// Button submitting the site search
    pub search_action: Option<String>,
    pub dropdown_locators: BTreeSet<String>,
    pub display_texts: Vec<String>,
}

impl SiteKnowledge {
    pub fn is_search_locator(&self, locator: &str) -> bool {
        self.search_locator.as_deref() == Some(locator)
    }
}

/// Ground truth for one crawled page. Immutable during a compilation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageProfile {
    pub page: PageId,
    pub kind: PageKind,
    /// Normalized concept -> locator, in document order
    pub fields: IndexMap<String, String>,
    pub primary_action: Option<String>,
    /// Normalized action name -> locator (e.g. `clear` -> `Clear`)
    pub secondary_actions: IndexMap<String, String>,
    pub dropdowns: BTreeSet<String>,
    pub display_texts: Vec<String>,
}

impl PageProfile {
    pub fn new(page: PageId) -> Self {
        Self {
            page,
            kind: PageKind::Generic,
            fields: IndexMap::new(),
            primary_action: None,
            secondary_actions: IndexMap::new(),
            dropdowns: BTreeSet::new(),
            display_texts: Vec::new(),
        }
    }

    pub fn with_field(mut self, concept: &str, locator: &str) -> Self {
        self.fields
            .entry(normalize_concept(concept))
            .or_insert_with(|| locator.to_string());
        self
    }

    pub fn with_primary_action(mut self, locator: &str) -> Self {
        self.primary_action = Some(locator.to_string());
        self
    }

    pub fn with_secondary_action(mut self, name: &str, locator: &str) -> Self {
        self.secondary_actions
            .entry(normalize_concept(name))
            .or_insert_with(|| locator.to_string());
        self
    }

    pub fn with_display_text(mut self, text: &str) -> Self {
        self.display_texts.push(text.to_string());
        self
    }

    pub fn with_kind(mut self, kind: PageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Resolve a field concept: exact key, then bidirectional containment.
    pub fn lookup_field(&self, concept: &str) -> Option<FieldMatch> {
        concept::lookup(&self.fields, concept)
    }

    /// Resolve a named secondary action (`clear`, `view amortization schedule`).
    pub fn lookup_action(&self, name: &str) -> Option<&str> {
        concept::lookup(&self.secondary_actions, name).and_then(|found| {
            self.secondary_actions
                .get(&found.key)
                .map(|locator| locator.as_str())
        })
    }

    /// True when the page has at least one field other than the site search box.
    pub fn has_form_fields(&self, site: &SiteKnowledge) -> bool {
        self.fields
            .values()
            .any(|locator| !site.is_search_locator(locator))
    }

    /// Classify the page from its id and fields.
    pub fn infer_kind(&self, site: &SiteKnowledge) -> PageKind {
        let id = self.page.as_str().to_lowercase();
        let login_like = ["sign-in", "signin", "login", "log-in"]
            .iter()
            .any(|needle| id.contains(needle))
            || self.fields.keys().any(|key| key.contains("password"));
        if login_like {
            return PageKind::Login;
        }
        if !self.fields.is_empty() && !self.has_form_fields(site) {
            return PageKind::Search;
        }
        if self.primary_action.is_some() && !self.fields.is_empty() {
            return PageKind::Calculator;
        }
        PageKind::Generic
    }
}

/// All page profiles of one crawl snapshot plus site-wide knowledge
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    site: SiteKnowledge,
    pages: IndexMap<PageId, PageProfile>,
}

impl KnowledgeBase {
    pub fn new(site: SiteKnowledge, profiles: Vec<PageProfile>) -> Self {
        let mut pages = IndexMap::new();
        for profile in profiles {
            pages.entry(profile.page.clone()).or_insert(profile);
        }
        Self { site, pages }
    }

    /// Knowledge base with no pages; every lookup falls back.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn site(&self) -> &SiteKnowledge {
        &self.site
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &PageProfile> {
        self.pages.values()
    }

    /// Exact id first, then bidirectional containment against non-root ids.
    /// Among containment hits the id closest in length wins, earliest on ties.
    pub fn profile(&self, page: &PageId) -> Option<&PageProfile> {
        if let Some(profile) = self.pages.get(page) {
            return Some(profile);
        }
        if page.is_root() {
            return None;
        }
        self.pages
            .iter()
            .filter(|(id, _)| !id.is_root())
            .filter(|(id, _)| id.0.contains(page.as_str()) || page.0.contains(id.as_str()))
            .min_by_key(|(id, _)| id.0.len().abs_diff(page.0.len()))
            .map(|(_, profile)| profile)
    }

    /// Known-good texts for a page: page texts first, then site texts.
    pub fn text_registry(&self, page: &PageId) -> TextRegistry {
        let page_texts = self
            .profile(page)
            .map(|profile| profile.display_texts.as_slice())
            .unwrap_or(&[]);
        TextRegistry::new(page_texts.iter().chain(self.site.display_texts.iter()))
    }

    /// Absent pages are treated as having no form fields.
    pub fn has_form_fields(&self, page: &PageId) -> bool {
        self.profile(page)
            .map(|profile| profile.has_form_fields(&self.site))
            .unwrap_or(false)
    }

    pub fn is_dropdown(&self, page: &PageId, locator: &str) -> bool {
        self.site.dropdown_locators.contains(locator)
            || self
                .profile(page)
                .map(|profile| profile.dropdowns.contains(locator))
                .unwrap_or(false)
    }

    /// Is `target` a locator recorded for this page or site-wide?
    pub fn is_known_locator(&self, page: &PageId, target: &str) -> bool {
        let site = &self.site;
        if site.search_locator.as_deref() == Some(target)
            || site.search_action.as_deref() == Some(target)
            || site.dropdown_locators.contains(target)
        {
            return true;
        }
        self.profile(page).is_some_and(|profile| {
            profile.primary_action.as_deref() == Some(target)
                || profile.fields.values().any(|locator| locator == target)
                || profile.secondary_actions.values().any(|locator| locator == target)
                || profile.dropdowns.contains(target)
        })
    }

    /// Every dropdown locator known site-wide or on any page.
    pub fn all_dropdowns(&self) -> BTreeSet<String> {
        let mut all = self.site.dropdown_locators.clone();
        for profile in self.pages.values() {
            all.extend(profile.dropdowns.iter().cloned());
        }
        all
    }

    pub fn page_kind(&self, page: &PageId) -> PageKind {
        self.profile(page)
            .map(|profile| profile.kind)
            .unwrap_or(PageKind::Generic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteKnowledge {
        SiteKnowledge {
            search_locator: Some("calcSearchTerm".to_string()),
            search_action: Some("Search".to_string()),
            dropdown_locators: ["ccompound".to_string()].into_iter().collect(),
            display_texts: vec!["Financial Calculators".to_string()],
        }
    }

    fn loan_page() -> PageProfile {
        PageProfile::new(PageId::from_url("/loan-calculator.html"))
            .with_field("loan amount", "cloanamount")
            .with_field("interest_rate", "cinterestrate")
            .with_primary_action("x")
            .with_secondary_action("clear", "Clear")
            .with_display_text("Loan Calculator")
    }

    #[test]
    fn infer_kinds() {
        let site = site();
        assert_eq!(loan_page().infer_kind(&site), PageKind::Calculator);

        let login = PageProfile::new(PageId::from_url("/my-account/sign-in.php"))
            .with_field("email", "email")
            .with_field("password", "password");
        assert_eq!(login.infer_kind(&site), PageKind::Login);

        let home = PageProfile::new(PageId::from_url("/"))
            .with_field("search term", "calcSearchTerm")
            .with_primary_action("Search");
        assert_eq!(home.infer_kind(&site), PageKind::Search);
        assert!(!home.has_form_fields(&site));

        let about = PageProfile::new(PageId::from_url("/about-us.html"));
        assert_eq!(about.infer_kind(&site), PageKind::Generic);
    }

    #[test]
    fn profile_lookup_by_containment_skips_root() {
        let home = PageProfile::new(PageId::from_url("/"));
        let kb = KnowledgeBase::new(site(), vec![home, loan_page()]);

        assert!(kb
            .profile(&PageId::from_url("https://www.calculator.net/loan-calculator.html"))
            .is_some());
        assert!(kb.profile(&PageId::from_url("/loan-calculator")).is_some());
        assert!(kb.profile(&PageId::from_url("/bmi-calculator.html")).is_none());
        assert!(kb.profile(&PageId::from_url("/")).is_some());
    }

    #[test]
    fn profile_lookup_prefers_the_closest_id() {
        let advanced = PageProfile::new(PageId::from_url("/loan-calculator-advanced.html"))
            .with_primary_action("Go");
        let kb = KnowledgeBase::new(site(), vec![advanced, loan_page()]);

        let hit = kb.profile(&PageId::from_url("/loan-calculator")).unwrap();
        assert_eq!(hit.page, PageId::from_url("/loan-calculator.html"));
        let exact = kb
            .profile(&PageId::from_url("/loan-calculator-advanced.html"))
            .unwrap();
        assert_eq!(exact.primary_action.as_deref(), Some("Go"));
    }

    #[test]
    fn text_registry_merges_site_texts() {
        let kb = KnowledgeBase::new(site(), vec![loan_page()]);
        let registry = kb.text_registry(&PageId::from_url("/loan-calculator.html"));
        assert_eq!(registry.len(), 2);

        let unknown = kb.text_registry(&PageId::from_url("/unknown.html"));
        assert_eq!(unknown.len(), 1);
    }

    #[test]
    fn dropdowns_and_actions() {
        let kb = KnowledgeBase::new(site(), vec![loan_page()]);
        let page = PageId::from_url("/loan-calculator.html");
        assert!(kb.is_dropdown(&page, "ccompound"));
        assert!(!kb.is_dropdown(&page, "cloanamount"));
        assert_eq!(
            kb.profile(&page).unwrap().lookup_action("Clear"),
            Some("Clear")
        );
        assert!(!kb.has_form_fields(&PageId::from_url("/missing.html")));
        assert!(kb.is_known_locator(&page, "cloanamount"));
        assert!(kb.is_known_locator(&page, "calcSearchTerm"));
        assert!(!kb.is_known_locator(&page, "Loan Calculator"));
    }
}
