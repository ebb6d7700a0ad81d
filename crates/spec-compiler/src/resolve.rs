//! Concept and target resolution against the knowledge base

use page_knowledge::{is_search_concept, normalize_concept, KnowledgeBase, PageKind, PageProfile};
use specforge_core_types::PageId;
use step_canon::{CanonicalStep, Check, DiscardReason, Verb};
use tracing::{debug, warn};

use crate::model::Resolution;
use crate::policy::CompilePolicyView;

const PRIMARY_PHRASES: &[&str] = &["calculate", "calc", "compute", "submit", "go"];
const LOGIN_PHRASES: &[&str] = &["login", "log in", "sign in", "signin"];
const HOME_PHRASES: &[&str] = &["home", "home page", "homepage", "main page"];

/// A step after resolution, with the concept it was authored against.
#[derive(Clone, Debug)]
pub struct ResolvedStep {
    pub step: Option<CanonicalStep>,
    pub concept: Option<String>,
    pub resolution: Resolution,
}

impl ResolvedStep {
    fn kept(step: CanonicalStep, concept: Option<String>, resolution: Resolution) -> Self {
        Self {
            step: Some(step),
            concept,
            resolution,
        }
    }

    fn discarded(reason: DiscardReason) -> Self {
        Self {
            step: None,
            concept: None,
            resolution: Resolution::Discarded { reason },
        }
    }
}

/// `c` + lowercase alphanumerics of the concept (`Loan Amount` -> `cloanamount`).
pub fn synthesize_locator(concept: &str) -> String {
    let mut locator = String::from("c");
    locator.extend(
        concept
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric()),
    );
    locator
}

pub fn looks_like_path(target: &str) -> bool {
    let lower = target.trim().to_lowercase();
    lower.starts_with('/')
        || lower.contains("://")
        || lower.ends_with(".html")
        || lower.ends_with(".htm")
        || lower.ends_with(".php")
}

pub struct StepResolver<'a> {
    kb: &'a KnowledgeBase,
    page: &'a PageId,
    profile: Option<&'a PageProfile>,
    policy: &'a CompilePolicyView,
}

impl<'a> StepResolver<'a> {
    pub fn new(kb: &'a KnowledgeBase, page: &'a PageId, policy: &'a CompilePolicyView) -> Self {
        Self {
            kb,
            page,
            profile: kb.profile(page),
            policy,
        }
    }

    pub fn profile(&self) -> Option<&'a PageProfile> {
        self.profile
    }

    pub fn page_kind(&self) -> PageKind {
        self.profile.map(|p| p.kind).unwrap_or(PageKind::Generic)
    }

    pub fn resolve(&self, step: CanonicalStep) -> ResolvedStep {
        let resolved = match step.verb {
            Verb::Navigate | Verb::NavigateBack => self.navigation(step),
            Verb::Enter | Verb::Clear | Verb::Select => self.field_step(step),
            Verb::Click => self.click(step),
            Verb::Verify(Check::FieldValue) => self.field_step(step),
            Verb::Verify(_) => ResolvedStep::kept(step, None, Resolution::Passthrough),
        };
        debug!(page = %self.page, resolution = ?resolved.resolution, "resolved step");
        resolved
    }

    /// Is `target` already a locator the knowledge base knows about?
    pub fn is_known_locator(&self, target: &str) -> bool {
        self.kb.is_known_locator(self.page, target)
    }

    fn navigation(&self, mut step: CanonicalStep) -> ResolvedStep {
        let normalized = normalize_concept(&step.target);
        if looks_like_path(&step.target) {
            step.target = PageId::from_url(&step.target).0;
        } else if HOME_PHRASES.contains(&normalized.as_str()) {
            step.target = "/".to_string();
        }
        ResolvedStep::kept(step, None, Resolution::Passthrough)
    }

    fn field_step(&self, mut step: CanonicalStep) -> ResolvedStep {
        let concept = step.target.clone();
        let resolution = self.locate_field(&concept);
        match &resolution {
            Resolution::Resolved { locator, .. } | Resolution::Fallback { locator, .. } => {
                step.target = locator.clone();
            }
            Resolution::Passthrough => {}
            Resolution::Discarded { reason } => return ResolvedStep::discarded(*reason),
        }
        ResolvedStep::kept(step, Some(concept), resolution)
    }

    fn locate_field(&self, concept: &str) -> Resolution {
        if is_search_concept(concept, &self.policy.canon.search_concept) {
            if let Some(locator) = &self.kb.site().search_locator {
                return Resolution::Resolved {
                    concept: concept.to_string(),
                    locator: locator.clone(),
                };
            }
        }
        if let Some(hit) = self.profile.and_then(|profile| profile.lookup_field(concept)) {
            return Resolution::Resolved {
                concept: concept.to_string(),
                locator: hit.locator,
            };
        }
        if self.is_known_locator(concept) {
            return Resolution::Passthrough;
        }
        if !self.policy.fallback_locators {
            return Resolution::Discarded {
                reason: DiscardReason::MissingTarget,
            };
        }
        let locator = synthesize_locator(concept);
        if locator.len() <= 1 {
            return Resolution::Discarded {
                reason: DiscardReason::MissingTarget,
            };
        }
        warn!(
            page = %self.page,
            %concept,
            %locator,
            "no locator for concept, using synthesized fallback"
        );
        Resolution::Fallback {
            concept: concept.to_string(),
            locator,
        }
    }

    fn click(&self, mut step: CanonicalStep) -> ResolvedStep {
        let concept = step.target.clone();
        let normalized = normalize_concept(&concept);
        let site = self.kb.site();

        let primary = self.profile.and_then(|p| p.primary_action.clone());
        let wants_primary = PRIMARY_PHRASES.contains(&normalized.as_str())
            || normalized.starts_with("calculate ")
            || (self.page_kind() == PageKind::Login
                && LOGIN_PHRASES.contains(&normalized.as_str()));

        let locator = if wants_primary && primary.is_some() {
            primary
        } else if normalized == "search" || normalized == "search button" {
            site.search_action.clone()
        } else if self.is_known_locator(&concept) {
            None
        } else {
            self.profile
                .and_then(|profile| profile.lookup_action(&concept))
                .map(str::to_string)
        };

        match locator {
            Some(locator) => {
                step.target = locator.clone();
                ResolvedStep::kept(
                    step,
                    Some(concept.clone()),
                    Resolution::Resolved { concept, locator },
                )
            }
            None => ResolvedStep::kept(step, Some(concept), Resolution::Passthrough),
        }
    }
}
