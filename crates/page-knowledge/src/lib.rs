//! Page Knowledge Base
//!
//! Ground truth observed on crawled pages:
//! - concept -> locator maps for input fields
//! - the primary action locator (and named secondary actions)
//! - known-good display texts (navigation labels, headings)
//!
//! A [`KnowledgeBase`] is built once per crawl snapshot and shared read-only
//! across per-page compilation.

pub mod concept;
pub mod errors;
pub mod loader;
pub mod model;
pub mod texts;

pub use concept::{is_search_concept, normalize_concept, FieldMatch, MatchKind};
pub use errors::{KnowledgeError, KnowledgeResult};
pub use model::{KnowledgeBase, PageKind, PageProfile, SiteKnowledge};
pub use texts::{TextMatch, TextRegistry};
