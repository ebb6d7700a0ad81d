//! Step canonicalization.
//!
//! Every AI-produced step, free text or structured record, is rewritten into
//! one string of the fixed canonical grammar before any other component sees
//! it. Steps that cannot be understood are discarded with a reason; they never
//! fail the surrounding scenario.

pub mod canonicalizer;
pub mod errors;
pub mod grammar;
pub mod model;
pub mod policy;

pub use canonicalizer::Canonicalizer;
pub use errors::{CanonError, CanonResult};
pub use grammar::sanitize_literal;
pub use model::{CanonOutcome, CanonicalStep, Check, DiscardReason, RawStep, StepRecord, Verb};
pub use policy::CanonPolicyView;
