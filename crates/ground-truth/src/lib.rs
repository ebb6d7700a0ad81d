//! Ground-truth validation.
//!
//! Runs over the whole compiled batch after compilation. Each step is checked
//! against what the crawler actually observed: misused search-box entries on
//! pages without form fields are removed, asserted display texts are
//! case-corrected or dropped, and scenarios left with nothing but navigation
//! are deleted.

pub mod model;
pub mod policy;
pub mod validator;

pub use model::{ScenarioOutcome, ScenarioReport, StepOutcome, StepReport, ValidationReport, ValidationSummary};
pub use policy::ValidationPolicyView;
pub use validator::GroundTruthValidator;
