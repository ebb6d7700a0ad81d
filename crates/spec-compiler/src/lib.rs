//! Spec compiler.
//!
//! Turns a page's scenario intents into ordered scenario blocks of canonical
//! steps with resolved locators, derived verification steps and, where the
//! entered numbers allow it, an exact oracle assertion.

pub mod classify;
pub mod compiler;
pub mod errors;
pub mod ids;
pub mod input;
pub mod model;
pub mod policy;
pub mod resolve;
pub mod verify;

pub use classify::classify;
pub use compiler::SpecCompiler;
pub use errors::{CompileError, CompileResult};
pub use ids::ScenarioIdAllocator;
pub use input::{PageIntents, ScenarioDocument, ScenarioIntent};
pub use model::{
    CompileSummary, CompiledBatch, CompiledScenario, CompiledStep, DropReason, DroppedScenario,
    Resolution, ScenarioCompilation, StepOrigin, StepTrace,
};
pub use policy::CompilePolicyView;
