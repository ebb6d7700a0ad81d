//! Binding generation.
//!
//! Reduces compiled steps to parameterized templates, matches each against an
//! ordered pattern registry and emits one Gauge step implementation per
//! distinct template, next to the specification text that uses them.

mod bodies;
pub mod generator;
pub mod policy;
pub mod registry;
pub mod render;
pub mod template;

pub use generator::{slug, Binding, BindingGenerator, BindingKind, BindingSet};
pub use policy::BindingPolicyView;
pub use registry::{PatternRegistry, Pin, SlotSpec, StepPattern};
pub use render::{py_str, render_bindings, render_spec};
pub use template::{Slot, StepTemplate};
