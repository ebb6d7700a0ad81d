use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use spec_compiler::CompiledScenario;
use step_canon::CanonicalStep;

use crate::registry::PatternRegistry;
use crate::render::py_str;
use crate::template::StepTemplate;

const MAX_NAME_LEN: usize = 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BindingKind {
    Pattern { pattern: String },
    /// No registry pattern accepted the template
    Stub,
}

/// One generated step implementation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub name: String,
    pub template: StepTemplate,
    pub params: Vec<String>,
    pub kind: BindingKind,
    #[serde(skip)]
    pub body: String,
    /// Number of emitted steps using this binding
    pub uses: usize,
}

impl Binding {
    pub fn is_stub(&self) -> bool {
        self.kind == BindingKind::Stub
    }
}

/// Bindings in first-use order, one per distinct template.
#[derive(Clone, Debug, Default)]
pub struct BindingSet {
    bindings: Vec<Binding>,
    by_template: HashMap<String, usize>,
    by_step: HashMap<String, usize>,
}

impl BindingSet {
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn stub_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_stub()).count()
    }

    pub fn for_template(&self, template: &str) -> Option<&Binding> {
        self.by_template.get(template).map(|&i| &self.bindings[i])
    }

    /// Binding that implements a rendered canonical step.
    pub fn for_step(&self, rendered: &str) -> Option<&Binding> {
        self.by_step.get(rendered).map(|&i| &self.bindings[i])
    }

    /// Template text → binding name, in first-use order.
    pub fn template_map(&self) -> IndexMap<String, String> {
        self.bindings
            .iter()
            .map(|b| (b.template.text().to_string(), b.name.clone()))
            .collect()
    }
}

pub struct BindingGenerator {
    registry: PatternRegistry,
}

impl BindingGenerator {
    pub fn new(registry: PatternRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub fn generate(&self, scenarios: &[CompiledScenario]) -> BindingSet {
        self.generate_steps(
            scenarios
                .iter()
                .flat_map(|scenario| scenario.steps.iter().map(|s| &s.step)),
        )
    }

    pub fn generate_steps<'a>(
        &self,
        steps: impl IntoIterator<Item = &'a CanonicalStep>,
    ) -> BindingSet {
        let mut set = BindingSet::default();
        let mut names = NameAllocator::default();

        for step in steps {
            let rendered = step.render();
            if let Some(&index) = set.by_step.get(&rendered) {
                set.bindings[index].uses += 1;
                continue;
            }

            let (template, kind, body) = match self.registry.match_step(step) {
                Some((pattern, template)) => {
                    let body = pattern.body_for(&template);
                    let kind = BindingKind::Pattern {
                        pattern: pattern.name.clone(),
                    };
                    (template, kind, body)
                }
                None => {
                    let template = StepTemplate::positional(step);
                    warn!(template = %template, "no step pattern; emitting stub binding");
                    let body = format!(
                        "raise NotImplementedError({})",
                        py_str(&format!("Step not implemented: {}", template.text()))
                    );
                    (template, BindingKind::Stub, body)
                }
            };

            let index = match set.by_template.get(template.text()) {
                Some(&index) => index,
                None => {
                    let base = match &kind {
                        BindingKind::Pattern { pattern } => pattern.clone(),
                        BindingKind::Stub => slug(template.text()),
                    };
                    let name = names.allocate(&base);
                    debug!(template = %template, binding = %name, "new binding");
                    set.bindings.push(Binding {
                        name,
                        params: template.holes().into_iter().map(str::to_string).collect(),
                        template,
                        kind,
                        body,
                        uses: 0,
                    });
                    let index = set.bindings.len() - 1;
                    set.by_template
                        .insert(set.bindings[index].template.text().to_string(), index);
                    index
                }
            };
            set.bindings[index].uses += 1;
            set.by_step.insert(rendered, index);
        }
        set
    }
}

/// `name`, `name_1`, `name_2`, ... per base name.
#[derive(Default)]
struct NameAllocator {
    counters: HashMap<String, usize>,
    used: HashSet<String>,
}

impl NameAllocator {
    fn allocate(&mut self, base: &str) -> String {
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        let mut candidate = if *counter == 0 {
            base.to_string()
        } else {
            format!("{base}_{counter}")
        };
        while self.used.contains(&candidate) {
            *counter += 1;
            candidate = format!("{base}_{counter}");
        }
        *counter += 1;
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Python identifier derived from template text.
pub fn slug(template: &str) -> String {
    let mut text = String::with_capacity(template.len());
    let mut in_hole = false;
    for c in template.chars() {
        match c {
            '<' => in_hole = true,
            '>' => in_hole = false,
            _ if in_hole => {}
            c if c.is_ascii_alphanumeric() || c == ' ' => text.push(c.to_ascii_lowercase()),
            _ => {}
        }
    }
    let mut name: String = text.split_whitespace().collect::<Vec<_>>().join("_");
    name.truncate(MAX_NAME_LEN);
    let name = name.trim_end_matches('_').to_string();
    if name.is_empty() {
        "step".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("step_{name}")
    } else {
        name
    }
}
