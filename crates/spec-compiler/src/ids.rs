use std::collections::HashSet;

use specforge_core_types::ScenarioId;

/// Batch-wide scenario id allocation in input order.
///
/// The first occurrence of a base id keeps it; later ones get `_2`, `_3`, ...
/// skipping any suffix that is itself a base id somewhere in the batch.
#[derive(Debug, Default)]
pub struct ScenarioIdAllocator {
    reserved: HashSet<String>,
    taken: HashSet<String>,
}

impl ScenarioIdAllocator {
    pub fn new<'a, I>(bases: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            reserved: bases.into_iter().map(str::to_string).collect(),
            taken: HashSet::new(),
        }
    }

    /// Returns the allocated id and whether a suffix was needed.
    pub fn allocate(&mut self, base: &str) -> (ScenarioId, bool) {
        if self.taken.insert(base.to_string()) {
            return (ScenarioId(base.to_string()), false);
        }
        let mut counter = 2usize;
        loop {
            let candidate = format!("{base}_{counter}");
            if !self.reserved.contains(&candidate) && self.taken.insert(candidate.clone()) {
                return (ScenarioId(candidate), true);
            }
            counter += 1;
        }
    }
}

/// `<module>_<scenario id>` when a module name is present.
pub fn qualified_id(module: Option<&str>, scenario: &ScenarioId) -> String {
    match module {
        Some(module) => {
            let module = module.split_whitespace().collect::<Vec<_>>().join("_");
            format!("{module}_{}", scenario.as_str())
        }
        None => scenario.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_get_suffixes_in_order() {
        let bases = ["LOAN_TC_001", "LOAN_TC_001", "LOAN_TC_001"];
        let mut ids = ScenarioIdAllocator::new(bases);
        let allocated: Vec<String> = bases.iter().map(|b| ids.allocate(b).0 .0).collect();
        assert_eq!(allocated, vec!["LOAN_TC_001", "LOAN_TC_001_2", "LOAN_TC_001_3"]);
    }

    #[test]
    fn suffix_skips_existing_ids() {
        let bases = ["X", "X", "X_2"];
        let mut ids = ScenarioIdAllocator::new(bases);
        let allocated: Vec<String> = bases.iter().map(|b| ids.allocate(b).0 .0).collect();
        assert_eq!(allocated, vec!["X", "X_3", "X_2"]);
    }

    #[test]
    fn module_qualification() {
        let id = ScenarioId("TC_001".into());
        assert_eq!(qualified_id(Some("Loan Calculator"), &id), "Loan_Calculator_TC_001");
        assert_eq!(qualified_id(None, &id), "TC_001");
    }
}
