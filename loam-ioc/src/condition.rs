//! Conditional registration
//!
//! A two-pass boot sequence: pass one registers every unconditional
//! factory, pass two evaluates conditional factories in a fixed AND-order
//! (class-presence, then property-match, then present-bean, then
//! missing-bean, then profile-match), consulting the registry state built so
//! far. A condition failing never aborts boot — it excludes the component
//! and records why.

use std::collections::HashSet;

use crate::ir::{Condition, ComponentDefinition, Strategy};
use crate::registry::{DefinitionFactory, Registry};

/// A source of configuration properties and active profiles
///
/// Implemented by `loam-context::config::ConfigManager` directly — no
/// parallel API is introduced, the existing `get`/`profile_manager` methods
/// satisfy this trait.
pub trait EnvironmentSource: Send + Sync {
    /// Looks up a property value by name
    fn get(&self, name: &str) -> Option<String>;
    /// Whether a property is present at all
    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
    /// The set of currently active profile names
    fn active_profiles(&self) -> HashSet<String>;
}

/// Whether a given type name is registered in the component graph
///
/// Rust has no runtime classloader, so "classpath presence" becomes "is a
/// `ComponentDefinition` for this type name registered in the linked
/// binary" — checked against `inventory`'s discovery set.
pub trait ClassPresenceOracle {
    /// Whether a component with this type name is registered
    fn is_present(&self, type_name: &str) -> bool;
}

impl ClassPresenceOracle for HashSet<&'static str> {
    fn is_present(&self, type_name: &str) -> bool {
        self.contains(type_name)
    }
}

/// A record of a component excluded during conditional evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excluded {
    /// The excluded component's type name
    pub component: &'static str,
    /// Why the component was excluded
    pub reason: String,
}

/// Evaluates conditions against an environment source and the
/// in-progress registry
pub struct ConditionEvaluator<'a> {
    environment: &'a dyn EnvironmentSource,
    all_type_names: HashSet<&'static str>,
}

impl<'a> ConditionEvaluator<'a> {
    /// Creates an evaluator over the given environment and the full set of
    /// discovered type names (used for class-presence checks)
    pub fn new(environment: &'a dyn EnvironmentSource, all_type_names: HashSet<&'static str>) -> Self {
        Self {
            environment,
            all_type_names,
        }
    }

    /// Evaluates a single condition in isolation
    pub fn evaluate_one(&self, condition: &Condition, present_names: &HashSet<&'static str>) -> Result<(), String> {
        match condition {
            Condition::ClassPresence { type_name } => {
                if self.all_type_names.is_present(type_name) {
                    Ok(())
                } else {
                    Err(format!("class '{type_name}' is not present"))
                }
            }
            Condition::PropertyMatch {
                name,
                expected,
                match_if_missing,
            } => match (self.environment.get(name), expected) {
                (Some(actual), Some(value)) if actual == *value => Ok(()),
                (Some(actual), Some(value)) => Err(format!(
                    "property '{name}' was '{actual}', expected '{value}'"
                )),
                (Some(_), None) => Ok(()),
                (None, _) if *match_if_missing => Ok(()),
                (None, _) => Err(format!("property '{name}' is not set")),
            },
            Condition::PresentBean { type_names, strategy } => {
                let satisfied = |name: &&'static str| present_names.contains(name);
                let ok = match strategy {
                    Strategy::All => type_names.iter().all(satisfied),
                    Strategy::Any => type_names.iter().any(satisfied),
                };
                if ok {
                    Ok(())
                } else {
                    Err(format!(
                        "required bean(s) {type_names:?} are not registered ({strategy:?})"
                    ))
                }
            }
            Condition::MissingBean { type_names } => {
                if type_names.iter().any(|name| present_names.contains(name)) {
                    Err(format!("bean(s) {type_names:?} are registered but must be absent"))
                } else {
                    Ok(())
                }
            }
            Condition::ProfileMatch { profiles, strategy } => {
                let active = self.environment.active_profiles();
                let satisfied = |p: &&'static str| active.contains(*p);
                let ok = match strategy {
                    Strategy::All => profiles.iter().all(satisfied),
                    Strategy::Any => profiles.iter().any(satisfied),
                };
                if ok {
                    Ok(())
                } else {
                    Err(format!(
                        "required profile(s) {profiles:?} are not active ({strategy:?})"
                    ))
                }
            }
        }
    }

    /// Evaluates all conditions for a component in the fixed AND-order:
    /// class-presence, property-match, present-bean, missing-bean,
    /// profile-match. The first failure short-circuits.
    pub fn evaluate_all(
        &self,
        conditions: &[Condition],
        present_names: &HashSet<&'static str>,
    ) -> Result<(), String> {
        let order = |c: &Condition| match c {
            Condition::ClassPresence { .. } => 0,
            Condition::PropertyMatch { .. } => 1,
            Condition::PresentBean { .. } => 2,
            Condition::MissingBean { .. } => 3,
            Condition::ProfileMatch { .. } => 4,
        };
        let mut sorted: Vec<&Condition> = conditions.iter().collect();
        sorted.sort_by_key(|c| order(c));

        for condition in sorted {
            self.evaluate_one(condition, present_names)?;
        }
        Ok(())
    }
}

/// Runs the two-pass conditional boot sequence over every discovered
/// `ComponentDefinition`, producing a [`Registry`] of the survivors and the
/// exclusions recorded along the way.
pub fn boot(environment: &dyn EnvironmentSource) -> (Registry, Vec<Excluded>) {
    let all_defs: Vec<&'static ComponentDefinition> = inventory::iter::<ComponentDefinition>().collect();
    let all_type_names: HashSet<&'static str> = all_defs.iter().map(|d| d.type_name).collect();

    let mut registry = Registry::new();
    let mut present_names: HashSet<&'static str> = HashSet::new();
    let mut excluded = Vec::new();

    // Pass 1: unconditional components register unconditionally.
    for def in &all_defs {
        if (def.conditions)().is_empty() {
            registry.add(std::sync::Arc::new(DefinitionFactory::new(def)));
            present_names.insert(def.type_name);
        }
    }

    // Pass 2: conditional components evaluated against the state pass 1 (and
    // prior pass-2 successes) produced.
    let evaluator = ConditionEvaluator::new(environment, all_type_names);
    for def in &all_defs {
        let conditions = (def.conditions)();
        if conditions.is_empty() {
            continue;
        }

        match evaluator.evaluate_all(&conditions, &present_names) {
            Ok(()) => {
                registry.add(std::sync::Arc::new(DefinitionFactory::new(def)));
                present_names.insert(def.type_name);
            }
            Err(reason) => excluded.push(Excluded {
                component: def.type_name,
                reason,
            }),
        }
    }

    (registry, excluded)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeEnvironment {
        properties: std::collections::HashMap<String, String>,
        profiles: HashSet<String>,
    }

    impl EnvironmentSource for FakeEnvironment {
        fn get(&self, name: &str) -> Option<String> {
            self.properties.get(name).cloned()
        }
        fn active_profiles(&self) -> HashSet<String> {
            self.profiles.clone()
        }
    }

    fn env() -> FakeEnvironment {
        FakeEnvironment {
            properties: std::collections::HashMap::from([("feature.x".to_string(), "on".to_string())]),
            profiles: HashSet::from(["dev".to_string()]),
        }
    }

    #[test]
    fn property_match_succeeds_when_equal() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::new());
        let condition = Condition::PropertyMatch {
            name: "feature.x",
            expected: Some("on"),
            match_if_missing: false,
        };
        assert!(evaluator.evaluate_one(&condition, &HashSet::new()).is_ok());
    }

    #[test]
    fn property_match_fails_when_missing() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::new());
        let condition = Condition::PropertyMatch {
            name: "feature.y",
            expected: Some("on"),
            match_if_missing: false,
        };
        assert!(evaluator.evaluate_one(&condition, &HashSet::new()).is_err());
    }

    #[test]
    fn property_match_if_missing_tolerates_absence() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::new());
        let condition = Condition::PropertyMatch {
            name: "feature.z",
            expected: Some("on"),
            match_if_missing: true,
        };
        assert!(evaluator.evaluate_one(&condition, &HashSet::new()).is_ok());
    }

    #[test]
    fn property_match_without_expected_value_only_checks_presence() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::new());
        let condition = Condition::PropertyMatch {
            name: "feature.x",
            expected: None,
            match_if_missing: false,
        };
        assert!(evaluator.evaluate_one(&condition, &HashSet::new()).is_ok());
    }

    #[test]
    fn profile_match_checks_active_profiles() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::new());
        let matching = Condition::ProfileMatch {
            profiles: &["dev", "staging"],
            strategy: Strategy::Any,
        };
        let non_matching = Condition::ProfileMatch {
            profiles: &["prod"],
            strategy: Strategy::Any,
        };
        assert!(evaluator.evaluate_one(&matching, &HashSet::new()).is_ok());
        assert!(evaluator.evaluate_one(&non_matching, &HashSet::new()).is_err());
    }

    #[test]
    fn profile_match_all_requires_every_profile_active() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::new());
        let condition = Condition::ProfileMatch {
            profiles: &["dev", "staging"],
            strategy: Strategy::All,
        };
        assert!(evaluator.evaluate_one(&condition, &HashSet::new()).is_err());
    }

    #[test]
    fn missing_bean_fails_when_any_listed_name_present() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::new());
        let mut present = HashSet::new();
        present.insert("LegacyLogger");
        let condition = Condition::MissingBean {
            type_names: &["LegacyLogger", "OtherBean"],
        };
        assert!(evaluator.evaluate_one(&condition, &present).is_err());
    }

    #[test]
    fn missing_bean_passes_when_none_of_the_listed_names_present() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::new());
        let condition = Condition::MissingBean {
            type_names: &["LegacyLogger", "OtherBean"],
        };
        assert!(evaluator.evaluate_one(&condition, &HashSet::new()).is_ok());
    }

    #[test]
    fn present_bean_any_passes_with_a_single_match() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::new());
        let present = HashSet::from(["Known"]);
        let condition = Condition::PresentBean {
            type_names: &["Known", "Unknown"],
            strategy: Strategy::Any,
        };
        assert!(evaluator.evaluate_one(&condition, &present).is_ok());
    }

    #[test]
    fn present_bean_all_fails_unless_every_name_is_present() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::new());
        let present = HashSet::from(["Known"]);
        let condition = Condition::PresentBean {
            type_names: &["Known", "Unknown"],
            strategy: Strategy::All,
        };
        assert!(evaluator.evaluate_one(&condition, &present).is_err());
    }

    #[test]
    fn evaluate_all_short_circuits_in_fixed_order() {
        let evaluator = ConditionEvaluator::new(&env(), HashSet::from(["Known"]));
        let conditions = vec![
            Condition::ProfileMatch {
                profiles: &["prod"],
                strategy: Strategy::Any,
            },
            Condition::ClassPresence { type_name: "Missing" },
        ];
        let err = evaluator.evaluate_all(&conditions, &HashSet::new()).unwrap_err();
        assert!(err.contains("Missing"));
    }
}
