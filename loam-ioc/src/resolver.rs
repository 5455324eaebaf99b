//! Dependency graph resolution
//!
//! Generalizes the recursive, cycle-detect-as-you-go resolution the
//! container used to do inline (`ComponentContainer::resolve_bean`) into an
//! explicit graph pass: build the full "A needs B" graph up front, sort it
//! topologically, and report every resolution failure together instead of
//! stopping at the first one.

use loam_core::error::resolution::ResolutionError;
use std::any::TypeId;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::ir::{ComponentDefinition, Qualifier, Wrapper};

/// The outcome of a full boot-time graph resolution pass
///
/// `errors` is empty iff the graph is viable; `informational_cycles` is
/// populated whenever a cycle exists but is broken by at least one
/// `Provider`/`Optional` edge, which is permitted and merely logged.
#[derive(Debug, Default)]
pub struct BootReport {
    /// Fatal resolution errors, aggregated rather than short-circuited
    pub errors: Vec<ResolutionError>,
    /// Cycles broken by a `Provider`/`Optional` edge; non-fatal
    pub informational_cycles: Vec<Vec<&'static str>>,
    /// Components in a valid construction order
    pub order: Vec<TypeId>,
}

impl BootReport {
    /// Whether the graph resolved with no fatal errors
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

struct Node {
    def: &'static ComponentDefinition,
    discovery_index: usize,
}

/// Resolves the dependency graph declared by all `inventory`-collected
/// [`ComponentDefinition`]s
pub struct GraphResolver {
    by_type: HashMap<TypeId, Node>,
    by_name: HashMap<&'static str, TypeId>,
}

impl GraphResolver {
    /// Builds a resolver over every `ComponentDefinition` discovered via
    /// `inventory`, in stable discovery order
    pub fn discover() -> Self {
        let mut by_type = HashMap::new();
        let mut by_name = HashMap::new();

        for (index, def) in inventory::iter::<ComponentDefinition>().enumerate() {
            let type_id = (def.type_id)();
            by_name.insert(def.type_name, type_id);
            by_type.insert(
                type_id,
                Node {
                    def,
                    discovery_index: index,
                },
            );
        }

        Self { by_type, by_name }
    }

    /// Resolves the full graph: builds edges from injection points and
    /// `depends_on`, topologically sorts, and detects cycles
    pub fn resolve(&self) -> BootReport {
        self.resolve_with_externals(&HashSet::new())
    }

    /// Resolves the full graph the same way as [`GraphResolver::resolve`],
    /// treating every type in `externals` as an already-satisfied
    /// dependency: an injection point requesting one is neither an edge in
    /// the graph nor an unsatisfied-dependency error, since the host
    /// registered that instance directly rather than through a discovered
    /// `ComponentDefinition`
    pub fn resolve_with_externals(&self, externals: &HashSet<TypeId>) -> BootReport {
        let mut report = BootReport::default();
        let mut edges: HashMap<TypeId, Vec<(TypeId, bool)>> = HashMap::new();
        let mut in_degree: HashMap<TypeId, usize> = HashMap::new();

        for type_id in self.by_type.keys() {
            edges.entry(*type_id).or_default();
            in_degree.entry(*type_id).or_insert(0);
        }

        for (type_id, node) in &self.by_type {
            let mut required_edges: Vec<(TypeId, bool)> = Vec::new();

            for point in (node.def.injection_points)() {
                let requested = (point.requested_type)();
                let deferred = matches!(point.wrapper, Wrapper::Provider | Wrapper::Optional);

                // A candidate satisfies the point either by being the exact
                // requested type or by declaring it among its interfaces.
                let mut candidates: Vec<TypeId> = self
                    .by_type
                    .iter()
                    .filter(|(id, n)| {
                        **id == requested || (n.def.implemented_interfaces)().contains(&requested)
                    })
                    .map(|(id, _)| *id)
                    .collect();

                if point.wrapper != Wrapper::Collection {
                    if let Some(Qualifier(q)) = point.qualifier {
                        candidates.retain(|id| self.by_type[id].def.qualifiers.contains(&q));
                    }
                }

                if point.wrapper == Wrapper::Collection {
                    for candidate in &candidates {
                        required_edges.push((*candidate, false));
                    }
                    continue;
                }

                match candidates.len() {
                    1 => required_edges.push((candidates[0], deferred)),
                    0 => {
                        if externals.contains(&requested) {
                            // Already resolvable outside the graph; no edge needed.
                        } else if point.required && !deferred {
                            report.errors.push(ResolutionError::unsatisfied_dependency(
                                node.def.type_name,
                                point.requested_type_name,
                            ));
                        }
                    }
                    _ => {
                        let primaries: Vec<TypeId> = candidates
                            .iter()
                            .copied()
                            .filter(|id| self.by_type[id].def.primary)
                            .collect();
                        if primaries.len() == 1 {
                            required_edges.push((primaries[0], deferred));
                        } else {
                            let mut names: Vec<String> = candidates
                                .iter()
                                .map(|id| self.by_type[id].def.type_name.to_string())
                                .collect();
                            names.sort();
                            report.errors.push(ResolutionError::ambiguous_dependency(
                                node.def.type_name,
                                point.requested_type_name,
                                names,
                            ));
                        }
                    }
                }
            }

            for dep_name in node.def.depends_on {
                if let Some(dep_type) = self.by_name.get(dep_name) {
                    required_edges.push((*dep_type, false));
                } else {
                    report.errors.push(ResolutionError::unsatisfied_dependency(
                        node.def.type_name,
                        *dep_name,
                    ));
                }
            }

            for (target, deferred) in &required_edges {
                if !deferred {
                    *in_degree.entry(*type_id).or_insert(0) += 1;
                }
                edges.entry(*target).or_default().push((*type_id, *deferred));
            }
        }

        // Kahn's algorithm: process zero-in-degree nodes first, breaking ties
        // by ascending `order` then stable discovery order.
        let mut ready: VecDeque<TypeId> = self
            .by_type
            .iter()
            .filter(|(id, _)| in_degree.get(*id).copied().unwrap_or(0) == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut ready_sorted: Vec<TypeId> = ready.drain(..).collect();
        self.sort_by_priority(&mut ready_sorted);
        let mut queue: VecDeque<TypeId> = ready_sorted.into();

        let mut remaining_in_degree = in_degree.clone();
        let mut visited: HashSet<TypeId> = HashSet::new();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            report.order.push(current);

            let mut freed: Vec<TypeId> = Vec::new();
            if let Some(dependents) = edges.get(&current) {
                for (dependent, deferred) in dependents {
                    if *deferred {
                        continue;
                    }
                    if let Some(count) = remaining_in_degree.get_mut(dependent) {
                        if *count > 0 {
                            *count -= 1;
                            if *count == 0 {
                                freed.push(*dependent);
                            }
                        }
                    }
                }
            }
            self.sort_by_priority(&mut freed);
            for id in freed {
                queue.push_back(id);
            }
        }

        if report.order.len() != self.by_type.len() {
            let unresolved: Vec<&'static str> = self
                .by_type
                .keys()
                .filter(|id| !visited.contains(*id))
                .map(|id| self.by_type[id].def.type_name)
                .collect();

            if unresolved.is_empty() {
                // Everything resolved some other way; nothing more to report.
            } else {
                let has_deferred_break = unresolved.iter().any(|name| {
                    let Some(type_id) = self.by_name.get(name) else {
                        return false;
                    };
                    edges
                        .get(type_id)
                        .map(|es| es.iter().any(|(_, deferred)| *deferred))
                        .unwrap_or(false)
                });

                if has_deferred_break {
                    report.informational_cycles.push(unresolved);
                } else {
                    report
                        .errors
                        .push(ResolutionError::dependency_cycle(
                            unresolved.iter().map(|s| s.to_string()).collect(),
                        ));
                }
            }
        }

        self.check_multiple_primary(&mut report);

        report
    }

    fn sort_by_priority(&self, ids: &mut [TypeId]) {
        ids.sort_by_key(|id| {
            let node = &self.by_type[id];
            (node.def.order, node.discovery_index)
        });
    }

    fn check_multiple_primary(&self, report: &mut BootReport) {
        let mut primaries_by_interface: HashMap<TypeId, Vec<&'static str>> = HashMap::new();

        for node in self.by_type.values() {
            if !node.def.primary {
                continue;
            }
            for interface in (node.def.implemented_interfaces)() {
                primaries_by_interface
                    .entry(interface)
                    .or_default()
                    .push(node.def.type_name);
            }
        }

        for (_, names) in primaries_by_interface {
            if names.len() > 1 {
                report.errors.push(ResolutionError::multiple_primary(
                    names[0],
                    names.iter().map(|s| s.to_string()).collect(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{InjectionPointDef, InjectionKind};
    use loam_core::error::component::ComponentError;
    use std::collections::HashMap as StdHashMap;
    use std::sync::Arc;

    fn no_conditions() -> Vec<crate::ir::Condition> {
        Vec::new()
    }

    fn no_points() -> Vec<InjectionPointDef> {
        Vec::new()
    }

    fn no_interfaces() -> Vec<TypeId> {
        Vec::new()
    }

    struct Leaf;
    struct Root;

    fn leaf_creator(
        _deps: StdHashMap<TypeId, crate::component::ComponentInstance>,
    ) -> Result<crate::component::ComponentInstance, ComponentError> {
        Ok(Arc::new(Leaf {}))
    }

    fn root_creator(
        _deps: StdHashMap<TypeId, crate::component::ComponentInstance>,
    ) -> Result<crate::component::ComponentInstance, ComponentError> {
        Ok(Arc::new(Root {}))
    }

    fn leaf_points() -> Vec<InjectionPointDef> {
        Vec::new()
    }

    fn root_points() -> Vec<InjectionPointDef> {
        vec![InjectionPointDef {
            owner_type_id: || TypeId::of::<Root>(),
            kind: InjectionKind::Field { name: "leaf" },
            requested_type: || TypeId::of::<Leaf>(),
            requested_type_name: "Leaf",
            qualifier: None,
            wrapper: crate::ir::Wrapper::Direct,
            required: true,
        }]
    }

    fn make_resolver_with(defs: Vec<(TypeId, &'static str, i32, fn() -> Vec<InjectionPointDef>)>) -> GraphResolver {
        let mut by_type = StdHashMap::new();
        let mut by_name = StdHashMap::new();

        // Leak definitions so they live as `'static` for the test, mirroring
        // how `inventory`-collected items are genuinely `'static` in practice.
        for (idx, (type_id, name, order, points)) in defs.into_iter().enumerate() {
            let creator = if name == "Root" { root_creator } else { leaf_creator };
            let def: &'static ComponentDefinition = Box::leak(Box::new(ComponentDefinition {
                type_id: {
                    // type_id fn must return the captured id; use a thread-local-free
                    // trick via function pointer per concrete type instead.
                    if name == "Root" { || TypeId::of::<Root>() } else { || TypeId::of::<Leaf>() }
                },
                type_name: name,
                component_name: None,
                qualifiers: &[],
                primary: false,
                lazy: false,
                order,
                destroy_order: 0,
                scope_id: "singleton",
                depends_on: &[],
                conditions: no_conditions,
                injection_points: points,
                implemented_interfaces: no_interfaces,
                cast_to_interface: |_instance, _interface| None,
                creator,
                post_construct: None,
                after_properties_set: None,
                pre_destroy: None,
                lifecycle_phase: None,
                lifecycle_start: None,
                lifecycle_stop: None,
            }));
            by_name.insert(def.type_name, type_id);
            by_type.insert(
                type_id,
                Node {
                    def,
                    discovery_index: idx,
                },
            );
        }

        GraphResolver { by_type, by_name }
    }

    #[test]
    fn resolves_simple_dependency_order() {
        let resolver = make_resolver_with(vec![
            (TypeId::of::<Root>(), "Root", 0, root_points),
            (TypeId::of::<Leaf>(), "Leaf", 0, leaf_points),
        ]);

        let report = resolver.resolve();
        assert!(report.is_ok());
        let leaf_pos = report.order.iter().position(|id| *id == TypeId::of::<Leaf>()).unwrap();
        let root_pos = report.order.iter().position(|id| *id == TypeId::of::<Root>()).unwrap();
        assert!(leaf_pos < root_pos);
    }

    #[test]
    fn reports_unsatisfied_dependency_when_leaf_missing() {
        let resolver = make_resolver_with(vec![(TypeId::of::<Root>(), "Root", 0, root_points)]);
        let report = resolver.resolve();
        assert!(!report.is_ok());
        assert!(matches!(
            report.errors[0],
            ResolutionError::UnsatisfiedDependency { .. }
        ));
    }

    struct ImplA;
    struct ImplB;
    struct Consumer;
    struct Svc;

    fn no_op_creator(
        _deps: StdHashMap<TypeId, crate::component::ComponentInstance>,
    ) -> Result<crate::component::ComponentInstance, ComponentError> {
        Ok(Arc::new(()))
    }

    fn leaked_def(
        type_id: fn() -> TypeId,
        name: &'static str,
        primary: bool,
        qualifiers: &'static [&'static str],
        implemented_interfaces: fn() -> Vec<TypeId>,
        injection_points: fn() -> Vec<InjectionPointDef>,
    ) -> &'static ComponentDefinition {
        Box::leak(Box::new(ComponentDefinition {
            type_id,
            type_name: name,
            component_name: None,
            qualifiers,
            primary,
            lazy: false,
            order: 0,
            destroy_order: 0,
            scope_id: "singleton",
            depends_on: &[],
            conditions: no_conditions,
            injection_points,
            implemented_interfaces,
            cast_to_interface: |_instance, _interface| None,
            creator: no_op_creator,
            post_construct: None,
            after_properties_set: None,
            pre_destroy: None,
            lifecycle_phase: None,
            lifecycle_start: None,
            lifecycle_stop: None,
        }))
    }

    fn consumer_points_for(requested: fn() -> TypeId, requested_name: &'static str) -> Vec<InjectionPointDef> {
        vec![InjectionPointDef {
            owner_type_id: || TypeId::of::<Consumer>(),
            kind: InjectionKind::Field { name: "svc" },
            requested_type: requested,
            requested_type_name: requested_name,
            qualifier: None,
            wrapper: crate::ir::Wrapper::Direct,
            required: true,
        }]
    }

    fn iface_type() -> TypeId {
        TypeId::of::<Svc>()
    }

    #[test]
    fn ambiguous_candidates_with_no_primary_are_rejected() {
        let impl_a = leaked_def(|| TypeId::of::<ImplA>(), "ImplA", false, &[], || vec![iface_type()], no_points);
        let impl_b = leaked_def(|| TypeId::of::<ImplB>(), "ImplB", false, &[], || vec![iface_type()], no_points);
        let consumer = leaked_def(
            || TypeId::of::<Consumer>(),
            "Consumer",
            false,
            &[],
            no_interfaces,
            || consumer_points_for(iface_type, "Svc"),
        );

        let mut by_type = StdHashMap::new();
        let mut by_name = StdHashMap::new();
        for (idx, def) in [impl_a, impl_b, consumer].into_iter().enumerate() {
            by_name.insert(def.type_name, (def.type_id)());
            by_type.insert((def.type_id)(), Node { def, discovery_index: idx });
        }
        let resolver = GraphResolver { by_type, by_name };

        let report = resolver.resolve();
        assert!(!report.is_ok());
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ResolutionError::AmbiguousDependency { .. })));
    }

    #[test]
    fn primary_breaks_the_tie_among_multiple_candidates() {
        let impl_a = leaked_def(|| TypeId::of::<ImplA>(), "ImplA", true, &[], || vec![iface_type()], no_points);
        let impl_b = leaked_def(|| TypeId::of::<ImplB>(), "ImplB", false, &[], || vec![iface_type()], no_points);
        let consumer = leaked_def(
            || TypeId::of::<Consumer>(),
            "Consumer",
            false,
            &[],
            no_interfaces,
            || consumer_points_for(iface_type, "Svc"),
        );

        let mut by_type = StdHashMap::new();
        let mut by_name = StdHashMap::new();
        for (idx, def) in [impl_a, impl_b, consumer].into_iter().enumerate() {
            by_name.insert(def.type_name, (def.type_id)());
            by_type.insert((def.type_id)(), Node { def, discovery_index: idx });
        }
        let resolver = GraphResolver { by_type, by_name };

        let report = resolver.resolve();
        assert!(report.is_ok());
    }
}
