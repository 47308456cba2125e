//! Dependency resolution over a [`ModGraph`]
//!
//! Every function here is pure over the graph: the current state of a mod is
//! supplied by the caller, so the same code runs against the filesystem or
//! against a table in tests.

use std::collections::{HashSet, VecDeque};

use crate::error::Result;
use crate::mods::{ModGraph, ModId, ModState};

/// Mods that must be brought past `ceiling` for `root` to work, dependencies
/// first.
///
/// The graph is walked breadth-first from `root`. A mod whose current state is
/// at or below `ceiling` is inserted at the front of the plan after its
/// dependencies have been queued, so deeper mods end up earlier. Mods already
/// past `ceiling` are skipped but still traversed. Each mod is queued at most
/// once, so cycles terminate.
///
/// Front insertion alone can misplace a mod reachable through two paths of
/// different depth; a stable pass then moves any mod behind its own
/// dependencies while keeping the walk order everywhere else.
pub fn resolve(
    graph: &ModGraph,
    root: ModId,
    ceiling: ModState,
    state: impl Fn(ModId) -> ModState,
) -> Result<Vec<ModId>> {
    let mut queue = VecDeque::from([root]);
    let mut seen = HashSet::from([root]);
    let mut plan: VecDeque<ModId> = VecDeque::new();

    while let Some(id) = queue.pop_front() {
        for dependency in graph.dependency_ids(id)? {
            if seen.insert(dependency) {
                queue.push_back(dependency);
            }
        }
        if state(id) <= ceiling {
            plan.push_front(id);
        }
    }

    Ok(dependencies_first(graph, plan.into()))
}

/// Reorder `plan` so that no mod comes before one of its dependencies that
/// is also in the plan. Already-valid orders are returned unchanged; a cycle
/// is broken at its earliest member.
fn dependencies_first(graph: &ModGraph, mut pending: Vec<ModId>) -> Vec<ModId> {
    let included: HashSet<ModId> = pending.iter().copied().collect();
    let mut placed: HashSet<ModId> = HashSet::with_capacity(pending.len());
    let mut ordered = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let next = pending
            .iter()
            .position(|&id| {
                graph
                    .dependency_targets(id)
                    .into_iter()
                    .all(|dep| dep == id || !included.contains(&dep) || placed.contains(&dep))
            })
            .unwrap_or(0);
        let id = pending.remove(next);
        placed.insert(id);
        ordered.push(id);
    }

    ordered
}

/// Every mod depending on `root`, directly or not, nearest first
pub fn dependents(graph: &ModGraph, root: ModId) -> Vec<ModId> {
    let mut queue = VecDeque::from([root]);
    let mut seen = HashSet::from([root]);
    let mut found = Vec::new();

    while let Some(id) = queue.pop_front() {
        for dependent in graph.dependents(id) {
            if seen.insert(dependent) {
                found.push(dependent);
                queue.push_back(dependent);
            }
        }
    }

    found
}

/// Dependencies of `removed` that nothing else at or above `floor` needs
/// once `removed` is gone.
///
/// A candidate is any transitive dependency of the removal set whose state
/// is at least `floor`. It is unused when every dependent at or above
/// `floor` is itself being removed; accepting one candidate can free its own
/// dependencies, so this runs to a fixpoint. Dangling dependency names are
/// ignored. The result lists dependents before their dependencies.
pub fn unused_dependencies(
    graph: &ModGraph,
    removed: &[ModId],
    floor: ModState,
    state: impl Fn(ModId) -> ModState,
) -> Vec<ModId> {
    let mut removing: HashSet<ModId> = removed.iter().copied().collect();

    let mut candidates: Vec<ModId> = Vec::new();
    let mut queue: VecDeque<ModId> = removed.iter().copied().collect();
    let mut seen = removing.clone();
    while let Some(id) = queue.pop_front() {
        for dep in graph.dependency_targets(id) {
            if seen.insert(dep) {
                candidates.push(dep);
                queue.push_back(dep);
            }
        }
    }
    candidates.retain(|&id| state(id) >= floor);

    let mut unused = Vec::new();
    loop {
        let freed: Vec<ModId> = candidates
            .iter()
            .copied()
            .filter(|id| !removing.contains(id))
            .filter(|&id| {
                graph
                    .dependents(id)
                    .all(|dependent| removing.contains(&dependent) || state(dependent) < floor)
            })
            .collect();
        if freed.is_empty() {
            break;
        }
        for id in freed {
            removing.insert(id);
            unused.push(id);
        }
    }

    unused
}
