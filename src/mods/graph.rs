//! Dependency graph over the loaded mods
//!
//! Built in a single pass once the whole table is known: each mod is a node
//! in load order and an edge points from a mod to each dependency. Names
//! that match no loaded mod are kept beside the graph and only become an
//! error when a traversal reaches them.

use std::collections::HashMap;

use petgraph::prelude::*;

use super::Mod;
use crate::error::{Error, Result};

/// Node of a mod inside a [`ModGraph`]
pub type ModId = NodeIndex;

#[derive(Debug, Clone, Default)]
pub struct ModGraph {
    graph: DiGraph<Mod, ()>,
    index: HashMap<String, ModId>,
    unresolved: HashMap<ModId, Vec<String>>,
}

impl ModGraph {
    /// Build the graph. A later mod with an already-seen name replaces the
    /// earlier one in place.
    pub fn new(loaded: Vec<Mod>) -> Self {
        let mut graph: DiGraph<Mod, ()> = DiGraph::with_capacity(loaded.len(), loaded.len());
        let mut index: HashMap<String, ModId> = HashMap::with_capacity(loaded.len());
        for m in loaded {
            match index.get(&m.name) {
                Some(&id) => graph[id] = m,
                None => {
                    let name = m.name.clone();
                    index.insert(name, graph.add_node(m));
                }
            }
        }

        let mut unresolved: HashMap<ModId, Vec<String>> = HashMap::new();
        let nodes: Vec<ModId> = graph.node_indices().collect();
        for id in nodes {
            let declared = graph[id].dependencies.clone();
            for name in declared {
                match index.get(&name) {
                    Some(&target) => {
                        graph.update_edge(id, target, ());
                    }
                    None => unresolved.entry(id).or_default().push(name),
                }
            }
        }

        Self {
            graph,
            index,
            unresolved,
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn get(&self, id: ModId) -> &Mod {
        &self.graph[id]
    }

    pub fn find(&self, name: &str) -> Option<ModId> {
        self.index.get(name).copied()
    }

    /// Look a mod up by name, failing with `UnknownMod`
    pub fn id(&self, name: &str) -> Result<ModId> {
        self.find(name).ok_or_else(|| Error::UnknownMod(name.to_string()))
    }

    /// Mods in load order
    pub fn mods(&self) -> impl Iterator<Item = &Mod> {
        self.graph.node_indices().map(|id| &self.graph[id])
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModId, &Mod)> {
        self.graph.node_indices().map(|id| (id, &self.graph[id]))
    }

    /// Dependency names of `id` that match no loaded mod
    pub fn unresolved(&self, id: ModId) -> &[String] {
        self.unresolved.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Loaded dependencies of `id`, in declaration order. Dangling names are
    /// skipped.
    pub fn dependency_targets(&self, id: ModId) -> Vec<ModId> {
        // Edges are listed newest first
        let mut targets: Vec<ModId> = self.graph.neighbors_directed(id, Outgoing).collect();
        targets.reverse();
        targets
    }

    /// Loaded dependencies of `id`, failing on a dangling name
    pub fn dependency_ids(&self, id: ModId) -> Result<Vec<ModId>> {
        if let Some(name) = self.unresolved(id).first() {
            return Err(Error::UnknownMod(name.clone()));
        }
        Ok(self.dependency_targets(id))
    }

    /// Mods that directly depend on `id`
    pub fn dependents(&self, id: ModId) -> impl Iterator<Item = ModId> + '_ {
        self.graph.neighbors_directed(id, Incoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mods::testing::sample_mod;

    #[test]
    fn edges_are_resolved_up_front() {
        let graph = ModGraph::new(vec![
            sample_mod("Randomizer", "1.0.0", &["Modding API", "Missing"]),
            sample_mod("Modding API", "2.0.0", &[]),
        ]);

        let randomizer = graph.id("Randomizer").unwrap();
        let api = graph.id("Modding API").unwrap();
        assert_eq!(graph.dependency_targets(randomizer), [api]);
        assert_eq!(graph.unresolved(randomizer), ["Missing"]);
        assert!(graph.unresolved(api).is_empty());
        assert!(matches!(graph.dependency_ids(randomizer), Err(Error::UnknownMod(name)) if name == "Missing"));
        assert_eq!(graph.dependents(api).collect::<Vec<_>>(), [randomizer]);
    }

    #[test]
    fn targets_keep_declaration_order() {
        let graph = ModGraph::new(vec![
            sample_mod("Randomizer", "1.0.0", &["Framework", "Modding API", "Framework"]),
            sample_mod("Modding API", "2.0.0", &[]),
            sample_mod("Framework", "1.0.0", &[]),
        ]);
        let randomizer = graph.id("Randomizer").unwrap();
        let expected = [graph.id("Framework").unwrap(), graph.id("Modding API").unwrap()];
        assert_eq!(graph.dependency_ids(randomizer).unwrap(), expected);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let graph = ModGraph::new(vec![sample_mod("Randomizer", "1.0.0", &[])]);
        assert!(matches!(graph.id("Multiworld"), Err(Error::UnknownMod(_))));
        assert_eq!(graph.find("Multiworld"), None);
    }

    #[test]
    fn duplicate_names_keep_the_last_record() {
        let graph = ModGraph::new(vec![
            sample_mod("Modding API", "1.0.0", &[]),
            sample_mod("Randomizer", "1.0.0", &[]),
            sample_mod("Modding API", "1.1.0", &[]),
        ]);
        assert_eq!(graph.len(), 2);
        let names: Vec<(&str, String)> = graph
            .mods()
            .map(|m| (m.name.as_str(), m.version.to_string()))
            .collect();
        assert_eq!(
            names,
            [("Modding API", "1.1.0".to_string()), ("Randomizer", "1.0.0".to_string())]
        );
    }
}
