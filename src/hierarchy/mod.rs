//! Body hierarchy
//!
//! Parent references are resolved once into an index-based tree. Each body is
//! identified by a [`BodyId`], its position in [`Catalog::bodies`].

use log::{debug, warn};
use serde::Serialize;

use crate::catalogs::Catalog;
use crate::errors::{reject_all, OrreryError, Result, Violation};

/// Index of a body within its catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Resolved parent/child tree over a catalog's bodies
#[derive(Debug, Clone)]
pub struct Hierarchy {
    parents: Vec<Option<BodyId>>,
    children: Vec<Vec<BodyId>>,
    roots: Vec<BodyId>,
    /// Ancestor chain of every body, root first and ending with the body itself
    chains: Vec<Vec<BodyId>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    New,
    OnPath,
    Done,
}

impl Hierarchy {
    /// Link every body to its parent.
    ///
    /// Fails with [`OrreryError::Reference`] for a parent name that matches no
    /// body and [`OrreryError::Cycle`] when parent links loop. Several such
    /// problems are reported together as [`OrreryError::Validation`].
    pub fn resolve(catalog: &Catalog) -> Result<Self> {
        let bodies = catalog.bodies();

        let mut problems = Vec::new();
        let mut parents = Vec::with_capacity(bodies.len());
        for body in bodies {
            let parent = match &body.parent {
                Some(name) => {
                    let found = catalog.body_index(name).map(BodyId);
                    if found.is_none() {
                        let message = format!("unknown parent '{}'", name);
                        problems.push((
                            OrreryError::Reference(format!("body '{}' names {}", body.name, message)),
                            Violation::new(format!("body '{}'", body.name), "@parent", message),
                        ));
                    }
                    found
                }
                None => None,
            };
            parents.push(parent);
        }

        // Walk up from every body; meeting a body already on the current walk is a cycle
        let mut state = vec![Visit::New; bodies.len()];
        for start in 0..bodies.len() {
            let mut path: Vec<usize> = Vec::new();
            let mut current = Some(start);
            while let Some(i) = current {
                match state[i] {
                    Visit::Done => break,
                    Visit::OnPath => {
                        let from = path.iter().position(|&p| p == i).unwrap_or(0);
                        let mut chain: Vec<String> =
                            path[from..].iter().map(|&p| bodies[p].name.clone()).collect();
                        chain.push(bodies[i].name.clone());
                        let message = format!("parent cycle {}", chain.join(" -> "));
                        problems.push((
                            OrreryError::Cycle { chain },
                            Violation::new(format!("body '{}'", bodies[i].name), "@parent", message),
                        ));
                        break;
                    }
                    Visit::New => {
                        state[i] = Visit::OnPath;
                        path.push(i);
                        current = parents[i].map(|p| p.0);
                    }
                }
            }
            for i in path {
                state[i] = Visit::Done;
            }
        }
        reject_all(problems)?;

        let mut children = vec![Vec::new(); bodies.len()];
        let mut roots = Vec::new();
        for (i, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[p.0].push(BodyId(i)),
                None => roots.push(BodyId(i)),
            }
        }

        let chains = (0..bodies.len())
            .map(|i| {
                let mut chain = vec![BodyId(i)];
                while let Some(parent) = parents[chain[chain.len() - 1].0] {
                    chain.push(parent);
                }
                chain.reverse();
                chain
            })
            .collect();

        if roots.len() > 1 {
            warn!(
                "Catalog has {} root bodies; each is placed at the origin",
                roots.len()
            );
        }
        for root in &roots {
            let body = &bodies[root.0];
            if !body.orbit.is_degenerate() {
                warn!(
                    "Root body '{}' has orbital elements but no parent; treating it as a fixed origin",
                    body.name
                );
            }
        }
        debug!("Resolved hierarchy of {} bodies", bodies.len());

        Ok(Self {
            parents,
            children,
            roots,
            chains,
        })
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn parent(&self, id: BodyId) -> Option<BodyId> {
        self.parents[id.0]
    }

    pub fn children(&self, id: BodyId) -> &[BodyId] {
        &self.children[id.0]
    }

    /// Bodies without a parent
    pub fn roots(&self) -> &[BodyId] {
        &self.roots
    }

    pub fn is_root(&self, id: BodyId) -> bool {
        self.parents[id.0].is_none()
    }

    /// Root first, ending with `id` itself
    pub fn ancestor_chain(&self, id: BodyId) -> &[BodyId] {
        &self.chains[id.0]
    }

    /// Number of ancestors; roots have depth 0
    pub fn depth(&self, id: BodyId) -> usize {
        self.chains[id.0].len() - 1
    }

    /// Pre-order walk of every tree, paired with depth
    pub fn depth_first(&self) -> Vec<(BodyId, usize)> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack: Vec<(BodyId, usize)> = self.roots.iter().rev().map(|&r| (r, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            order.push((id, depth));
            stack.extend(self.children[id.0].iter().rev().map(|&c| (c, depth + 1)));
        }
        order
    }
}
