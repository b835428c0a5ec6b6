//! Dependency-tree flattening.

use std::collections::HashSet;
use std::rc::Rc;

use super::graph::Project;

/// The ordered, deduplicated emission plan for one generation run.
#[derive(Debug, Clone)]
pub struct Worklist {
    /// Every reachable project, dependencies before their parents, each name
    /// exactly once in first-encounter order.
    pub projects: Vec<Rc<Project>>,
    /// The requested roots, in request order.
    pub roots: Vec<Rc<Project>>,
}

/// Flatten the requested roots into a [`Worklist`].
///
/// The walk is depth-first from each root in declaration order; a project
/// name is visited at most once, so a dependency shared between roots (or
/// repeated inside one tree) is emitted a single time.
#[must_use]
pub fn flatten(roots: &[Rc<Project>]) -> Worklist {
    let mut seen = HashSet::new();
    let mut projects = Vec::new();
    for root in roots {
        visit(root, &mut seen, &mut projects);
    }
    Worklist {
        projects,
        roots: roots.to_vec(),
    }
}

fn visit(project: &Rc<Project>, seen: &mut HashSet<String>, out: &mut Vec<Rc<Project>>) {
    if !seen.insert(project.name.clone()) {
        return;
    }
    for dep in &project.dependencies {
        visit(dep, seen, out);
    }
    out.push(Rc::clone(project));
}
