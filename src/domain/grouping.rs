//! Module-based grouping.
//!
//! Derives one cluster per module prefix when the profile itself carries no
//! explicit groups.

use crate::domain::profile::{FunctionStat, Group};

/// Separators tried in order when splitting a qualified name.
const SEPARATORS: [&str; 2] = ["::", "."];

/// Module part of a qualified function name, if any.
pub fn module_of(name: &str) -> Option<&str> {
    SEPARATORS
        .iter()
        .filter_map(|sep| name.rfind(sep).map(|idx| &name[..idx]))
        .find(|module| !module.is_empty())
}

/// Group functions by module prefix, in first-appearance order.
pub fn group_by_module(functions: &[FunctionStat]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();

    for func in functions {
        let Some(module) = module_of(&func.name) else {
            continue;
        };

        match groups.iter_mut().find(|g| g.name == module) {
            Some(group) => group.members.push(func.name.clone()),
            None => groups.push(Group {
                name: module.to_string(),
                members: vec![func.name.clone()],
            }),
        }
    }

    groups
}
