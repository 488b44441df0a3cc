use std::collections::HashMap;

use tracing::{debug, warn};

use super::forest::{Forest, Link, RootReason, TreeNode};
use crate::models::Catalog;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// Link every catalog record under its parent
///
/// Records without a parent, or whose parent is not in the catalog, become roots.
/// A parent chain that loops back on itself is cut at the first repeated node,
/// which becomes a root; this is logged as a warning. Every record appears exactly
/// once in the result.
pub fn build(catalog: &Catalog) -> Forest {
    let mut nodes: Vec<TreeNode> = catalog
        .iter()
        .enumerate()
        .map(|(index, record)| TreeNode {
            index,
            record: record.clone(),
            link: Link::Root(RootReason::Original),
            children: Vec::new(),
        })
        .collect();

    let index_of: HashMap<&str, usize> = nodes.iter().map(|n| (n.record.id.as_str(), n.index)).collect();

    let mut parent_of: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut links: Vec<Link> = Vec::with_capacity(nodes.len());
    for node in &nodes {
        let link = match node.record.parent_id.as_deref() {
            None => Link::Root(RootReason::Original),
            Some(parent) => match index_of.get(parent) {
                Some(&p) => {
                    parent_of[node.index] = Some(p);
                    Link::Child(p)
                }
                None => {
                    debug!(id = %node.record.id, parent, "parent not in catalog");
                    Link::Root(RootReason::MissingParent)
                }
            },
        };
        links.push(link);
    }

    break_cycles(&parent_of, &mut links, &nodes);

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (index, link) in links.iter().enumerate() {
        match *link {
            Link::Root(_) => roots.push(index),
            Link::Child(parent) => children[parent].push(index),
        }
    }

    let order_key = |&i: &usize| (nodes[i].record.created_at, i);
    roots.sort_by_key(order_key);
    for list in &mut children {
        list.sort_by_key(order_key);
    }

    for ((node, link), children) in nodes.iter_mut().zip(links).zip(children) {
        node.link = link;
        node.children = children;
    }

    Forest { nodes, roots }
}

/// Walk each parent chain once, turning the first revisited node of a loop into a root
fn break_cycles(parent_of: &[Option<usize>], links: &mut [Link], nodes: &[TreeNode]) {
    let mut state = vec![Visit::Unvisited; parent_of.len()];
    let mut chain = Vec::new();

    for start in 0..parent_of.len() {
        let mut current = Some(start);

        while let Some(index) = current {
            match state[index] {
                Visit::Done => break,
                Visit::InProgress => {
                    if let Link::Child(parent) = links[index] {
                        warn!(
                            id = %nodes[index].record.id,
                            parent = %nodes[parent].record.id,
                            "parent links form a cycle, treating conversation as a root"
                        );
                    }
                    links[index] = Link::Root(RootReason::CycleBroken);
                    break;
                }
                Visit::Unvisited => {
                    state[index] = Visit::InProgress;
                    chain.push(index);
                    current = parent_of[index];
                }
            }
        }

        for index in chain.drain(..) {
            state[index] = Visit::Done;
        }
    }
}
