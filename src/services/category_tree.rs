//! Read-only queries over the category forest.
//!
//! Categories reference their parent through `parent_id`. Nothing in the
//! database stops a cycle from being written by hand, so every walk here keeps
//! a visited set and terminates regardless of the shape of the graph.

use crate::entities::categories;
use crate::models::{ClassAssociation, class_tag_of};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub class_association: String,
    pub parent_id: Option<String>,
    pub depth: usize,
    /// Set when this node or one of its descendants is the selected category.
    pub expanded: bool,
    pub selected: bool,
    pub children: Vec<CategoryNode>,
}

pub struct CategoryTree<'a> {
    nodes: Vec<&'a categories::Model>,
    by_id: HashMap<&'a str, &'a categories::Model>,
    roots: Vec<&'a categories::Model>,
    children: HashMap<&'a str, Vec<&'a categories::Model>>,
}

impl<'a> CategoryTree<'a> {
    pub fn new(categories: impl IntoIterator<Item = &'a categories::Model>) -> Self {
        let nodes: Vec<&'a categories::Model> = categories.into_iter().collect();
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut roots = Vec::new();
        let mut children: HashMap<&'a str, Vec<&'a categories::Model>> = HashMap::new();

        for &category in &nodes {
            by_id.insert(category.id.as_str(), category);
            match category.parent_id.as_deref() {
                Some(parent) => children.entry(parent).or_default().push(category),
                None => roots.push(category),
            }
        }

        Self {
            nodes,
            by_id,
            roots,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&'a categories::Model> {
        self.by_id.get(id).copied()
    }

    /// Direct children of `parent` (top-level categories for `None`), in insertion order.
    pub fn children_of(&self, parent: Option<&str>) -> Vec<&'a categories::Model> {
        match parent {
            None => self.roots.clone(),
            Some(parent) => self.children.get(parent).cloned().unwrap_or_default(),
        }
    }

    pub fn has_children(&self, id: &str) -> bool {
        self.children.get(id).is_some_and(|c| !c.is_empty())
    }

    /// `id` plus every category reachable below it.
    pub fn descendant_ids(&self, id: &str) -> HashSet<String> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        visited.insert(id.to_string());
        queue.push_back(id);

        while let Some(current) = queue.pop_front() {
            for child in self.children.get(current).into_iter().flatten() {
                if visited.insert(child.id.clone()) {
                    queue.push_back(child.id.as_str());
                }
            }
        }

        visited
    }

    /// `selected` plus every category on its parent chain that exists in this tree.
    pub fn ancestor_ids(&self, selected: &str) -> HashSet<String> {
        let mut chain = HashSet::new();
        let mut current = Some(selected);

        while let Some(id) = current {
            if !chain.insert(id.to_string()) {
                break;
            }
            current = self.get(id).and_then(|c| c.parent_id.as_deref());
        }

        chain
    }

    pub fn is_ancestor_selected(&self, id: &str, selected: &str) -> bool {
        id == selected || self.descendant_ids(id).contains(selected)
    }

    /// Categories offered for `class`: association equal to the class tag, or "both".
    pub fn filter_by_class(&self, class: &str) -> Vec<&'a categories::Model> {
        let tag = class_tag_of(class);
        self.nodes
            .iter()
            .copied()
            .filter(|c| {
                c.class_association == tag.as_str()
                    || c.class_association == ClassAssociation::Both.as_str()
            })
            .collect()
    }

    /// True when re-parenting `id` under `new_parent` would make it its own ancestor.
    pub fn would_create_cycle(&self, id: &str, new_parent: &str) -> bool {
        self.descendant_ids(id).contains(new_parent)
    }

    /// Nested forest below `parent`, flagging the path to `selected`.
    pub fn nested(&self, parent: Option<&str>, selected: Option<&str>) -> Vec<CategoryNode> {
        let expanded = selected.map(|s| self.ancestor_ids(s)).unwrap_or_default();
        let mut visited = HashSet::new();
        self.build_level(parent, 0, selected, &expanded, &mut visited)
    }

    fn build_level(
        &self,
        parent: Option<&str>,
        depth: usize,
        selected: Option<&str>,
        expanded: &HashSet<String>,
        visited: &mut HashSet<&'a str>,
    ) -> Vec<CategoryNode> {
        let mut level = Vec::new();

        for category in self.children_of(parent) {
            if !visited.insert(category.id.as_str()) {
                continue;
            }
            let children =
                self.build_level(Some(category.id.as_str()), depth + 1, selected, expanded, visited);
            level.push(CategoryNode {
                id: category.id.clone(),
                name: category.name.clone(),
                class_association: category.class_association.clone(),
                parent_id: category.parent_id.clone(),
                depth,
                expanded: expanded.contains(&category.id),
                selected: selected == Some(category.id.as_str()),
                children,
            });
        }

        level
    }

    /// Depth-first `(depth, category)` listing from the roots, as used for indented select options.
    pub fn flatten_options(&self) -> Vec<(usize, &'a categories::Model)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(usize, &'a categories::Model)> = self
            .children_of(None)
            .into_iter()
            .rev()
            .map(|c| (0, c))
            .collect();

        while let Some((depth, category)) = stack.pop() {
            if !visited.insert(category.id.as_str()) {
                continue;
            }
            out.push((depth, category));
            for child in self.children_of(Some(category.id.as_str())).into_iter().rev() {
                stack.push((depth + 1, child));
            }
        }

        out
    }
}

/// Newest first, the order the admin listings use.
pub fn sort_newest_first(categories: &mut [categories::Model]) {
    categories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
