//! Drag-and-drop editing of the collection tree.
//!
//! An [`EditSession`] is a plain value: every move validates the request,
//! produces a new session and leaves the original untouched. The UI keeps the
//! current session and swaps it on success.

use tracing::debug;

use crate::error::TreeError;

use super::tree::{self, TreeNode};
use super::{Collection, ItemUid, ReportArena};

/// Where a dragged node is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Root { index: usize },
    Into { parent_id: ItemUid, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub node_id: ItemUid,
    pub target: DropTarget,
}

/// A collection the selected node may be dropped into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropChoice {
    pub id: ItemUid,
    pub label: String,
    pub depth: usize,
}

impl std::fmt::Display for DropChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", "  ".repeat(self.depth), self.label)
    }
}

#[derive(Debug, Clone)]
pub struct EditSession {
    nodes: Vec<TreeNode>,
    arena: ReportArena,
    count_info: bool,
    dirty: bool,
}

impl EditSession {
    pub fn new(collections: &[Collection], count_info: bool) -> Self {
        Self {
            nodes: tree::build_tree_nodes(collections, count_info),
            arena: ReportArena::from_collections(collections),
            count_info,
            dirty: false,
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Whether any move was applied since the session was created.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn document_count(&self) -> usize {
        tree::count_document_nodes(&self.nodes)
    }

    /// Nested structure ready to be persisted.
    pub fn to_collections(&self) -> Vec<Collection> {
        tree::convert_tree_nodes_to_collections(&self.nodes, &self.arena, None)
    }

    /// Same tree, relabelled with or without counts.
    pub fn with_count_info(&self, count_info: bool) -> Self {
        Self {
            nodes: tree::build_tree_nodes(&self.to_collections(), count_info),
            arena: self.arena.clone(),
            count_info,
            dirty: self.dirty,
        }
    }

    pub fn move_node(&self, request: &MoveRequest) -> Result<Self, TreeError> {
        let source = tree::find_node(&self.nodes, &request.node_id)
            .ok_or_else(|| TreeError::NodeNotFound(request.node_id.clone()))?;

        let parent_id = match &request.target {
            DropTarget::Root { .. } => {
                if !source.is_collection() {
                    return Err(TreeError::DocumentAtRoot(request.node_id.clone()));
                }
                None
            }
            DropTarget::Into { parent_id, .. } => {
                let target = tree::find_node(&self.nodes, parent_id)
                    .ok_or_else(|| TreeError::NodeNotFound(parent_id.clone()))?;
                if !target.is_collection() {
                    return Err(TreeError::NotACollection(parent_id.clone()));
                }
                if source.is_collection()
                    && (source.id() == parent_id || tree::find_node(source.children(), parent_id).is_some())
                {
                    return Err(TreeError::CycleDetected {
                        node: request.node_id.clone(),
                        target: parent_id.clone(),
                    });
                }
                Some(parent_id.clone())
            }
        };

        let mut nodes = self.nodes.clone();
        let mut moved = detach(&mut nodes, &request.node_id)
            .ok_or_else(|| TreeError::NodeNotFound(request.node_id.clone()))?;
        reparent(&mut moved, parent_id.as_deref());

        match &request.target {
            DropTarget::Root { index } => {
                let index = (*index).min(nodes.len());
                nodes.insert(index, moved);
            }
            DropTarget::Into { parent_id, index } => {
                let children = children_mut(&mut nodes, parent_id)
                    .ok_or_else(|| TreeError::NodeNotFound(parent_id.clone()))?;
                let index = (*index).min(children.len());
                children.insert(index, moved);
            }
        }

        debug!(node = %request.node_id, target = ?request.target, "moved tree node");

        let collections = tree::convert_tree_nodes_to_collections(&nodes, &self.arena, None);
        Ok(Self {
            nodes: tree::build_tree_nodes(&collections, self.count_info),
            arena: self.arena.clone(),
            count_info: self.count_info,
            dirty: true,
        })
    }

    /// Swap the node with its previous sibling of the same kind.
    pub fn move_up(&self, node_id: &str) -> Result<Self, TreeError> {
        let (siblings, index, parent_id) =
            locate(&self.nodes, node_id, None).ok_or_else(|| TreeError::NodeNotFound(node_id.to_string()))?;

        let same_kind_before = index > 0 && siblings[index - 1].is_collection() == siblings[index].is_collection();
        if !same_kind_before {
            return Ok(self.clone());
        }
        self.move_node(&MoveRequest {
            node_id: node_id.to_string(),
            target: drop_target(parent_id, index - 1),
        })
    }

    /// Swap the node with its next sibling of the same kind.
    pub fn move_down(&self, node_id: &str) -> Result<Self, TreeError> {
        let (siblings, index, parent_id) =
            locate(&self.nodes, node_id, None).ok_or_else(|| TreeError::NodeNotFound(node_id.to_string()))?;

        let same_kind_after =
            index + 1 < siblings.len() && siblings[index + 1].is_collection() == siblings[index].is_collection();
        if !same_kind_after {
            return Ok(self.clone());
        }
        self.move_node(&MoveRequest {
            node_id: node_id.to_string(),
            target: drop_target(parent_id, index + 1),
        })
    }

    /// Move the node out of its parent, right after the parent.
    pub fn outdent(&self, node_id: &str) -> Result<Self, TreeError> {
        let (_, _, parent_id) =
            locate(&self.nodes, node_id, None).ok_or_else(|| TreeError::NodeNotFound(node_id.to_string()))?;
        let parent_id = parent_id.ok_or_else(|| TreeError::AlreadyAtRoot(node_id.to_string()))?;

        let (_, parent_index, grandparent_id) = locate(&self.nodes, &parent_id, None)
            .ok_or_else(|| TreeError::NodeNotFound(parent_id.clone()))?;

        self.move_node(&MoveRequest {
            node_id: node_id.to_string(),
            target: drop_target(grandparent_id, parent_index + 1),
        })
    }

    /// Collections that `node_id` can be dropped into, in tree order.
    ///
    /// Leaves out the node itself, its descendants and its current parent.
    pub fn drop_choices(&self, node_id: &str) -> Vec<DropChoice> {
        let Some(source) = tree::find_node(&self.nodes, node_id) else {
            return Vec::new();
        };
        let mut choices = Vec::new();
        collect_choices(&self.nodes, source, 0, &mut choices);
        choices
    }
}

fn drop_target(parent_id: Option<ItemUid>, index: usize) -> DropTarget {
    match parent_id {
        Some(parent_id) => DropTarget::Into { parent_id, index },
        None => DropTarget::Root { index },
    }
}

/// Sibling list, position and parent id of the node with `id`.
fn locate<'a>(
    nodes: &'a [TreeNode],
    id: &str,
    parent_id: Option<&str>,
) -> Option<(&'a [TreeNode], usize, Option<ItemUid>)> {
    if let Some(index) = nodes.iter().position(|node| node.id() == id) {
        return Some((nodes, index, parent_id.map(str::to_string)));
    }
    nodes
        .iter()
        .find_map(|node| locate(node.children(), id, Some(node.id())))
}

fn detach(nodes: &mut Vec<TreeNode>, id: &str) -> Option<TreeNode> {
    if let Some(index) = nodes.iter().position(|node| node.id() == id) {
        return Some(nodes.remove(index));
    }
    nodes.iter_mut().find_map(|node| match node {
        TreeNode::Collection(collection) => detach(&mut collection.children, id),
        TreeNode::Document(_) => None,
    })
}

fn children_mut<'a>(nodes: &'a mut [TreeNode], id: &str) -> Option<&'a mut Vec<TreeNode>> {
    for node in nodes {
        if let TreeNode::Collection(collection) = node {
            if collection.id == id {
                return Some(&mut collection.children);
            }
            if let Some(children) = children_mut(&mut collection.children, id) {
                return Some(children);
            }
        }
    }
    None
}

fn reparent(node: &mut TreeNode, parent_id: Option<&str>) {
    match node {
        TreeNode::Collection(collection) => collection.parent_id = parent_id.map(str::to_string),
        TreeNode::Document(document) => {
            if let Some(parent_id) = parent_id {
                document.parent_id = parent_id.to_string();
            }
        }
    }
}

fn collect_choices(nodes: &[TreeNode], source: &TreeNode, depth: usize, choices: &mut Vec<DropChoice>) {
    for node in nodes {
        let TreeNode::Collection(collection) = node else {
            continue;
        };
        if source.is_collection() && collection.id == source.id() {
            continue;
        }
        if source.parent_id() != Some(collection.id.as_str()) {
            choices.push(DropChoice {
                id: collection.id.clone(),
                label: collection.label.clone(),
                depth,
            });
        }
        collect_choices(&collection.children, source, depth + 1, choices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::Document;

    fn sample() -> Vec<Collection> {
        vec![
            Collection::new("sales", "Sales", 0)
                .with_documents(vec![
                    Document::new("daily", "Daily", 0),
                    Document::new("weekly", "Weekly", 1),
                ])
                .with_collections(vec![Collection::new("archive", "Archive", 0)
                    .with_documents(vec![Document::new("old", "Old", 0)])]),
            Collection::new("custom", "Custom", 1),
            Collection::new("stock", "Stock", 2),
        ]
    }

    fn ids(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(TreeNode::id).collect()
    }

    #[test]
    fn reorders_root_collections() {
        let session = EditSession::new(&sample(), false);
        let moved = session
            .move_node(&MoveRequest {
                node_id: "stock".into(),
                target: DropTarget::Root { index: 0 },
            })
            .unwrap();

        assert_eq!(ids(moved.nodes()), vec!["stock", "sales", "custom"]);
        assert!(moved.is_dirty());
        assert!(!session.is_dirty());
        assert_eq!(ids(session.nodes()), vec!["sales", "custom", "stock"]);
    }

    #[test]
    fn reparents_document_and_updates_labels() {
        let session = EditSession::new(&sample(), true);
        let moved = session
            .move_node(&MoveRequest {
                node_id: "daily".into(),
                target: DropTarget::Into {
                    parent_id: "stock".into(),
                    index: 0,
                },
            })
            .unwrap();

        let stock = tree::find_node(moved.nodes(), "stock").unwrap();
        assert_eq!(stock.label(), "Stock (1 reports)");
        assert_eq!(ids(stock.children()), vec!["daily"]);
        assert_eq!(tree::find_node(moved.nodes(), "daily").unwrap().parent_id(), Some("stock"));
        assert_eq!(tree::find_node(moved.nodes(), "sales").unwrap().label(), "Sales (1 reports)");
        assert_eq!(moved.document_count(), session.document_count());
    }

    #[test]
    fn moving_into_custom_updates_recursive_label() {
        let session = EditSession::new(&sample(), true);
        let moved = session
            .move_node(&MoveRequest {
                node_id: "sales".into(),
                target: DropTarget::Into {
                    parent_id: "custom".into(),
                    index: 0,
                },
            })
            .unwrap();

        assert_eq!(moved.nodes()[0].label(), "Custom (1 collections / 3 docs)");
    }

    #[test]
    fn rejects_document_at_root() {
        let session = EditSession::new(&sample(), false);
        let err = session
            .move_node(&MoveRequest {
                node_id: "daily".into(),
                target: DropTarget::Root { index: 0 },
            })
            .unwrap_err();
        assert_eq!(err, TreeError::DocumentAtRoot("daily".into()));
    }

    #[test]
    fn rejects_drop_into_own_descendant() {
        let session = EditSession::new(&sample(), false);
        let err = session
            .move_node(&MoveRequest {
                node_id: "sales".into(),
                target: DropTarget::Into {
                    parent_id: "archive".into(),
                    index: 0,
                },
            })
            .unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));

        let err = session
            .move_node(&MoveRequest {
                node_id: "sales".into(),
                target: DropTarget::Into {
                    parent_id: "sales".into(),
                    index: 0,
                },
            })
            .unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));
    }

    #[test]
    fn rejects_drop_into_document_or_unknown() {
        let session = EditSession::new(&sample(), false);
        let err = session
            .move_node(&MoveRequest {
                node_id: "weekly".into(),
                target: DropTarget::Into {
                    parent_id: "daily".into(),
                    index: 0,
                },
            })
            .unwrap_err();
        assert_eq!(err, TreeError::NotACollection("daily".into()));

        let err = session
            .move_node(&MoveRequest {
                node_id: "ghost".into(),
                target: DropTarget::Root { index: 0 },
            })
            .unwrap_err();
        assert_eq!(err, TreeError::NodeNotFound("ghost".into()));
    }

    #[test]
    fn index_is_clamped() {
        let session = EditSession::new(&sample(), false);
        let moved = session
            .move_node(&MoveRequest {
                node_id: "sales".into(),
                target: DropTarget::Root { index: 99 },
            })
            .unwrap();
        assert_eq!(ids(moved.nodes()), vec!["custom", "stock", "sales"]);
    }

    #[test]
    fn move_up_and_down_stay_within_kind() {
        let session = EditSession::new(&sample(), false);

        let moved = session.move_up("weekly").unwrap();
        let sales = tree::find_node(moved.nodes(), "sales").unwrap();
        assert_eq!(ids(sales.children()), vec!["archive", "weekly", "daily"]);

        let unchanged = session.move_up("daily").unwrap();
        assert!(!unchanged.is_dirty());

        let moved = session.move_down("sales").unwrap();
        assert_eq!(ids(moved.nodes()), vec!["custom", "sales", "stock"]);

        let unchanged = session.move_down("stock").unwrap();
        assert!(!unchanged.is_dirty());
    }

    #[test]
    fn outdent_places_node_after_former_parent() {
        let session = EditSession::new(&sample(), false);

        let moved = session.outdent("archive").unwrap();
        assert_eq!(ids(moved.nodes()), vec!["sales", "archive", "custom", "stock"]);

        let err = session.outdent("sales").unwrap_err();
        assert_eq!(err, TreeError::AlreadyAtRoot("sales".into()));

        let err = session.outdent("daily").unwrap_err();
        assert_eq!(err, TreeError::DocumentAtRoot("daily".into()));
    }

    #[test]
    fn conversion_reflects_moves() {
        let session = EditSession::new(&sample(), false);
        let moved = session.move_down("sales").unwrap();

        let collections = moved.to_collections();
        let order: Vec<(&str, i64)> = collections
            .iter()
            .map(|c| (c.item_uid.as_str(), c.order))
            .collect();
        assert_eq!(order, vec![("custom", 0), ("sales", 1), ("stock", 2)]);
        assert_eq!(collections[1].collections[0].documents[0].item_uid, "old");
    }

    #[test]
    fn emptied_collection_still_sends_both_arrays() {
        let session = EditSession::new(
            &[
                Collection::new("a", "A", 0).with_documents(vec![Document::new("d", "D", 0)]),
                Collection::new("b", "B", 1),
            ],
            false,
        );
        let moved = session
            .move_node(&MoveRequest {
                node_id: "d".into(),
                target: DropTarget::Into {
                    parent_id: "b".into(),
                    index: 0,
                },
            })
            .unwrap();

        let payload = serde_json::to_value(moved.to_collections()).unwrap();
        assert_eq!(payload[0]["itemUID"], "a");
        assert_eq!(payload[0]["documents"], serde_json::json!([]));
        assert_eq!(payload[0]["collections"], serde_json::json!([]));
        assert_eq!(payload[1]["documents"][0]["itemUID"], "d");
        assert!(serde_json::to_string(&moved.to_collections()).unwrap().contains(r#""documents":[]"#));
    }

    #[test]
    fn drop_choices_skip_self_descendants_and_parent() {
        let session = EditSession::new(&sample(), false);

        let choices: Vec<String> = session.drop_choices("sales").into_iter().map(|c| c.id).collect();
        assert_eq!(choices, vec!["custom", "stock"]);

        let choices: Vec<String> = session.drop_choices("old").into_iter().map(|c| c.id).collect();
        assert_eq!(choices, vec!["sales", "custom", "stock"]);

        let choices = session.drop_choices("daily");
        assert_eq!(choices[0].id, "archive");
        assert_eq!(choices[0].depth, 1);
    }

    #[test]
    fn toggling_count_info_relabels() {
        let session = EditSession::new(&sample(), false);
        let counted = session.with_count_info(true);

        assert_eq!(counted.nodes()[0].label(), "Sales (2 reports)");
        assert_eq!(counted.with_count_info(false).nodes()[0].label(), "Sales");
    }
}
