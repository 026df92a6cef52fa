use tracing::warn;

use super::{Collection, Document, ItemUid, ReportArena};

/// A node of the editable collection tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Collection(CollectionNode),
    Document(DocumentNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionNode {
    pub id: ItemUid,
    pub label: String,
    pub parent_id: Option<ItemUid>,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentNode {
    pub id: ItemUid,
    pub label: String,
    pub parent_id: ItemUid,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        match self {
            TreeNode::Collection(node) => &node.id,
            TreeNode::Document(node) => &node.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TreeNode::Collection(node) => &node.label,
            TreeNode::Document(node) => &node.label,
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        match self {
            TreeNode::Collection(node) => node.parent_id.as_deref(),
            TreeNode::Document(node) => Some(&node.parent_id),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, TreeNode::Collection(_))
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Collection(node) => &node.children,
            TreeNode::Document(_) => &[],
        }
    }
}

/// Build the editable tree from the nested server structure.
///
/// Siblings are sorted by `order` (stable on ties). Nested collections are
/// listed before the documents of the same collection.
pub fn build_tree_nodes(collections: &[Collection], count_info: bool) -> Vec<TreeNode> {
    build_level(collections, None, count_info)
}

fn build_level(collections: &[Collection], parent_id: Option<&str>, count_info: bool) -> Vec<TreeNode> {
    let mut sorted: Vec<&Collection> = collections.iter().collect();
    sorted.sort_by_key(|collection| collection.order);

    sorted
        .into_iter()
        .map(|collection| TreeNode::Collection(build_collection_node(collection, parent_id, count_info)))
        .collect()
}

fn build_collection_node(collection: &Collection, parent_id: Option<&str>, count_info: bool) -> CollectionNode {
    let mut children = build_level(&collection.collections, Some(&collection.item_uid), count_info);

    let mut documents: Vec<&Document> = collection.documents.iter().collect();
    documents.sort_by_key(|document| document.order);
    children.extend(documents.into_iter().map(|document| {
        TreeNode::Document(DocumentNode {
            id: document.item_uid.clone(),
            label: document.name.clone(),
            parent_id: collection.item_uid.clone(),
        })
    }));

    CollectionNode {
        id: collection.item_uid.clone(),
        label: collection_label(collection, count_info),
        parent_id: parent_id.map(str::to_string),
        children,
    }
}

fn collection_label(collection: &Collection, count_info: bool) -> String {
    if !count_info {
        return collection.name.clone();
    }

    if collection.is_custom() {
        format!(
            "{} ({} collections / {} docs)",
            collection.name,
            collection.collections.len(),
            recursive_document_count(collection)
        )
    } else {
        format!("{} ({} reports)", collection.name, collection.documents.len())
    }
}

/// Direct documents plus the documents of every nested collection.
pub fn recursive_document_count(collection: &Collection) -> usize {
    collection.documents.len()
        + collection
            .collections
            .iter()
            .map(recursive_document_count)
            .sum::<usize>()
}

/// Number of document leaves anywhere below `nodes`.
pub fn count_document_nodes(nodes: &[TreeNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            TreeNode::Document(_) => 1,
            TreeNode::Collection(collection) => count_document_nodes(&collection.children),
        })
        .sum()
}

pub fn find_node<'a>(nodes: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.id() == id {
            return Some(node);
        }
        if let Some(found) = find_node(node.children(), id) {
            return Some(found);
        }
    }
    None
}

/// Rebuild the nested structure from an edited tree.
///
/// Every sibling group gets fresh 0-based `order` values reflecting its
/// current position: nested collections are numbered among collections and
/// documents among documents, so a document's `order` does not count the
/// collections listed before it.
pub fn convert_tree_nodes_to_collections(
    nodes: &[TreeNode],
    arena: &ReportArena,
    parent: Option<&Collection>,
) -> Vec<Collection> {
    let mut collections = Vec::new();
    let mut position = 0;

    for node in nodes {
        match node {
            TreeNode::Collection(node) => {
                if let Some(collection) = rebuild_collection(node, position, arena) {
                    collections.push(collection);
                    position += 1;
                }
            }
            TreeNode::Document(node) => {
                // Top level is always collections; a stray document hands back
                // the parent unchanged.
                warn!(document = %node.id, "document node where a collection was expected");
                if let Some(parent) = parent {
                    collections.push(parent.clone());
                }
            }
        }
    }

    collections
}

fn rebuild_collection(node: &CollectionNode, order: usize, arena: &ReportArena) -> Option<Collection> {
    let Some(original) = arena.collection(&node.id) else {
        warn!(collection = %node.id, "collection missing from arena, dropping node");
        return None;
    };

    let mut collection = original.shallow();
    collection.order = order as i64;

    for child in &node.children {
        match child {
            TreeNode::Document(document_node) => match arena.document(&document_node.id) {
                Some(document) => {
                    let mut document = document.clone();
                    document.order = collection.documents.len() as i64;
                    collection.documents.push(document);
                }
                None => warn!(document = %document_node.id, "document missing from arena, dropping node"),
            },
            TreeNode::Collection(collection_node) => {
                let position = collection.collections.len();
                if let Some(nested) = rebuild_collection(collection_node, position, arena) {
                    collection.collections.push(nested);
                }
            }
        }
    }

    Some(collection)
}
