pub mod collection_tree;
pub mod column_select;
pub mod header;
pub mod style;
