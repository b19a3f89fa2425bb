//! Contains logic for mapping between the flat event stream and the XDOM tree.

pub mod flat_to_nested;
pub mod nested_to_flat;

pub use flat_to_nested::{build_tree, MalformedStreamError, TreeBuilder};
pub use nested_to_flat::{flatten, flatten_into, node_into, node_to_events};
