mod arena;
mod handle;
mod node;
mod raw_tree;
mod size;

pub(crate) use arena::{Arena, Generation};
pub(crate) use handle::Handle;
pub(crate) use raw_tree::RawTree;
