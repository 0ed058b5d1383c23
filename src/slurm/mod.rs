mod config;
mod misc;
mod nodes;

pub use config::{node_list, NodeNames};
pub use nodes::{
    parse_features, Features, Node, NodeState, NodeStateFlag, Sinfo, StatusSource,
    DEFAULT_FIELD_WIDTH, SINFO_FIELDS,
};

use color_eyre::Result;

pub struct Slurm {}

impl Slurm {
    /// Queries the status of each named node in turn, stopping at the first failure
    pub fn collect<S, I>(source: &S, names: I, width: usize) -> Result<Vec<Node>>
    where
        S: StatusSource + ?Sized,
        I: IntoIterator<Item = Result<String>>,
    {
        let mut nodes = Vec::new();
        for name in names {
            nodes.push(Node::from_name(source, &name?, width)?);
        }

        Ok(nodes)
    }
}
