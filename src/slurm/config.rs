use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use color_eyre::eyre::Context;
use color_eyre::Result;

/// Prefix of node definitions in `slurm.conf`
const NODE_NAME_PREFIX: &str = "NodeName=";

/// Lazily yields the node names defined by `NodeName=` lines in a Slurm configuration.
///
/// Only the first whitespace separated token of each line is read, and it is split on
/// commas. Hostlist ranges such as `node[01-04]` are not expanded, but yielded verbatim.
pub struct NodeNames<R> {
    lines: Lines<R>,
    pending: VecDeque<String>,
}

impl NodeNames<BufReader<File>> {
    /// Opens a `slurm.conf` file for reading node names
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).wrap_err_with(|| format!("failed to open {:?}", path))?;

        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> NodeNames<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending: VecDeque::new(),
        }
    }

    /// Returns the names listed on a single configuration line, if any
    fn parse_line(line: &str) -> Vec<String> {
        if !line.starts_with(NODE_NAME_PREFIX) {
            return Vec::new();
        }

        let nodelist = line
            .split_whitespace()
            .next()
            .and_then(|token| token.strip_prefix(NODE_NAME_PREFIX))
            .unwrap_or("");
        if nodelist.contains('[') {
            tracing::warn!("hostlist ranges are not expanded: {:?}", nodelist);
        }

        nodelist.split(',').map(String::from).collect()
    }
}

impl<R: BufRead> Iterator for NodeNames<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(name) = self.pending.pop_front() {
                return Some(Ok(name));
            }

            match self.lines.next()? {
                Ok(line) => self.pending.extend(Self::parse_line(&line)),
                Err(err) => return Some(Err(err).wrap_err("error while reading slurm.conf")),
            }
        }
    }
}

/// Returns an iterator over the node names listed in the `slurm.conf` file at `path`
pub fn node_list<P: AsRef<Path>>(path: P) -> Result<NodeNames<BufReader<File>>> {
    NodeNames::open(path)
}
