use std::io::Write;

use color_eyre::eyre::{bail, Context};
use color_eyre::Result;
use serde::Serialize;

use crate::slurm::Node;

/// Header of the node table; must match the fields of `NodeRow`
const COLUMNS: [&str; 11] = [
    "name",
    "state",
    "flag",
    "reason",
    "cpus",
    "socketcorethread",
    "memory",
    "features",
    "gres",
    "nodeaddr",
    "timestamp",
];

/// A single row in the node table
#[derive(Debug, Serialize)]
struct NodeRow<'a> {
    name: &'a str,
    state: &'a str,
    flag: &'static str,
    reason: &'a str,
    cpus: &'a str,
    socketcorethread: &'a str,
    memory: &'a str,
    features: String,
    gres: &'a str,
    nodeaddr: &'a str,
    timestamp: &'a str,
}

impl<'a> From<&'a Node> for NodeRow<'a> {
    fn from(node: &'a Node) -> Self {
        NodeRow {
            name: &node.name,
            state: &node.state.state,
            flag: node.state.flag.map(|flag| flag.name()).unwrap_or_default(),
            reason: node.reason(),
            cpus: node.cpus(),
            socketcorethread: node.socket_core_thread(),
            memory: node.memory(),
            features: node
                .features
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join(","),
            gres: node.gres(),
            nodeaddr: node.address(),
            timestamp: node.timestamp(),
        }
    }
}

/// Converts a delimiter given on the command-line into a byte usable by `csv`
pub fn delimiter(value: char) -> Result<u8> {
    match u8::try_from(value) {
        Ok(byte) if byte.is_ascii() => Ok(byte),
        _ => bail!("delimiter must be an ASCII character, not {:?}", value),
    }
}

/// Writes a table of nodes, including a header, using the given delimiter
pub fn write_nodes<W: Write>(writer: W, nodes: &[Node], delimiter: u8) -> Result<()> {
    // The header is written explicitly, so that it is also present for empty tables
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(writer);

    writer
        .write_record(COLUMNS)
        .wrap_err("error while writing node table header")?;

    for node in nodes {
        writer
            .serialize(NodeRow::from(node))
            .wrap_err_with(|| format!("error while writing node {:?}", node.name))?;
    }

    writer.flush().wrap_err("error while writing node table")?;
    Ok(())
}

/// Writes one node name per line
pub fn write_names<W, I>(mut writer: W, names: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = Result<String>>,
{
    for name in names {
        writeln!(writer, "{}", name?).wrap_err("error while writing node names")?;
    }

    Ok(())
}
