use std::io;

use color_eyre::Result;
use tracing::Level;

use slurmnodes::args::Args;
use slurmnodes::output::{delimiter, write_names, write_nodes};
use slurmnodes::slurm::{node_list, Sinfo, Slurm};

fn main() -> Result<()> {
    color_eyre::install()?;

    let args: Args = argh::from_env();
    if args.version {
        println!("slurmnodes v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if args.debug { Level::DEBUG } else { Level::INFO })
        .init();

    args.validate()?;

    let delimiter = delimiter(args.delimiter)?;

    // Nodes named on the command-line take precedence over slurm.conf
    let names: Box<dyn Iterator<Item = Result<String>>> = if args.nodes.is_empty() {
        Box::new(node_list(&args.slurm_conf)?)
    } else {
        Box::new(args.nodes.into_iter().map(Ok))
    };

    let stdout = io::stdout().lock();
    if args.names_only {
        return write_names(stdout, names);
    }

    let nodes = Slurm::collect(&Sinfo::new(args.sinfo), names, args.field_width)?;
    write_nodes(stdout, &nodes, delimiter)
}
