/// Command-line arguments
pub mod args;
/// Rendering of node tables
pub mod output;
/// Querying of Slurm state
pub mod slurm;
