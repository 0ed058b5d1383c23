use argh::FromArgs;
use color_eyre::eyre::bail;
use color_eyre::Result;

/// Lists the nodes defined in a Slurm configuration along with their status
#[derive(FromArgs, Debug)]
pub struct Args {
    /// location of the Slurm configuration file
    #[argh(option, default = "\"/etc/slurm/slurm.conf\".to_string()")]
    pub slurm_conf: String,

    /// location of `sinfo` executable
    #[argh(option, default = "\"sinfo\".to_string()")]
    pub sinfo: String,

    /// width of each column requested from `sinfo`; must match what `sinfo` produces
    #[argh(option, default = "crate::slurm::DEFAULT_FIELD_WIDTH")]
    pub field_width: usize,

    /// list node names without querying `sinfo`
    #[argh(switch)]
    pub names_only: bool,

    /// column delimiter used in the output table
    #[argh(option, default = "'|'")]
    pub delimiter: char,

    /// enable debug messages
    #[argh(switch, short = 'd')]
    pub debug: bool,

    /// print version information
    #[argh(switch, short = 'v')]
    pub version: bool,

    /// nodes to query instead of those listed in the configuration file
    #[argh(positional)]
    pub nodes: Vec<String>,
}

impl Args {
    /// Rejects argument combinations that cannot be used to query `sinfo`
    pub fn validate(&self) -> Result<()> {
        // The column width is not used when only listing names
        if !self.names_only && self.field_width == 0 {
            bail!("--field-width must be greater than zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["slurmnodes"], args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.slurm_conf, "/etc/slurm/slurm.conf");
        assert_eq!(args.sinfo, "sinfo");
        assert_eq!(args.field_width, 40);
        assert_eq!(args.delimiter, '|');
        assert!(!args.names_only);
        assert!(args.nodes.is_empty());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_zero_field_width() {
        assert!(parse(&["--field-width", "0"]).validate().is_err());
        assert!(parse(&["--field-width", "0", "node01"]).validate().is_err());
    }

    #[test]
    fn test_zero_field_width_names_only() {
        assert!(parse(&["--field-width", "0", "--names-only"])
            .validate()
            .is_ok());
    }
}
