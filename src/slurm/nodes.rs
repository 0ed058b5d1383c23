use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::process::Command;

use color_eyre::eyre::{bail, eyre, Context};
use color_eyre::Result;

use super::misc::{format_string, split_columns};

/// Fields requested from `sinfo`, in the order they appear in its output
pub const SINFO_FIELDS: [&str; 10] = [
    "nodelist",
    "statelong",
    "reason",
    "cpus",
    "socketcorethread",
    "memory",
    "features",
    "gres",
    "nodeaddr",
    "timestamp",
];

/// Default width of each column in the `sinfo` output
pub const DEFAULT_FIELD_WIDTH: usize = 40;

/// Produces raw status text for a set of nodes
pub trait StatusSource {
    /// Returns the unparsed output for `nodes` formatted according to `format`, which is a
    /// value for the `--Format` option of `sinfo`
    fn status(&self, nodes: &str, format: &str) -> Result<String>;
}

/// Queries node status by executing `sinfo`
#[derive(Clone, Debug)]
pub struct Sinfo {
    exe: String,
}

impl Sinfo {
    pub fn new<S: Into<String>>(exe: S) -> Self {
        Self { exe: exe.into() }
    }
}

impl StatusSource for Sinfo {
    fn status(&self, nodes: &str, format: &str) -> Result<String> {
        tracing::debug!("running {} --nodes {} --Format {}", self.exe, nodes, format);

        let output = Command::new(&self.exe)
            .args(["--nodes", nodes, "--Format", format, "--noheader"])
            .output()
            .wrap_err_with(|| format!("failed to execute {}", self.exe))?;

        // The output is used regardless of the exit status
        if !output.status.success() {
            tracing::warn!(
                "{} exited with {}: {}",
                self.exe,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        decode_output(&self.exe, output.stdout)
    }
}

/// Converts the standard output of `exe` into a string, failing on invalid UTF-8
fn decode_output(exe: &str, stdout: Vec<u8>) -> Result<String> {
    String::from_utf8(stdout).wrap_err_with(|| format!("{} produced invalid UTF-8", exe))
}

/// Flags appended to the state of a node by `sinfo`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeStateFlag {
    /// Node is not responding (`*`)
    NotResponding,
    /// Node is powered down by power saving (`~`)
    PowerSave,
    /// Node is being powered up (`#`)
    PoweringUp,
    /// Node is being powered down (`%`)
    PoweringDown,
    /// Node is in a maintenance reservation (`$`)
    MainReservation,
    /// Node is pending reboot (`@`)
    PendingReboot,
}

impl NodeStateFlag {
    pub const ALL: [NodeStateFlag; 6] = [
        NodeStateFlag::NotResponding,
        NodeStateFlag::PowerSave,
        NodeStateFlag::PoweringUp,
        NodeStateFlag::PoweringDown,
        NodeStateFlag::MainReservation,
        NodeStateFlag::PendingReboot,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.as_char() == c)
    }

    pub fn as_char(&self) -> char {
        match self {
            NodeStateFlag::NotResponding => '*',
            NodeStateFlag::PowerSave => '~',
            NodeStateFlag::PoweringUp => '#',
            NodeStateFlag::PoweringDown => '%',
            NodeStateFlag::MainReservation => '$',
            NodeStateFlag::PendingReboot => '@',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeStateFlag::NotResponding => "not_responding",
            NodeStateFlag::PowerSave => "power_save",
            NodeStateFlag::PoweringUp => "powering_up",
            NodeStateFlag::PoweringDown => "powering_down",
            NodeStateFlag::MainReservation => "main_reservation",
            NodeStateFlag::PendingReboot => "pending_reboot",
        }
    }
}

impl fmt::Display for NodeStateFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeState {
    /// Long state of the node, e.g. `idle` or `drained`
    pub state: String,
    /// Optional flag trailing the state
    pub flag: Option<NodeStateFlag>,
}

impl NodeState {
    /// Splits a trailing flag, if any, from the `statelong` field
    pub fn parse(value: &str) -> Self {
        let mut chars = value.chars();
        if let Some(flag) = chars.next_back().and_then(NodeStateFlag::from_char) {
            return NodeState {
                state: chars.as_str().to_string(),
                flag: Some(flag),
            };
        }

        NodeState {
            state: value.to_string(),
            flag: None,
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.flag {
            Some(flag) => write!(f, "{}{}", self.state, flag.as_char()),
            None => fmt::Display::fmt(&self.state, f),
        }
    }
}

/// Node features by name
pub type Features = BTreeMap<String, String>;

/// Parses a comma separated list of `key=value` pairs.
///
/// `sinfo` reports nodes without features as `(null)`; this, and the empty string, results
/// in an empty map. Any pair not containing exactly one `=` is an error.
pub fn parse_features(value: &str) -> Result<Features> {
    let mut features = Features::new();
    if value.is_empty() || value == "(null)" {
        return Ok(features);
    }

    for pair in value.split(',') {
        let mut values = pair.split('=');
        match (values.next(), values.next(), values.next()) {
            (Some(key), Some(v), None) => {
                features.insert(key.to_string(), v.to_string());
            }
            _ => bail!("invalid feature {:?} in {:?}; expected key=value", pair, value),
        }
    }

    Ok(features)
}

#[derive(Clone, Debug)]
pub struct Node {
    /// Name used when querying `sinfo`
    pub name: String,
    pub state: NodeState,
    pub features: Features,

    /// Raw values of all fields in `SINFO_FIELDS`
    fields: HashMap<String, String>,
}

impl Node {
    /// Queries `source` for the status of the node `name`
    pub fn from_name<S>(source: &S, name: &str, width: usize) -> Result<Node>
    where
        S: StatusSource + ?Sized,
    {
        let format = sinfo_format(width);
        let output = source
            .status(name, &format)
            .wrap_err_with(|| format!("querying status of node {:?}", name))?;

        if output.trim().is_empty() {
            tracing::warn!("no status reported for node {:?}", name);
        }

        Self::parse(name, &output, width).wrap_err_with(|| format!("parsing status of {:?}", name))
    }

    /// Parses the fixed-width output of `sinfo` for a single node
    fn parse(name: &str, output: &str, width: usize) -> Result<Node> {
        let fields = SINFO_FIELDS
            .iter()
            .map(|key| key.to_string())
            .zip(split_columns(output, width)?)
            .collect::<HashMap<_, _>>();

        let state = fields
            .get("statelong")
            .map(|value| NodeState::parse(value))
            .ok_or_else(|| eyre!("field `statelong` not found in sinfo output"))?;
        let features = fields
            .get("features")
            .ok_or_else(|| eyre!("field `features` not found in sinfo output"))
            .and_then(|value| parse_features(value).wrap_err("parsing FEATURES"))?;

        Ok(Node {
            name: name.to_string(),
            state,
            features,
            fields,
        })
    }

    /// Returns the raw value of one of the `SINFO_FIELDS`
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn nodelist(&self) -> &str {
        self.field("nodelist").unwrap_or_default()
    }

    pub fn reason(&self) -> &str {
        self.field("reason").unwrap_or_default()
    }

    pub fn cpus(&self) -> &str {
        self.field("cpus").unwrap_or_default()
    }

    /// Sockets, cores, and threads in the form `S:C:T`
    pub fn socket_core_thread(&self) -> &str {
        self.field("socketcorethread").unwrap_or_default()
    }

    pub fn memory(&self) -> &str {
        self.field("memory").unwrap_or_default()
    }

    pub fn gres(&self) -> &str {
        self.field("gres").unwrap_or_default()
    }

    pub fn address(&self) -> &str {
        self.field("nodeaddr").unwrap_or_default()
    }

    /// Time at which the reason was set
    pub fn timestamp(&self) -> &str {
        self.field("timestamp").unwrap_or_default()
    }
}

/// Generates parameter for the `--Format` command-line option for `sinfo`
fn sinfo_format(width: usize) -> String {
    format_string(SINFO_FIELDS.iter(), width)
}
