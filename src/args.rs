use {clap::Parser, std::path::PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Find orphaned CNAMEs and other records",
    long_about = None
)]
pub struct Args {
    #[arg(
        long,
        conflicts_with = "dnsrecon",
        help = "Read hostnames from STDIN line by line."
    )]
    pub stdin: bool,

    #[arg(
        long,
        value_name = "FILE",
        help = "Process XML files generated by 'dnsrecon'."
    )]
    pub dnsrecon: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "N",
        default_value_t = 50,
        value_parser = clap::value_parser!(u16).range(1..),
        help = "Number of concurrent DNS lookups. Default: 50"
    )]
    pub threads: u16,

    #[arg(long, value_name = "FILE", help = "Write results to this log file.")]
    pub log: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "File with DNS ips. Uses the system resolver configuration when omitted."
    )]
    pub resolvers: Option<PathBuf>,

    #[arg(long, help = "Print one JSON object per lookup instead of text lines.")]
    pub json: bool,
}

impl Args {
    /// Where the hostnames come from, or `None` when no input mode was chosen.
    pub fn input(&self) -> Option<Input> {
        match (&self.dnsrecon, self.stdin) {
            (Some(path), _) => Some(Input::Dnsrecon(path.clone())),
            (None, true) => Some(Input::Stdin),
            (None, false) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    Dnsrecon(PathBuf),
}
