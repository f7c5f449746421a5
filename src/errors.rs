use {std::path::PathBuf, thiserror::Error};

/// Failure of a single DNS query, classified the way the audit cares about.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The name exists but has no record of the requested type.
    #[error("no answer")]
    NoAnswer,

    /// The queried name does not exist.
    #[error("NXDOMAIN")]
    NxDomain,

    #[error("timed out")]
    Timeout,

    #[error("{0}")]
    Resolve(String),
}

/// A hostname that could not be read from the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("input line {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    #[error("unable to read input after line {line}: {reason}")]
    Read { line: usize, reason: String },
}

/// Errors that stop the audit before any lookup runs.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dnsrecon report {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("error adding {0} to the list of resolvers, only IP addresses are allowed")]
    InvalidNameServer(String),

    #[error("no usable name servers in {0}")]
    NoNameServers(PathBuf),

    #[error("DNS resolver initialization error: {0}")]
    Resolver(#[from] hickory_resolver::ResolveError),

    #[error("unable to write report output: {0}")]
    Output(#[from] std::io::Error),
}
