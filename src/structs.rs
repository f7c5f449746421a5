use {
    serde::Serialize,
    std::{collections::BTreeMap, fmt, net::IpAddr},
};

/// Record types that reference another domain name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    Cname,
    Mx,
    Srv,
    Dname,
}

impl RecordKind {
    /// Every kind audited for a host, in reporting order.
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Cname,
        RecordKind::Mx,
        RecordKind::Srv,
        RecordKind::Dname,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Cname => "CNAME",
            RecordKind::Mx => "MX",
            RecordKind::Srv => "SRV",
            RecordKind::Dname => "DNAME",
        }
    }

    /// Case-insensitive parse of a record type label, `None` for uninteresting types.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => f.write_str("A"),
            AddressFamily::V6 => f.write_str("AAAA"),
        }
    }
}

/// Liveness of a single target name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum TargetAddresses {
    /// The target exists; the list may be empty when it has no address records.
    Found(Vec<IpAddr>),
    /// The target does not exist. This is the orphaned reference.
    NxDomain,
    /// The target lookup did not complete.
    Unresolved(String),
}

impl fmt::Display for TargetAddresses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetAddresses::Found(addrs) => {
                f.write_str("[")?;
                for (i, addr) in addrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{addr}")?;
                }
                f.write_str("]")
            }
            TargetAddresses::NxDomain => f.write_str("NXDOMAIN"),
            TargetAddresses::Unresolved(reason) => write!(f, "UNRESOLVED ({reason})"),
        }
    }
}

/// Result of resolving one (host, record kind) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "targets", rename_all = "snake_case")]
pub enum Outcome {
    Ok(BTreeMap<String, TargetAddresses>),
    Empty,
    NameNotFound,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    pub host: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl RecordOutcome {
    /// Targets of an OK record that no longer exist.
    pub fn hits(&self) -> impl Iterator<Item = &str> {
        let targets = match &self.outcome {
            Outcome::Ok(targets) => Some(targets),
            _ => None,
        };
        targets
            .into_iter()
            .flatten()
            .filter(|(_, addrs)| **addrs == TargetAddresses::NxDomain)
            .map(|(target, _)| target.as_str())
    }

    pub fn is_failure(&self) -> bool {
        match &self.outcome {
            Outcome::Failed(_) => true,
            Outcome::Ok(targets) => targets
                .values()
                .any(|addrs| matches!(addrs, TargetAddresses::Unresolved(_))),
            Outcome::Empty | Outcome::NameNotFound => false,
        }
    }

    /// Human readable report lines, the `Hit!` lines following the `OK` line.
    pub fn lines(&self) -> Vec<String> {
        let (host, kind) = (&self.host, self.kind);
        match &self.outcome {
            Outcome::Empty => vec![format!("+ NO entry found: {host} ({kind})")],
            Outcome::NameNotFound => vec![format!(
                "+ Possible ISSUE: Error resolving entry for {host} ({kind})"
            )],
            Outcome::Failed(reason) => {
                vec![format!("+ FAILED lookup for {host} ({kind}): {reason}")]
            }
            Outcome::Ok(targets) => {
                let mapping = targets
                    .iter()
                    .map(|(target, addrs)| format!("{target}: {addrs}"))
                    .collect::<Vec<String>>()
                    .join(", ");
                let hits = self
                    .hits()
                    .map(|target| format!("+ Hit! No answer for {host} -> {target} ({kind})"));
                std::iter::once(format!("+ OK {host} ({kind}) -> {{{mapping}}}"))
                    .chain(hits)
                    .collect()
            }
        }
    }
}

/// Everything learned about one host. One per worker task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostReport {
    pub host: String,
    pub records: Vec<RecordOutcome>,
}

impl HostReport {
    pub fn hits(&self) -> usize {
        self.records.iter().map(|record| record.hits().count()).sum()
    }

    pub fn issues(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.outcome == Outcome::NameNotFound)
            .count()
    }

    pub fn failures(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.is_failure())
            .count()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub hosts: usize,
    pub hits: usize,
    pub issues: usize,
    pub failures: usize,
}

impl Summary {
    pub fn record(&mut self, report: &HostReport) {
        self.hosts += 1;
        self.hits += report.hits();
        self.issues += report.issues();
        self.failures += report.failures();
    }

    /// An input entry that could not be read is work that did not complete.
    pub fn record_input_error(&mut self) {
        self.failures += 1;
    }

    pub fn line(&self) -> String {
        format!(
            "+ Audited {} host(s): {} hit(s), {} issue(s), {} failure(s)",
            self.hosts, self.hits, self.issues, self.failures
        )
    }
}
