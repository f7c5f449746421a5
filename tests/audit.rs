use {
    async_trait::async_trait,
    futures::stream,
    orphaned_dns::{
        audit_hosts,
        dnslib::DnsLookup,
        errors::{InputError, QueryError},
        input::read_hosts,
        report::{Format, Reporter},
        structs::{AddressFamily, RecordKind, Summary},
    },
    std::{
        collections::{HashMap, HashSet},
        net::IpAddr,
        path::Path,
    },
    tokio::fs::File,
};

/// A tiny in-memory DNS view.
#[derive(Default)]
struct Zone {
    records: HashMap<(&'static str, RecordKind), Vec<&'static str>>,
    addresses: HashMap<&'static str, Vec<IpAddr>>,
    nxdomain: HashSet<&'static str>,
    hanging: HashSet<&'static str>,
}

#[async_trait]
impl DnsLookup for Zone {
    async fn targets(&self, host: &str, kind: RecordKind) -> Result<Vec<String>, QueryError> {
        if self.hanging.contains(host) {
            std::future::pending::<()>().await;
        }
        if self.nxdomain.contains(host) {
            return Err(QueryError::NxDomain);
        }
        self.records
            .iter()
            .find(|((name, k), _)| *name == host && *k == kind)
            .map(|(_, targets)| targets.iter().map(|t| (*t).to_owned()).collect())
            .ok_or(QueryError::NoAnswer)
    }

    async fn addresses(
        &self,
        host: &str,
        family: AddressFamily,
    ) -> Result<Vec<IpAddr>, QueryError> {
        if self.nxdomain.contains(host) {
            return Err(QueryError::NxDomain);
        }
        let found: Vec<IpAddr> = self
            .addresses
            .get(host)
            .into_iter()
            .flatten()
            .filter(|ip| (family == AddressFamily::V4) == ip.is_ipv4())
            .copied()
            .collect();
        if found.is_empty() {
            Err(QueryError::NoAnswer)
        } else {
            Ok(found)
        }
    }
}

fn zone() -> Zone {
    let mut zone = Zone::default();
    zone.records.insert(
        ("orphan.example", RecordKind::Cname),
        vec!["dead-target.example"],
    );
    zone.nxdomain.insert("dead-target.example");
    zone.records.insert(
        ("healthy.example", RecordKind::Cname),
        vec!["alive.example"],
    );
    zone.addresses.insert(
        "alive.example",
        vec!["198.51.100.7".parse().unwrap()],
    );
    zone.nxdomain.insert("deregistered.example");
    zone.hanging.insert("slow.example");
    zone
}

async fn audit(hosts: &[&str], zone: &Zone, log: &Path) -> (Summary, Vec<String>) {
    let file = File::create(log).await.unwrap();
    let reporter = Reporter::spawn(vec![Box::new(file)], Format::Text);
    let hosts: Vec<Result<String, InputError>> =
        hosts.iter().map(|host| Ok((*host).to_owned())).collect();
    let hosts = stream::iter(hosts);

    let summary = audit_hosts(hosts, zone, 4, &reporter).await;
    reporter.finish().await.unwrap();

    let lines = tokio::fs::read_to_string(log)
        .await
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect();
    (summary, lines)
}

fn count(lines: &[String], needle: &str) -> usize {
    lines.iter().filter(|line| line.contains(needle)).count()
}

#[tokio::test]
async fn orphaned_cname_is_a_hit() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log");
    let (summary, lines) = audit(&["orphan.example"], &zone(), &log).await;

    assert!(lines.contains(
        &"+ OK orphan.example (CNAME) -> {dead-target.example: NXDOMAIN}".to_owned()
    ));
    assert!(lines.contains(
        &"+ Hit! No answer for orphan.example -> dead-target.example (CNAME)".to_owned()
    ));
    assert_eq!(summary.hits, 1);
    assert_eq!(summary.failures, 0);
}

#[tokio::test]
async fn healthy_cname_has_no_hit() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log");
    let (summary, lines) = audit(&["healthy.example"], &zone(), &log).await;

    assert!(lines.contains(
        &"+ OK healthy.example (CNAME) -> {alive.example: [198.51.100.7]}".to_owned()
    ));
    assert_eq!(count(&lines, "Hit!"), 0);
    assert_eq!(summary.hits, 0);
}

#[tokio::test]
async fn host_without_references_yields_four_empty_lines() {
    let dir = tempfile::tempdir().unwrap();
    let (_, lines) = audit(&["plain.example"], &zone(), &dir.path().join("log")).await;

    assert_eq!(
        lines,
        vec![
            "+ NO entry found: plain.example (CNAME)",
            "+ NO entry found: plain.example (MX)",
            "+ NO entry found: plain.example (SRV)",
            "+ NO entry found: plain.example (DNAME)",
        ]
    );
}

#[tokio::test]
async fn missing_host_is_an_issue_per_type() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log");
    let (summary, lines) = audit(&["deregistered.example"], &zone(), &log).await;

    assert_eq!(
        count(
            &lines,
            "+ Possible ISSUE: Error resolving entry for deregistered.example"
        ),
        4
    );
    assert_eq!(count(&lines, "OK"), 0);
    assert_eq!(summary.issues, 4);
}

#[tokio::test(start_paused = true)]
async fn slow_host_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let (summary, lines) = audit(
        &["slow.example", "orphan.example", "healthy.example"],
        &zone(),
        &dir.path().join("log"),
    )
    .await;

    assert_eq!(summary.hosts, 3);
    assert_eq!(summary.failures, 4);
    assert_eq!(summary.hits, 1);
    assert_eq!(count(&lines, "+ FAILED lookup for slow.example"), 4);
    assert_eq!(count(&lines, "Hit!"), 1);
}

#[tokio::test]
async fn repeated_runs_classify_alike() {
    let dir = tempfile::tempdir().unwrap();
    let hosts = [
        "orphan.example",
        "healthy.example",
        "plain.example",
        "deregistered.example",
    ];

    let (first, mut first_lines) = audit(&hosts, &zone(), &dir.path().join("first")).await;
    let (second, mut second_lines) = audit(&hosts, &zone(), &dir.path().join("second")).await;

    first_lines.sort();
    second_lines.sort();
    assert_eq!(first, second);
    assert_eq!(first_lines, second_lines);
}

#[tokio::test]
async fn stdin_style_input_skips_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log");
    let file = File::create(&log).await.unwrap();
    let reporter = Reporter::spawn(vec![Box::new(file)], Format::Text);

    let hosts = read_hosts(&b"orphan.example\n\nhealthy.example\n"[..]);
    let summary = audit_hosts(hosts, &zone(), 50, &reporter).await;
    reporter.finish().await.unwrap();

    assert_eq!(summary.hosts, 2);
}

#[tokio::test]
async fn unreadable_line_is_a_failure_and_later_hosts_still_run() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log");
    let file = File::create(&log).await.unwrap();
    let reporter = Reporter::spawn(vec![Box::new(file)], Format::Text);

    let hosts = read_hosts(&b"plain.example\nb\xffad.example\norphan.example\n"[..]);
    let summary = audit_hosts(hosts, &zone(), 1, &reporter).await;
    reporter.finish().await.unwrap();

    let lines: Vec<String> = tokio::fs::read_to_string(&log)
        .await
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect();
    assert_eq!(summary.hosts, 2);
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.hits, 1);
    assert_eq!(
        count(
            &lines,
            "+ FAILED reading input: input line 2 is not valid UTF-8"
        ),
        1
    );
}
