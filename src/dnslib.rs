use {
    crate::{
        errors::{AuditError, QueryError},
        structs::{AddressFamily, HostReport, Outcome, RecordKind, RecordOutcome, TargetAddresses},
    },
    async_trait::async_trait,
    hickory_resolver::{
        config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
        name_server::TokioConnectionProvider,
        proto::{
            rr::{Name, RData, RecordType},
            serialize::binary::BinDecodable,
        },
        ResolveError, TokioResolver,
    },
    log::{debug, warn},
    std::{collections::BTreeMap, future::Future, net::IpAddr, net::SocketAddr, time::Duration},
};

/// Time to wait for the first reply packet of a query.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);
/// Overall lifetime of a query, retries across name servers included.
pub const QUERY_DEADLINE: Duration = Duration::from_secs(5);

/// RFC 6672 type code. hickory has no dedicated variant for it.
const DNAME_CODE: u16 = 39;

/// The DNS queries an audit needs.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Names referenced by the `kind` records of `host`.
    async fn targets(&self, host: &str, kind: RecordKind) -> Result<Vec<String>, QueryError>;

    /// A or AAAA addresses of `host`.
    async fn addresses(
        &self,
        host: &str,
        family: AddressFamily,
    ) -> Result<Vec<IpAddr>, QueryError>;
}

pub fn return_tokio_resolver(
    nameserver_addrs: Option<Vec<SocketAddr>>,
    options: ResolverOpts,
) -> Result<TokioResolver, AuditError> {
    let builder = match nameserver_addrs {
        Some(addrs) => {
            let mut name_servers = NameServerConfigGroup::with_capacity(addrs.len() * 2);
            for addr in addrs {
                name_servers.extend(
                    NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true)
                        .iter()
                        .cloned(),
                );
            }
            TokioResolver::builder_with_config(
                ResolverConfig::from_parts(None, vec![], name_servers),
                TokioConnectionProvider::default(),
            )
        }
        None => TokioResolver::builder_tokio()?,
    };

    Ok(builder.with_options(options).build())
}

fn record_type(kind: RecordKind) -> RecordType {
    match kind {
        RecordKind::Cname => RecordType::CNAME,
        RecordKind::Mx => RecordType::MX,
        RecordKind::Srv => RecordType::SRV,
        RecordKind::Dname => RecordType::Unknown(DNAME_CODE),
    }
}

fn fqdn(host: &str) -> String {
    host.trim_end_matches('.').to_owned() + "."
}

fn classify(error: ResolveError) -> QueryError {
    if error.is_nx_domain() {
        QueryError::NxDomain
    } else if error.is_no_records_found() {
        QueryError::NoAnswer
    } else {
        QueryError::Resolve(error.to_string())
    }
}

/// Name a record points at: `exchange` for MX, `target` for the rest.
pub(crate) fn target_name(kind: RecordKind, rdata: &RData) -> Option<Name> {
    match (kind, rdata) {
        (RecordKind::Cname, RData::CNAME(cname)) => Some(cname.0.clone()),
        (RecordKind::Mx, RData::MX(mx)) => Some(mx.exchange().clone()),
        (RecordKind::Srv, RData::SRV(srv)) => Some(srv.target().clone()),
        (RecordKind::Dname, RData::Unknown { code, rdata })
            if *code == RecordType::Unknown(DNAME_CODE) =>
        {
            Name::from_bytes(rdata.anything()).ok()
        }
        _ => None,
    }
}

#[async_trait]
impl DnsLookup for TokioResolver {
    async fn targets(&self, host: &str, kind: RecordKind) -> Result<Vec<String>, QueryError> {
        let lookup = self
            .lookup(fqdn(host), record_type(kind))
            .await
            .map_err(classify)?;

        Ok(lookup
            .iter()
            .filter_map(|rdata| target_name(kind, rdata))
            // "." means "no service" for SRV and null MX
            .filter(|name| !name.is_root())
            .map(|name| name.to_utf8().trim_end_matches('.').to_owned())
            .collect())
    }

    async fn addresses(
        &self,
        host: &str,
        family: AddressFamily,
    ) -> Result<Vec<IpAddr>, QueryError> {
        let lookup = match family {
            AddressFamily::V4 => self.lookup(fqdn(host), RecordType::A).await,
            AddressFamily::V6 => self.lookup(fqdn(host), RecordType::AAAA).await,
        }
        .map_err(classify)?;

        Ok(lookup
            .iter()
            .filter_map(|rdata| match rdata {
                RData::A(a) => Some(IpAddr::V4(a.0)),
                RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
                _ => None,
            })
            .collect())
    }
}

async fn bounded<T>(query: impl Future<Output = Result<T, QueryError>>) -> Result<T, QueryError> {
    match tokio::time::timeout(QUERY_DEADLINE, query).await {
        Ok(result) => result,
        Err(_) => Err(QueryError::Timeout),
    }
}

/// Resolves the A and AAAA records of a target name.
///
/// A missing record type is not an error, the addresses of the other type are
/// still collected. NXDOMAIN on either query short-circuits to
/// [`TargetAddresses::NxDomain`].
pub async fn lookup_a_and_aaaa<R: DnsLookup + ?Sized>(
    resolver: &R,
    host: &str,
) -> TargetAddresses {
    let mut addresses = Vec::new();
    let mut failure = None;

    for family in [AddressFamily::V4, AddressFamily::V6] {
        match bounded(resolver.addresses(host, family)).await {
            Ok(found) => addresses.extend(found),
            Err(QueryError::NoAnswer) => debug!("No answer for {host} ({family})"),
            Err(QueryError::NxDomain) => {
                debug!("NXDOMAIN for {host} ({family})");
                return TargetAddresses::NxDomain;
            }
            Err(e) => {
                warn!("Lookup of {host} ({family}) failed: {e}");
                failure.get_or_insert_with(|| e.to_string());
            }
        }
    }

    match failure {
        Some(reason) => TargetAddresses::Unresolved(reason),
        None => TargetAddresses::Found(addresses),
    }
}

/// Resolves the `kind` records of `host` and checks the liveness of every target.
pub async fn lookup_names<R: DnsLookup + ?Sized>(
    resolver: &R,
    host: &str,
    kind: RecordKind,
) -> Outcome {
    let targets = match bounded(resolver.targets(host, kind)).await {
        Ok(targets) => targets,
        Err(QueryError::NoAnswer) => {
            debug!("No answer for {host} ({kind})");
            return Outcome::Empty;
        }
        Err(QueryError::NxDomain) => {
            debug!("NXDOMAIN for {host} ({kind})");
            return Outcome::NameNotFound;
        }
        Err(e) => {
            warn!("Lookup of {host} ({kind}) failed: {e}");
            return Outcome::Failed(e.to_string());
        }
    };

    let mut results = BTreeMap::new();
    for target in targets {
        if results.contains_key(&target) {
            continue;
        }
        if kind == RecordKind::Mx {
            debug!("MX {host} -> {target}");
        }
        let addresses = lookup_a_and_aaaa(resolver, &target).await;
        results.insert(target, addresses);
    }

    if results.is_empty() {
        Outcome::Empty
    } else {
        Outcome::Ok(results)
    }
}

/// Audits every interesting record kind of one host.
pub async fn audit_host<R: DnsLookup + ?Sized>(resolver: &R, host: String) -> HostReport {
    let mut records = Vec::with_capacity(RecordKind::ALL.len());
    for kind in RecordKind::ALL {
        let outcome = lookup_names(resolver, &host, kind).await;
        records.push(RecordOutcome {
            host: host.clone(),
            kind,
            outcome,
        });
    }
    HostReport { host, records }
}
