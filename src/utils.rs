use {
    crate::{dnslib::QUERY_TIMEOUT, errors::AuditError},
    hickory_resolver::config::{ResolverOpts, ServerOrderingStrategy},
    std::{
        collections::HashSet,
        net::{IpAddr, SocketAddr},
        path::Path,
    },
    tokio::{fs::File, io::AsyncReadExt},
};

pub async fn return_file_lines(file: &Path) -> Result<Vec<String>, AuditError> {
    let io_error = |source| AuditError::Io {
        path: file.to_path_buf(),
        source,
    };

    let mut f = File::open(file).await.map_err(io_error)?;
    let mut buffer = String::new();
    f.read_to_string(&mut buffer).await.map_err(io_error)?;

    Ok(buffer
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect())
}

/// Parses a name server entry, either `ip` or `ip:port`.
pub fn parse_name_server(entry: &str) -> Result<SocketAddr, AuditError> {
    entry
        .parse::<SocketAddr>()
        .or_else(|_| entry.parse::<IpAddr>().map(|ip| SocketAddr::new(ip, 53)))
        .map_err(|_| AuditError::InvalidNameServer(entry.to_owned()))
}

pub async fn return_name_servers(file: &Path) -> Result<Vec<SocketAddr>, AuditError> {
    let mut seen = HashSet::new();
    let mut name_servers = Vec::new();
    for line in return_file_lines(file).await? {
        let addr = parse_name_server(&line)?;
        if seen.insert(addr) {
            name_servers.push(addr);
        }
    }

    if name_servers.is_empty() {
        return Err(AuditError::NoNameServers(file.to_path_buf()));
    }
    Ok(name_servers)
}

pub fn return_resolver_opts() -> ResolverOpts {
    let mut options = ResolverOpts::default();
    options.timeout = QUERY_TIMEOUT;
    options.attempts = 2;
    options.ndots = 0;
    options.server_ordering_strategy = ServerOrderingStrategy::RoundRobin;
    options
}
