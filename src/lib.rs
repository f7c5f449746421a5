pub mod args;
pub mod dnslib;
pub mod errors;
pub mod input;
pub mod report;
pub mod structs;
pub mod utils;

use {
    crate::{
        args::{Args, Input},
        dnslib::DnsLookup,
        errors::{AuditError, InputError},
        report::{Format, Reporter},
        structs::Summary,
    },
    futures::{
        future,
        stream::{self, Stream, StreamExt},
    },
    log::{debug, info},
};

/// Audits every host of the stream, at most `workers` hosts at a time.
///
/// Results are handed to the reporter as each host completes, so output order
/// follows completion order rather than input order. Unreadable input entries
/// are reported and counted as failures.
pub async fn audit_hosts<S, R>(
    hosts: S,
    resolver: &R,
    workers: usize,
    reporter: &Reporter,
) -> Summary
where
    S: Stream<Item = Result<String, InputError>>,
    R: DnsLookup + ?Sized,
{
    hosts
        .map(|host| async move {
            let host = host?;
            debug!("Submitting job for {host}");
            Ok::<_, InputError>(dnslib::audit_host(resolver, host).await)
        })
        .buffer_unordered(workers.max(1))
        .fold(Summary::default(), |mut summary, result| {
            match result {
                Ok(report) => {
                    summary.record(&report);
                    reporter.host(&report);
                }
                Err(error) => {
                    summary.record_input_error();
                    reporter.input_error(&error);
                }
            }
            future::ready(summary)
        })
        .await
}

pub async fn run(args: &Args, source: Input) -> Result<Summary, AuditError> {
    let hosts = match source {
        Input::Stdin => input::stdin_hosts().boxed(),
        Input::Dnsrecon(path) => {
            let hosts = input::dnsrecon_hosts(&path).await?;
            stream::iter(hosts.into_iter().map(Ok)).boxed()
        }
    };

    let name_servers = match &args.resolvers {
        Some(path) => Some(utils::return_name_servers(path).await?),
        None => None,
    };
    let options = utils::return_resolver_opts();
    let resolver = dnslib::return_tokio_resolver(name_servers, options)?;

    let format = if args.json { Format::Json } else { Format::Text };
    let reporter = Reporter::stdout(args.log.as_deref(), format).await?;
    if let Some(path) = &args.log {
        info!("Logging to file {}", path.display());
    }

    let workers = usize::from(args.threads);
    info!("Using {workers} concurrent lookup(s).");

    let summary = audit_hosts(hosts, &resolver, workers, &reporter).await;
    reporter.summary(&summary);
    reporter.finish().await?;

    Ok(summary)
}
