//! Sources of hostnames to audit.

use {
    crate::{
        errors::{AuditError, InputError},
        structs::RecordKind,
    },
    futures::stream::{self, Stream},
    log::{debug, error, warn},
    std::path::Path,
    tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader},
};

/// Hostnames read line by line from standard input.
pub fn stdin_hosts() -> impl Stream<Item = Result<String, InputError>> + Send + 'static {
    read_hosts(BufReader::new(tokio::io::stdin()))
}

/// One hostname per line. Surrounding whitespace is trimmed and empty lines are skipped.
///
/// A line that is not valid UTF-8 is yielded as an error and reading goes on
/// with the next line. A read failure is yielded as an error and ends the stream.
pub fn read_hosts<R>(
    reader: R,
) -> impl Stream<Item = Result<String, InputError>> + Send + 'static
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    stream::unfold(Some((reader.split(b'\n'), 0)), |state| async move {
        let (mut segments, mut line) = state?;
        loop {
            line += 1;
            match segments.next_segment().await {
                Ok(Some(bytes)) => {
                    let Ok(text) = String::from_utf8(bytes) else {
                        warn!("Skipping input line {line}: not valid UTF-8");
                        return Some((Err(InputError::InvalidUtf8(line)), Some((segments, line))));
                    };
                    let host = text.trim();
                    if host.is_empty() {
                        debug!("Skipping empty input line {line}");
                        continue;
                    }
                    return Some((Ok(host.to_owned()), Some((segments, line))));
                }
                Ok(None) => return None,
                Err(e) => {
                    error!("Error reading hostnames: {e}");
                    let error = InputError::Read {
                        line: line - 1,
                        reason: e.to_string(),
                    };
                    return Some((Err(error), None));
                }
            }
        }
    })
}

/// The attribute of a dnsrecon `record` element holding the name to audit.
pub fn dnsrecon_attribute(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Mx => "exchange",
        RecordKind::Cname => "target",
        RecordKind::Srv | RecordKind::Dname => "name",
    }
}

/// Extracts the names of interesting records from a dnsrecon XML report.
pub fn extract_dnsrecon_hosts(xml: &str) -> Result<Vec<String>, roxmltree::Error> {
    let document = roxmltree::Document::parse(xml)?;

    Ok(document
        .root_element()
        .children()
        .filter(|node| node.has_tag_name("record"))
        .filter_map(|record| {
            let kind = RecordKind::from_label(record.attribute("type")?)?;
            let attribute = dnsrecon_attribute(kind);
            match record.attribute(attribute).map(str::trim) {
                Some(name) if !name.is_empty() => Some(name.to_owned()),
                _ => {
                    warn!("Skipping {kind} record without '{attribute}' attribute");
                    None
                }
            }
        })
        .collect())
}

pub async fn dnsrecon_hosts(path: &Path) -> Result<Vec<String>, AuditError> {
    let xml = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AuditError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    extract_dnsrecon_hosts(&xml).map_err(|source| AuditError::Xml {
        path: path.to_path_buf(),
        source,
    })
}
