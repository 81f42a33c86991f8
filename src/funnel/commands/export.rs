use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FunnelError, Result};
use crate::model::{Contact, Opportunity};
use crate::store::DataStore;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;

/// Exports every active contact and every deal as JSON entries in a
/// gzip-compressed tar archive written to the working directory.
pub fn run<S: DataStore>(store: &S) -> Result<CmdResult> {
    let contacts: Vec<Contact> = store
        .list_contacts()?
        .into_iter()
        .filter(|c| c.is_active)
        .collect();
    let opportunities = store.list_opportunities()?;

    if contacts.is_empty() && opportunities.is_empty() {
        let mut res = CmdResult::default();
        res.add_message(CmdMessage::info("Nothing to export."));
        return Ok(res);
    }

    let filename = archive_filename();
    let file = File::create(&filename).map_err(FunnelError::Io)?;
    write_archive(file, &contacts, &opportunities)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Exported to {}", filename)));
    Ok(result)
}

/// Side-channel behind the `"export"` bulk action: snapshots just the
/// targeted contacts. The collection itself is never transformed.
pub fn contacts_snapshot(contacts: &[Contact], mut result: CmdResult) -> Result<CmdResult> {
    if contacts.is_empty() {
        result.add_message(CmdMessage::info("Nothing to export."));
        return Ok(result);
    }

    let filename = archive_filename();
    let file = File::create(&filename).map_err(FunnelError::Io)?;
    write_archive(file, contacts, &[])?;

    result.add_message(CmdMessage::success(format!(
        "Exported {} contact(s) to {}",
        contacts.len(),
        filename
    )));
    Ok(result)
}

fn archive_filename() -> String {
    format!("funnel-{}.tar.gz", Utc::now().format("%Y-%m-%d_%H-%M-%S"))
}

fn write_archive<W: Write>(
    writer: W,
    contacts: &[Contact],
    opportunities: &[Opportunity],
) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for contact in contacts {
        let entry_name = format!(
            "funnel/contacts/{}-{}.json",
            sanitize_filename(&contact.full_name()),
            short_id(&contact.id)
        );
        append_json(&mut tar, &entry_name, contact)?;
    }

    for opp in opportunities {
        let entry_name = format!(
            "funnel/deals/{}-{}.json",
            sanitize_filename(&opp.name),
            short_id(&opp.id)
        );
        append_json(&mut tar, &entry_name, opp)?;
    }

    tar.finish().map_err(FunnelError::Io)?;
    Ok(())
}

fn append_json<W: Write, T: serde::Serialize>(
    tar: &mut tar::Builder<W>,
    entry_name: &str,
    record: &T,
) -> Result<()> {
    let content = serde_json::to_string_pretty(record).map_err(FunnelError::Serialization)?;

    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();

    tar.append_data(&mut header, entry_name, content.as_bytes())
        .map_err(FunnelError::Io)?;
    Ok(())
}

fn short_id(id: &str) -> &str {
    let end = id.len().min(8);
    &id[..end]
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_archive_produces_gzip() {
        let contacts = vec![Contact::new("Ada", "Lovelace")];
        let deals = vec![Opportunity::new("Acme", 1_000.0, 50)];

        let mut buf = Vec::new();
        write_archive(&mut buf, &contacts, &deals).unwrap();

        assert!(!buf.is_empty());
        // Gzip magic bytes.
        assert_eq!(buf[0], 0x1f);
        assert_eq!(buf[1], 0x8b);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_filename("Ada Lovelace"), "Ada Lovelace");
        assert_eq!(sanitize_filename("foo/bar"), "foo_bar");
        assert_eq!(sanitize_filename("acme & co."), "acme _ co_");
    }

    #[test]
    fn test_short_id_handles_short_input() {
        assert_eq!(short_id("abcdefghij"), "abcdefgh");
        assert_eq!(short_id("abc"), "abc");
    }
}
