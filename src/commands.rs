// One-shot management commands: listings, add-group, remove-system
//
// Each command makes its calls, prints its result on stdout and returns.

use crate::api::{Client, ListingKind, ResourceItem};
use anyhow::{bail, Context, Result};
use std::io::Write;

/// Print a listing: raw body with `json`, else one line per item
pub fn list<W: Write>(client: &Client, kind: ListingKind, json: bool, out: &mut W) -> Result<()> {
    if json {
        let body = client
            .list(kind)
            .with_context(|| format!("Failed to list {}", kind.endpoint()))?;
        writeln!(out, "{}", body)?;
    } else {
        let items = client
            .list_items(kind)
            .with_context(|| format!("Failed to list {}", kind.endpoint()))?;
        write_items(kind, &items, out)?;
    }
    out.flush()?;
    Ok(())
}

fn write_items<W: Write>(kind: ListingKind, items: &[ResourceItem], out: &mut W) -> Result<()> {
    for item in items {
        match (kind, &item.query) {
            (ListingKind::Searches, Some(query)) => writeln!(out, "{}: {}", item.name, query)?,
            _ => writeln!(out, "{}", item.name)?,
        }
    }
    Ok(())
}

/// Create a group unless one already resolves from `name`
pub fn add_group(client: &Client, name: &str, wildcard: Option<&str>) -> Result<()> {
    if client
        .show_group(name)
        .context("Failed to look up group")?
        .is_some()
    {
        tracing::info!("Group {:?} already exists", name);
        return Ok(());
    }

    client
        .create_group(name, wildcard)
        .with_context(|| format!("Failed to create group {:?}", name))?;
    tracing::info!("Created group {:?} (systems: {:?})", name, wildcard);
    Ok(())
}

/// Remove a system by name; a name that resolves to nothing is an error
pub fn remove_system(client: &Client, name: &str) -> Result<()> {
    if !client
        .remove_system(name)
        .with_context(|| format!("Failed to remove system {:?}", name))?
    {
        bail!("System {:?} not found", name);
    }
    tracing::info!("Removed system {:?}", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, query: Option<&str>) -> ResourceItem {
        ResourceItem {
            id: 1,
            name: name.to_string(),
            query: query.map(str::to_string),
        }
    }

    fn render(kind: ListingKind, items: &[ResourceItem]) -> String {
        let mut out = Vec::new();
        write_items(kind, items, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_names_one_per_line() {
        let items = [item("web-1", None), item("db-1", None)];
        assert_eq!(render(ListingKind::Systems, &items), "web-1\ndb-1\n");
    }

    #[test]
    fn test_searches_show_query() {
        let items = [item("errors", Some("status=500")), item("all", None)];
        assert_eq!(
            render(ListingKind::Searches, &items),
            "errors: status=500\nall\n"
        );
    }

    #[test]
    fn test_query_ignored_outside_searches() {
        let items = [item("web", Some("ignored"))];
        assert_eq!(render(ListingKind::Groups, &items), "web\n");
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(render(ListingKind::Groups, &[]), "");
    }
}
