//! Bookmark command handlers

use anyhow::{bail, Result};

use markd_core::{BookmarkId, RestStore, Session};

use crate::metadata::fetch_title;
use crate::output::Output;
use crate::prompt::confirm;

/// List saved bookmarks
pub fn list(session: &Session<RestStore>, output: &Output) -> Result<()> {
    output.print_bookmarks(&session.collection());
    Ok(())
}

/// Save a new bookmark
pub async fn add(
    session: &Session<RestStore>,
    url: String,
    title: Option<String>,
    output: &Output,
) -> Result<()> {
    // Fetch the page title when none was given; an empty title falls back
    // to the hostname during validation
    let title = match title {
        Some(title) => title,
        None => fetch_title(&url).await.unwrap_or_default(),
    };

    let record = session.submit_add(&url, &title).await?;

    output.success(&format!("Saved bookmark: {}", record.id));
    output.print_bookmark(&record);

    Ok(())
}

/// Delete a bookmark
pub async fn delete(session: &Session<RestStore>, id: String, output: &Output) -> Result<()> {
    let id = BookmarkId::parse(&id);

    let Some(record) = session.collection().into_iter().find(|b| b.id == id) else {
        bail!("Bookmark not found: {}", id);
    };

    // Confirm deletion
    if output.should_prompt() {
        println!("Delete bookmark: {} - {}", record.id, record.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    session.submit_delete(&id).await?;

    output.success(&format!("Deleted bookmark: {}", id));

    Ok(())
}
