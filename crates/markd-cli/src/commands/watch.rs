//! Live view of the collection
//!
//! Subscribes to the realtime feed and reprints the collection each time
//! it changes, until interrupted. The subscription is released on every
//! exit path, including ctrl-c.

use anyhow::{Context, Result};

use markd_core::{Config, RealtimeClient, RestStore, Session};

use crate::output::Output;

/// Follow the owner's collection until interrupted
pub async fn run(session: &Session<RestStore>, config: &Config, output: &Output) -> Result<()> {
    let feed_url = config.feed_url.as_deref().context(
        "Realtime feed not configured. Set it with: markd config set feed_url wss://...",
    )?;

    let client = RealtimeClient::new(feed_url);
    let handle = client
        .subscribe(session.owner())
        .await
        .context("Failed to subscribe to realtime feed")?;
    let listener = session.attach_feed(handle);

    let mut changes = session.subscribe_changes();

    output.message(&format!(
        "Watching bookmarks for {} (ctrl-c to stop)",
        session.owner()
    ));
    output.print_bookmarks(&session.collection());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                output.message("");
                output.print_bookmarks(&session.collection());
            }
        }
    }

    listener.detach().await;
    Ok(())
}
