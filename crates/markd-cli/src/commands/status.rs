//! Status command

use anyhow::Result;

use markd_core::{Config, RestStore, Session};

use crate::output::Output;

/// Show session status
pub fn show(session: &Session<RestStore>, config: &Config, output: &Output) -> Result<()> {
    let count = session.collection().len();

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "owner": session.owner(),
                "service_url": config.service_url,
                "feed_url": config.feed_url,
                "bookmarks": count,
            })
        );
    } else if output.is_quiet() {
        println!("{}", count);
    } else {
        println!("Owner:       {}", session.owner());
        println!(
            "Service:     {}",
            config.service_url.as_deref().unwrap_or("(not set)")
        );
        println!(
            "Feed:        {}",
            config.feed_url.as_deref().unwrap_or("(not set)")
        );
        println!("Bookmarks:   {}", count);
    }

    Ok(())
}
