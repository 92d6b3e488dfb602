//! Interactive prompts

use anyhow::Result;
use std::io::{self, Write};

/// Ask a yes/no question, defaulting to no
pub fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(
        input.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}
