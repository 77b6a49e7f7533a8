use anyhow::Result;

use supermem_core::{Database, Diagnostics};

use crate::OutputFormat;

/// Report what was loaded and every record that had to be skipped or repaired.
pub fn run(db: &Database, diag: &Diagnostics, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "dictionaries": db.dictionaries.len(),
                "users": db.users.len(),
                "usersFile": db.users_file().to_string_lossy(),
                "diagnostics": diag.entries(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "{} dictionaries, {} users ({})",
                db.dictionaries.len(),
                db.users.len(),
                db.users_file().display()
            );
            if diag.is_empty() {
                println!("No problems found.");
            }
            for entry in diag.entries() {
                println!("{}: {}", entry.severity, entry.message);
            }
        }
    }

    Ok(())
}
