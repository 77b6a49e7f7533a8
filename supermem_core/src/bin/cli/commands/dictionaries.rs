use anyhow::Result;

use supermem_core::Database;

use crate::OutputFormat;

pub fn run(db: &Database, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = db
                .dictionaries
                .iter()
                .map(|(path, dictionary)| {
                    serde_json::json!({
                        "path": path.to_string_lossy(),
                        "languageA": dictionary.language_a,
                        "languageB": dictionary.language_b,
                        "words": dictionary.len(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for (path, dictionary) in db.dictionaries.iter() {
                println!(
                    "{} <-> {} ({} words)  {}",
                    dictionary.language_a,
                    dictionary.language_b,
                    dictionary.len(),
                    path.display()
                );
            }
        }
    }

    Ok(())
}
