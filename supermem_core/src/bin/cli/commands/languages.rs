use anyhow::Result;

use supermem_core::Database;

use crate::OutputFormat;

pub fn run(db: &Database, format: &OutputFormat) -> Result<()> {
    let languages = db.dictionaries.all_languages();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = languages
                .iter()
                .map(|language| {
                    serde_json::json!({
                        "language": language,
                        "pairedWith": db.dictionaries.languages_paired_with(language),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if languages.is_empty() {
                println!("(no dictionaries installed)");
            }
            for language in &languages {
                let paired = db.dictionaries.languages_paired_with(language);
                println!("{} -> {}", language, paired.join(", "));
            }
        }
    }

    Ok(())
}
