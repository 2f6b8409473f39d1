//! Seed record writer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{LovrefError, Result};
use crate::extract::ExtractionSeed;
use crate::text::to_key;

/// Serialization format of seed files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = LovrefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(LovrefError::InvalidFormat(s.to_string())),
        }
    }
}

/// File stem for a seed: the ASCII key of the title, else of the document id.
///
/// # Examples
/// ```
/// use lovref::output::seed_file_stem;
/// use lovref::types::DocumentMeta;
///
/// let meta = DocumentMeta::new("2018:502").with_title("Databeskyttelsesloven");
/// assert_eq!(seed_file_stem(&meta), "databeskyttelsesloven");
/// assert_eq!(seed_file_stem(&DocumentMeta::new("2018:502")), "2018_502");
/// ```
#[must_use]
pub fn seed_file_stem(meta: &crate::types::DocumentMeta) -> String {
    let from_title = meta.title.as_deref().map(to_key).unwrap_or_default();
    if !from_title.is_empty() {
        return from_title;
    }
    let from_id = to_key(&meta.document_id);
    if from_id.is_empty() {
        "document".to_string()
    } else {
        from_id
    }
}

/// Render a seed record.
///
/// YAML output starts with a document marker and has no trailing whitespace.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn generate_seed(seed: &ExtractionSeed, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut content = serde_json::to_string_pretty(seed)?;
            content.push('\n');
            Ok(content)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(seed)?;
            let lines: Vec<&str> = yaml.lines().map(str::trim_end).collect();
            Ok(format!("---\n{}\n", lines.join("\n")))
        }
    }
}

/// Write a seed record to `<output_dir>/<stem>.<ext>`.
///
/// Writes to a temp file, syncs, then renames, so an existing seed is never
/// left half-written.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub fn save_seed(seed: &ExtractionSeed, format: OutputFormat, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let stem = seed_file_stem(&seed.document);
    let extension = format.extension();
    let output_file = output_dir.join(format!("{stem}.{extension}"));
    let temp_file = output_dir.join(format!(".{stem}.{extension}.tmp"));

    let content = generate_seed(seed, format)?;
    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    #[cfg(target_os = "windows")]
    if output_file.exists() {
        fs::remove_file(&output_file)?;
    }
    fs::rename(&temp_file, &output_file)?;

    tracing::debug!(path = %output_file.display(), "Wrote seed");
    Ok(output_file)
}
