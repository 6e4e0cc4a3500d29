use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use crate::error::{Result, StudioError};

/// Hands a rendered document to whatever the host uses for print/export.
pub trait Printer {
    fn print(&mut self, title: &str, document: &str) -> Result<()>;
}

/// Writes the document to a fixed path.
#[derive(Debug, Clone)]
pub struct FilePrinter {
    output_path: PathBuf,
}

impl FilePrinter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }
}

impl Printer for FilePrinter {
    fn print(&mut self, title: &str, document: &str) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StudioError::ExportError(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        std::fs::write(&self.output_path, document).map_err(|e| {
            StudioError::ExportError(format!(
                "Failed to write {}: {}",
                self.output_path.display(),
                e
            ))
        })?;

        info!("Exported '{}' to {}", title, self.output_path.display());
        Ok(())
    }
}

/// Spools the document into `work_dir` and runs the host print command
/// (`lp` by default) on it.
#[derive(Debug, Clone)]
pub struct CommandPrinter {
    program: String,
    work_dir: PathBuf,
}

impl CommandPrinter {
    pub fn new(program: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
        }
    }
}

impl Printer for CommandPrinter {
    fn print(&mut self, title: &str, document: &str) -> Result<()> {
        std::fs::create_dir_all(&self.work_dir)
            .map_err(|e| StudioError::ExportError(format!("Failed to create work dir: {}", e)))?;

        let spool_path = self.work_dir.join(format!("{}.md", slug(title)));
        std::fs::write(&spool_path, document)
            .map_err(|e| StudioError::ExportError(format!("Failed to spool document: {}", e)))?;

        info!("Sending '{}' to {}", title, self.program);

        let output = Command::new(&self.program)
            .arg(&spool_path)
            .output()
            .map_err(|e| {
                StudioError::ExportError(format!("Failed to run {}: {}", self.program, e))
            })?;

        // spool file is only needed by the print command
        std::fs::remove_file(&spool_path).ok();

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(StudioError::ExportError(format!(
                "{} failed: {}",
                self.program, error
            )));
        }

        Ok(())
    }
}

fn slug(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "deck".to_string()
    } else {
        slug
    }
}
