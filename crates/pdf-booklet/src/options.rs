use crate::constants::{DEFAULT_SEPARATOR, OUTPUT_SUFFIX};
use crate::types::*;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which implementation performs the PDF manipulation steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Backend {
    /// pdftk, ImageMagick and pdfjam subprocesses
    #[default]
    External,
    /// In-process lopdf
    Native,
}

/// Booklet configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BookletOptions {
    // Input
    pub input: Option<PathBuf>,
    /// Page count used by page-order mode when there is no input document
    pub page_count: Option<usize>,

    // Output
    pub output: Option<PathBuf>,
    pub force: bool,
    pub paper_size: PaperSize,

    // Numbering
    pub start_page: i64,
    pub separator: String,

    // Execution
    pub keep_temp: bool,
    pub backend: Backend,
}

impl Default for BookletOptions {
    fn default() -> Self {
        Self {
            input: None,
            page_count: None,
            output: None,
            force: false,
            paper_size: PaperSize::A4,
            start_page: 1,
            separator: DEFAULT_SEPARATOR.to_string(),
            keep_temp: false,
            backend: Backend::External,
        }
    }
}

impl BookletOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| BookletError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BookletError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.start_page < 1 {
            return Err(BookletError::Input(format!(
                "Start page must be at least 1, got {}",
                self.start_page
            )));
        }

        Ok(())
    }

    /// The input document, required when producing a booklet
    pub fn require_input(&self) -> Result<&Path> {
        self.input.as_deref().ok_or_else(|| {
            BookletError::Input("the following arguments are required: input_pdf".to_string())
        })
    }

    /// Where the booklet is written.
    ///
    /// Defaults to the input file stem suffixed with `-booklet.pdf`, in the
    /// current directory.
    pub fn output_path(&self) -> Result<PathBuf> {
        if let Some(output) = &self.output {
            return Ok(output.clone());
        }

        let input = self.require_input()?;
        let stem = input
            .file_stem()
            .ok_or_else(|| BookletError::Input(format!("'{}' has no file name", input.display())))?;

        Ok(PathBuf::from(format!(
            "{}{}",
            stem.to_string_lossy(),
            OUTPUT_SUFFIX
        )))
    }
}
