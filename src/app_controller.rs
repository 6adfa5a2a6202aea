use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::minifiers::{BuiltinCssMinifier, BuiltinJsMinifier, CssMinifier, JsMinifier};
use crate::template::TemplateMinifier;

// @module: Application controller for template minification

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The minified document was written
    Minified,
    /// The original bytes were written because minification was not possible
    Copied { reason: String },
    /// Nothing could be written
    Failed { reason: String },
}

/// Per-file result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: FileOutcome,
}

/// Result of a whole run, sorted by input path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn minified_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Minified))
    }

    pub fn copied_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Copied { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Failed { .. }))
    }

    /// Report entry for an input path, if it was processed
    pub fn get<P: AsRef<Path>>(&self, input: P) -> Option<&FileReport> {
        self.files.iter().find(|report| report.input == input.as_ref())
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|report| predicate(&report.outcome)).count()
    }
}

/// Main application controller for template minification
pub struct Controller<J = BuiltinJsMinifier, C = BuiltinCssMinifier> {
    // @field: App configuration
    config: Arc<Config>,
    // @field: Shared document pipeline
    minifier: Arc<TemplateMinifier<J, C>>,
}

impl Controller {
    // @method: Create a new controller with the built-in minifiers
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let minifier = TemplateMinifier::new(config.css.clone());
        Self::with_minifier(config, minifier)
    }
}

impl<J, C> Controller<J, C>
where
    J: JsMinifier,
    C: CssMinifier,
{
    // @method: Create a controller around a custom pipeline
    pub fn with_minifier(config: Config, minifier: TemplateMinifier<J, C>) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            minifier: Arc::new(minifier),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Minify a file or every file below a directory into the output tree
    pub async fn run<P: AsRef<Path>>(&self, input: P) -> Result<RunReport, AppError> {
        let input = input.as_ref().to_path_buf();
        let start_time = Instant::now();

        if !FileManager::file_exists(&input) && !FileManager::dir_exists(&input) {
            warn!("{:?} does not exist", input);
            return Err(AppError::PathNotFound(input));
        }

        let files = self.collect_files(&input).await?;
        info!("Minifying {} file(s) from {:?} into {:?}", files.len(), input, self.config.output_dir);

        let mut reports = stream::iter(files)
            .map(|file| self.minify_file(file))
            .buffer_unordered(self.config.concurrency)
            .collect::<Vec<_>>()
            .await;
        reports.sort_by(|a, b| a.input.cmp(&b.input));

        let report = RunReport { files: reports };
        info!(
            "Done in {:.2}s: {} minified, {} copied, {} failed",
            start_time.elapsed().as_secs_f64(),
            report.minified_count(),
            report.copied_count(),
            report.failed_count()
        );

        Ok(report)
    }

    /// Minify one file into its mirrored output path.
    ///
    /// Falls back to copying the original bytes when the document cannot be
    /// minified, so every readable input gets an output file.
    pub async fn minify_file(&self, input: PathBuf) -> FileReport {
        let output = FileManager::mirrored_output_path(&self.config.output_dir, &input);

        let source = match FileManager::read_bytes(&input).await {
            Ok(source) => source,
            Err(e) => {
                error!("[file] {:?} could not be read: {:#}", input, e);
                return FileReport {
                    input,
                    output,
                    outcome: FileOutcome::Failed { reason: format!("{:#}", e) },
                };
            }
        };

        let (content, outcome) = match std::str::from_utf8(&source) {
            Ok(text) => match self.minifier.minify_document(text) {
                Ok(minified) => (minified.into_bytes(), FileOutcome::Minified),
                Err(e) => {
                    warn!("[file] {:?} minification failed, copying source: {}", input, e);
                    (source.clone(), FileOutcome::Copied { reason: e.to_string() })
                }
            },
            Err(e) => {
                debug!("[file] {:?} is not UTF-8 text, copying source: {}", input, e);
                (source.clone(), FileOutcome::Copied { reason: e.to_string() })
            }
        };

        if let Err(e) = FileManager::write_bytes(&output, &content).await {
            error!("[file] {:?} could not be written: {:#}", output, e);
            return FileReport {
                input,
                output,
                outcome: FileOutcome::Failed { reason: format!("{:#}", e) },
            };
        }

        FileReport { input, output, outcome }
    }

    async fn collect_files(&self, input: &Path) -> Result<Vec<PathBuf>, AppError> {
        let root = input.to_path_buf();
        let config = Arc::clone(&self.config);

        let files = tokio::task::spawn_blocking(move || {
            FileManager::collect_files(
                &root,
                |name| config.is_excluded(name),
                Some(&config.output_dir),
            )
        })
        .await
        .map_err(|e| AppError::Unknown(format!("Directory walk panicked: {}", e)))??;

        Ok(files)
    }
}
