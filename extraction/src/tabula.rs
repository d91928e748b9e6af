//! Entry point for running Tabula extractions.

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use crate::{
    config::TabulaConfig,
    error::{ExtractionError, Result},
    locate::{self, explicit_runtime},
    output::ExecutionOutput,
    platform::Platform,
    postprocess,
    render::render,
    request::{ExtractionRequest, OutputFormat, PageSelector},
    runner::{CommandExecutor, Invocation, SubprocessExecutor, check_archive},
};

/// Wrapper around the Tabula command line tool.
///
/// Each call builds its own invocation, so a single instance can be reused for any number of
/// extractions. The archive location and runtime search directories may be changed between calls.
/// It is `Send` and `Sync`, so extractions may run from several threads at once.
pub struct Tabula {
    config: TabulaConfig,
    platform: Platform,
    executor: Box<dyn CommandExecutor>,
}

impl Tabula {
    /// Creates a wrapper that runs Tabula as a child process.
    pub fn new(config: TabulaConfig) -> Self {
        let executor = SubprocessExecutor::new(config.timeout());
        Self::with_executor(config, executor)
    }

    pub fn with_executor<E>(config: TabulaConfig, executor: E) -> Self
    where
        E: CommandExecutor + 'static,
    {
        Self {
            config,
            platform: Platform::current(),
            executor: Box::new(executor),
        }
    }

    /// Overrides the platform used to choose JVM options.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn config(&self) -> &TabulaConfig {
        &self.config
    }

    pub fn jar_archive(&self) -> &Path {
        &self.config.jar_archive
    }

    pub fn set_jar_archive(&mut self, jar_archive: impl Into<PathBuf>) {
        self.config.jar_archive = jar_archive.into();
    }

    pub fn bin_dirs(&self) -> &[PathBuf] {
        &self.config.bin_dirs
    }

    pub fn set_bin_dirs<I, P>(&mut self, bin_dirs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.bin_dirs = bin_dirs.into_iter().map(Into::into).collect();
    }

    /// Validates `request` and assembles the full command line without running it.
    pub fn invocation(&self, request: &ExtractionRequest) -> Result<Invocation> {
        let command = render(request)?;
        let runtime = self.runtime()?;
        check_archive(&self.config.jar_archive)?;
        Ok(Invocation::new(
            &runtime,
            &self.config.jar_archive,
            &self.config.jvm_options(self.platform),
            &command,
        ))
    }

    /// Runs Tabula for `request`.
    pub fn extract(&self, request: &ExtractionRequest) -> Result<ExecutionOutput> {
        let invocation = self.invocation(request)?;
        self.executor.execute(&invocation)
    }

    /// Extracts tables from `input` on `pages`, writing them to `output` in `format`.
    pub fn convert_file(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        pages: impl Into<PageSelector>,
    ) -> Result<ExecutionOutput> {
        let request = ExtractionRequest::builder()
            .input_path(input)
            .output_path(output)
            .format(format)
            .pages(pages)
            .build();
        self.extract(&request)
    }

    /// Extracts tables from every PDF in `dir`. Tabula writes one output file beside each PDF.
    pub fn convert_batch(
        &self,
        dir: &Path,
        format: OutputFormat,
        pages: impl Into<PageSelector>,
    ) -> Result<ExecutionOutput> {
        let request = ExtractionRequest::builder()
            .batch_directory(dir)
            .format(format)
            .pages(pages)
            .build();
        self.extract(&request)
    }

    /// As [Tabula::convert_batch], then moves the written files into `output_dir`.
    pub fn convert_batch_into(
        &self,
        dir: &Path,
        output_dir: &Path,
        format: OutputFormat,
        pages: impl Into<PageSelector>,
    ) -> Result<Vec<PathBuf>> {
        if !output_dir.is_dir() {
            return Err(ExtractionError::OutputDirectoryNotFound {
                path: output_dir.to_path_buf(),
            });
        }
        self.convert_batch(dir, format, pages)?;
        postprocess::relocate_outputs(dir, output_dir, format)
    }

    /// Returns the version reported by the Tabula archive.
    pub fn version(&self) -> Result<String> {
        let runtime = self.runtime()?;
        check_archive(&self.config.jar_archive)?;

        let mut args = self.config.jvm_options(self.platform).to_args();
        args.push("-jar".into());
        args.push(self.config.jar_archive.as_os_str().to_os_string());
        args.push("--version".into());
        let invocation = Invocation {
            program: runtime,
            args,
            format: OutputFormat::default(),
            output_path: None,
        };

        let output = self.executor.execute(&invocation)?;
        Ok(output.stdout.trim().to_string())
    }

    fn runtime(&self) -> Result<PathBuf> {
        match &self.config.runtime {
            Some(runtime) => explicit_runtime(runtime),
            None => locate::locate(&self.config.runtime_binary, &self.config.bin_dirs),
        }
    }
}
