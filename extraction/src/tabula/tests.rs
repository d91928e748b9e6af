use std::path::PathBuf;

use anyhow::Result;
use googletest::prelude::*;
use testutils::Fixtures;

use super::Tabula;
use crate::{
    config::TabulaConfig,
    error::ErrorKind,
    output::ExecutionOutput,
    platform::Platform,
    request::{ExtractionRequest, OutputFormat},
    runner::{Invocation, MockCommandExecutor},
};

/// Fixtures plus a placeholder runtime binary named explicitly in the configuration.
fn config_for(fixtures: &Fixtures) -> Result<TabulaConfig> {
    let runtime = fixtures.path().join("java");
    std::fs::write(&runtime, "")?;
    Ok(TabulaConfig {
        jar_archive: fixtures.jar.clone(),
        runtime: Some(runtime),
        ..Default::default()
    })
}

fn lossy(invocation: &Invocation) -> Vec<String> {
    invocation.args_lossy()
}

fn assert_send_sync<T: Send + Sync>() {}

#[gtest]
fn test_tabula_can_be_shared_across_threads() -> Result<()> {
    assert_send_sync::<Tabula>();

    let fixtures = Fixtures::new()?;
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .times(2)
        .returning(|_| Ok(ExecutionOutput::default()));
    let tabula = Tabula::with_executor(config_for(&fixtures)?, executor);
    let request = ExtractionRequest::builder()
        .input_path(&fixtures.pdf)
        .build();

    let (tabula, request) = (&tabula, &request);
    let results = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(move |_| scope.spawn(move || tabula.extract(request).map_err(|e| e.kind())))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>()
    });

    expect_that!(results.len(), eq(2));
    let results = results
        .into_iter()
        .map(|joined| joined.map_err(|_| anyhow::anyhow!("extraction thread panicked")))
        .collect::<Result<Vec<_>>>()?;
    expect_that!(results, each(ok(anything())));
    Ok(())
}

#[gtest]
#[test_log::test]
fn test_extract_runs_assembled_invocation() -> Result<()> {
    let fixtures = Fixtures::new()?;
    let config = config_for(&fixtures)?;
    let expected_program = config.runtime.clone();
    let jar = fixtures.jar.to_string_lossy().into_owned();
    let pdf = fixtures.pdf.to_string_lossy().into_owned();

    // GIVEN: an executor expecting exactly one fully assembled invocation.
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(move |invocation| {
            Some(&invocation.program) == expected_program.as_ref()
                && lossy(invocation)
                    == vec![
                        "-Xmx256m".to_string(),
                        "-Dfile.encoding=UTF8".into(),
                        "-jar".into(),
                        jar.clone(),
                        pdf.clone(),
                        "--page".into(),
                        "2".into(),
                        "--area".into(),
                        "1,2,3,4".into(),
                        "--format".into(),
                        "JSON".into(),
                    ]
        })
        .times(1)
        .returning(|invocation| {
            Ok(ExecutionOutput {
                stdout: "[]".to_string(),
                format: invocation.format,
                ..Default::default()
            })
        });
    let tabula = Tabula::with_executor(config, executor).with_platform(Platform::Linux);

    // WHEN: a request is extracted.
    let request = ExtractionRequest::builder()
        .input_path(&fixtures.pdf)
        .pages(2u32)
        .area("1,2,3,4")
        .output_format("json")
        .build();
    let output = tabula.extract(&request)?;

    // THEN: the executor's output is handed back.
    expect_that!(output.format, eq(OutputFormat::Json));
    expect_that!(output.tables()?, is_empty());
    Ok(())
}

#[gtest]
fn test_validation_errors_precede_execution() -> Result<()> {
    let fixtures = Fixtures::new()?;
    let mut executor = MockCommandExecutor::new();
    executor.expect_execute().never();
    let tabula = Tabula::with_executor(config_for(&fixtures)?, executor);

    let request = ExtractionRequest::builder()
        .input_path(&fixtures.pdf)
        .output_format("xml")
        .build();

    expect_that!(
        tabula.extract(&request).map_err(|e| e.kind()),
        err(eq(&ErrorKind::InvalidFormat))
    );
    Ok(())
}

#[gtest]
fn test_missing_archive_is_reported_before_execution() -> Result<()> {
    let fixtures = Fixtures::new()?;
    let mut executor = MockCommandExecutor::new();
    executor.expect_execute().never();
    let mut tabula = Tabula::with_executor(config_for(&fixtures)?, executor);
    tabula.set_jar_archive(fixtures.path().join("missing.jar"));

    let request = ExtractionRequest::builder()
        .input_path(&fixtures.pdf)
        .build();

    expect_that!(
        tabula.extract(&request).map_err(|e| e.kind()),
        err(eq(&ErrorKind::ArchiveNotFound))
    );
    Ok(())
}

#[gtest]
fn test_missing_runtime_is_reported_before_execution() -> Result<()> {
    let fixtures = Fixtures::new()?;
    let mut executor = MockCommandExecutor::new();
    executor.expect_execute().never();
    let config = TabulaConfig {
        jar_archive: fixtures.jar.clone(),
        runtime: Some(fixtures.path().join("no-java-here")),
        ..Default::default()
    };
    let tabula = Tabula::with_executor(config, executor);

    let request = ExtractionRequest::builder()
        .input_path(&fixtures.pdf)
        .build();

    expect_that!(
        tabula.extract(&request).map_err(|e| e.kind()),
        err(eq(&ErrorKind::RuntimeNotFound))
    );
    Ok(())
}

#[gtest]
fn test_setters_replace_archive_and_bin_dirs() -> Result<()> {
    let mut tabula = Tabula::with_executor(TabulaConfig::default(), MockCommandExecutor::new());

    tabula.set_jar_archive("/opt/tabula/tabula-1.0.5.jar");
    tabula.set_bin_dirs(["/opt/jdk/bin", "/usr/local/bin"]);

    expect_that!(
        tabula.jar_archive(),
        eq(PathBuf::from("/opt/tabula/tabula-1.0.5.jar").as_path())
    );
    expect_that!(
        tabula.bin_dirs(),
        eq(&[PathBuf::from("/opt/jdk/bin"), PathBuf::from("/usr/local/bin")][..])
    );
    Ok(())
}

#[gtest]
fn test_convert_file_requests_output_file() -> Result<()> {
    let fixtures = Fixtures::new()?;
    let out = fixtures.path().join("out.tsv");
    let expected_out = out.to_string_lossy().into_owned();

    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(move |invocation| {
            let args = lossy(invocation);
            args.ends_with(&[
                "--page".to_string(),
                "1-2".into(),
                "--guess".into(),
                "--format".into(),
                "TSV".into(),
                "--outfile".into(),
                expected_out.clone(),
            ])
        })
        .times(1)
        .returning(|invocation| {
            Ok(ExecutionOutput {
                format: invocation.format,
                output_path: invocation.output_path.clone(),
                ..Default::default()
            })
        });
    let tabula = Tabula::with_executor(config_for(&fixtures)?, executor);

    let output = tabula.convert_file(&fixtures.pdf, &out, OutputFormat::Tsv, "1-2")?;

    expect_that!(output.output_path, some(eq(&out)));
    Ok(())
}

#[gtest]
fn test_convert_batch_into_moves_written_files() -> Result<()> {
    let fixtures = Fixtures::new()?;
    let batch = fixtures.path().join("pdfs");
    let out = fixtures.path().join("out");
    std::fs::create_dir(&batch)?;
    std::fs::create_dir(&out)?;
    std::fs::write(batch.join("a.pdf"), "")?;

    // GIVEN: an executor standing in for Tabula, writing a CSV beside the PDF.
    let written = batch.join("a.csv");
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|invocation| lossy(invocation).contains(&"--batch".to_string()))
        .times(1)
        .returning(move |_| {
            std::fs::write(&written, "1,2\n").map_err(|err| crate::error::ExtractionError::Io {
                context: "writing fake output".into(),
                source: err,
            })?;
            Ok(ExecutionOutput::default())
        });
    let tabula = Tabula::with_executor(config_for(&fixtures)?, executor);

    // WHEN:
    let moved = tabula.convert_batch_into(&batch, &out, OutputFormat::Csv, "all")?;

    // THEN: the written file now lives in the output directory.
    expect_that!(moved, elements_are![eq(&out.join("a.csv"))]);
    expect_that!(batch.join("a.csv").exists(), eq(false));
    Ok(())
}

#[gtest]
fn test_convert_batch_into_requires_output_dir_before_running() -> Result<()> {
    let fixtures = Fixtures::new()?;
    let mut executor = MockCommandExecutor::new();
    executor.expect_execute().never();
    let tabula = Tabula::with_executor(config_for(&fixtures)?, executor);

    expect_that!(
        tabula
            .convert_batch_into(
                fixtures.path(),
                &fixtures.path().join("missing"),
                OutputFormat::Csv,
                "all"
            )
            .map_err(|e| e.kind()),
        err(eq(&ErrorKind::OutputDirectoryNotFound))
    );
    Ok(())
}

#[gtest]
fn test_version_passes_version_flag() -> Result<()> {
    let fixtures = Fixtures::new()?;
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|invocation| lossy(invocation).last().map(String::as_str) == Some("--version"))
        .times(1)
        .returning(|_| {
            Ok(ExecutionOutput {
                stdout: "tabula 1.0.5\n".to_string(),
                ..Default::default()
            })
        });
    let tabula = Tabula::with_executor(config_for(&fixtures)?, executor);

    expect_that!(tabula.version()?, eq("tabula 1.0.5"));
    Ok(())
}

#[cfg(unix)]
mod subprocess {
    use testutils::write_fake_runtime;

    use super::*;
    use crate::output::{Row, Table};

    /// Stands in for Tabula by writing fixed CSV rows to the path following `--outfile`.
    const WRITE_OUTFILE: &str = r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--outfile" ]; then out="$2"; fi
  shift
done
printf 'name,value\nalpha,1\n' > "$out""#;

    #[gtest]
    #[test_log::test]
    fn test_convert_file_writes_readable_csv() -> Result<()> {
        let fixtures = Fixtures::new()?;
        let runtime = write_fake_runtime(fixtures.path(), "java", WRITE_OUTFILE)?;
        let config = TabulaConfig {
            jar_archive: fixtures.jar.clone(),
            runtime: Some(runtime),
            ..Default::default()
        };
        let tabula = Tabula::new(config);
        let out = fixtures.path().join("out.csv");

        let output = tabula.convert_file(&fixtures.pdf, &out, OutputFormat::Csv, "all")?;

        expect_that!(out.is_file(), eq(true));
        let expected: Table = [["name", "value"], ["alpha", "1"]]
            .into_iter()
            .map(|row| row.into_iter().collect::<Row>())
            .collect();
        expect_that!(output.tables()?, eq(&vec![expected]));
        Ok(())
    }

    #[gtest]
    fn test_runtime_is_searched_for_in_bin_dirs() -> Result<()> {
        let fixtures = Fixtures::new()?;
        let bin = tempfile::tempdir()?;
        let runtime = write_fake_runtime(bin.path(), "tabwrap-test-java", "exit 0")?;
        let config = TabulaConfig {
            jar_archive: fixtures.jar.clone(),
            runtime_binary: "tabwrap-test-java".to_string(),
            bin_dirs: vec![bin.path().to_path_buf()],
            ..Default::default()
        };
        let mut executor = MockCommandExecutor::new();
        executor.expect_execute().never();
        let tabula = Tabula::with_executor(config, executor);

        let request = ExtractionRequest::builder()
            .input_path(&fixtures.pdf)
            .build();
        let invocation = tabula.invocation(&request)?;

        expect_that!(invocation.program, eq(&runtime));
        Ok(())
    }
}
