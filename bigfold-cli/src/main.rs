use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bigfold_core::{CoreError, Diagnostic, FoldArtifact, fold_expression, fold_source, load_package};
use clap::Parser;

/// Folds integer constant declarations with arbitrary precision.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Source file or package directory of .kst files (reads stdin when absent)"
    )]
    input: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "EXPR",
        conflicts_with = "input",
        help = "Fold a single expression instead of declarations"
    )]
    expr: Option<String>,

    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Write the results to a file instead of stdout"
    )]
    output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "N",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(2..=16),
        help = "Base for integer results"
    )]
    base: u32,

    #[arg(short, long, help = "Report progress on stderr")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    let rendered = if let Some(expr) = &cli.expr {
        log(&cli, "folding expression");
        let folded = fold_expression(expr).or_else(|err| report(err, |_| None))?;
        print_diagnostics(&folded.warnings, |_| None);
        let mut text = folded.value.to_text_in_base(cli.base);
        text.push('\n');
        text
    } else {
        let artifact = match &cli.input {
            Some(path) if path.is_dir() => fold_directory(&cli, path)?,
            Some(path) => {
                let source = fs::read_to_string(path)
                    .with_context(|| format!("failed to read input file {}", path.display()))?;
                log(&cli, &format!("folding {}", path.display()));
                fold_source(&source).or_else(|err| report(err, |_| None))?
            }
            None => {
                let mut source = String::new();
                io::stdin()
                    .read_to_string(&mut source)
                    .context("failed to read stdin")?;
                log(&cli, "folding stdin");
                fold_source(&source).or_else(|err| report(err, |_| None))?
            }
        };
        print_diagnostics(&artifact.warnings, |_| None);
        log(&cli, &format!("folded {} constant(s)", artifact.constants.len()));
        render_constants(&artifact, cli.base)
    };

    match &cli.output {
        Some(path) => write_output(path, rendered.as_bytes())?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn fold_directory(cli: &Cli, root: &Path) -> Result<FoldArtifact> {
    let package = load_package(root)?;
    for file in &package.files {
        log(cli, &format!("loaded {}", file.path.display()));
    }
    let file_name = |diag: &Diagnostic| {
        package
            .file(diag.span.file_id)
            .map(|file| file.path.display().to_string())
    };
    match package.fold() {
        Ok(artifact) => {
            print_diagnostics(&artifact.warnings, file_name);
            Ok(artifact)
        }
        Err(err) => report(err, file_name),
    }
}

fn render_constants(artifact: &FoldArtifact, base: u32) -> String {
    let mut out = String::new();
    for constant in &artifact.constants {
        out.push_str(&format!(
            "{} = {}\n",
            constant.name,
            constant.value.to_text_in_base(base)
        ));
    }
    out
}

// Prints every diagnostic of a failed fold and turns it into the
// process error.
fn report<T>(err: CoreError, file_name: impl Fn(&Diagnostic) -> Option<String>) -> Result<T> {
    if err.diagnostics().is_empty() {
        return Err(err.into());
    }
    print_diagnostics(err.diagnostics(), file_name);
    bail!(err)
}

fn print_diagnostics(diagnostics: &[Diagnostic], file_name: impl Fn(&Diagnostic) -> Option<String>) {
    for diag in diagnostics {
        match file_name(diag) {
            Some(name) => eprintln!("{name}: {diag}"),
            None => eprintln!("{diag}"),
        }
    }
}

fn log(cli: &Cli, message: &str) {
    if cli.verbose {
        eprintln!("bigfold: {message}");
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::tempdir;

    fn bigfold() -> Command {
        Command::cargo_bin("bigfold-cli").expect("binary exists")
    }

    #[test]
    fn folds_a_source_file() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("consts.kst");
        fs::write(&input_path, "WIDTH : u32 : 64\nMASK :: sub (shl 1 WIDTH) 1\n")
            .expect("write input");

        bigfold()
            .arg("--input")
            .arg(&input_path)
            .assert()
            .success()
            .stdout(predicate::str::contains("WIDTH = 64"))
            .stdout(predicate::str::contains("MASK = 18446744073709551615"));
    }

    #[test]
    fn reads_stdin_and_prints_in_base() {
        bigfold()
            .arg("--base")
            .arg("16")
            .write_stdin("P :: mul 0xffff_ffff_ffff_ffff 0xffff_ffff_ffff_ffff")
            .assert()
            .success()
            .stdout("P = 0xfffffffffffffffe0000000000000001\n");
    }

    #[test]
    fn folds_an_expression() {
        bigfold()
            .arg("--expr")
            .arg("bit_not u8 0")
            .assert()
            .success()
            .stdout("255\n");

        bigfold()
            .arg("--expr")
            .arg("neg 10")
            .arg("--base")
            .arg("2")
            .assert()
            .success()
            .stdout("-0b1010\n");
    }

    #[test]
    fn reports_division_by_zero() {
        bigfold()
            .arg("--expr")
            .arg("quo 4 0")
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "error[E0301]: division by zero in constant expression (bytes 0..7)",
            ));
    }

    #[test]
    fn reports_every_error_in_a_file() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("bad.kst");
        fs::write(&input_path, "A : u8 : 256\nB :: UNKNOWN\n").expect("write input");

        bigfold()
            .arg("--input")
            .arg(&input_path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("error[E0302]: constant `256` overflows `u8`"))
            .stderr(predicate::str::contains("error[E0201]: unknown constant `UNKNOWN`"));
    }

    #[test]
    fn folds_a_package_directory() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.kst"), "KIB :: shl 1 10").expect("write");
        fs::write(dir.path().join("b.kst"), "MIB :: mul KIB KIB\nBAD :: quo MIB 0").expect("write");

        bigfold()
            .arg("--input")
            .arg(dir.path())
            .arg("--verbose")
            .assert()
            .failure()
            .stderr(predicate::str::contains("bigfold: loaded a.kst"))
            .stderr(predicate::str::contains("b.kst: error[E0301]"));

        fs::write(dir.path().join("b.kst"), "MIB :: mul KIB KIB").expect("write");
        bigfold()
            .arg("--input")
            .arg(dir.path())
            .assert()
            .success()
            .stdout("KIB = 1024\nMIB = 1048576\n");
    }

    #[test]
    fn writes_output_file() {
        let dir = tempdir().expect("tempdir");
        let output_path = dir.path().join("out/consts.txt");

        bigfold()
            .arg("--expr")
            .arg("pow 2 64")
            .arg("--output")
            .arg(&output_path)
            .assert()
            .success();

        let written = fs::read_to_string(&output_path).expect("read output");
        assert_eq!(written, "18446744073709551616\n");
    }

    #[test]
    fn warns_about_integer_div() {
        bigfold()
            .arg("--expr")
            .arg("div 7 2")
            .assert()
            .success()
            .stdout("3.5\n")
            .stderr(predicate::str::contains("warning[W0001]"));
    }

    #[test]
    fn deep_nesting_reports_instead_of_crashing() {
        let source = format!("A :: {}1\n", "neg ".repeat(10_000));
        bigfold()
            .write_stdin(source)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains(
                "error[E0101]: expression nested too deeply",
            ));
    }

    #[test]
    fn oversized_results_are_rejected_quickly() {
        bigfold()
            .arg("--expr")
            .arg("1e300000000")
            .timeout(std::time::Duration::from_secs(10))
            .assert()
            .failure()
            .stderr(predicate::str::contains("error[E0302]"));

        bigfold()
            .arg("--expr")
            .arg("pow 3 2000000")
            .timeout(std::time::Duration::from_secs(10))
            .assert()
            .failure()
            .stderr(predicate::str::contains("error[E0302]"));
    }

    #[test]
    fn huge_values_stay_short_in_diagnostics() {
        let output = bigfold()
            .write_stdin("A : u8 : shl 1 65536")
            .assert()
            .failure()
            .stderr(predicate::str::contains("constant `~ 2.003e19728` overflows `u8`"))
            .get_output()
            .stderr
            .clone();
        assert!(output.len() < 200, "{} bytes of stderr", output.len());
    }

    #[test]
    fn rejects_out_of_range_base() {
        bigfold()
            .arg("--expr")
            .arg("1")
            .arg("--base")
            .arg("17")
            .assert()
            .failure();
    }

    #[test]
    fn reports_missing_input_file() {
        let dir = tempdir().expect("tempdir");
        bigfold()
            .arg("--input")
            .arg(dir.path().join("missing.kst"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to read input file"));
    }
}
