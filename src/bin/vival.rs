use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use vival::compiler::{invocation_for, Lang};
use vival::format::{Format, TagRegistry};
use vival::report::Palette;
use vival::runner::{Mode, Runner};

/// Run a program against the tests of a tagged test file
#[derive(Debug, Parser)]
#[command(name = "vival", version, about)]
struct Args {
    /// Program under test: a C/C++ source, a Python script or an executable
    #[arg(value_parser = existing_path)]
    executable_path: PathBuf,

    /// Test file
    #[arg(short, long, default_value = "tests.txt")]
    tests: PathBuf,

    /// Number of failed tests to display
    #[arg(long, default_value_t = 5)]
    ntests: usize,

    /// File to store the parsed (and maybe filled) tests in
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source language for object files and unknown extensions [C, C++, Python]
    ///
    /// Object files default to C++; other unknown extensions are run directly.
    #[arg(short, long)]
    lang: Option<Lang>,

    /// `test` runs filled tests, `fill` records the output of unfilled ones
    #[arg(short, long, default_value = "test")]
    mode: Mode,

    /// Read `[INPUT]` / `{CMD}` / `[OUTPUT]` sections
    #[arg(long)]
    old_format: bool,

    /// Run the program under valgrind memory checks
    #[arg(long, visible_alias = "vg")]
    valgrind: bool,

    /// Stop testing after this many failures
    #[arg(long, visible_alias = "bf")]
    break_fail: Option<usize>,

    /// TOML file reconfiguring tag order, separators, labels and defaults
    #[arg(long)]
    tags: Option<PathBuf>,

    /// Time limit per test overriding the file's `TIMEOUT`, e.g. `500ms`
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,
}

fn existing_path(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("`{raw}` does not exist"))
    }
}

fn stdout() -> Box<dyn Write> {
    #[cfg(feature = "color")]
    {
        Box::new(anstream::stdout())
    }
    #[cfg(not(feature = "color"))]
    {
        Box::new(std::io::stdout())
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            let _ = writeln!(stdout(), "{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode, vival::Error> {
    let mut out = stdout();
    let palette = Palette::color();

    let registry = match &args.tags {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| vival::Error::new(format!("Failed to read {}: {e}", path.display())))?;
            TagRegistry::from_toml(&raw)?
        }
        None => TagRegistry::new(),
    };

    let text = std::fs::read_to_string(&args.tests).map_err(|e| {
        vival::Error::new(format!("Failed to read {}: {e}", args.tests.display()))
    })?;
    let format = if args.old_format {
        Format::Legacy
    } else {
        Format::New
    };
    let parsed = vival::format::Parser::new(&registry)
        .format(format)
        .expect_filled(args.mode == Mode::Test)
        .parse(&text);
    let mut suite = match parsed {
        Ok(suite) => suite,
        Err(err) => {
            writeln!(out, "{}", palette.error("Parse failed!"))?;
            writeln!(out, "{err}")?;
            return Ok(ExitCode::FAILURE);
        }
    };

    if args.valgrind && !suite.sanitizers().is_empty() {
        writeln!(
            out,
            "{}",
            palette.warn("Warning: valgrind is enabled, so sanitizers were deleted from flags")
        )?;
        suite.strip_sanitizers();
    }

    if !suite.warnings.is_empty() {
        writeln!(out, "{}", palette.warn("Warnings from parser:"))?;
        for warning in &suite.warnings {
            writeln!(out, "{warning}")?;
        }
    }

    let temp_dir = tempfile::tempdir()?;
    let invocation = match invocation_for(&args.executable_path, args.lang, &suite, temp_dir.path())
    {
        Ok(invocation) => invocation,
        Err(err) => {
            writeln!(out, "{}", palette.error("Compilation failed!"))?;
            writeln!(out, "{err}")?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let invocation = if args.valgrind {
        invocation.under_valgrind()
    } else {
        invocation
    };

    let run = Runner::new(args.mode)
        .break_fail(args.break_fail)
        .timeout(args.timeout)
        .run(&mut suite, &invocation)?;

    writeln!(out)?;
    writeln!(out, "{suite}")?;
    writeln!(out)?;

    if !run.failures.is_empty() {
        writeln!(out, "{}", palette.error("Failed on these tests:"))?;
        writeln!(out)?;
        for report in run.reports(&suite, args.ntests) {
            let mut rendered = String::new();
            report
                .write(&mut rendered, palette)
                .map_err(|_| vival::Error::new("Failed to render report"))?;
            write!(out, "{rendered}")?;
        }
    }

    writeln!(out, "{}", run.summary)?;

    if let Some(output) = &args.output {
        std::fs::write(output, suite.render())
            .map_err(|e| vival::Error::new(format!("Failed to write {}: {e}", output.display())))?;
    }

    if args.mode == Mode::Test && !run.summary.is_ok() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
