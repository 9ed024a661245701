use std::fmt::Write as _;
use std::time::{Duration, Instant};

use vival_format::{Parser, TagRegistry};

use crate::compiler::{invocation_for, Lang};
use crate::report::Palette;
use crate::runner::{Mode, Runner, Summary};
use crate::spec::{FileCase, HarnessSpec};

/// Failed tests reported per file
const REPORT_LIMIT: usize = 5;

/// Entry point for running test files from `cargo test`
///
/// ```rust,no_run
/// #[test]
/// fn io_tests() {
///     vival::TestFiles::new()
///         .executable(vival::cargo_bin!("vival-fixture"))
///         .case("tests/io/*.txt");
/// }
/// ```
///
/// Set `VIVAL=fill` to record the output of unfilled tests back into their
/// files instead of validating filled ones.
#[derive(Debug)]
pub struct TestFiles {
    spec: std::cell::RefCell<HarnessSpec>,
    has_run: std::cell::Cell<bool>,
}

impl TestFiles {
    pub fn new() -> Self {
        let s = Self {
            spec: Default::default(),
            has_run: Default::default(),
        };
        s.spec
            .borrow_mut()
            .include(parse_include(std::env::args_os()));
        s
    }

    /// Program every file is run against
    ///
    /// C, C++ and Python sources are compiled or interpreted as the `vival`
    /// binary would.
    pub fn executable(&self, path: impl AsRef<std::path::Path>) -> &Self {
        self.spec.borrow_mut().executable(path.as_ref());
        self
    }

    /// Language for object files and executables without a known extension
    pub fn lang(&self, lang: Lang) -> &Self {
        self.spec.borrow_mut().lang(lang);
        self
    }

    /// Load test files matching `glob`
    pub fn case(&self, glob: impl AsRef<std::path::Path>) -> &Self {
        self.spec.borrow_mut().case(glob.as_ref());
        self
    }

    /// Time limit overriding each file's `TIMEOUT`
    pub fn timeout(&self, time: Duration) -> &Self {
        self.spec.borrow_mut().timeout(time);
        self
    }

    /// Tag configuration the files are read and written with
    pub fn tags(&self, registry: TagRegistry) -> &Self {
        self.spec.borrow_mut().registry(registry);
        self
    }

    /// Run tests
    ///
    /// This will happen on `drop` if not done explicitly
    pub fn run(&self) {
        self.has_run.set(true);

        let mode = parse_mode(std::env::var_os("VIVAL").as_deref());
        let cases = self.spec.borrow().prepare(mode);
        run_cases(&cases);
    }
}

impl Default for TestFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl std::panic::RefUnwindSafe for TestFiles {}

#[doc(hidden)]
impl Drop for TestFiles {
    fn drop(&mut self) {
        if !self.has_run.get() && !std::thread::panicking() {
            self.run();
        }
    }
}

fn run_cases(cases: &[FileCase]) {
    let palette = Palette::color();
    if cases.is_empty() {
        vival_macros::eprintln!("{}", palette.warn("There are no vival test files enabled yet"));
        return;
    }

    let mut failed = 0;
    for case in cases {
        let start = Instant::now();
        let result = run_case(case);
        let duration = start.elapsed();

        let mut status = String::new();
        let _ = write!(status, "{} {} ... ", palette.hint("Testing"), case.path.display());
        match &result {
            Ok(file) if file.summary.is_ok() => {
                let _ = write!(status, "{}", palette.info("ok"));
            }
            _ => {
                failed += 1;
                let _ = write!(status, "{}", palette.error("failed"));
            }
        }
        let _ = writeln!(
            status,
            " {}",
            palette.hint(humantime::format_duration(round_millis(duration)))
        );
        match result {
            Ok(file) => {
                for report in &file.reports {
                    status.push_str(report);
                }
                if !file.summary.is_ok() {
                    let _ = writeln!(status, "{}", file.summary);
                }
            }
            Err(err) => {
                let _ = writeln!(status, "{}", palette.error(err));
            }
        }
        vival_macros::eprint!("{status}");
    }

    if failed != 0 {
        vival_macros::eprintln!(
            "{}",
            palette.hint("Record output of unfilled tests with `VIVAL=fill`")
        );
        panic!("{} of {} tests failed", failed, cases.len());
    }
}

#[derive(Debug)]
struct FileRun {
    summary: Summary,
    reports: Vec<String>,
}

fn run_case(case: &FileCase) -> Result<FileRun, crate::Error> {
    if let Some(err) = &case.error {
        return Err(crate::Error::new(err));
    }

    let text = std::fs::read_to_string(&case.path)
        .map_err(|e| crate::Error::new(format!("Failed to read {}: {e}", case.path.display())))?;
    let mut suite = Parser::new(&case.registry)
        .expect_filled(case.mode == Mode::Test)
        .parse(&text)?;

    let temp_dir = tempfile::tempdir()?;
    let invocation = invocation_for(&case.executable, case.lang, &suite, temp_dir.path())?;
    let run = Runner::new(case.mode)
        .timeout(case.timeout)
        .run(&mut suite, &invocation)?;

    if case.mode == Mode::Fill && run.summary.passed != 0 {
        std::fs::write(&case.path, suite.render()).map_err(|e| {
            crate::Error::new(format!("Failed to write {}: {e}", case.path.display()))
        })?;
    }

    let palette = Palette::color();
    let reports = run
        .reports(&suite, REPORT_LIMIT)
        .into_iter()
        .map(|report| {
            let mut rendered = String::new();
            let _ = report.write(&mut rendered, palette);
            rendered
        })
        .collect();
    Ok(FileRun {
        summary: run.summary,
        reports,
    })
}

fn round_millis(duration: Duration) -> Duration {
    Duration::from_millis(duration.as_millis() as u64)
}

fn parse_mode(var: Option<&std::ffi::OsStr>) -> Mode {
    if var == Some(std::ffi::OsStr::new("fill")) {
        Mode::Fill
    } else {
        Mode::Test
    }
}

// Filter which files are run.
//
//     $ cargo test --test io_tests -- vival=negative
//
// Only files whose path contains the filter string will be run.
fn parse_include(args: impl IntoIterator<Item = std::ffi::OsString>) -> Option<Vec<String>> {
    let filters = args
        .into_iter()
        .flat_map(std::ffi::OsString::into_string)
        .filter_map(|arg| {
            const PREFIX: &str = "vival=";
            let remainder = arg.strip_prefix(PREFIX)?;
            (!remainder.is_empty()).then(|| remainder.to_owned())
        })
        .collect::<Vec<String>>();

    if filters.is_empty() {
        None
    } else {
        Some(filters)
    }
}
