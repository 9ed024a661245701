use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use vival_format::TagRegistry;

use crate::compiler::Lang;
use crate::runner::Mode;

/// Settings accumulated by [`TestFiles`][crate::TestFiles] before a run
#[derive(Debug, Default)]
pub(crate) struct HarnessSpec {
    globs: Vec<PathBuf>,
    include: Option<Vec<String>>,
    executable: Option<PathBuf>,
    lang: Option<Lang>,
    timeout: Option<Duration>,
    registry: TagRegistry,
}

impl HarnessSpec {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    pub(crate) fn case(&mut self, glob: &Path) {
        self.globs.push(glob.into());
    }

    pub(crate) fn include(&mut self, include: Option<Vec<String>>) {
        self.include = include;
    }

    pub(crate) fn executable(&mut self, path: &Path) {
        self.executable = Some(path.into());
    }

    pub(crate) fn lang(&mut self, lang: Lang) {
        self.lang = Some(lang);
    }

    pub(crate) fn timeout(&mut self, time: Duration) {
        self.timeout = Some(time);
    }

    pub(crate) fn registry(&mut self, registry: TagRegistry) {
        self.registry = registry;
    }

    /// Expand globs into one case per file, sorted by path
    pub(crate) fn prepare(&self, mode: Mode) -> Vec<FileCase> {
        // Sorting and deduplicating in one go
        let mut cases: BTreeMap<PathBuf, FileCase> = BTreeMap::new();

        for glob in &self.globs {
            match get_glob(glob) {
                Some(pattern) => match ::glob::glob(pattern) {
                    Ok(paths) => {
                        for path in paths {
                            match path {
                                Ok(path) => {
                                    let case = self.file_case(path.clone(), mode);
                                    cases.insert(path, case);
                                }
                                Err(err) => {
                                    let path = err.path().to_owned();
                                    let err: std::io::Error = err.into();
                                    cases.insert(path.clone(), FileCase::with_error(path, err));
                                }
                            }
                        }
                    }
                    Err(err) => {
                        cases.insert(glob.clone(), FileCase::with_error(glob.clone(), err));
                    }
                },
                None => {
                    cases.insert(glob.clone(), self.file_case(glob.clone(), mode));
                }
            }
        }

        cases
            .into_values()
            .filter(|case| self.is_included(case))
            .collect()
    }

    fn file_case(&self, path: PathBuf, mode: Mode) -> FileCase {
        let Some(executable) = self.executable.clone() else {
            return FileCase::with_error(path, "no executable configured");
        };
        if path.file_name().is_none() {
            return FileCase::with_error(path, "path has no name");
        }
        FileCase {
            path,
            executable,
            lang: self.lang,
            timeout: self.timeout,
            mode,
            registry: self.registry.clone(),
            error: None,
        }
    }

    fn is_included(&self, case: &FileCase) -> bool {
        if let Some(include) = self.include.as_deref() {
            include
                .iter()
                .any(|i| case.path.to_string_lossy().contains(i))
        } else {
            true
        }
    }
}

/// One test file and everything needed to run it
#[derive(Clone, Debug)]
pub(crate) struct FileCase {
    pub(crate) path: PathBuf,
    pub(crate) executable: PathBuf,
    pub(crate) lang: Option<Lang>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) mode: Mode,
    pub(crate) registry: TagRegistry,
    pub(crate) error: Option<String>,
}

impl FileCase {
    pub(crate) fn with_error(path: PathBuf, error: impl std::fmt::Display) -> Self {
        Self {
            path,
            executable: PathBuf::new(),
            lang: None,
            timeout: None,
            mode: Mode::default(),
            registry: TagRegistry::new(),
            error: Some(error.to_string()),
        }
    }
}

fn get_glob(path: &Path) -> Option<&str> {
    let utf8 = path.to_str()?;
    utf8.contains('*').then_some(utf8)
}
