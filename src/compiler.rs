//! Turning a source file into something [`Runtime`][crate::Runtime] can run

use std::path::{Path, PathBuf};
use std::process::Command;

use vival_format::Suite;

use crate::{Error, Invocation};

/// Language of the program under test
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lang {
    C,
    Cpp,
    Python,
}

impl Lang {
    /// Language implied by a source file extension
    pub fn detect(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "c" => Some(Self::C),
            "cpp" => Some(Self::Cpp),
            "py" => Some(Self::Python),
            _ => None,
        }
    }

    fn compiler(self) -> Option<&'static str> {
        match self {
            Self::C => Some("gcc"),
            Self::Cpp => Some("g++"),
            Self::Python => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Python => "py",
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Python => "Python",
        }
        .fmt(f)
    }
}

impl std::str::FromStr for Lang {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(Self::C),
            "c++" | "cpp" => Ok(Self::Cpp),
            "python" => Ok(Self::Python),
            _ => Err(Error::new(format!(
                "Unknown language `{s}`, expected one of C, C++, Python"
            ))),
        }
    }
}

/// Builds C and C++ sources with `gcc`/`g++`
#[derive(Clone, Debug)]
pub struct Compiler {
    lang: Lang,
    temp_dir: PathBuf,
    flags: Vec<String>,
}

impl Compiler {
    /// Intermediate files and the executable land in `temp_dir`
    pub fn new(lang: Lang, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            lang,
            temp_dir: temp_dir.into(),
            flags: Vec::new(),
        }
    }

    /// Compiler flags, split like a shell would
    pub fn flags(mut self, flags: &str) -> Result<Self, Error> {
        self.flags = shlex::split(flags)
            .ok_or_else(|| Error::new(format!("Malformed FLAGS `{flags}`: unbalanced quotes")))?;
        Ok(self)
    }

    /// Path of the executable [`Compiler::compile`] produces
    pub fn output_path(&self) -> PathBuf {
        self.temp_dir
            .join(format!("res{}", std::env::consts::EXE_SUFFIX))
    }

    /// Compiler invocation for `src`, writing `main` next to the output when given
    pub fn command(&self, src: &Path, main: Option<&str>) -> Result<Command, Error> {
        let compiler = self
            .lang
            .compiler()
            .ok_or_else(|| Error::new(format!("{} sources are not compiled", self.lang)))?;
        let mut cmd = Command::new(compiler);
        cmd.args(&self.flags);
        if let Some(main) = main {
            let main_src = self
                .temp_dir
                .join(format!("main.{}", self.lang.extension()));
            std::fs::write(&main_src, main).map_err(|e| {
                Error::new(format!("Failed to write {}: {e}", main_src.display()))
            })?;
            cmd.arg(main_src);
        }
        cmd.arg(src).arg("-o").arg(self.output_path());
        Ok(cmd)
    }

    pub fn compile(&self, src: &Path, main: Option<&str>) -> Result<PathBuf, Error> {
        let mut cmd = self.command(src, main)?;
        vival_macros::debug!("compiling: {cmd:?}");
        let compiled = cmd.status().map(|s| s.success()).unwrap_or(false);
        if !compiled {
            return Err(Error::new(
                "Failed to compile source file. Make sure you have C/C++ compiler installed.",
            ));
        }
        Ok(self.output_path())
    }
}

/// How to run `path`: compiled, interpreted, or as-is
///
/// The extension picks the language; object files and unrecognized
/// extensions use `lang` when one is given. Without a language the file is
/// run directly.
pub fn invocation_for(
    path: &Path,
    lang: Option<Lang>,
    suite: &Suite,
    temp_dir: &Path,
) -> Result<Invocation, Error> {
    let is_object = path.extension().is_some_and(|ext| ext == "o");
    let lang = match Lang::detect(path) {
        Some(detected) => Some(detected),
        None if is_object => Some(lang.unwrap_or(Lang::Cpp)),
        None => lang,
    };
    vival_macros::debug!("{} treated as {:?}", path.display(), lang);

    match lang {
        None => Ok(Invocation::new(path)),
        Some(Lang::Python) => Ok(Invocation::new("python3").arg(path)),
        Some(lang) => {
            let compiler =
                Compiler::new(lang, temp_dir).flags(&suite.flags().unwrap_or_default())?;
            let main = suite.main_text();
            let executable = compiler.compile(path, main.as_deref())?;
            Ok(Invocation::new(executable))
        }
    }
}
