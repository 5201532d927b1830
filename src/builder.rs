use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use anyhow::{Result, bail};
use glob::glob;
use tracing::info;

use makefile_model::{Error, OnDuplicate, UniqueList};

/// Configures and executes a single compiler/linker invocation.
///
/// Accumulation never touches the filesystem or spawns anything; process
/// execution and cleanup happen only in [`Builder::build`],
/// [`Builder::run_executable`] and [`Builder::clean`].
pub struct Builder {
    target: String,
    cc: String,
    cxx: String,
    cppfiles: UniqueList<String>,
    hppfiles: UniqueList<String>,
    include_dirs: UniqueList<String>,
    cflags: UniqueList<String>,
    cxxflags: UniqueList<String>,
    link_dirs: UniqueList<String>,
    ldlibs: UniqueList<String>,
    ldflags: UniqueList<String>,
    cleanup_patterns: UniqueList<String>,
    cleanup_targets: UniqueList<String>,
    on_duplicate: OnDuplicate,
}

impl Builder {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            cc: "gcc".to_string(),
            cxx: "g++".to_string(),
            cppfiles: UniqueList::new(),
            hppfiles: UniqueList::new(),
            include_dirs: UniqueList::new(),
            cflags: UniqueList::new(),
            cxxflags: UniqueList::new(),
            link_dirs: UniqueList::new(),
            ldlibs: UniqueList::new(),
            ldflags: UniqueList::new(),
            cleanup_patterns: UniqueList::new(),
            cleanup_targets: UniqueList::new(),
            on_duplicate: OnDuplicate::Skip,
        }
    }

    pub fn on_duplicate(mut self, policy: OnDuplicate) -> Self {
        self.on_duplicate = policy;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn cc(&self) -> &str {
        &self.cc
    }

    pub fn set_cc(&mut self, cc: &str) {
        self.cc = cc.to_string();
    }

    pub fn cxx(&self) -> &str {
        &self.cxx
    }

    pub fn set_cxx(&mut self, cxx: &str) {
        self.cxx = cxx.to_string();
    }

    fn check_dir(path: &str) -> makefile_model::Result<()> {
        if Path::new(path).is_dir() {
            Ok(())
        } else {
            Err(Error::InvalidDir(path.to_string()))
        }
    }

    pub fn add_cppfiles<S: AsRef<str>>(&mut self, entries: &[S]) -> makefile_model::Result<()> {
        self.cppfiles
            .add_entries("cppfiles", "", self.on_duplicate, entries)
    }

    pub fn add_hppfiles<S: AsRef<str>>(&mut self, entries: &[S]) -> makefile_model::Result<()> {
        self.hppfiles
            .add_entries("hppfiles", "", self.on_duplicate, entries)
    }

    pub fn add_include_dirs<S: AsRef<str>>(&mut self, entries: &[S]) -> makefile_model::Result<()> {
        for entry in entries {
            Self::check_dir(entry.as_ref())?;
        }
        self.include_dirs
            .add_entries("include_dirs", "-I", self.on_duplicate, entries)
    }

    pub fn add_cflags<S: AsRef<str>>(&mut self, entries: &[S]) -> makefile_model::Result<()> {
        self.cflags
            .add_entries("cflags", "", self.on_duplicate, entries)
    }

    pub fn add_cxxflags<S: AsRef<str>>(&mut self, entries: &[S]) -> makefile_model::Result<()> {
        self.cxxflags
            .add_entries("cxxflags", "", self.on_duplicate, entries)
    }

    pub fn add_link_dirs<S: AsRef<str>>(&mut self, entries: &[S]) -> makefile_model::Result<()> {
        for entry in entries {
            Self::check_dir(entry.as_ref())?;
        }
        self.link_dirs
            .add_entries("link_dirs", "-L", self.on_duplicate, entries)
    }

    pub fn add_ldlibs<S: AsRef<str>>(&mut self, entries: &[S]) -> makefile_model::Result<()> {
        self.ldlibs
            .add_entries("ldlibs", "", self.on_duplicate, entries)
    }

    pub fn add_ldflags<S: AsRef<str>>(&mut self, entries: &[S]) -> makefile_model::Result<()> {
        self.ldflags
            .add_entries("ldflags", "", self.on_duplicate, entries)
    }

    pub fn add_cleanup_patterns<S: AsRef<str>>(
        &mut self,
        entries: &[S],
    ) -> makefile_model::Result<()> {
        self.cleanup_patterns
            .add_entries("cleanup_patterns", "", self.on_duplicate, entries)
    }

    pub fn add_cleanup_targets<S: AsRef<str>>(
        &mut self,
        entries: &[S],
    ) -> makefile_model::Result<()> {
        self.cleanup_targets
            .add_entries("cleanup_targets", "", self.on_duplicate, entries)
    }

    /// The full compiler invocation, in fixed field order.
    pub fn build_cmd(&self) -> String {
        format!(
            "{} {} {} {} {} -o {}",
            self.cxx,
            self.cxxflags_field(),
            self.cppfiles.join(" "),
            self.ldlibs.join(" "),
            self.ldflags_field(),
            self.target
        )
    }

    fn cxxflags_field(&self) -> String {
        format!("{} {}", self.cxxflags.join(" "), self.include_dirs.join(" "))
    }

    fn ldflags_field(&self) -> String {
        format!("{} {}", self.ldflags.join(" "), self.link_dirs.join(" "))
    }

    /// Build the target. A dry run prints the command and stops; otherwise
    /// the command runs through the shell and registered cleanup entries
    /// are removed afterwards.
    pub fn build(&self, dry_run: bool) -> Result<()> {
        let cmd = self.build_cmd();
        if dry_run {
            println!("{cmd}");
            return Ok(());
        }
        println!();
        self.execute(&cmd)?;
        if !self.cleanup_patterns.is_empty() || !self.cleanup_targets.is_empty() {
            self.clean()?;
        }
        Ok(())
    }

    /// Remove glob-matched and explicitly registered build artifacts.
    /// Directories go recursively; missing paths are not an error.
    pub fn clean(&self) -> Result<()> {
        for pattern in self.cleanup_patterns.iter() {
            for entry in glob(pattern)? {
                remove(&entry?)?;
            }
        }
        for target in self.cleanup_targets.iter() {
            remove(Path::new(target))?;
        }
        Ok(())
    }

    /// Run the built artifact, blocking until it exits.
    pub fn run_executable(&self) -> Result<()> {
        info!("Running {}", self.target);
        self.execute(&format!("./{}", self.target))
    }

    fn execute(&self, cmd: &str) -> Result<()> {
        println!("{cmd}");
        let status = Command::new("sh").arg("-c").arg(cmd).status()?;
        if !status.success() {
            bail!("command failed with status: {status}");
        }
        Ok(())
    }
}

fn remove(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        match fs::remove_file(path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_cmd_has_fixed_field_order() {
        let mut b = Builder::new("prog");
        b.add_cxxflags(&["-O2"]).unwrap();
        b.add_cppfiles(&["main.cpp"]).unwrap();
        b.add_ldlibs(&["-lm"]).unwrap();
        assert_eq!(b.build_cmd(), "g++ -O2  main.cpp -lm   -o prog");
    }

    #[test]
    fn dry_run_only_prints_the_command() {
        let mut b = Builder::new("prog");
        b.add_cppfiles(&["main.cpp"]).unwrap();
        // no compiler is invoked, so this succeeds even without sources
        b.build(true).unwrap();
    }

    #[test]
    fn include_dirs_are_validated_and_prefixed() {
        let mut b = Builder::new("prog");
        b.add_include_dirs(&["/tmp"]).unwrap();
        assert!(b.build_cmd().contains("-I/tmp"));

        let err = b.add_include_dirs(&["/no/such/dir/at/all"]).unwrap_err();
        assert!(matches!(err, Error::InvalidDir(_)));
    }

    #[test]
    fn link_dirs_are_validated_and_prefixed() {
        let mut b = Builder::new("prog");
        b.add_link_dirs(&["/tmp"]).unwrap();
        assert!(b.build_cmd().contains("-L/tmp"));
    }

    #[test]
    fn duplicates_skip_by_default_and_error_in_strict_mode() {
        let mut b = Builder::new("prog");
        b.add_cxxflags(&["-Wall", "-Wall"]).unwrap();
        b.add_cxxflags(&["-Wall"]).unwrap();
        assert_eq!(b.build_cmd().matches("-Wall").count(), 1);

        let mut strict = Builder::new("prog").on_duplicate(OnDuplicate::Error);
        strict.add_cxxflags(&["-Wall"]).unwrap();
        let err = strict.add_cxxflags(&["-Wall"]).unwrap_err();
        assert!(matches!(err, Error::DuplicateEntry { .. }));
    }

    #[test]
    fn compilers_default_to_gcc_and_gxx() {
        let mut b = Builder::new("prog");
        assert_eq!(b.cc(), "gcc");
        assert_eq!(b.cxx(), "g++");
        b.set_cxx("clang++");
        assert!(b.build_cmd().starts_with("clang++ "));
    }

    #[test]
    fn cleanup_removes_files_and_directories() {
        let dir = std::env::temp_dir().join("makefilegen-builder-clean-test");
        std::fs::create_dir_all(dir.join("sub")).unwrap();
        std::fs::write(dir.join("a.o"), "").unwrap();
        std::fs::write(dir.join("b.o"), "").unwrap();

        let mut b = Builder::new("prog");
        b.add_cleanup_patterns(&[format!("{}/*.o", dir.display())])
            .unwrap();
        b.add_cleanup_targets(&[
            dir.join("sub").display().to_string(),
            dir.join("never-existed").display().to_string(),
        ])
        .unwrap();
        b.clean().unwrap();

        assert!(!dir.join("a.o").exists());
        assert!(!dir.join("b.o").exists());
        assert!(!dir.join("sub").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
