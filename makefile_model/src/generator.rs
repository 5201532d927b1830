use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Error, Result};
use crate::unique::{OnDuplicate, UniqueList};
use crate::var::{MakeInfo, Var};

/// Variables `make` defines on its own that always count as valid
/// directory references.
const BUILTIN_DIR_VARS: &[&str] = &["HOME", "PWD", "CURDIR"];

/// Conditional directive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondKind {
    IfEq,
    IfNeq,
    IfDef,
    IfNdef,
}

impl CondKind {
    fn directive(self) -> &'static str {
        match self {
            CondKind::IfEq => "ifeq",
            CondKind::IfNeq => "ifneq",
            CondKind::IfDef => "ifdef",
            CondKind::IfNdef => "ifndef",
        }
    }

    /// `ifeq`/`ifneq` wrap their condition in parentheses; `ifdef`/`ifndef`
    /// take a bare variable name.
    fn parenthesized(self) -> bool {
        matches!(self, CondKind::IfEq | CondKind::IfNeq)
    }
}

/// Line-oriented sink for Makefile text.
pub struct MakefileWriter<W: Write> {
    out: W,
}

impl<W: Write> MakefileWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Accumulates a Makefile document and serializes it in a fixed section
/// order: variables, includes, phony declaration, conditionals, pattern
/// rules, targets (sorted), clean target.
///
/// Constructed empty, populated through the `add_*` methods, consumed once
/// by [`MakefileGenerator::generate`].
pub struct MakefileGenerator {
    path: PathBuf,
    cxx: String,
    make: MakeInfo,
    on_duplicate: OnDuplicate,
    header: Option<String>,
    vars: HashMap<String, Var>,
    var_order: UniqueList<String>,
    include_dirs: UniqueList<String>,
    cflags: UniqueList<String>,
    cxxflags: UniqueList<String>,
    link_dirs: UniqueList<String>,
    ldlibs: UniqueList<String>,
    ldflags: UniqueList<String>,
    targets: UniqueList<String>,
    pattern_rules: UniqueList<String>,
    phony: UniqueList<String>,
    clean: UniqueList<String>,
    includes: UniqueList<String>,
    includes_opt: UniqueList<String>,
    // conditionals may repeat, so a plain Vec
    conditionals: Vec<String>,
}

impl MakefileGenerator {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            cxx: "g++".to_string(),
            make: MakeInfo::default(),
            on_duplicate: OnDuplicate::Skip,
            header: None,
            vars: HashMap::new(),
            var_order: UniqueList::new(),
            include_dirs: UniqueList::new(),
            cflags: UniqueList::new(),
            cxxflags: UniqueList::new(),
            link_dirs: UniqueList::new(),
            ldlibs: UniqueList::new(),
            ldflags: UniqueList::new(),
            targets: UniqueList::new(),
            pattern_rules: UniqueList::new(),
            phony: UniqueList::new(),
            clean: UniqueList::new(),
            includes: UniqueList::new(),
            includes_opt: UniqueList::new(),
            conditionals: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_cxx(&mut self, cxx: &str) {
        self.cxx = cxx.to_string();
    }

    pub fn set_make_info(&mut self, make: MakeInfo) {
        self.make = make;
    }

    pub fn set_on_duplicate(&mut self, policy: OnDuplicate) {
        self.on_duplicate = policy;
    }

    /// Leading comment line, e.g. a generator stamp.
    pub fn set_header<S: Into<String>>(&mut self, header: S) {
        self.header = Some(header.into());
    }

    /// A path is a valid directory reference if it names a real directory,
    /// is one of the builtin directory variables, or references a
    /// registered variable whose value is a real directory.
    pub fn check_dir(&self, path: &str) -> Result<()> {
        if BUILTIN_DIR_VARS.iter().any(|v| path == format!("$({v})")) {
            return Ok(());
        }
        let re = Regex::new(r".*\$+\((.+)\).*").unwrap();
        if let Some(cap) = re.captures(path) {
            let key = &cap[1];
            if BUILTIN_DIR_VARS.contains(&key) {
                return Ok(());
            }
            let var = self
                .vars
                .get(key)
                .ok_or_else(|| Error::UnknownVariable(key.to_string()))?;
            if Path::new(var.value()).is_dir() {
                return Ok(());
            }
            return Err(Error::VariableNotDir {
                key: key.to_string(),
                value: var.value().to_string(),
            });
        }
        if Path::new(path).is_dir() {
            Ok(())
        } else {
            Err(Error::InvalidDir(path.to_string()))
        }
    }

    pub fn add_var(&mut self, var: Var) -> Result<()> {
        if self.vars.contains_key(var.key()) {
            match self.on_duplicate {
                OnDuplicate::Skip => return Ok(()),
                OnDuplicate::Error => {
                    return Err(Error::DuplicateVariable(var.key().to_string()));
                }
            }
        }
        self.var_order.push(var.key().to_string());
        self.vars.insert(var.key().to_string(), var);
        Ok(())
    }

    /// Register a recursively expanded `KEY = VALUE` variable.
    pub fn add_variable(&mut self, key: &str, value: &str) -> Result<()> {
        self.add_var(Var::deferred(key, &[value])?)
    }

    pub fn add_include_dirs<S: AsRef<str>>(&mut self, entries: &[S]) -> Result<()> {
        for entry in entries {
            self.check_dir(entry.as_ref())?;
        }
        self.include_dirs
            .add_entries("include_dirs", "-I", self.on_duplicate, entries)
    }

    pub fn add_link_dirs<S: AsRef<str>>(&mut self, entries: &[S]) -> Result<()> {
        for entry in entries {
            self.check_dir(entry.as_ref())?;
        }
        self.link_dirs
            .add_entries("link_dirs", "-L", self.on_duplicate, entries)
    }

    pub fn add_cflags<S: AsRef<str>>(&mut self, entries: &[S]) -> Result<()> {
        self.cflags
            .add_entries("cflags", "", self.on_duplicate, entries)
    }

    pub fn add_cxxflags<S: AsRef<str>>(&mut self, entries: &[S]) -> Result<()> {
        self.cxxflags
            .add_entries("cxxflags", "", self.on_duplicate, entries)
    }

    pub fn add_ldflags<S: AsRef<str>>(&mut self, entries: &[S]) -> Result<()> {
        self.ldflags
            .add_entries("ldflags", "", self.on_duplicate, entries)
    }

    pub fn add_ldlibs<S: AsRef<str>>(&mut self, entries: &[S]) -> Result<()> {
        self.ldlibs
            .add_entries("ldlibs", "", self.on_duplicate, entries)
    }

    /// Add a target in one of three forms: deps only, recipe only, or both.
    /// Duplicate detection is by exact rendered text.
    pub fn add_target(
        &mut self,
        name: &str,
        recipe: Option<&str>,
        deps: Option<&[&str]>,
    ) -> Result<()> {
        let recipe = recipe.filter(|r| !r.is_empty());
        let deps = deps.filter(|d| !d.is_empty());
        let target = match (recipe, deps) {
            (None, None) => return Err(Error::EmptyTarget(name.to_string())),
            (Some(recipe), Some(deps)) => {
                format!("{name}: {}\n\t{recipe}", deps.join(" "))
            }
            (Some(recipe), None) => format!("{name}:\n\t{recipe}"),
            (None, Some(deps)) => format!("{name}: {}", deps.join(" ")),
        };
        if self.targets.contains(&target) {
            return Err(Error::DuplicateTarget(target));
        }
        self.targets.push(target);
        Ok(())
    }

    /// Add a pattern rule such as `%.o: %.cpp`. Both patterns must carry
    /// the `%` wildcard.
    pub fn add_pattern_rule(
        &mut self,
        target_pattern: &str,
        source_pattern: &str,
        recipe: &str,
    ) -> Result<()> {
        for (which, pattern) in [
            ("target pattern", target_pattern),
            ("source pattern", source_pattern),
        ] {
            if !pattern.contains('%') {
                return Err(Error::MissingWildcard {
                    which,
                    pattern: pattern.to_string(),
                });
            }
        }
        if recipe.is_empty() {
            return Err(Error::EmptyRecipe(target_pattern.to_string()));
        }
        let rule = format!("{target_pattern}: {source_pattern}\n\t{recipe}");
        if self.pattern_rules.contains(&rule) {
            return Err(Error::DuplicatePatternRule(rule));
        }
        self.pattern_rules.push(rule);
        Ok(())
    }

    /// Append a conditional block. Conditionals are allowed to repeat.
    pub fn add_conditional(
        &mut self,
        kind: CondKind,
        condition: &str,
        then_body: &str,
        else_body: Option<&str>,
    ) {
        let mut block = if kind.parenthesized() {
            format!("{} ({condition})\n", kind.directive())
        } else {
            format!("{} {condition}\n", kind.directive())
        };
        block.push_str(then_body);
        block.push('\n');
        if let Some(else_body) = else_body {
            block.push_str("else\n");
            block.push_str(else_body);
            block.push('\n');
        }
        block.push_str("endif");
        self.conditionals.push(block);
    }

    pub fn add_ifeq(&mut self, condition: &str, then_body: &str) {
        self.add_conditional(CondKind::IfEq, condition, then_body, None);
    }

    pub fn add_ifneq(&mut self, condition: &str, then_body: &str) {
        self.add_conditional(CondKind::IfNeq, condition, then_body, None);
    }

    pub fn add_ifdef(&mut self, condition: &str, then_body: &str) {
        self.add_conditional(CondKind::IfDef, condition, then_body, None);
    }

    pub fn add_ifndef(&mut self, condition: &str, then_body: &str) {
        self.add_conditional(CondKind::IfNdef, condition, then_body, None);
    }

    /// `include` directives; generation fails in make if one is missing.
    pub fn add_include<S: AsRef<str>>(&mut self, paths: &[S]) {
        for path in paths {
            self.includes.push(path.as_ref().to_string());
        }
    }

    /// `-include` directives; missing files are tolerated by make.
    pub fn add_include_optional<S: AsRef<str>>(&mut self, paths: &[S]) {
        for path in paths {
            self.includes_opt.push(path.as_ref().to_string());
        }
    }

    pub fn add_phony<S: AsRef<str>>(&mut self, names: &[S]) {
        for name in names {
            if !name.as_ref().is_empty() {
                self.phony.push(name.as_ref().to_string());
            }
        }
    }

    pub fn add_clean<S: AsRef<str>>(&mut self, entries: &[S]) {
        for entry in entries {
            if !entry.as_ref().is_empty() {
                self.clean.push(entry.as_ref().to_string());
            }
        }
    }

    /// Render the whole document to a string, e.g. for preview or tests.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        self.write_document(&mut MakefileWriter::new(&mut buf))
            .expect("in-memory write cannot fail");
        String::from_utf8(buf).expect("document is utf-8")
    }

    /// Write the document to its path and flush. Consumes the generator;
    /// the file handle is released when it drops.
    pub fn generate(self) -> Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = MakefileWriter::new(BufWriter::new(file));
        self.write_document(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_document<W: Write>(&self, w: &mut MakefileWriter<W>) -> io::Result<()> {
        if let Some(header) = &self.header {
            w.line(&format!("# {header}"))?;
            w.blank()?;
        }
        self.write_variables(w)?;
        self.write_includes(w)?;
        self.write_phony(w)?;
        self.write_conditionals(w)?;
        self.write_pattern_rules(w)?;
        self.write_targets(w)?;
        self.write_clean(w)?;
        Ok(())
    }

    fn write_variables<W: Write>(&self, w: &mut MakefileWriter<W>) -> io::Result<()> {
        if !self.var_order.is_empty() {
            w.line("# project variables")?;
            for key in self.var_order.iter() {
                let Some(var) = self.vars.get(key.as_str()) else {
                    continue;
                };
                w.line(&var.render(self.make))?;
            }
            w.blank()?;
        }

        if !self.include_dirs.is_empty() {
            w.line(&format!("INCLUDEDIRS = {}", self.include_dirs.join(" ")))?;
        }
        if !self.link_dirs.is_empty() {
            w.line(&format!("LINKDIRS = {}", self.link_dirs.join(" ")))?;
        }
        if !self.include_dirs.is_empty() || !self.link_dirs.is_empty() {
            w.blank()?;
        }

        w.line(&format!("CXX = {}", self.cxx))?;
        if !self.cflags.is_empty() {
            w.line(&format!("CFLAGS += {} $(INCLUDEDIRS)", self.cflags.join(" ")))?;
        }
        if !self.cxxflags.is_empty() {
            w.line(&format!(
                "CXXFLAGS += {} $(INCLUDEDIRS)",
                self.cxxflags.join(" ")
            ))?;
        }
        if !self.ldflags.is_empty() || !self.link_dirs.is_empty() {
            w.line(&format!("LDFLAGS += {} $(LINKDIRS)", self.ldflags.join(" ")))?;
        }
        if !self.ldlibs.is_empty() {
            w.line(&format!("LDLIBS = {}", self.ldlibs.join(" ")))?;
        }
        w.blank()?;
        Ok(())
    }

    fn write_includes<W: Write>(&self, w: &mut MakefileWriter<W>) -> io::Result<()> {
        if self.includes.is_empty() && self.includes_opt.is_empty() {
            return Ok(());
        }
        w.line("# includes")?;
        for path in self.includes.iter() {
            w.line(&format!("include {path}"))?;
        }
        for path in self.includes_opt.iter() {
            w.line(&format!("-include {path}"))?;
        }
        w.blank()?;
        Ok(())
    }

    fn write_phony<W: Write>(&self, w: &mut MakefileWriter<W>) -> io::Result<()> {
        if !self.phony.is_empty() {
            w.line(&format!(".PHONY: {}", self.phony.join(" ")))?;
            w.blank()?;
        }
        Ok(())
    }

    fn write_conditionals<W: Write>(&self, w: &mut MakefileWriter<W>) -> io::Result<()> {
        if self.conditionals.is_empty() {
            return Ok(());
        }
        w.line("# conditionals")?;
        for block in &self.conditionals {
            w.line(block)?;
            w.blank()?;
        }
        Ok(())
    }

    fn write_pattern_rules<W: Write>(&self, w: &mut MakefileWriter<W>) -> io::Result<()> {
        if self.pattern_rules.is_empty() {
            return Ok(());
        }
        w.line("# Pattern rules")?;
        for rule in self.pattern_rules.iter() {
            w.line(rule)?;
            w.blank()?;
        }
        Ok(())
    }

    fn write_targets<W: Write>(&self, w: &mut MakefileWriter<W>) -> io::Result<()> {
        // deliberately alphabetical by rendered text, not insertion order
        let mut targets: Vec<&String> = self.targets.iter().collect();
        targets.sort();
        for target in targets {
            w.line(target)?;
            w.blank()?;
        }
        Ok(())
    }

    fn write_clean<W: Write>(&self, w: &mut MakefileWriter<W>) -> io::Result<()> {
        if !self.clean.is_empty() {
            w.line(&format!("clean:\n\t@rm -rf {}", self.clean.join(" ")))?;
            w.blank()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_dir_accepts_builtin_variables() {
        let m = MakefileGenerator::new("Makefile");
        assert!(m.check_dir("$(CURDIR)").is_ok());
        assert!(m.check_dir("$(HOME)").is_ok());
        assert!(m.check_dir("$(PWD)").is_ok());
    }

    #[test]
    fn check_dir_resolves_user_variables() {
        let mut m = MakefileGenerator::new("Makefile");
        m.add_variable("PREFIX", "/tmp").unwrap();
        assert!(m.check_dir("$(PREFIX)").is_ok());

        m.add_variable("BROKEN", "/no/such/dir/at/all").unwrap();
        let err = m.check_dir("$(BROKEN)").unwrap_err();
        assert!(matches!(err, Error::VariableNotDir { .. }));

        let err = m.check_dir("$(NEVER_SET)").unwrap_err();
        assert!(matches!(err, Error::UnknownVariable(_)));
    }

    #[test]
    fn check_dir_rejects_missing_literal_path() {
        let m = MakefileGenerator::new("Makefile");
        assert!(m.check_dir("/tmp").is_ok());
        assert!(matches!(
            m.check_dir("/no/such/dir/at/all"),
            Err(Error::InvalidDir(_))
        ));
    }

    #[test]
    fn conditional_blocks_render_all_four_kinds() {
        let mut m = MakefileGenerator::new("Makefile");
        m.add_ifeq("$(CC),gcc", "CFLAGS += -Wall");
        m.add_ifneq("$(OS),Windows_NT", "RM = rm -f");
        m.add_ifdef("DEBUG", "CFLAGS += -g");
        m.add_ifndef("RELEASE", "CFLAGS += -O0");
        assert_eq!(m.conditionals[0], "ifeq ($(CC),gcc)\nCFLAGS += -Wall\nendif");
        assert_eq!(
            m.conditionals[1],
            "ifneq ($(OS),Windows_NT)\nRM = rm -f\nendif"
        );
        assert_eq!(m.conditionals[2], "ifdef DEBUG\nCFLAGS += -g\nendif");
        assert_eq!(m.conditionals[3], "ifndef RELEASE\nCFLAGS += -O0\nendif");
    }

    #[test]
    fn conditional_with_else_branch() {
        let mut m = MakefileGenerator::new("Makefile");
        m.add_conditional(
            CondKind::IfEq,
            "$(CC),gcc",
            "CFLAGS += -Wall",
            Some("CFLAGS += -Weverything"),
        );
        assert_eq!(
            m.conditionals[0],
            "ifeq ($(CC),gcc)\nCFLAGS += -Wall\nelse\nCFLAGS += -Weverything\nendif"
        );
    }

    #[test]
    fn identical_conditionals_may_repeat() {
        let mut m = MakefileGenerator::new("Makefile");
        m.add_ifdef("DEBUG", "CFLAGS += -g");
        m.add_ifdef("DEBUG", "CFLAGS += -g");
        assert_eq!(m.conditionals.len(), 2);
    }

    #[test]
    fn target_requires_recipe_or_deps() {
        let mut m = MakefileGenerator::new("Makefile");
        let err = m.add_target("all", None, None).unwrap_err();
        assert!(matches!(err, Error::EmptyTarget(_)));
    }

    #[test]
    fn empty_recipe_counts_as_absent() {
        let mut m = MakefileGenerator::new("Makefile");
        let err = m.add_target("x", Some(""), None).unwrap_err();
        assert!(matches!(err, Error::EmptyTarget(_)));
        assert!(m.targets.is_empty());

        m.add_target("x", Some(""), Some(&["dep"])).unwrap();
        assert_eq!(&m.targets[..], &["x: dep".to_string()]);
    }

    #[test]
    fn duplicate_target_text_is_rejected() {
        let mut m = MakefileGenerator::new("Makefile");
        m.add_target("all", None, Some(&["build", "test"])).unwrap();
        let err = m
            .add_target("all", None, Some(&["build", "test"]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTarget(_)));
    }

    #[test]
    fn pattern_rule_requires_wildcards_and_recipe() {
        let mut m = MakefileGenerator::new("Makefile");
        let err = m
            .add_pattern_rule("foo.o", "%.cpp", "$(CXX) -c $< -o $@")
            .unwrap_err();
        assert!(matches!(err, Error::MissingWildcard { .. }));
        let err = m
            .add_pattern_rule("%.o", "foo.cpp", "$(CXX) -c $< -o $@")
            .unwrap_err();
        assert!(matches!(err, Error::MissingWildcard { .. }));
        let err = m.add_pattern_rule("%.o", "%.cpp", "").unwrap_err();
        assert!(matches!(err, Error::EmptyRecipe(_)));
        assert!(m.pattern_rules.is_empty());

        m.add_pattern_rule("%.o", "%.cpp", "$(CXX) $(CXXFLAGS) -c $< -o $@")
            .unwrap();
        let err = m
            .add_pattern_rule("%.o", "%.cpp", "$(CXX) $(CXXFLAGS) -c $< -o $@")
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePatternRule(_)));
    }

    #[test]
    fn strict_mode_rejects_duplicate_flags() {
        let mut m = MakefileGenerator::new("Makefile");
        m.set_on_duplicate(OnDuplicate::Error);
        m.add_cxxflags(&["-O2"]).unwrap();
        let err = m.add_cxxflags(&["-O2"]).unwrap_err();
        assert!(matches!(err, Error::DuplicateEntry { .. }));
    }

    #[test]
    fn default_policy_skips_duplicate_flags() {
        let mut m = MakefileGenerator::new("Makefile");
        m.add_cxxflags(&["-O2", "-O2", "-Wall"]).unwrap();
        assert_eq!(&m.cxxflags[..], &["-O2".to_string(), "-Wall".to_string()]);
    }

    #[test]
    fn duplicate_variable_policy() {
        let mut m = MakefileGenerator::new("Makefile");
        m.add_variable("CC", "gcc").unwrap();
        m.add_variable("CC", "clang").unwrap();
        assert!(m.render().contains("CC = gcc"));

        m.set_on_duplicate(OnDuplicate::Error);
        let err = m.add_variable("CC", "clang").unwrap_err();
        assert!(matches!(err, Error::DuplicateVariable(_)));
    }
}
