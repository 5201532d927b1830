use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::builder::Builder;
use makefile_model::MakefileGenerator;

/// Optional TOML build config, applied before the command-line arguments.
#[derive(Debug, Default, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub build: BuildSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    pub cc: Option<String>,
    pub cxx: Option<String>,
    pub cppfiles: Vec<String>,
    pub include_dirs: Vec<String>,
    pub cflags: Vec<String>,
    pub cxxflags: Vec<String>,
    pub link_dirs: Vec<String>,
    pub ldflags: Vec<String>,
    pub ldlibs: Vec<String>,
    pub cleanup: Vec<String>,
}

impl BuildConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn apply_to_builder(&self, builder: &mut Builder) -> makefile_model::Result<()> {
        let build = &self.build;
        if let Some(cc) = &build.cc {
            builder.set_cc(cc);
        }
        if let Some(cxx) = &build.cxx {
            builder.set_cxx(cxx);
        }
        builder.add_cppfiles(&build.cppfiles)?;
        builder.add_include_dirs(&build.include_dirs)?;
        builder.add_cflags(&build.cflags)?;
        builder.add_cxxflags(&build.cxxflags)?;
        builder.add_link_dirs(&build.link_dirs)?;
        builder.add_ldflags(&build.ldflags)?;
        builder.add_ldlibs(&build.ldlibs)?;
        builder.add_cleanup_patterns(&build.cleanup)?;
        Ok(())
    }

    pub fn apply_to_generator(
        &self,
        generator: &mut MakefileGenerator,
    ) -> makefile_model::Result<()> {
        let build = &self.build;
        if let Some(cxx) = &build.cxx {
            generator.set_cxx(cxx);
        }
        generator.add_include_dirs(&build.include_dirs)?;
        generator.add_cflags(&build.cflags)?;
        generator.add_cxxflags(&build.cxxflags)?;
        generator.add_link_dirs(&build.link_dirs)?;
        generator.add_ldflags(&build.ldflags)?;
        generator.add_ldlibs(&build.ldlibs)?;
        Ok(())
    }
}
