use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use makefile_model::{MakefileGenerator, OnDuplicate};
use makefilegen::builder::Builder;
use makefilegen::config::BuildConfig;
use makefilegen::toolchain;

#[derive(Parser)]
#[command(
    name = "makefilegen",
    version,
    about = "Makefile generator / direct compilation tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Direct compilation using the Builder
    Build(BuildArgs),
    /// Generate a Makefile
    Makefile(MakefileArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// Output target name
    target: String,
    /// C++ source files
    #[arg(short = 'c', long, num_args = 0..)]
    cppfiles: Vec<String>,
    /// C compiler (default: gcc)
    #[arg(long)]
    cc: Option<String>,
    /// C++ compiler (default: g++)
    #[arg(long)]
    cxx: Option<String>,
    /// Include directories
    #[arg(short = 'I', long, num_args = 0..)]
    include_dirs: Vec<String>,
    /// C compiler flags (repeat the option or comma-join the tokens)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    cflags: Vec<String>,
    /// C++ compiler flags
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    cxxflags: Vec<String>,
    /// Link directories
    #[arg(short = 'L', long, num_args = 0..)]
    link_dirs: Vec<String>,
    /// Linker flags
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    ldflags: Vec<String>,
    /// Link libraries
    #[arg(short = 'l', long, value_delimiter = ',', allow_hyphen_values = true)]
    ldlibs: Vec<String>,
    /// Post-build cleanup glob patterns
    #[arg(long, num_args = 0..)]
    cleanup: Vec<String>,
    /// Error on duplicate entries instead of skipping them
    #[arg(long)]
    strict: bool,
    /// Show command without executing
    #[arg(long)]
    dry_run: bool,
    /// TOML build config, applied before the flags above
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct MakefileArgs {
    /// Output Makefile path
    #[arg(short = 'o', long, default_value = "Makefile")]
    output: PathBuf,
    /// C++ compiler (default: g++)
    #[arg(long)]
    cxx: Option<String>,
    /// Include directories
    #[arg(short = 'I', long, num_args = 0..)]
    include_dirs: Vec<String>,
    /// C compiler flags (repeat the option or comma-join the tokens)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    cflags: Vec<String>,
    /// C++ compiler flags
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    cxxflags: Vec<String>,
    /// Link directories
    #[arg(short = 'L', long, num_args = 0..)]
    link_dirs: Vec<String>,
    /// Linker flags
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    ldflags: Vec<String>,
    /// Link libraries
    #[arg(short = 'l', long, value_delimiter = ',', allow_hyphen_values = true)]
    ldlibs: Vec<String>,
    /// Variables (KEY=VALUE format)
    #[arg(short = 'D', long, num_args = 0..)]
    variables: Vec<String>,
    /// Targets (name:deps:recipe format)
    #[arg(short = 't', long, num_args = 0..)]
    targets: Vec<String>,
    /// Pattern rules (target_pattern:source_pattern:recipe format)
    #[arg(short = 'p', long, num_args = 0..)]
    pattern_rules: Vec<String>,
    /// Phony target names
    #[arg(long, num_args = 0..)]
    phony: Vec<String>,
    /// Clean patterns/files
    #[arg(long, num_args = 0..)]
    clean: Vec<String>,
    /// Required include directives
    #[arg(long, num_args = 0..)]
    include: Vec<String>,
    /// Optional include directives (rendered as -include)
    #[arg(long, num_args = 0..)]
    include_optional: Vec<String>,
    /// Error on duplicate entries instead of skipping them
    #[arg(long)]
    strict: bool,
    /// TOML build config, applied before the flags above
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => cmd_build(args),
        Command::Makefile(args) => cmd_makefile(args),
    }
}

fn duplicate_policy(strict: bool) -> OnDuplicate {
    if strict {
        OnDuplicate::Error
    } else {
        OnDuplicate::Skip
    }
}

fn cmd_build(args: BuildArgs) -> Result<()> {
    let mut builder = Builder::new(&args.target).on_duplicate(duplicate_policy(args.strict));
    if let Some(path) = &args.config {
        BuildConfig::load(path)?.apply_to_builder(&mut builder)?;
    }
    if let Some(cc) = &args.cc {
        builder.set_cc(cc);
    }
    if let Some(cxx) = &args.cxx {
        builder.set_cxx(cxx);
    }
    builder.add_cppfiles(&args.cppfiles)?;
    builder.add_include_dirs(&args.include_dirs)?;
    builder.add_cflags(&args.cflags)?;
    builder.add_cxxflags(&args.cxxflags)?;
    builder.add_link_dirs(&args.link_dirs)?;
    builder.add_ldflags(&args.ldflags)?;
    builder.add_ldlibs(&args.ldlibs)?;
    builder.add_cleanup_patterns(&args.cleanup)?;
    builder.build(args.dry_run)?;
    Ok(())
}

fn cmd_makefile(args: MakefileArgs) -> Result<()> {
    let mut generator = MakefileGenerator::new(&args.output);
    generator.set_on_duplicate(duplicate_policy(args.strict));
    generator.set_header(format!(
        "generated by makefilegen v{} on {}",
        env!("CARGO_PKG_VERSION"),
        Local::now().format("%Y-%m-%d")
    ));
    if let Some(make) = toolchain::detect_make() {
        generator.set_make_info(make);
    }
    if let Some(path) = &args.config {
        BuildConfig::load(path)?.apply_to_generator(&mut generator)?;
    }
    if let Some(cxx) = &args.cxx {
        generator.set_cxx(cxx);
    }
    generator.add_include_dirs(&args.include_dirs)?;
    generator.add_cflags(&args.cflags)?;
    generator.add_cxxflags(&args.cxxflags)?;
    generator.add_link_dirs(&args.link_dirs)?;
    generator.add_ldflags(&args.ldflags)?;
    generator.add_ldlibs(&args.ldlibs)?;

    for var_def in &args.variables {
        if let Some((key, value)) = var_def.split_once('=') {
            generator.add_variable(key.trim(), value.trim())?;
        }
    }

    for target_def in &args.targets {
        let mut parts = target_def.splitn(3, ':');
        let name = parts.next().unwrap_or("").trim();
        let deps: Option<Vec<&str>> = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.split_whitespace().collect());
        let recipe = parts.next().map(str::trim).filter(|s| !s.is_empty());
        generator.add_target(name, recipe, deps.as_deref())?;
    }

    for pattern_def in &args.pattern_rules {
        let parts: Vec<&str> = pattern_def.splitn(3, ':').collect();
        if parts.len() != 3 {
            bail!(
                "pattern rule must have format 'target_pattern:source_pattern:recipe', got: {pattern_def}"
            );
        }
        generator.add_pattern_rule(parts[0].trim(), parts[1].trim(), parts[2].trim())?;
    }

    generator.add_phony(&args.phony);
    generator.add_clean(&args.clean);
    generator.add_include(&args.include);
    generator.add_include_optional(&args.include_optional);

    let output = generator.path().to_path_buf();
    generator.generate()?;
    info!("Generated Makefile: {}", output.display());
    Ok(())
}
