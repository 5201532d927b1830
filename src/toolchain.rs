use std::process::Command;

use regex::Regex;
use tracing::warn;

use makefile_model::MakeInfo;

/// Query `make -v` once at startup. The version gates the `define` header
/// spelling; a missing tool falls back to [`MakeInfo::default`] downstream.
pub fn detect_make() -> Option<MakeInfo> {
    let output = Command::new("make").arg("-v").output().ok()?;
    let banner = String::from_utf8_lossy(&output.stdout);
    let info = parse_make_banner(&banner);
    if info.is_none() {
        warn!("could not parse make version from: {}", banner.lines().next().unwrap_or(""));
    }
    info
}

fn parse_make_banner(banner: &str) -> Option<MakeInfo> {
    let re = Regex::new(r"GNU Make (\d+\.\d+)").unwrap();
    let caps = re.captures(banner)?;
    let version: f64 = caps[1].parse().ok()?;
    Some(MakeInfo::new(version))
}
