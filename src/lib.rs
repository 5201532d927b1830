//! Direct-compilation side of makefilegen: the [`builder::Builder`]
//! assembles one compiler command line and shells it out, plus host
//! toolchain detection and the optional TOML build config.

pub mod builder;
pub mod config;
pub mod toolchain;
