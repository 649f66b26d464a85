//! Command-line surface.
//!
//! Options must come before the module path. Everything after it belongs to
//! the guest, including arguments that look like options.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::capability::Preload;
use crate::capability::Preopen;
use crate::capability::Utf8;
use crate::launcher::LaunchConfig;

pub const USAGE: &str = "usage: wasmexec [OPTIONS] <WASM> [ARGS]...";

#[derive(Parser, Debug)]
#[command(
    name = "wasmexec",
    version,
    about = "Runs a WebAssembly binary with host filesystem, clock, random, argv and env",
    override_usage = "wasmexec [OPTIONS] <WASM> [ARGS]..."
)]
pub struct Cli {
    /// Grant a host directory to the guest, optionally under another name
    #[arg(long = "dir", value_name = "HOST[::GUEST]")]
    pub dirs: Vec<Preopen>,

    /// Link an auxiliary module under NAME before the main module
    #[arg(long = "preload", value_name = "NAME=PATH")]
    pub preloads: Vec<Preload>,

    /// The module to run, followed by its arguments
    #[arg(value_name = "WASM", trailing_var_arg = true)]
    pub module_and_args: Vec<OsString>,
}

impl Cli {
    /// Splits off the module path. `None` means no module was given.
    pub fn into_config(self, utf8: &Utf8) -> Option<LaunchConfig> {
        let mut rest = self.module_and_args.into_iter();
        let module = PathBuf::from(rest.next()?);
        let argv = rest.map(|arg| utf8.decode_os(&arg)).collect();
        Some(LaunchConfig {
            module,
            argv,
            preopens: self.dirs,
            preloads: self.preloads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Option<LaunchConfig> {
        Cli::try_parse_from(std::iter::once("wasmexec").chain(args.iter().copied()))
            .unwrap()
            .into_config(&Utf8)
    }

    #[test]
    fn no_module_is_none() {
        assert_eq!(parse(&[]), None);
        assert_eq!(parse(&["--dir", "/tmp"]), None);
    }

    #[test]
    fn module_path_is_not_forwarded() {
        let config = parse(&["prog.wasm", "a", "b"]).unwrap();
        assert_eq!(config.module, PathBuf::from("prog.wasm"));
        assert_eq!(config.argv, ["a", "b"]);
    }

    #[test]
    fn guest_arguments_keep_order_and_dashes() {
        let config = parse(&["prog.wasm", "--dir", "x", "-v", "last"]).unwrap();
        assert_eq!(config.argv, ["--dir", "x", "-v", "last"]);
        assert!(config.preopens.is_empty());
    }

    #[test]
    fn options_before_module() {
        let config = parse(&[
            "--dir",
            "./data::/data",
            "--preload",
            "lib=lib.wasm",
            "prog.wasm",
        ])
        .unwrap();
        assert_eq!(config.preopens, [Preopen::new("./data", "/data")]);
        assert_eq!(config.preloads[0].name, "lib");
        assert!(config.argv.is_empty());
    }

    #[test]
    fn bad_option_value_is_rejected() {
        let result = Cli::try_parse_from(["wasmexec", "--preload", "nonsense", "prog.wasm"]);
        assert!(result.is_err());
    }
}
