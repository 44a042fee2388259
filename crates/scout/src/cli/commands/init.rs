//! Implementation of `scout init`.
//!
//! The written file lists every setting scout reads, each commented out at its default: the
//! three backend base addresses under `[endpoints]`, the request and cycle deadlines, default
//! return type, duplicate id field and print limit under `[search]`, and the two feature toggles.
//! Because nothing is active, a fresh file changes no behavior until a line is uncommented.
//! The global variant (`~/.scout.toml`) carries only the endpoints and deadlines, which are the
//! settings usually shared across projects.

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use scout_config::{CONFIG_FILENAME, global_config_path, global_template, local_template};
use scout_highlight::{Highlighter, indent, subheader};

use crate::cli::{args::InitCommand, context::CommandContext};

/// Which template to write and where.
#[derive(Debug, PartialEq, Eq)]
enum Target {
    /// `.scout.toml` in the working directory.
    Local(PathBuf),
    /// `~/.scout.toml`.
    Global(PathBuf),
}

impl Target {
    /// Destination file.
    fn path(&self) -> &Path {
        match self {
            Self::Local(path) | Self::Global(path) => path,
        }
    }

    /// Commented template text for this target.
    fn template(&self) -> String {
        match self {
            Self::Local(_) => local_template(),
            Self::Global(_) => global_template(),
        }
    }
}

/// Picks the target: global when asked for, or when run from the home directory itself, since a
/// local file there would be the global one anyway.
fn choose_target(
    cwd: &Path,
    global: bool,
    global_path: Option<PathBuf>,
) -> Result<Target, String> {
    let in_home = global_path
        .as_deref()
        .and_then(Path::parent)
        .is_some_and(|home| home == cwd);

    if global || in_home {
        global_path
            .map(Target::Global)
            .ok_or_else(|| "could not determine home directory".to_string())
    } else {
        Ok(Target::Local(cwd.join(CONFIG_FILENAME)))
    }
}

/// Writes a commented `.scout.toml` template and previews it.
pub fn run(ctx: &CommandContext, cmd: &InitCommand) -> ExitCode {
    let target = match choose_target(&ctx.cwd, cmd.global, global_config_path()) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let path = target.path();

    if path.exists() && !cmd.force {
        eprintln!("error: configuration file already exists: {}", path.display());
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    let template = target.template();
    if let Err(e) = fs::write(path, &template) {
        eprintln!("error: failed to write {}: {e}", path.display());
        return ExitCode::FAILURE;
    }

    println!("Created {}", path.display());
    println!();
    println!("{}", subheader("Configuration written:"));
    println!("{}", indent(&Highlighter::new().highlight_toml(&template)));

    ExitCode::SUCCESS
}
