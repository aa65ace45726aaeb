use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use nodewright::flake::{self, FlakeUpdate};
use nodewright::{Error, NodeIdentity};

use super::CmdResult;

#[derive(Args)]
pub struct RegisterArgs {
    /// Name of an existing node directory to register
    pub name: String,

    /// Monorepo root containing the node
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Master flake to register the node in (defaults to <root>/flake.nix)
    #[arg(long)]
    pub flake: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RegisterOutput {
    pub command: &'static str,
    pub node: NodeIdentity,
    pub flake: FlakeUpdate,
}

/// Register an already materialized node in the master flake.
///
/// Unlike `new`, a missing master flake is an error here: registration is
/// the entire operation, so there is nothing useful to fall back to.
pub fn run_json(args: RegisterArgs) -> CmdResult<RegisterOutput> {
    let node = NodeIdentity::new(&args.name)?;

    let flake_path = args
        .flake
        .unwrap_or_else(|| args.root.join("flake.nix"));
    if !flake_path.exists() {
        return Err(Error::validation_invalid_argument(
            "flake",
            "Master flake.nix not found",
            Some(flake_path.display().to_string()),
            None,
        ));
    }

    let flake = flake::patch_flake_file(&flake_path, &node)?;

    Ok((
        RegisterOutput {
            command: "register",
            node,
            flake,
        },
        0,
    ))
}
