use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use nodewright::flake::{self, FlakeUpdate};
use nodewright::{materialize, NodeIdentity, NodeKind};

use super::CmdResult;

#[derive(Args)]
pub struct NewArgs {
    /// Node name, used verbatim as the directory and binary name
    pub name: String,

    /// Node kind: binary (Rust) or script (Python)
    #[arg(default_value = "binary")]
    pub kind: String,

    /// Monorepo root to create the node under
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Master flake to register the node in (defaults to <root>/flake.nix)
    #[arg(long)]
    pub flake: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct NewOutput {
    pub command: &'static str,
    pub node: NodeIdentity,
    pub kind: String,
    pub path: String,
    pub files: Vec<String>,
    pub flake: FlakeUpdate,
    pub next_steps: Vec<String>,
}

pub fn run_json(args: NewArgs) -> CmdResult<NewOutput> {
    let kind = NodeKind::parse(&args.kind)?;
    let node = NodeIdentity::new(&args.name)?;

    let node_dir = args.root.join(&node.raw_name);
    let written = materialize::materialize(&args.root, &node, kind)?;
    nodewright::log_status!(
        "new",
        "Created {} node '{}' at {}",
        kind.label(),
        node.raw_name,
        node_dir.display()
    );

    let flake_path = args
        .flake
        .unwrap_or_else(|| args.root.join("flake.nix"));
    let flake = flake::patch_flake_file(&flake_path, &node)?;

    let mut next_steps = vec![
        format!("cd {}", node_dir.display()),
        "nix develop        # Enter dev shell".to_string(),
    ];
    match kind {
        NodeKind::Binary => {
            next_steps.push("cargo build        # Build the project".to_string());
            next_steps.push("cargo run          # Run the node".to_string());
        }
        NodeKind::Script => {
            next_steps.push("python src/main.py       # Run the node".to_string());
        }
    }

    Ok((
        NewOutput {
            command: "new",
            kind: kind.to_string(),
            path: node_dir.display().to_string(),
            files: written
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            node,
            flake,
            next_steps,
        },
        0,
    ))
}
