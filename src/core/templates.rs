//! Per-kind file templates for generated node projects.
//!
//! Rendering is plain placeholder substitution (`{{key}}`) via
//! `utils::template::render`; there is no control flow in any template.

use crate::node::{NodeIdentity, NodeKind};
use crate::utils::template;

/// Placeholder keys used by the node templates.
pub struct TemplateVars;

impl TemplateVars {
    pub const NODE_NAME: &'static str = "nodeName";
    pub const NODE_TYPE: &'static str = "nodeType";
    pub const RUN_COMMAND: &'static str = "runCommand";
}

/// One rendered file of a node project, relative to the node directory.
#[derive(Debug)]
pub struct NodeFile {
    pub relative_path: &'static str,
    pub contents: String,
    pub executable: bool,
}

const BINARY_MAIN_TEMPLATE: &str = r#"use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = zenoh::Config::default();
    let session = zenoh::open(config).await?;
    println!("[{{nodeName}}] Session opened");

    let key_pub = "{{nodeName}}/data";
    let publisher = session.declare_publisher(key_pub).await?;
    println!("[{{nodeName}}] Publisher declared on '{}'", key_pub);

    let key_sub = "demo/helloworld";
    let subscriber = session.declare_subscriber(key_sub).await?;
    println!("[{{nodeName}}] Subscriber declared on '{}'", key_sub);

    // Wait for discovery
    tokio::time::sleep(Duration::from_millis(500)).await;

    let message = format!("Hello from {}!", "{{nodeName}}");
    publisher.put(&message).await?;
    println!("[{{nodeName}}] -> Published: '{}'", message);

    println!("[{{nodeName}}] <- Waiting for messages...");
    match tokio::time::timeout(Duration::from_secs(10), subscriber.recv_async()).await {
        Ok(Ok(sample)) => {
            let msg = sample.payload().try_to_string().unwrap_or_default();
            println!("[{{nodeName}}] <- Received: '{}'", msg);
        }
        Ok(Err(e)) => eprintln!("[{{nodeName}}] Error receiving: {}", e),
        Err(_) => println!("[{{nodeName}}] Timeout waiting for messages"),
    }

    println!("[{{nodeName}}] Done!");
    session.close().await?;
    Ok(())
}
"#;

const BINARY_MANIFEST_TEMPLATE: &str = r#"[package]
name = "{{nodeName}}"
version = "0.1.0"
edition = "2021"

[dependencies]
tokio = { version = "1", features = ["full"] }
zenoh = "1.0.0"

# The package name is the name of the binary the nix build produces.
[[bin]]
name = "{{nodeName}}"
path = "src/main.rs"
"#;

const BINARY_FLAKE_TEMPLATE: &str = r#"{
  description = "{{nodeName}} - Rust Zenoh node";

  inputs = {
    naersk.url = "github:nix-community/naersk";
    nixpkgs.url = "github:NixOS/nixpkgs/nixos-unstable";
    flake-utils.url = "github:numtide/flake-utils";
  };

  outputs = { self, nixpkgs, flake-utils, naersk }:
    flake-utils.lib.eachDefaultSystem (system:
      let
        pkgs = nixpkgs.legacyPackages.${system};
        naersk-lib = pkgs.callPackage naersk {};
      in
      {
        packages.default = naersk-lib.buildPackage {
          src = ./.;
          pname = "{{nodeName}}";
        };

        devShells.default = pkgs.mkShell {
          buildInputs = with pkgs; [
            cargo
            rustc
            rustfmt
            clippy
            rust-analyzer
          ];

          RUST_SRC_PATH = pkgs.rustPlatform.rustLibSrc;
        };

        apps.default = {
          type = "app";
          program = "${self.packages.${system}.default}/bin/{{nodeName}}";
        };
      }
    );
}
"#;

const SCRIPT_MAIN_TEMPLATE: &str = r#"#!/usr/bin/env python3
"""
{{nodeName}} - Python Zenoh node
"""
import time
import zenoh


def main():
    config = zenoh.Config()
    session = zenoh.open(config)
    print(f"[{{nodeName}}] Session opened")

    key_pub = "{{nodeName}}/data"
    pub = session.declare_publisher(key_pub)
    print(f"[{{nodeName}}] Publisher declared on '{key_pub}'")

    key_sub = "demo/helloworld"

    def listener(sample):
        payload = sample.payload.to_string()
        print(f"[{{nodeName}}] <- Received: '{payload}'")

    sub = session.declare_subscriber(key_sub, listener)
    print(f"[{{nodeName}}] Subscriber declared on '{key_sub}'")

    # Wait for discovery
    time.sleep(0.5)

    message = "Hello from {{nodeName}}!"
    pub.put(message)
    print(f"[{{nodeName}}] -> Published: '{message}'")

    print(f"[{{nodeName}}] <- Waiting for messages...")
    try:
        time.sleep(10)
    except KeyboardInterrupt:
        pass

    print(f"[{{nodeName}}] Done!")
    session.close()


if __name__ == "__main__":
    main()
"#;

const SCRIPT_FLAKE_TEMPLATE: &str = r#"{
  description = "{{nodeName}} - Python Zenoh node";

  inputs = {
    nixpkgs.url = "github:NixOS/nixpkgs/nixos-unstable";
    flake-utils.url = "github:numtide/flake-utils";
  };

  outputs = { self, nixpkgs, flake-utils }:
    flake-utils.lib.eachDefaultSystem (system:
      let
        pkgs = nixpkgs.legacyPackages.${system};

        pythonEnv = pkgs.python3.withPackages (ps: [
          ps.eclipse-zenoh
        ]);
      in
      {
        packages.default = pkgs.stdenv.mkDerivation {
          pname = "{{nodeName}}";
          version = "0.1.0";
          src = ./.;

          buildInputs = [ pythonEnv ];
          nativeBuildInputs = [ pkgs.makeWrapper ];

          installPhase = ''
            mkdir -p $out/bin
            cp src/main.py $out/bin/{{nodeName}}
            chmod +x $out/bin/{{nodeName}}

            wrapProgram $out/bin/{{nodeName}} \
              --prefix PATH : ${pythonEnv}/bin
          '';
        };

        devShells.default = pkgs.mkShell {
          buildInputs = [
            pythonEnv
            pkgs.ruff
          ];
        };

        apps.default = {
          type = "app";
          program = "${self.packages.${system}.default}/bin/{{nodeName}}";
        };
      }
    );
}
"#;

const GITIGNORE_TEMPLATE: &str = r#".direnv
.venv
__pycache__/
*.pyc
result
result-*
target/
.DS_Store
Cargo.lock
"#;

const README_TEMPLATE: &str = r#"# {{nodeName}}

A Zenoh {{nodeType}} node.

## Building

```bash
nix build
```

## Development

```bash
nix develop
```

## Running

```bash
nix run
```

Or directly:
```bash
{{runCommand}}
```
"#;

/// Render the full per-kind file set for one node.
pub fn render_node_files(node: &NodeIdentity, kind: NodeKind) -> Vec<NodeFile> {
    let run_command = match kind {
        NodeKind::Binary => "cargo run",
        NodeKind::Script => "python src/main.py",
    };
    let vars: &[(&str, &str)] = &[
        (TemplateVars::NODE_NAME, &node.raw_name),
        (TemplateVars::NODE_TYPE, kind.label()),
        (TemplateVars::RUN_COMMAND, run_command),
    ];

    let mut files = Vec::new();

    match kind {
        NodeKind::Binary => {
            files.push(NodeFile {
                relative_path: "src/main.rs",
                contents: template::render(BINARY_MAIN_TEMPLATE, vars),
                executable: false,
            });
            files.push(NodeFile {
                relative_path: "Cargo.toml",
                contents: template::render(BINARY_MANIFEST_TEMPLATE, vars),
                executable: false,
            });
            files.push(NodeFile {
                relative_path: "flake.nix",
                contents: template::render(BINARY_FLAKE_TEMPLATE, vars),
                executable: false,
            });
        }
        NodeKind::Script => {
            files.push(NodeFile {
                relative_path: "src/main.py",
                contents: template::render(SCRIPT_MAIN_TEMPLATE, vars),
                executable: true,
            });
            files.push(NodeFile {
                relative_path: "flake.nix",
                contents: template::render(SCRIPT_FLAKE_TEMPLATE, vars),
                executable: false,
            });
        }
    }

    files.push(NodeFile {
        relative_path: ".gitignore",
        contents: template::render(GITIGNORE_TEMPLATE, vars),
        executable: false,
    });
    files.push(NodeFile {
        relative_path: "README.md",
        contents: template::render(README_TEMPLATE, vars),
        executable: false,
    });

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> NodeIdentity {
        NodeIdentity::new(name).unwrap()
    }

    #[test]
    fn binary_kind_renders_five_files() {
        let files = render_node_files(&node("sensor1"), NodeKind::Binary);
        let paths: Vec<&str> = files.iter().map(|f| f.relative_path).collect();
        assert_eq!(
            paths,
            vec![
                "src/main.rs",
                "Cargo.toml",
                "flake.nix",
                ".gitignore",
                "README.md"
            ]
        );
    }

    #[test]
    fn script_kind_renders_four_files_with_executable_entry_point() {
        let files = render_node_files(&node("sensor1"), NodeKind::Script);
        let entry = files
            .iter()
            .find(|f| f.relative_path == "src/main.py")
            .unwrap();
        assert!(entry.executable);
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn rendered_files_contain_no_leftover_placeholders() {
        for kind in [NodeKind::Binary, NodeKind::Script] {
            for file in render_node_files(&node("sensor1"), kind) {
                assert!(
                    !file.contents.contains("{{"),
                    "unrendered placeholder in {}",
                    file.relative_path
                );
            }
        }
    }

    #[test]
    fn manifest_names_the_binary_after_the_node() {
        let files = render_node_files(&node("sensor1"), NodeKind::Binary);
        let manifest = files
            .iter()
            .find(|f| f.relative_path == "Cargo.toml")
            .unwrap();
        assert!(manifest.contents.contains("name = \"sensor1\""));
    }

    #[test]
    fn readme_describes_kind_and_run_command() {
        let files = render_node_files(&node("sensor1"), NodeKind::Script);
        let readme = files
            .iter()
            .find(|f| f.relative_path == "README.md")
            .unwrap();
        assert!(readme.contents.contains("A Zenoh Python node."));
        assert!(readme.contents.contains("python src/main.py"));
    }
}
