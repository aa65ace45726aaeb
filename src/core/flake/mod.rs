//! Master-flake aggregator patcher.
//!
//! The monorepo's root `flake.nix` wires every node project into one build
//! and launch graph. Rather than parsing Nix, this module performs anchored
//! text insertion: each known section is located by a fixed pattern, checked
//! for the node's identifier, and extended with a generated fragment only
//! when absent. Sections are independent: a missing anchor skips that
//! section and the rest still apply. Re-running the patch for the same node
//! is a guaranteed no-op.

mod sites;

use std::path::Path;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::node::NodeIdentity;
use crate::utils::io;

use sites::SITES;

/// What happened at one insertion site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteOutcome {
    Applied,
    AlreadyPresent,
    AnchorMissing,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteReport {
    pub site: &'static str,
    pub outcome: SiteOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchReport {
    pub changed: bool,
    pub sites: Vec<SiteReport>,
}

/// Result of patching the master flake on disk.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlakeUpdate {
    pub path: String,
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    pub sites: Vec<SiteReport>,
}

/// Apply every insertion site for `node` to `document`.
///
/// Returns the (possibly unchanged) document together with a per-site
/// report. The document is only considered changed when the final text
/// differs byte-for-byte from the input.
pub fn patch(document: &str, node: &NodeIdentity) -> Result<(String, PatchReport)> {
    detect_symbol_collision(document, node)?;

    let mut doc = document.to_string();
    let mut reports = Vec::with_capacity(SITES.len());

    for site in SITES {
        let outcome = match site.find(&doc) {
            None => {
                crate::log_status!("flake", "Section '{}' not found; skipping", site.name);
                SiteOutcome::AnchorMissing
            }
            Some(m) => {
                let body = &doc[m.body_start..m.body_end];
                if body.contains(&(site.presence_key)(node)) {
                    SiteOutcome::AlreadyPresent
                } else {
                    doc.insert_str(m.body_end, &(site.fragment)(node));
                    SiteOutcome::Applied
                }
            }
        };
        reports.push(SiteReport {
            site: site.name,
            outcome,
        });
    }

    let changed = doc != document;
    Ok((
        doc,
        PatchReport {
            changed,
            sites: reports,
        },
    ))
}

/// Patch the master flake at `path` for `node`, writing back only when the
/// content changed.
///
/// A missing file is a soft skip: registration is not possible, but the
/// caller's scaffolding still succeeds. The write is atomic (temp file +
/// rename), so a crash mid-operation never leaves a partial flake.
pub fn patch_flake_file(path: &Path, node: &NodeIdentity) -> Result<FlakeUpdate> {
    if !path.exists() {
        crate::log_status!(
            "flake",
            "Master flake not found at {}; skipping registration",
            path.display()
        );
        return Ok(FlakeUpdate {
            path: path.display().to_string(),
            updated: false,
            skipped: Some("master flake.nix not found".to_string()),
            sites: Vec::new(),
        });
    }

    let document = io::read_file(path, "read master flake")?;
    let (patched, report) = patch(&document, node)?;

    if report.changed {
        io::write_file_atomic(path, &patched, "write master flake")?;
        crate::log_status!("flake", "Registered '{}' in {}", node.raw_name, path.display());
    } else {
        crate::log_status!(
            "flake",
            "'{}' already registered in {}",
            node.raw_name,
            path.display()
        );
    }

    Ok(FlakeUpdate {
        path: path.display().to_string(),
        updated: report.changed,
        skipped: None,
        sites: report.sites,
    })
}

/// Detect two distinct raw names normalizing to the same flake identifier.
///
/// The inputs section records the raw directory name next to the sanitized
/// identifier (`<safe>.url = "./<raw>";`), so a mismatch there means the
/// identifier already belongs to another node. Without this check the
/// presence tests would silently treat the second node as registered.
fn detect_symbol_collision(document: &str, node: &NodeIdentity) -> Result<()> {
    let pattern = format!(
        r#"(?m)^\s*{}\.url\s*=\s*"\./([^"]+)";"#,
        regex::escape(&node.safe_name)
    );
    let re = Regex::new(&pattern)
        .map_err(|e| Error::internal_unexpected(format!("collision probe: {}", e)))?;

    if let Some(caps) = re.captures(document) {
        let registered = caps
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or_default();
        if registered != node.raw_name {
            return Err(Error::flake_duplicate_symbol(
                &node.safe_name,
                &node.raw_name,
                registered,
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER_FLAKE: &str = r#"{
  description = "Zenoh node monorepo";

  inputs = {
    nixpkgs.url = "github:NixOS/nixpkgs/nixos-unstable";
    flake-utils.url = "github:numtide/flake-utils";
  };

  outputs = { self, nixpkgs, flake-utils }:
    flake-utils.lib.eachDefaultSystem (system:
      let
        pkgs = nixpkgs.legacyPackages.${system};

        # Helper to safely get packages from subflakes
      in
      {
        packages = {
          # Re-export subproject packages

          # Combined launcher
          demo = pkgs.writeShellApplication {
            name = "demo";
            runtimeInputs = pkgs.lib.filter (x: x != null) [
            ];
            text = ''
              echo "Launching demo..."

              # Launch applications

              echo ""
              echo "✓ All applications running"
              wait
            '';
          };
        };

        devShells.default = pkgs.mkShell {
          packages = [
            pkgs.nixpkgs-fmt
          ] ++ pkgs.lib.filter (x: x != null) [
          ];
        };
      }
    );
}
"#;

    fn node(name: &str) -> NodeIdentity {
        NodeIdentity::new(name).unwrap()
    }

    #[test]
    fn patch_applies_every_site_once() {
        let (out, report) = patch(MASTER_FLAKE, &node("sensor1")).unwrap();

        assert!(report.changed);
        assert_eq!(report.sites.len(), 7);
        for site in &report.sites {
            assert_eq!(site.outcome, SiteOutcome::Applied, "site {}", site.site);
        }

        assert!(out.contains("sensor1.url = \"./sensor1\";"));
        assert!(out.contains("outputs = { self, nixpkgs, flake-utils, sensor1 }:"));
        assert!(out.contains("getSensor1 = sensor1.packages.${system}.default or null;"));
        assert!(out.contains("sensor1App = getSensor1;"));
        assert!(out.contains("SENSOR1_PID=$!"));
        assert!(out.contains("${getSensor1}/bin/sensor1 &"));

        // The getter appears once per referencing section: helper binding,
        // package export, runtime inputs, launch guard, launch path, shell.
        assert_eq!(out.matches("getSensor1").count(), 6);
    }

    #[test]
    fn patch_is_idempotent() {
        let (once, first) = patch(MASTER_FLAKE, &node("sensor1")).unwrap();
        assert!(first.changed);

        let (twice, second) = patch(&once, &node("sensor1")).unwrap();
        assert!(!second.changed);
        assert_eq!(once, twice);
        for site in &second.sites {
            assert_eq!(
                site.outcome,
                SiteOutcome::AlreadyPresent,
                "site {}",
                site.site
            );
        }
    }

    #[test]
    fn patch_appends_new_fragments_after_existing_ones() {
        let (with_alpha, _) = patch(MASTER_FLAKE, &node("alpha")).unwrap();
        let (with_both, report) = patch(&with_alpha, &node("beta")).unwrap();

        assert!(report.changed);
        let alpha_input = with_both.find("alpha.url").unwrap();
        let beta_input = with_both.find("beta.url").unwrap();
        assert!(alpha_input < beta_input);

        let alpha_getter = with_both.find("getAlpha =").unwrap();
        let beta_getter = with_both.find("getBeta =").unwrap();
        assert!(alpha_getter < beta_getter);
    }

    #[test]
    fn missing_anchors_skip_only_their_site() {
        let doc = "before\ninputs = {\n  };\nafter\n";
        let (out, report) = patch(doc, &node("sensor1")).unwrap();

        assert!(report.changed);
        let applied: Vec<&str> = report
            .sites
            .iter()
            .filter(|s| s.outcome == SiteOutcome::Applied)
            .map(|s| s.site)
            .collect();
        assert_eq!(applied, vec!["inputs"]);
        assert_eq!(
            report
                .sites
                .iter()
                .filter(|s| s.outcome == SiteOutcome::AnchorMissing)
                .count(),
            6
        );

        // Everything outside the matched section is byte-identical.
        assert_eq!(
            out,
            "before\ninputs = {\n    sensor1.url = \"./sensor1\";\n  };\nafter\n"
        );
    }

    #[test]
    fn document_without_any_anchor_is_untouched() {
        let doc = "# ordinary readme\nnothing to see here\n";
        let (out, report) = patch(doc, &node("sensor1")).unwrap();

        assert!(!report.changed);
        assert_eq!(out, doc);
        for site in &report.sites {
            assert_eq!(site.outcome, SiteOutcome::AnchorMissing);
        }
    }

    #[test]
    fn colliding_safe_names_raise_duplicate_symbol() {
        // Both raw names sanitize to `node_a`.
        let (with_first, _) = patch(MASTER_FLAKE, &node("node!a")).unwrap();

        let err = patch(&with_first, &node("node?a")).unwrap_err();
        assert_eq!(err.code.as_str(), "flake.duplicate_symbol");

        let registered = err
            .details
            .get("registered")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        assert_eq!(registered, "node!a");
    }

    #[test]
    fn rerun_with_same_raw_name_is_not_a_collision() {
        let (with_first, _) = patch(MASTER_FLAKE, &node("node!a")).unwrap();
        let (again, report) = patch(&with_first, &node("node!a")).unwrap();

        assert!(!report.changed);
        assert_eq!(with_first, again);
    }

    #[test]
    fn launch_fragment_uses_shell_safe_pid_variable() {
        let (out, _) = patch(MASTER_FLAKE, &node("my-sensor")).unwrap();
        assert!(out.contains("MY_SENSOR_PID=$!"));
        assert!(!out.contains("MY-SENSOR_PID"));
    }

    #[test]
    fn patch_flake_file_skips_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flake.nix");

        let update = patch_flake_file(&path, &node("sensor1")).unwrap();
        assert!(!update.updated);
        assert!(update.skipped.is_some());
        assert!(update.sites.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn patch_flake_file_writes_once_then_noops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flake.nix");
        std::fs::write(&path, MASTER_FLAKE).unwrap();

        let first = patch_flake_file(&path, &node("sensor1")).unwrap();
        assert!(first.updated);
        let after_first = std::fs::read_to_string(&path).unwrap();
        assert!(after_first.contains("getSensor1"));

        let second = patch_flake_file(&path, &node("sensor1")).unwrap();
        assert!(!second.updated);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
    }
}
