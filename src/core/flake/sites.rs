//! Insertion-site table for the master flake.
//!
//! Each site is one section of the master flake that must reference every
//! node: the flake inputs, the outputs parameter list, the getter bindings,
//! the package re-exports, the demo launcher's runtime inputs, the launch
//! script itself, and the dev-shell package list.
//!
//! A site is an anchor pattern of exactly three capture groups,
//! `(prefix)(body)(suffix)`, plus a presence-check key and a fragment
//! builder. Matching yields the body span; the fragment is spliced at the
//! end of the body, immediately before the suffix. Existing text is never
//! reordered or rewritten.

use regex::Regex;

use crate::node::NodeIdentity;

pub(crate) struct Site {
    pub name: &'static str,
    pattern: &'static str,
    pub presence_key: fn(&NodeIdentity) -> String,
    pub fragment: fn(&NodeIdentity) -> String,
}

pub(crate) struct SiteMatch {
    pub body_start: usize,
    pub body_end: usize,
}

impl Site {
    /// Locate this site's anchor in the document.
    ///
    /// Returns `None` when the anchor is absent; callers treat that as a
    /// skippable condition, not an error.
    pub fn find(&self, document: &str) -> Option<SiteMatch> {
        let re = Regex::new(self.pattern).ok()?;
        let caps = re.captures(document)?;
        let body = caps.get(2)?;
        Some(SiteMatch {
            body_start: body.start(),
            body_end: body.end(),
        })
    }
}

fn key_safe_name(node: &NodeIdentity) -> String {
    node.safe_name.clone()
}

fn key_getter(node: &NodeIdentity) -> String {
    node.getter()
}

fn key_package_export(node: &NodeIdentity) -> String {
    format!("{}App", node.safe_name)
}

fn key_pid_var(node: &NodeIdentity) -> String {
    node.pid_var()
}

fn fragment_input(node: &NodeIdentity) -> String {
    format!("\n    {}.url = \"./{}\";", node.safe_name, node.raw_name)
}

fn fragment_output_param(node: &NodeIdentity) -> String {
    format!(", {}", node.safe_name)
}

fn fragment_getter(node: &NodeIdentity) -> String {
    format!(
        "\n        {} = {}.packages.${{system}}.default or null;",
        node.getter(),
        node.safe_name
    )
}

fn fragment_package_export(node: &NodeIdentity) -> String {
    format!("\n          {}App = {};", node.safe_name, node.getter())
}

fn fragment_runtime_input(node: &NodeIdentity) -> String {
    format!("\n              {}", node.getter())
}

fn fragment_launch(node: &NodeIdentity) -> String {
    format!(
        "\n              ${{pkgs.lib.optionalString ({getter} != null) ''\n                echo \"Starting {name}...\"\n                ${{{getter}}}/bin/{name} &\n                {pid}=$!\n              ''}}",
        getter = node.getter(),
        name = node.raw_name,
        pid = node.pid_var(),
    )
}

fn fragment_dev_shell(node: &NodeIdentity) -> String {
    format!("\n            {}", node.getter())
}

/// The ordered insertion sites, applied as a fold over the document.
pub(crate) const SITES: &[Site] = &[
    Site {
        name: "inputs",
        pattern: r"(?s)(inputs\s*=\s*\{)([^}]*?)(\s*\};)",
        presence_key: key_safe_name,
        fragment: fragment_input,
    },
    Site {
        name: "outputs-params",
        pattern: r"(outputs\s*=\s*\{\s*)([^}]+?)(\s*\}:)",
        presence_key: key_safe_name,
        fragment: fragment_output_param,
    },
    Site {
        name: "helpers",
        pattern: r"(?s)(# Helper to safely get packages from subflakes)(.*?)(\n\s*in\b)",
        presence_key: key_getter,
        fragment: fragment_getter,
    },
    Site {
        name: "packages",
        pattern: r"(?s)(packages\s*=\s*\{[^}]*?# Re-export subproject packages)(.*?)(\n[ \t]*# Combined launcher)",
        presence_key: key_package_export,
        fragment: fragment_package_export,
    },
    Site {
        name: "runtime-inputs",
        pattern: r"(?s)(runtimeInputs\s*=\s*pkgs\.lib\.filter\s*\(x: x != null\)\s*\[)(.*?)(\n\s*\];)",
        presence_key: key_getter,
        fragment: fragment_runtime_input,
    },
    Site {
        name: "launch-script",
        pattern: r#"(?s)(# Launch applications)(.*?)(\n\s*echo ""\n\s*echo "✓ All applications running")"#,
        presence_key: key_pid_var,
        fragment: fragment_launch,
    },
    Site {
        name: "dev-shell",
        pattern: r"(?s)(devShells\.default\s*=\s*pkgs\.mkShell\s*\{[^}]*?packages\s*=\s*\[)([^\]]*?)(\n\s*\]\s*\+\+\s*pkgs\.lib\.filter)",
        presence_key: key_getter,
        fragment: fragment_dev_shell,
    },
];
