//! Node project materialization: directory tree plus rendered files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::node::{NodeIdentity, NodeKind};
use crate::templates;
use crate::utils::io;

/// Create `<root>/<raw_name>/` and write the rendered file set for `kind`.
///
/// Fails with `node.already_exists` before any write if the target
/// directory is already present. Returns the paths written, in order.
pub fn materialize(root: &Path, node: &NodeIdentity, kind: NodeKind) -> Result<Vec<PathBuf>> {
    let node_dir = root.join(&node.raw_name);
    if node_dir.exists() {
        return Err(Error::node_already_exists(
            &node.raw_name,
            node_dir.display().to_string(),
        ));
    }

    fs::create_dir_all(node_dir.join("src")).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", node_dir.display())))
    })?;

    let mut written = Vec::new();
    for file in templates::render_node_files(node, kind) {
        let path = node_dir.join(file.relative_path);
        io::write_file(&path, &file.contents, "write node file")?;
        if file.executable {
            mark_executable(&path)?;
        }
        written.push(path);
    }

    Ok(written)
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("chmod {}", path.display())))
    })
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<()> {
    Ok(())
}
