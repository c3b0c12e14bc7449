use std::fs;
use std::path::{Path, PathBuf};

use crate::locate;

/// Walks a project tree for Android resource roots in the
/// `<module>/src/<sourceSet>/res` layout and lists the vector documents
/// under each. Used when no explicit inputs are given; walk order is
/// sorted so batch output order is reproducible.
pub fn find_project_vectors(project: &Path) -> Vec<(PathBuf, PathBuf)> {
    let mut res_roots = Vec::new();
    collect_res_roots(project, &mut res_roots);
    let mut out = Vec::new();
    for root in res_roots {
        let roots = vec![root.clone()];
        for vector in locate::find_vectors(&roots) {
            out.push((vector, root.clone()));
        }
    }
    out
}

fn collect_res_roots(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    for child in dirs {
        let name = child
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("");
        if name.starts_with('.') {
            continue;
        }
        if name == "res" && is_source_set_res(&child) {
            out.push(child);
            continue;
        }
        collect_res_roots(&child, out);
    }
}

/// `res` counts only inside a source set: its grandparent must be `src`.
fn is_source_set_res(dir: &Path) -> bool {
    dir.parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        == Some("src")
}
