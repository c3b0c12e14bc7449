use std::fs;
use std::path::{Path, PathBuf};

/// Categories whose files can hold vector documents.
const VECTOR_CATEGORIES: [&str; 2] = ["drawable", "mipmap"];

/// Enumerates resource files under `roots` whose containing directory
/// belongs to one of `categories`. A directory belongs to a category when
/// its name up to the first `-` equals the category, per Android qualifier
/// syntax (`values-v21` belongs to `values`).
///
/// The sequence is lazy (directories are listed as the iterator reaches
/// them) and stable: roots in the order given, subdirectories and files in
/// lexicographic order. Reference resolution takes the first match, so this
/// ordering decides which duplicate definition wins.
pub fn find_resources<'a>(
    categories: &'a [&'a str],
    roots: &'a [PathBuf],
) -> impl Iterator<Item = PathBuf> + 'a {
    roots.iter().flat_map(move |root| {
        let mut dirs: Vec<PathBuf> = match fs::read_dir(root) {
            Ok(entries) => entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_dir())
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| categories.contains(&category_prefix(name)))
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        dirs.sort();
        dirs.into_iter().flat_map(|dir| {
            let mut files: Vec<PathBuf> = match fs::read_dir(&dir) {
                Ok(entries) => entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|path| path.is_file())
                    .collect(),
                Err(_) => Vec::new(),
            };
            files.sort();
            files.into_iter()
        })
    })
}

/// Narrows drawable/mipmap resource files to vector documents: XML whose
/// root element is `vector` or `adaptive-icon`.
pub fn find_vectors(roots: &[PathBuf]) -> impl Iterator<Item = PathBuf> + '_ {
    find_resources(&VECTOR_CATEGORIES, roots).filter(|path| is_vector_document(path))
}

pub fn is_vector_document(path: &Path) -> bool {
    if path.extension().and_then(|ext| ext.to_str()) != Some("xml") {
        return false;
    }
    let Ok(text) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(doc) = roxmltree::Document::parse(&text) else {
        return false;
    };
    matches!(
        doc.root_element().tag_name().name(),
        "vector" | "adaptive-icon"
    )
}

fn category_prefix(name: &str) -> &str {
    match name.find('-') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn qualifier_suffixes_match_their_base_category() {
        assert_eq!(category_prefix("values-v21"), "values");
        assert_eq!(category_prefix("drawable-anydpi-v24"), "drawable");
        assert_eq!(category_prefix("values"), "values");
    }

    #[test]
    fn resources_enumerate_in_lexicographic_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("values-v21/colors.xml"), "<resources/>");
        touch(&root.join("values/b.xml"), "<resources/>");
        touch(&root.join("values/a.xml"), "<resources/>");
        touch(&root.join("layout/main.xml"), "<merge/>");

        let roots = vec![root.to_path_buf()];
        let found: Vec<PathBuf> = find_resources(&["values"], &roots).collect();
        assert_eq!(
            found,
            vec![
                root.join("values/a.xml"),
                root.join("values/b.xml"),
                root.join("values-v21/colors.xml"),
            ],
            "one subdirectory's files finish before the next subdirectory starts"
        );
    }

    #[test]
    fn unrelated_categories_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("color/state.xml"), "<selector/>");
        touch(&root.join("colorful/decoy.xml"), "<resources/>");

        let roots = vec![root.to_path_buf()];
        let found: Vec<PathBuf> = find_resources(&["color"], &roots).collect();
        assert_eq!(found, vec![root.join("color/state.xml")]);
    }

    #[test]
    fn vectors_filter_on_root_tag() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("drawable/icon.xml"), "<vector/>");
        touch(&root.join("drawable/shape.xml"), "<shape/>");
        touch(&root.join("mipmap-anydpi-v26/launcher.xml"), "<adaptive-icon/>");
        touch(&root.join("drawable/photo.png"), "not xml");

        let roots = vec![root.to_path_buf()];
        let found: Vec<PathBuf> = find_vectors(&roots).collect();
        assert_eq!(
            found,
            vec![
                root.join("drawable/icon.xml"),
                root.join("mipmap-anydpi-v26/launcher.xml"),
            ]
        );
    }

    #[test]
    fn missing_roots_yield_nothing() {
        let roots = vec![PathBuf::from("/definitely/not/here")];
        assert_eq!(find_resources(&["values"], &roots).count(), 0);
    }
}
