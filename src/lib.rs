mod color;
mod convert;
mod discover;
mod drawable;
mod error;
mod gallery;
mod locate;
mod resolve;
mod svg;

pub use color::ColorValue;
pub use convert::Warning;
pub use discover::find_project_vectors;
pub use error::Vd2SvgError;
pub use gallery::gallery_page;
pub use locate::{find_resources, find_vectors, is_vector_document};
pub use resolve::Resolver;

use std::fs;
use std::path::{Path, PathBuf};

/// One converted document: the SVG text plus any features the conversion
/// recognized but had to leave out.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub svg: String,
    pub warnings: Vec<Warning>,
}

/// Conversion engine. Holds the resource path that symbolic references
/// resolve against; each conversion gets its own resolver, so one engine
/// may serve parallel conversions of independent documents.
pub struct Vd2Svg {
    resource_roots: Vec<PathBuf>,
}

impl Vd2Svg {
    pub fn builder() -> Vd2SvgBuilder {
        Vd2SvgBuilder::new()
    }

    /// Converts a document given as text. `source` is the document's own
    /// path when it has one; it anchors relative raster references and,
    /// when no resource roots are configured, root auto-discovery.
    pub fn convert_str(
        &self,
        xml: &str,
        source: Option<&Path>,
    ) -> Result<Conversion, Vd2SvgError> {
        let mut resolver = Resolver::new(self.roots_for(source));
        let (svg, warnings) = convert::convert_document(xml, source, &mut resolver)?;
        Ok(Conversion { svg, warnings })
    }

    pub fn convert_file(&self, path: impl AsRef<Path>) -> Result<Conversion, Vd2SvgError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        self.convert_str(&text, Some(path))
    }

    // Parallel batch conversion: convert in parallel, report in input order.
    // A failed document keeps its slot; the rest of the batch is unaffected.
    pub fn convert_batch(
        &self,
        inputs: &[PathBuf],
    ) -> Vec<(PathBuf, Result<Conversion, Vd2SvgError>)> {
        use rayon::prelude::*;

        let mut results: Vec<(usize, PathBuf, Result<Conversion, Vd2SvgError>)> = inputs
            .par_iter()
            .enumerate()
            .map(|(idx, path)| (idx, path.clone(), self.convert_file(path)))
            .collect();
        results.sort_by_key(|(idx, _, _)| *idx);
        results
            .into_iter()
            .map(|(_, path, result)| (path, result))
            .collect()
    }

    fn roots_for(&self, source: Option<&Path>) -> Vec<PathBuf> {
        if !self.resource_roots.is_empty() {
            return self.resource_roots.clone();
        }
        source.and_then(ancestor_res_root).into_iter().collect()
    }
}

/// The nearest ancestor directory named `res`, the conventional root of an
/// Android resource tree.
fn ancestor_res_root(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .find(|ancestor| ancestor.file_name().and_then(|name| name.to_str()) == Some("res"))
        .map(Path::to_path_buf)
}

#[derive(Clone)]
pub struct Vd2SvgBuilder {
    resource_roots: Vec<PathBuf>,
}

impl Vd2SvgBuilder {
    pub fn new() -> Self {
        Self {
            resource_roots: Vec::new(),
        }
    }

    /// Adds one resource root. Roots keep insertion order and deduplicate;
    /// the order decides which of two duplicate definitions wins.
    pub fn resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if !self.resource_roots.contains(&root) {
            self.resource_roots.push(root);
        }
        self
    }

    pub fn resource_roots<I>(mut self, roots: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        for root in roots {
            self = self.resource_root(root);
        }
        self
    }

    pub fn build(self) -> Vd2Svg {
        Vd2Svg {
            resource_roots: self.resource_roots,
        }
    }
}

impl Default for Vd2SvgBuilder {
    fn default() -> Self {
        Self::new()
    }
}
