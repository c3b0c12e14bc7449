use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::color::{self, ColorValue};
use crate::error::Vd2SvgError;
use crate::locate;

pub const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

/// Reads an attribute that may or may not carry the android namespace
/// prefix; hand-written drawables often leave root attributes bare.
pub(crate) fn android_attr<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute((ANDROID_NS, name))
        .or_else(|| node.attribute(name))
}

/// The reference forms a color attribute can take, tried in order.
enum RefKind {
    Named,
    Hex,
    ColorRes,
    AttrRes,
}

enum Lookup {
    Resolved(ColorValue),
    TryNext,
}

/// Resolves symbolic color references against a set of resource roots.
/// One resolver serves one top-level conversion run (including nested
/// drawable sub-conversions): its memo cache guarantees a single
/// consistent answer per reference within a run and is never shared
/// across unrelated conversions.
pub struct Resolver {
    roots: Vec<PathBuf>,
    cache: HashMap<String, ColorValue>,
    in_flight: Vec<String>,
    drawable_stack: Vec<PathBuf>,
}

impl Resolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Resolver {
            roots,
            cache: HashMap::new(),
            in_flight: Vec::new(),
            drawable_stack: Vec::new(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolves a color reference to a concrete value. Tries, in order:
    /// the named-constant table, hex literals, `@color/name` (values
    /// entries, then color-selector files), `?attr/name` (style items).
    /// Anything left over is an unresolvable reference.
    pub fn color(&mut self, reference: &str) -> Result<ColorValue, Vd2SvgError> {
        let reference = reference.trim();
        if let Some(hit) = self.cache.get(reference) {
            return Ok(hit.clone());
        }
        if self.in_flight.iter().any(|r| r == reference) {
            return Err(Vd2SvgError::CyclicReference(reference.to_string()));
        }
        self.in_flight.push(reference.to_string());
        let outcome = self.resolve_uncached(reference);
        self.in_flight.pop();
        let value = outcome?;
        self.cache.insert(reference.to_string(), value.clone());
        Ok(value)
    }

    fn resolve_uncached(&mut self, reference: &str) -> Result<ColorValue, Vd2SvgError> {
        for kind in [RefKind::Named, RefKind::Hex, RefKind::ColorRes, RefKind::AttrRes] {
            match self.lookup(kind, reference)? {
                Lookup::Resolved(value) => return Ok(value),
                Lookup::TryNext => {}
            }
        }
        Err(Vd2SvgError::UnresolvedReference(reference.to_string()))
    }

    fn lookup(&mut self, kind: RefKind, reference: &str) -> Result<Lookup, Vd2SvgError> {
        match kind {
            RefKind::Named => Ok(match color::named(reference) {
                Some(hex) => Lookup::Resolved(ColorValue::opaque(hex)),
                None => Lookup::TryNext,
            }),
            RefKind::Hex => Ok(match color::parse_hex(reference) {
                Some(value) => Lookup::Resolved(value),
                None => Lookup::TryNext,
            }),
            RefKind::ColorRes => self.lookup_color_res(reference),
            RefKind::AttrRes => self.lookup_attr_res(reference),
        }
    }

    /// `@color/name`: first `<color name="...">` entry in values files wins
    /// (locator order, first file then first element; duplicates found later
    /// never override). Falls back to a `color/name.xml` selector, taking
    /// the item with the fewest state attributes.
    fn lookup_color_res(&mut self, reference: &str) -> Result<Lookup, Vd2SvgError> {
        let Some(name) = reference.strip_prefix("@color/") else {
            return Ok(Lookup::TryNext);
        };

        let mut found: Option<String> = None;
        for path in locate::find_resources(&["values"], &self.roots) {
            if let Some(text) = read_values_color(&path, name)? {
                found = Some(text);
                break;
            }
        }
        if let Some(text) = found {
            return self.color(&text).map(Lookup::Resolved);
        }

        let mut found: Option<String> = None;
        for path in locate::find_resources(&["color"], &self.roots) {
            if path.file_stem().and_then(|stem| stem.to_str()) != Some(name) {
                continue;
            }
            if let Some(text) = read_selector_color(&path)? {
                found = Some(text);
                break;
            }
        }
        match found {
            Some(text) => self.color(&text).map(Lookup::Resolved),
            None => Ok(Lookup::TryNext),
        }
    }

    /// `?attr/name`: collects every style item named `name` (or
    /// `android:name`) across the values files, then takes the value from
    /// the lexicographically longest theme name. Longer names are deemed
    /// more specific; a real theme-inheritance walk is out of scope.
    fn lookup_attr_res(&mut self, reference: &str) -> Result<Lookup, Vd2SvgError> {
        let Some(name) = reference.strip_prefix("?attr/") else {
            return Ok(Lookup::TryNext);
        };
        let qualified = format!("android:{}", name);

        let mut best: Option<(String, String)> = None;
        for path in locate::find_resources(&["values"], &self.roots) {
            let text = fs::read_to_string(&path)?;
            let doc = parse_resource(&path, &text)?;
            if doc.root_element().tag_name().name() != "resources" {
                continue;
            }
            for style in doc
                .descendants()
                .filter(|node| node.has_tag_name("style"))
            {
                let Some(theme) = style.attribute("name") else {
                    continue;
                };
                for item in style.children().filter(|node| node.has_tag_name("item")) {
                    let Some(item_name) = item.attribute("name") else {
                        continue;
                    };
                    if item_name != name && item_name != qualified {
                        continue;
                    }
                    let value = item.text().unwrap_or("").trim();
                    if value.is_empty() {
                        continue;
                    }
                    let better = match &best {
                        Some((leader, _)) => theme.len() > leader.len(),
                        None => true,
                    };
                    if better {
                        best = Some((theme.to_string(), value.to_string()));
                    }
                }
            }
        }
        match best {
            Some((_, value)) => self.color(&value).map(Lookup::Resolved),
            None => Ok(Lookup::TryNext),
        }
    }

    /// Finds the first drawable/mipmap-category file whose stem is `name`.
    pub(crate) fn find_drawable_file(&self, category: &str, name: &str) -> Option<PathBuf> {
        locate::find_resources(&[category], &self.roots)
            .find(|path| path.file_stem().and_then(|stem| stem.to_str()) == Some(name))
    }

    /// Guards recursive drawable embedding. A file already on the stack
    /// means the reference chain loops back on itself.
    pub(crate) fn enter_drawable(
        &mut self,
        file: &Path,
        reference: &str,
    ) -> Result<(), Vd2SvgError> {
        if self.drawable_stack.iter().any(|entry| entry == file) {
            return Err(Vd2SvgError::CyclicReference(reference.to_string()));
        }
        self.drawable_stack.push(file.to_path_buf());
        Ok(())
    }

    pub(crate) fn leave_drawable(&mut self) {
        self.drawable_stack.pop();
    }
}

/// Looks for `<color name="...">` in one values file. Files whose root
/// element is not `<resources>` are skipped; entries with empty text are
/// not definitions.
fn read_values_color(path: &Path, name: &str) -> Result<Option<String>, Vd2SvgError> {
    let text = fs::read_to_string(path)?;
    let doc = parse_resource(path, &text)?;
    if doc.root_element().tag_name().name() != "resources" {
        return Ok(None);
    }
    for node in doc.descendants().filter(|node| node.has_tag_name("color")) {
        if node.attribute("name") != Some(name) {
            continue;
        }
        let value = node.text().unwrap_or("").trim();
        if !value.is_empty() {
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

/// Picks the color out of a `<selector>` state list: the item with the
/// fewest `state_*` attributes is treated as the default state, ties going
/// to document order.
fn read_selector_color(path: &Path) -> Result<Option<String>, Vd2SvgError> {
    let text = fs::read_to_string(path)?;
    let doc = parse_resource(path, &text)?;
    if doc.root_element().tag_name().name() != "selector" {
        return Ok(None);
    }
    let mut best: Option<(usize, String)> = None;
    for item in doc.descendants().filter(|node| node.has_tag_name("item")) {
        let Some(value) = android_attr(item, "color") else {
            continue;
        };
        let states = item
            .attributes()
            .filter(|attr| attr.name().starts_with("state_"))
            .count();
        let better = match &best {
            Some((leader, _)) => states < *leader,
            None => true,
        };
        if better {
            best = Some((states, value.to_string()));
        }
    }
    Ok(best.map(|(_, value)| value))
}

fn parse_resource<'a>(
    path: &Path,
    text: &'a str,
) -> Result<roxmltree::Document<'a>, Vd2SvgError> {
    roxmltree::Document::parse(text).map_err(|err| Vd2SvgError::Xml {
        path: Some(path.to_path_buf()),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn resolver_for(root: &Path) -> Resolver {
        Resolver::new(vec![root.to_path_buf()])
    }

    #[test]
    fn named_constants_resolve_without_any_resources() {
        let mut resolver = Resolver::new(vec![PathBuf::from("/nonexistent")]);
        let value = resolver.color("red").expect("table lookup");
        assert_eq!(value, ColorValue::opaque("#FF0000"));
    }

    #[test]
    fn hex_literals_resolve_inline() {
        let mut resolver = Resolver::new(Vec::new());
        let value = resolver.color("#80FF0000").expect("literal");
        assert_eq!(value.hex, "#FF0000");
        assert_eq!(value.alpha.as_deref(), Some("0.5"));
        let value = resolver.color("#123456").expect("literal");
        assert_eq!(value, ColorValue::opaque("#123456"));
    }

    #[test]
    fn first_values_definition_wins_over_later_duplicates() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(
            &root.join("values/a.xml"),
            r##"<resources><color name="brand">#111111</color></resources>"##,
        );
        write(
            &root.join("values/b.xml"),
            r##"<resources><color name="brand">#222222</color></resources>"##,
        );
        write(
            &root.join("values-night/c.xml"),
            r##"<resources><color name="brand">#333333</color></resources>"##,
        );

        let mut resolver = resolver_for(root);
        let value = resolver.color("@color/brand").expect("defined");
        assert_eq!(value.hex, "#111111", "a.xml sorts first and must win");
    }

    #[test]
    fn values_entries_chain_through_references() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(
            &root.join("values/colors.xml"),
            r##"<resources>
                <color name="accent">@color/base</color>
                <color name="base">#445566</color>
            </resources>"##,
        );

        let mut resolver = resolver_for(root);
        let value = resolver.color("@color/accent").expect("chained");
        assert_eq!(value.hex, "#445566");
    }

    #[test]
    fn selector_picks_item_with_fewest_state_attrs() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(
            &root.join("color/toggle.xml"),
            r##"<selector xmlns:android="http://schemas.android.com/apk/res/android">
                <item android:state_pressed="true" android:state_enabled="true" android:color="#0000FF"/>
                <item android:color="#00FF00"/>
            </selector>"##,
        );

        let mut resolver = resolver_for(root);
        let value = resolver.color("@color/toggle").expect("selector");
        assert_eq!(value.hex, "#00FF00", "stateless item is the default");
    }

    #[test]
    fn attr_resolution_prefers_longest_theme_name() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(
            &root.join("values/themes.xml"),
            r##"<resources>
                <style name="Base"><item name="accent">#111111</item></style>
                <style name="Base.Extended"><item name="accent">#222222</item></style>
            </resources>"##,
        );

        let mut resolver = resolver_for(root);
        let value = resolver.color("?attr/accent").expect("themed");
        assert_eq!(value.hex, "#222222", "Base.Extended outranks Base");
    }

    #[test]
    fn attr_items_match_the_android_prefixed_form() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(
            &root.join("values/themes.xml"),
            r##"<resources>
                <style name="App"><item name="android:colorAccent">#ABCDEF</item></style>
            </resources>"##,
        );

        let mut resolver = resolver_for(root);
        let value = resolver.color("?attr/colorAccent").expect("themed");
        assert_eq!(value.hex, "#ABCDEF");
    }

    #[test]
    fn unknown_references_fail_with_the_offending_string() {
        let tmp = tempfile::tempdir().unwrap();
        let mut resolver = resolver_for(tmp.path());
        let err = resolver.color("@color/missing").unwrap_err();
        match err {
            Vd2SvgError::UnresolvedReference(reference) => {
                assert_eq!(reference, "@color/missing");
            }
            other => panic!("expected unresolved reference, got {:?}", other),
        }
    }

    #[test]
    fn cyclic_color_chains_are_detected() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(
            &root.join("values/colors.xml"),
            r##"<resources>
                <color name="a">@color/b</color>
                <color name="b">@color/a</color>
            </resources>"##,
        );

        let mut resolver = resolver_for(root);
        let err = resolver.color("@color/a").unwrap_err();
        assert!(
            matches!(err, Vd2SvgError::CyclicReference(_)),
            "expected cycle error, got {:?}",
            err
        );
    }

    #[test]
    fn resolved_references_are_memoized_for_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let file = root.join("values/colors.xml");
        write(
            &file,
            r##"<resources><color name="brand">#778899</color></resources>"##,
        );

        let mut resolver = resolver_for(root);
        assert_eq!(resolver.color("@color/brand").unwrap().hex, "#778899");
        fs::remove_file(&file).unwrap();
        assert_eq!(
            resolver.color("@color/brand").unwrap().hex,
            "#778899",
            "second lookup must come from the cache, not the filesystem"
        );
    }

    #[test]
    fn non_resources_values_files_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(&root.join("values/stray.xml"), "<merge/>");
        write(
            &root.join("values/z.xml"),
            r##"<resources><color name="brand">#010203</color></resources>"##,
        );

        let mut resolver = resolver_for(root);
        assert_eq!(resolver.color("@color/brand").unwrap().hex, "#010203");
    }
}
