/// SVG output element: a name, attributes in insertion order, and child
/// elements. Attribute order is preserved by the writer, which is what
/// makes conversion output byte-stable across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgElement {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<SvgElement>,
}

impl SvgElement {
    pub fn new(name: impl Into<String>) -> Self {
        SvgElement {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets an attribute, replacing in place when the name already exists
    /// so repeated sets do not perturb attribute order.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_string(), value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, child: SvgElement) {
        self.children.push(child);
    }

    /// Prepends a child; used to put `<defs>` ahead of converted content.
    pub fn insert_first(&mut self, child: SvgElement) {
        self.children.insert(0, child);
    }

    pub fn children(&self) -> &[SvgElement] {
        &self.children
    }
}

/// Serializes a document: XML declaration, two-space indentation,
/// self-closing empty elements, trailing newline.
pub fn document(root: &SvgElement) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(&mut out, root, 0);
    out.push('\n');
    out
}

fn write_element(out: &mut String, element: &SvgElement, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(out, value);
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &element.children {
        out.push('\n');
        write_element(out, child, depth + 1);
    }
    out.push('\n');
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_elements_self_close() {
        let mut path = SvgElement::new("path");
        path.set("d", "M0,0L1,1");
        assert_eq!(
            document(&path),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<path d=\"M0,0L1,1\"/>\n"
        );
    }

    #[test]
    fn children_are_indented_two_spaces() {
        let mut svg = SvgElement::new("svg");
        svg.set("width", "24px");
        let mut g = SvgElement::new("g");
        let mut path = SvgElement::new("path");
        path.set("d", "M0,0");
        g.push(path);
        svg.push(g);
        let out = document(&svg);
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg width=\"24px\">\n\
             \x20\x20<g>\n\
             \x20\x20\x20\x20<path d=\"M0,0\"/>\n\
             \x20\x20</g>\n\
             </svg>\n"
        );
    }

    #[test]
    fn set_replaces_in_place_without_reordering() {
        let mut rect = SvgElement::new("rect");
        rect.set("x", "0");
        rect.set("fill", "#FF0000");
        rect.set("x", "5");
        let out = document(&rect);
        assert!(
            out.contains("<rect x=\"5\" fill=\"#FF0000\"/>"),
            "x must stay first after being replaced: {}",
            out
        );
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut el = SvgElement::new("text");
        el.set("data-note", "a<b & \"c\">d");
        let out = document(&el);
        assert!(
            out.contains("data-note=\"a&lt;b &amp; &quot;c&quot;&gt;d\""),
            "escaped output: {}",
            out
        );
    }

    #[test]
    fn serialization_is_stable() {
        let mut svg = SvgElement::new("svg");
        svg.set("viewBox", "0 0 24 24");
        let mut defs = SvgElement::new("defs");
        defs.push(SvgElement::new("clipPath"));
        svg.push(defs);
        assert_eq!(document(&svg), document(&svg));
    }
}
