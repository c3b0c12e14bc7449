use base64::Engine;

/// Builds a self-contained HTML gallery of converted documents. Every SVG
/// is embedded as a base64 data URI, so the page carries no external
/// references and the output is deterministic.
pub fn gallery_page(entries: &[(String, String)]) -> String {
    let mut out = String::with_capacity(1024 + entries.len() * 512);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n");
    out.push_str("<title>vd2svg gallery</title>\n<style>\n");
    out.push_str("body { font-family: sans-serif; margin: 2em; }\n");
    out.push_str("figure { display: inline-block; margin: 1em; text-align: center; }\n");
    out.push_str("img { width: 108px; height: 108px; background: #f2f2f2; }\n");
    out.push_str("figcaption { margin-top: 0.5em; font-size: 0.8em; }\n");
    out.push_str("</style>\n</head>\n<body>\n<h1>vd2svg gallery</h1>\n");
    for (title, svg) in entries {
        let payload = base64::engine::general_purpose::STANDARD.encode(svg.as_bytes());
        let title = escape_html(title);
        out.push_str("<figure>\n");
        out.push_str(&format!(
            "<img src=\"data:image/svg+xml;base64,{}\" alt=\"{}\"/>\n",
            payload, title
        ));
        out.push_str(&format!("<figcaption>{}</figcaption>\n", title));
        out.push_str("</figure>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_embed_as_data_uris_in_order() {
        let entries = vec![
            ("a.xml".to_string(), "<svg>a</svg>".to_string()),
            ("b.xml".to_string(), "<svg>b</svg>".to_string()),
        ];
        let page = gallery_page(&entries);
        let first = page.find("<figcaption>a.xml</figcaption>").unwrap();
        let second = page.find("<figcaption>b.xml</figcaption>").unwrap();
        assert!(first < second);

        let marker = "data:image/svg+xml;base64,";
        let at = page.find(marker).unwrap();
        let rest = &page[at + marker.len()..];
        let end = rest.find('"').unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&rest[..end])
            .unwrap();
        assert_eq!(decoded, b"<svg>a</svg>");
    }

    #[test]
    fn captions_escape_markup() {
        let entries = vec![("<icon> & \"co\"".to_string(), "<svg/>".to_string())];
        let page = gallery_page(&entries);
        assert!(
            page.contains("<figcaption>&lt;icon&gt; &amp; &quot;co&quot;</figcaption>"),
            "{}",
            page
        );
    }

    #[test]
    fn empty_galleries_are_still_complete_pages() {
        let page = gallery_page(&[]);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.ends_with("</html>\n"));
        assert!(!page.contains("<figure>"));
    }
}
