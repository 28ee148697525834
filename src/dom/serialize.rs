//! SVG text output

use std::fmt::Write;

use super::Node;

pub(super) fn to_svg(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    let data = node.data();

    if node.is_text() {
        if let Some(text) = &data.text {
            out.push_str(&escape(text, false));
        }
        return;
    }

    let _ = write!(out, "<{}", data.tag);
    for (name, value) in &data.attrs {
        let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
    }
    if !data.styles.is_empty() {
        let decls: Vec<String> = data
            .styles
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect();
        let _ = write!(out, " style=\"{}\"", escape(&decls.join(" "), true));
    }

    if data.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &data.children {
        write_node(out, child);
    }
    let _ = write!(out, "</{}>", data.tag);
}

fn escape(s: &str, in_attr: bool) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if in_attr => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
