//! Shared point definitions.
//!
//! Inline SVG markup from the point pattern is parsed once, cloned into the
//! chart's `<defs>` under a synthetic id, and drawn through `<use>` elements
//! from then on. Definitions are only ever added.

use crate::dom::{Document, Node, SVG_NS, XLINK_NS};
use crate::errors::PointError;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Append-only store of point definitions, keyed by id.
pub trait DefinitionPool {
    fn lookup(&self, id: &str) -> Option<Node>;
    fn insert(&mut self, definition: Node);
}

/// Definition pool backed by a document's `<defs>` element.
#[derive(Debug, Clone)]
pub struct SvgDefs {
    defs: Node,
}

impl SvgDefs {
    pub fn new(defs: Node) -> Self {
        Self { defs }
    }

    pub fn of(doc: &Document) -> Self {
        Self::new(doc.defs().clone())
    }

    pub fn node(&self) -> &Node {
        &self.defs
    }
}

impl DefinitionPool for SvgDefs {
    fn lookup(&self, id: &str) -> Option<Node> {
        self.defs
            .children()
            .into_iter()
            .find(|n| n.id().as_deref() == Some(id))
    }

    fn insert(&mut self, definition: Node) {
        self.defs.append_child(&definition);
    }
}

/// Parse `markup` into a detached definition element carrying `id`.
///
/// Attributes, child elements and character data are copied verbatim in
/// document order, except `id`, which the synthetic id replaces. Fill and
/// stroke are forced to `inherit` so the referencing `<use>` controls color.
pub fn parse_definition(markup: &str, id: &str) -> Result<Node, PointError> {
    let doc = roxmltree::Document::parse(markup).map_err(|e| PointError::markup(markup, &e))?;
    let source = doc.root_element();

    let definition = Node::new(element_name(source).to_ascii_lowercase());
    definition.set_attr("id", id);
    declare_namespaces(source, &definition);
    copy_attrs(source, &definition, true);
    copy_children(source, &definition);
    definition.set_style("fill", "inherit");
    definition.set_style("stroke", "inherit");

    Ok(definition)
}

/// `prefix:local` for names in a foreign namespace, as the markup spelled it.
///
/// xlink is always written as `xlink:`, matching the document root.
fn qualify(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace {
        None | Some(SVG_NS) => local.to_string(),
        Some(XLINK_NS) => format!("xlink:{local}"),
        Some(XML_NS) => format!("xml:{local}"),
        Some(uri) => match node.lookup_prefix(uri) {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        },
    }
}

fn element_name(node: roxmltree::Node<'_, '_>) -> String {
    let name = node.tag_name();
    qualify(node, name.namespace(), name.name())
}

/// Re-declare prefixes in scope at the markup root that the document root
/// does not already bind.
fn declare_namespaces(source: roxmltree::Node<'_, '_>, target: &Node) {
    for ns in source.namespaces() {
        if let Some(prefix) = ns.name() {
            if !matches!(ns.uri(), SVG_NS | XLINK_NS | XML_NS) {
                target.set_attr(&format!("xmlns:{prefix}"), ns.uri());
            }
        }
    }
}

fn copy_attrs(source: roxmltree::Node<'_, '_>, target: &Node, skip_id: bool) {
    for attr in source.attributes() {
        let name = qualify(source, attr.namespace(), attr.name());
        if skip_id && name == "id" {
            continue;
        }
        target.set_attr(&name, attr.value());
    }
}

fn copy_children(source: roxmltree::Node<'_, '_>, target: &Node) {
    for child in source.children() {
        if child.is_element() {
            let copy = Node::new(element_name(child));
            target.append_child(&copy);
            copy_attrs(child, &copy, false);
            copy_children(child, &copy);
        } else if child.is_text() {
            if let Some(text) = child.text() {
                target.append_text(text);
            }
        }
    }
}

/// Parse `markup` and add it to the pool under `id`, unconditionally.
pub fn register(pool: &mut dyn DefinitionPool, markup: &str, id: &str) -> Result<Node, PointError> {
    let definition = parse_definition(markup, id)?;
    pool.insert(definition.clone());
    crate::log::debug!(id, tag = %definition.tag(), "point definition registered");
    Ok(definition)
}

/// Look `id` up and register `markup` only when it is missing.
///
/// Existing definitions are returned as-is; the markup is not parsed again.
pub fn register_if_absent(
    pool: &mut dyn DefinitionPool,
    markup: &str,
    id: &str,
) -> Result<Node, PointError> {
    match pool.lookup(id) {
        Some(existing) => {
            crate::log::debug!(id, "point definition reused");
            Ok(existing)
        }
        None => register(pool, markup, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pool that only remembers what was inserted.
    #[derive(Default)]
    struct FakePool {
        inserted: Vec<Node>,
    }

    impl DefinitionPool for FakePool {
        fn lookup(&self, id: &str) -> Option<Node> {
            self.inserted.iter().find(|n| n.id().as_deref() == Some(id)).cloned()
        }

        fn insert(&mut self, definition: Node) {
            self.inserted.push(definition);
        }
    }

    #[test]
    fn parse_copies_attributes_and_forces_inherit() {
        let markup = "<polygon points='0,0 5,5 10,0' stroke-width='2'/>";
        let def = parse_definition(markup, "c-point-a").unwrap();
        assert_eq!(def.tag(), "polygon");
        assert_eq!(def.id().as_deref(), Some("c-point-a"));
        assert_eq!(def.attr("points").as_deref(), Some("0,0 5,5 10,0"));
        assert_eq!(def.attr("stroke-width").as_deref(), Some("2"));
        assert_eq!(def.style("fill").as_deref(), Some("inherit"));
        assert_eq!(def.style("stroke").as_deref(), Some("inherit"));
    }

    #[test]
    fn synthetic_id_wins_over_markup_id() {
        let def = parse_definition("<circle id='mine' r='4'/>", "c-point-a").unwrap();
        assert_eq!(def.id().as_deref(), Some("c-point-a"));
    }

    #[test]
    fn markup_style_cannot_override_inherit() {
        let markup = "<circle r='4' style='fill: red; opacity: 0.5'/>";
        let def = parse_definition(markup, "id").unwrap();
        assert_eq!(def.style("fill").as_deref(), Some("inherit"));
        assert_eq!(def.style("opacity").as_deref(), Some("0.5"));
    }

    #[test]
    fn children_are_cloned_recursively() {
        let markup = r##"<g xmlns:xlink="http://www.w3.org/1999/xlink" transform="scale(2)">
            <rect width="4" height="4"/>
            <g><use xlink:href="#other"/></g>
            <text x="1">A</text>
        </g>"##;
        let def = parse_definition(markup, "id").unwrap();
        let children: Vec<Node> = def.children().into_iter().filter(|c| !c.is_text()).collect();
        assert_eq!(def.attr("transform").as_deref(), Some("scale(2)"));
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].attr("width").as_deref(), Some("4"));
        assert_eq!(
            children[1].children()[0].attr("xlink:href").as_deref(),
            Some("#other")
        );
        assert_eq!(children[2].text().as_deref(), Some("A"));
    }

    #[test]
    fn mixed_text_content_keeps_order() {
        let def = parse_definition("<text>a<tspan>b</tspan>c</text>", "id").unwrap();
        insta::assert_snapshot!(
            def.to_svg(),
            @r#"<text id="id" style="fill: inherit; stroke: inherit;">a<tspan>b</tspan>c</text>"#
        );
    }

    #[test]
    fn foreign_namespace_prefixes_survive() {
        let def = parse_definition(
            "<circle xmlns:foo='urn:foo' foo:bar='1' r='2'><foo:meta/></circle>",
            "id",
        )
        .unwrap();
        assert_eq!(def.attr("xmlns:foo").as_deref(), Some("urn:foo"));
        assert_eq!(def.attr("foo:bar").as_deref(), Some("1"));
        assert_eq!(def.children()[0].tag(), "foo:meta");
    }

    #[test]
    fn uppercase_root_tag_is_lowered() {
        let def = parse_definition("<CIRCLE r='1'/>", "id").unwrap();
        assert_eq!(def.tag(), "circle");
    }

    #[test]
    fn malformed_markup_is_reported() {
        let err = parse_definition("<polygon points='0,0'", "id").unwrap_err();
        assert!(matches!(err, PointError::MalformedMarkup { .. }));
    }

    #[test]
    fn register_if_absent_dedups() {
        let mut pool = FakePool::default();
        let first = register_if_absent(&mut pool, "<circle r='1'/>", "c-point-a").unwrap();
        // different markup, same id: the first definition stays
        let second = register_if_absent(&mut pool, "<rect/>", "c-point-a").unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.inserted.len(), 1);
    }

    #[test]
    fn reuse_skips_parsing() {
        let mut pool = FakePool::default();
        register(&mut pool, "<circle r='1'/>", "c-point-a").unwrap();
        assert!(register_if_absent(&mut pool, "not markup", "c-point-a").is_ok());
    }

    #[test]
    fn svg_defs_is_attached_to_document() {
        let doc = Document::new();
        let mut pool = SvgDefs::of(&doc);
        register(&mut pool, "<polygon points='0,0 5,5 10,0'/>", "chart1-point-x1").unwrap();
        assert!(pool.lookup("chart1-point-x1").is_some());
        insta::assert_snapshot!(
            doc.defs().to_svg(),
            @r#"<defs><polygon id="chart1-point-x1" points="0,0 5,5 10,0" style="fill: inherit; stroke: inherit;"/></defs>"#
        );
    }
}
