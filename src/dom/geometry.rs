//! Bounding boxes of rendered elements.
//!
//! Stroke width is ignored, as in `getBBox()`. Curves contribute their
//! control points, which over-approximates bulging segments slightly.

use glam::DVec2;
use svgtypes::{PointsParser, SimplePathSegment, SimplifyingPathParser};

use super::Node;
use crate::types::BBox;

pub(super) fn bbox(node: &Node) -> BBox {
    measure(node, &mut Vec::new())
}

/// `following` holds the ids of the `<use>` references currently being
/// resolved; a reference back into that chain measures as empty.
fn measure(node: &Node, following: &mut Vec<String>) -> BBox {
    let num = |name: &str| node.attr_f64(name).unwrap_or(0.0);

    match node.tag().as_str() {
        "circle" => {
            let r = num("r");
            BBox::from_rect(num("cx") - r, num("cy") - r, r * 2.0, r * 2.0)
        }
        "ellipse" => {
            let (rx, ry) = (num("rx"), num("ry"));
            BBox::from_rect(num("cx") - rx, num("cy") - ry, rx * 2.0, ry * 2.0)
        }
        "rect" | "image" => BBox::from_rect(num("x"), num("y"), num("width"), num("height")),
        "line" => {
            let mut b = BBox::new();
            b.expand(DVec2::new(num("x1"), num("y1")));
            b.expand(DVec2::new(num("x2"), num("y2")));
            b
        }
        "polygon" | "polyline" => {
            let mut b = BBox::new();
            if let Some(points) = node.attr("points") {
                for (x, y) in PointsParser::from(points.as_str()) {
                    b.expand(DVec2::new(x, y));
                }
            }
            b
        }
        "path" => node.attr("d").map_or_else(BBox::new, |d| path_bbox(&d)),
        "use" => use_bbox(node, following),
        _ => node
            .children()
            .iter()
            .fold(BBox::new(), |acc, child| acc.union(measure(child, following))),
    }
}

fn path_bbox(d: &str) -> BBox {
    let mut b = BBox::new();
    for segment in SimplifyingPathParser::from(d) {
        let Ok(segment) = segment else {
            // Rendering stops at the first error, so does the box.
            break;
        };
        match segment {
            SimplePathSegment::MoveTo { x, y } | SimplePathSegment::LineTo { x, y } => {
                b.expand(DVec2::new(x, y));
            }
            SimplePathSegment::Quadratic { x1, y1, x, y } => {
                b.expand(DVec2::new(x1, y1));
                b.expand(DVec2::new(x, y));
            }
            SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                b.expand(DVec2::new(x1, y1));
                b.expand(DVec2::new(x2, y2));
                b.expand(DVec2::new(x, y));
            }
            SimplePathSegment::ClosePath => {}
        }
    }
    b
}

/// A `<use>` measures as its referenced definition, shifted by its own x/y.
fn use_bbox(node: &Node, following: &mut Vec<String>) -> BBox {
    let href = node.attr("xlink:href").or_else(|| node.attr("href"));
    let Some(id) = href.as_deref().and_then(|h| h.strip_prefix('#')) else {
        return BBox::new();
    };
    if following.iter().any(|seen| seen == id) {
        crate::log::warn!(id, "cyclic <use> reference");
        return BBox::new();
    }
    let Some(target) = node.root().find_by_id(id).filter(|t| t != node) else {
        return BBox::new();
    };

    following.push(id.to_string());
    let inner = measure(&target, following);
    following.pop();

    let offset = DVec2::new(
        node.attr_f64("x").unwrap_or(0.0),
        node.attr_f64("y").unwrap_or(0.0),
    );
    inner.translate(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn circle_bbox() {
        let c = Node::new("circle");
        c.set_attr("cx", "10");
        c.set_attr("cy", "20");
        c.set_attr("r", "2.5");
        assert_eq!(c.bbox(), BBox::from_rect(7.5, 17.5, 5.0, 5.0));
    }

    #[test]
    fn polygon_bbox() {
        let p = Node::new("polygon");
        p.set_attr("points", "0,0 5,5 10,0");
        let b = p.bbox();
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 5.0);
    }

    #[test]
    fn path_bbox_includes_relative_segments() {
        let p = Node::new("path");
        p.set_attr("d", "M1 1 l4 0 v6 z");
        let b = p.bbox();
        assert_eq!(b.min, DVec2::new(1.0, 1.0));
        assert_eq!(b.max, DVec2::new(5.0, 7.0));
    }

    #[test]
    fn group_bbox_is_union() {
        let g = Node::new("g");
        let r = g.append("rect");
        r.set_attr("width", "4");
        r.set_attr("height", "4");
        let c = g.append("circle");
        c.set_attr("cx", "10");
        c.set_attr("cy", "10");
        c.set_attr("r", "1");
        assert_eq!(g.bbox(), BBox::from_rect(0.0, 0.0, 11.0, 11.0));
    }

    #[test]
    fn use_measures_referenced_definition() {
        let doc = Document::new();
        let def = doc.defs().append("rect");
        def.set_attr("id", "marker");
        def.set_attr("width", "8");
        def.set_attr("height", "6");

        let u = doc.root().append("use");
        u.set_attr("xlink:href", "#marker");
        u.set_attr("x", "2");
        let b = u.bbox();
        assert_eq!((b.width(), b.height()), (8.0, 6.0));
        assert_eq!(b.min.x, 2.0);
    }

    #[test]
    fn cyclic_use_chain_terminates() {
        let doc = Document::new();
        let def = doc.defs().append("g");
        def.set_attr("id", "loop");
        def.append("use").set_attr("href", "#loop");
        let rect = def.append("rect");
        rect.set_attr("width", "3");
        rect.set_attr("height", "2");

        let u = doc.root().append("use");
        u.set_attr("xlink:href", "#loop");
        let b = u.bbox();
        assert_eq!((b.width(), b.height()), (3.0, 2.0));
    }

    #[test]
    fn mutually_referencing_uses_are_empty() {
        let doc = Document::new();
        let a = doc.defs().append("use");
        a.set_attr("id", "a");
        a.set_attr("href", "#b");
        let b = doc.defs().append("use");
        b.set_attr("id", "b");
        b.set_attr("href", "#a");
        assert!(a.bbox().is_empty());
    }

    #[test]
    fn dangling_use_is_empty() {
        let doc = Document::new();
        let u = doc.root().append("use");
        u.set_attr("xlink:href", "#nowhere");
        assert!(u.bbox().is_empty());
    }
}
