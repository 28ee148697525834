//! Per-datum point markers for SVG charts.
//!
//! Every data point is drawn as a marker chosen from a configurable shape
//! pattern: built-in circles and rectangles, inline SVG markup registered
//! once as a shared definition and referenced through `<use>`, or a custom
//! draw object. Markers are repositioned with optional, named transitions.
//!
//! ```
//! use pointmark::{DataPoint, PointConfig, render_points};
//!
//! let data = [DataPoint::new("a", 0, 10.0, 5.0), DataPoint::new("b", 0, 10.0, 7.0)];
//! let svg = render_points(
//!     PointConfig::new().with_pattern(["circle", "rectangle"]),
//!     "chart1",
//!     &data,
//!     &|d| d.x,
//!     &|d| d.value.unwrap_or(0.0),
//!     &|_| "steelblue".to_string(),
//! )
//! .unwrap();
//! assert!(svg.contains("<circle"));
//! assert!(svg.contains("<rect"));
//! ```

pub mod config;
pub mod dom;
pub mod errors;
pub mod log;
pub mod render;
pub mod types;

pub use config::{BubbleSizing, PointConfig, PointSelector, Radius, ShapeToken};
pub use dom::{Document, Node, Selection, Staged};
pub use errors::PointError;
pub use render::PointRenderer;
pub use render::context::{PointContext, session_key};
pub use render::defs::{DefinitionPool, SvgDefs};
pub use render::shapes::{
    CreateArgs, NumberFn, PointShape, Shape, TextFn, UpdateArgs, is_within,
};
pub use types::{BBox, DataPoint};

/// Render `data` as point markers into a standalone SVG document.
///
/// Each datum gets its own `<g>` inside a `points` layer; markers are placed
/// without transitions. Fails when the configuration is invalid or a pattern
/// entry cannot be drawn.
pub fn render_points(
    config: PointConfig,
    session_key: &str,
    data: &[DataPoint],
    x: NumberFn<'_>,
    y: NumberFn<'_>,
    color: TextFn<'_>,
) -> Result<String, miette::Report> {
    let doc = Document::new();
    let ctx = PointContext::new(config, session_key);
    let renderer = PointRenderer::new(ctx, SvgDefs::of(&doc))?;

    let layer = doc.root().append("g");
    layer.set_attr("class", "points");

    let size = |d: &DataPoint| renderer.context().point_r(d);
    let class = |d: &DataPoint| format!("point point-{}", d.index);
    let opacity = |_: &DataPoint| "1".to_string();
    let selected = Selection::empty();

    let create = CreateArgs {
        class: &class,
        size: &size,
        fill: color,
    };
    let update = UpdateArgs {
        x,
        y,
        opacity: &opacity,
        fill: color,
        with_transition: false,
        flow: false,
        selected: &selected,
    };

    for datum in data {
        let group = layer.append("g");
        group.set_datum(datum.clone());
        let point = renderer.create(&group, create)?;
        renderer.update(&point, update)?;
    }

    log::debug!(points = data.len(), "points rendered");
    doc.settle();
    Ok(doc.to_svg())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(d: &DataPoint) -> f64 {
        d.x
    }
    fn y(d: &DataPoint) -> f64 {
        d.value.unwrap_or(0.0)
    }
    fn red(_: &DataPoint) -> String {
        "red".to_string()
    }

    #[test]
    fn renders_one_group_per_datum() {
        let data = [
            DataPoint::new("a", 0, 1.0, 2.0),
            DataPoint::new("a", 1, 3.0, 4.0),
        ];
        let svg = render_points(PointConfig::default(), "c", &data, &x, &y, &red).unwrap();
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(r#"cx="3""#));
        assert!(svg.contains(r#"class="point point-1""#));
    }

    #[test]
    fn invalid_config_is_rejected_before_drawing() {
        let config = PointConfig::new().with_r(-1.0);
        let err = render_points(config, "c", &[], &x, &y, &red).unwrap_err();
        assert!(err.to_string().contains("radius"), "{err}");
    }

    #[test]
    fn bubble_config_sizes_by_value() {
        let config = PointConfig::new().with_bubble(BubbleSizing::new(16.0).with_max_r(8.0));
        let data = [DataPoint::new("a", 0, 1.0, 4.0), DataPoint::new("a", 1, 2.0, 16.0)];
        let svg = render_points(config, "c", &data, &x, &y, &red).unwrap();
        assert!(svg.contains(r#"r="4""#), "{svg}");
        assert!(svg.contains(r#"r="8""#), "{svg}");
    }

    #[test]
    fn markup_pattern_fills_defs() {
        let data = [DataPoint::new("x1", 0, 0.0, 0.0)];
        let svg = render_points(
            PointConfig::new().with_type("<rect width='4' height='4'/>"),
            "chart1",
            &data,
            &x,
            &y,
            &red,
        )
        .unwrap();
        assert!(svg.contains(r##"<rect id="chart1-point-x1""##));
        assert!(svg.contains(r##"xlink:href="#chart1-point-x1""##));
    }
}
