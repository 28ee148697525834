//! Point shapes
//!
//! Each shape knows how to:
//! - Create its primitive under a point's group element
//! - Update position, opacity and fill, animated or not
//!
//! The built-in shapes and user-supplied draw objects share one trait so the
//! renderer can dispatch to either without caring which it got.

use std::fmt;
use std::rc::Rc;

use enum_dispatch::enum_dispatch;
use glam::DVec2;

use crate::dom::{Node, Selection, Staged};
use crate::errors::PointError;
use crate::types::DataPoint;

use super::context::PointContext;

/// Per-datum numeric function (positions, sizes)
pub type NumberFn<'a> = &'a dyn Fn(&DataPoint) -> f64;
/// Per-datum text function (classes, colors, opacity)
pub type TextFn<'a> = &'a dyn Fn(&DataPoint) -> String;

/// Functions used when a point is first drawn.
#[derive(Clone, Copy)]
pub struct CreateArgs<'a> {
    pub class: TextFn<'a>,
    pub size: NumberFn<'a>,
    pub fill: TextFn<'a>,
}

/// Functions and flags for repositioning an existing point.
#[derive(Clone, Copy)]
pub struct UpdateArgs<'a> {
    pub x: NumberFn<'a>,
    pub y: NumberFn<'a>,
    pub opacity: TextFn<'a>,
    pub fill: TextFn<'a>,
    pub with_transition: bool,
    /// Streaming update: new points are placed before animating
    pub flow: bool,
    /// Points in the highlighted region; they animate under their own name
    pub selected: &'a Selection,
}

/// Common behavior for all point shapes
#[enum_dispatch]
pub trait PointShape {
    /// Append this shape's primitive to `element` and return it.
    ///
    /// `point_id` is the synthetic id of the datum's identity; built-in shapes
    /// ignore it.
    fn create(
        &self,
        ctx: &PointContext,
        element: &Selection,
        point_id: &str,
        args: &CreateArgs<'_>,
    ) -> Result<Node, PointError>;

    /// Move and restyle the primitives in `element`.
    fn update(
        &self,
        ctx: &PointContext,
        element: &Selection,
        args: &UpdateArgs<'_>,
    ) -> Result<Staged, PointError>;
}

/// A resolved point shape
#[enum_dispatch(PointShape)]
#[derive(Debug, Clone)]
pub enum Shape {
    Circle(CircleShape),
    Rectangle(RectangleShape),
    Use(UseShape),
    Custom(CustomShape),
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Circle(_) => "circle",
            Shape::Rectangle(_) => "rectangle",
            Shape::Use(_) => "use",
            Shape::Custom(_) => "custom",
        }
    }
}

// ============================================================================
// Shared placement
// ============================================================================

/// Which attributes carry the position, and how to compute them.
struct Placement<'a> {
    x_attr: &'static str,
    y_attr: &'static str,
    x: NumberFn<'a>,
    y: NumberFn<'a>,
}

/// Position `element`, animating when asked, then apply opacity and fill.
///
/// With a transition, a flow update sets x first so new points don't slide in
/// from the origin. Elements that already have an x animate in two chained
/// phases under one name; elements without one are placed directly. The
/// selected subset always gets a transition of its own.
fn place(
    ctx: &PointContext,
    element: &Selection,
    placement: Placement<'_>,
    args: &UpdateArgs<'_>,
) -> Staged {
    let Placement {
        x_attr,
        y_attr,
        x,
        y,
    } = placement;

    let main = if args.with_transition {
        let name = ctx.transition_name();

        if args.flow {
            element.clone().attr_with(x_attr, x);
        }

        let staged = if element.get_attr(x_attr).is_some() {
            Staged::Animated(
                element
                    .clone()
                    .transition(&name)
                    .attr_with(x_attr, x)
                    .attr_with(y_attr, y)
                    .transition(),
            )
        } else {
            Staged::Immediate(element.clone().attr_with(x_attr, x).attr_with(y_attr, y))
        };

        args.selected.clone().transition(&ctx.transition_name());
        staged
    } else {
        Staged::Immediate(element.clone().attr_with(x_attr, x).attr_with(y_attr, y))
    };

    main.style_with("opacity", args.opacity)
        .style_with("fill", args.fill)
}

fn first_created(created: Selection) -> Result<Node, PointError> {
    created.node().cloned().ok_or(PointError::EmptySelection)
}

// ============================================================================
// Shape Types
// ============================================================================

/// `<circle>` centered on the data coordinate
#[derive(Debug, Clone, Copy, Default)]
pub struct CircleShape;

impl PointShape for CircleShape {
    fn create(
        &self,
        _ctx: &PointContext,
        element: &Selection,
        _point_id: &str,
        args: &CreateArgs<'_>,
    ) -> Result<Node, PointError> {
        first_created(
            element
                .append("circle")
                .attr_with("class", args.class)
                .attr_with("r", args.size)
                .style_with("fill", args.fill),
        )
    }

    fn update(
        &self,
        ctx: &PointContext,
        element: &Selection,
        args: &UpdateArgs<'_>,
    ) -> Result<Staged, PointError> {
        let mut element = element.clone();

        // bubble size follows the data on every load
        if ctx.is_bubble() {
            element = element.attr_with("r", |d| ctx.point_r(d));
        }

        let placement = Placement {
            x_attr: "cx",
            y_attr: "cy",
            x: args.x,
            y: args.y,
        };
        Ok(place(ctx, &element, placement, args))
    }
}

/// `<rect>` with the footprint of a circle of the same radius
#[derive(Debug, Clone, Copy, Default)]
pub struct RectangleShape;

impl PointShape for RectangleShape {
    fn create(
        &self,
        _ctx: &PointContext,
        element: &Selection,
        _point_id: &str,
        args: &CreateArgs<'_>,
    ) -> Result<Node, PointError> {
        let side = |d: &DataPoint| (args.size)(d) * 2.0;

        first_created(
            element
                .append("rect")
                .attr_with("class", args.class)
                .attr_with("width", side)
                .attr_with("height", side)
                .style_with("fill", args.fill),
        )
    }

    fn update(
        &self,
        ctx: &PointContext,
        element: &Selection,
        args: &UpdateArgs<'_>,
    ) -> Result<Staged, PointError> {
        let rect_x = |d: &DataPoint| (args.x)(d) - ctx.base_r(d);
        let rect_y = |d: &DataPoint| (args.y)(d) - ctx.base_r(d);

        let placement = Placement {
            x_attr: "x",
            y_attr: "y",
            x: &rect_x,
            y: &rect_y,
        };
        Ok(place(ctx, element, placement, args))
    }
}

/// `<use>` referencing a shared definition by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseShape {
    href: String,
}

impl UseShape {
    pub fn new(id: impl Into<String>) -> Self {
        Self { href: id.into() }
    }

    /// Id of the referenced definition
    pub fn id(&self) -> &str {
        &self.href
    }
}

impl PointShape for UseShape {
    fn create(
        &self,
        _ctx: &PointContext,
        element: &Selection,
        _point_id: &str,
        args: &CreateArgs<'_>,
    ) -> Result<Node, PointError> {
        first_created(
            element
                .append("use")
                .attr("xlink:href", format!("#{}", self.href))
                .attr_with("class", args.class)
                .style_with("fill", args.fill),
        )
    }

    fn update(
        &self,
        ctx: &PointContext,
        element: &Selection,
        args: &UpdateArgs<'_>,
    ) -> Result<Staged, PointError> {
        let bbox = element.node().map(Node::bbox).unwrap_or_default();
        let (half_w, half_h) = (bbox.width() / 2.0, bbox.height() / 2.0);

        let use_x = |d: &DataPoint| (args.x)(d) - half_w;
        let use_y = |d: &DataPoint| (args.y)(d) - half_h;

        let placement = Placement {
            x_attr: "x",
            y_attr: "y",
            x: &use_x,
            y: &use_y,
        };
        Ok(place(ctx, element, placement, args))
    }
}

/// A user-supplied draw object
#[derive(Clone)]
pub struct CustomShape(pub Rc<dyn PointShape>);

impl fmt::Debug for CustomShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomShape(..)")
    }
}

impl PointShape for CustomShape {
    fn create(
        &self,
        ctx: &PointContext,
        element: &Selection,
        point_id: &str,
        args: &CreateArgs<'_>,
    ) -> Result<Node, PointError> {
        self.0.create(ctx, element, point_id, args)
    }

    fn update(
        &self,
        ctx: &PointContext,
        element: &Selection,
        args: &UpdateArgs<'_>,
    ) -> Result<Staged, PointError> {
        self.0.update(ctx, element, args)
    }
}

// ============================================================================
// Hit testing
// ============================================================================

/// Whether `pointer` lies strictly within `r` of the point drawn by `node`.
///
/// Circles measure from `(cx, cy)`; other shapes from their bounding-box
/// center.
pub fn is_within(node: &Node, pointer: DVec2, r: f64) -> bool {
    let center = if node.tag() == "circle" {
        DVec2::new(
            node.attr_f64("cx").unwrap_or(0.0),
            node.attr_f64("cy").unwrap_or(0.0),
        )
    } else {
        node.bbox().center()
    };
    center.distance(pointer) < r
}

// ============================================================================
// Tests
// ============================================================================
