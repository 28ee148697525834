//! Point configuration.
//!
//! Everything here is plain data supplied by the surrounding chart; the
//! renderer only reads it. [`PointConfig::validate`] catches bad entries at
//! setup time instead of at first render.

use std::convert::Infallible;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::errors::PointError;
use crate::render::defaults;
use crate::render::shapes::PointShape;
use crate::types::DataPoint;

// ============================================================================
// Shape selectors
// ============================================================================

/// Reserved shape names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeToken {
    Circle,
    Rectangle,
    Polygon,
    Ellipse,
    Use,
}

impl ShapeToken {
    /// Match a reserved name, case-insensitively. `rect` is an alias of
    /// `rectangle`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "circle" => Some(ShapeToken::Circle),
            "rect" | "rectangle" => Some(ShapeToken::Rectangle),
            "polygon" => Some(ShapeToken::Polygon),
            "ellipse" => Some(ShapeToken::Ellipse),
            "use" => Some(ShapeToken::Use),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeToken::Circle => "circle",
            ShapeToken::Rectangle => "rectangle",
            ShapeToken::Polygon => "polygon",
            ShapeToken::Ellipse => "ellipse",
            ShapeToken::Use => "use",
        }
    }

    /// Whether a renderer exists for this name. `polygon` and `ellipse` are
    /// reserved so they never fall through to markup parsing.
    pub fn is_renderable(self) -> bool {
        !matches!(self, ShapeToken::Polygon | ShapeToken::Ellipse)
    }
}

impl fmt::Display for ShapeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a point pattern.
#[derive(Clone)]
pub enum PointSelector {
    /// A reserved shape name
    Token(ShapeToken),
    /// A user-supplied draw object
    Custom(Rc<dyn PointShape>),
    /// Inline SVG markup, registered as a shared definition
    Markup(String),
}

impl PointSelector {
    pub fn custom(shape: impl PointShape + 'static) -> Self {
        PointSelector::Custom(Rc::new(shape))
    }
}

impl fmt::Debug for PointSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointSelector::Token(t) => f.debug_tuple("Token").field(t).finish(),
            PointSelector::Custom(_) => f.write_str("Custom(..)"),
            PointSelector::Markup(m) => f.debug_tuple("Markup").field(m).finish(),
        }
    }
}

impl From<&str> for PointSelector {
    fn from(s: &str) -> Self {
        match ShapeToken::from_name(s) {
            Some(token) => PointSelector::Token(token),
            None => PointSelector::Markup(s.to_string()),
        }
    }
}

/// Reserved names become tokens; anything else is kept as markup and checked
/// by [`PointConfig::validate`].
impl FromStr for PointSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PointSelector::from(s))
    }
}

impl From<String> for PointSelector {
    fn from(s: String) -> Self {
        PointSelector::from(s.as_str())
    }
}

impl From<ShapeToken> for PointSelector {
    fn from(token: ShapeToken) -> Self {
        PointSelector::Token(token)
    }
}

// ============================================================================
// Radius
// ============================================================================

/// Point radius: one value for every point, or computed per datum.
#[derive(Clone)]
pub enum Radius {
    Fixed(f64),
    PerDatum(Rc<dyn Fn(&DataPoint) -> f64>),
}

impl Radius {
    pub fn per_datum(f: impl Fn(&DataPoint) -> f64 + 'static) -> Self {
        Radius::PerDatum(Rc::new(f))
    }

    pub fn at(&self, d: &DataPoint) -> f64 {
        match self {
            Radius::Fixed(r) => *r,
            Radius::PerDatum(f) => f(d),
        }
    }
}

impl From<f64> for Radius {
    fn from(r: f64) -> Self {
        Radius::Fixed(r)
    }
}

impl fmt::Debug for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Radius::Fixed(r) => f.debug_tuple("Fixed").field(r).finish(),
            Radius::PerDatum(_) => f.write_str("PerDatum(..)"),
        }
    }
}

// ============================================================================
// Bubble sizing
// ============================================================================

/// Bubble mode: point area grows linearly with the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleSizing {
    /// Radius of the bubble holding `max_value`
    pub max_r: f64,
    /// Largest value in the plotted data
    pub max_value: f64,
}

impl BubbleSizing {
    pub fn new(max_value: f64) -> Self {
        Self {
            max_r: defaults::BUBBLE_MAX_R,
            max_value,
        }
    }

    pub fn with_max_r(mut self, max_r: f64) -> Self {
        self.max_r = max_r;
        self
    }

    /// Radius for a value. Non-positive values and a non-positive maximum
    /// yield an invisible bubble.
    pub fn radius(&self, value: f64) -> f64 {
        if self.max_value <= 0.0 || value <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        self.max_r * (value / self.max_value).sqrt()
    }
}

// ============================================================================
// Point configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct PointConfig {
    /// Whether points are drawn at all; hidden points have radius 0
    pub show: bool,
    /// Shape used when no pattern is given
    pub point_type: PointSelector,
    /// Shapes cycled across distinct data identities
    pub pattern: Vec<PointSelector>,
    pub r: Radius,
    pub focus_expand: bool,
    pub focus_expand_r: Option<f64>,
    pub select_r: Option<f64>,
    /// Hover distance for hit testing
    pub sensitivity: f64,
    /// Bubble mode; replaces the configured radius with value-based sizing
    pub bubble: Option<BubbleSizing>,
}

impl Default for PointConfig {
    fn default() -> Self {
        Self {
            show: true,
            point_type: PointSelector::Token(ShapeToken::Circle),
            pattern: Vec::new(),
            r: Radius::Fixed(defaults::POINT_R),
            focus_expand: true,
            focus_expand_r: None,
            select_r: None,
            sensitivity: defaults::SENSITIVITY,
            bubble: None,
        }
    }
}

impl PointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, point_type: impl Into<PointSelector>) -> Self {
        self.point_type = point_type.into();
        self
    }

    pub fn with_pattern<I, S>(mut self, pattern: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PointSelector>,
    {
        self.pattern = pattern.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_r(mut self, r: impl Into<Radius>) -> Self {
        self.r = r.into();
        self
    }

    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub fn with_focus_expand(mut self, enabled: bool, r: Option<f64>) -> Self {
        self.focus_expand = enabled;
        self.focus_expand_r = r;
        self
    }

    pub fn with_select_r(mut self, r: f64) -> Self {
        self.select_r = Some(r);
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Switch to bubble mode
    pub fn with_bubble(mut self, bubble: BubbleSizing) -> Self {
        self.bubble = Some(bubble);
        self
    }

    /// The pattern actually cycled: the configured pattern, or the point type alone.
    pub fn effective_pattern(&self) -> Vec<PointSelector> {
        if self.pattern.is_empty() {
            vec![self.point_type.clone()]
        } else {
            self.pattern.clone()
        }
    }

    /// Reject configurations that could only fail later, at render time.
    pub fn validate(&self) -> Result<(), PointError> {
        if let Radius::Fixed(r) = self.r {
            check_radius(r)?;
        }
        let bubble_r = self.bubble.map(|b| b.max_r);
        for r in [self.focus_expand_r, self.select_r, bubble_r].into_iter().flatten() {
            check_radius(r)?;
        }

        for selector in self.effective_pattern() {
            match selector {
                PointSelector::Token(token) if !token.is_renderable() => {
                    crate::log::warn!(shape = token.name(), "reserved point shape has no renderer");
                    return Err(PointError::UnsupportedShape {
                        name: token.name().to_string(),
                    });
                }
                PointSelector::Markup(markup) => {
                    roxmltree::Document::parse(&markup)
                        .map_err(|e| PointError::markup(&markup, &e))?;
                }
                PointSelector::Token(_) | PointSelector::Custom(_) => {}
            }
        }
        Ok(())
    }
}

fn check_radius(r: f64) -> Result<(), PointError> {
    if r.is_finite() && r >= 0.0 {
        Ok(())
    } else {
        Err(PointError::InvalidRadius { value: r })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_parse_from_text() {
        let token: PointSelector = "rectangle".parse().unwrap();
        assert!(matches!(token, PointSelector::Token(ShapeToken::Rectangle)));
        let markup: PointSelector = "<circle r='3'/>".parse().unwrap();
        assert!(matches!(markup, PointSelector::Markup(ref m) if m == "<circle r='3'/>"));
    }

    #[test]
    fn token_names_are_case_insensitive() {
        assert_eq!(ShapeToken::from_name("CIRCLE"), Some(ShapeToken::Circle));
        assert_eq!(ShapeToken::from_name("Rect"), Some(ShapeToken::Rectangle));
        assert_eq!(ShapeToken::from_name("rectangle"), Some(ShapeToken::Rectangle));
        assert_eq!(ShapeToken::from_name("Use"), Some(ShapeToken::Use));
        assert_eq!(ShapeToken::from_name("rectangles"), None);
        assert_eq!(ShapeToken::from_name(" circle"), None);
    }

    #[test]
    fn selector_from_str_falls_back_to_markup() {
        assert!(matches!(
            PointSelector::from("circle"),
            PointSelector::Token(ShapeToken::Circle)
        ));
        assert!(matches!(
            PointSelector::from("<circle r='3'/>"),
            PointSelector::Markup(_)
        ));
    }

    #[test]
    fn empty_pattern_uses_point_type() {
        let config = PointConfig::new().with_type("rect");
        let pattern = config.effective_pattern();
        assert_eq!(pattern.len(), 1);
        assert!(matches!(pattern[0], PointSelector::Token(ShapeToken::Rectangle)));
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(PointConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_reserved_unrenderable_shape() {
        let config = PointConfig::new().with_pattern(["circle", "ellipse"]);
        assert!(matches!(
            config.validate(),
            Err(PointError::UnsupportedShape { name }) if name == "ellipse"
        ));
    }

    #[test]
    fn validate_rejects_malformed_markup() {
        let config = PointConfig::new().with_pattern(["circle", "triangle"]);
        assert!(matches!(
            config.validate(),
            Err(PointError::MalformedMarkup { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_radius() {
        let config = PointConfig::new().with_r(f64::NAN);
        assert!(matches!(config.validate(), Err(PointError::InvalidRadius { .. })));

        let config = PointConfig::new().with_select_r(-1.0);
        assert!(matches!(config.validate(), Err(PointError::InvalidRadius { .. })));

        let config = PointConfig::new().with_bubble(BubbleSizing::new(10.0).with_max_r(-2.0));
        assert!(matches!(config.validate(), Err(PointError::InvalidRadius { .. })));
    }

    #[test]
    fn per_datum_radius() {
        let r = Radius::per_datum(|d| d.index as f64 + 1.0);
        assert_eq!(r.at(&DataPoint::new("a", 2, 0.0, 0.0)), 3.0);
    }

    #[test]
    fn bubble_area_scales_with_value() {
        let bubble = BubbleSizing::new(100.0).with_max_r(20.0);
        assert_eq!(bubble.radius(100.0), 20.0);
        assert_eq!(bubble.radius(25.0), 10.0);
        assert_eq!(bubble.radius(-5.0), 0.0);
        assert_eq!(BubbleSizing::new(0.0).radius(5.0), 0.0);
    }
}
