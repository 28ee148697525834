//! Point type resolution.
//!
//! Distinct data identities take pattern slots in first-seen order; the slot
//! picks the selector, and the selector is classified once into a [`Shape`].

use std::collections::HashMap;

use crate::config::{PointConfig, PointSelector, ShapeToken};
use crate::errors::PointError;

use super::context::PointContext;
use super::defs::{DefinitionPool, register_if_absent};
use super::shapes::{CircleShape, CustomShape, RectangleShape, Shape, UseShape};

pub struct PointTypeResolver {
    pattern: Vec<PointSelector>,
    /// Identities in first-seen order; never shrinks
    seen: Vec<String>,
    slots: HashMap<String, usize>,
    resolved: HashMap<String, Shape>,
}

impl PointTypeResolver {
    /// An empty pattern behaves as `["circle"]`.
    pub fn new(mut pattern: Vec<PointSelector>) -> Self {
        if pattern.is_empty() {
            pattern.push(PointSelector::Token(ShapeToken::Circle));
        }
        Self {
            pattern,
            seen: Vec::new(),
            slots: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    pub fn from_config(config: &PointConfig) -> Self {
        Self::new(config.effective_pattern())
    }

    /// Identities seen so far, in first-seen order
    pub fn seen(&self) -> &[String] {
        &self.seen
    }

    /// Position of `identity` among the seen identities, recording it first
    /// when new.
    pub fn slot(&mut self, identity: &str) -> usize {
        if let Some(&slot) = self.slots.get(identity) {
            return slot;
        }
        let slot = self.seen.len();
        self.seen.push(identity.to_string());
        self.slots.insert(identity.to_string(), slot);
        crate::log::debug!(identity, slot, "point identity assigned");
        slot
    }

    /// Pattern entry governing `identity`
    pub fn selector_for(&mut self, identity: &str) -> &PointSelector {
        let slot = self.slot(identity);
        &self.pattern[slot % self.pattern.len()]
    }

    /// Shape for `identity`, classifying its pattern entry on first use.
    ///
    /// Inline markup is registered in `pool` under the identity's synthetic
    /// id unless a definition already exists there. Failures are not cached,
    /// so retrying reproduces them.
    pub fn resolve(
        &mut self,
        ctx: &PointContext,
        pool: &mut dyn DefinitionPool,
        identity: &str,
    ) -> Result<Shape, PointError> {
        if let Some(shape) = self.resolved.get(identity) {
            return Ok(shape.clone());
        }

        let shape = match self.selector_for(identity).clone() {
            PointSelector::Token(ShapeToken::Circle) => Shape::from(CircleShape),
            PointSelector::Token(ShapeToken::Rectangle) => Shape::from(RectangleShape),
            PointSelector::Token(ShapeToken::Use) => {
                Shape::from(UseShape::new(ctx.synthetic_id(identity)))
            }
            PointSelector::Token(token @ (ShapeToken::Polygon | ShapeToken::Ellipse)) => {
                crate::log::warn!(shape = token.name(), "reserved point shape has no renderer");
                return Err(PointError::UnsupportedShape {
                    name: token.name().to_string(),
                });
            }
            PointSelector::Custom(draw) => Shape::from(CustomShape(draw)),
            PointSelector::Markup(markup) => {
                let id = ctx.synthetic_id(identity);
                register_if_absent(pool, &markup, &id)?;
                Shape::from(UseShape::new(id))
            }
        };

        self.resolved.insert(identity.to_string(), shape.clone());
        Ok(shape)
    }
}
