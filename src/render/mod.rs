//! Point rendering
//!
//! [`PointRenderer`] ties the pieces together: for each datum element it asks
//! the resolver which shape governs the datum's identity, then hands the
//! create/update call to that shape.

pub mod context;
pub mod defaults;
pub mod defs;
pub mod resolver;
pub mod shapes;
pub mod transition;

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::dom::{Node, Selection, Staged};
use crate::errors::PointError;
use crate::types::DataPoint;

use context::PointContext;
use defs::{DefinitionPool, SvgDefs};
use resolver::PointTypeResolver;
use shapes::{CreateArgs, PointShape, Shape, UpdateArgs};

/// Which shape operation a handler performs.
#[derive(Clone, Copy)]
pub enum Method<'a> {
    Create(CreateArgs<'a>),
    Update(UpdateArgs<'a>),
}

/// What a handler produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    Created(Node),
    Updated(Staged),
}

/// Draws and moves points for one chart.
///
/// Owns the identity → shape assignments for the session and the pool that
/// externally defined markup is registered in.
pub struct PointRenderer<P: DefinitionPool = SvgDefs> {
    ctx: PointContext,
    resolver: RefCell<PointTypeResolver>,
    defs: RefCell<P>,
}

impl<P: DefinitionPool> PointRenderer<P> {
    /// Validates the context's configuration, so reserved shapes, malformed
    /// markup and bad radii are rejected before anything is drawn.
    pub fn new(ctx: PointContext, defs: P) -> Result<Self, PointError> {
        ctx.config().validate()?;
        let resolver = PointTypeResolver::from_config(ctx.config());
        Ok(Self {
            ctx,
            resolver: RefCell::new(resolver),
            defs: RefCell::new(defs),
        })
    }

    pub fn context(&self) -> &PointContext {
        &self.ctx
    }

    pub fn defs(&self) -> Ref<'_, P> {
        self.defs.borrow()
    }

    /// Identities seen so far, in first-seen order
    pub fn seen(&self) -> Vec<String> {
        self.resolver.borrow().seen().to_vec()
    }

    /// Shape governing `datum`, registering its markup definition if needed.
    pub fn shape_for(&self, datum: &DataPoint) -> Result<Shape, PointError> {
        let identity = datum.identity();
        let mut defs = self.defs.borrow_mut();
        self.resolver
            .borrow_mut()
            .resolve(&self.ctx, &mut *defs, &identity)
    }

    /// Datum, selection and shape for one point element.
    fn prepare(&self, element: &Node) -> Result<(Rc<DataPoint>, Selection, Shape), PointError> {
        let datum = element.datum().ok_or(PointError::MissingDatum)?;
        let shape = self.shape_for(&datum)?;
        Ok((datum, Selection::from(element.clone()), shape))
    }

    /// Per-element handler for `method`.
    ///
    /// The handler reads the datum bound to the element it is given, so the
    /// same closure serves every point of a series.
    pub fn handler<'a>(
        &'a self,
        method: Method<'a>,
    ) -> impl Fn(&Node) -> Result<Outcome, PointError> + 'a {
        move |element: &Node| match &method {
            Method::Create(args) => self.create(element, *args).map(Outcome::Created),
            Method::Update(args) => self.update(element, *args).map(Outcome::Updated),
        }
    }

    /// Draw the point for the datum bound to `element` (usually its group).
    pub fn create(&self, element: &Node, args: CreateArgs<'_>) -> Result<Node, PointError> {
        let (datum, selection, shape) = self.prepare(element)?;
        let point_id = self.ctx.synthetic_id(&datum.identity());
        shape.create(&self.ctx, &selection, &point_id, &args)
    }

    /// Reposition and restyle the point drawn in `element`.
    pub fn update(&self, element: &Node, args: UpdateArgs<'_>) -> Result<Staged, PointError> {
        let (_, selection, shape) = self.prepare(element)?;
        shape.update(&self.ctx, &selection, &args)
    }
}
