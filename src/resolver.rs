//! Pure dotted-path resolution against a context stack. A path's first
//! component resolves with ancestor fallback; every later component
//! resolves only against the previous result.

use crate::context::Stack;
use crate::lambda::Lambda;
use crate::value::Adapter;

/// The outcome of resolving a [`crate::path::Path`] against a [`Stack`].
pub enum Resolution<'a> {
    /// Resolved to an ordinary value.
    Field(&'a dyn Adapter),
    /// Resolved to a callable lambda.
    Lambda(&'a Lambda),
    /// A component past the first had no such field on the adapter it was
    /// looked up against; the chain cannot fall back to an ancestor frame
    /// from here, unlike an unresolved first component.
    ChainBroken,
    /// The first path component wasn't found in any stack frame.
    NotFoundInContext,
}

impl Resolution<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Resolution::Field(_) => "Field",
            Resolution::Lambda(_) => "Lambda",
            Resolution::ChainBroken => "ChainBroken",
            Resolution::NotFoundInContext => "NotFoundInContext",
        }
    }
}

/// Resolves `path` against `stack`. A bare `.` resolves to the stack's top
/// frame; anything else resolves its first component with ancestor
/// fallback and walks remaining components strictly against the previous
/// result.
pub fn resolve<'a>(stack: &Stack<'a>, path: &crate::path::Path) -> Resolution<'a> {
    let resolution = resolve_inner(stack, path);
    log::trace!("resolved `{}` to {}", path, resolution.kind());
    resolution
}

fn resolve_inner<'a>(stack: &Stack<'a>, path: &crate::path::Path) -> Resolution<'a> {
    if path.is_dot() {
        return to_resolution(stack.top());
    }

    let components = path.components();
    let mut current = match stack.lookup_first(&components[0]) {
        Some(adapter) => adapter,
        None => return Resolution::NotFoundInContext,
    };

    for name in &components[1..] {
        current = match current.get_field(name) {
            Some(adapter) => adapter,
            None => return Resolution::ChainBroken,
        };
    }

    to_resolution(current)
}

fn to_resolution(adapter: &dyn Adapter) -> Resolution {
    match adapter.lambda() {
        Some(lambda) => Resolution::Lambda(lambda),
        None => Resolution::Field(adapter),
    }
}
