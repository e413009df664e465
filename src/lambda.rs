//! Callable values bound into a context. A lambda body can choose, tag by
//! tag, whether its output is raw text or a nested template to render.

use std::fmt::Write as _;

use crate::context::Stack;
use crate::delimiters::Delimiters;
use crate::partials::Partials;
use crate::Error;

/// A value invoked in place of ordinary interpolation or section
/// expansion. Constructed with [`crate::value::Value::lambda`] or by
/// implementing [`crate::value::Adapter::lambda`] directly.
pub struct Lambda {
    func: Box<dyn Fn(&mut LambdaContext) -> Result<(), Error>>,
}

impl Lambda {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut LambdaContext) -> Result<(), Error> + 'static,
    {
        Lambda { func: Box::new(func) }
    }

    pub(crate) fn invoke(&self, ctx: &mut LambdaContext) -> Result<(), Error> {
        (self.func)(ctx)
    }
}

/// Passed to a lambda body when it's invoked. Carries the raw, unrendered
/// text of the section it stands in for (empty for a plain interpolation
/// lambda) and the delimiters active at the call site, and accumulates the
/// lambda's output. `write` appends text verbatim; `render` parses and
/// renders a nested template into the same accumulator.
pub struct LambdaContext<'ctx, 'a> {
    pub inner_text: &'ctx str,
    pub delimiters: Delimiters,
    stack: &'ctx mut Stack<'a>,
    partials: &'ctx dyn Partials,
    buffer: String,
}

impl<'ctx, 'a> LambdaContext<'ctx, 'a> {
    pub(crate) fn new(
        inner_text: &'ctx str,
        delimiters: Delimiters,
        stack: &'ctx mut Stack<'a>,
        partials: &'ctx dyn Partials,
    ) -> Self {
        LambdaContext {
            inner_text,
            delimiters,
            stack,
            partials,
            buffer: String::new(),
        }
    }

    pub(crate) fn into_output(self) -> String {
        self.buffer
    }

    /// Appends `text` to the lambda's output verbatim, with no further
    /// mustache processing.
    pub fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Appends a formatted value to the lambda's output verbatim.
    pub fn write_fmt(&mut self, args: std::fmt::Arguments) {
        let _ = self.buffer.write_fmt(args);
    }

    /// Parses `template_text` with this context's delimiters, renders it
    /// against the current stack, and appends the result to the lambda's
    /// output.
    pub fn render(&mut self, template_text: &str) -> Result<(), Error> {
        let rendered = self.render_alloc(template_text)?;
        self.buffer.push_str(&rendered);
        Ok(())
    }

    /// Formats a template string, then renders it as [`render`] would.
    pub fn render_fmt(&mut self, args: std::fmt::Arguments) -> Result<(), Error> {
        let mut template_text = String::new();
        let _ = template_text.write_fmt(args);
        self.render(&template_text)
    }

    /// Parses and renders `template_text` against the current stack,
    /// returning the result as an owned string without touching this
    /// context's own output.
    pub fn render_alloc(&mut self, template_text: &str) -> Result<String, Error> {
        let elements = crate::parser::parse_with_delimiters(template_text, self.delimiters.clone())?;
        let mut sink = crate::sink::BufferSink::new();
        crate::render::render_elements(&elements, &mut sink, self.stack, self.partials)?;
        Ok(String::from_utf8(sink.into_inner()).expect("renderer only ever writes valid UTF-8"))
    }
}
