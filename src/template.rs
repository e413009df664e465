//! The caller-facing entry points: parse template text once into an
//! `Element` tree, then render it any number of times against different
//! data and partials.

use std::fs;
use std::io::Write;
use std::path::Path as FsPath;

use crate::context::Stack;
use crate::element::Element;
use crate::error::Error;
use crate::partials::{NoPartials, Partials};
use crate::render::render_elements;
use crate::sink::{BufferSink, Sink, WriterSink};
use crate::value::Adapter;

/// A parsed Mustache template, ready to render against any data that
/// implements [`Adapter`]. Parsing happens once; the same `Template` can
/// be rendered repeatedly.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    elements: Vec<Element>,
}

impl Template {
    /// Parses `source` into a `Template`. Fails with [`Error::Parse`] on
    /// malformed tags, mismatched section open/close pairs, or an
    /// unclosed section.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let elements = crate::parser::parse(source)?;
        Ok(Template { elements })
    }

    /// Reads `path` from disk and parses it. Fails with [`Error::Io`] if
    /// the file can't be read.
    pub fn from_file<P: AsRef<FsPath>>(path: P) -> Result<Self, Error> {
        let source = fs::read_to_string(path)?;
        Template::parse(&source)
    }

    /// Renders this template against `data`, streaming output to `writer`,
    /// with no partials available.
    pub fn render<W: Write>(&self, writer: &mut W, data: &dyn Adapter) -> Result<(), Error> {
        self.render_with_partials(writer, data, &NoPartials)
    }

    /// Renders this template against `data` and `partials`, streaming
    /// output to `writer`.
    pub fn render_with_partials<W: Write>(
        &self,
        writer: &mut W,
        data: &dyn Adapter,
        partials: &dyn Partials,
    ) -> Result<(), Error> {
        let mut sink = WriterSink::new(writer);
        self.render_to_sink(&mut sink, data, partials)
    }

    /// Renders this template against `data` into a freshly allocated
    /// buffer, with no partials available.
    pub fn render_alloc(&self, data: &dyn Adapter) -> Result<Vec<u8>, Error> {
        self.render_alloc_with_partials(data, &NoPartials)
    }

    /// Renders this template against `data` and `partials` into a freshly
    /// allocated buffer.
    pub fn render_alloc_with_partials(
        &self,
        data: &dyn Adapter,
        partials: &dyn Partials,
    ) -> Result<Vec<u8>, Error> {
        let mut sink = BufferSink::new();
        self.render_to_sink(&mut sink, data, partials)?;
        Ok(sink.into_inner())
    }

    fn render_to_sink(
        &self,
        sink: &mut dyn Sink,
        data: &dyn Adapter,
        partials: &dyn Partials,
    ) -> Result<(), Error> {
        let mut stack = Stack::new(data);
        render_elements(&self.elements, sink, &mut stack, partials)
    }
}

/// Parses `template_text` and streams its rendering of `data` to `writer`,
/// with no partials available.
pub fn render_from_string<W: Write>(
    template_text: &str,
    data: &dyn Adapter,
    writer: &mut W,
) -> Result<(), Error> {
    Template::parse(template_text)?.render(writer, data)
}

/// Parses `template_text` and renders `data` into a freshly allocated
/// buffer, with no partials available.
pub fn render_from_string_alloc(template_text: &str, data: &dyn Adapter) -> Result<Vec<u8>, Error> {
    Template::parse(template_text)?.render_alloc(data)
}

/// Loads, parses, and streams the rendering of the template at `path`
/// against `data` to `writer`.
pub fn render_from_file<W: Write>(
    path: impl AsRef<FsPath>,
    data: &dyn Adapter,
    writer: &mut W,
) -> Result<(), Error> {
    Template::from_file(path)?.render(writer, data)
}

/// Loads, parses, and renders the template at `path` against `data` into a
/// freshly allocated buffer.
pub fn render_from_file_alloc(
    path: impl AsRef<FsPath>,
    data: &dyn Adapter,
) -> Result<Vec<u8>, Error> {
    Template::from_file(path)?.render_alloc(data)
}
