//! The element-tree walker: the one piece of the core that actually
//! produces output, by driving the path resolver against each tag and
//! writing the result to a [`Sink`].

use crate::context::Stack;
use crate::delimiters::Delimiters;
use crate::element::{Element, Escape};
use crate::error::Error;
use crate::lambda::{Lambda, LambdaContext};
use crate::partials::Partials;
use crate::path::Path;
use crate::resolver::{resolve, Resolution};
use crate::sink::{BufferSink, EscapingSink, Sink};

/// Renders a full element sequence (a template body, a section's
/// children, or a partial's parsed tree) against `stack`, writing output
/// to `sink`.
pub fn render_elements(
    elements: &[Element],
    sink: &mut dyn Sink,
    stack: &mut Stack<'_>,
    partials: &dyn Partials,
) -> Result<(), Error> {
    for element in elements {
        render_element(element, sink, stack, partials)?;
    }
    Ok(())
}

fn render_element(
    element: &Element,
    sink: &mut dyn Sink,
    stack: &mut Stack<'_>,
    partials: &dyn Partials,
) -> Result<(), Error> {
    match element {
        Element::StaticText(text) => Ok(sink.write_str(text)?),
        Element::Interpolation { path, escape } => {
            render_interpolation(path, *escape, sink, stack, partials)
        }
        Element::Section {
            path,
            children,
            inner_text,
            delimiters,
        } => render_section(path, children, inner_text, delimiters, sink, stack, partials),
        Element::InvertedSection { path, children } => {
            render_inverted(path, children, sink, stack, partials)
        }
        Element::Partial { name, indent } => render_partial(name, indent, sink, stack, partials),
    }
}

/// `{{name}}` / `{{{name}}}` / `{{&name}}`. A missing key or a broken
/// dotted chain both render as empty text; only a field resolution writes
/// bytes, and a lambda resolution is expanded with no enclosing section
/// text and the default delimiters.
fn render_interpolation(
    path: &Path,
    escape: Escape,
    sink: &mut dyn Sink,
    stack: &mut Stack<'_>,
    partials: &dyn Partials,
) -> Result<(), Error> {
    match resolve(stack, path) {
        Resolution::Field(adapter) => adapter.interpolate(sink, escape),
        Resolution::Lambda(lambda) => {
            let output = invoke_lambda(lambda, "", Delimiters::default(), stack, partials)?;
            write_escaped(sink, &output, escape)
        }
        Resolution::ChainBroken | Resolution::NotFoundInContext => Ok(()),
    }
}

/// `{{#path}}...{{/path}}`. A lambda is expanded once, raw, with the
/// section's own source text and delimiters passed through so it can
/// re-parse. An ordinary field is iterated: each yielded item is pushed as
/// a new frame, the section's children render against it, then the frame
/// is popped, once per item, in order.
fn render_section(
    path: &Path,
    children: &[Element],
    inner_text: &str,
    delimiters: &Delimiters,
    sink: &mut dyn Sink,
    stack: &mut Stack<'_>,
    partials: &dyn Partials,
) -> Result<(), Error> {
    match resolve(stack, path) {
        Resolution::Lambda(lambda) => {
            let output = invoke_lambda(lambda, inner_text, delimiters.clone(), stack, partials)?;
            Ok(sink.write_str(&output)?)
        }
        Resolution::Field(adapter) => {
            for item in adapter.iterate() {
                stack.push(item);
                let result = render_elements(children, sink, stack, partials);
                stack.pop();
                result?;
            }
            Ok(())
        }
        Resolution::ChainBroken | Resolution::NotFoundInContext => Ok(()),
    }
}

/// `{{^path}}...{{/path}}`. Renders its children exactly when the
/// resolved value is falsey; a lambda is always truthy here, so it always
/// suppresses the body, and a missing key or broken chain counts as
/// falsey.
fn render_inverted(
    path: &Path,
    children: &[Element],
    sink: &mut dyn Sink,
    stack: &mut Stack<'_>,
    partials: &dyn Partials,
) -> Result<(), Error> {
    let falsey = match resolve(stack, path) {
        Resolution::Lambda(_) => false,
        Resolution::Field(adapter) => !adapter.truthy(),
        Resolution::ChainBroken | Resolution::NotFoundInContext => true,
    };
    if falsey {
        render_elements(children, sink, stack, partials)
    } else {
        Ok(())
    }
}

/// `{{> name}}`. A partial absent from the map renders as nothing; a
/// present one is parsed with default delimiters and rendered against the
/// *current* stack, with every line of its output prefixed by the indent
/// captured at the call site.
fn render_partial(
    name: &str,
    indent: &str,
    sink: &mut dyn Sink,
    stack: &mut Stack<'_>,
    partials: &dyn Partials,
) -> Result<(), Error> {
    let source = match partials.get(name) {
        Some(source) => source,
        None => {
            log::warn!("partial `{}` has no entry in the partials map", name);
            return Ok(());
        }
    };
    let elements = crate::parser::parse(source)?;
    if indent.is_empty() {
        return render_elements(&elements, sink, stack, partials);
    }

    let mut buffer = BufferSink::new();
    render_elements(&elements, &mut buffer, stack, partials)?;
    let rendered =
        String::from_utf8(buffer.into_inner()).expect("renderer only ever writes valid UTF-8");
    write_indented(sink, &rendered, indent)
}

fn invoke_lambda(
    lambda: &Lambda,
    inner_text: &str,
    delimiters: Delimiters,
    stack: &mut Stack<'_>,
    partials: &dyn Partials,
) -> Result<String, Error> {
    log::debug!("invoking lambda over inner text of {} byte(s)", inner_text.len());
    let mut ctx = LambdaContext::new(inner_text, delimiters, stack, partials);
    lambda.invoke(&mut ctx)?;
    let output = ctx.into_output();
    log::debug!("lambda produced {} byte(s) of output", output.len());
    Ok(output)
}

fn write_escaped(sink: &mut dyn Sink, text: &str, escape: Escape) -> Result<(), Error> {
    match escape {
        Escape::Escaped => {
            let mut escaping = EscapingSink::new(sink);
            escaping.write_str(text)?;
        }
        Escape::Unescaped => sink.write_str(text)?,
    }
    Ok(())
}

/// Prefixes every line of `text` with `indent`, including blank lines, but
/// never appends a trailing indent after a final newline with nothing
/// following it (the standalone-partial indentation rule).
fn write_indented(sink: &mut dyn Sink, text: &str, indent: &str) -> Result<(), Error> {
    let mut rest = text;
    while !rest.is_empty() {
        sink.write_str(indent)?;
        match rest.find('\n') {
            Some(i) => {
                sink.write_str(&rest[..=i])?;
                rest = &rest[i + 1..];
            }
            None => {
                sink.write_str(rest)?;
                rest = "";
            }
        }
    }
    Ok(())
}
