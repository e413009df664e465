//! End-to-end rendering tests through the public `Template` API: partials,
//! lambdas, and caller-defined `Adapter` types, none of which fit the
//! YAML fixture format used by `tests/spec.rs`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use stache::{Adapter, Error, Escape, Sink, Template, Value};

fn object(pairs: Vec<(&str, Value)>) -> Value {
    let mut fields = BTreeMap::new();
    for (key, value) in pairs {
        fields.insert(String::from(key), value);
    }
    Value::Object(fields)
}

#[test]
fn partial_inherits_indent_on_every_line() {
    let template = Template::parse("Menu:\n  {{>item}}\n").unwrap();
    let mut partials = HashMap::new();
    partials.insert(String::from("item"), String::from("- {{name}}\n- {{price}}\n"));
    let data = object(vec![("name", Value::text("Tea")), ("price", Value::Integer(3))]);

    let rendered = template.render_alloc_with_partials(&data, &partials).unwrap();
    assert_eq!(
        "Menu:\n  - Tea\n  - 3\n",
        String::from_utf8(rendered).unwrap()
    );
}

#[test]
fn missing_partial_is_silently_empty() {
    let template = Template::parse("[{{>nope}}]").unwrap();
    let rendered = template.render_alloc(&Value::Null).unwrap();
    assert_eq!(b"[]".to_vec(), rendered);
}

#[test]
fn lambda_mutating_shared_state_is_observed_on_rerender() {
    let template = Template::parse("{{count}}").unwrap();
    let calls = RefCell::new(0);
    let data = object(vec![(
        "count",
        Value::lambda(move |ctx| {
            let mut calls = calls.borrow_mut();
            *calls += 1;
            ctx.write_fmt(format_args!("{}", calls));
            Ok(())
        }),
    )]);

    assert_eq!(b"1".to_vec(), template.render_alloc(&data).unwrap());
    assert_eq!(b"2".to_vec(), template.render_alloc(&data).unwrap());
}

#[test]
fn section_lambda_can_render_nested_tags_against_the_stack() {
    let template = Template::parse("{{#wrapped}}{{name}}{{/wrapped}}").unwrap();
    let data = object(vec![
        ("name", Value::text("Chris")),
        (
            "wrapped",
            Value::lambda(|ctx| {
                let text = ctx.inner_text.to_string();
                ctx.write("<b>");
                ctx.render(&text)?;
                ctx.write("</b>");
                Ok(())
            }),
        ),
    ]);

    assert_eq!(b"<b>Chris</b>".to_vec(), template.render_alloc(&data).unwrap());
}

/// A small record type implementing `Adapter` directly, rather than going
/// through `Value`, to exercise the trait's blanket-impl-free path (§9's
/// "strongly typed callers may... provide a zero-cost adapter").
struct Person {
    name: String,
    age: u32,
}

impl Adapter for Person {
    fn interpolate(&self, _sink: &mut dyn Sink, _escape: Escape) -> Result<(), Error> {
        Ok(())
    }

    fn get_field<'a>(&'a self, name: &str) -> Option<&'a dyn Adapter> {
        match name {
            "name" => Some(&self.name as &dyn Adapter),
            "age" => Some(&self.age as &dyn Adapter),
            _ => None,
        }
    }
}

#[test]
fn user_defined_adapter_resolves_fields() {
    let template = Template::parse("{{name}} is {{age}}").unwrap();
    let person = Person {
        name: String::from("Chris"),
        age: 30,
    };
    let rendered = template.render_alloc(&person).unwrap();
    assert_eq!("Chris is 30", String::from_utf8(rendered).unwrap());
}

/// A record whose field is a plain `Option<String>`, exercising the
/// library-provided `Adapter` impl for `Option<T>` rather than `Value`'s
/// own `Null` variant (§9's optional/pointer transparency).
struct Profile {
    nickname: Option<String>,
}

impl Adapter for Profile {
    fn interpolate(&self, _sink: &mut dyn Sink, _escape: Escape) -> Result<(), Error> {
        Ok(())
    }

    fn get_field<'a>(&'a self, name: &str) -> Option<&'a dyn Adapter> {
        match name {
            "nickname" => Some(&self.nickname as &dyn Adapter),
            _ => None,
        }
    }
}

#[test]
fn option_wrapped_field_is_transparent_when_present() {
    let template = Template::parse("[{{nickname}}]").unwrap();
    let profile = Profile { nickname: Some(String::from("Kit")) };
    assert_eq!(b"[Kit]".to_vec(), template.render_alloc(&profile).unwrap());
}

#[test]
fn option_wrapped_field_is_empty_when_absent() {
    let template = Template::parse("[{{nickname}}]{{^nickname}}none{{/nickname}}").unwrap();
    let profile = Profile { nickname: None };
    let rendered = template.render_alloc(&profile).unwrap();
    assert_eq!("[]none", String::from_utf8(rendered).unwrap());
}

#[test]
fn render_from_string_matches_template_render() {
    let data = object(vec![("x", Value::Integer(42))]);
    let bytes = stache::render_from_string_alloc("{{x}}", &data).unwrap();
    assert_eq!(b"42".to_vec(), bytes);
}
