//! Runs the rendering specification's concrete scenario table as YAML
//! fixtures, the same way the teacher's `tests/spec.rs` loaded the
//! upstream Mustache spec suite's YAML files and rendered each case.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use stache::{Template, Value};
use yaml_rust::{Yaml, YamlLoader};

#[test]
fn scenarios() {
    let document = document(Path::new("tests/fixtures/scenarios.yml"));
    let cases = document["tests"].as_vec().expect("fixture has a `tests` list");

    for case in cases {
        let name = case["name"].as_str().expect("each case is named");
        let template_text = case["template"].as_str().expect("each case has a template");
        let expected = case["expected"].as_str().expect("each case has an expected output");
        let data = to_value(&case["data"]);

        let template = Template::parse(template_text)
            .unwrap_or_else(|e| panic!("{}: template failed to parse: {}", name, e));
        let rendered = template
            .render_alloc(&data)
            .unwrap_or_else(|e| panic!("{}: render failed: {}", name, e));
        let rendered = String::from_utf8(rendered).expect("renderer only writes valid UTF-8");

        assert_eq!(expected, rendered, "scenario `{}`", name);
    }
}

fn document(path: &Path) -> Yaml {
    let mut file = File::open(path).unwrap_or_else(|e| panic!("{:?}: {}", path, e));
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();

    let mut docs = YamlLoader::load_from_str(&contents).unwrap();
    docs.pop().expect("fixture file has at least one document")
}

/// Converts a YAML value into the crate's dynamic [`Value`] tree, the same
/// conversion `src/bin/stache.rs` performs for the `-d` CLI flag's data
/// file.
fn to_value(yaml: &Yaml) -> Value {
    match yaml {
        Yaml::Null | Yaml::BadValue => Value::Null,
        Yaml::Boolean(b) => Value::Bool(*b),
        Yaml::Integer(i) => Value::Integer(*i),
        Yaml::Real(text) => text.parse().map(Value::Float).unwrap_or(Value::Null),
        Yaml::String(s) => Value::text(s.clone()),
        Yaml::Array(items) => Value::Array(items.iter().map(to_value).collect()),
        Yaml::Hash(pairs) => {
            let mut fields = BTreeMap::new();
            for (key, value) in pairs {
                if let Some(key) = key.as_str() {
                    fields.insert(String::from(key), to_value(value));
                }
            }
            Value::Object(fields)
        }
        Yaml::Alias(_) => Value::Null,
    }
}
