//! Command-line front end: renders a Mustache template file against a YAML
//! data file and writes the result to a file or stdout.

use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::exit;

use getopts::Options;
use stache::{Template, Value};
use yaml_rust::{Yaml, YamlLoader};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut opts = Options::new();
    opts.optflag("h", "help", "Print this message");
    opts.reqopt("t", "template", "Path to the Mustache template file", "FILE");
    opts.optopt("d", "data", "Path to a YAML file of render data", "FILE");
    opts.optopt("o", "output", "Write rendered output to FILE instead of stdout", "FILE");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            usage(&opts);
            eprintln!("{}", e);
            exit(1);
        }
    };

    if matches.opt_present("h") {
        usage(&opts);
        exit(0);
    }

    let template_path = PathBuf::from(matches.opt_str("t").expect("reqopt guarantees presence"));
    let data = match matches.opt_str("d") {
        Some(path) => match load_data(&path) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("{}", e);
                exit(1);
            }
        },
        None => Value::Null,
    };

    let template = match Template::from_file(&template_path) {
        Ok(template) => template,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    let result = match matches.opt_str("o") {
        Some(path) => File::create(path).map_err(stache::Error::from).and_then(|file| {
            let mut writer = BufWriter::new(file);
            template.render(&mut writer, &data)
        }),
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            template.render(&mut writer, &data)
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        exit(1);
    }
}

/// Reads and parses a YAML file into a [`Value`] tree the renderer can
/// bind as a template's root context.
fn load_data(path: &str) -> Result<Value, stache::Error> {
    let text = std::fs::read_to_string(path)?;
    let mut docs = YamlLoader::load_from_str(&text).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("{}: {}", path, e))
    })?;
    let doc = docs.pop().unwrap_or(Yaml::Null);
    Ok(to_value(&doc))
}

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

fn usage(opts: &Options) {
    let brief = "Mustache template renderer\n\nUsage:\n    stache -t FILE [-d FILE] [-o FILE]";
    println!("{}", opts.usage(brief));
}
