use std::process;

use anyhow::{bail, Context};
use memstore::{Arg, Key, MemoryRead, MemoryStore, MemoryWrite, Value};
use tracing::error;

const USAGE: &str = "usage: memstore <db-path> <command> [args...]

commands:
  init                     create the store file and schema
  get <key>                print the value stored under <key>
  exists <key>             print whether <key> is set
  set <key> <value> ...    store one or more key/value pairs
  delete <key>             remove the value under <key>
  clear                    remove every value";

fn main() {
    // Initialize logging (INFO by default, RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        process::exit(2);
    }

    let path = &args[0];
    let command = args[1].as_str();

    // Startup integrity failures are fatal here: no half-open handle
    let store = match open_store(path, command) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open memory store: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&store, command, &args[2..]) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn open_store(path: &str, command: &str) -> memstore::Result<MemoryStore> {
    if command == "init" {
        MemoryStore::create(path)
    } else {
        MemoryStore::open(path)
    }
}

fn run(store: &MemoryStore, command: &str, args: &[String]) -> anyhow::Result<()> {
    match command {
        "init" => {
            println!("ok");
            Ok(())
        }
        "get" => {
            let key = single_key(command, args)?;
            match store.get(&key) {
                Some(value) => println!("{}", render(value)),
                None => println!("(nil)"),
            }
            Ok(())
        }
        "exists" => {
            let key = single_key(command, args)?;
            println!("{}", store.exists(&key));
            Ok(())
        }
        "set" => {
            if args.is_empty() {
                bail!("'set' needs at least one key and one value");
            }
            // Keys from the command line are text; values keep their JSON type
            let pairs = args
                .iter()
                .enumerate()
                .map(|(i, token)| {
                    if i % 2 == 0 {
                        Arg::from(token.as_str())
                    } else {
                        parse_value(token)
                    }
                })
                .collect();
            store.set(pairs).context("set failed")?;
            println!("ok");
            Ok(())
        }
        "delete" => {
            let key = single_key(command, args)?;
            store.delete(&key).context("delete failed")?;
            println!("ok");
            Ok(())
        }
        "clear" => {
            store.clear().context("clear failed")?;
            println!("ok");
            Ok(())
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}

fn single_key(command: &str, args: &[String]) -> anyhow::Result<Key> {
    match args {
        [key] => Ok(Key::from(key.as_str())),
        _ => bail!("'{}' takes exactly one key", command),
    }
}

/// Classify a command-line token: JSON scalars and documents keep their
/// type, anything that does not parse is stored as text
fn parse_value(token: &str) -> Arg {
    match serde_json::from_str::<serde_json::Value>(token) {
        Ok(serde_json::Value::String(s)) => Arg::Text(s),
        Ok(serde_json::Value::Bool(b)) => Arg::Bool(b),
        Ok(serde_json::Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Arg::Int(i),
            (None, Some(f)) => Arg::Float(f),
            (None, None) => Arg::Json(serde_json::Value::Number(n)),
        },
        Ok(doc) => Arg::Json(doc),
        Err(_) => Arg::Text(token.to_string()),
    }
}

fn render(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{:?}", f),
        Value::Json(doc) => doc.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_classification() {
        assert!(matches!(parse_value("42"), Arg::Int(42)));
        assert!(matches!(parse_value("2.5"), Arg::Float(_)));
        assert!(matches!(parse_value("true"), Arg::Bool(true)));
        assert!(matches!(parse_value("\"quoted\""), Arg::Text(_)));
        assert!(matches!(parse_value("[1,2]"), Arg::Json(_)));
        assert!(matches!(parse_value("plain text"), Arg::Text(_)));
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(render(Value::Int(7)), "7");
        assert_eq!(render(Value::Float(1.0)), "1.0");
        assert_eq!(render(Value::from("text")), "text");
    }
}
