use quill_fix_wasm::{normalize_html, sanitize, BindingTable};
use std::env;

const USAGE: &str = "usage: probe <html> | probe --bindings <json>";

fn main() {
    let mut args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    let bindings = if args.first().map(|s| s.as_str()) == Some("--bindings") {
        args.remove(0);
        true
    } else {
        false
    };

    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    let input = args.join(" ");
    if !bindings {
        println!("{}", normalize_html(&input));
        return;
    }

    match BindingTable::from_json(&input) {
        Ok(mut table) => {
            let removed = sanitize(&mut table);
            for name in &removed {
                eprintln!("removed: {name}");
            }
            match table.to_json() {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
