use jsondelta::DiffOptions;
use std::{env::args_os, fs, io::Read as _, io::stdin, process::exit};

fn usage(header: bool) -> ! {
    let pkg_name = env!("CARGO_PKG_NAME");
    let pkg_ver = env!("CARGO_PKG_VERSION");
    let exe_path = args_os().next();
    let exe_path = exe_path
        .as_deref()
        .and_then(|path| path.to_str())
        .unwrap_or(pkg_name);
    if header {
        eprintln!("{} {}", pkg_name, pkg_ver);
        eprintln!("RFC 6902 JSON patch calculation tool");
    }
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    {} diff ./original.json ./changed.json", exe_path);
    eprintln!("    {} merge ./original.json ./patch.json", exe_path);
    eprintln!();
    eprintln!("    A dash (-) can be used to read a json document from stdin.");
    exit(1);
}

enum Op {
    Diff,
    Merge,
}

fn read_input(path: &std::ffi::OsStr) -> Vec<u8> {
    let read_result = if path.to_str() == Some("-") {
        let mut buf = Vec::new();
        stdin().read_to_end(&mut buf).map(|_| buf)
    } else {
        fs::read(path)
    };
    match read_result {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Could not read {}: {}", path.to_string_lossy(), e);
            exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let argv = args_os().collect::<Vec<_>>();
    let (op, original, a2) = match &argv[..] {
        [] => usage(true),
        [_, op, original, a2] => (op, original, a2),
        _ => {
            eprintln!("Wrong number of arguments, expecting precisely three!");
            usage(false)
        }
    };
    let op = match op.to_str() {
        Some("diff") => Op::Diff,
        Some("merge") => Op::Merge,
        op => {
            eprintln!("Unknown operation: {}", op.unwrap_or("[UTF-8 invalid]"));
            usage(false);
        }
    };

    let original_bytes = read_input(original);
    let a2_bytes = read_input(a2);

    let original = match jsondelta::parse(&original_bytes) {
        Ok(node) => node,
        Err(e) => {
            eprintln!("Could not parse first document: {}", e);
            exit(1);
        }
    };
    let a2 = match jsondelta::parse(&a2_bytes) {
        Ok(node) => node,
        Err(e) => {
            eprintln!("Could not parse second document: {}", e);
            exit(1);
        }
    };

    match op {
        Op::Diff => {
            let ops = jsondelta::diff(&original, &a2, DiffOptions::new());
            let patch = jsondelta::Patch(ops);
            let bytes = jsondelta::serialize(&patch.to_node());
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        Op::Merge => {
            let merged = jsondelta::merge(&original, &a2);
            println!("{}", String::from_utf8_lossy(&jsondelta::serialize(&merged)));
        }
    };
}
