//! tsf-cli - Tool for inspecting track and track scalar files.

use std::path::Path;

use serde_json::json;
use track_scalars::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const LOG_QUIET: &str = "error";
const LOG_INFO: &str = "info";
const LOG_DEBUG: &str = "debug";
const LOG_TRACE: &str = "trace";

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse global flags
    let mut level = LOG_INFO;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = LOG_DEBUG,
            "-vv" | "--trace" => level = LOG_TRACE,
            "-q" | "--quiet" => level = LOG_QUIET,
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "info" | "i" => {
            let Some(path) = filtered_args.get(1).filter(|s| !s.starts_with('-')) else {
                usage_error("tsf-cli info <file> [--json]");
            };
            let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
            cmd_info(path, json_mode)
        }
        "dump" | "d" => {
            let Some(path) = filtered_args.get(1) else {
                usage_error("tsf-cli dump <file.tsf>");
            };
            cmd_dump(path)
        }
        "check" | "c" => {
            let files: Vec<&str> = filtered_args[1..]
                .iter()
                .copied()
                .filter(|s| !s.starts_with('-'))
                .collect();
            if files.len() != 2 {
                usage_error("tsf-cli check <a> <b> [--strict]");
            }
            let strict = filtered_args.iter().any(|&s| s == "--strict" || s == "-s");
            cmd_check(files[0], files[1], strict)
        }
        "version" | "-V" | "--version" => {
            print_version();
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            if Path::new(other).exists() {
                cmd_info(other, false)
            } else {
                eprintln!("Unknown command: {}", other);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Error: missing arguments");
    eprintln!("Usage: {}", usage);
    std::process::exit(1);
}

fn print_version() {
    println!(
        "tsf-cli {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("TSF_BUILD_DATE"),
        env!("TSF_BUILD_TIME"),
    );
}

fn print_help() {
    println!("tsf-cli - track scalar file toolkit");
    println!();
    println!("USAGE:");
    println!("    tsf-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file> [--json]       Show header of a .tck or .tsf file");
    println!("    d, dump   <file.tsf>            Print scalars, one streamline per line");
    println!("    c, check  <a> <b> [--strict]    Verify two files belong together");
    println!("    version                         Show version and build date");
    println!("    h, help                         Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Debug output");
    println!("    -vv, --trace     Trace output");
    println!("    -q, --quiet      Errors only");
    println!();
    println!("RUST_LOG overrides the log level when set.");
}

fn cmd_info(path: &str, json_mode: bool) -> Result<()> {
    info!("Reading header: {}", path);
    let header = Header::load(path)?;
    let props = &header.properties;

    if json_mode {
        let entries: serde_json::Map<String, serde_json::Value> = props
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        let doc = json!({
            "file": path,
            "kind": header.kind.description(),
            "datatype": header.datatype.name(),
            "timestamp": props.timestamp(),
            "count": props.count(),
            "total_count": props.total_count(),
            "data_offset": header.layout.data_offset,
            "properties": entries,
            "comments": props.comments(),
        });
        let text = serde_json::to_string_pretty(&doc).map_err(|e| Error::other(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    println!("File:        {}", path);
    println!("Kind:        {}", header.kind);
    println!("Datatype:    {}", header.datatype);
    println!("Timestamp:   {}", props.timestamp().unwrap_or("-"));
    println!("Count:       {}", props.count());
    println!("Total count: {}", props.total_count());
    println!("Data offset: {}", header.layout.data_offset);
    if !props.is_empty() {
        println!();
        println!("Properties:");
        for (k, v) in props.iter() {
            println!("  {}: {}", k, v);
        }
    }
    if !props.comments().is_empty() {
        println!();
        println!("Comments:");
        for c in props.comments() {
            println!("  {}", c);
        }
    }
    Ok(())
}

fn cmd_dump(path: &str) -> Result<()> {
    info!("Dumping scalars: {}", path);
    let mut reader = ScalarReader::<f64>::open(path)?;
    let declared = reader.properties().count();

    let mut scalars = Vec::new();
    let mut index = 0u64;
    while reader.next_into(&mut scalars)? {
        let line: Vec<String> = scalars.iter().map(|v| v.to_string()).collect();
        println!("{}: {}", index, line.join(" "));
        index += 1;
    }

    debug!("Read {} sequences, header declares {}", index, declared);
    if index != declared {
        info!("Sequence count {} differs from header count {}", index, declared);
    }
    Ok(())
}

fn cmd_check(a: &str, b: &str, strict: bool) -> Result<()> {
    let ha = Header::load(a)?;
    let hb = Header::load(b)?;

    let kind = if ha.kind == FileKind::TrackScalars && hb.kind == FileKind::TrackScalars {
        PAIRED_SCALAR_FILES
    } else {
        TRACK_SCALARS
    };
    debug!("Comparing {} ({}) with {} ({}) as {}", a, ha.kind, b, hb.kind, kind);

    check_properties_match(&ha.properties, &hb.properties, kind, strict)?;
    println!("OK: {} and {} match", a, b);
    Ok(())
}
