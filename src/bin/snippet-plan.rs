use markup_props::{
    BridgeError, ComponentKind, Engine, EngineOptions, MappingConfig, SchemaSnapshot,
};
use std::env;
use std::fs;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

struct Args {
    kind: String,
    file: String,
    schema: Option<String>,
    config: Option<String>,
}

fn main() {
    init_logging();

    let args = match parse_args(env::args().skip(1).collect()) {
        Some(args) => args,
        None => {
            print_usage();
            process::exit(1);
        }
    };

    match run(&args) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(2),
        Err(e) => {
            eprintln!("✗ {}:", args.file);
            eprintln!("  {}", e);
            process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_usage() {
    eprintln!("Usage: snippet-plan <container|action|heading> <file> [--schema <schema.yaml>] [--config <mapping.yaml>]");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  snippet-plan action button.tsx");
    eprintln!("  snippet-plan container card.tsx --schema card-schema.yaml");
}

fn parse_args(raw: Vec<String>) -> Option<Args> {
    let mut positional = Vec::new();
    let mut schema = None;
    let mut config = None;

    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--schema" => schema = Some(iter.next()?),
            "--config" => config = Some(iter.next()?),
            "-h" | "--help" => return None,
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        return None;
    }
    let file = positional.pop()?;
    let kind = positional.pop()?;
    Some(Args {
        kind,
        file,
        schema,
        config,
    })
}

/// `Ok(false)` when the tag was not found.
fn run(args: &Args) -> Result<bool, BridgeError> {
    let kind: ComponentKind = args.kind.parse()?;
    let config = match &args.config {
        Some(path) => MappingConfig::from_path(path)?,
        None => MappingConfig::builtin(),
    };
    let source = fs::read_to_string(&args.file).map_err(|e| BridgeError::Io {
        path: args.file.clone(),
        reason: e.to_string(),
    })?;

    let engine = Engine::new(config, EngineOptions::default());
    let request = match engine.request(&source, kind) {
        Ok(request) => request,
        Err(miss) => {
            eprintln!("{}", miss);
            return Ok(false);
        }
    };

    println!("# request");
    print!("{}", serde_yaml::to_string(&request)?);

    if let Some(path) = &args.schema {
        let snapshot = SchemaSnapshot::from_path(path)?;
        let plan = engine.plan(&request.semantic_props, &snapshot.properties);
        println!("# plan ({})", path);
        print!("{}", serde_yaml::to_string(&plan)?);
        for (property, text) in &plan.texts {
            match engine.text_target(&snapshot.text_leaves, property, text.target.as_deref()) {
                Some(leaf) => println!("# text '{}' -> leaf '{}'", property, leaf.name),
                None => eprintln!("  warning: no text leaf for '{}'", property),
            }
        }
        for diagnostic in &plan.diagnostics {
            eprintln!("  warning: {}", diagnostic);
        }
    }
    Ok(true)
}
