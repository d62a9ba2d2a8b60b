use std::env;
use std::fs;

use anyhow::{anyhow, Context};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use scalar_registry::{TypeConfig, TypeManager, WireCode};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--config <file.json>] [--code <WIRE_CODE>]\n\nFlags:\n  --config <path>   Registry configuration as JSON (default: SCALAR_* environment variables)\n  --code <code>     Only list the native entry for this wire code (name or number)\n  -h, --help        Show this help"
    );
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow!("invalid log filter: {}", e))?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("scalar_catalog");
    let mut config_path: Option<String> = None;
    let mut code: Option<WireCode> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(args.get(i).cloned().ok_or_else(|| anyhow!("--config needs a path"))?);
            }
            "--code" => {
                i += 1;
                let raw = args.get(i).ok_or_else(|| anyhow!("--code needs a wire code"))?;
                code = Some(WireCode::parse(raw).ok_or_else(|| anyhow!("unknown wire code '{}'", raw))?);
            }
            "-h" | "--help" => {
                print_usage(program);
                return Ok(());
            }
            other => {
                print_usage(program);
                return Err(anyhow!("unexpected argument '{}'", other));
            }
        }
        i += 1;
    }

    let config = match &config_path {
        Some(p) => {
            let text = fs::read_to_string(p).with_context(|| format!("reading {}", p))?;
            TypeConfig::from_json_str(&text)?
        }
        None => TypeConfig::from_env()?,
    };
    info!(
        target: "scalar_registry",
        "scalar catalog: RUST_LOG='{}', platform={:?}, config={}",
        env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string()),
        config.platform.platform,
        config_path.as_deref().unwrap_or("<env>")
    );

    let tm = TypeManager::new(config)?;
    let rows: Vec<_> = match code {
        Some(c) => tm.catalog().into_iter().filter(|r| r.index == "native" && r.key == c.to_string()).collect(),
        None => tm.catalog(),
    };
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
