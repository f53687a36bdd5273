use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use soso_core::{AnalyzerConfig, Segmenter, ENV_DICTIONARY_PATH, ENV_STOPWORDS_PATH};
use soso_local::{DictSegmenter, Dictionary, Document, StopwordSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

mod envelope;
mod logging;

use envelope::{add_envelope_fields, error_obj, warning_hints_from, ErrorCode};

#[derive(Parser, Debug)]
#[command(name = "soso")]
#[command(about = "Main-content extraction and keyword ranking for crawled HTML", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze HTML files and print one JSON object per file.
    Analyze(AnalyzeCmd),
    /// Check that the configured dictionary and stopword files load (json; never fails).
    Doctor(DoctorCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct ResourceArgs {
    /// Dictionary file(s), comma-separated. Lines are `term [frequency [pos]]`.
    #[arg(long, env = ENV_DICTIONARY_PATH)]
    dictionary: Option<String>,
    /// Stopword file (one term per line). Missing/unreadable means "no stopwords".
    #[arg(long, env = ENV_STOPWORDS_PATH)]
    stopwords: Option<PathBuf>,
}

impl ResourceArgs {
    fn config(&self) -> AnalyzerConfig {
        let mut cfg = AnalyzerConfig::from_env();
        if let Some(d) = self.dictionary.as_deref().filter(|s| !s.trim().is_empty()) {
            cfg.dictionary_path = Some(PathBuf::from(d.trim()));
        }
        if let Some(s) = &self.stopwords {
            cfg.stopwords_path = Some(s.clone());
        }
        cfg
    }

    fn load_segmenter(&self) -> soso_core::Result<DictSegmenter> {
        Dictionary::from_config(&self.config()).map(DictSegmenter::new)
    }
}

#[derive(clap::Args, Debug)]
struct AnalyzeCmd {
    #[command(flatten)]
    resources: ResourceArgs,
    /// Keep only the top N keywords in the output (all when unset).
    #[arg(long)]
    top: Option<usize>,
    /// Include `main_content` in JSON output.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    include_content: bool,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
    /// HTML files to analyze (`-` reads stdin).
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct DoctorCmd {
    #[command(flatten)]
    resources: ResourceArgs,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

fn read_input(path: &Path) -> soso_core::Result<String> {
    let read = if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).map(|_| buf)
    } else {
        std::fs::read(path)
    };
    let bytes =
        read.map_err(|e| soso_core::Error::Io(format!("{}: {e}", path.display())))?;
    // Crawled pages are not always valid UTF-8; analysis is best-effort on the lossy text.
    Ok(String::from_utf8_lossy(&bytes).to_string())
}

fn analyze_one(doc: &mut Document, path: &Path, args: &AnalyzeCmd) -> serde_json::Value {
    let t0 = Instant::now();
    let file = path.display().to_string();
    let mut payload = match read_input(path) {
        Err(e) => {
            tracing::warn!(file = %file, error = %e, "skipping unreadable input");
            serde_json::json!({
                "ok": false,
                "file": file,
                "error": error_obj(ErrorCode::from_error(&e), &e),
            })
        }
        Ok(html) => {
            doc.load_html(&html);
            let keywords = doc.keywords();
            let shown = &keywords[..args.top.unwrap_or(keywords.len()).min(keywords.len())];
            let mut v = serde_json::json!({
                "ok": true,
                "file": file,
                "title": doc.title().trim_end(),
                "word_count": doc.word_count(),
                "keyword_count": keywords.len(),
                "keywords": shown,
                "bounds": doc.bounds(),
                "warnings": doc.warnings(),
                "warning_hints": warning_hints_from(doc.warnings()),
            });
            if args.include_content {
                v["main_content"] = serde_json::json!(doc.main_content());
            }
            v
        }
    };
    add_envelope_fields(&mut payload, "analyze", t0.elapsed().as_millis());
    payload
}

fn print_text(v: &serde_json::Value) {
    let file = v["file"].as_str().unwrap_or("");
    if v["ok"].as_bool() != Some(true) {
        let msg = v["error"]["message"].as_str().unwrap_or("");
        println!("{file}\terror\t{msg}");
        return;
    }
    println!("{file}\twords={}", v["word_count"].as_u64().unwrap_or(0));
    for kw in v["keywords"].as_array().into_iter().flatten() {
        let positions: Vec<String> = kw["positions"]
            .as_array()
            .into_iter()
            .flatten()
            .map(|p| {
                format!(
                    "{}:{}",
                    p["row"].as_u64().unwrap_or(0),
                    p["index"].as_u64().unwrap_or(0)
                )
            })
            .collect();
        println!(
            "{}\t{}\t{}",
            kw["text"].as_str().unwrap_or(""),
            kw["count"].as_u64().unwrap_or(0),
            positions.join(",")
        );
    }
}

fn run_analyze(args: AnalyzeCmd) -> Result<()> {
    let t0 = Instant::now();
    let segmenter: Arc<dyn Segmenter> = match args.resources.load_segmenter() {
        Ok(s) => Arc::new(s),
        Err(e) => {
            let mut payload = serde_json::json!({
                "ok": false,
                "error": error_obj(ErrorCode::from_error(&e), &e),
            });
            add_envelope_fields(&mut payload, "analyze", t0.elapsed().as_millis());
            println!("{}", serde_json::to_string(&payload)?);
            return Err(e).context("loading dictionary");
        }
    };

    let cfg = args.resources.config();
    let (stopwords, warning) = StopwordSet::load_or_empty(cfg.stopwords_path.as_deref());
    for path in &args.files {
        let mut doc = Document::new(Arc::clone(&segmenter), stopwords.clone());
        if let Some(w) = warning {
            doc.add_resource_warning(w);
        }
        let v = analyze_one(&mut doc, path, &args);
        match args.output.to_ascii_lowercase().as_str() {
            "text" => print_text(&v),
            _ => println!("{}", serde_json::to_string(&v)?),
        }
    }
    Ok(())
}

fn run_doctor(args: DoctorCmd) -> Result<()> {
    let t0 = Instant::now();
    let cfg = args.resources.config();
    let mut checks: Vec<serde_json::Value> = Vec::new();

    let dict_ok = match args.resources.load_segmenter() {
        Ok(seg) => {
            checks.push(serde_json::json!({
                "name": "dictionary_loadable",
                "ok": true,
                "message": format!(
                    "{} terms, total frequency {}",
                    seg.dictionary().len(),
                    seg.total_frequency()
                ),
                "hint": "",
            }));
            true
        }
        Err(e) => {
            let code = ErrorCode::from_error(&e);
            checks.push(serde_json::json!({
                "name": "dictionary_loadable",
                "ok": false,
                "message": e.to_string(),
                "hint": code.hint(),
            }));
            false
        }
    };

    let stop_ok = match cfg.stopwords_path.as_deref() {
        None => {
            checks.push(serde_json::json!({
                "name": "stopwords_loadable",
                "ok": false,
                "message": "no stopword file configured",
                "hint": format!("Pass --stopwords or set {ENV_STOPWORDS_PATH}."),
            }));
            false
        }
        Some(p) => match StopwordSet::load(p) {
            Ok(set) => {
                checks.push(serde_json::json!({
                    "name": "stopwords_loadable",
                    "ok": true,
                    "message": format!("{} stopwords", set.len()),
                    "hint": "",
                }));
                true
            }
            Err(e) => {
                checks.push(serde_json::json!({
                    "name": "stopwords_loadable",
                    "ok": false,
                    "message": e.to_string(),
                    "hint": ErrorCode::StopwordsFailed.hint(),
                }));
                false
            }
        },
    };

    let mut payload = serde_json::json!({
        "ok": dict_ok && stop_ok,
        "name": "soso",
        "version": env!("CARGO_PKG_VERSION"),
        "configured": {
            "dictionary": cfg.dictionary_path.is_some(),
            "stopwords": cfg.stopwords_path.is_some(),
        },
        "checks": checks,
    });
    add_envelope_fields(&mut payload, "doctor", t0.elapsed().as_millis());

    match args.output.to_ascii_lowercase().as_str() {
        "text" => {
            for c in payload["checks"].as_array().into_iter().flatten() {
                println!(
                    "{}\t{}\t{}",
                    c["name"].as_str().unwrap_or(""),
                    if c["ok"].as_bool() == Some(true) { "ok" } else { "FAIL" },
                    c["message"].as_str().unwrap_or("")
                );
            }
        }
        _ => println!("{}", serde_json::to_string(&payload)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze(args) => run_analyze(args)?,
        Commands::Doctor(args) => run_doctor(args)?,
        Commands::Version(args) => {
            let v = serde_json::json!({
                "name": "soso",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("soso {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{}", serde_json::to_string(&v)?),
            }
        }
    }
    Ok(())
}
