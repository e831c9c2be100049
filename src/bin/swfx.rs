//! swfx CLI: dump a raw SWF tag stream and check byte-exact re-encoding.

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use std::io::{IsTerminal, Read, Write};
use std::process;
use swfx::tag::{self, MovieTag};
use swfx::{Context, Encodable};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swfx", about = "SWF tag stream codec")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a tag stream and print every tag
    Dump(DumpArgs),
    /// Decode, re-encode and compare with the input
    Check(CommonArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Input file (- for stdin). Raw tags only, without file header.
    #[arg(short, long)]
    input: String,

    /// Format version of the movie the tags come from
    #[arg(long, default_value_t = swfx::context::DEFAULT_VERSION)]
    version: u32,

    /// Colors carry an alpha channel
    #[arg(long)]
    transparent: bool,
}

#[derive(Args)]
struct DumpArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// One JSON document instead of text lines
    #[arg(long)]
    json: bool,
}

impl CommonArgs {
    fn context(&self) -> Context {
        let ctx = Context::new().with_version(self.version);
        if self.transparent { ctx.with_transparency() } else { ctx }
    }
}

fn read_input(path: &str) -> Result<Vec<u8>, String> {
    if path == "-" {
        if std::io::stdin().is_terminal() {
            eprintln!("Lese von stdin (Ctrl+D zum Beenden)...");
        }
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| format!("Lesefehler (stdin): {e}"))?;
        Ok(buf)
    } else {
        std::fs::read(path).map_err(|e| format!("Lesefehler '{path}': {e}"))
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn describe(tag: &MovieTag) -> String {
    match tag {
        MovieTag::DoAction(t) => {
            let codes: Vec<String> = t.actions().iter().map(|a| format!("{:#04x}", a.code())).collect();
            format!("actions=[{}]", codes.join(" "))
        }
        MovieTag::FontName(t) => {
            format!("id={} name={:?} copyright={:?}", t.identifier(), t.name(), t.copyright())
        }
        MovieTag::Unknown(t) => {
            let form = if t.is_extended() { " (long header)" } else { "" };
            format!("{} bytes{form}", t.data().len())
        }
    }
}

fn to_json(tag: &MovieTag, ctx: &Context) -> Value {
    let mut value = match tag {
        MovieTag::DoAction(t) => json!({
            "actions": t.actions().iter().map(|a| json!({
                "code": a.code(),
                "payload": a.payload().map(hex),
            })).collect::<Vec<_>>(),
        }),
        MovieTag::FontName(t) => json!({
            "identifier": t.identifier(),
            "name": t.name(),
            "copyright": t.copyright(),
        }),
        MovieTag::Unknown(t) => json!({
            "data": hex(t.data()),
            "extended": t.is_extended(),
        }),
    };
    value["code"] = json!(tag.code());
    value["type"] = json!(tag.name());
    value["size"] = json!(tag.size_of(ctx));
    value
}

fn run_dump(args: DumpArgs) -> Result<(), String> {
    let ctx = args.common.context();
    let input = read_input(&args.common.input)?;
    let tags = tag::decode_tags(&input, &ctx).map_err(|e| e.to_string())?;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    if args.json {
        let doc = json!({
            "version": ctx.version(),
            "transparent": ctx.is_transparent(),
            "tags": tags.iter().map(|t| to_json(t, &ctx)).collect::<Vec<_>>(),
        });
        serde_json::to_writer_pretty(&mut out, &doc).map_err(|e| format!("Schreibfehler: {e}"))?;
        writeln!(out).map_err(|e| format!("Schreibfehler: {e}"))?;
    } else {
        for t in &tags {
            writeln!(out, "{:<24} {:>4}  {}", t.name(), t.code(), describe(t))
                .map_err(|e| format!("Schreibfehler: {e}"))?;
        }
    }
    out.flush().map_err(|e| format!("Schreibfehler: {e}"))
}

fn run_check(args: CommonArgs) -> Result<(), String> {
    let ctx = args.context();
    let input = read_input(&args.input)?;
    let tags = tag::decode_tags(&input, &ctx).map_err(|e| e.to_string())?;
    let output = tag::encode_tags(&tags, &ctx).map_err(|e| e.to_string())?;

    if output == input {
        println!("ok: {} tags, {} bytes", tags.len(), input.len());
        return Ok(());
    }
    let offset = input
        .iter()
        .zip(&output)
        .position(|(a, b)| a != b)
        .unwrap_or(input.len().min(output.len()));
    Err(format!(
        "re-encode differs at byte {offset} ({} bytes in, {} bytes out)",
        input.len(),
        output.len()
    ))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Fehler: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Dump(args) => run_dump(args),
        Command::Check(args) => run_check(args),
    }
}
