use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use huesmith::backend::{GenerationBackend, HttpBackend, StaticToken};
use huesmith::cli::Args;
use huesmith::font::resolve_font;
use huesmith::palette::Palette;
use huesmith::pipeline::parse::parse_palette;
use huesmith::pipeline::render::{encode_png, render_palette};
use huesmith::session::Session;
use huesmith::tui::{self, TuiConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    run(args).await
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(args: Args) -> Result<()> {
    let options = args.display_options();
    // With both labels off the font would never be used; skip the probe
    // (and its warning) entirely.
    let font = if options.any_text() || args.tui {
        resolve_font(args.font.as_deref())
    } else {
        None
    };

    let seed = match &args.from {
        Some(text) => {
            let entries = parse_palette(text);
            if entries.is_empty() {
                bail!("--from did not contain any #RRGGBB (name) pairs");
            }
            Some(Palette::new(entries))
        }
        None => None,
    };

    let backend: Option<Arc<dyn GenerationBackend>> = match &args.backend_url {
        Some(url) => {
            let tokens = Arc::new(StaticToken::new(args.token.clone()));
            Some(Arc::new(HttpBackend::new(url, tokens)?))
        }
        None => None,
    };

    if args.tui {
        return tui::run(TuiConfig {
            backend,
            seed,
            options,
            font,
            output: args.output.clone(),
        })
        .await;
    }

    let mut session = match seed {
        Some(palette) => Session::with_palette(palette, options),
        None => Session::new(options),
    };

    if let Some(instruction) = &args.edit {
        let backend = backend.context("--edit needs --backend-url")?;
        let full = session
            .edit_instruction(instruction)
            .context("--edit needs a seed palette from --from")?;
        session.begin_request();
        match backend.edit(&full).await {
            Ok(text) => {
                session.apply_response(&text);
            }
            Err(err) => session.apply_error(&err),
        }
    } else if let Some(prompt) = &args.prompt {
        if !session.can_submit(prompt) {
            bail!("the prompt is too short to send");
        }
        let backend = backend.context("generating needs --backend-url")?;
        session.begin_request();
        match backend.generate(prompt).await {
            Ok(text) => {
                session.apply_response(&text);
            }
            Err(err) => session.apply_error(&err),
        }
    } else if args.from.is_none() {
        bail!("nothing to do: give a prompt, or --edit with --from, or --from alone");
    }

    // Recoverable conditions surface as a plain user message, never a panic.
    if let Some(message) = session.message.take() {
        bail!("{message}");
    }

    let palette = session.palette().context("no palette to render")?;
    let image = render_palette(palette, session.options, font.as_ref())?;
    let bytes = encode_png(&image)?;
    std::fs::write(&args.output, bytes)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("wrote {} ({} colors)", args.output.display(), palette.len());
    Ok(())
}
