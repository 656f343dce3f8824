use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use tracing::{error, info};

use forge_portrait::catalog::{model_hint, Archetype, Augmentation, Build, KNOWN_MODELS};
use forge_portrait::config::{API_KEYS_CONF_FILE, CONFIG};
use forge_portrait::credentials::{resolve_credential, save_credential};
use forge_portrait::export::export_portrait;
use forge_portrait::gallery::Gallery;
use forge_portrait::llm::GeminiClient;
use forge_portrait::pipeline::{open_portrait, paint_portrait};
use forge_portrait::prompt::{build_prompt, TraitSelection};
use forge_portrait::state::{AppState, QuoteRotation};
use forge_portrait::utils::logging::init_logging;

const QUOTE_INTERVAL: Duration = Duration::from_secs(2);

fn usage() -> String {
    let archetypes: Vec<&str> = Archetype::ALL.iter().map(|value| value.key()).collect();
    let builds: Vec<&str> = Build::ALL.iter().map(|value| value.key()).collect();
    let augmentations: Vec<&str> = Augmentation::ALL.iter().map(|value| value.key()).collect();
    format!(
        "Usage:\n  \
         forge-portrait paint --name <name> [--desc <text>] [--archetype <{}>] [--build <{}>] [--augmentation <{}>] [--model <id>] [--key <api key>] [--out <dir>]\n  \
         forge-portrait prompt [--name <name>] [--desc <text>] [--archetype ..] [--build ..] [--augmentation ..]\n  \
         forge-portrait gallery\n  \
         forge-portrait show <id> [--out <dir>]\n  \
         forge-portrait remove <id>\n  \
         forge-portrait models",
        archetypes.join("|"),
        builds.join("|"),
        augmentations.join("|")
    )
}

#[derive(Debug, Default, PartialEq, Eq)]
struct PaintArgs {
    name: String,
    description: String,
    archetype: String,
    build: String,
    augmentation: String,
    model: Option<String>,
    key: Option<String>,
    out_dir: Option<PathBuf>,
}

impl PaintArgs {
    fn selection(&self) -> TraitSelection {
        TraitSelection::from_keys(
            &self.archetype,
            &self.build,
            &self.augmentation,
            &self.name,
            &self.description,
        )
    }
}

fn take_value<'a>(args: &'a [String], index: &mut usize, flag: &str) -> Result<&'a str> {
    *index += 1;
    args.get(*index)
        .map(|value| value.as_str())
        .ok_or_else(|| anyhow!("Missing value for {flag}"))
}

fn parse_paint_args(args: &[String]) -> Result<PaintArgs> {
    let mut parsed = PaintArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--name" => parsed.name = take_value(args, &mut index, "--name")?.to_string(),
            "--desc" | "--description" => {
                parsed.description = take_value(args, &mut index, "--desc")?.to_string()
            }
            "--archetype" => {
                parsed.archetype = take_value(args, &mut index, "--archetype")?.to_string()
            }
            "--build" => parsed.build = take_value(args, &mut index, "--build")?.to_string(),
            "--augmentation" => {
                parsed.augmentation = take_value(args, &mut index, "--augmentation")?.to_string()
            }
            "--model" => parsed.model = Some(take_value(args, &mut index, "--model")?.to_string()),
            "--key" => parsed.key = Some(take_value(args, &mut index, "--key")?.to_string()),
            "--out" => {
                parsed.out_dir = Some(PathBuf::from(take_value(args, &mut index, "--out")?))
            }
            other => return Err(anyhow!("Unknown argument: {other}\n{}", usage())),
        }
        index += 1;
    }
    Ok(parsed)
}

fn parse_id_args(args: &[String]) -> Result<(String, Option<PathBuf>)> {
    let mut id = None;
    let mut out_dir = None;
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--out" => out_dir = Some(PathBuf::from(take_value(args, &mut index, "--out")?)),
            other if other.starts_with("--") => {
                return Err(anyhow!("Unknown argument: {other}\n{}", usage()))
            }
            other => id = Some(other.to_string()),
        }
        index += 1;
    }
    let id = id.ok_or_else(|| anyhow!("A portrait id is required\n{}", usage()))?;
    Ok((id, out_dir))
}

async fn run_paint(args: PaintArgs) -> Result<()> {
    let gallery = Gallery::open(&CONFIG.data_dir, &CONFIG.database_url).await?;
    let selection = args.selection();
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| CONFIG.image_model.clone());
    if let Some(hint) = model_hint(&model) {
        info!(model = %model, "Model hint: {hint}");
    }

    let home = dirs::home_dir();
    let credential = resolve_credential(
        args.key.as_deref(),
        gallery.settings.as_ref(),
        Path::new(API_KEYS_CONF_FILE),
        CONFIG.env_api_key.as_deref(),
        home.as_deref(),
    );
    let credential = match credential {
        Some((key, source)) => {
            info!(?source, "Resolved API key");
            key
        }
        None => String::new(),
    };

    let client = GeminiClient::from_config();
    let mut state = AppState::new();
    println!("\"{}\"", state.start_painting(QuoteRotation::from_clock()));

    let painting = paint_portrait(&client, &gallery, &selection, &credential, &model);
    tokio::pin!(painting);
    let mut ticker = tokio::time::interval(QUOTE_INTERVAL);
    ticker.tick().await;
    let outcome = loop {
        tokio::select! {
            result = &mut painting => break result,
            _ = ticker.tick() => {
                if let Some(quotes) = state.quotes_mut() {
                    println!("\"{}\"", quotes.advance());
                }
            }
        }
    };

    let saved = match outcome {
        Ok(saved) => saved,
        Err(err) => {
            state.painting_failed();
            gallery.images.close().await;
            return Err(anyhow!("Merith's brush exploded: {err}"));
        }
    };

    save_credential(gallery.settings.as_ref(), &credential);
    state.show_portrait(saved.portrait.clone());
    println!("Portrait of {} saved as {}", saved.entry.name, saved.entry.id);

    if let (Some(dir), Some(portrait)) = (args.out_dir.as_deref(), state.current_portrait()) {
        let path = export_portrait(portrait, dir)?;
        println!("Saved to {}", path.display());
    }

    gallery.images.close().await;
    Ok(())
}

async fn run_gallery() -> Result<()> {
    let gallery = Gallery::open(&CONFIG.data_dir, &CONFIG.database_url).await?;
    let mut state = AppState::new();
    state.open_gallery();

    let entries = gallery.index.list();
    if entries.is_empty() {
        println!("No portraits yet. Merith awaits!");
    }
    for entry in entries {
        let thumb = if entry.thumb.is_empty() { "no thumbnail" } else { "thumbnail" };
        println!("{}  {}  {}  ({})", entry.id, entry.date, entry.name, thumb);
    }

    state.back_to_creator();
    gallery.images.close().await;
    Ok(())
}

async fn run_show(id: &str, out_dir: Option<PathBuf>) -> Result<()> {
    let gallery = Gallery::open(&CONFIG.data_dir, &CONFIG.database_url).await?;
    let mut state = AppState::new();
    state.open_gallery();

    match open_portrait(&gallery, id).await? {
        Some(portrait) => {
            state.show_portrait(portrait);
            if let Some(portrait) = state.current_portrait() {
                let dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
                let path = export_portrait(portrait, &dir)?;
                println!("{} ({}) saved to {}", portrait.name, portrait.mime_type, path.display());
            }
        }
        None => println!("Image not found"),
    }

    gallery.images.close().await;
    Ok(())
}

async fn run_remove(id: &str) -> Result<()> {
    let gallery = Gallery::open(&CONFIG.data_dir, &CONFIG.database_url).await?;
    let listed = gallery.index.remove(id);
    let stored = gallery.images.delete(id).await?;
    if listed || stored {
        println!("Removed {id}");
    } else {
        println!("Image not found");
    }
    gallery.images.close().await;
    Ok(())
}

fn run_models() {
    for info in KNOWN_MODELS {
        let marker = if info.id == CONFIG.image_model { "*" } else { " " };
        println!("{marker} {:<40} {}", info.id, info.hint);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guards = init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", usage());
        return Ok(());
    };
    let rest = &args[1..];

    let result = match command.as_str() {
        "paint" => match parse_paint_args(rest) {
            Ok(paint_args) => run_paint(paint_args).await,
            Err(err) => Err(err),
        },
        "prompt" => parse_paint_args(rest).map(|paint_args| {
            println!("{}", build_prompt(&paint_args.selection()));
        }),
        "gallery" => run_gallery().await,
        "show" => match parse_id_args(rest) {
            Ok((id, out_dir)) => run_show(&id, out_dir).await,
            Err(err) => Err(err),
        },
        "remove" => match parse_id_args(rest) {
            Ok((id, _)) => run_remove(&id).await,
            Err(err) => Err(err),
        },
        "models" => {
            run_models();
            Ok(())
        }
        "--help" | "-h" | "help" => {
            println!("{}", usage());
            Ok(())
        }
        other => Err(anyhow!("Unknown command: {other}\n{}", usage())),
    };

    if let Err(err) = &result {
        error!("{command} failed: {err}");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_paint_flags() {
        let parsed = parse_paint_args(&strings(&[
            "--name",
            "Kaelen",
            "--archetype",
            "rogue",
            "--build",
            "slight",
            "--augmentation",
            "psychic",
            "--model",
            "gemini-2.5-flash-image",
            "--out",
            "portraits",
        ]))
        .expect("parsed");
        assert_eq!(parsed.name, "Kaelen");
        assert_eq!(parsed.model.as_deref(), Some("gemini-2.5-flash-image"));
        assert_eq!(parsed.out_dir, Some(PathBuf::from("portraits")));
        assert_eq!(parsed.selection().archetype, Archetype::Rogue);
    }

    #[test]
    fn rejects_missing_values_and_unknown_flags() {
        assert!(parse_paint_args(&strings(&["--name"])).is_err());
        assert!(parse_paint_args(&strings(&["--colour", "red"])).is_err());
        assert!(parse_id_args(&strings(&["--out", "dir"])).is_err());
    }

    #[test]
    fn parses_show_arguments() {
        let (id, out) = parse_id_args(&strings(&["portrait_1", "--out", "x"])).expect("parsed");
        assert_eq!(id, "portrait_1");
        assert_eq!(out, Some(PathBuf::from("x")));
    }
}
