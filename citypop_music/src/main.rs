// City Pop generator CLI entry point.
//
// Generates one chord progression and writes it to `<out-dir>/<name>-<bpm>bpm.mid`,
// printing the written path on stdout. Logs go to stderr, filtered by
// RUST_LOG (default `info`).
//
// Usage:
//   cargo run -p citypop_music --bin generate -- [--era ERA] [--style STYLE]
//     [--artist NAME] [--complexity X] [--swing] [--seed N] [--out-dir DIR]
//     [--config FILE] [--catalog FILE]
//
// Eras: 70s, early80s, mid80s, late80s. Styles: ballad, uptempo, fusion.

use citypop_music::catalog::Catalog;
use citypop_music::config::GeneratorConfig;
use citypop_music::options::{Era, GenerationOptions, Style};
use citypop_music::retry::generate_midi;
use citypop_prng::ChordRng;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(message) = run(&args) {
        error!("{message}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let options = parse_options(args)?;
    let seed: Option<u64> = parse_flag(args, "--seed");
    let out_dir = flag_value(args, "--out-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let config = match flag_value(args, "--config") {
        Some(path) => GeneratorConfig::load(Path::new(path)).map_err(|e| e.to_string())?,
        None => GeneratorConfig::default(),
    };
    let loaded_catalog = match flag_value(args, "--catalog") {
        Some(path) => Some(Catalog::load(Path::new(path)).map_err(|e| e.to_string())?),
        None => None,
    };
    let catalog = match &loaded_catalog {
        Some(catalog) => catalog,
        None => Catalog::builtin(),
    };

    let mut rng = match seed {
        Some(s) => {
            info!(seed = s, "seeded generator");
            ChordRng::new(s)
        }
        None => ChordRng::from_entropy(),
    };

    let file = generate_midi(&options, &config, catalog, &mut rng).map_err(|e| e.to_string())?;

    std::fs::create_dir_all(&out_dir)
        .map_err(|e| format!("creating {}: {e}", out_dir.display()))?;
    let path = out_dir.join(&file.filename);
    std::fs::write(&path, &file.bytes).map_err(|e| format!("writing {}: {e}", path.display()))?;

    println!("{}", path.display());
    Ok(())
}

fn parse_options(args: &[String]) -> Result<GenerationOptions, String> {
    let era = flag_value(args, "--era")
        .map(|s| s.parse::<Era>())
        .transpose()
        .map_err(|e| e.to_string())?;
    let style = flag_value(args, "--style")
        .map(|s| s.parse::<Style>())
        .transpose()
        .map_err(|e| e.to_string())?;
    let complexity = match flag_value(args, "--complexity") {
        Some(raw) => Some(
            raw.parse::<f64>()
                .map_err(|_| format!("--complexity expects a number, got '{raw}'"))?,
        ),
        None => None,
    };
    Ok(GenerationOptions {
        era,
        style,
        artist_influence: flag_value(args, "--artist").map(str::to_string),
        complexity,
        swing: args.iter().any(|a| a == "--swing"),
    })
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    flag_value(args, flag).and_then(|v| v.parse().ok())
}
