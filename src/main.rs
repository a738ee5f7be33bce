use std::{
    fs::File,
    io::{self, BufWriter},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use pictotile::{
    cli::Args,
    common::TILE_BYTES,
    config::Config,
    convert,
    image::load_image,
    output::write_output,
    persist::save_palettes,
    registry::PaletteRegistry,
};

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;
    let output_format = config.output_format()?;

    let image = match args.input_path() {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("unable to open {}", path.display()))?;
            load_image(file, &path.display().to_string())?
        }
        None => load_image(io::stdin().lock(), "stdin")?,
    };

    let mut registry = PaletteRegistry::new();
    let data = convert(&image, &config, &mut registry);
    if data.is_empty() {
        info!("No complete tiles in image, output will be empty");
    }
    info!(
        "Encoded {} tiles with {} palettes",
        data.len() / TILE_BYTES,
        registry.len()
    );

    if let Some(path) = &args.palettes {
        save_palettes(path, &registry)?;
    }

    match args.output_path() {
        Some(path) => {
            info!("Outputting to {}", path.display());
            let file = File::create(path)
                .with_context(|| format!("unable to create {}", path.display()))?;
            write_output(&mut BufWriter::new(file), &data, &output_format)?;
        }
        None => {
            info!("Outputting to stdout");
            write_output(&mut io::stdout().lock(), &data, &output_format)?;
        }
    }
    Ok(())
}
