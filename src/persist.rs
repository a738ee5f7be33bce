use std::{fs, path::Path};

use anyhow::{Context, Result};
use json_pretty_compact::PrettyCompactFormatter;
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Serializer;

use crate::{common::ColorValue, registry::PaletteRegistry};

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    info!("Saving {}", path.display());
    let formatter = PrettyCompactFormatter::new();
    let mut data_bytes = vec![];
    let mut ser = Serializer::with_formatter(&mut data_bytes, formatter);
    data.serialize(&mut ser)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create {}", parent.display()))?;
    }
    fs::write(path, &data_bytes).with_context(|| format!("unable to write {}", path.display()))?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Loading {}", path.display());
    let data_bytes =
        fs::read(path).with_context(|| format!("unable to read {}", path.display()))?;
    let data: T = serde_json::from_slice(&data_bytes)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    Ok(data)
}

#[derive(Serialize)]
struct PaletteRecord {
    id: usize,
    colors: [[ColorValue; 3]; 4],
}

pub fn save_palettes(path: &Path, registry: &PaletteRegistry) -> Result<()> {
    let records: Vec<PaletteRecord> = registry
        .iter()
        .map(|(id, p)| PaletteRecord {
            id: id.0,
            colors: p.colors.map(<[ColorValue; 3]>::from),
        })
        .collect();
    save_json(path, &records)
}
