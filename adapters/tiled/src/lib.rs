#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level decoder for maps exported by the Tiled editor in JSON form.
//!
//! A level is an orthogonal map with exactly five tile layers, in order:
//! ground, walls, tanks, towers and explosions. Each layer draws from a single
//! sheet-image tileset and every tileset must share the map's tile size. Any
//! violation aborts the load; no partially decoded level is ever returned.

use std::{fs, path::Path};

use serde::Deserialize;
use tank_battlegrounds_core::{
    CellCoord, CellSize, Grid, LayerKind, Level, LoadError, Role, TileRef, TileSheet, UnitSpawn,
};

const SUPPORTED_ORIENTATION: &str = "orthogonal";
const GID_FLIP_FLAGS: u32 = 0xE000_0000;

/// Reads and decodes the level stored at `path`.
pub fn load_level(path: impl AsRef<Path>) -> Result<Level, LoadError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&contents)
}

/// Decodes a level from the JSON text of a Tiled map.
pub fn parse_level(contents: &str) -> Result<Level, LoadError> {
    let document: MapDocument =
        serde_json::from_str(contents).map_err(|error| LoadError::Parse(error.to_string()))?;
    decode(&document)
}

#[derive(Debug, Deserialize)]
struct MapDocument {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    orientation: String,
    #[serde(default)]
    layers: Vec<LayerDocument>,
    #[serde(default)]
    tilesets: Vec<TilesetDocument>,
}

#[derive(Debug, Deserialize)]
struct LayerDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    data: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct TilesetDocument {
    firstgid: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    columns: u32,
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
}

impl TilesetDocument {
    fn end(&self) -> u32 {
        self.firstgid.saturating_add(self.tilecount)
    }

    fn contains(&self, gid: u32) -> bool {
        gid >= self.firstgid && gid < self.end()
    }
}

#[derive(Debug)]
struct DecodedLayer {
    tiles: Vec<Option<TileRef>>,
    sheet: Option<TileSheet>,
}

fn decode(document: &MapDocument) -> Result<Level, LoadError> {
    if document.orientation != SUPPORTED_ORIENTATION {
        return Err(LoadError::UnsupportedOrientation(
            document.orientation.clone(),
        ));
    }
    if document.layers.len() != LayerKind::ALL.len() {
        return Err(LoadError::LayerCount(document.layers.len()));
    }

    let cell_count = u64::from(document.width) * u64::from(document.height);
    let cell_count = usize::try_from(cell_count)
        .ok()
        .filter(|count| *count > 0)
        .ok_or(LoadError::InvalidDimensions {
            width: document.width,
            height: document.height,
        })?;
    let cell_size = CellSize {
        width: document.tilewidth,
        height: document.tileheight,
    };

    let mut decoded = Vec::with_capacity(LayerKind::ALL.len());
    for layer in &document.layers {
        let layer = decode_layer(layer, &document.tilesets, cell_count, cell_size)?;
        decoded.push(layer);
    }

    let [ground, walls, tanks, towers, explosions]: [DecodedLayer; 5] = decoded
        .try_into()
        .map_err(|layers: Vec<DecodedLayer>| LoadError::LayerCount(layers.len()))?;

    let grid = Grid::with_walls(document.width, document.height, walls.tiles).ok_or(
        LoadError::InvalidDimensions {
            width: document.width,
            height: document.height,
        },
    )?;

    let mut spawns = Vec::new();
    for (cell, tile) in occupied_cells(&tanks.tiles, document.width) {
        let role = if spawns.is_empty() {
            Role::Player
        } else {
            Role::PatrolTank
        };
        spawns.push(UnitSpawn { role, cell, tile });
    }
    if spawns.is_empty() {
        return Err(LoadError::MissingPlayer);
    }
    spawns.extend(
        occupied_cells(&towers.tiles, document.width).map(|(cell, tile)| UnitSpawn {
            role: Role::SentryTurret,
            cell,
            tile,
        }),
    );

    Ok(Level {
        grid,
        ground: ground.tiles,
        spawns,
        cell_size,
        sheets: [
            ground.sheet,
            walls.sheet,
            tanks.sheet,
            towers.sheet,
            explosions.sheet,
        ],
    })
}

fn decode_layer(
    layer: &LayerDocument,
    tilesets: &[TilesetDocument],
    cell_count: usize,
    cell_size: CellSize,
) -> Result<DecodedLayer, LoadError> {
    if layer.data.len() != cell_count {
        return Err(LoadError::LayerSize {
            layer: layer.name.clone(),
            expected: cell_count,
            found: layer.data.len(),
        });
    }

    let first_gid = layer
        .data
        .iter()
        .map(|gid| gid & !GID_FLIP_FLAGS)
        .find(|gid| *gid != 0);
    let Some(first_gid) = first_gid else {
        return Ok(DecodedLayer {
            tiles: vec![None; cell_count],
            sheet: None,
        });
    };

    let tileset = tilesets
        .iter()
        .find(|tileset| tileset.contains(first_gid))
        .ok_or_else(|| LoadError::MissingTileset {
            layer: layer.name.clone(),
            gid: first_gid,
        })?;
    let image = tileset
        .image
        .as_ref()
        .filter(|_| tileset.columns > 0)
        .ok_or_else(|| LoadError::UnsupportedTileset(tileset.name.clone()))?;
    if tileset.tilewidth != cell_size.width || tileset.tileheight != cell_size.height {
        return Err(LoadError::TileSizeMismatch {
            layer: layer.name.clone(),
            width: cell_size.width,
            height: cell_size.height,
            found_width: tileset.tilewidth,
            found_height: tileset.tileheight,
        });
    }

    let tiles = layer
        .data
        .iter()
        .map(|raw| {
            let gid = raw & !GID_FLIP_FLAGS;
            if gid == 0 {
                return Ok(None);
            }
            if !tileset.contains(gid) {
                return Err(LoadError::TileOutOfRange {
                    layer: layer.name.clone(),
                    gid,
                    first: tileset.firstgid,
                    end: tileset.end(),
                });
            }
            let local = gid - tileset.firstgid;
            Ok(Some(TileRef::new(
                local % tileset.columns,
                local / tileset.columns,
            )))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DecodedLayer {
        tiles,
        sheet: Some(TileSheet {
            image: image.clone(),
            columns: tileset.columns,
        }),
    })
}

fn occupied_cells(
    tiles: &[Option<TileRef>],
    width: u32,
) -> impl Iterator<Item = (CellCoord, TileRef)> + '_ {
    tiles.iter().zip(0u32..).filter_map(move |(tile, index)| {
        tile.map(|tile| (CellCoord::new(index % width, index / width), tile))
    })
}
