mod errors;

use crate::errors::{Result, ResultExt};
use clap::{value_t, App, AppSettings, Arg};
use failure::Fail;
use image::{imageops, RgbaImage};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use wad::{Archive, Image, Level, LevelGeometry, LoaderMetadata, MaterialCache, TextureCompositor};

pub enum RunMode {
    ListLevelNames {
        wad_file: PathBuf,
    },
    Check {
        wad_file: PathBuf,
        metadata_file: Option<PathBuf>,
    },
    Build {
        wad_file: PathBuf,
        metadata_file: Option<PathBuf>,
        level_name: String,
        export_dir: Option<PathBuf>,
    },
}

impl RunMode {
    pub fn from_args() -> Result<RunMode> {
        let matches = App::new("wadmesh")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Builds level geometry and textures from a WAD file.")
            .settings(&[AppSettings::ColoredHelp])
            .arg(
                Arg::with_name("iwad")
                    .long("iwad")
                    .short("i")
                    .help("WAD file to load")
                    .value_name("FILE")
                    .default_value("doom2.wad"),
            )
            .arg(
                Arg::with_name("metadata")
                    .long("metadata")
                    .short("m")
                    .help("path to TOML loader metadata; built-in defaults otherwise")
                    .value_name("FILE")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("level")
                    .long("level")
                    .short("l")
                    .help("name of the map marker lump to build")
                    .value_name("NAME")
                    .default_value("MAP01"),
            )
            .arg(
                Arg::with_name("export-materials")
                    .long("export-materials")
                    .help("write every material the level uses as a PNG into DIR")
                    .value_name("DIR")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("check")
                    .long("check")
                    .help("build every level and material in the WAD, report failures, then exit"),
            )
            .arg(
                Arg::with_name("list-levels")
                    .long("list-levels")
                    .help("list the names and indices of all the levels in the WAD, then exit"),
            )
            .get_matches();

        let wad_file: PathBuf = value_t!(matches, "iwad", String)?.into();
        let metadata_file = matches.value_of("metadata").map(PathBuf::from);

        Ok(if matches.is_present("list-levels") {
            RunMode::ListLevelNames { wad_file }
        } else if matches.is_present("check") {
            RunMode::Check {
                wad_file,
                metadata_file,
            }
        } else {
            RunMode::Build {
                wad_file,
                metadata_file,
                level_name: value_t!(matches, "level", String)?.to_uppercase(),
                export_dir: matches.value_of("export-materials").map(PathBuf::from),
            }
        })
    }
}

fn load_metadata(metadata_file: Option<&Path>) -> Result<LoaderMetadata> {
    Ok(match metadata_file {
        Some(path) => LoaderMetadata::from_file(&path)?,
        None => LoaderMetadata::default(),
    })
}

fn export_image(image: &Image, path: &Path) -> Result<()> {
    let buffer = RgbaImage::from_raw(
        image.width() as u32,
        image.height() as u32,
        image.pixels().to_vec(),
    )
    .ok_or_else(|| format!("Pixel buffer does not match image size for {}.", path.display()))?;
    // Images are stored bottom row first.
    imageops::flip_vertical(&buffer)
        .save(path)
        .err_context(|_| format!("Failed to write {}", path.display()))
}

fn build(
    wad: &Archive,
    meta: &LoaderMetadata,
    level_name: &str,
    export_dir: Option<&Path>,
) -> Result<()> {
    let level = Level::from_archive(wad, level_name)?;
    let geometry = LevelGeometry::build(&level, meta);

    println!("level      {}", level.name);
    println!("walls      {}", geometry.walls.len());
    println!(
        "floors     {} ({} triangles)",
        geometry.floors.len(),
        geometry
            .floors
            .iter()
            .map(|floor| floor.mesh.triangles.len())
            .sum::<usize>()
    );
    println!("ceilings   {}", geometry.ceilings.len());
    println!("malformed  {}", geometry.malformed.len());
    for (sector, reason) in &geometry.malformed {
        println!("    sector {:4}: {}", sector, reason);
    }
    match geometry.player_start() {
        Some(start) => println!(
            "start      ({}, {}, {}) facing {:.0} degrees",
            start.pos.x,
            start.pos.y,
            start.pos.z,
            start.yaw.0.to_degrees()
        ),
        None => warn!("Level {} has no player 1 start.", level.name),
    }

    let mut cache = MaterialCache::new(TextureCompositor::new(wad, meta)?);
    let num_failed = geometry.load_materials(&mut cache);
    println!("materials  {} ({} failed)", cache.len(), num_failed);

    if let Some(dir) = export_dir {
        fs::create_dir_all(dir).err_context(|_| format!("Failed to create {}", dir.display()))?;
        for (kind, name, image) in cache.loaded() {
            let file_name = format!("{}_{}.png", kind, name.as_str().replace('\\', "^"));
            export_image(image, &dir.join(file_name))?;
        }
        info!("Exported materials to {}.", dir.display());
    }
    Ok(())
}

fn check(wad: &Archive, meta: &LoaderMetadata) -> Result<()> {
    info!("Loading all levels...");
    let start = Instant::now();
    let mut cache = MaterialCache::new(TextureCompositor::new(wad, meta)?);
    let (mut num_broken_levels, mut num_malformed) = (0, 0);
    for level_name in wad.level_names() {
        let level = match Level::from_archive(wad, level_name) {
            Ok(level) => level,
            Err(e) => {
                error!("reading level {}: {}", level_name, e);
                num_broken_levels += 1;
                continue;
            }
        };
        let geometry = LevelGeometry::build(&level, meta);
        for (sector, reason) in &geometry.malformed {
            warn!("{} sector {}: {}", level_name, sector, reason);
        }
        num_malformed += geometry.malformed.len();
        geometry.load_materials(&mut cache);
    }
    let num_failed = cache.failed().count();
    println!(
        "{} levels, {} unreadable, {} malformed sectors, {} of {} materials failed",
        wad.num_levels(),
        num_broken_levels,
        num_malformed,
        num_failed,
        cache.len()
    );
    info!(
        "Done loading all levels in {:.4}s.",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn run() -> Result<()> {
    match RunMode::from_args()? {
        RunMode::ListLevelNames { wad_file } => {
            let wad = Archive::open(&wad_file)?;
            for i_level in 0..wad.num_levels() {
                println!("{:3} {:8}", i_level, wad.level_lump(i_level)?.name());
            }
        }
        RunMode::Check {
            wad_file,
            metadata_file,
        } => {
            let meta = load_metadata(metadata_file.as_ref().map(PathBuf::as_path))?;
            check(&Archive::open(&wad_file)?, &meta)?;
        }
        RunMode::Build {
            wad_file,
            metadata_file,
            level_name,
            export_dir,
        } => {
            let meta = load_metadata(metadata_file.as_ref().map(PathBuf::as_path))?;
            let wad = Archive::open(&wad_file)?;
            build(
                &wad,
                &meta,
                &level_name,
                export_dir.as_ref().map(PathBuf::as_path),
            )?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(error) = run() {
        error!("{}", error);
        for cause in (&error as &dyn Fail).iter_causes() {
            error!("    caused by: {}", cause);
        }
        process::exit(1);
    }
}
