//! LazyVRAM CLI
//!
//! Command-line interface for optimizing the texture import settings of a
//! Unity avatar.

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use lazy_vram::applier::texture_targets;
use lazy_vram::optimizer::avatar_materials;
use lazy_vram::{
    AssetDatabase, Compression, OptimizeRequest, Preset, Settings, optimize, resolve,
};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "lazy_vram")]
#[command(about = "Batch texture import optimizer for Unity avatars")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to lazy-vram.yaml in the project)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AvatarArgs {
    /// Avatar prefab or scene file, relative to the project
    #[arg(short, long)]
    input: PathBuf,

    /// Unity project root
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Avatar root GameObject name or fileID
    #[arg(short, long)]
    avatar: Option<String>,

    /// Collect every material slot of each renderer
    #[arg(long)]
    all_slots: bool,

    /// Collect renderers on inactive GameObjects too
    #[arg(long)]
    include_inactive: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a preset to every texture the avatar uses
    Optimize {
        #[command(flatten)]
        target: AvatarArgs,

        /// Size preset
        #[arg(long, value_enum)]
        preset: Option<Preset>,

        /// Main texture size for the custom preset
        #[arg(long)]
        main_size: Option<u32>,

        /// Other texture size for the custom preset
        #[arg(long)]
        other_size: Option<u32>,

        /// High quality compression instead of crunched
        #[arg(long)]
        high_quality: bool,

        /// Report the changes without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// List the materials and textures of an avatar
    Materials {
        #[command(flatten)]
        target: AvatarArgs,
    },

    /// List the available presets
    Presets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Optimize {
            target,
            preset,
            main_size,
            other_size,
            high_quality,
            dry_run,
        } => {
            let mut settings = load_settings(cli.config.as_deref(), &target)?;
            apply_size_overrides(&mut settings, preset, main_size, other_size);
            settings.high_quality_compression |= high_quality;
            optimize_command(target, settings, dry_run)
        }
        Commands::Materials { target } => {
            let settings = load_settings(cli.config.as_deref(), &target)?;
            materials_command(target, settings)
        }
        Commands::Presets => presets_command(),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn load_settings(config: Option<&Path>, target: &AvatarArgs) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => Settings::load(path)?,
        None => Settings::discover(&target.project)?.0,
    };
    settings.all_material_slots |= target.all_slots;
    settings.include_inactive |= target.include_inactive;
    Ok(settings)
}

/// Command-line preset and sizes over the settings file
///
/// `--main-size` or `--other-size` without `--preset` selects the custom
/// preset. With a fixed preset the sizes are ignored, with a warning.
fn apply_size_overrides(
    settings: &mut Settings,
    preset: Option<Preset>,
    main_size: Option<u32>,
    other_size: Option<u32>,
) {
    let sizes_given = main_size.is_some() || other_size.is_some();
    match preset {
        Some(preset) => settings.preset = preset,
        None if sizes_given => settings.preset = Preset::Custom,
        None => {}
    }
    if sizes_given && settings.preset != Preset::Custom {
        warn!(
            preset = %settings.preset,
            "--main-size and --other-size only apply to the custom preset"
        );
    }
    if let Some(size) = main_size {
        settings.custom_main_size = size;
    }
    if let Some(size) = other_size {
        settings.custom_other_size = size;
    }
}

fn request_for(target: &AvatarArgs, settings: &Settings) -> OptimizeRequest {
    let mut request =
        OptimizeRequest::from_settings(target.project.clone(), target.input.clone(), settings);
    request.avatar = target.avatar.clone();
    request
}

fn optimize_command(target: AvatarArgs, settings: Settings, dry_run: bool) -> Result<()> {
    let mut request = request_for(&target, &settings);
    request.dry_run = dry_run;

    let report = match optimize(&request, &settings) {
        Ok(report) => report,
        Err(e) if e.is_validation() => return Err(e.into()),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to optimize {}", target.input.display())));
        }
    };

    println!("Avatar: {}", report.avatar);
    println!("Preset: {} ({})", request.preset, report.sizes);
    println!("Compression: {}", report.compression);
    println!(
        "  Materials: {}, textures: {}",
        report.materials.len(),
        report.targets.len()
    );

    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.what, skipped.reason);
    }

    for edit in report.changed() {
        let path = edit
            .texture
            .path
            .strip_prefix(&request.project_root)
            .unwrap_or(&edit.texture.path);
        println!("  {}", path.display());
        for change in &edit.changes {
            println!("    {}", change);
        }
    }

    let changed = report.changed().count();
    if report.dry_run {
        println!("✓ Dry run: {} files would change", changed);
    } else {
        println!("✓ Updated {} of {} texture settings", report.written, report.edits.len());
    }
    Ok(())
}

fn materials_command(target: AvatarArgs, settings: Settings) -> Result<()> {
    let request = request_for(&target, &settings);
    let (avatar, materials) = avatar_materials(&request, &settings)?;
    let db = AssetDatabase::open(&request.project_root, &settings.skip_directories)?;

    println!("Avatar: {}", avatar);
    println!("  Materials: {}", materials.len());
    for material in &materials {
        match material.guid().and_then(|guid| db.path_of(guid)) {
            Some(path) => println!("    {}", db.relative(path).display()),
            None => println!("    {}", material),
        }
    }

    let (targets, skipped) = texture_targets(&db, &materials, &settings.main_texture_slots)?;
    println!("  Textures: {}", targets.len());
    for target in &targets {
        println!(
            "    [{}] {} ({})",
            if target.is_main { "main" } else { "other" },
            db.relative(&target.texture.path).display(),
            target.used_by.join(", ")
        );
    }
    for skipped in &skipped {
        println!("    skipped {}: {}", skipped.what, skipped.reason);
    }
    Ok(())
}

fn presets_command() -> Result<()> {
    for preset in Preset::FIXED {
        let sizes = resolve(preset, 0, 0)?;
        println!(
            "{:<10} {:<28} {}",
            preset.display_name(),
            sizes.to_string(),
            preset.description()
        );
    }
    println!(
        "{:<10} {:<28} {}",
        Preset::Custom.display_name(),
        "main/other from --main-size, --other-size",
        Preset::Custom.description()
    );
    println!("  Compression: {} or {}", Compression::Normal, Compression::HighQuality);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_flags_select_custom() {
        let mut settings = Settings::default();
        apply_size_overrides(&mut settings, None, Some(512), None);
        assert_eq!(settings.preset, Preset::Custom);
        assert_eq!(settings.custom_main_size, 512);
        assert_eq!(settings.custom_other_size, 1024);
    }

    #[test]
    fn test_explicit_preset_wins() {
        let mut settings = Settings::default();
        apply_size_overrides(&mut settings, Some(Preset::High), None, Some(256));
        assert_eq!(settings.preset, Preset::High);
        assert_eq!(settings.custom_other_size, 256);

        let mut settings = Settings::default();
        apply_size_overrides(&mut settings, None, None, None);
        assert_eq!(settings, Settings::default());
    }
}
