use std::path::PathBuf;

use clap::Parser;

use glade::AppConfig;

/// Walk around a shadow-mapped campsite scene.
#[derive(Parser, Debug)]
#[command(name = "glade", version, about)]
struct Args {
    /// TOML file with window, camera and asset settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory that model and skybox paths are resolved against
    #[arg(short, long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Start with the shadow map shown instead of the lit scene
    #[arg(long)]
    depth_map: bool,
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"),
    )
    .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> glade::Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_toml_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(dir) = args.assets {
        config = config.assets_dir(dir);
    }
    if args.depth_map {
        config = config.show_depth_map(true);
    }

    log::info!("starting {} ({}x{})", config.title, config.width, config.height);
    glade::run(config)
}
