use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use dialog_collage::{
    App, CollageConfig, ConfigCodec, Configuration, Kerning, MemoryLocation, ViewTransform,
};

#[derive(Parser)]
#[command(name = "dialog-collage", version, about = "Render shareable dialog collages from their URL")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export the collage a URL describes as a PNG
    Render {
        #[command(flatten)]
        source: Source,
        /// Output file; defaults to the slug of the text
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the scene markup a URL describes
    Svg {
        #[command(flatten)]
        source: Source,
    },
    /// Build the route fragment for a set of values
    Route(RouteArgs),
}

#[derive(Args)]
struct Source {
    /// Full page URL, fragment included
    #[arg(long, conflicts_with = "fragment")]
    url: Option<String>,
    /// Route fragment alone, with or without the leading '#'
    #[arg(long)]
    fragment: Option<String>,
}

impl Source {
    fn location(&self) -> anyhow::Result<Arc<MemoryLocation>> {
        let location = match (&self.url, &self.fragment) {
            (Some(url), _) => MemoryLocation::new(url).with_context(|| format!("invalid URL {}", url))?,
            (None, Some(fragment)) => MemoryLocation::with_fragment(fragment),
            (None, None) => MemoryLocation::with_fragment(""),
        };
        Ok(Arc::new(location))
    }
}

#[derive(Args)]
struct RouteArgs {
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    font_size: Option<u32>,
    #[arg(long)]
    kerning: Option<String>,
    #[arg(long)]
    alt_bg: bool,
    #[arg(long)]
    alt_bg_opacity: Option<u8>,
    #[arg(long, allow_hyphen_values = true)]
    x: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    y: Option<f64>,
    #[arg(long)]
    k: Option<f64>,
}

impl RouteArgs {
    fn configuration(&self, base: &Configuration) -> Configuration {
        let mut config = base.clone();
        if let Some(text) = &self.text {
            config.text = text.clone();
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        if let Some(kerning) = &self.kerning {
            config.kerning = Kerning::new(kerning.as_str());
        }
        config.alt_background = self.alt_bg || config.alt_background;
        if let Some(opacity) = self.alt_bg_opacity {
            config.alt_background_opacity = opacity;
        }
        config.view = ViewTransform::new(
            self.x.unwrap_or(config.view.x),
            self.y.unwrap_or(config.view.y),
            self.k.unwrap_or(config.view.k),
        );
        config
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CollageConfig> {
    match path {
        Some(path) => CollageConfig::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(CollageConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Render { source, out } => {
            let app = App::with_svg_decoder(config, source.location()?)?;
            app.start()?;
            let artifact = app.export().await?;
            let out = out.unwrap_or_else(|| PathBuf::from(&artifact.filename));
            std::fs::write(&out, &artifact.png).with_context(|| format!("writing {}", out.display()))?;
            println!(
                "{} ({}x{}, sha256 {})",
                out.display(),
                artifact.width,
                artifact.height,
                artifact.digest()
            );
        }
        Command::Svg { source } => {
            let app = App::with_svg_decoder(config, source.location()?)?;
            app.start()?;
            let view = app.view();
            if !view.scene().has_anchor() {
                bail!("scene has no dialog box to draw into");
            }
            println!("{}", view.scene().to_svg());
        }
        Command::Route(args) => {
            let defaults = Arc::new(config.defaults.clone());
            let codec = ConfigCodec::new(Arc::clone(&defaults));
            let fragment = codec.encode_fragment(&args.configuration(&defaults.values));
            if fragment.is_empty() {
                println!("#");
            } else {
                println!("#{}", fragment);
            }
        }
    }

    Ok(())
}
