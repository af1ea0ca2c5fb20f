//! Mesh Texture Encoder CLI
//!
//! Convert OBJ and glTF meshes into data textures and block models.

use clap::{Args, Parser, Subcommand};
use mesh_texture_encoder::{
    convert_gltf_files, convert_obj_files, write_output, ColorBehavior, Compression, ConvertOptions,
    ConvertOutput, Header,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mesh-texture-encoder")]
#[command(author, version, about = "Encode meshes into data textures and block models", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert Wavefront OBJ frames
    Obj {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Convert glTF or GLB frames
    Gltf {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        options: OptionArgs,

        /// Ignore images embedded in the glTF files
        #[arg(long)]
        no_embedded_textures: bool,
    },

    /// Print the header of an existing data texture
    Inspect {
        /// PNG file to inspect
        input: PathBuf,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Input files, one per animation frame, in frame order
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// Source texture images, in layer order
    #[arg(short, long)]
    texture: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Output file name (without extension). Defaults to the first frame's name
    #[arg(short, long)]
    name: Option<String>,
}

#[derive(Args)]
struct OptionArgs {
    /// JSON file with conversion options. Flags below override it
    #[arg(long)]
    options: Option<PathBuf>,

    /// Translation added to every position (x,y,z)
    #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
    offset: Option<Vec<f64>>,

    /// Uniform position scale
    #[arg(long)]
    scale: Option<f64>,

    /// Animation duration in ticks (defaults to the frame count)
    #[arg(long)]
    duration: Option<u32>,

    /// Easing curve (0-3)
    #[arg(long)]
    easing: Option<u8>,

    /// Frame interpolation (0 = step, 1 = linear)
    #[arg(long)]
    interpolation: Option<u8>,

    /// Scalars driving the R, G and B tint channels (e.g. "time,overlay,hurt")
    #[arg(long, value_delimiter = ',', num_args = 3)]
    color_behavior: Option<Vec<ColorBehavior>>,

    /// Automatic rotation mode (0-3)
    #[arg(long)]
    auto_rotate: Option<u8>,

    /// Do not start the animation automatically
    #[arg(long)]
    no_auto_play: bool,

    /// Copy textures without flipping them vertically
    #[arg(long)]
    flip_uv: bool,

    /// Disable shading
    #[arg(long)]
    no_shadow: bool,

    /// Visibility mask (0-7)
    #[arg(long)]
    visibility: Option<u8>,

    /// Round the output height up to a power of two
    #[arg(long)]
    pow2: bool,

    /// Vertex compression: auto, true or false
    #[arg(long)]
    compression: Option<Compression>,

    /// Texture reference written into the model
    #[arg(long)]
    texture_name: Option<String>,
}

impl OptionArgs {
    fn resolve(&self) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.options {
            Some(path) => ConvertOptions::from_json(&fs::read_to_string(path)?)?,
            None => ConvertOptions::default(),
        };

        if let Some(offset) = &self.offset {
            options.offset = [offset[0], offset[1], offset[2]];
        }
        if let Some(scale) = self.scale {
            options.scale = scale;
        }
        if let Some(duration) = self.duration {
            options.duration = Some(duration);
        }
        if let Some(easing) = self.easing {
            options.easing = easing;
        }
        if let Some(interpolation) = self.interpolation {
            options.interpolation = interpolation;
        }
        if let Some(behavior) = &self.color_behavior {
            options.color_behavior = [behavior[0], behavior[1], behavior[2]];
        }
        if let Some(auto_rotate) = self.auto_rotate {
            options.auto_rotate = auto_rotate;
        }
        if let Some(visibility) = self.visibility {
            options.visibility = visibility;
        }
        if let Some(compression) = self.compression {
            options.compression = compression;
        }
        if let Some(name) = &self.texture_name {
            options.texture_name = name.clone();
        }
        options.auto_play &= !self.no_auto_play;
        options.flip_uv |= self.flip_uv;
        options.no_shadow |= self.no_shadow;
        options.pad_to_power_of_two |= self.pow2;

        options.validate()?;
        Ok(options)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .init();

    match cli.command {
        Commands::Obj { io, options } => {
            let options = options.resolve()?;
            println!("Converting {} OBJ frame(s)...", io.frames.len());
            let output = convert_obj_files(&io.frames, &io.texture, &options)?;
            finish(&io, &output)?;
        }
        Commands::Gltf {
            io,
            options,
            no_embedded_textures,
        } => {
            let mut options = options.resolve()?;
            options.use_embedded_textures &= !no_embedded_textures;
            println!("Converting {} glTF frame(s)...", io.frames.len());
            let output = convert_gltf_files(&io.frames, &io.texture, &options)?;
            finish(&io, &output)?;
        }
        Commands::Inspect { input } => {
            inspect(&input)?;
        }
    }

    Ok(())
}

fn finish(io: &IoArgs, output: &ConvertOutput) -> Result<(), Box<dyn std::error::Error>> {
    let name = match &io.name {
        Some(name) => name.clone(),
        None => output_name(&io.frames[0]),
    };
    write_output(&io.output, &name, output)?;

    println!("{}", output.stats);
    println!("Wrote {}", io.output.join(format!("{}.json", name)).display());
    println!("Wrote {}", io.output.join(format!("{}.png", name)).display());
    Ok(())
}

fn output_name(frame: &Path) -> String {
    frame
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

fn inspect(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::open(path)?.to_rgba8();
    let header = Header::read_from(&image)?;

    println!("Data texture {:?} ({}x{})", path, image.width(), image.height());
    println!("  Compressed:      {}", header.compressed);
    println!("  Texture size:    {}x{}", header.texture_width, header.texture_height);
    println!("  Textures:        {}", header.texture_count);
    println!("  Vertices/frame:  {} ({} faces)", header.vertex_count, header.vertex_count / 4);
    println!("  Frames:          {}", header.frame_count);
    println!("  Duration:        {}", header.duration);
    println!("  Auto play:       {}", header.auto_play);
    println!("  Easing:          {}", header.easing);
    println!("  Interpolation:   {}", header.interpolation);
    println!("  Positions rows:  {}", header.positions_height);
    println!("  UV rows:         {}", header.uvs_height);
    println!("  No shadow:       {}", header.no_shadow);
    println!("  Auto rotate:     {}", header.auto_rotate);
    println!("  Visibility:      {}", header.visibility);
    let [r, g, b] = header.color_behavior;
    println!("  Color behavior:  {}, {}, {}", r, g, b);
    Ok(())
}
