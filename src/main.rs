use clap::{Parser, Subcommand};
use site_studio::blocks::{BlockRegistry, BlockType, pricing};
use site_studio::generate::Generator;
use site_studio::logging::{self, LogLevel, Logger, RingBufferLogger};
use site_studio::project::Project;
use site_studio::{config, output, schema};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "site-studio")]
#[command(about = "Block-based static website generator")]
#[command(long_about = "\
Block-based static website generator

A project is a JSON description of a site: business info, SEO settings and
pages, each page an ordered list of blocks. Every block names its type and
carries the data an editor filled in:

  {
    \"id\": \"proj_001\",
    \"businessInfo\": { \"name\": \"Tech Solutions Inc\" },
    \"pages\": [{
      \"name\": \"Home\",
      \"blocks\": [
        { \"id\": \"top\",  \"blockId\": \"header\", \"order\": 0 },
        { \"id\": \"hero\", \"blockId\": \"hero\",   \"order\": 1,
          \"data\": { \"variant\": \"split-image\", \"title\": \"We build software\" } }
      ]
    }]
  }

Output:

  dist/
  ├── index.html               # First page
  ├── services/index.html      # Every other page under its slug
  ├── assets/site.css          # Theme + each block stylesheet once
  ├── assets/site.js           # Each block script once
  ├── sitemap.xml
  └── robots.txt

Run 'site-studio blocks' to list block types and their variants.
Run 'site-studio gen-config' to generate a documented studio.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Studio configuration file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Output directory (overrides generator.output_path)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Log every block render
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the static site for a project
    Generate {
        /// Project JSON file
        project: PathBuf,
        /// Compute files and metrics without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Disable the render memo and rewrite every file
        #[arg(long)]
        no_cache: bool,
        /// Render blocks on the calling thread
        #[arg(long)]
        sequential: bool,
    },
    /// Validate block data against its schema
    Validate {
        /// Block type, e.g. hero or pricing
        block: String,
        /// JSON file holding the block data
        data: PathBuf,
        /// Print the {success, data | error} report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the default data of a block type as JSON
    Defaults {
        /// Block type, e.g. hero or pricing
        block: String,
    },
    /// List block types and their variants
    Blocks,
    /// Print a stock studio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            project,
            dry_run,
            no_cache,
            sequential,
        } => {
            let mut studio = config::load_config(&cli.config)?;
            if let Some(out) = &cli.output {
                studio.generator.output_path = out.display().to_string();
            }
            studio.options.dry_run |= dry_run;
            studio.options.cache &= !no_cache;
            studio.options.parallel &= !sequential;
            studio.options.verbose |= cli.verbose;

            let logger = Arc::new(
                RingBufferLogger::new(studio.logging.max_entries, studio.logging.level)
                    .with_tracing(true),
            );
            let project = Project::load(&project)?;
            let dry_run = studio.options.dry_run;
            let generator = Generator::new(studio, logger);
            let result = generator.generate(&project);
            output::print_generation_result(&result);

            if !result.success {
                return Err(format!("generation of {} failed", project.id).into());
            }
            if dry_run {
                println!("==> Dry run: nothing written");
            } else {
                println!("==> Site written to {}", result.output_path);
            }
        }
        Command::Validate { block, data, json } => {
            let registry = builtin_registry();
            let renderer = lookup(&registry, &block)?;
            let data = read_block_data(&data, &block)?;
            let result = renderer.validate(&data);
            if json {
                println!("{}", serde_json::to_string_pretty(&schema::report(&result))?);
            } else {
                output::print_validation(&block, &result);
            }
            if let Err(errors) = result {
                return Err(format!(
                    "{block}: {} validation error(s)",
                    errors.errors.len()
                )
                .into());
            }
        }
        Command::Defaults { block } => {
            let registry = builtin_registry();
            let renderer = lookup(&registry, &block)?;
            println!("{}", serde_json::to_string_pretty(&renderer.default_data())?);
        }
        Command::Blocks => {
            output::print_block_list(&builtin_registry());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn builtin_registry() -> BlockRegistry {
    let logger: Arc<dyn Logger> =
        Arc::new(RingBufferLogger::new(1000, LogLevel::Info).with_tracing(true));
    BlockRegistry::builtin(logger)
}

fn lookup<'a>(
    registry: &'a BlockRegistry,
    block: &str,
) -> Result<&'a Arc<dyn site_studio::render::BlockRenderer>, String> {
    registry.get(block).ok_or_else(|| {
        let known: Vec<&str> = registry.keys().collect();
        format!("unknown block '{block}'. Available: {}", known.join(", "))
    })
}

/// Read block data, accepting the flat editor shape for pricing.
fn read_block_data(
    path: &Path,
    block: &str,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let data: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    if matches!(block.parse::<BlockType>(), Ok(BlockType::Pricing))
        && let Some(map) = data.as_object()
        && pricing::is_flat(map)
    {
        return Ok(pricing::from_flat(map));
    }
    Ok(data)
}
