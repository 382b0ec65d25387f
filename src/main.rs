mod cli;

use formatfusion::{
    config,
    converter::Converter,
    server,
};
use formatfusion_av::{format::extension_of, inspect_image, MediaKind, TargetFormat};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Formatfusion server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "formatfusion=trace,formatfusion_av=trace,tower_http=debug".to_string()
        } else {
            "formatfusion=debug,formatfusion_av=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Convert {
            input,
            to,
            kind,
            output,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert_file(
                &input,
                &to,
                kind.as_deref(),
                output.as_deref(),
                cli.config.as_deref(),
            ))
        }
        Commands::Inspect { file, json } => inspect_file(&file, json),
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&file, json, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Formats => {
            list_formats();
            Ok(())
        }
        Commands::Version => {
            println!("formatfusion {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn convert_file(
    input: &Path,
    to: &str,
    kind: Option<&str>,
    output: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .context("Input path has no file name")?;

    let kind = match kind {
        Some(kind) => kind.parse::<MediaKind>()?,
        None => extension_of(&filename)
            .and_then(|ext| MediaKind::from_extension(&ext))
            .with_context(|| {
                format!("Cannot tell the media kind of {:?}; pass --kind", input)
            })?,
    };
    let target = TargetFormat::parse(kind, to)?;

    let data = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {:?}", input))?;

    let converter = Converter::new(&config);
    let upload = converter.receive(kind, &filename, &data)?;

    tracing::info!("Converting {:?} ({}) to {}", input, kind, target);
    let asset = converter.transcode(&upload, target).await?;

    let destination = destination_path(input, output, &asset.file_name);
    if destination == input {
        anyhow::bail!(
            "Refusing to overwrite the input file {:?}; pass --output",
            input
        );
    }

    tokio::fs::write(&destination, &asset.bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", destination))?;

    println!("{}", destination.display());
    Ok(())
}

/// Where a converted file goes: an explicit file, into an explicit
/// directory, or next to the input.
fn destination_path(input: &Path, output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => input
            .parent()
            .map(|dir| dir.join(file_name))
            .unwrap_or_else(|| PathBuf::from(file_name)),
    }
}

fn inspect_file(file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let info = inspect_image(file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("File: {}", file.display());
        println!("Size: {}x{}", info.width, info.height);
        println!("Format: {}", info.format.as_deref().unwrap_or("unknown"));
        println!("Mode: {}", info.color);
        match info.metadata.icc_profile {
            Some(len) => println!("ICC profile: {} bytes", len),
            None => println!("ICC profile: none"),
        }
        match info.metadata.exif {
            Some(len) => println!("EXIF: {} bytes", len),
            None => println!("EXIF: none"),
        }
    }

    Ok(())
}

async fn probe_file(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let summary = Converter::new(&config).probe(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("File: {}", summary.file_path.display());
    println!("Container: {}", summary.container);
    println!("Size: {} bytes", summary.file_size);
    if let Some(ref duration) = summary.duration {
        let secs = duration.as_secs();
        let mins = secs / 60;
        let hours = mins / 60;
        println!(
            "Duration: {:02}:{:02}:{:02}.{:03}",
            hours,
            mins % 60,
            secs % 60,
            duration.subsec_millis()
        );
    }

    println!("\nStreams: {}", summary.streams.len());
    for stream in &summary.streams {
        print!(
            "  [{}] {} {}",
            stream.index,
            stream.kind,
            stream.codec.as_deref().unwrap_or("?")
        );
        if let (Some(w), Some(h)) = (stream.width, stream.height) {
            print!(" {}x{}", w, h);
        }
        if let Some(channels) = stream.channels {
            print!(" {}ch", channels);
        }
        if let Some(rate) = stream.sample_rate {
            print!(" {} Hz", rate);
        }
        println!();
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = formatfusion_av::check_tools(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Image conversion works without them; video and audio do not.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Max upload: {} MB", config.server.max_upload_mb);
            println!("  Upload TTL: {}s", config.server.upload_ttl_secs);
            if let Some(ref dir) = config.conversion.temp_dir {
                println!("  Temp dir: {}", dir.display());
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}

fn list_formats() {
    for kind in MediaKind::all() {
        let targets: Vec<String> = kind.targets().iter().map(|t| t.to_string()).collect();
        println!("{}", kind);
        println!("  uploads: {}", kind.upload_extensions().join(", "));
        println!("  targets: {}", targets.join(", "));
    }
}
