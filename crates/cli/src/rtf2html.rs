//! rtf2html - Turn a saved Word clipboard into self-contained HTML
//!
//! Reads the HTML flavour of a clipboard dump, optionally together with its
//! RTF flavour, and writes HTML in which every image is inlined.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use wordpaste_core::reconcile::ResourceResolver;
use wordpaste_core::{
    ClipboardPayload, DroppedFile, ImageType, PasteError, PasteOutput, PasteProcessor, Result,
};

/// Turn the HTML and RTF flavours of a Word clipboard into HTML with
/// inlined images.
#[derive(Parser, Debug)]
#[command(name = "rtf2html")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the HTML clipboard flavour
    #[arg(long, required = true)]
    html: PathBuf,

    /// Path to the RTF clipboard flavour
    #[arg(long)]
    rtf: Option<PathBuf>,

    /// Path to the plain text flavour, used when no HTML survives
    #[arg(long)]
    text: Option<PathBuf>,

    /// A file dropped together with the clipboard data
    #[arg(long)]
    file: Option<PathBuf>,

    /// Directory holding the contents of `blob:` references, one file per
    /// reference named by its last path segment
    #[arg(long = "resource-dir")]
    resource_dir: Option<PathBuf>,

    /// Fail when HTML and RTF disagree on the number of images
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Bound for a single image encode or resource fetch
    #[arg(long = "timeout-ms", default_value = "10000")]
    timeout_ms: u64,

    /// Write diagnostics as JSON to this path
    #[arg(long)]
    diagnostics: Option<PathBuf>,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

/// Serves `blob:` references from files in a directory.
struct DirResolver {
    dir: PathBuf,
}

impl DirResolver {
    fn path_for(&self, reference: &str) -> Option<PathBuf> {
        let name = reference.rsplit('/').next()?;
        let name = name.rsplit(':').next()?;
        if name.is_empty() || name == ".." {
            return None;
        }
        Some(self.dir.join(name))
    }
}

#[async_trait]
impl ResourceResolver for DirResolver {
    async fn resolve(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self.path_for(reference).ok_or_else(|| PasteError::Resolve {
            reference: reference.to_string(),
            msg: "reference has no file name".to_string(),
        })?;
        debug!(reference, path = %path.display(), "reading resource");
        tokio::fs::read(&path).await.map_err(|e| PasteError::Resolve {
            reference: reference.to_string(),
            msg: format!("{}: {e}", path.display()),
        })
    }
}

async fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(path) => Ok(Some(tokio::fs::read_to_string(path).await?)),
        None => Ok(None),
    }
}

async fn read_dropped_file(path: &Path) -> Result<DroppedFile> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => ImageType::Png.mime(),
        Some("jpg" | "jpeg") => ImageType::Jpeg.mime(),
        Some("gif") => ImageType::Gif.mime(),
        _ => None,
    };
    Ok(DroppedFile {
        name,
        mime: mime.unwrap_or_default().to_string(),
        bytes,
    })
}

async fn run(args: &Args) -> Result<PasteOutput> {
    let mut builder = PasteProcessor::builder()
        .timeout(Duration::from_millis(args.timeout_ms))
        .strict(args.strict);
    if let Some(dir) = &args.resource_dir {
        builder = builder.resolver(DirResolver { dir: dir.clone() });
    }
    let processor = builder.build();

    let html = tokio::fs::read_to_string(&args.html).await?;
    let payload = ClipboardPayload {
        html,
        text: read_optional(args.text.as_deref()).await?.unwrap_or_default(),
        rtf: read_optional(args.rtf.as_deref()).await?,
        file: match &args.file {
            Some(path) => Some(read_dropped_file(path).await?),
            None => None,
        },
    };

    processor.process(payload).await
}

fn write_diagnostics(path: &Path, output: &PasteOutput) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &output.diagnostics)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let output = match run(&args).await {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error processing {}: {}", args.html.display(), e);
            std::process::exit(1);
        }
    };

    for diagnostic in &output.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    if let Some(path) = &args.diagnostics {
        write_diagnostics(path, &output)
            .map_err(|e| format!("Failed to write diagnostics {}: {}", path.display(), e))?;
    }

    let mut out: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .map_err(|e| format!("Failed to create output file {}: {}", args.outfile, e))?;
        Box::new(BufWriter::new(file))
    };
    out.write_all(output.html.as_bytes())?;
    out.flush()?;

    Ok(())
}
