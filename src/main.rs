// stream-cat: concatenate files (or stdin) to stdout
//
// Every path is opened lazily when its turn comes, so an unreadable file
// fails at its position in the output while later files are still drained.

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use log::debug;
use std::path::PathBuf;
use stream_cat::{CatError, CatOptions, Deferred, Item, cat_with_options};
use stream_cat::cat::DEFAULT_READ_CHUNK_SIZE;
use tokio::io::AsyncWriteExt;

#[derive(Parser)]
#[command(name = "stream-cat")]
#[command(about = "Concatenate files to standard output, in order", long_about = None)]
struct Cli {
    /// Files to concatenate; `-` reads standard input
    #[arg(default_value = "-")]
    files: Vec<PathBuf>,

    /// Read size for each file, in bytes
    #[arg(long, default_value_t = DEFAULT_READ_CHUNK_SIZE)]
    chunk_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let options = CatOptions::new()
        .read_chunk_size(cli.chunk_size)
        .error_mapper(|e| e.context("stream-cat"));

    let items: Vec<Item> = cli
        .files
        .into_iter()
        .map(|path| open_item(path, options.clone()))
        .collect();

    let mut output = cat_with_options(items, options);
    let mut stdout = tokio::io::stdout();
    let mut failure = None;

    // Read to the end even after a failure so later files are drained.
    while let Some(chunk) = output.next().await {
        match chunk {
            Ok(chunk) => stdout
                .write_all(&chunk)
                .await
                .context("failed to write to stdout")?,
            Err(e) => failure = Some(e),
        }
    }

    stdout.flush().await.context("failed to flush stdout")?;
    output.drained().await;

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Deferred item opening `path` once the engine reaches it.
///
/// Open and read failures both carry the path.
fn open_item(path: PathBuf, options: CatOptions) -> Item {
    Deferred::new(async move {
        let label = path.display().to_string();
        if path.as_os_str() == "-" {
            debug!("reading stdin");
            return Ok::<_, CatError>(options.reader(tokio::io::stdin()).context("<stdin>"));
        }

        debug!("opening {label}");
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| CatError::from(e).context(label.clone()))?;
        Ok(options.reader(file).context(label))
    })
    .into()
}
