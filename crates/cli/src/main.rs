//! Command-line interface for s3etag.

mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::TryStreamExt;
use output::{OutputFormat, RowWriter};
use s3etag_core::{
    ChunkingPolicy, DEFAULT_MULTIPART_THRESHOLD, MultipartThreshold, RemoteConfig, format_size,
    parse_size,
};
use s3etag_verify::{CompareRequest, compare, hash_file, walk_files};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "s3etag")]
#[command(about = "Calculate S3 ETags locally and compare them with remote objects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct LocalArgs {
    /// File or directory to hash
    #[arg(long, short = 'p', value_parser = existing_path)]
    path: PathBuf,

    /// Multipart chunk size (e.g. "8mb", "16 MiB", "5242880")
    #[arg(
        long,
        short = 'c',
        env = "S3ETAG_CHUNKSIZE",
        default_value = "8mb",
        value_parser = parse_chunk_size
    )]
    chunksize: u64,

    /// Size above which uploads are multipart, or "inf" to never split
    #[arg(
        long,
        short = 'm',
        env = "S3ETAG_MULTIPART_THRESHOLD",
        default_value = "8mb"
    )]
    multipart_threshold: MultipartThreshold,
}

#[derive(Args, Clone, Debug)]
struct RemoteArgs {
    /// Bucket holding the objects
    #[arg(long, short = 'b', env = "S3ETAG_BUCKET")]
    bucket: String,

    /// Object key, or key prefix when comparing a directory
    #[arg(long, short = 'k')]
    key: String,

    /// Custom S3 endpoint (e.g. "http://localhost:9000")
    #[arg(long, env = "S3ETAG_ENDPOINT")]
    endpoint: Option<String>,

    /// Region to sign requests for (default: us-east-1)
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Access key; when unset the default AWS credential chain is used
    #[arg(long, env = "S3ETAG_ACCESS_KEY_ID", hide_env_values = true)]
    access_key_id: Option<String>,

    /// Secret key, required together with --access-key-id
    #[arg(long, env = "S3ETAG_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,

    /// Use path-style addressing (endpoint/bucket/key)
    #[arg(long, default_value_t = false)]
    force_path_style: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "S3ETAG_TIMEOUT", value_parser = parse_timeout)]
    timeout: Option<Duration>,
}

impl RemoteArgs {
    fn to_config(&self) -> RemoteConfig {
        RemoteConfig {
            bucket: self.bucket.clone(),
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            force_path_style: self.force_path_style,
            timeout: self.timeout,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ETag a local file would get when uploaded
    Local {
        #[command(flatten)]
        local: LocalArgs,
    },
    /// Print the ETag of a remote object
    Remote {
        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Compare a local file or directory with remote objects
    Compare {
        #[command(flatten)]
        local: LocalArgs,

        #[command(flatten)]
        remote: RemoteArgs,

        /// Skip symlinks while walking a directory
        #[arg(long, default_value_t = false)]
        ignore_symlinks: bool,

        /// Print every compared file, not only mismatches
        #[arg(long, short = 'v', default_value_t = false)]
        verbose: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
        format: OutputFormat,
    },
}

fn existing_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("path {value} does not exist"))
    }
}

fn parse_chunk_size(value: &str) -> Result<u64, String> {
    let size = parse_size(value).map_err(|e| e.to_string())?;
    if size == 0 {
        return Err("chunk size must be greater than zero".to_string());
    }
    Ok(size)
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid timeout: {value}"))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err("timeout must be a positive number of seconds".to_string());
    }
    Ok(Duration::from_secs_f64(seconds))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let Cli { command } = Cli::parse();

    match command {
        Commands::Local { local } => handle_local_command(&local).await,
        Commands::Remote { remote } => handle_remote_command(&remote).await,
        Commands::Compare {
            local,
            remote,
            ignore_symlinks,
            verbose,
            format,
        } => handle_compare_command(&local, &remote, ignore_symlinks, verbose, format).await,
    }
}

async fn handle_local_command(local: &LocalArgs) -> Result<ExitCode> {
    let policy = ChunkingPolicy::new(local.chunksize, local.multipart_threshold)?;
    let metadata = tokio::fs::metadata(&local.path)
        .await
        .with_context(|| format!("failed to stat {}", local.path.display()))?;

    if metadata.is_dir() {
        let mut files = walk_files(local.path.clone(), false);
        while let Some(file) = files.try_next().await? {
            let etag = hash_file(file.path.clone(), policy).await?;
            println!("{etag}\t{}", file.name());
        }
    } else {
        let etag = hash_file(local.path.clone(), policy).await?;
        println!("{etag}");
    }

    Ok(ExitCode::SUCCESS)
}

async fn handle_remote_command(remote: &RemoteArgs) -> Result<ExitCode> {
    let store = s3etag_storage::from_config(&remote.to_config())
        .context("failed to configure remote store")?;

    let etag = store
        .etag(&remote.key)
        .await
        .with_context(|| format!("failed to look up s3://{}/{}", remote.bucket, remote.key))?;

    match etag {
        Some(etag) => println!("{etag}"),
        None => {
            tracing::warn!(bucket = %remote.bucket, key = %remote.key, "object not found");
            println!();
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn handle_compare_command(
    local: &LocalArgs,
    remote: &RemoteArgs,
    ignore_symlinks: bool,
    verbose: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    if local.multipart_threshold != MultipartThreshold::Bytes(DEFAULT_MULTIPART_THRESHOLD) {
        tracing::info!(
            threshold = %local.multipart_threshold,
            "multipart threshold is inferred from each remote ETag when comparing"
        );
    }

    let store = s3etag_storage::from_config(&remote.to_config())
        .context("failed to configure remote store")?;
    let request = CompareRequest::new(&local.path, &remote.key)
        .with_chunk_size(local.chunksize)
        .with_ignore_symlinks(ignore_symlinks);

    tracing::debug!(
        path = %local.path.display(),
        bucket = %remote.bucket,
        key = %remote.key,
        chunk_size = %format_size(local.chunksize),
        "starting comparison"
    );

    let mut writer = RowWriter::new(std::io::stdout(), format);
    writer.write_header().context("failed to write output")?;

    let mut results = compare(store, request);
    let mut compared = 0usize;
    let mut mismatched = 0usize;
    while let Some(comparison) = results.try_next().await? {
        compared += 1;
        let equal = comparison.is_equal();
        if !equal {
            mismatched += 1;
        }
        if !equal || verbose {
            writer
                .write_row(&comparison)
                .context("failed to write output")?;
        }
    }

    tracing::info!(compared, mismatched, "comparison finished");

    if mismatched > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
