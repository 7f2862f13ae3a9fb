use anyhow::{Context, Result as AnyhowResult};
use clap::{Parser, Subcommand};
use native_fs::config::Config;
use native_fs::services::fs::{
    FileSystem, FsProvider, GrantStore, LocalFsProvider, LocalScopedStorage, PresetPicker,
};
use native_fs::services::{log_dirs, tracing_setup};
use native_fs::{config_io, roots, Encoding, FsError, HashAlgorithm, OpenDocumentRequest};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Command line host for the native filesystem facade
#[derive(Parser, Debug)]
#[command(name = "nfs")]
#[command(about = "Run filesystem facade operations from the shell", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Path to log file (default: PID-named file in the state directory)
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Log to stderr instead of a file
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy a file
    Cp { source: String, target: String },
    /// Print whether a path exists
    Exists { path: String },
    /// List a directory
    Ls { path: String },
    /// Create a directory and its parents
    Mkdir { path: String },
    /// Move a file or directory
    Mv { source: String, target: String },
    /// Rename an entry within its directory
    Rename { source: String, name: String },
    /// Print a file's content
    Read {
        path: String,
        #[arg(long)]
        encoding: Option<Encoding>,
    },
    /// Describe an entry
    Stat { path: String },
    /// Delete a file or directory tree
    Rm { path: String },
    /// Replace a file's content
    Write {
        path: String,
        content: String,
        #[arg(long)]
        encoding: Option<Encoding>,
    },
    /// Append to a file, creating it if needed
    Append {
        path: String,
        content: String,
        #[arg(long)]
        encoding: Option<Encoding>,
    },
    /// Gzip a file
    Gzip { source: String, target: String },
    /// Gunzip a file
    Gunzip { source: String, target: String },
    /// Gzip a string and print it as base64
    GzipString {
        content: String,
        #[arg(long)]
        encoding: Option<Encoding>,
    },
    /// Gunzip a base64 string
    GunzipString {
        content: String,
        #[arg(long)]
        encoding: Option<Encoding>,
    },
    /// Print a file digest
    Hash {
        path: String,
        #[arg(long, default_value = "sha256")]
        algorithm: HashAlgorithm,
    },
    /// Print the storage roots as JSON
    Dirs,
    /// List external storage roots
    StoragePaths {
        /// Only removable (true) or only fixed (false) roots
        #[arg(long)]
        removable: Option<bool>,
    },
    /// Open documents through a preset picker
    OpenDocument {
        /// Documents the picker returns
        #[arg(long = "pick", value_name = "PATH")]
        picks: Vec<String>,
        #[arg(long = "mime")]
        mime_types: Vec<String>,
        #[arg(long = "ext")]
        extension_types: Vec<String>,
        #[arg(long)]
        multi: bool,
        #[arg(long, value_name = "DIR")]
        to_path: Option<String>,
        #[arg(long)]
        encoding: Option<Encoding>,
    },
    /// Open a document tree through a preset picker
    OpenDocumentTree {
        #[arg(long = "pick", value_name = "PATH")]
        pick: Option<String>,
        #[arg(long)]
        persist: bool,
    },
    /// List persisted document grants
    Grants,
    /// Release a persisted document grant
    ReleaseGrant { uri: String },
}

fn print_json<T: Serialize>(value: &T) -> AnyhowResult<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn init_logging(args: &Args, config: &Config) -> AnyhowResult<()> {
    if args.log_stderr {
        return tracing_setup::init_global(None, &config.log_level)
            .context("Failed to initialize logging");
    }

    let log_file = args.log_file.clone().unwrap_or_else(log_dirs::main_log_path);
    tracing_setup::init_global(Some(&log_file), &config.log_level)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
    log_dirs::cleanup_stale_logs();
    Ok(())
}

/// Assemble the facade, with scoped storage answering from the preset picker
fn build_facade(config: &Config, picker: PresetPicker) -> AnyhowResult<FileSystem> {
    let local = Arc::new(
        LocalFsProvider::from_config(config).context("Failed to resolve storage roots")?,
    );
    let grants_path = config
        .grants_file
        .clone()
        .unwrap_or_else(|| LocalScopedStorage::default_grants_path(local.as_ref()));
    let grants = GrantStore::open(&grants_path)
        .with_context(|| format!("Failed to load grants from {}", grants_path.display()))?;

    let provider: Arc<dyn FsProvider> = local;
    let scoped = LocalScopedStorage::new(Arc::new(picker), provider.clone(), grants);
    Ok(FileSystem::new(provider).with_scoped(Arc::new(scoped)))
}

async fn run(fs: FileSystem, command: Command) -> AnyhowResult<()> {
    match command {
        Command::Cp { source, target } => fs.copy(&source, &target).await?,
        Command::Exists { path } => println!("{}", fs.exists(&path).await?),
        Command::Ls { path } => print_json(&fs.list(&path).await?)?,
        Command::Mkdir { path } => print_json(&fs.make_directory(&path).await?)?,
        Command::Mv { source, target } => println!("{}", fs.move_path(&source, &target).await?),
        Command::Rename { source, name } => println!("{}", fs.rename(&source, &name).await?),
        Command::Read { path, encoding } => println!("{}", fs.read_file(&path, encoding).await?),
        Command::Stat { path } => print_json(&fs.stat(&path).await?)?,
        Command::Rm { path } => println!("{}", fs.delete(&path).await?),
        Command::Write {
            path,
            content,
            encoding,
        } => fs.write_file(&path, &content, encoding).await?,
        Command::Append {
            path,
            content,
            encoding,
        } => fs.append_file(&path, &content, encoding).await?,
        Command::Gzip { source, target } => fs.compress_file(&source, &target).await?,
        Command::Gunzip { source, target } => fs.decompress_file(&source, &target).await?,
        Command::GzipString { content, encoding } => {
            println!("{}", fs.compress_string(&content, encoding).await?)
        }
        Command::GunzipString { content, encoding } => {
            println!("{}", fs.decompress_string(&content, encoding).await?)
        }
        Command::Hash { path, algorithm } => println!("{}", fs.hash(&path, algorithm).await?),
        Command::Dirs => print_json(fs.dirs()?)?,
        Command::StoragePaths { removable } => {
            for path in fs.external_storage_paths(removable).await? {
                println!("{path}");
            }
        }
        Command::OpenDocument {
            mime_types,
            extension_types,
            multi,
            to_path,
            encoding,
            ..
        } => {
            let request = OpenDocumentRequest {
                mime_types: (!mime_types.is_empty()).then_some(mime_types),
                extension_types: (!extension_types.is_empty()).then_some(extension_types),
                allow_multiple: Some(multi),
                destination_path: to_path,
                encoding,
            };
            let scoped = fs.scoped()?.context("Scoped storage is not available")?;
            print_json(&scoped.open_document(&request).await?)?
        }
        Command::OpenDocumentTree { persist, .. } => {
            let scoped = fs.scoped()?.context("Scoped storage is not available")?;
            print_json(&scoped.open_document_tree(persist).await?)?
        }
        Command::Grants => {
            let scoped = fs.scoped()?.context("Scoped storage is not available")?;
            for uri in scoped.list_granted_uri_permissions().await? {
                println!("{uri}");
            }
        }
        Command::ReleaseGrant { uri } => {
            let scoped = fs.scoped()?.context("Scoped storage is not available")?;
            scoped.release_uri_permission(&uri).await?
        }
    }
    Ok(())
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let config = config_io::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&args, &config)?;
    tracing::info!("Starting nfs with config app_name={}", config.app_name);

    let picker = match &args.command {
        Command::OpenDocument { picks, .. } => PresetPicker::new().with_documents(picks.clone()),
        Command::OpenDocumentTree { pick: Some(uri), .. } => PresetPicker::new().with_tree(uri),
        _ => PresetPicker::new(),
    };
    roots::init(roots::resolve(&config).context("Failed to resolve storage roots")?);
    let fs = build_facade(&config, picker)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let command = args.command;
    if let Err(err) = runtime.block_on(run(fs, command)) {
        if let Some(fs_err) = err.downcast_ref::<FsError>() {
            tracing::error!(code = fs_err.code(), "{fs_err}");
        }
        return Err(err);
    }
    Ok(())
}
