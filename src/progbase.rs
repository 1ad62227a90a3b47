include!(concat!(env!("OUT_DIR"), "/version.rs"));

use clap::Parser;
use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::process::exit;
use std::sync::{Arc, Mutex};

#[derive(Parser, Default)]
#[clap(about = "Prints the moving median of the numbers read from stdin, one per line")]
pub struct Opts {
    #[clap(short, long, default_value = "def")]
    pub id: String,
    #[clap(short, long, default_value = "info")]
    pub log_level: String,
    #[clap(short, long)]
    pub version: bool,
    #[clap(short, long)]
    pub stdout: bool,
    /// Window size, overrides the configuration file
    #[clap(short, long)]
    pub window: Option<usize>,
    /// Print the configuration schema and exit
    #[clap(long)]
    pub schema: bool,
}

pub struct Options {
    pub exe: String,
    pub id: String,
    pub log_level: LevelFilter,
    pub stdout: bool,
    pub window: Option<usize>,
    pub schema: bool,
}

impl Options {
    pub fn new(opts: Opts) -> Self {
        let exe_name = std::env::current_exe()
            .ok()
            .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

        Options {
            exe: exe_name,
            id: opts.id,
            log_level: parse_level(&opts.log_level),
            stdout: opts.stdout,
            window: opts.window,
            schema: opts.schema,
        }
    }
}

fn parse_level(level: &str) -> LevelFilter {
    match level {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

// Singleton for Options
lazy_static::lazy_static! {
    static ref OPTIONS: Arc<Mutex<Options>> = Arc::new(Mutex::new(Options {
        exe: String::new(),
        id: String::new(),
        log_level: LevelFilter::Info,
        stdout: false,
        window: None,
        schema: false,
    }));
}

fn options() -> std::sync::MutexGuard<'static, Options> {
    OPTIONS.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn try_init() -> Result<(), Box<dyn std::error::Error>> {
    try_init_from(std::env::args())
}

pub fn try_init_from<I, T>(args: I) -> Result<(), Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let mut opts = Opts {
        id: "def".to_string(),
        log_level: "info".to_string(),
        ..Opts::default()
    };

    let res = opts.try_update_from(args);
    if opts.version {
        print_version();
        exit(0)
    }
    *options() = Options::new(opts);
    Ok(res?)
}

pub fn init() {
    if let Err(e) = try_init() {
        // --help and usage errors are reported by clap itself
        if let Some(e) = e.downcast_ref::<clap::Error>() {
            e.exit()
        }
        panic!("Failed to initialize program base: {}", e);
    }
}

fn print_version() {
    println!("{}", GIT_REPO);
    println!("Build date: {}", BUILD_DATE);
    println!("Commit date: {}", GIT_COMMIT_DATE);
    println!("Branch: {}", GIT_BRANCH);
    println!("Hash: {}", GIT_HASH);
    println!("Tag: {} - {}", GIT_TAG, GIT_IS_DIRTY);
    println!("Author: {}", GIT_AUTHOR);
}

pub fn exe_name() -> String {
    options().exe.clone()
}

pub fn proc_name() -> String {
    options().id.clone()
}

pub fn log_lvl() -> LevelFilter {
    options().log_level
}

pub fn stdout() -> bool {
    options().stdout
}

/// Window size given on the command line, if any.
pub fn window_size() -> Option<usize> {
    options().window
}

pub fn print_schema() -> bool {
    options().schema
}

pub fn config_directory() -> PathBuf {
    env::var("CONFIGURATION_DIRECTORY").map_or_else(|_| PathBuf::from("/etc/tfc/"), PathBuf::from)
}

pub fn make_config_file_name(filename: &str, extension: &str) -> PathBuf {
    let config_dir = config_directory();
    config_dir
        .join(exe_name())
        .join(proc_name())
        .join(format!("{}.{}", filename, extension))
}
