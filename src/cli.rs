//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use bili_downloader::config::Overrides;

/// Serve a web page that downloads Bilibili videos with yt-dlp.
///
/// Every path option overrides the config file; relative download and cookie
/// paths resolve against the base directory.
#[derive(Parser, Debug)]
#[command(name = "bili-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/bili-downloader/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to listen on (default: 127.0.0.1:8000)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Application base directory (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Directory downloads are written to and served from (default: downloads)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// yt-dlp executable (default: yt-dlp from PATH)
    #[arg(long, value_name = "PATH")]
    pub engine_binary: Option<PathBuf>,

    /// Cookie file passed to yt-dlp when it exists (default: bilibili.com_cookies.txt)
    #[arg(long, value_name = "PATH")]
    pub cookies_file: Option<PathBuf>,
}

impl Args {
    /// Settings given on the command line.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            bind: self.bind.clone(),
            base_dir: self.base_dir.clone(),
            download_dir: self.download_dir.clone(),
            engine_binary: self.engine_binary.clone(),
            cookies_file: self.cookies_file.clone(),
        }
    }
}
