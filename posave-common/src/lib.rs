use anyhow::{Context, Result};
use log::debug;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3333;
pub const DATA_FILE_NAME: &str = "data.json";
pub const HTML_FILE_NAME: &str = "index.html";

/// Everything the server needs to know about where it lives.
///
/// Production values come from [`ServerConfig::from_deployment_dir`]; tests
/// point the same file names at a scratch directory with [`ServerConfig::in_dir`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub data_file: PathBuf,
    pub html_file: PathBuf,
    pub open_browser: bool,
}

impl ServerConfig {
    /// Loopback on the fixed port, with both files next to the running executable.
    pub fn from_deployment_dir() -> Result<Self> {
        let exe = std::env::current_exe().context("Failed to resolve executable path")?;
        let dir = exe
            .parent()
            .with_context(|| format!("Executable has no parent directory: {exe:?}"))?;
        Ok(Self::in_dir(dir)
            .with_port(DEFAULT_PORT)
            .with_browser(true))
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            data_file: dir.join(DATA_FILE_NAME),
            html_file: dir.join(HTML_FILE_NAME),
            open_browser: false,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn data_file_name(&self) -> String {
        self.data_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.data_file.display().to_string())
    }
}

/// The URL users type, always spelled with `localhost`.
pub fn server_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

pub fn banner_lines(port: u16, data_file_name: &str) -> Vec<String> {
    vec![
        String::new(),
        "  ⬡  POS Platform server running".to_string(),
        format!("  →  {}", server_url(port)),
        format!("  →  Edits saved to: {data_file_name}"),
        String::new(),
        "  Press Ctrl+C to stop.".to_string(),
        String::new(),
    ]
}

pub fn print_banner(port: u16, data_file_name: &str) {
    for line in banner_lines(port, data_file_name) {
        println!("{line}");
    }
}

/// Best effort: hands the URL to the platform's default browser and forgets about it.
pub fn launch_browser(url: &str) {
    if let Err(e) = open::that_detached(url) {
        debug!("Browser launch failed for {url}: {e}");
    }
}
