use std::env;
use std::fs::create_dir_all;
use std::io;
use std::path::Path;

/// Runtime settings read once from the process environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address for the HTTP server.
    pub bind_addr: String,

    /// Export mount directory, created at startup.
    pub export_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            export_dir: env::var("GOOGLE_DRIVE_MOUNT")
                .unwrap_or_else(|_| "./shared_exports".to_string()),
        }
    }

    /// Create the export mount directory if it doesn't exist.
    ///
    /// No handler writes into it yet; exports are streamed straight back to
    /// the client.
    // TODO: write generated workbooks here once the shared-drive mount is wired up
    pub fn init_export_dir(&self) -> io::Result<()> {
        if !Path::new(&self.export_dir).exists() {
            create_dir_all(&self.export_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_is_unset() {
        env::remove_var("BIND_ADDR");
        env::remove_var("GOOGLE_DRIVE_MOUNT");

        let config = Config::from_env();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.export_dir, "./shared_exports");
    }
}
