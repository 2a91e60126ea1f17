use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Hemascreen";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port for the screening API when `SERVER_PORT` is unset.
pub const DEFAULT_PORT: u16 = 8450;

/// Get the application data directory.
/// `HEMASCREEN_DATA_DIR` overrides the default of ~/Hemascreen/.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HEMASCREEN_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Hemascreen")
}

/// Path of the screening database.
pub fn db_path() -> PathBuf {
    data_dir().join("screenings.db")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}
