// Shared constants for server timing, transports, and paths.

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_DEVICE_DIR: &str = "/dev";
pub const DEFAULT_SERIAL_BAUD: u32 = 9600;
pub const SETTINGS_FILE: &str = "settings.json";
pub const REDIRECT_SETTLE_MS: u64 = 200;
pub const SERIAL_RELOAD_PAUSE_MS: u64 = 1_000;
pub const SERIAL_TIMEOUT_MS: u64 = 500;
pub const HEARTBEAT_TIMEOUT_SECS: u64 = 5;
pub const PIEZO_COMMAND_PREFIX: &str = "p,";
