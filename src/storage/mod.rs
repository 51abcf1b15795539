mod file;

pub use file::*;

/// Save file used when no path is configured.
pub const DEFAULT_FILE_NAME: &str = "expenses.dat";

/// Version written into every save file. Files with any other version are
/// reported as unreadable.
pub const FORMAT_VERSION: u32 = 1;
