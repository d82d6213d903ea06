/// Number of hex characters kept from a SHA-256 digest for plan identifiers.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Environment variable overriding the cmake program used by `CmakeBackend`.
pub const CMAKE_ENV: &str = "AESPKG_CMAKE";

/// File written into a package root describing what was copied.
pub const MANIFEST_FILE_NAME: &str = "package-manifest.json";

/// Fixed timestamp handed to native builds (January 1, 1980 00:00:00 UTC).
pub const SOURCE_DATE_EPOCH: &str = "315532800";
