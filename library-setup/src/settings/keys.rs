//! Required database settings

/// A setting that must be present and non-empty before any database work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredKey {
    pub name: &'static str,
    pub description: &'static str,
    pub secret: bool,
}

pub const PG_HOST: &str = "PG_HOST";
pub const PG_PORT: &str = "PG_PORT";
pub const PG_USER: &str = "PG_USER";
pub const PG_PASSWORD: &str = "PG_PASSWORD";
pub const PG_DATABASE: &str = "PG_DATABASE";

/// Placeholder shipped in the template; treated as "no value".
pub const PASSWORD_PLACEHOLDER: &str = "<your_password_here>";

/// Canonical order used for prompting and for writing the file.
pub const REQUIRED_KEYS: [RequiredKey; 5] = [
    RequiredKey {
        name: PG_HOST,
        description: "PostgreSQL host",
        secret: false,
    },
    RequiredKey {
        name: PG_PORT,
        description: "PostgreSQL port",
        secret: false,
    },
    RequiredKey {
        name: PG_USER,
        description: "PostgreSQL user",
        secret: false,
    },
    RequiredKey {
        name: PG_PASSWORD,
        description: "PostgreSQL password",
        secret: true,
    },
    RequiredKey {
        name: PG_DATABASE,
        description: "Database name",
        secret: false,
    },
];
