//! Static configuration constants
//! Mirror of the generated compile-time constants for tooling that does not
//! run through the build script (docs, IDE analysis).

pub mod compile_time {
    pub mod lexical {
        /// Maximum source input size in bytes
        pub const MAX_SOURCE_SIZE: usize = 10_485_760;
        /// Maximum number of tokens a single tokenization run may produce
        pub const MAX_TOKEN_COUNT: usize = 1_000_000;
        /// Maximum size of a single token value in bytes
        pub const MAX_TOKEN_VALUE_SIZE: usize = 1_048_576;
    }

    pub mod registry {
        /// Maximum number of registered token type definitions
        pub const MAX_TOKEN_TYPES: usize = 256;
        /// Maximum length of a token type name in bytes
        pub const MAX_NAME_LENGTH: usize = 255;
    }

    pub mod logging {
        /// In-memory log buffer capacity
        pub const LOG_BUFFER_SIZE: usize = 1000;
        /// Maximum log message length before truncation
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 4096;
        /// Minimum log level enforced for security-relevant events
        pub const SECURITY_MIN_LOG_LEVEL: u8 = 1;
    }
}
