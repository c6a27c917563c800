// build.rs - TOML-driven compile-time constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    registry: RegistryLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_source_size: usize,
    max_token_count: usize,
    max_token_value_size: usize,
}

#[derive(serde::Deserialize)]
struct RegistryLimits {
    max_token_types: usize,
    max_name_length: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=DESCENT_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=DESCENT_CONFIG_DIR");

    let profile = env::var("DESCENT_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("DESCENT_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let config_path = Path::new(&manifest_dir)
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nLooking for: {}/{}.toml",
            config_path.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_security_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_security_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_SOURCE_SIZE: usize = 1_000_000_000;
    const ABSOLUTE_MAX_TOKEN_COUNT: usize = 100_000_000;

    if config.lexical.max_source_size > ABSOLUTE_MAX_SOURCE_SIZE {
        panic!("SECURITY: max_source_size exceeds absolute maximum");
    }

    if config.lexical.max_token_count > ABSOLUTE_MAX_TOKEN_COUNT {
        panic!("SECURITY: max_token_count exceeds absolute maximum");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.lexical.max_source_size > 50_000_000 {
        panic!("PRODUCTION: max_source_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_SOURCE_SIZE: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const MAX_TOKEN_VALUE_SIZE: usize = {};
    }}

    pub mod registry {{
        pub const MAX_TOKEN_TYPES: usize = {};
        pub const MAX_NAME_LENGTH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.lexical.max_source_size,
        config.lexical.max_token_count,
        config.lexical.max_token_value_size,
        config.registry.max_token_types,
        config.registry.max_name_length,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
