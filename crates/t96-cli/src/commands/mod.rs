pub mod inspect;
pub mod play;
pub mod run;

use std::path::Path;

use t96_core::EngineConfig;

/// Build the engine configuration from an optional JSON file plus flags.
/// Flags override the file.
pub fn load_config(path: Option<&Path>, seed: Option<u32>, skip_tutorial: bool, instant: bool) -> Result<EngineConfig, String> {
    let mut config = match path {
        Some(path) => EngineConfig::from_json_file(path).map_err(|e| format!("{}: {e}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if skip_tutorial {
        config = config.with_skip_tutorial(true);
    }
    if instant {
        config = config.with_instant_output(true);
    }
    Ok(config)
}
