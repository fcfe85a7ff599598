use std::fs;
use std::path::Path;

use reprand::{decode, encode, Random};
use shared::{AppError, AppResult};

/// Reads a generator saved by [`save_state`].
pub fn load_state(path: &Path) -> AppResult<Random> {
    let contents = fs::read_to_string(path)
        .map_err(|err| AppError::Message(format!("failed to read state file {path:?}: {err}")))?;
    decode(&contents)
}

pub fn save_state(path: &Path, rng: &Random) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| AppError::Message(format!("failed to create directory for {path:?}: {err}")))?;
    }
    fs::write(path, format!("{}\n", encode(rng)))
        .map_err(|err| AppError::Message(format!("failed to write state file {path:?}: {err}")))
}
