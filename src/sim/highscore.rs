/// High-score persistence: a single integer in a text file.
///
/// Best effort in both directions:
///   - missing or unparsable file loads as 0
///   - write failures are logged and swallowed
///
/// The file is read once at startup and written once at game over.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "snake-portal";

#[derive(Clone, Debug)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScoreStore { path: path.into() }
    }

    /// Resolve a configured file name. Absolute paths are used as-is;
    /// relative ones land in the first writable data directory.
    pub fn resolve(configured: &Path) -> Self {
        if configured.is_absolute() {
            Self::new(configured)
        } else {
            Self::new(save_dir().join(configured))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> u32 {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn save(&self, value: u32) {
        if let Err(e) = std::fs::write(&self.path, value.to_string()) {
            tracing::warn!("could not save high score to {}: {e}", self.path.display());
        }
    }

    /// Game-over persistence: store the better of the session score and the
    /// running high score. Returns the value written.
    pub fn record(&self, score: u32, high_score: u32) -> u32 {
        let best = score.max(high_score);
        self.save(best);
        best
    }
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn save_dir() -> PathBuf {
    // 1. Exe directory (local/portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs like /usr/games/ won't be writable
            let test_path = parent.join(".write_test_snake_portal");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
