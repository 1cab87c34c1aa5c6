//! Configuration loading and management

use std::path::PathBuf;

use anyhow::Result;

/// Voice shaping parameters handed to the synthesis capability
#[derive(Debug, Clone, Copy)]
pub struct VoiceTuning {
    /// Pitch multiplier (race-engineer register sits slightly low)
    pub pitch: f32,
    /// Speaking rate multiplier
    pub rate: f32,
}

impl Default for VoiceTuning {
    fn default() -> Self {
        Self {
            pitch: 0.85,
            rate: 1.05,
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Voice parameters for the speech output capability
    pub voice: VoiceTuning,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("pitwall");

        let socket_path = data_dir.join("daemon.sock");

        Ok(Self {
            socket_path,
            data_dir,
            voice: VoiceTuning::default(),
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
