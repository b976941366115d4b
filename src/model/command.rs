//! External generator program adapter.
//!
//! The model itself lives outside this process.  [`CommandModelLoader`]
//! locates a generator program and asks it to verify the checkpoint once;
//! [`CommandModel`] then runs it per clip:
//!
//! ```text
//! <program> [args…] --model <id> --check
//! <program> [args…] --model <id> --duration <secs> --prompt <text>
//!     stdout: little-endian f32 mono samples at 32 kHz
//! ```
//!
//! A non-zero exit status is a failure; the trimmed stderr becomes the error
//! message.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::audio::RawAudio;
use crate::config::ModelConfig;

use super::engine::{GenerationParams, ModelError, ModelLoader, MusicModel, MUSICGEN_SAMPLE_RATE};

// ---------------------------------------------------------------------------
// CommandModelLoader
// ---------------------------------------------------------------------------

/// Loads models by probing an external generator program.
#[derive(Debug, Clone)]
pub struct CommandModelLoader {
    program: String,
    args: Vec<String>,
}

impl CommandModelLoader {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.program.clone(), config.program_args.clone())
    }

    /// Resolve the program to an existing file, searching `PATH` for bare
    /// names.
    fn resolve(&self) -> Result<PathBuf, ModelError> {
        let candidate = Path::new(&self.program);
        if candidate.components().count() > 1 || candidate.is_absolute() {
            return if candidate.is_file() {
                Ok(candidate.to_path_buf())
            } else {
                Err(ModelError::NotFound(self.program.clone()))
            };
        }

        std::env::var_os("PATH")
            .iter()
            .flat_map(std::env::split_paths)
            .flat_map(|dir| executable_names(&self.program).map(move |name| dir.join(name)))
            .find(|path| path.is_file())
            .ok_or_else(|| ModelError::NotFound(format!("'{}' is not on PATH", self.program)))
    }
}

impl ModelLoader for CommandModelLoader {
    fn load(&self, identifier: &str) -> Result<Box<dyn MusicModel>, ModelError> {
        let program = self.resolve()?;
        log::info!("model: probing '{identifier}' with {}", program.display());

        let output = Command::new(&program)
            .args(&self.args)
            .args(["--model", identifier, "--check"])
            .output()
            .map_err(|e| ModelError::Load(format!("{}: {e}", program.display())))?;
        check_status(&output).map_err(ModelError::Load)?;

        Ok(Box::new(CommandModel {
            program,
            args: self.args.clone(),
            identifier: identifier.to_string(),
            params: GenerationParams::default(),
        }))
    }
}

/// Candidate file names for a bare program name on this platform.
fn executable_names(program: &str) -> impl Iterator<Item = String> + '_ {
    let exe = if cfg!(windows) && Path::new(program).extension().is_none() {
        Some(format!("{program}.exe"))
    } else {
        None
    };
    std::iter::once(program.to_string()).chain(exe)
}

// ---------------------------------------------------------------------------
// CommandModel
// ---------------------------------------------------------------------------

/// A model driven through the generator program.
#[derive(Debug)]
pub struct CommandModel {
    program: PathBuf,
    args: Vec<String>,
    identifier: String,
    params: GenerationParams,
}

impl MusicModel for CommandModel {
    fn configure(&mut self, params: GenerationParams) {
        self.params = params;
    }

    fn generate(&mut self, prompt: &str) -> Result<RawAudio, ModelError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--model")
            .arg(&self.identifier)
            .arg("--duration")
            .arg(self.params.duration_secs.to_string())
            .args(["--prompt", prompt])
            .output()
            .map_err(|e| ModelError::Generation(format!("{}: {e}", self.program.display())))?;
        check_status(&output).map_err(ModelError::Generation)?;

        decode_f32le(&output.stdout).map(RawAudio::Mono)
    }

    fn sample_rate(&self) -> u32 {
        MUSICGEN_SAMPLE_RATE
    }
}

fn check_status(output: &Output) -> Result<(), String> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    Err(if stderr.is_empty() {
        format!("generator exited with {}", output.status)
    } else {
        stderr.to_string()
    })
}

/// Decode a raw little-endian `f32` stream.
pub(crate) fn decode_f32le(bytes: &[u8]) -> Result<Vec<f32>, ModelError> {
    if bytes.len() % 4 != 0 {
        return Err(ModelError::Generation(format!(
            "truncated sample stream ({} bytes)",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_endian_samples() {
        let mut bytes = Vec::new();
        for s in [0.0f32, 1.0, -0.5] {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        assert_eq!(decode_f32le(&bytes).unwrap(), vec![0.0, 1.0, -0.5]);
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let err = decode_f32le(&[0, 0, 128]).unwrap_err();
        assert!(matches!(err, ModelError::Generation(_)));
    }

    #[test]
    fn missing_absolute_program_is_not_found() {
        let loader = CommandModelLoader::new("/nonexistent/musicgen-generate", vec![]);
        let err = loader.load("facebook/musicgen-small").err().unwrap();
        assert!(matches!(err, ModelError::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn missing_bare_program_is_not_found() {
        let loader = CommandModelLoader::new("definitely-not-a-real-generator-xyz", vec![]);
        assert!(matches!(
            loader.load("facebook/musicgen-small").err().unwrap(),
            ModelError::NotFound(_)
        ));
    }

    /// Drives a shell script through `sh` so the test never executes a file
    /// it just wrote.
    #[cfg(unix)]
    mod script {
        use super::*;
        use tempfile::tempdir;

        const SCRIPT: &str = r#"
case "$3" in
  --check) exit 0 ;;
esac
if [ "$5" = "--prompt" ] && [ "$6" = "fail" ]; then
  echo "out of memory" >&2
  exit 3
fi
printf '\000\000\200\077\000\000\000\000'
"#;

        fn loader(dir: &Path) -> CommandModelLoader {
            let script = dir.join("generate.sh");
            std::fs::write(&script, SCRIPT).unwrap();
            CommandModelLoader::new("/bin/sh", vec![script.display().to_string()])
        }

        #[test]
        fn loads_and_generates_samples() {
            let dir = tempdir().unwrap();
            let mut model = loader(dir.path()).load("facebook/musicgen-small").unwrap();
            model.configure(GenerationParams { duration_secs: 5 });
            let audio = model.generate("calm piano").unwrap();
            assert_eq!(audio, RawAudio::Mono(vec![1.0, 0.0]));
            assert_eq!(model.sample_rate(), 32_000);
        }

        #[test]
        fn failing_generation_reports_stderr() {
            let dir = tempdir().unwrap();
            let mut model = loader(dir.path()).load("facebook/musicgen-small").unwrap();
            let err = model.generate("fail").unwrap_err();
            assert!(err.to_string().contains("out of memory"), "got {err}");
        }
    }
}
