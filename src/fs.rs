use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes `contents` to `output`, creating parent directories, or to stdout
/// when no output file is given.
pub fn write_output(output: Option<&Path>, contents: &str) -> std::io::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)?;
            info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            if !contents.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
