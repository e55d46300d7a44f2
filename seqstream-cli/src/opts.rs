use std::fmt::Display;
use std::fs::File;
use std::io;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::info;

pub fn input_stream(path: &str) -> Result<InputStream, String> {
    let input_path = Path::new(path);
    let result = InputStream {
        path: input_path.to_path_buf(),
    };

    Ok(result)
}

#[derive(Debug, Clone)]
pub struct InputStream {
    path: PathBuf,
}

impl Display for InputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl Default for InputStream {
    fn default() -> Self {
        Self {
            path: PathBuf::from("-"),
        }
    }
}

impl InputStream {
    pub fn as_reader(&self) -> anyhow::Result<InputReader> {
        InputReader::from_path(&self.path)
    }
}

fn is_standard_stream(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

#[derive(Debug)]
pub enum InputReader {
    Stdin(io::Stdin),
    File(File),
}

impl InputReader {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        let val = if is_standard_stream(path) {
            Self::Stdin(io::stdin())
        } else {
            info!("Input file: {}", path.display());
            Self::File(File::open(path)?)
        };
        Ok(val)
    }

    /// Input size in bytes, if known upfront.
    pub fn length(&self) -> anyhow::Result<Option<u64>> {
        let val = match self {
            InputReader::Stdin(_) => None,
            InputReader::File(file) => Some(file.metadata()?.len()),
        };
        Ok(val)
    }

    #[must_use]
    pub fn into_read(self) -> Box<dyn Read + Send> {
        match self {
            InputReader::Stdin(stdin) => Box::new(stdin),
            InputReader::File(file) => Box::new(file),
        }
    }
}

#[derive(Debug)]
pub enum OutputWriter {
    Stdout(io::Stdout),
    File(File),
}

impl OutputWriter {
    /// Opens the output; no path or `-` is the standard output.
    pub fn from_option(output: &Option<PathBuf>) -> anyhow::Result<Self> {
        match output {
            Some(path) if !is_standard_stream(path) => {
                info!("Output file: {}", path.display());
                Ok(Self::File(File::create(path)?))
            }
            _ => Ok(Self::Stdout(io::stdout())),
        }
    }

    pub fn into_write(self) -> Box<dyn Write + Send> {
        match self {
            OutputWriter::Stdout(stdout) => Box::new(stdout),
            OutputWriter::File(file) => Box::new(file),
        }
    }
}
