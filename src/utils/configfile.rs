use std::fs::File;
use std::io;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;


#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("config io error @{path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("config format error @{path:?}: {source}")]
    Format { path: PathBuf, source: serde_json::Error },
}


/// Resolves `file` relative to the directory holding the running executable.
pub fn nearby(file: &str) -> io::Result<PathBuf> {
    let current_exe = std::env::current_exe()?;
    let dir = current_exe.parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory"))?;
    Ok(dir.join(file))
}

pub struct ConfigFile<C> {
    path: PathBuf,
    data: C,
}

impl<C: Serialize + DeserializeOwned + Default> ConfigFile<C> {

    /// Loads the file, writing a default one first when it does not exist.
    /// The flag is `true` when the default was just created.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<(Self, bool), ConfigFileError> {
        let path = path.as_ref().to_path_buf();
        let (data, created) = Self::load(path.as_path())?;
        Ok((Self { path, data }, created))
    }

    pub fn new_nearby(file: &str) -> Result<(Self, bool), ConfigFileError> {
        let path = nearby(file).map_err(|source| ConfigFileError::Io { path: PathBuf::from(file), source })?;
        Self::new(path)
    }

    fn load(file: &Path) -> Result<(C, bool), ConfigFileError> {
        let io_err = |source| ConfigFileError::Io { path: file.to_path_buf(), source };
        let format_err = |source| ConfigFileError::Format { path: file.to_path_buf(), source };
        match File::open(file) {
            Ok(ifile) => {
                let data = serde_json::from_reader(BufReader::new(ifile)).map_err(format_err)?;
                Ok((data, false))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if let Some(parent) = file.parent() {
                    std::fs::create_dir_all(parent).map_err(io_err)?;
                }
                let config = C::default();
                let ofile = File::create(file).map_err(io_err)?;
                serde_json::to_writer_pretty(ofile, &config).map_err(format_err)?;
                Ok((config, true))
            }
            Err(e) => Err(io_err(e)),
        }
    }
}

impl<C> ConfigFile<C> {

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn data(&self) -> &C {
        &self.data
    }
}
