use std::{ops::Deref, path::PathBuf};

use directories::BaseDirs;

/// Directories from `$PATH`, in lookup order.
#[derive(Debug, Clone)]
pub struct PathEnv {
    pub paths: Vec<PathBuf>,
}

impl PathEnv {
    pub fn new() -> Self {
        Self { paths: Vec::new() }
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl Default for PathEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for PathEnv {
    type Target = Vec<PathBuf>;

    fn deref(&self) -> &Self::Target {
        &self.paths
    }
}

pub fn get_path_env() -> PathEnv {
    match std::env::var_os("PATH") {
        None => PathEnv::new(),
        Some(paths) => {
            let paths: Vec<_> = std::env::split_paths(&paths).collect();
            PathEnv::from_paths(paths)
        }
    }
}

pub fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// `$USER`, as shown in the prompt.
pub fn user_name() -> String {
    std::env::var("USER").unwrap_or_else(|_| String::from("user"))
}
