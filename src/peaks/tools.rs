use crate::error::PeaksError;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const MACS2: &str = "macs2";
pub const BEDTOOLS: &str = "bedtools";
pub const MACS2_PATH_VAR: &str = "MACS2_PATH";
pub const BEDTOOLS_PATH_VAR: &str = "BEDTOOLS_PATH";

/// Locations of the external executables, resolved once
///
#[derive(Debug, Clone)]
pub struct Tools {
    pub macs2: PathBuf,
    pub bedtools: Option<PathBuf>,
}

impl Tools {
    /// Resolve from explicit paths, then the environment overrides,
    /// then `PATH`
    pub fn resolve(macs2: Option<&Path>, bedtools: Option<&Path>) -> anyhow::Result<Self> {
        let search_path = env::var_os("PATH");
        Self::resolve_with(
            macs2,
            bedtools,
            env::var_os(MACS2_PATH_VAR),
            env::var_os(BEDTOOLS_PATH_VAR),
            search_path.as_deref(),
        )
    }

    /// `resolve` with the environment passed in
    pub fn resolve_with(
        macs2: Option<&Path>,
        bedtools: Option<&Path>,
        macs2_env: Option<OsString>,
        bedtools_env: Option<OsString>,
        search_path: Option<&OsStr>,
    ) -> anyhow::Result<Self> {
        let macs2 = resolve_executable(macs2, macs2_env, MACS2, search_path)
            .ok_or(PeaksError::MissingMacs2)?;
        let bedtools = resolve_executable(bedtools, bedtools_env, BEDTOOLS, search_path);

        log::debug!("macs2: {:?}, bedtools: {:?}", macs2, bedtools);
        Ok(Self { macs2, bedtools })
    }

    pub fn bedtools(&self) -> anyhow::Result<&Path> {
        match &self.bedtools {
            Some(path) => Ok(path.as_path()),
            None => Err(PeaksError::MissingBedtools.into()),
        }
    }
}

///
/// An explicit path wins, then a non-empty environment override,
/// then the first executable file called `name` on the search path.
///
pub fn resolve_executable(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    name: &str,
    search_path: Option<&OsStr>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(value));
    }

    let search_path = search_path?;
    env::split_paths(search_path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
