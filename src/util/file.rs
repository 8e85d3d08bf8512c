use anyhow::{self, Context};

use rust_htslib::bgzf;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

///
/// Read every line of the input_file into memory
///
pub fn read_lines(input_file: &Path) -> anyhow::Result<Vec<Box<str>>> {
    let buf: Box<dyn BufRead> = match input_file.extension().and_then(|x| x.to_str()) {
        Some("gz") | Some("bgz") => {
            let _file = bgzf::Reader::from_path(input_file)
                .with_context(|| format!("failed to open {:?}", input_file))?;
            Box::new(BufReader::new(_file))
        }

        _ => {
            let _file =
                File::open(input_file).with_context(|| format!("failed to open {:?}", input_file))?;
            Box::new(BufReader::new(_file))
        }
    };

    let mut lines = vec![];
    for x in buf.lines() {
        lines.push(x?.into_boxed_str());
    }
    Ok(lines)
}

/// Read a file that an external tool was expected to produce
pub fn read_output_file(path: &Path) -> anyhow::Result<Option<Vec<u8>>> {
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {:?}", path))?;
    Ok(Some(bytes))
}

/// Remove `path` if it is a regular file; returns whether it was removed
pub fn remove_if_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    match std::fs::remove_file(path) {
        Ok(_) => true,
        Err(e) => {
            log::warn!("failed to remove {:?}: {}", path, e);
            false
        }
    }
}
