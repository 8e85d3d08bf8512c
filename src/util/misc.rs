use std::path::Path;

/// Sample name from a file name: everything up to the first `.`
pub fn sample_name_from_path(path: &Path) -> Option<Box<str>> {
    let file_name = path.file_name()?.to_str()?;
    match file_name.split('.').next() {
        Some(name) if !name.is_empty() => Some(name.into()),
        _ => None,
    }
}

/// number of non-empty lines in a text buffer
pub fn count_lines(bytes: &[u8]) -> usize {
    bytes
        .split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .count()
}
