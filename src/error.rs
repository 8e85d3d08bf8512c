use crate::peaks::output::OutputKind;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// error kinds raised by the peak calling pipeline
#[derive(Debug, Error)]
pub enum PeaksError {
    #[error(
        "MACS2 was not found! Provide --macs2-path, set the MACS2_PATH \
         environment variable, or make sure `macs2` can be found via PATH"
    )]
    MissingMacs2,

    #[error(
        "bedtools was not found! Provide --bedtools-path, set the BEDTOOLS_PATH \
         environment variable, or make sure `bedtools` can be found via PATH"
    )]
    MissingBedtools,

    #[error("Bad input: {0}")]
    BadInput(String),

    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: ExitStatus },

    #[error("no {0} output in memory")]
    MissingOutput(OutputKind),

    #[error("expected output file {0:?} was not produced")]
    MissingOutputFile(PathBuf),
}
