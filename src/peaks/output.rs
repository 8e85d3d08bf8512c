use clap::ValueEnum;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// MACS2 output artifacts, one per output file extension
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum OutputKind {
    #[value(name = "peaks.xls")]
    PeaksXls,
    #[value(name = "peaks.narrowPeak")]
    NarrowPeak,
    #[value(name = "summits.bed")]
    Summits,
    #[value(name = "treat_pileup.bdg")]
    TreatPileup,
    #[value(name = "control_lambda.bdg")]
    ControlLambda,
    #[value(name = "peaks.broadPeak")]
    BroadPeak,
    #[value(name = "peaks.gappedPeak")]
    GappedPeak,
    #[value(name = "ppois.bdg")]
    Ppois,
}

impl OutputKind {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputKind::PeaksXls => "peaks.xls",
            OutputKind::NarrowPeak => "peaks.narrowPeak",
            OutputKind::Summits => "summits.bed",
            OutputKind::TreatPileup => "treat_pileup.bdg",
            OutputKind::ControlLambda => "control_lambda.bdg",
            OutputKind::BroadPeak => "peaks.broadPeak",
            OutputKind::GappedPeak => "peaks.gappedPeak",
            OutputKind::Ppois => "ppois.bdg",
        }
    }

    /// outputs of a `macs2 callpeak -B` run, in the order they are
    /// collected
    pub fn expected(has_control: bool, broad: bool) -> Vec<OutputKind> {
        let mut ret = vec![
            OutputKind::PeaksXls,
            OutputKind::NarrowPeak,
            OutputKind::Summits,
            OutputKind::TreatPileup,
        ];
        if has_control {
            ret.push(OutputKind::ControlLambda);
        }
        if broad {
            ret.push(OutputKind::BroadPeak);
            ret.push(OutputKind::GappedPeak);
        }
        ret
    }

    /// peak lists that are subject to blacklist filtering
    pub fn is_peak_list(&self) -> bool {
        matches!(
            self,
            OutputKind::NarrowPeak | OutputKind::BroadPeak | OutputKind::GappedPeak
        )
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// `<prefix>_<extension>`
pub fn output_path(prefix: &Path, kind: OutputKind) -> PathBuf {
    let mut name: OsString = prefix.as_os_str().to_owned();
    name.push("_");
    name.push(kind.extension());
    PathBuf::from(name)
}
