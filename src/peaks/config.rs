use std::ffi::OsString;
use std::path::Path;

pub const DEFAULT_QVALUE: f64 = 0.05;
pub const DEFAULT_BROAD_CUTOFF: f64 = 0.1;
pub const DEFAULT_EXTSIZE: u32 = 200;
pub const ATAC_SEQ_SHIFT: i64 = -100;
pub const BDGCMP_PSEUDOCOUNT: &str = "0.00001";

/// Options translated into `macs2 callpeak` flags
///
#[derive(Debug, Clone, PartialEq)]
pub struct PeakCallConfig {
    /// `--qvalue` cutoff
    pub qvalue: f64,
    /// `--shift`
    pub shift: i64,
    /// `--nomodel`
    pub nomodel: bool,
    /// `--broad`
    pub broad: bool,
    /// `--broad-cutoff`, only used with `broad`
    pub broad_cutoff: f64,
    /// `--nolambda`
    pub nolambda: bool,
    /// `--call-summits`
    pub call_summits: bool,
    /// `--extsize`
    pub extsize: u32,
}

impl Default for PeakCallConfig {
    fn default() -> Self {
        Self {
            qvalue: DEFAULT_QVALUE,
            shift: 0,
            nomodel: false,
            broad: false,
            broad_cutoff: DEFAULT_BROAD_CUTOFF,
            nolambda: false,
            call_summits: false,
            extsize: DEFAULT_EXTSIZE,
        }
    }
}

impl PeakCallConfig {
    /// ATAC-seq defaults: `--nomodel`, and `--shift -100` unless a
    /// shift was already chosen
    pub fn with_atac_seq(mut self) -> Self {
        self.nomodel = true;
        if self.shift == 0 {
            self.shift = ATAC_SEQ_SHIFT;
        }
        self
    }

    pub fn callpeak_args(
        &self,
        treatment: &Path,
        control: Option<&Path>,
        outdir: &Path,
        name: &str,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "callpeak".into(),
            "-B".into(),
            "--extsize".into(),
            self.extsize.to_string().into(),
            "--keep-dup".into(),
            "all".into(),
            "--treatment".into(),
            treatment.into(),
            "--outdir".into(),
            outdir.into(),
            "--name".into(),
            name.into(),
            "--qvalue".into(),
            self.qvalue.to_string().into(),
            "--shift".into(),
            self.shift.to_string().into(),
        ];

        if let Some(control) = control {
            args.push("--control".into());
            args.push(control.into());
        }
        if self.nomodel {
            args.push("--nomodel".into());
        }
        if self.broad {
            args.push("--broad".into());
            args.push("--broad-cutoff".into());
            args.push(self.broad_cutoff.to_string().into());
        }
        if self.nolambda {
            args.push("--nolambda".into());
        }
        if self.call_summits {
            args.push("--call-summits".into());
        }
        args
    }
}

/// `macs2 bdgcmp` flags for a Poisson p-value track
pub fn bdgcmp_args(treat_pileup: &Path, control_lambda: &Path, prefix: &Path) -> Vec<OsString> {
    vec![
        "bdgcmp".into(),
        "-t".into(),
        treat_pileup.into(),
        "-c".into(),
        control_lambda.into(),
        "-m".into(),
        "ppois".into(),
        "--o-prefix".into(),
        prefix.into(),
        "-p".into(),
        BDGCMP_PSEUDOCOUNT.into(),
    ]
}
