use crate::peaks::config::{PeakCallConfig, DEFAULT_EXTSIZE};
use crate::peaks::output::OutputKind;
use crate::peaks::ChipSeqPeaks;
use crate::util::misc::sample_name_from_path;

use anyhow::{self, Context};
use clap::Args;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const DEFAULT_BLACKLIST: &str = "/home/data/encode/ENCODE.hg19.blacklist.bed";

#[derive(Args, Debug)]
pub struct CallPeaksArgs {
    /// treatment BAM file
    #[arg(value_name = "TREATMENT_BAM")]
    pub treatment: Box<str>,

    /// output directory
    #[arg(long, default_value = ".")]
    pub output_dir: Box<str>,

    /// control/input BAM file
    #[arg(long)]
    pub control: Option<Box<str>>,

    /// sample name (default: treatment file name up to the first '.')
    #[arg(long)]
    pub name: Option<Box<str>>,

    /// configure MACS2 for ATAC-seq (--nomodel --shift -100)
    #[arg(long)]
    pub atac_seq: bool,

    /// MACS2 callpeak qvalue cutoff
    #[arg(long, default_value_t = 0.01)]
    pub qvalue: f64,

    /// broad peak option for MACS2 callpeak
    #[arg(long)]
    pub broad: bool,

    /// MACS2 callpeak qvalue cutoff for broad regions
    #[arg(long, alias = "broad_cutoff", default_value_t = 0.05)]
    pub broad_cutoff: f64,

    /// use MACS2 with the --nomodel option
    #[arg(long)]
    pub nomodel: bool,

    /// MACS2 shift (use -100 for ATAC-seq)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub shift: i64,

    /// MACS2 extension size
    #[arg(long, default_value_t = DEFAULT_EXTSIZE)]
    pub extsize: u32,

    /// use MACS2 with the --nolambda option
    #[arg(long)]
    pub nolambda: bool,

    /// use MACS2 with the --call-summits option
    #[arg(long)]
    pub call_summits: bool,

    /// remove blacklisted peaks after calling
    #[arg(long)]
    pub remove_blacklisted_peaks: bool,

    /// path to the ENCODE blacklist file
    #[arg(long, default_value = DEFAULT_BLACKLIST)]
    pub blacklist_file: Box<str>,

    /// MACS2 executable (default: $MACS2_PATH, then PATH)
    #[arg(long)]
    pub macs2_path: Option<Box<str>>,

    /// bedtools executable (default: $BEDTOOLS_PATH, then PATH)
    #[arg(long)]
    pub bedtools_path: Option<Box<str>>,

    /// directory for temporary files
    #[arg(long)]
    pub tmp_dir: Option<Box<str>>,

    /// outputs to write, comma separated (default: all)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub outputs: Vec<OutputKind>,
}

impl CallPeaksArgs {
    pub fn peak_call_config(&self) -> PeakCallConfig {
        let config = PeakCallConfig {
            qvalue: self.qvalue,
            shift: self.shift,
            nomodel: self.nomodel,
            broad: self.broad,
            broad_cutoff: self.broad_cutoff,
            nolambda: self.nolambda,
            call_summits: self.call_summits,
            extsize: self.extsize,
        };
        match self.atac_seq {
            true => config.with_atac_seq(),
            _ => config,
        }
    }

    pub fn sample_name(&self) -> anyhow::Result<Box<str>> {
        match &self.name {
            Some(name) => Ok(name.clone()),
            None => sample_name_from_path(Path::new(self.treatment.as_ref())).with_context(|| {
                format!("can't derive a sample name from {}; use --name", self.treatment)
            }),
        }
    }
}

fn create_log(output_dir: &Path, name: &str, step: &str) -> anyhow::Result<File> {
    let path = output_dir.join(format!("{}.{}.log", name, step));
    File::create(&path).with_context(|| format!("failed to create log file {:?}", path))
}

///
/// Call peaks, optionally drop blacklisted ones, compare against the
/// control lambda, and write everything under
/// `<output_dir>/<name>_<extension>`.
///
pub fn run(args: &CallPeaksArgs) -> anyhow::Result<Vec<PathBuf>> {
    let output_dir = Path::new(args.output_dir.as_ref());
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {:?}", output_dir))?;

    let name = args.sample_name()?;

    let mut builder = ChipSeqPeaks::builder(Path::new(args.treatment.as_ref()))
        .config(args.peak_call_config())
        .sample_name(&name)
        .log(create_log(output_dir, &name, "macs2_callpeaks")?);

    if let Some(control) = &args.control {
        builder = builder.control(Path::new(control.as_ref()));
    }
    if let Some(macs2) = &args.macs2_path {
        builder = builder.macs2_path(macs2.as_ref());
    }
    if let Some(bedtools) = &args.bedtools_path {
        builder = builder.bedtools_path(bedtools.as_ref());
    }
    if let Some(tmp_dir) = &args.tmp_dir {
        builder = builder.temp_dir(tmp_dir.as_ref());
    }

    log::info!("calling peaks for {}", name);
    let mut peaks = builder.call()?;
    log::debug!("{}", peaks);

    if args.remove_blacklisted_peaks {
        peaks
            .remove_blacklisted_peaks(Path::new(args.blacklist_file.as_ref()))
            .context("blacklist filtering")?;
    }

    if peaks.has_control() {
        peaks.set_log(Some(create_log(output_dir, &name, "bdgcmp")?));
        peaks.bdgcmp()?;
    } else {
        log::warn!("no control given; skipping bdgcmp");
    }

    for (kind, bytes) in peaks.outputs() {
        log::debug!("{}: {} bytes", kind, bytes.len());
    }

    let written = peaks.write(&output_dir.join(name.as_ref()), &args.outputs)?;
    log::info!("wrote {} files to {:?}", written.len(), output_dir);
    Ok(written)
}
