pub mod config;
pub mod input;
pub mod output;
pub mod tools;

#[cfg(all(test, unix))]
pub(crate) mod fake_tools;

use crate::error::PeaksError;
use crate::util::file::{read_lines, read_output_file, remove_if_file};
use crate::util::misc::count_lines;
use crate::util::process::{pipe_command, run_command};

use anyhow::{self, Context};
use config::{bdgcmp_args, PeakCallConfig};
use input::{parse_input, SignalInput};
use output::{output_path, OutputKind};
use tools::Tools;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub const DEFAULT_SAMPLE_NAME: &str = "sample";

const SCRATCH_PREFIX: &str = "chipseqpeaks.";
const TREATMENT_BAM: &str = "treatment.bam";
const CONTROL_BAM: &str = "control.bam";
const MACS2_OUTDIR: &str = "macs2";

/// scratch directory, removed when dropped
fn scratch_dir(temp_dir: Option<&Path>) -> std::io::Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(SCRATCH_PREFIX);
    match temp_dir {
        Some(dir) => builder.tempdir_in(dir),
        None => builder.tempdir(),
    }
}

/// Options for a peak calling run
///
pub struct ChipSeqPeaksBuilder {
    treatment: SignalInput,
    control: Option<SignalInput>,
    config: PeakCallConfig,
    macs2_path: Option<PathBuf>,
    bedtools_path: Option<PathBuf>,
    sample_name: Option<Box<str>>,
    temp_dir: Option<PathBuf>,
    log: Option<File>,
}

impl ChipSeqPeaksBuilder {
    pub fn control(mut self, control: impl Into<SignalInput>) -> Self {
        self.control = Some(control.into());
        self
    }

    pub fn config(mut self, config: PeakCallConfig) -> Self {
        self.config = config;
        self
    }

    pub fn macs2_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.macs2_path = Some(path.into());
        self
    }

    pub fn bedtools_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bedtools_path = Some(path.into());
        self
    }

    pub fn sample_name(mut self, name: &str) -> Self {
        self.sample_name = Some(name.into());
        self
    }

    /// directory under which scratch files are created
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// file receiving the diagnostics of the external tools
    pub fn log(mut self, log: File) -> Self {
        self.log = Some(log);
        self
    }

    ///
    /// Resolve the tools, load the inputs and run `macs2 callpeak`.
    ///
    pub fn call(self) -> anyhow::Result<ChipSeqPeaks> {
        let tools = Tools::resolve(self.macs2_path.as_deref(), self.bedtools_path.as_deref())?;

        let sample_name = self
            .sample_name
            .or_else(|| self.treatment.sample_name())
            .unwrap_or_else(|| DEFAULT_SAMPLE_NAME.into());

        let treatment = parse_input(self.treatment).context("treatment input")?;
        let control = match self.control {
            Some(x) => Some(parse_input(x).context("control input")?),
            None => None,
        };

        let output_kinds = OutputKind::expected(control.is_some(), self.config.broad);

        let mut peaks = ChipSeqPeaks {
            treatment,
            control,
            sample_name,
            config: self.config,
            tools,
            temp_dir: self.temp_dir,
            log: self.log,
            output_kinds,
            outputs: BTreeMap::new(),
            written: vec![],
        };
        peaks.call_peaks()?;
        Ok(peaks)
    }

    /// Same as `call`, but files written through the returned handle
    /// are removed when it is dropped
    pub fn call_managed(self) -> anyhow::Result<ManagedPeaks> {
        Ok(ManagedPeaks {
            peaks: Some(self.call()?),
        })
    }
}

///
/// ChIP-seq peaks: MACS2 output kept in memory, one buffer per
/// output file extension.
///
pub struct ChipSeqPeaks {
    treatment: Vec<u8>,
    control: Option<Vec<u8>>,
    sample_name: Box<str>,
    config: PeakCallConfig,
    tools: Tools,
    temp_dir: Option<PathBuf>,
    log: Option<File>,
    output_kinds: Vec<OutputKind>,
    outputs: BTreeMap<OutputKind, Vec<u8>>,
    written: Vec<PathBuf>,
}

impl ChipSeqPeaks {
    pub fn builder(treatment: impl Into<SignalInput>) -> ChipSeqPeaksBuilder {
        ChipSeqPeaksBuilder {
            treatment: treatment.into(),
            control: None,
            config: PeakCallConfig::default(),
            macs2_path: None,
            bedtools_path: None,
            sample_name: None,
            temp_dir: None,
            log: None,
        }
    }

    fn call_peaks(&mut self) -> anyhow::Result<()> {
        let scratch = scratch_dir(self.temp_dir.as_deref())
            .context("failed to create a scratch directory")?;

        let treatment_bam = scratch.path().join(TREATMENT_BAM);
        fs::write(&treatment_bam, &self.treatment)?;

        let control_bam = match &self.control {
            Some(bytes) => {
                let path = scratch.path().join(CONTROL_BAM);
                fs::write(&path, bytes)?;
                Some(path)
            }
            None => None,
        };

        let outdir = scratch.path().join(MACS2_OUTDIR);
        fs::create_dir(&outdir)?;

        let args = self.config.callpeak_args(
            &treatment_bam,
            control_bam.as_deref(),
            &outdir,
            &self.sample_name,
        );
        run_command(
            Command::new(&self.tools.macs2).args(args),
            self.log.as_ref(),
        )?;

        let prefix = outdir.join(&*self.sample_name);
        for kind in self.output_kinds.clone() {
            let path = output_path(&prefix, kind);
            match read_output_file(&path)? {
                Some(bytes) => {
                    log::debug!("{}: {} bytes", kind, bytes.len());
                    self.outputs.insert(kind, bytes);
                }
                // broad mode does not emit narrow peaks or summits
                None if self.config.broad
                    && matches!(kind, OutputKind::NarrowPeak | OutputKind::Summits) =>
                {
                    log::warn!("MACS2 produced no {} in broad mode", kind);
                    self.outputs.insert(kind, vec![]);
                }
                None => return Err(PeaksError::MissingOutputFile(path).into()),
            }
        }

        if let Some(peaks) = self.outputs.get(&OutputKind::NarrowPeak) {
            log::info!("{}: {} narrow peaks", self.sample_name, count_lines(peaks));
        }
        Ok(())
    }

    ///
    /// Compare the treatment pileup with the control lambda and keep
    /// the Poisson p-value track (`ppois.bdg`).
    ///
    pub fn bdgcmp(&mut self) -> anyhow::Result<()> {
        let treat_pileup = self
            .outputs
            .get(&OutputKind::TreatPileup)
            .ok_or(PeaksError::MissingOutput(OutputKind::TreatPileup))?;
        let control_lambda = self
            .outputs
            .get(&OutputKind::ControlLambda)
            .ok_or(PeaksError::MissingOutput(OutputKind::ControlLambda))?;

        let scratch = scratch_dir(self.temp_dir.as_deref())
            .context("failed to create a scratch directory")?;

        let treat_bdg = scratch.path().join(OutputKind::TreatPileup.extension());
        let lambda_bdg = scratch.path().join(OutputKind::ControlLambda.extension());
        fs::write(&treat_bdg, treat_pileup)?;
        fs::write(&lambda_bdg, control_lambda)?;

        let prefix = scratch.path().join(&*self.sample_name);
        run_command(
            Command::new(&self.tools.macs2).args(bdgcmp_args(&treat_bdg, &lambda_bdg, &prefix)),
            self.log.as_ref(),
        )?;

        let path = output_path(&prefix, OutputKind::Ppois);
        let ppois = read_output_file(&path)?.ok_or(PeaksError::MissingOutputFile(path))?;
        self.outputs.insert(OutputKind::Ppois, ppois);

        if !self.output_kinds.contains(&OutputKind::Ppois) {
            self.output_kinds.push(OutputKind::Ppois);
        }
        Ok(())
    }

    ///
    /// Drop peaks overlapping the blacklist with `bedtools intersect
    /// -v`. The filtered peaks replace the stored buffers.
    ///
    /// * `blacklist` - BED file of blacklisted regions (may be gzipped)
    ///
    pub fn remove_blacklisted_peaks(&mut self, blacklist: &Path) -> anyhow::Result<()> {
        let bedtools = self.tools.bedtools()?.to_path_buf();

        let intervals = read_lines(blacklist)?
            .iter()
            .filter(|x| !x.is_empty() && !x.starts_with('#') && !x.starts_with("track"))
            .count();
        log::info!("{} blacklisted regions in {:?}", intervals, blacklist);

        let kinds: Vec<OutputKind> = self
            .output_kinds
            .iter()
            .copied()
            .filter(|k| k.is_peak_list())
            .collect();

        for kind in kinds {
            let peaks = match self.outputs.get(&kind) {
                Some(x) if !x.is_empty() => x.clone(),
                _ => continue,
            };
            let before = count_lines(&peaks);

            let filtered = pipe_command(
                Command::new(&bedtools)
                    .args(["intersect", "-a", "stdin", "-b"])
                    .arg(blacklist)
                    .arg("-v"),
                peaks,
                self.log.as_ref(),
            )?;

            log::info!(
                "{}: kept {} of {} peaks",
                kind,
                count_lines(&filtered),
                before
            );
            self.outputs.insert(kind, filtered);
        }
        Ok(())
    }

    ///
    /// Write outputs to `<prefix>_<extension>`.
    ///
    /// * `prefix` - output path prefix
    /// * `kinds` - outputs to write; all known outputs if empty
    ///
    pub fn write(&mut self, prefix: &Path, kinds: &[OutputKind]) -> anyhow::Result<Vec<PathBuf>> {
        let kinds: Vec<OutputKind> = if kinds.is_empty() {
            self.output_kinds.clone()
        } else {
            kinds.to_vec()
        };

        if let Some(kind) = kinds.iter().find(|k| !self.outputs.contains_key(*k)) {
            return Err(PeaksError::MissingOutput(*kind).into());
        }

        let mut ret = vec![];
        for kind in kinds {
            let path = output_path(prefix, kind);
            fs::write(&path, &self.outputs[&kind])
                .with_context(|| format!("failed to write {:?}", path))?;
            log::info!("wrote {:?}", path);

            if !self.written.contains(&path) {
                self.written.push(path.clone());
            }
            ret.push(path);
        }
        Ok(ret)
    }

    /// Remove the files written so far; returns how many were removed
    pub fn clean_up(&mut self) -> usize {
        let mut nremoved = 0;
        for path in self.written.drain(..) {
            if remove_if_file(&path) {
                log::debug!("removed {:?}", path);
                nremoved += 1;
            }
        }
        nremoved
    }

    pub fn get(&self, kind: OutputKind) -> Option<&[u8]> {
        self.outputs.get(&kind).map(|x| x.as_slice())
    }

    pub fn outputs(&self) -> &BTreeMap<OutputKind, Vec<u8>> {
        &self.outputs
    }

    /// outputs known to this run, in collection order
    pub fn output_kinds(&self) -> &[OutputKind] {
        &self.output_kinds
    }

    /// effective calling parameters
    pub fn config(&self) -> &PeakCallConfig {
        &self.config
    }

    pub fn sample_name(&self) -> &str {
        &self.sample_name
    }

    pub fn has_control(&self) -> bool {
        self.control.is_some()
    }

    /// Swap the log file used by later steps
    pub fn set_log(&mut self, log: Option<File>) -> Option<File> {
        std::mem::replace(&mut self.log, log)
    }
}

impl std::fmt::Display for ChipSeqPeaks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ChipSeqPeaks(")?;
        writeln!(f, "    sample_name={},", self.sample_name)?;
        writeln!(f, "    control={},", self.control.is_some())?;
        writeln!(f, "    qvalue={},", self.config.qvalue)?;
        writeln!(f, "    shift={},", self.config.shift)?;
        writeln!(f, "    nomodel={},", self.config.nomodel)?;
        writeln!(f, "    broad={},", self.config.broad)?;
        writeln!(f, "    broad_cutoff={},", self.config.broad_cutoff)?;
        writeln!(f, "    nolambda={},", self.config.nolambda)?;
        writeln!(f, "    call_summits={},", self.config.call_summits)?;
        write!(f, ")")
    }
}

///
/// Handle returned by `call_managed`: every file written through it
/// is removed when the handle is dropped, unless `keep` releases the
/// peaks first.
///
pub struct ManagedPeaks {
    peaks: Option<ChipSeqPeaks>,
}

impl ManagedPeaks {
    /// Give up ownership without removing written files
    pub fn keep(mut self) -> ChipSeqPeaks {
        self.peaks
            .take()
            .expect("peaks are only taken by keep, which consumes the handle")
    }
}

impl Deref for ManagedPeaks {
    type Target = ChipSeqPeaks;

    fn deref(&self) -> &ChipSeqPeaks {
        self.peaks.as_ref().expect("peaks present until keep")
    }
}

impl DerefMut for ManagedPeaks {
    fn deref_mut(&mut self) -> &mut ChipSeqPeaks {
        self.peaks.as_mut().expect("peaks present until keep")
    }
}

impl Drop for ManagedPeaks {
    fn drop(&mut self) {
        if let Some(peaks) = self.peaks.as_mut() {
            let n = peaks.clean_up();
            log::debug!("cleaned up {} output files", n);
        }
    }
}
