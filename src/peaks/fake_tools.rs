//! Shell stand-ins for `macs2` and `bedtools`, installed once per test
//! binary

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;

pub struct FakeTools {
    pub macs2: PathBuf,
    pub failing_macs2: PathBuf,
    pub bedtools: PathBuf,
    _dir: TempDir,
}

const MACS2: &str = r#"#!/bin/sh
cmd="$1"
shift
echo "macs2 $cmd $*" >&2
case "$cmd" in
callpeak)
    name=NA
    outdir=.
    broad=0
    treatment=""
    while [ $# -gt 0 ]; do
        case "$1" in
        --name) name="$2"; shift ;;
        --outdir) outdir="$2"; shift ;;
        --treatment) treatment="$2"; shift ;;
        --broad) broad=1 ;;
        esac
        shift
    done
    [ -s "$treatment" ] || exit 2
    out="$outdir/$name"
    printf '# fake macs2 callpeak\n' > "${out}_peaks.xls"
    printf 'chr1\t100\t300\t%s_peak_1\t50\t.\t4.1\t6.2\t3.3\t99\n' "$name" > "${out}_peaks.narrowPeak"
    printf 'chr2\t500\t900\t%s_peak_2\t40\t.\t3.1\t5.2\t2.3\t150\n' "$name" >> "${out}_peaks.narrowPeak"
    printf 'chr1\t199\t200\t%s_peak_1\t3.3\n' "$name" > "${out}_summits.bed"
    printf 'chr1\t0\t1000\t2.0\n' > "${out}_treat_pileup.bdg"
    printf 'chr1\t0\t1000\t1.0\n' > "${out}_control_lambda.bdg"
    if [ "$broad" = 1 ]; then
        rm -f "${out}_peaks.narrowPeak" "${out}_summits.bed"
        printf 'chr1\t100\t300\t%s_peak_1\t50\t.\t4.1\t6.2\t3.3\n' "$name" > "${out}_peaks.broadPeak"
        printf 'chr2\t500\t900\t%s_peak_2\t40\t.\t3.1\t5.2\t2.3\n' "$name" >> "${out}_peaks.broadPeak"
        printf 'chr1\t100\t300\t%s_peak_1\t50\t.\t1\t200\t0\t100\t300\t4.1\t6.2\t3.3\n' "$name" > "${out}_peaks.gappedPeak"
    fi
    ;;
bdgcmp)
    prefix=""
    t=""
    c=""
    while [ $# -gt 0 ]; do
        case "$1" in
        --o-prefix) prefix="$2"; shift ;;
        -t) t="$2"; shift ;;
        -c) c="$2"; shift ;;
        esac
        shift
    done
    [ -s "$t" ] && [ -s "$c" ] || exit 2
    printf 'chr1\t0\t1000\t0.69\n' > "${prefix}_ppois.bdg"
    ;;
*)
    exit 1
    ;;
esac
"#;

const FAILING_MACS2: &str = "#!/bin/sh\necho \"macs2: error\" >&2\nexit 1\n";

// drops every chr2 record, standing in for a chr2 blacklist
const BEDTOOLS: &str = r#"#!/bin/sh
echo "bedtools $*" >&2
[ "$1" = intersect ] || exit 1
grep -v '^chr2' || true
"#;

const DIR_PREFIX: &str = "chipseqpeaks-fake-tools.";
const STALE_AFTER: Duration = Duration::from_secs(3600);

/// each script is written under a scratch name and renamed into
/// place, so its final path is never open for writing
fn install(dir: &Path, name: &str, script: &str) -> PathBuf {
    let staged = dir.join(format!(".{}.partial", name));
    fs::write(&staged, script).expect("write fake tool");
    fs::set_permissions(&staged, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");

    let path = dir.join(name);
    fs::rename(&staged, &path).expect("install fake tool");
    path
}

/// statics are never dropped, so directories of earlier test runs
/// are removed here instead
fn remove_stale_dirs(parent: &Path) {
    let Ok(entries) = fs::read_dir(parent) else {
        return;
    };
    for entry in entries.flatten() {
        let is_ours = entry
            .file_name()
            .to_str()
            .map_or(false, |x| x.starts_with(DIR_PREFIX));
        let is_stale = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.elapsed().ok())
            .map_or(false, |age| age > STALE_AFTER);
        if is_ours && is_stale {
            let _ = fs::remove_dir_all(entry.path());
        }
    }
}

pub fn fake_tools() -> &'static FakeTools {
    static TOOLS: OnceLock<FakeTools> = OnceLock::new();
    TOOLS.get_or_init(|| {
        remove_stale_dirs(&std::env::temp_dir());

        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir()
            .expect("create fake tool directory");
        FakeTools {
            macs2: install(dir.path(), "macs2", MACS2),
            failing_macs2: install(dir.path(), "macs2-failing", FAILING_MACS2),
            bedtools: install(dir.path(), "bedtools", BEDTOOLS),
            _dir: dir,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn tools_are_installed_complete_and_executable() {
        let tools = fake_tools();
        let dir = tools.macs2.parent().unwrap();

        let dir_name = dir.file_name().unwrap().to_str().unwrap();
        assert!(dir_name.starts_with(DIR_PREFIX));

        for exe in [&tools.macs2, &tools.failing_macs2, &tools.bedtools] {
            let mode = fs::metadata(exe).unwrap().permissions().mode();
            assert_eq!(mode & 0o755, 0o755);
        }

        let partial = fs::read_dir(dir)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
            .count();
        assert_eq!(partial, 0);
    }

    #[test]
    fn only_stale_tool_dirs_are_removed() {
        let parent = tempfile::tempdir().unwrap();
        let fresh = parent.path().join(format!("{}fresh", DIR_PREFIX));
        let stale = parent.path().join(format!("{}stale", DIR_PREFIX));
        let unrelated = parent.path().join("unrelated-stale");
        for dir in [&fresh, &stale, &unrelated] {
            fs::create_dir(dir).unwrap();
        }

        let old = SystemTime::now() - 2 * STALE_AFTER;
        for dir in [&stale, &unrelated] {
            fs::File::open(dir).unwrap().set_modified(old).unwrap();
        }

        remove_stale_dirs(parent.path());

        assert!(fresh.is_dir());
        assert!(!stale.exists());
        assert!(unrelated.is_dir());
    }
}
