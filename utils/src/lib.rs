#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::{
    ffi::OsString,
    fmt, fs,
    io::{self, BufRead, BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
    thread,
};

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use crossbeam_channel::unbounded;

const LEVEL_NAMES: [&str; 6] = ["error", "warn", "info", "debug", "trace", "none"];

/// LogLevel
///
/// Represents minimum level of messages that will be logged.
/// `none` switches logging off completely
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel {
    pub level: usize,
}

impl FromStr for LogLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        LEVEL_NAMES
            .iter()
            .position(|x| *x == s)
            .map(|level| LogLevel { level })
            .ok_or("no match")
    }
}

impl LogLevel {
    pub fn is_none(&self) -> bool {
        self.level > 4
    }
    pub fn get_level(&self) -> usize {
        if self.is_none() {
            0
        } else {
            self.level
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", LEVEL_NAMES.get(self.level).unwrap_or(&"unknown"))
    }
}

/// Add the logging options shared by all tools to a clap Command
pub fn add_log_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("timestamp")
            .short('X')
            .long("timestamp")
            .value_parser(value_parser!(stderrlog::Timestamp))
            .value_name("GRANULARITY")
            .default_value("none")
            .help("Prepend log entries with a timestamp"),
    )
    .arg(
        Arg::new("loglevel")
            .short('l')
            .long("loglevel")
            .value_name("LOGLEVEL")
            .value_parser(value_parser!(LogLevel))
            .ignore_case(true)
            .default_value("info")
            .help("Set log level"),
    )
    .arg(
        Arg::new("quiet")
            .action(ArgAction::SetTrue)
            .long("quiet")
            .conflicts_with("loglevel")
            .help("Silence all output"),
    )
}

/// Initialize logging from command line arguments
pub fn init_log(m: &ArgMatches) {
    let verbose = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .unwrap_or(LogLevel { level: 2 });
    let quiet = verbose.is_none() || m.get_flag("quiet");
    let ts = m
        .get_one::<stderrlog::Timestamp>("timestamp")
        .copied()
        .unwrap_or(stderrlog::Timestamp::Off);

    stderrlog::new()
        .quiet(quiet)
        .verbosity(verbose.get_level())
        .timestamp(ts)
        .init()
        .unwrap();
}

/// Read in next line and split on tabs after trimming white space
pub fn get_next_line<'a, R: BufRead>(
    rdr: &mut R,
    buf: &'a mut String,
) -> anyhow::Result<Option<Vec<&'a str>>> {
    buf.clear();
    if rdr.read_line(buf)? == 0 {
        Ok(None)
    } else {
        Ok(Some(buf.trim().split('\t').collect()))
    }
}

/// Median of a set of values.  For an even number of values this is the mean
/// of the two central values.  The slice is sorted in place.
pub fn median(v: &mut [f64]) -> Option<f64> {
    let l = v.len();
    if l == 0 {
        None
    } else {
        v.sort_unstable_by(|a, b| a.total_cmp(b));
        let m = l >> 1;
        Some(if l & 1 == 1 {
            v[m]
        } else {
            (v[m - 1] + v[m]) * 0.5
        })
    }
}

/// Write a single output row of the form `key<TAB>v1,v2,...,vn`
pub fn write_row<W, K, I>(wrt: &mut W, key: K, values: I) -> io::Result<()>
where
    W: Write + ?Sized,
    K: fmt::Display,
    I: IntoIterator,
    I::Item: fmt::Display,
{
    write!(wrt, "{}\t", key)?;
    let mut it = values.into_iter();
    if let Some(x) = it.next() {
        write!(wrt, "{}", x)?;
        for x in it {
            write!(wrt, ",{}", x)?;
        }
    }
    writeln!(wrt)
}

/// Temporary path used while an output file is being generated.
/// This is in the same directory as the final file so that the final rename
/// does not cross file systems.
pub fn tmp_path<P: AsRef<Path>>(p: P) -> PathBuf {
    let p = p.as_ref();
    let mut name = p
        .file_name()
        .map(|s| s.to_owned())
        .unwrap_or_else(OsString::new);
    name.push(".tmp");
    p.with_file_name(name)
}

/// Write an output file so that it only appears under its final name when
/// complete.  Data is written by `f` to a temporary file that is renamed on
/// success and removed on failure.
pub fn write_atomic<P, F>(path: P, f: F) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> anyhow::Result<()>,
{
    let path = path.as_ref();
    let tmp = tmp_path(path);
    trace!("Writing to temporary file {}", tmp.display());

    let res = (|| {
        let mut wrt = BufWriter::new(
            fs::File::create(&tmp)
                .with_context(|| format!("Problem creating output file {}", tmp.display()))?,
        );
        f(&mut wrt)?;
        wrt.flush()
            .with_context(|| format!("Error writing to {}", tmp.display()))?;
        drop(wrt);
        fs::rename(&tmp, path).with_context(|| {
            format!("Could not rename {} to {}", tmp.display(), path.display())
        })
    })();

    if res.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            warn!("Could not remove temporary file {}: {}", tmp.display(), e)
        }
    }
    res
}

/// Create directory (and parents) if it does not exist
pub fn make_dir<P: AsRef<Path>>(d: P) -> anyhow::Result<()> {
    let d = d.as_ref();
    if !d.exists() {
        fs::create_dir_all(d)
            .with_context(|| format!("Error creating output directory {}", d.display()))?;
    } else if !d.is_dir() {
        return Err(anyhow!("Output path {} is not a directory", d.display()));
    }
    Ok(())
}

/// Run `f` on every job using up to `nt` threads.
///
/// Results are returned in the same order as `jobs` irrespective of the order
/// in which they complete.  With one thread (or one job) everything runs on
/// the calling thread.
pub fn run_jobs<T, U, F>(jobs: &[T], nt: usize, f: F) -> Vec<anyhow::Result<U>>
where
    T: Sync,
    U: Send,
    F: Fn(usize, &T) -> anyhow::Result<U> + Sync,
{
    let nt = nt.min(jobs.len());
    if nt <= 1 {
        return jobs.iter().enumerate().map(|(i, j)| f(i, j)).collect();
    }

    let mut results: Vec<Option<anyhow::Result<U>>> = jobs.iter().map(|_| None).collect();
    // Everything runs within a scope so that we can pass references to the threads
    thread::scope(|sc| {
        trace!("Spawning {} worker threads for {} jobs", nt, jobs.len());
        let (snd, rcv) = unbounded();
        let (res_snd, res_rcv) = unbounded();
        let f = &f;
        let handles: Vec<_> = (0..nt)
            .map(|ix| {
                let r = rcv.clone();
                let s = res_snd.clone();
                sc.spawn(move || {
                    trace!("Starting up worker thread {}", ix + 1);
                    while let Ok((i, job)) = r.recv() {
                        if s.send((i, f(i, job))).is_err() {
                            break;
                        }
                    }
                    trace!("Closing down worker thread {}", ix + 1);
                })
            })
            .collect();
        drop(rcv);
        drop(res_snd);

        for job in jobs.iter().enumerate() {
            if snd.send(job).is_err() {
                error!("Error sending job to worker threads");
                break;
            }
        }
        drop(snd);

        for (i, r) in res_rcv.iter() {
            results[i] = Some(r)
        }
        for (ix, jh) in handles.into_iter().enumerate() {
            if jh.join().is_err() {
                error!("Error joining worker thread {}", ix + 1)
            }
        }
    });

    results
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.unwrap_or_else(|| Err(anyhow!("No result returned for job {}", i + 1))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::from_str("WARN").unwrap().level, 1);
        assert_eq!(LogLevel::from_str("trace").unwrap().get_level(), 4);
        let none = LogLevel::from_str("None").unwrap();
        assert!(none.is_none());
        assert_eq!(none.get_level(), 0);
        assert!(LogLevel::from_str("verbose").is_err());
        assert_eq!(format!("{}", LogLevel { level: 3 }), "debug");
        assert_eq!(format!("{}", LogLevel { level: 9 }), "unknown");
    }

    #[test]
    fn test_get_next_line() {
        let mut rdr: &[u8] = b"chr1\t10\t5\n\nchr2\t3\t1  \n";
        let mut buf = String::new();
        let f = get_next_line(&mut rdr, &mut buf).unwrap().unwrap();
        assert_eq!(f, vec!["chr1", "10", "5"]);
        let f = get_next_line(&mut rdr, &mut buf).unwrap().unwrap();
        assert_eq!(f, vec![""]);
        let f = get_next_line(&mut rdr, &mut buf).unwrap().unwrap();
        assert_eq!(f, vec!["chr2", "3", "1"]);
        assert!(get_next_line(&mut rdr, &mut buf).unwrap().is_none());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [0.3]), Some(0.3));
        assert_eq!(median(&mut [1.0, 0.2, 0.5]), Some(0.5));
        assert_eq!(median(&mut [1.0, 0.0, 0.5, 0.25]), Some(0.375));
    }

    #[test]
    fn test_write_row() {
        let mut v = Vec::new();
        write_row(&mut v, "T1", &[1.5, 0.0, 2.0]).unwrap();
        write_row(&mut v, 3, &[] as &[u32]).unwrap();
        assert_eq!(String::from_utf8(v).unwrap(), "T1\t1.5,0,2\n3\t\n");
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(
            tmp_path("out/s1.summary.txt"),
            PathBuf::from("out/s1.summary.txt.tmp")
        );
    }

    #[test]
    fn test_write_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.txt");
        write_atomic(&p, |w| {
            writeln!(w, "hello")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "hello\n");
        assert!(!tmp_path(&p).exists());
    }

    #[test]
    fn test_write_atomic_failure_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("b.txt");
        let res = write_atomic(&p, |w| {
            writeln!(w, "partial")?;
            Err(anyhow!("failed half way"))
        });
        assert!(res.is_err());
        assert!(!p.exists());
        assert!(!tmp_path(&p).exists());
    }

    #[test]
    fn test_run_jobs_keeps_order() {
        let jobs: Vec<usize> = (0..50).collect();
        for nt in [1, 4] {
            let res = run_jobs(&jobs, nt, |i, x| {
                if *x == 7 {
                    Err(anyhow!("job {} failed", i))
                } else {
                    Ok(x * 2)
                }
            });
            assert_eq!(res.len(), 50);
            for (i, r) in res.iter().enumerate() {
                match r {
                    Ok(y) => assert_eq!(*y, i * 2),
                    Err(_) => assert_eq!(i, 7),
                }
            }
        }
    }

    #[test]
    fn test_make_dir() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().join("x/y");
        make_dir(&d).unwrap();
        assert!(d.is_dir());
        make_dir(&d).unwrap();
        let f = dir.path().join("file");
        fs::write(&f, "").unwrap();
        assert!(make_dir(&f).is_err());
    }
}
