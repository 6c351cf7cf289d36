use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::net::{AddrParseError, IpAddr};

/// A source that can be either a file or stdin.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub enum FileOrStdin {
    /// Input from a file.
    File(Utf8PathBuf),
    /// Input from stdin.
    #[default]
    Stdin,
}

impl fmt::Display for FileOrStdin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOrStdin::File(path) => write!(f, "{}", path),
            FileOrStdin::Stdin => write!(f, "<stdin>"),
        }
    }
}

impl FileOrStdin {
    /// Create a new FileOrStdin from a path.
    ///
    /// If the path is "-", stdin is used.
    pub fn from_path(path: Utf8PathBuf) -> Self {
        if path.as_str() == "-" {
            FileOrStdin::Stdin
        } else {
            FileOrStdin::File(path)
        }
    }

    /// Open the input source as a buffered reader.
    pub fn reader(&self) -> Result<Box<dyn BufRead>> {
        match self {
            FileOrStdin::File(path) => {
                let file =
                    File::open(path).with_context(|| format!("failed to open file: {}", path))?;
                Ok(Box::new(BufReader::new(file)))
            }
            FileOrStdin::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
        }
    }
}

/// One entry of an address list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressLine<'a> {
    /// A parsed address.
    Address(IpAddr),
    /// Text that is neither blank, a comment, nor an address.
    Invalid(&'a str, AddrParseError),
}

/// Interpret one line of an address list. Surrounding whitespace is ignored;
/// blank lines and lines starting with `#` yield `None`.
pub fn parse_line(line: &str) -> Option<AddressLine<'_>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(match line.parse::<IpAddr>() {
        Ok(ip) => AddressLine::Address(ip),
        Err(e) => AddressLine::Invalid(line, e),
    })
}

/// Feed every entry of `reader` to `f`, stopping early when `f` returns
/// `Ok(false)`. Bytes that are not UTF-8 are replaced, which makes the line
/// an invalid entry rather than a read error.
pub fn for_each_address<R, F>(mut reader: R, mut f: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(AddressLine<'_>) -> Result<bool>,
{
    let mut buf = Vec::with_capacity(64);
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .context("failed to read line")?;
        if n == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        if let Some(entry) = parse_line(&text) {
            if !f(entry)? {
                break;
            }
        }
    }
    Ok(())
}
