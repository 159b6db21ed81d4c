//! `$readmemh` table files.
//!
//! Each line starts with an `@address` marker followed by up to
//! [`ENTRIES_PER_LINE`] words. Words are the two's-complement sample masked
//! to the output width, as zero-padded lower-case hex.

use crate::logging::{log, LogCategory, LogLevel};
use crate::table::{MAX_OUTPUT_WIDTH, MIN_OUTPUT_WIDTH};
use crate::types::SampleTable;
use crate::{GenError, TablePersister};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const ENTRIES_PER_LINE: usize = 8;

/// File name the generated module loads its table from.
pub fn hex_file_name(module_name: &str) -> String {
    format!("{}.hex", module_name)
}

fn word_mask(output_width: u32) -> u64 {
    if output_width >= 64 {
        u64::MAX
    } else {
        (1u64 << output_width) - 1
    }
}

fn word_digits(output_width: u32) -> usize {
    output_width.div_ceil(4) as usize
}

pub fn write_hex(out: &mut impl Write, table: &SampleTable) -> io::Result<()> {
    let mask = word_mask(table.output_width);
    let digits = word_digits(table.output_width);

    for (line, chunk) in table.samples.chunks(ENTRIES_PER_LINE).enumerate() {
        write!(out, "@{:08x}", line * ENTRIES_PER_LINE)?;
        for &sample in chunk {
            write!(out, " {:0width$x}", (sample as u64) & mask, width = digits)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Parse a table file back into sign-extended samples.
pub fn read_hex(text: &str, output_width: u32) -> Result<Vec<i64>, GenError> {
    if !(MIN_OUTPUT_WIDTH..=MAX_OUTPUT_WIDTH).contains(&output_width) {
        return Err(GenError::TableFormat(format!(
            "output width {} is outside {}..={}",
            output_width, MIN_OUTPUT_WIDTH, MAX_OUTPUT_WIDTH
        )));
    }
    let shift = 64 - output_width;

    let mut samples = Vec::new();
    for token in text.split_whitespace() {
        if let Some(addr) = token.strip_prefix('@') {
            let addr = usize::from_str_radix(addr, 16).map_err(|e| {
                GenError::TableFormat(format!("bad address '{}': {}", token, e))
            })?;
            if addr != samples.len() {
                return Err(GenError::TableFormat(format!(
                    "address {:#x} does not follow entry {:#x}",
                    addr,
                    samples.len()
                )));
            }
            continue;
        }
        let word = u64::from_str_radix(token, 16)
            .map_err(|e| GenError::TableFormat(format!("bad word '{}': {}", token, e)))?;
        samples.push(((word << shift) as i64) >> shift);
    }
    Ok(samples)
}

/// Writes `<module>.hex` into a directory, next to the Verilog output.
#[derive(Debug, Clone)]
pub struct HexFilePersister {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl HexFilePersister {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Persister for the directory containing `target`.
    pub fn beside(target: &Path) -> Self {
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(dir)
    }

    pub fn path_for(&self, module_name: &str) -> PathBuf {
        self.dir.join(hex_file_name(module_name))
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl TablePersister for HexFilePersister {
    fn persist(&mut self, module_name: &str, table: &SampleTable) -> Result<(), GenError> {
        let path = self.path_for(module_name);
        let mut out = BufWriter::new(File::create(&path)?);
        write_hex(&mut out, table)?;
        out.flush()?;

        log(LogCategory::Persist, LogLevel::Info, || {
            format!("Wrote {} entries to {}", table.len(), path.display())
        });
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(output_width: u32, samples: Vec<i64>) -> SampleTable {
        SampleTable {
            output_width,
            samples,
        }
    }

    #[test]
    fn test_hex_file_name() {
        assert_eq!(hex_file_name("sintable"), "sintable.hex");
    }

    #[test]
    fn test_word_digits() {
        assert_eq!(word_digits(2), 1);
        assert_eq!(word_digits(8), 2);
        assert_eq!(word_digits(13), 4);
        assert_eq!(word_digits(64), 16);
    }

    #[test]
    fn test_write_masks_negative_samples() {
        let mut out = Vec::new();
        write_hex(&mut out, &table(8, vec![0, 48, 127, -48, -127])).expect("write");
        assert_eq!(String::from_utf8(out).unwrap(), "@00000000 00 30 7f d0 81\n");
    }

    #[test]
    fn test_write_odd_width() {
        let mut out = Vec::new();
        write_hex(&mut out, &table(12, vec![-1, 2047])).expect("write");
        assert_eq!(String::from_utf8(out).unwrap(), "@00000000 fff 7ff\n");
    }

    #[test]
    fn test_write_line_addresses() {
        let mut out = Vec::new();
        write_hex(&mut out, &table(4, (0..10).map(|v| v % 8).collect())).expect("write");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "@00000000 0 1 2 3 4 5 6 7");
        assert_eq!(lines[1], "@00000008 0 1");
    }

    #[test]
    fn test_read_sign_extends() {
        let samples = read_hex("@00000000 00 30 7f d0 81\n", 8).expect("read");
        assert_eq!(samples, vec![0, 48, 127, -48, -127]);
    }

    #[test]
    fn test_read_rejects_gaps() {
        assert!(matches!(
            read_hex("@00000000 00\n@00000004 01\n", 8),
            Err(GenError::TableFormat(_))
        ));
        assert!(matches!(
            read_hex("@00000000 zz\n", 8),
            Err(GenError::TableFormat(_))
        ));
    }

    #[test]
    fn test_read_rejects_unusable_widths() {
        for width in [0, 1, 65] {
            assert!(matches!(
                read_hex("@00000000 00\n", width),
                Err(GenError::TableFormat(_))
            ));
        }
        assert_eq!(read_hex("@00000000 ffffffffffffffff\n", 64).expect("read"), vec![-1]);
    }

    #[test]
    fn test_persister_writes_beside_target() {
        let dir = std::env::temp_dir().join("sintab_hexfile_test");
        std::fs::create_dir_all(&dir).expect("mkdir");
        let mut persister = HexFilePersister::beside(&dir.join("wave.v"));

        persister
            .persist("wave", &table(8, vec![0, 127, 0, -127]))
            .expect("persist");

        let path = dir.join("wave.hex");
        assert_eq!(persister.written(), &[path.clone()]);
        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(read_hex(&text, 8).expect("parse"), vec![0, 127, 0, -127]);

        std::fs::remove_dir_all(dir).ok();
    }
}
