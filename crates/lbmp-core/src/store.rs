// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Append-only line store, one normalized day per line

use crate::error::Result;
use crate::normalizer::NormalizedDayLine;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writer half of the store. Opened once per top-level operation.
#[derive(Debug)]
pub struct LineStore {
    path: PathBuf,
    writer: BufWriter<File>,
    appended: usize,
}

impl LineStore {
    /// Open `path` for appending, creating it and its parent directories if missing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Opened line store {}", path.display());

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            appended: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, day: &NormalizedDayLine) -> Result<()> {
        self.writer.write_all(day.to_line().as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.appended += 1;
        Ok(())
    }

    /// Lines appended through this handle
    pub fn appended(&self) -> usize {
        self.appended
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Read every stored line in file order
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let file = File::open(path.as_ref())?;
    let lines = BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()?;
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dst::DstResolver;
    use crate::normalizer::DayNormalizer;
    use crate::topology::ZoneTopology;
    use tempfile::TempDir;

    fn tiny_day(base: u32) -> NormalizedDayLine {
        // 2 zones, none skipped
        let topology = ZoneTopology::new(2, vec![]).unwrap();
        let mut content = String::from("ts,name,ptid,lbmp\n");
        for h in 0..24 {
            for z in 0..2 {
                content.push_str(&format!("t{h},Z{z},1,{}.5\n", base + h * 2 + z));
            }
        }
        DayNormalizer::new(topology, DstResolver::default())
            .normalize("day.csv", &content)
            .unwrap()
    }

    #[test]
    fn test_append_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lbmp.txt");

        let mut store = LineStore::open(&path).unwrap();
        store.append(&tiny_day(0)).unwrap();
        store.append(&tiny_day(100)).unwrap();
        store.flush().unwrap();
        assert_eq!(store.appended(), 2);

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0.5,1.5,2.5,"));
        assert!(lines[1].starts_with("100.5,"));
        assert!(lines[1].ends_with(','));
        assert_eq!(lines[0].matches(',').count(), 48);
    }

    #[test]
    fn test_reopen_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lbmp.txt");

        {
            let mut store = LineStore::open(&path).unwrap();
            store.append(&tiny_day(0)).unwrap();
            store.flush().unwrap();
        }
        {
            let mut store = LineStore::open(&path).unwrap();
            store.append(&tiny_day(7)).unwrap();
            store.flush().unwrap();
            assert_eq!(store.appended(), 1);
        }

        assert_eq!(read_lines(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("rt").join("lbmp.txt");

        let mut store = LineStore::open(&path).unwrap();
        store.append(&tiny_day(0)).unwrap();
        store.flush().unwrap();

        assert_eq!(read_lines(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(read_lines(dir.path().join("absent.txt")).is_err());
    }
}
