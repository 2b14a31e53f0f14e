//! The transport seam
//!
//! The exchange core never talks to the secure channel directly; it consumes
//! this trait. [`DirTransport`] backs the `local` protocol, where the remote
//! receive/send paths are directories on this host (a mounted exchange share
//! or a spool filled by an external agent). Session negotiation for anything
//! else belongs to that external collaborator, not here.

use crate::config::FtpConfig;
use crate::error::{ExchangeError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Where acknowledged remote files are moved.
const ACK_DIR: &str = "acknowledged";

/// One file visible on the remote endpoint
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    pub name: String,
    pub mtime: DateTime<Utc>,
    pub size: u64,
}

/// Narrow contract the sync pipelines need from the transfer channel.
pub trait Transport: std::fmt::Debug {
    /// Files currently available, in deterministic (name) order.
    fn list(&mut self) -> Result<Vec<RemoteEntry>>;

    /// Copy one remote file to a local destination path.
    fn fetch(&mut self, name: &str, dest: &Path) -> Result<()>;

    /// Mark one remote file consumed so it is not offered again.
    fn acknowledge(&mut self, name: &str) -> Result<()>;

    /// Upload one local file under the given remote name.
    fn upload(&mut self, local: &Path, name: &str) -> Result<()>;
}

/// Directory-backed transport for mounted shares, spools, and tests.
#[derive(Debug)]
pub struct DirTransport {
    root: PathBuf,
}

impl DirTransport {
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Transport for DirTransport {
    fn list(&mut self) -> Result<Vec<RemoteEntry>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if !path.is_file() {
                continue;
            }
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            let meta = dir_entry.metadata()?;
            let mtime: DateTime<Utc> = meta.modified()?.into();
            entries.push(RemoteEntry {
                name,
                mtime,
                size: meta.len(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn fetch(&mut self, name: &str, dest: &Path) -> Result<()> {
        let src = self.entry_path(name);
        fs::copy(&src, dest).map_err(|e| {
            ExchangeError::Transport(format!("fetch {name} -> {}: {e}", dest.display()))
        })?;
        Ok(())
    }

    fn acknowledge(&mut self, name: &str) -> Result<()> {
        let acked = self.root.join(ACK_DIR);
        fs::create_dir_all(&acked)?;
        fs::rename(self.entry_path(name), acked.join(name))
            .map_err(|e| ExchangeError::Transport(format!("acknowledge {name}: {e}")))?;
        Ok(())
    }

    fn upload(&mut self, local: &Path, name: &str) -> Result<()> {
        fs::copy(local, self.entry_path(name)).map_err(|e| {
            ExchangeError::Transport(format!("upload {} -> {name}: {e}", local.display()))
        })?;
        Ok(())
    }
}

/// Open the transport for a configured endpoint path.
pub fn open_transport(ftp: &FtpConfig, remote_path: &str) -> Result<Box<dyn Transport>> {
    match ftp.protocol.as_str() {
        "local" => Ok(Box::new(DirTransport::new(Path::new(remote_path))?)),
        other => Err(ExchangeError::UnsupportedProtocol(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn transport(dir: &TempDir) -> DirTransport {
        DirTransport::new(dir.path()).unwrap()
    }

    #[test]
    fn list_sees_files_not_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.csv"), "b").unwrap();
        fs::write(dir.path().join("a.csv"), "a").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let mut t = transport(&dir);
        let entries = t.list().unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.csv", "b.csv"]);
        assert_eq!(entries[0].size, 1);
    }

    #[test]
    fn fetch_copies_content() {
        let dir = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        fs::write(dir.path().join("report.csv"), "payload").unwrap();

        let mut t = transport(&dir);
        let dest = local.path().join("report.csv");
        t.fetch("report.csv", &dest).unwrap();

        assert_eq!(fs::read_to_string(dest).unwrap(), "payload");
        // Fetch does not consume the remote copy.
        assert!(dir.path().join("report.csv").exists());
    }

    #[test]
    fn acknowledge_moves_out_of_listing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("report.csv"), "payload").unwrap();

        let mut t = transport(&dir);
        t.acknowledge("report.csv").unwrap();

        assert!(t.list().unwrap().is_empty());
        assert!(dir.path().join(ACK_DIR).join("report.csv").exists());
    }

    #[test]
    fn acknowledge_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut t = transport(&dir);
        assert!(t.acknowledge("ghost.csv").is_err());
    }

    #[test]
    fn upload_round_trips() {
        let dir = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let src = local.path().join("out.csv");
        fs::write(&src, "outbound").unwrap();

        let mut t = transport(&dir);
        t.upload(&src, "out.csv").unwrap();

        let entries = t.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "out.csv");
    }

    #[test]
    fn open_transport_rejects_unknown_protocol() {
        let ftp = FtpConfig {
            host: "example".to_string(),
            port: 22,
            username: "u".to_string(),
            password: "p".to_string(),
            protocol: "carrier-pigeon".to_string(),
            receive_path: "/r".to_string(),
            send_path: "/s".to_string(),
        };
        assert!(matches!(
            open_transport(&ftp, "/r").unwrap_err(),
            ExchangeError::UnsupportedProtocol(_)
        ));
    }
}
