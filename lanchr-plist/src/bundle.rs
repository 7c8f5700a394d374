//! Portable JSON export bundles.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lanchr_core::{Domain, ServiceKind};

use crate::descriptor::Descriptor;
use crate::error::{io_err, PlistError};

pub const BUNDLE_VERSION: u32 = 1;

/// A descriptor plus the metadata needed to reinstall it elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub label: String,
    pub domain: Domain,
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    pub plist_path: PathBuf,
    pub plist: Descriptor,
}

impl ExportBundle {
    pub fn new(
        label: impl Into<String>,
        descriptor: Descriptor,
        plist_path: &Path,
        domain: Domain,
        kind: ServiceKind,
    ) -> Self {
        Self {
            version: BUNDLE_VERSION,
            exported_at: Utc::now(),
            label: label.into(),
            domain,
            kind,
            plist_path: plist_path.to_path_buf(),
            plist: descriptor,
        }
    }

    /// Pretty-printed JSON followed by a newline, flushed.
    pub fn write_to(&self, mut writer: impl Write) -> Result<(), PlistError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|e| io_err("<export writer>", e))
    }

    pub fn write_file(&self, path: &Path) -> Result<(), PlistError> {
        let file = std::fs::File::create(path).map_err(|e| io_err(path, e))?;
        let mut writer = std::io::BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush().map_err(|e| io_err(path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| io_err(path, e))
    }

    /// Decode and check that the bundle carries a version and a label usable
    /// as a file name.
    pub fn read_from(reader: impl Read) -> Result<Self, PlistError> {
        let bundle: ExportBundle = serde_json::from_reader(reader)?;
        if bundle.version == 0 {
            return Err(PlistError::InvalidBundle("missing version".to_string()));
        }
        if bundle.label.is_empty() {
            return Err(PlistError::InvalidBundle("missing label".to_string()));
        }
        if bundle.label.contains('/') || bundle.label.contains("..") {
            return Err(PlistError::InvalidBundle(format!(
                "label {:?} is not a valid file name",
                bundle.label
            )));
        }
        Ok(bundle)
    }

    pub fn read_file(path: &Path) -> Result<Self, PlistError> {
        let file = std::fs::File::open(path).map_err(|e| io_err(path, e))?;
        Self::read_from(std::io::BufReader::new(file))
    }

    /// The descriptor to install, with the bundle label filled in when the
    /// exported descriptor had none.
    pub fn descriptor(&self) -> Descriptor {
        let mut descriptor = self.plist.clone();
        if descriptor.label().is_none() {
            descriptor.label = Some(self.label.clone());
        }
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExportBundle {
        ExportBundle::new(
            "com.example.backup",
            Descriptor {
                label: Some("com.example.backup".into()),
                program: Some("/usr/local/bin/backup".into()),
                start_interval: Some(3600),
                ..Default::default()
            },
            Path::new("/Users/tester/Library/LaunchAgents/com.example.backup.plist"),
            Domain::User,
            ServiceKind::Agent,
        )
    }

    #[test]
    fn json_shape_uses_type_key() {
        let mut buf = Vec::new();
        sample().write_to(&mut buf).expect("write");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(value["version"], 1);
        assert_eq!(value["type"], "agent");
        assert_eq!(value["domain"], "user");
        assert_eq!(value["plist"]["StartInterval"], 3600);
    }

    #[test]
    fn read_rejects_missing_label() {
        let mut bundle = sample();
        bundle.label.clear();
        let json = serde_json::to_vec(&bundle).expect("encode");
        let err = ExportBundle::read_from(json.as_slice()).unwrap_err();
        assert!(err.to_string().contains("missing label"), "got: {err}");
    }

    #[test]
    fn read_rejects_path_like_labels() {
        for label in ["../../elsewhere/x", "com/example", ".."] {
            let mut bundle = sample();
            bundle.label = label.to_string();
            let json = serde_json::to_vec(&bundle).expect("encode");
            let err = ExportBundle::read_from(json.as_slice()).unwrap_err();
            assert!(err.to_string().contains("not a valid file name"), "got: {err}");
        }
    }

    #[test]
    fn read_rejects_version_zero() {
        let mut bundle = sample();
        bundle.version = 0;
        let json = serde_json::to_vec(&bundle).expect("encode");
        assert!(matches!(
            ExportBundle::read_from(json.as_slice()),
            Err(PlistError::InvalidBundle(_))
        ));
    }

    #[test]
    fn descriptor_inherits_bundle_label() {
        let mut bundle = sample();
        bundle.plist.label = None;
        assert_eq!(bundle.descriptor().label(), Some("com.example.backup"));
    }

    /// Accepts every write, fails on flush.
    struct FlushFails(Vec<u8>);

    impl Write for FlushFails {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn flush_failure_is_reported() {
        let err = sample().write_to(FlushFails(Vec::new())).unwrap_err();
        assert!(matches!(err, PlistError::Io { .. }), "got: {err}");
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn write_file_reads_back() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("bundle.json");
        sample().write_file(&path).expect("write");
        let bundle = ExportBundle::read_file(&path).expect("read");
        assert_eq!(bundle.label, "com.example.backup");
        assert_eq!(bundle.plist.start_interval, Some(3600));
    }
}
