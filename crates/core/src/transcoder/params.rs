//! Parameters derived from a metadata snapshot.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use super::error::TranscodeError;
use crate::config::{NamingPolicy, OutputConfig};
use crate::engine::{AudioCodec, ContainerFormat, EmbeddedMetadata, TranscodeJob};
use crate::metadata::{sanitize, sanitize_title, MetadataSnapshot};

/// Everything the transcode pass needs for one file.
///
/// String fields are sanitized on construction; nothing raw from the snapshot
/// is stored here.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedParameters {
    pub input_path: PathBuf,
    /// Path the engine writes.
    pub encode_path: PathBuf,
    /// Final artifact path; differs from `encode_path` for the m4b relabel.
    pub output_path: PathBuf,
    pub container: ContainerFormat,
    pub codec: AudioCodec,
    /// Target bitrate with `k` suffix, when the probe reported one.
    pub bitrate: Option<String>,
    pub title: String,
    pub artist: String,
    pub album_artist: String,
    pub album: String,
    pub date: String,
    pub genre: String,
    pub copyright: String,
}

impl DerivedParameters {
    pub fn derive(
        snapshot: &MetadataSnapshot,
        input: &Path,
        output: &OutputConfig,
    ) -> Result<Self, TranscodeError> {
        let source_stem = input
            .file_stem()
            .filter(|s| !s.is_empty())
            .map(OsString::from)
            .ok_or_else(|| TranscodeError::InvalidInput {
                path: input.to_path_buf(),
            })?;

        let title = sanitize_title(&snapshot.lookup("title"));
        let stem = match output.naming {
            NamingPolicy::Title if !title.is_empty() => OsString::from(&title),
            _ => source_stem,
        };

        let dir = output
            .output_dir
            .clone()
            .or_else(|| {
                input
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let container = output.container;
        let kbps = snapshot.bitrate_kbps();

        Ok(Self {
            input_path: input.to_path_buf(),
            encode_path: dir.join(file_name(&stem, container.encode_extension())),
            output_path: dir.join(file_name(&stem, container.extension())),
            container,
            codec: output.codec(),
            bitrate: (!kbps.is_empty()).then(|| format!("{}k", kbps)),
            title,
            artist: sanitize(&snapshot.lookup("artist")),
            album_artist: sanitize(&snapshot.lookup("album_artist")),
            album: sanitize(&snapshot.lookup("album")),
            date: sanitize(&snapshot.lookup("date")),
            genre: sanitize(&snapshot.lookup("genre")),
            copyright: sanitize(&snapshot.lookup("copyright")),
        })
    }

    /// Directory the artifact lands in.
    pub fn output_dir(&self) -> &Path {
        self.encode_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Whether the engine output must be relabeled afterwards.
    pub fn needs_rename(&self) -> bool {
        self.encode_path != self.output_path
    }

    pub fn metadata(&self) -> EmbeddedMetadata {
        EmbeddedMetadata {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album_artist: self.album_artist.clone(),
            album: self.album.clone(),
            date: self.date.clone(),
            genre: self.genre.clone(),
            copyright: self.copyright.clone(),
        }
    }

    pub fn transcode_job(&self) -> TranscodeJob {
        TranscodeJob {
            input_path: self.input_path.clone(),
            output_path: self.encode_path.clone(),
            codec: self.codec,
            bitrate: self.bitrate.clone(),
            metadata: self.metadata(),
        }
    }
}

/// `stem.ext`, keeping any dots already in the stem.
fn file_name(stem: &OsStr, extension: &str) -> OsString {
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn snapshot(title: &str) -> MetadataSnapshot {
        MetadataSnapshot::from_text("/books/b.aax", fixtures::probe_text(title))
    }

    #[test]
    fn test_derive_defaults() {
        let params = DerivedParameters::derive(
            &snapshot("My Book (Unabridged)"),
            Path::new("/books/b.aax"),
            &OutputConfig::default(),
        )
        .unwrap();

        assert_eq!(params.title, "My Book");
        assert_eq!(params.album, "My Book");
        assert_eq!(params.artist, "Jane Doe");
        assert_eq!(params.date, "2019");
        assert_eq!(params.bitrate.as_deref(), Some("64k"));
        assert_eq!(params.codec, AudioCodec::Copy);
        assert_eq!(params.encode_path, PathBuf::from("/books/b.m4a"));
        assert!(!params.needs_rename());
    }

    #[test]
    fn test_derive_alternate_container() {
        let output = OutputConfig {
            container: ContainerFormat::M4b,
            ..Default::default()
        };
        let params =
            DerivedParameters::derive(&snapshot("My Book"), Path::new("/books/b.aax"), &output)
                .unwrap();

        assert_eq!(params.encode_path, PathBuf::from("/books/b.m4a"));
        assert_eq!(params.output_path, PathBuf::from("/books/b.m4b"));
        assert!(params.needs_rename());
    }

    #[test]
    fn test_derive_title_naming() {
        let output = OutputConfig {
            container: ContainerFormat::Mp3,
            output_dir: Some(PathBuf::from("/srv/out")),
            naming: NamingPolicy::Title,
            ..Default::default()
        };
        let params = DerivedParameters::derive(
            &snapshot("Book: Subtitle"),
            Path::new("/books/b.aax"),
            &output,
        )
        .unwrap();

        assert_eq!(params.title, "Book-Subtitle");
        assert_eq!(params.output_path, PathBuf::from("/srv/out/Book-Subtitle.mp3"));
        assert_eq!(params.output_dir(), Path::new("/srv/out"));
        assert_eq!(params.codec, AudioCodec::Mp3);
    }

    #[test]
    fn test_title_naming_falls_back_to_source() {
        let output = OutputConfig {
            naming: NamingPolicy::Title,
            ..Default::default()
        };
        let empty = MetadataSnapshot::from_text("/books/b.aax", "");
        let params = DerivedParameters::derive(&empty, Path::new("/books/b.aax"), &output).unwrap();

        assert_eq!(params.output_path, PathBuf::from("/books/b.m4a"));
        assert_eq!(params.bitrate, None);
        assert_eq!(params.title, "");
    }

    #[test]
    fn test_dotted_names_keep_their_stem() {
        let output = OutputConfig {
            naming: NamingPolicy::Title,
            ..Default::default()
        };
        let params =
            DerivedParameters::derive(&snapshot("Vol. 2 The End"), Path::new("/books/b.aax"), &output)
                .unwrap();
        assert_eq!(params.output_path, PathBuf::from("/books/Vol. 2 The End.m4a"));

        let params = DerivedParameters::derive(
            &snapshot("x"),
            Path::new("/books/my.book.aax"),
            &OutputConfig::default(),
        )
        .unwrap();
        assert_eq!(params.output_path, PathBuf::from("/books/my.book.m4a"));
    }

    #[test]
    fn test_relative_input_without_parent() {
        let params = DerivedParameters::derive(
            &snapshot("x"),
            Path::new("b.aax"),
            &OutputConfig::default(),
        )
        .unwrap();
        assert_eq!(params.output_path, PathBuf::from("./b.m4a"));
    }

    #[test]
    fn test_metadata_fields_are_sanitized() {
        let text = "title: A/B: C (Unabridged)\nartist:  Doe,   Jane \ncopyright: ©  2019/2020\n";
        let snapshot = MetadataSnapshot::from_text("/books/b.aax", text);
        let params =
            DerivedParameters::derive(&snapshot, Path::new("/books/b.aax"), &OutputConfig::default())
                .unwrap();

        let metadata = params.metadata();
        assert_eq!(metadata.title, "AB-C");
        assert_eq!(metadata.artist, "Doe, Jane");
        assert_eq!(metadata.copyright, "© 20192020");
        assert_eq!(params.transcode_job().output_path, params.encode_path);
    }

    #[test]
    fn test_invalid_input_path() {
        let result = DerivedParameters::derive(&snapshot("x"), Path::new("/"), &OutputConfig::default());
        assert!(matches!(result, Err(TranscodeError::InvalidInput { .. })));
    }
}
