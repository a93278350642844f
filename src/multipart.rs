//! File attachments and `multipart/form-data` body assembly.

// std
use std::{
	fs,
	path::{Path, PathBuf},
};
// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, error::EncodingError};

/// Form field name the platform expects uploaded files under.
pub const FILE_FIELD: &str = "file";

const BOUNDARY_ENTROPY_LEN: usize = 32;

/// Where an attachment's bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileSource {
	/// Read from the filesystem at encode time.
	Path(PathBuf),
	/// In-memory content with the filename to advertise.
	Bytes {
		/// Filename sent in the `Content-Disposition` header.
		filename: String,
		/// Raw file content.
		data: Vec<u8>,
	},
}

/// One file to upload alongside a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileAttachment {
	/// Byte source.
	pub source: FileSource,
	/// Declared MIME type, e.g. `application/EDI-X12`.
	pub content_type: String,
}
impl FileAttachment {
	/// Attachment read from `path` when the request is encoded.
	pub fn from_path(path: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
		Self { source: FileSource::Path(path.into()), content_type: content_type.into() }
	}

	/// Attachment backed by in-memory bytes.
	pub fn from_bytes(
		filename: impl Into<String>,
		data: impl Into<Vec<u8>>,
		content_type: impl Into<String>,
	) -> Self {
		Self {
			source: FileSource::Bytes { filename: filename.into(), data: data.into() },
			content_type: content_type.into(),
		}
	}

	/// Filename advertised to the server (the path's final component for file sources).
	pub fn filename(&self) -> String {
		match &self.source {
			FileSource::Path(path) => path
				.file_name()
				.map(|name| name.to_string_lossy().into_owned())
				.unwrap_or_default(),
			FileSource::Bytes { filename, .. } => filename.clone(),
		}
	}

	/// Renders the part headers, a blank line, the file bytes, and a trailing CRLF.
	///
	/// The leading `--boundary` line is written by [`MultipartBody`].
	pub fn render_segment(&self, field_name: &str) -> Result<Vec<u8>, EncodingError> {
		let data = self.read()?;
		let mut segment = format!(
			"Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
			self.filename(),
			self.content_type,
		)
		.into_bytes();

		segment.reserve(data.len() + 2);
		segment.extend_from_slice(&data);
		segment.extend_from_slice(b"\r\n");

		Ok(segment)
	}

	fn read(&self) -> Result<Vec<u8>, EncodingError> {
		match &self.source {
			FileSource::Path(path) => read_file(path),
			FileSource::Bytes { data, .. } => Ok(data.clone()),
		}
	}
}

/// Incremental `multipart/form-data` writer bound to a single random boundary.
#[derive(Debug)]
pub struct MultipartBody {
	boundary: String,
	buf: Vec<u8>,
}
impl MultipartBody {
	/// Starts a body with a freshly generated boundary.
	pub fn new() -> Self {
		Self::with_boundary(random_boundary())
	}

	/// Starts a body with a caller-chosen boundary.
	pub fn with_boundary(boundary: impl Into<String>) -> Self {
		Self { boundary: boundary.into(), buf: Vec::new() }
	}

	/// Boundary token separating the parts.
	pub fn boundary(&self) -> &str {
		&self.boundary
	}

	/// Value for the `Content-Type` header of a request carrying this body.
	pub fn content_type(&self) -> String {
		format!("multipart/form-data; boundary={}", self.boundary)
	}

	/// Appends a plain form field.
	pub fn field(&mut self, name: &str, value: &str) {
		self.open_part();
		self.buf.extend_from_slice(
			format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
				.as_bytes(),
		);
	}

	/// Appends a file part under `field_name`.
	pub fn file(&mut self, field_name: &str, file: &FileAttachment) -> Result<(), EncodingError> {
		let segment = file.render_segment(field_name)?;

		self.open_part();
		self.buf.extend_from_slice(&segment);

		Ok(())
	}

	/// Writes the closing boundary and returns the encoded body.
	pub fn finish(mut self) -> Vec<u8> {
		self.buf.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

		self.buf
	}

	fn open_part(&mut self) {
		self.buf.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
	}
}
impl Default for MultipartBody {
	fn default() -> Self {
		Self::new()
	}
}

fn read_file(path: &Path) -> Result<Vec<u8>, EncodingError> {
	fs::read(path).map_err(|source| EncodingError::FileRead { path: path.to_owned(), source })
}

fn random_boundary() -> String {
	let entropy: String =
		rand::rng().sample_iter(Alphanumeric).take(BOUNDARY_ENTROPY_LEN).map(char::from).collect();

	format!("Boundary-{entropy}")
}
