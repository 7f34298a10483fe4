//! Parameter descriptor for the CMS API and its canonical serialization.
//!
//! Every request carries its parameters twice: percent-encoded in the
//! `X-Akamai-ACS-Action` header and, through that header, inside the signed
//! material. The serialization therefore has to be byte-for-byte
//! deterministic, which is why the field table below is an explicit ordered
//! list instead of anything derived.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::time::{epoch_seconds, DateTime};

/// The protocol version, first field of every action string.
pub const ACS_VERSION: u32 = 1;

/// Sentinel the server requires before honoring a quick-delete.
pub const QUICK_DELETE_SENTINEL: &str = "imreallyreallysure";

/// Archive extension eligible for index-zip processing.
pub const ZIP_EXTENSION: &str = ".zip";

/// Percent-encode everything except unreserved characters
/// (`A-Z a-z 0-9 - . _ ~`). Note that `/` is encoded too; path-valued
/// parameters like `destination` travel fully escaped.
static PARAM_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A parameter value, tagged by its wire formatting rule.
#[derive(Debug)]
enum ParamValue<'a> {
    /// Decimal integer.
    Int(u64),
    /// Literal string.
    Str(&'a str),
    /// Lower-case hex, two digits per byte, no separators.
    Bytes(&'a [u8]),
    /// Seconds since unix epoch, decimal.
    Time(DateTime),
    /// `1` for true, `0` for false.
    Bool(bool),
}

impl ParamValue<'_> {
    fn format(&self) -> String {
        match self {
            ParamValue::Int(v) => v.to_string(),
            ParamValue::Str(v) => v.to_string(),
            ParamValue::Bytes(v) => hex::encode(v),
            ParamValue::Time(v) => epoch_seconds(*v).to_string(),
            ParamValue::Bool(v) => if *v { "1" } else { "0" }.to_string(),
        }
    }
}

/// All the possible parameters of one CMS API operation.
///
/// Immutable once handed to the signer. `version` is not a field: it is the
/// constant [`ACS_VERSION`] and always serializes first.
#[derive(Debug, Clone, Default)]
pub struct ApiParams {
    /// The cms action, e.g. `dir`, `upload`, `rename`. Required.
    pub action: String,
    /// Response format hint for actions that return content, e.g. `xml`.
    pub format: Option<String>,
    /// Must equal [`QUICK_DELETE_SENTINEL`] when present.
    pub quick_delete: Option<String>,
    /// Destination path for `rename`.
    pub destination: Option<String>,
    /// Target path of the existing object for `symlink`.
    pub target: Option<String>,
    /// Modification time.
    pub mtime: Option<DateTime>,
    /// Byte size of an uploaded file. Never combined with `index_zip`.
    pub size: Option<u64>,
    /// MD5 checksum of the uploaded content.
    pub md5: Option<Vec<u8>>,
    /// SHA1 checksum of the uploaded content.
    pub sha1: Option<Vec<u8>>,
    /// SHA256 checksum of the uploaded content.
    pub sha256: Option<Vec<u8>>,
    /// True to index an uploaded `.zip` archive for serve-from-zip.
    pub index_zip: Option<bool>,
}

impl ApiParams {
    fn action(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Default::default()
        }
    }

    fn read_action(action: &str) -> Self {
        Self {
            action: action.to_string(),
            format: Some("xml".to_string()),
            ..Default::default()
        }
    }

    /// List the objects directly within a directory.
    pub fn dir() -> Self {
        Self::read_action("dir")
    }

    /// Download a file.
    pub fn download() -> Self {
        Self::action("download")
    }

    /// Disk usage information for a directory.
    pub fn du() -> Self {
        Self::read_action("du")
    }

    /// Recursively list all objects under a directory.
    pub fn list() -> Self {
        Self::read_action("list")
    }

    /// Stat structure for a file, symlink or directory.
    pub fn stat() -> Self {
        Self::read_action("stat")
    }

    /// Delete a single object.
    pub fn delete() -> Self {
        Self::action("delete")
    }

    /// Create an explicit directory.
    pub fn mkdir() -> Self {
        Self::action("mkdir")
    }

    /// Change a file's modification time.
    pub fn mtime(mtime: DateTime) -> Self {
        Self {
            mtime: Some(mtime),
            ..Self::action("mtime")
        }
    }

    /// Delete a directory including all contents.
    pub fn quick_delete() -> Self {
        Self {
            quick_delete: Some(QUICK_DELETE_SENTINEL.to_string()),
            ..Self::action("quick-delete")
        }
    }

    /// Rename a file or symlink. `destination` must be a fully escaped path.
    pub fn rename(destination: &str) -> Self {
        Self {
            destination: Some(destination.to_string()),
            ..Self::action("rename")
        }
    }

    /// Delete an empty directory.
    pub fn rmdir() -> Self {
        Self::action("rmdir")
    }

    /// Create a symbolic link pointing at `target`.
    pub fn symlink(target: &str) -> Self {
        Self {
            target: Some(target.to_string()),
            ..Self::action("symlink")
        }
    }

    /// Upload a file.
    ///
    /// `index_zip == false` never reaches the wire: only an explicit request
    /// for indexing is meaningful, so false collapses to absent here.
    pub fn upload(
        mtime: Option<DateTime>,
        size: Option<u64>,
        sha256: Option<Vec<u8>>,
        index_zip: bool,
    ) -> Self {
        Self {
            mtime,
            size,
            sha256,
            index_zip: index_zip.then_some(true),
            ..Self::action("upload")
        }
    }

    /// Override the response format hint.
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Enforce the index-zip policy against the request path before signing.
    ///
    /// - `index_zip` is only meaningful when the destination ends in `.zip`;
    ///   otherwise it is silently cleared.
    /// - index-zip processing mutates the stored content length, so `size`
    ///   is cleared whenever `index_zip` survives.
    pub fn normalize_for_path(&mut self, path: &str) {
        if self.index_zip == Some(true) && !path.ends_with(ZIP_EXTENSION) {
            self.index_zip = None;
        }
        if self.index_zip == Some(true) && self.size.is_some() {
            self.size = None;
        }
    }

    /// Serialize into the canonical `name=value&...` action string.
    ///
    /// Field order is fixed; absent and empty fields are omitted entirely.
    /// The result doubles as the `X-Akamai-ACS-Action` header value and as
    /// signing material, so it must be identical across calls.
    pub fn to_query_string(&self) -> String {
        let fields: [(&str, Option<ParamValue>); 12] = [
            ("version", Some(ParamValue::Int(ACS_VERSION as u64))),
            ("action", string_field(&self.action)),
            ("format", opt_string_field(&self.format)),
            ("quick-delete", opt_string_field(&self.quick_delete)),
            ("destination", opt_string_field(&self.destination)),
            ("target", opt_string_field(&self.target)),
            ("mtime", self.mtime.map(ParamValue::Time)),
            ("size", self.size.map(ParamValue::Int)),
            ("md5", self.md5.as_deref().map(ParamValue::Bytes)),
            ("sha1", self.sha1.as_deref().map(ParamValue::Bytes)),
            ("sha256", self.sha256.as_deref().map(ParamValue::Bytes)),
            ("index-zip", self.index_zip.map(ParamValue::Bool)),
        ];

        fields
            .iter()
            .filter_map(|(name, value)| {
                value.as_ref().map(|v| {
                    format!(
                        "{name}={}",
                        utf8_percent_encode(&v.format(), &PARAM_ENCODE_SET)
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn string_field(s: &str) -> Option<ParamValue<'_>> {
    if s.is_empty() {
        None
    } else {
        Some(ParamValue::Str(s))
    }
}

fn opt_string_field(s: &Option<String>) -> Option<ParamValue<'_>> {
    s.as_deref().and_then(string_field)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn fixed_time() -> DateTime {
        Utc.with_ymd_and_hms(2013, 11, 11, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_value_formats() {
        assert_eq!(ParamValue::Str("ASDF").format(), "ASDF");
        assert_eq!(
            ParamValue::Bytes(b"Lorem ipsum").format(),
            "4c6f72656d20697073756d"
        );
        assert_eq!(ParamValue::Bytes(&[0x00]).format(), "00");
        assert_eq!(ParamValue::Bytes(&[0x01]).format(), "01");
        assert_eq!(ParamValue::Time(fixed_time()).format(), "1384128000");
        assert_eq!(ParamValue::Bool(true).format(), "1");
        assert_eq!(ParamValue::Bool(false).format(), "0");
        assert_eq!(ParamValue::Int(1234).format(), "1234");
    }

    #[test]
    fn test_full_descriptor_field_order() {
        let params = ApiParams {
            action: "download".to_string(),
            format: Some("xml".to_string()),
            quick_delete: Some(QUICK_DELETE_SENTINEL.to_string()),
            destination: Some("/foo".to_string()),
            target: Some("/bar".to_string()),
            mtime: Some(fixed_time()),
            size: Some(123),
            index_zip: Some(true),
            ..Default::default()
        };

        assert_eq!(
            params.to_query_string(),
            "version=1&action=download&format=xml&quick-delete=imreallyreallysure\
             &destination=%2Ffoo&target=%2Fbar&mtime=1384128000&size=123&index-zip=1"
        );
    }

    #[test]
    fn test_checksums_only() {
        let params = ApiParams {
            md5: Some(b"Lorem ipsum".to_vec()),
            sha1: Some(b"Lorem ipsum".to_vec()),
            sha256: Some(b"Lorem ipsum".to_vec()),
            ..Default::default()
        };

        assert_eq!(
            params.to_query_string(),
            "version=1&md5=4c6f72656d20697073756d&sha1=4c6f72656d20697073756d\
             &sha256=4c6f72656d20697073756d"
        );
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let params = ApiParams::upload(Some(fixed_time()), Some(42), None, true);
        assert_eq!(params.to_query_string(), params.to_query_string());
    }

    #[test]
    fn test_upload_false_index_zip_is_absent() {
        let params = ApiParams::upload(None, Some(42), None, false);
        assert_eq!(params.index_zip, None);
        assert_eq!(params.to_query_string(), "version=1&action=upload&size=42");
    }

    #[test]
    fn test_index_zip_cleared_for_non_zip_path() {
        let mut params = ApiParams::upload(None, None, None, true);
        params.normalize_for_path("/123456/file.txt");

        assert_eq!(params.index_zip, None);
        assert_eq!(params.to_query_string(), "version=1&action=upload");
    }

    #[test]
    fn test_index_zip_wins_over_size_for_zip_path() {
        let mut params = ApiParams::upload(None, Some(123), None, true);
        params.normalize_for_path("/123456/archive.zip");

        assert_eq!(params.size, None);
        assert_eq!(
            params.to_query_string(),
            "version=1&action=upload&index-zip=1"
        );
    }

    #[test]
    fn test_quick_delete_carries_sentinel() {
        let params = ApiParams::quick_delete();
        assert_eq!(
            params.to_query_string(),
            "version=1&action=quick-delete&quick-delete=imreallyreallysure"
        );
    }

    #[test]
    fn test_read_actions_default_to_xml() {
        assert_eq!(ApiParams::dir().to_query_string(), "version=1&action=dir&format=xml");
        assert_eq!(ApiParams::du().format.as_deref(), Some("xml"));
        assert_eq!(ApiParams::list().format.as_deref(), Some("xml"));
        assert_eq!(ApiParams::stat().format.as_deref(), Some("xml"));
        assert_eq!(ApiParams::download().format, None);
    }

    #[test]
    fn test_rename_destination_is_escaped() {
        let params = ApiParams::rename("/foo/bar baz");
        assert_eq!(
            params.to_query_string(),
            "version=1&action=rename&destination=%2Ffoo%2Fbar%20baz"
        );
    }
}
