//! The ETag digest and its wire form.

use crate::hash::Md5Hash;
use std::fmt;
use std::str::FromStr;

/// An object store ETag in one of the two MD5-derived shapes.
///
/// The wire form is the only place the `-` convention lives: a simple ETag
/// is the hex MD5 of the content, a multipart ETag is
/// `<hex md5 of concatenated part md5s>-<part count>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Etag {
    /// MD5 of the whole content.
    Simple(Md5Hash),
    /// MD5 over the raw MD5s of each uploaded part.
    Multipart { hash: Md5Hash, parts: u32 },
}

impl Etag {
    /// Parse an ETag from its wire form (without surrounding quotes).
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s.rsplit_once('-') {
            Some((hex, count)) => {
                if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(crate::Error::InvalidEtag(format!(
                        "invalid part count in {s:?}"
                    )));
                }
                let parts: u32 = count
                    .parse()
                    .map_err(|_| crate::Error::InvalidEtag(format!("part count overflow in {s:?}")))?;
                if parts == 0 {
                    return Err(crate::Error::InvalidEtag(format!(
                        "zero part count in {s:?}"
                    )));
                }
                Ok(Self::Multipart {
                    hash: Md5Hash::from_hex(hex)?,
                    parts,
                })
            }
            None => Ok(Self::Simple(Md5Hash::from_hex(s)?)),
        }
    }

    /// The digest part of the ETag.
    pub fn hash(&self) -> &Md5Hash {
        match self {
            Self::Simple(hash) | Self::Multipart { hash, .. } => hash,
        }
    }

    /// True if this ETag was produced by a multipart upload.
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart { .. })
    }

    /// Number of parts for a multipart ETag.
    pub fn part_count(&self) -> Option<u32> {
        match self {
            Self::Simple(_) => None,
            Self::Multipart { parts, .. } => Some(*parts),
        }
    }
}

impl FromStr for Etag {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(hash) => write!(f, "{hash}"),
            Self::Multipart { hash, parts } => write!(f, "{hash}-{parts}"),
        }
    }
}

impl fmt::Debug for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Etag({self})")
    }
}
