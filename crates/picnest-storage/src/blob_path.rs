use std::{fmt, str::FromStr};
use strum::{AsRefStr, Display, EnumString};

/// Permission folder under the owner's root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Folder {
    /// Uploads which are not attached to a publication yet.
    Temp,
    /// Images of the owner's publications.
    Publications,
    /// The owner's avatar.
    Avatar,
}

/// Name of a blob inside a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Purpose {
    /// The original image.
    CurrentImg,
    /// The transformed image.
    UpdatedImg,
    /// The QR code for the image link.
    QrCodeImg,
    /// The avatar image.
    Avatar,
}

/// A structured path of a blob: `{owner}/{folder}/[{publication_id}/]{purpose}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobPath {
    /// Owner identity.
    owner: String,
    /// Folder.
    folder: Folder,
    /// Publication ID, only for the `publications` folder.
    publication_id: Option<i64>,
    /// Purpose.
    purpose: Purpose,
}

impl BlobPath {
    /// Creates a path in the owner's `temp` folder.
    #[inline]
    pub fn temp(owner: impl Into<String>, purpose: Purpose) -> Self {
        Self {
            owner: owner.into(),
            folder: Folder::Temp,
            publication_id: None,
            purpose,
        }
    }

    /// Creates a path in the folder of a publication.
    #[inline]
    pub fn publication(owner: impl Into<String>, publication_id: i64, purpose: Purpose) -> Self {
        Self {
            owner: owner.into(),
            folder: Folder::Publications,
            publication_id: Some(publication_id),
            purpose,
        }
    }

    /// Creates the path of the owner's avatar.
    #[inline]
    pub fn avatar(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            folder: Folder::Avatar,
            publication_id: None,
            purpose: Purpose::Avatar,
        }
    }

    /// Returns the prefix of all blobs of a publication.
    #[inline]
    pub fn publication_prefix(owner: &str, publication_id: i64) -> String {
        format!("{owner}/{}/{publication_id}", Folder::Publications)
    }

    /// Returns the path which a temp blob is promoted to for the publication.
    #[inline]
    pub fn promote(&self, publication_id: i64) -> Self {
        Self::publication(self.owner.clone(), publication_id, self.purpose)
    }

    /// Returns a path with the same folder but a different purpose.
    #[inline]
    pub fn with_purpose(&self, purpose: Purpose) -> Self {
        Self {
            purpose,
            ..self.clone()
        }
    }

    /// Returns the owner.
    #[inline]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the folder.
    #[inline]
    pub fn folder(&self) -> Folder {
        self.folder
    }

    /// Returns the publication ID.
    #[inline]
    pub fn publication_id(&self) -> Option<i64> {
        self.publication_id
    }

    /// Returns the purpose.
    #[inline]
    pub fn purpose(&self) -> Purpose {
        self.purpose
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = &self.owner;
        let folder = self.folder;
        let purpose = self.purpose;
        if let Some(publication_id) = self.publication_id {
            write!(f, "{owner}/{folder}/{publication_id}/{purpose}")
        } else {
            write!(f, "{owner}/{folder}/{purpose}")
        }
    }
}

/// An error which can be returned when parsing a blob path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBlobPathError(String);

impl fmt::Display for ParseBlobPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid blob path `{}`", self.0)
    }
}

impl std::error::Error for ParseBlobPathError {}

impl FromStr for BlobPath {
    type Err = ParseBlobPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseBlobPathError(s.to_owned());
        let segments = s.split('/').collect::<Vec<_>>();
        let (owner, folder, publication_id, purpose) = match segments.as_slice() {
            [owner, folder, purpose] => (*owner, *folder, None, *purpose),
            [owner, folder, publication_id, purpose] => {
                let publication_id = publication_id.parse().map_err(|_| invalid())?;
                (*owner, *folder, Some(publication_id), *purpose)
            }
            _ => return Err(invalid()),
        };
        let folder = folder.parse::<Folder>().map_err(|_| invalid())?;
        if owner.is_empty() || (folder == Folder::Publications) != publication_id.is_some() {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_owned(),
            folder,
            publication_id,
            purpose: purpose.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BlobPath, Folder, Purpose};

    #[test]
    fn it_formats_structured_paths() {
        let temp = BlobPath::temp("b@x.com", Purpose::CurrentImg);
        assert_eq!(temp.to_string(), "b@x.com/temp/current_img");

        let promoted = temp.promote(7);
        assert_eq!(promoted.to_string(), "b@x.com/publications/7/current_img");
        assert_eq!(promoted.folder(), Folder::Publications);
        assert_eq!(
            promoted.with_purpose(Purpose::QrCodeImg).to_string(),
            "b@x.com/publications/7/qr_code_img"
        );
        assert_eq!(BlobPath::avatar("b@x.com").to_string(), "b@x.com/avatar/avatar");
        assert_eq!(
            BlobPath::publication_prefix("b@x.com", 7),
            "b@x.com/publications/7"
        );
    }

    #[test]
    fn it_parses_structured_paths() {
        let path = "b@x.com/publications/7/updated_img".parse::<BlobPath>().unwrap();
        assert_eq!(path.publication_id(), Some(7));
        assert_eq!(path.purpose(), Purpose::UpdatedImg);
        assert_eq!(path.owner(), "b@x.com");

        assert!("b@x.com/temp/7/current_img".parse::<BlobPath>().is_err());
        assert!("b@x.com/publications/current_img".parse::<BlobPath>().is_err());
        assert!("b@x.com/private/current_img".parse::<BlobPath>().is_err());
        assert!("b@x.com/temp/thumbnail".parse::<BlobPath>().is_err());
    }
}
