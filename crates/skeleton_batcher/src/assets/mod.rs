//! Asset pre-processing
//!
//! Loading atlas and skeleton files is the host's business. This module only
//! provides the byte-level fix-ups applied to their contents before parsing.

pub mod name_remap;

pub use name_remap::NameRemapper;

use std::path::Path;

use thiserror::Error;

use crate::foundation::logging::info;

/// File kinds recognised by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Texture atlas description (`.atlas`)
    Atlas,
    /// JSON skeleton data (`.json`)
    SkeletonJson,
    /// Binary skeleton data (`.skel`)
    SkeletonBinary,
}

impl AssetKind {
    /// Classify a path by its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "atlas" => Some(Self::Atlas),
            "json" => Some(Self::SkeletonJson),
            "skel" => Some(Self::SkeletonBinary),
            _ => None,
        }
    }

    /// Check if this is skeleton data
    pub fn is_skeleton(self) -> bool {
        matches!(self, Self::SkeletonJson | Self::SkeletonBinary)
    }
}

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File extension not recognised for the requested role
    #[error("Unexpected asset type: {0}")]
    UnexpectedKind(String),
}

/// Atlas and skeleton bytes ready for parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemappedAssets {
    /// Atlas contents with slashes in region names replaced
    pub atlas: Vec<u8>,
    /// Skeleton contents with matching references replaced
    pub skeleton: Vec<u8>,
    /// Region names that contained a slash
    pub renamed_regions: usize,
    /// References rewritten in the skeleton data
    pub fixed_references: usize,
}

/// Read an atlas and its skeleton data, applying the slash remapping to both
///
/// The atlas must be read first: the names it records drive the skeleton
/// fix-up, and they are discarded once the skeleton has been processed.
pub fn load_remapped(atlas_path: &Path, skeleton_path: &Path) -> Result<RemappedAssets, AssetError> {
    if AssetKind::from_path(atlas_path) != Some(AssetKind::Atlas) {
        return Err(AssetError::UnexpectedKind(atlas_path.display().to_string()));
    }
    if !AssetKind::from_path(skeleton_path).is_some_and(AssetKind::is_skeleton) {
        return Err(AssetError::UnexpectedKind(skeleton_path.display().to_string()));
    }

    let mut atlas = std::fs::read(atlas_path)?;
    let mut skeleton = std::fs::read(skeleton_path)?;

    let mut remapper = NameRemapper::new();
    let renamed_regions = remapper.sanitize_atlas(&mut atlas);
    let fixed_references = remapper.fix_skeleton_data(&mut skeleton);

    if renamed_regions > 0 {
        info!(
            "Remapped {} slashed region names in {} ({} references fixed in {})",
            renamed_regions,
            atlas_path.display(),
            fixed_references,
            skeleton_path.display()
        );
    }

    Ok(RemappedAssets {
        atlas,
        skeleton,
        renamed_regions,
        fixed_references,
    })
}
