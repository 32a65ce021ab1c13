//! Slash remapping for atlas region names
//!
//! Region names containing `/` are rewritten to use `-` in the atlas, and
//! every reference to them in the skeleton data is rewritten the same way so
//! the two files keep agreeing. Other slashes in the skeleton data (paths of
//! regions that never had one in the atlas) are left alone.

use crate::foundation::logging::trace;

/// Records slashed names from an atlas and applies them to skeleton data
///
/// One remapper covers one atlas/skeleton pair. [`fix_skeleton_data`]
/// consumes it, so names recorded for one load never leak into the next.
///
/// [`fix_skeleton_data`]: NameRemapper::fix_skeleton_data
#[derive(Debug, Default, Clone)]
pub struct NameRemapper {
    invalid_names: Vec<Vec<u8>>,
}

impl NameRemapper {
    /// Create an empty remapper
    pub fn new() -> Self {
        Self::default()
    }

    /// Original lines that contained a slash, as recorded by the atlas pass
    pub fn invalid_names(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.invalid_names.iter().map(Vec::as_slice)
    }

    /// Replace every `/` in the atlas with `-`, recording affected lines
    ///
    /// Carriage returns are ignored when recording. Returns the number of
    /// lines recorded.
    pub fn sanitize_atlas(&mut self, data: &mut [u8]) -> usize {
        let before = self.invalid_names.len();
        let mut line = Vec::new();
        let mut has_slash = false;

        for byte in data.iter_mut() {
            match *byte {
                b'\r' => {}
                b'\n' => {
                    if has_slash {
                        self.invalid_names.push(std::mem::take(&mut line));
                    }
                    line.clear();
                    has_slash = false;
                }
                b'/' => {
                    line.push(b'/');
                    has_slash = true;
                    *byte = b'-';
                }
                other => line.push(other),
            }
        }

        if has_slash {
            self.invalid_names.push(line);
        }

        let recorded = self.invalid_names.len() - before;
        trace!("Atlas pass recorded {} slashed names", recorded);
        recorded
    }

    /// Rewrite references to recorded names in skeleton data
    ///
    /// A slash is rewritten when the bytes around it spell out a recorded
    /// name, aligned on that name's first slash. Further slashes inside the
    /// matched name are rewritten too. Returns the number of references
    /// fixed.
    pub fn fix_skeleton_data(self, data: &mut [u8]) -> usize {
        if self.invalid_names.is_empty() {
            return 0;
        }

        let mut fixed = 0;
        for i in 0..data.len() {
            if data[i] != b'/' {
                continue;
            }

            let matched = self.invalid_names.iter().find_map(|name| {
                let slash = name.iter().position(|&b| b == b'/')?;
                let end = i + (name.len() - slash);
                let aligned = i >= slash
                    && end <= data.len()
                    && data[i - slash..end] == name[..];
                aligned.then_some(end)
            });

            if let Some(end) = matched {
                for byte in &mut data[i..end] {
                    if *byte == b'/' {
                        *byte = b'-';
                    }
                }
                fixed += 1;
            }
        }

        trace!("Skeleton pass fixed {} references", fixed);
        fixed
    }
}
