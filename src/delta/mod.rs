//! Binary deltas between two byte strings.
//!
//! A delta is a fixed header followed by a body:
//!
//! ```text
//! magic "STD1" | mode (1 byte) | sha256(base)[..16] | sha256(target)[..16] | body
//! ```
//!
//! `mode` is either a BSDIFF40 patch (bzip2-compressed control, diff and extra
//! blocks) or the literal target bytes, used when there is nothing useful to
//! diff against. The digests let [`DeltaCodec::patch`] refuse a delta applied
//! to the wrong base instead of producing garbage.

use qbsdiff::{Bspatch, Bsdiff};
use sha2::{Digest, Sha256};
use thiserror::Error;

const MAGIC: &[u8; 4] = b"STD1";
const DIGEST_LEN: usize = 16;
const HEADER_LEN: usize = MAGIC.len() + 1 + 2 * DIGEST_LEN;

const MODE_LITERAL: u8 = 0;
const MODE_BSDIFF: u8 = 1;

#[derive(Error, Debug)]
pub enum DeltaError {
    #[error("delta is {0} bytes, shorter than its header")]
    Truncated(usize),

    #[error("bad delta magic")]
    BadMagic,

    #[error("unknown delta mode {0}")]
    UnknownMode(u8),

    #[error("delta was computed against a different base")]
    BaseMismatch,

    #[error("reconstructed bytes do not match the recorded digest")]
    TargetMismatch,

    #[error("bsdiff: {0}")]
    Bsdiff(#[from] std::io::Error),
}

#[derive(Clone, Default)]
pub struct DeltaCodec;

impl DeltaCodec {
    pub fn new() -> Self {
        Self
    }

    /// Delta that turns `base` into `target`.
    pub fn diff(&self, base: &[u8], target: &[u8]) -> Result<Vec<u8>, DeltaError> {
        let mut body = Vec::new();
        let mut mode = MODE_LITERAL;

        if !base.is_empty() && !target.is_empty() {
            Bsdiff::new(base, target).compare(&mut body)?;
            mode = MODE_BSDIFF;
            // Unrelated inputs can make the patch larger than the target itself.
            if body.len() >= target.len() {
                body.clear();
                mode = MODE_LITERAL;
            }
        }
        if mode == MODE_LITERAL {
            body.extend_from_slice(target);
        }

        let mut delta = Vec::with_capacity(HEADER_LEN + body.len());
        delta.extend_from_slice(MAGIC);
        delta.push(mode);
        delta.extend_from_slice(&digest(base));
        delta.extend_from_slice(&digest(target));
        delta.extend_from_slice(&body);
        Ok(delta)
    }

    /// Rebuild the target from `base` and a delta produced by [`Self::diff`].
    pub fn patch(&self, base: &[u8], delta: &[u8]) -> Result<Vec<u8>, DeltaError> {
        if delta.len() < HEADER_LEN {
            return Err(DeltaError::Truncated(delta.len()));
        }
        let (header, body) = delta.split_at(HEADER_LEN);
        if &header[..MAGIC.len()] != MAGIC {
            return Err(DeltaError::BadMagic);
        }

        let mode = header[MAGIC.len()];
        let digests = &header[MAGIC.len() + 1..];
        let (base_digest, target_digest) = digests.split_at(DIGEST_LEN);

        if digest(base) != base_digest {
            return Err(DeltaError::BaseMismatch);
        }

        let target = match mode {
            MODE_LITERAL => body.to_vec(),
            MODE_BSDIFF => {
                let patcher = Bspatch::new(body)?;
                let mut target = Vec::with_capacity(patcher.hint_target_size() as usize);
                patcher.apply(base, &mut target)?;
                target
            }
            other => return Err(DeltaError::UnknownMode(other)),
        };

        if digest(&target) != target_digest {
            return Err(DeltaError::TargetMismatch);
        }
        Ok(target)
    }
}

fn digest(bytes: &[u8]) -> [u8; DIGEST_LEN] {
    let full = Sha256::digest(bytes);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&full[..DIGEST_LEN]);
    out
}
