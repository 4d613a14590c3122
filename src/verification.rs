//! The `VerificationUI` collaborator: out of core scope as an
//! implementation (it's an interactive dialog), but its interface and
//! the two trivial implementations the engine needs live here.
//!
//! Grounded on `original_source/Interactive/PatchVerificationDialog.hpp`
//! for the three-way `Decision` shape.

use crate::buffers::MultiChannelField;
use crate::geometry::Region;
use crate::mask::Mask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    ReplaceWith(Region),
    Quit,
}

/// One synchronous call: given the query (target) and proposed (source)
/// regions plus a read-only snapshot of the current state, decide.
pub trait VerificationUi: Send + Sync {
    fn verify(
        &mut self,
        query: Region,
        proposed: Region,
        image_snapshot: &MultiChannelField,
        mask_snapshot: &Mask,
    ) -> Decision;
}

/// Always accepts the proposed candidate. This is the engine's default —
/// appropriate for batch/headless runs where every acceptance-visitor
/// rejection should fall through to "just take the best-ranked source"
/// rather than blocking on a human.
pub struct AutoAcceptVerification;

impl VerificationUi for AutoAcceptVerification {
    fn verify(&mut self, _query: Region, _proposed: Region, _image: &MultiChannelField, _mask: &Mask) -> Decision {
        Decision::Accept
    }
}

/// Always quits. Lets a headless embedder opt into `CoreError::UserQuit`
/// instead of `AllCandidatesRejected` when no visitor accepts.
pub struct NoopVerification;

impl VerificationUi for NoopVerification {
    fn verify(&mut self, _query: Region, _proposed: Region, _image: &MultiChannelField, _mask: &Mask) -> Decision {
        Decision::Quit
    }
}
