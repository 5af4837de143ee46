//! Ordered release of the shared share.

use boxmerge_fetch::{RemoteShare, ShareError, ShareStage};
use tracing::{debug, warn};

/// Releases the share's tree, session and connection, in that order.
///
/// Every stage is attempted even if an earlier one fails. Failures are
/// logged and returned for display; they never change a run's outcome.
pub async fn teardown<S>(share: &S) -> Vec<ShareError>
where
    S: RemoteShare + ?Sized,
{
    let mut failures = Vec::new();
    for stage in ShareStage::TEARDOWN_ORDER {
        match share.release(stage).await {
            Ok(()) => debug!(%stage, "released"),
            Err(e) => {
                warn!(%stage, error = %e, "failed to release share");
                failures.push(e);
            }
        }
    }
    failures
}
