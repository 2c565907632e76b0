//! End-to-end acquisition of a media reference.

use reqwest::Client;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use tldw_models::{classify, normalize, AcquiredMedia, ReferenceKind};

use crate::config::AcquisitionConfig;
use crate::download::DownloadChain;
use crate::error::{MediaError, MediaResult};
use crate::metrics::record_acquisition;
use crate::progress::{ProgressSink, DOWNLOADING, RESOLVING};
use crate::resolver::ResolverChain;

/// Sequences normalization, resolution and download for one reference.
///
/// Each call to [`Acquirer::acquire`] is independent; nothing is shared
/// between attempts except the HTTP client.
pub struct Acquirer {
    resolvers: ResolverChain,
    downloads: DownloadChain,
}

impl Acquirer {
    pub fn new(resolvers: ResolverChain, downloads: DownloadChain) -> Self {
        Self {
            resolvers,
            downloads,
        }
    }

    /// Build both chains from config, sharing one HTTP client.
    pub fn from_config(config: &AcquisitionConfig) -> MediaResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("tldw/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MediaError::Network)?;

        Ok(Self::new(
            ResolverChain::from_config(config, &http),
            DownloadChain::from_config(config, &http),
        ))
    }

    /// Turn `reference` into a named, typed media blob.
    ///
    /// Errors from either chain propagate unchanged. A failed resolution
    /// means no download is attempted.
    pub async fn acquire(
        &self,
        reference: &str,
        progress: &dyn ProgressSink,
    ) -> MediaResult<AcquiredMedia> {
        let acquisition_id = Uuid::new_v4();
        let kind = classify(reference);
        let span = info_span!("acquire", %acquisition_id, %kind);

        async move {
            let result = self.run(reference, kind, progress).await;

            match &result {
                Ok(media) => {
                    record_acquisition(&kind.to_string(), true, Some(media.len()));
                    info!(
                        filename = %media.filename,
                        mime_type = %media.mime_type,
                        bytes = media.len(),
                        "Acquisition complete"
                    );
                }
                Err(e) => {
                    record_acquisition(&kind.to_string(), false, None);
                    warn!(error = %e, "Acquisition failed");
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        reference: &str,
        kind: ReferenceKind,
        progress: &dyn ProgressSink,
    ) -> MediaResult<AcquiredMedia> {
        let source_url = match kind {
            ReferenceKind::Indirect => {
                let link = normalize(reference);
                info!(canonical = %link, "Normalized link");
                progress.report(RESOLVING);
                self.resolvers.resolve(&link).await?.url
            }
            ReferenceKind::Direct => reference.trim().to_string(),
        };

        progress.report(DOWNLOADING);
        self.downloads
            .download(&source_url, kind.is_indirect())
            .await
    }
}
