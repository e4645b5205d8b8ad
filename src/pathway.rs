use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, error, info, warn};

use crate::client::KeggClient;
use crate::domain::MapId;
use crate::engine::FetchEngine;
use crate::error::KeggError;
use crate::scrub::{HtmlScrubber, page_available};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// HTML already on disk and overwrite not requested; nothing fetched.
    Skipped,
    /// KEGG served a page that is not a complete map page.
    Unavailable,
    Saved,
}

/// One map's worth of work, owned by the task that runs it.
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub id: MapId,
    pub outdir: Utf8PathBuf,
    pub overwrite: bool,
}

impl FetchJob {
    pub fn html_path(&self) -> Utf8PathBuf {
        self.outdir.join(format!("{}.html", self.id))
    }

    pub fn png_path(&self) -> Utf8PathBuf {
        self.outdir.join(format!("{}.png", self.id))
    }
}

pub struct PathwayFetcher<'a, C: KeggClient> {
    client: &'a C,
    scrubber: HtmlScrubber,
    engine: FetchEngine,
}

impl<'a, C: KeggClient> PathwayFetcher<'a, C> {
    pub fn new(client: &'a C, engine: FetchEngine) -> Result<Self, KeggError> {
        Ok(Self {
            client,
            scrubber: HtmlScrubber::new()?,
            engine,
        })
    }

    /// Downloads page and diagram for every id into `outdir`. Per-map
    /// failures are logged and never abort the batch.
    pub fn fetch_all(
        &self,
        ids: Vec<MapId>,
        outdir: &Utf8Path,
        overwrite: bool,
    ) -> Result<(), KeggError> {
        info!(count = ids.len(), outdir = %outdir, "downloading pathway maps");
        let jobs = ids
            .into_iter()
            .map(|id| FetchJob {
                id,
                outdir: outdir.to_path_buf(),
                overwrite,
            })
            .collect();

        self.engine.run(jobs, |job: FetchJob| match self.fetch_one(&job) {
            Ok(PageOutcome::Saved) => debug!(map = %job.id, "saved"),
            Ok(PageOutcome::Skipped) => debug!(map = %job.id, "already present, skipped"),
            Ok(PageOutcome::Unavailable) => warn!(map = %job.id, "map not available"),
            Err(err) => error!(map = %job.id, "{err}"),
        })
    }

    /// Image is written before HTML so an HTML file on disk always has its
    /// PNG next to it. Both land via temp file and rename, so a file at its
    /// final path is always complete.
    pub fn fetch_one(&self, job: &FetchJob) -> Result<PageOutcome, KeggError> {
        let html_path = job.html_path();
        if !job.overwrite && html_path.as_std_path().exists() {
            return Ok(PageOutcome::Skipped);
        }

        let page = self.client.fetch_pathway_page(&job.id)?;
        if !page_available(&page) {
            return Ok(PageOutcome::Unavailable);
        }
        let text = self.scrubber.scrub(&page, job.id.code());

        let image = self.client.fetch_pathway_image(&job.id)?;

        Store::write_bytes_atomic(&job.png_path(), &image)?;
        Store::write_bytes_atomic(&html_path, text.as_bytes())?;
        Ok(PageOutcome::Saved)
    }
}
