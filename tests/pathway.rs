mod support;

use std::fs;
use std::sync::atomic::Ordering;
use std::time::Duration;

use assert_matches::assert_matches;

use kegg_pathway::domain::MapId;
use kegg_pathway::engine::FetchEngine;
use kegg_pathway::error::KeggError;
use kegg_pathway::pathway::{FetchJob, PageOutcome, PathwayFetcher};

use support::{MockKegg, utf8_tempdir};

fn job(id: &str, outdir: &camino::Utf8Path, overwrite: bool) -> FetchJob {
    FetchJob {
        id: id.parse::<MapId>().unwrap(),
        outdir: outdir.to_path_buf(),
        overwrite,
    }
}

#[test]
fn saves_scrubbed_page_and_image() {
    let (_temp, root) = utf8_tempdir();
    let client = MockKegg::default().with_map("hsa00010");
    let fetcher = PathwayFetcher::new(&client, FetchEngine::new(10)).unwrap();

    let job = job("hsa00010", &root, false);
    assert_eq!(fetcher.fetch_one(&job).unwrap(), PageOutcome::Saved);

    let html = fs::read_to_string(job.html_path().as_std_path()).unwrap();
    assert!(html.contains("src=\"hsa00010.png\""));
    assert!(html.contains("https://www.genome.jp/dbget-bin/www_bget?hsa:3101"));
    assert_eq!(
        fs::read(job.png_path().as_std_path()).unwrap(),
        b"PNG:hsa00010"
    );
}

#[test]
fn second_run_without_overwrite_makes_no_calls() {
    let (_temp, root) = utf8_tempdir();
    let client = MockKegg::default().with_map("hsa00010");
    let fetcher = PathwayFetcher::new(&client, FetchEngine::new(10)).unwrap();
    let job = job("hsa00010", &root, false);

    fetcher.fetch_one(&job).unwrap();
    let calls = client.calls();
    let before = fs::read(job.html_path().as_std_path()).unwrap();

    assert_eq!(fetcher.fetch_one(&job).unwrap(), PageOutcome::Skipped);
    assert_eq!(client.calls(), calls);
    assert_eq!(fs::read(job.html_path().as_std_path()).unwrap(), before);
}

#[test]
fn overwrite_refetches_existing_page() {
    let (_temp, root) = utf8_tempdir();
    let client = MockKegg::default().with_map("hsa00010");
    let fetcher = PathwayFetcher::new(&client, FetchEngine::new(10)).unwrap();
    fs::write(root.join("hsa00010.html").as_std_path(), "stale").unwrap();

    let outcome = fetcher.fetch_one(&job("hsa00010", &root, true)).unwrap();
    assert_eq!(outcome, PageOutcome::Saved);
    assert_eq!(client.page_calls.load(Ordering::SeqCst), 1);
    let html = fs::read_to_string(root.join("hsa00010.html").as_std_path()).unwrap();
    assert_ne!(html, "stale");
}

#[test]
fn missing_map_page_writes_nothing() {
    let (_temp, root) = utf8_tempdir();
    let mut client = MockKegg::default();
    client.pages.insert(
        "hsa99999".to_string(),
        "<html><body>Pathway hsa99999 does not exist</body></html>\n".to_string(),
    );
    client.pages.insert("hsa99998".to_string(), "<html><body>".to_string());
    let fetcher = PathwayFetcher::new(&client, FetchEngine::new(10)).unwrap();

    for id in ["hsa99999", "hsa99998"] {
        let job = job(id, &root, false);
        assert_eq!(fetcher.fetch_one(&job).unwrap(), PageOutcome::Unavailable);
        assert!(!job.html_path().as_std_path().exists());
        assert!(!job.png_path().as_std_path().exists());
    }
    assert_eq!(client.image_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn image_failure_leaves_no_html() {
    let (_temp, root) = utf8_tempdir();
    let mut client = MockKegg::default().with_map("hsa00010");
    client.images.clear();
    let fetcher = PathwayFetcher::new(&client, FetchEngine::new(10)).unwrap();

    let job = job("hsa00010", &root, false);
    assert_matches!(fetcher.fetch_one(&job), Err(KeggError::Status { status: 404, .. }));
    assert!(!job.html_path().as_std_path().exists());
    assert!(!job.png_path().as_std_path().exists());
}

#[test]
fn batch_isolates_failures_and_respects_ceiling() {
    let (_temp, root) = utf8_tempdir();
    let mut client = MockKegg::default();
    let mut ids = Vec::new();
    for n in 0..24 {
        let id = format!("hsa{:05}", n);
        if n % 5 != 0 {
            client = client.with_map(&id);
        }
        ids.push(id.parse::<MapId>().unwrap());
    }
    client.delay = Some(Duration::from_millis(3));
    let fetcher = PathwayFetcher::new(&client, FetchEngine::new(4)).unwrap();

    fetcher.fetch_all(ids, &root, false).unwrap();

    assert!(client.peak.load(Ordering::SeqCst) <= 4);
    assert_eq!(client.page_calls.load(Ordering::SeqCst), 24);
    for n in 0..24 {
        let exists = root.join(format!("hsa{:05}.html", n)).as_std_path().exists();
        assert_eq!(exists, n % 5 != 0, "map {n}");
    }
}

#[test]
fn failed_image_write_leaves_no_html() {
    let (_temp, root) = utf8_tempdir();
    let client = MockKegg::default().with_map("hsa00010");
    let fetcher = PathwayFetcher::new(&client, FetchEngine::new(10)).unwrap();
    let job = job("hsa00010", &root, false);
    fs::create_dir(job.png_path().as_std_path()).unwrap();

    assert_matches!(fetcher.fetch_one(&job), Err(KeggError::Filesystem(_)));
    assert!(!job.html_path().as_std_path().exists());
    let entries = fs::read_dir(root.as_std_path()).unwrap().count();
    assert_eq!(entries, 1);
}
