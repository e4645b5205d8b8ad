#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use kegg_pathway::client::KeggClient;
use kegg_pathway::domain::MapId;
use kegg_pathway::error::KeggError;

pub const HSA_KEG: &str = "+D\tKO\n\
#<h2>KEGG Orthology (KO) - Homo sapiens (human)</h2>\n\
!\n\
A09100 Metabolism\n\
B\n\
B  09101 Carbohydrate metabolism\n\
C    00010 Glycolysis / Gluconeogenesis [PATH:hsa00010]\n\
D      3101 HK3; hexokinase 3\tK00844 HK; hexokinase [EC:2.7.1.1]\n\
D      130589 GALM; galactose mutarotase\tK01785 galM, GALM; aldose 1-epimerase [EC:5.1.3.3]\n\
C    00020 Citrate cycle (TCA cycle) [PATH:hsa00020]\n\
D      1431 CS; citrate synthase\tK01647 CS, gltA; citrate synthase [EC:2.3.3.1]\n\
!\n\
#\n\
#Last updated: May 1, 2024\n";

pub fn page(id: &str) -> String {
    format!(
        "<html>\n<body>\n<img src=\"/kegg/pathway/hsa/{id}.png\" />\n\
<area href=\"/dbget-bin/www_bget?hsa:3101\" />\n</body>\n</html>\n"
    )
}

/// In-memory KEGG with call counters and an in-flight gauge.
#[derive(Default)]
pub struct MockKegg {
    pub pages: HashMap<String, String>,
    pub images: HashMap<String, Vec<u8>>,
    pub htext: HashMap<String, String>,
    pub organisms: String,
    pub delay: Option<Duration>,
    pub page_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub requested: Mutex<Vec<String>>,
}

impl MockKegg {
    pub fn with_map(mut self, id: &str) -> Self {
        self.pages.insert(id.to_string(), page(id));
        self.images.insert(id.to_string(), format!("PNG:{id}").into_bytes());
        self
    }

    pub fn calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst) + self.image_calls.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl KeggClient for MockKegg {
    fn fetch_pathway_page(&self, id: &MapId) -> Result<String, KeggError> {
        self.enter();
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(id.to_string());
        let result = self
            .pages
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| KeggError::Http(format!("connection reset: {id}")));
        self.leave();
        result
    }

    fn fetch_pathway_image(&self, id: &MapId) -> Result<Vec<u8>, KeggError> {
        self.enter();
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.images.get(id.as_str()).cloned().ok_or(KeggError::Status {
            status: 404,
            message: "not found".to_string(),
        });
        self.leave();
        result
    }

    fn fetch_htext(&self, name: &str) -> Result<String, KeggError> {
        self.htext
            .get(name)
            .cloned()
            .ok_or_else(|| KeggError::Http(format!("no htext {name}")))
    }

    fn fetch_organism_list(&self) -> Result<String, KeggError> {
        Ok(self.organisms.clone())
    }
}

pub fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, root)
}
