mod support;

use std::fs;
use std::io::Write;

use assert_matches::assert_matches;
use flate2::Compression;
use flate2::write::GzEncoder;

use kegg_pathway::domain::MapId;
use kegg_pathway::error::KeggError;
use kegg_pathway::keg::{TSV_HEADER, convert_file, extract_map_ids};

use support::{HSA_KEG, utf8_tempdir};

fn write_gz(path: &camino::Utf8Path, content: &str) {
    let file = fs::File::create(path.as_std_path()).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

#[test]
fn gzip_and_plain_sources_convert_identically() {
    let (_temp, root) = utf8_tempdir();
    let plain = root.join("hsa00001.keg");
    let gz = root.join("hsa00001.keg.gz");
    fs::write(plain.as_std_path(), HSA_KEG).unwrap();
    write_gz(&gz, HSA_KEG);

    let plain_out = root.join("plain").join("out.tsv");
    let gz_out = root.join("gz").join("nested").join("out.tsv");
    let plain_rows = convert_file(plain.as_str(), Some(&plain_out)).unwrap();
    let gz_rows = convert_file(gz.as_str(), Some(&gz_out)).unwrap();

    assert_eq!(plain_rows, 3);
    assert_eq!(gz_rows, 3);
    assert_eq!(
        fs::read(plain_out.as_std_path()).unwrap(),
        fs::read(gz_out.as_std_path()).unwrap()
    );
}

#[test]
fn real_shaped_keg_rows() {
    let (_temp, root) = utf8_tempdir();
    let source = root.join("hsa00001.keg");
    fs::write(source.as_std_path(), HSA_KEG).unwrap();
    let out = root.join("hsa00001.keg.tsv");

    convert_file(source.as_str(), Some(&out)).unwrap();

    let text = fs::read_to_string(out.as_std_path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], TSV_HEADER);
    assert_eq!(
        lines[1],
        "3101\tHK3; hexokinase 3\tPATH:hsa00010\tGlycolysis / Gluconeogenesis\tK00844\t\
HK; hexokinase\t2.7.1.1\t09101\tCarbohydrate metabolism\t09100\tMetabolism"
    );
    assert!(lines[3].starts_with("1431\tCS; citrate synthase\tPATH:hsa00020\tCitrate cycle (TCA cycle)\t"));
}

#[test]
fn missing_source_is_fatal() {
    let (_temp, root) = utf8_tempdir();
    let missing = root.join("nope.keg.gz");
    assert_matches!(
        convert_file(missing.as_str(), None),
        Err(KeggError::MissingInput(_))
    );
}

#[test]
fn map_ids_from_gzip_keg() {
    let (_temp, root) = utf8_tempdir();
    let gz = root.join("hsa00001.keg.gz");
    write_gz(&gz, HSA_KEG);

    let ids = extract_map_ids(gz.as_str()).unwrap();
    let ids: Vec<&str> = ids.iter().map(MapId::as_str).collect();
    assert_eq!(ids, vec!["hsa00010", "hsa00020"]);
}
