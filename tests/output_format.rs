use ruwalk::output::{RecordSink, TsvSink};
use ruwalk::walk::Walker;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_end_to_end_tsv_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    fs::create_dir(root.join("sub")).expect("Failed to create sub");
    fs::write(root.join("sub").join("a.txt"), "aaaa").expect("write failed");
    fs::write(root.join("b.txt"), "bb").expect("write failed");

    let out_dir = TempDir::new().expect("Failed to create output dir");
    let out_path = out_dir.path().join("output.dat");

    let sink = Arc::new(TsvSink::create(&out_path).expect("Failed to create sink"));
    let walker = Walker::new(2);
    let summary = walker
        .run(root, Arc::clone(&sink) as Arc<dyn RecordSink>)
        .expect("walk failed");
    sink.finish().expect("flush failed");

    let contents = fs::read_to_string(&out_path).expect("Failed to read output");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len() as u64, summary.entries);
    assert_eq!(lines.len(), 4);

    for line in &lines {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 10, "malformed line: {}", line);

        // hash: 16 lowercase hex digits, zero-padded
        assert_eq!(fields[0].len(), 16);
        assert!(fields[0].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        // size, depth, width, length: unsigned decimal
        for field in &fields[1..5] {
            field.parse::<u64>().expect("non-numeric counter field");
        }

        // mode code
        let mode: u8 = fields[5].parse().expect("non-numeric mode");
        assert!(mode <= 4);

        // timestamps: YYYY-MM-DDThh:mm:ssZ
        for ts in &fields[6..9] {
            assert_eq!(ts.len(), 20, "bad timestamp: {}", ts);
            assert!(ts.ends_with('Z'));
            assert_eq!(ts.as_bytes()[10], b'T');
        }

        // path: absolute
        assert!(fields[9].starts_with('/'));
    }
}

#[test]
fn test_output_file_truncated_between_runs() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    fs::write(root.join("only.txt"), "x").expect("write failed");

    let out_dir = TempDir::new().expect("Failed to create output dir");
    let out_path = out_dir.path().join("output.dat");

    for _ in 0..2 {
        let sink = Arc::new(TsvSink::create(&out_path).expect("Failed to create sink"));
        let walker = Walker::new(1);
        walker
            .run(root, Arc::clone(&sink) as Arc<dyn RecordSink>)
            .expect("walk failed");
        sink.finish().expect("flush failed");
    }

    // Two runs over two entries each: still exactly two lines.
    let contents = fs::read_to_string(&out_path).expect("Failed to read output");
    assert_eq!(contents.lines().count(), 2);
}
