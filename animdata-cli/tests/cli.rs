use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn record_block(name: &[u8], frames: u32, speed: u32, codes: &[(usize, u8)]) -> Vec<u8> {
    let mut block = vec![0u8; 160];
    block[..name.len()].copy_from_slice(name);
    block[8..12].copy_from_slice(&frames.to_le_bytes());
    block[12..16].copy_from_slice(&speed.to_le_bytes());
    for &(frame, code) in codes {
        block[16 + frame] = code;
    }
    block
}

/// One record each in buckets 0 and 1
fn valid_animdata() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend(record_block(b"AWS1HTH", 9, 7, &[(0, 3), (1, 2), (2, 1)]));
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend(record_block(
        b"AXS1HTH",
        256,
        256,
        &[(141, 1), (142, 2), (143, 3)],
    ));
    data.extend(vec![0u8; 254 * 4]);
    data
}

/// Two records named BVS1HTH in bucket 0
fn duplicate_animdata() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&2u32.to_le_bytes());
    data.extend(record_block(b"BVS1HTH", 9, 7, &[(1, 3), (2, 2), (3, 1)]));
    data.extend(record_block(b"BVS1HTH", 17, 32, &[]));
    data.extend(vec![0u8; 255 * 4]);
    data
}

fn deduped_animdata() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend(record_block(b"BVS1HTH", 9, 7, &[(1, 3), (2, 2), (3, 1)]));
    data.extend(vec![0u8; 255 * 4]);
    data
}

const VALID_JSON: &str = r#"[
  {
    "name": "AWS1HTH",
    "frames_per_direction": 9,
    "animation_speed": 7,
    "triggers": {
      "0": 3,
      "1": 2,
      "2": 1
    }
  },
  {
    "name": "AXS1HTH",
    "frames_per_direction": 256,
    "animation_speed": 256,
    "triggers": {
      "141": 1,
      "142": 2,
      "143": 3
    }
  }
]"#;

fn valid_txt() -> String {
    let mut txt = String::from("CofName\tFramesPerDirection\tAnimationSpeed");
    for frame in 0..144 {
        txt.push_str(&format!("\tFrameData{:03}", frame));
    }
    txt.push_str("\r\n");
    txt.push_str("AWS1HTH\t9\t7\t3\t2\t1");
    txt.push_str(&"\t0".repeat(141));
    txt.push_str("\r\n");
    txt.push_str("AXS1HTH\t256\t256");
    txt.push_str(&"\t0".repeat(141));
    txt.push_str("\t1\t2\t3\r\n");
    txt
}

fn run(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_d2animdata"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn test_decompile_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("AnimData.D2"), valid_animdata()).unwrap();

    let output = run(&["decompile", "--json", "AnimData.D2", "AnimData.json"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        fs::read_to_string(dir.path().join("AnimData.json")).unwrap(),
        VALID_JSON
    );
}

#[test]
fn test_decompile_txt() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("AnimData.D2"), valid_animdata()).unwrap();

    let output = run(&["decompile", "--txt", "AnimData.D2", "AnimData.txt"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        fs::read_to_string(dir.path().join("AnimData.txt")).unwrap(),
        valid_txt()
    );
}

#[test]
fn test_compile_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("AnimData.json"), VALID_JSON).unwrap();

    let output = run(&["compile", "--json", "AnimData.json", "AnimData.D2"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(fs::read(dir.path().join("AnimData.D2")).unwrap(), valid_animdata());
}

#[test]
fn test_compile_txt() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("AnimData.txt"), valid_txt()).unwrap();

    let output = run(&["compile", "--txt", "AnimData.txt", "AnimData.D2"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(fs::read(dir.path().join("AnimData.D2")).unwrap(), valid_animdata());
}

#[test]
fn test_duplicates_warn_without_dedupe() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("AnimData.D2"), duplicate_animdata()).unwrap();

    let output = run(&["decompile", "--json", "AnimData.D2", "AnimData.json"], dir.path());
    assert!(output.status.success(), "{output:?}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Duplicate entry found: BVS1HTH"), "{stderr}");

    let output = run(&["compile", "--json", "AnimData.json", "Compiled.D2"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        fs::read(dir.path().join("Compiled.D2")).unwrap(),
        duplicate_animdata()
    );
}

#[test]
fn test_dedupe_keeps_first() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("AnimData.D2"), duplicate_animdata()).unwrap();

    let output = run(
        &["decompile", "--txt", "AnimData.D2", "AnimData.txt"],
        dir.path(),
    );
    assert!(output.status.success(), "{output:?}");

    let output = run(
        &["compile", "--txt", "--dedupe", "AnimData.txt", "Deduped.D2"],
        dir.path(),
    );
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        fs::read(dir.path().join("Deduped.D2")).unwrap(),
        deduped_animdata()
    );
}

#[test]
fn test_sort_decompile() {
    let dir = tempfile::tempdir().unwrap();
    // AXS1HTH comes first in the source but sorts after AWS1HTH
    let json = r#"[
  {"name": "AXS1HTH", "frames_per_direction": 1, "animation_speed": 1, "triggers": {}},
  {"name": "AWS1HTH", "frames_per_direction": 2, "animation_speed": 2, "triggers": {}}
]"#;
    fs::write(dir.path().join("in.json"), json).unwrap();

    let output = run(&["compile", "--json", "in.json", "AnimData.D2"], dir.path());
    assert!(output.status.success(), "{output:?}");

    let output = run(
        &["decompile", "--json", "--sort", "AnimData.D2", "out.json"],
        dir.path(),
    );
    assert!(output.status.success(), "{output:?}");
    let out = fs::read_to_string(dir.path().join("out.json")).unwrap();
    let aws = out.find("AWS1HTH").unwrap();
    let axs = out.find("AXS1HTH").unwrap();
    assert!(aws < axs);
}

#[test]
fn test_sort_compile() {
    let dir = tempfile::tempdir().unwrap();
    // Both names hash to bucket 0
    let json = r#"[
  {"name": "BVS1HTH", "frames_per_direction": 1, "animation_speed": 1, "triggers": {}},
  {"name": "AWS1HTH", "frames_per_direction": 2, "animation_speed": 2, "triggers": {}}
]"#;
    fs::write(dir.path().join("in.json"), json).unwrap();

    let output = run(&["compile", "--json", "in.json", "Unsorted.D2"], dir.path());
    assert!(output.status.success(), "{output:?}");
    let unsorted = fs::read(dir.path().join("Unsorted.D2")).unwrap();
    assert_eq!(&unsorted[..4], &2u32.to_le_bytes());
    assert_eq!(&unsorted[4..11], b"BVS1HTH");

    let output = run(
        &["compile", "--json", "--sort", "in.json", "Sorted.D2"],
        dir.path(),
    );
    assert!(output.status.success(), "{output:?}");
    let sorted = fs::read(dir.path().join("Sorted.D2")).unwrap();
    assert_eq!(&sorted[4..11], b"AWS1HTH");
    assert_eq!(&sorted[164..171], b"BVS1HTH");
    assert_eq!(sorted.len(), unsorted.len());
}

#[test]
fn test_corrupt_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut data = valid_animdata();
    data.push(0);
    fs::write(dir.path().join("AnimData.D2"), data).unwrap();

    let output = run(&["decompile", "--json", "AnimData.D2", "AnimData.json"], dir.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Data size mismatch"), "{stderr}");
}

#[test]
fn test_format_flag_required() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("AnimData.D2"), valid_animdata()).unwrap();

    let output = run(&["decompile", "AnimData.D2", "AnimData.json"], dir.path());
    assert!(!output.status.success());

    let output = run(
        &["decompile", "--json", "--txt", "AnimData.D2", "AnimData.json"],
        dir.path(),
    );
    assert!(!output.status.success());
}
