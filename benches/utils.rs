use sounding_plot::{load, SoundingDocument};
use std::path::PathBuf;

pub fn load_all_test_files() -> [SoundingDocument; 3] {
    let doc1 = load_test_file("unstable.json");
    let doc2 = load_test_file("stable.json");
    let doc3 = load_test_file("messy.json");

    [doc1, doc2, doc3]
}

fn load_test_file(fname: &str) -> SoundingDocument {
    let mut test_path = PathBuf::new();
    test_path.push("test_data");
    test_path.push(fname);
    load(&test_path).unwrap_or_else(|err| panic!("Error loading {:#?}: {}", test_path, err))
}
