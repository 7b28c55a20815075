use sounding_plot::{load, SoundingDocument};
use std::path::PathBuf;

pub const TEST_FILES: [&str; 3] = ["unstable.json", "stable.json", "messy.json"];

pub fn test_file_path(fname: &str) -> PathBuf {
    let mut test_path = PathBuf::new();
    test_path.push("test_data");
    test_path.push(fname);
    test_path
}

pub fn load_test_file(fname: &str) -> SoundingDocument {
    let path = test_file_path(fname);
    load(&path).unwrap_or_else(|err| panic!("Error loading {:#?}: {}", path, err))
}

#[allow(dead_code)] // Not every test binary uses every helper.
pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
    (val1 - val2).abs() < eps
}
